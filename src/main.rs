use clap::Parser;
use docsense::{
    EngineConfig,
    error,
    intent::QueryIntent,
    item::load_corpus,
    lexical::{self, LexicalMatch, LexicalOptions},
    mcp,
    search::{self, Engine},
};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Command, FindArgs};

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("DOCSENSE_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Command::Completions(args) = &cli.command {
        args.generate();
        return Ok(());
    }

    let config = EngineConfig::resolve(cli.config.as_deref())?;
    let engine = Engine::new(config)?;

    match cli.command {
        Command::Search(args) => {
            let corpus = load_corpus(&args.corpus)?;
            let intent = engine.parse(&args.query);
            let results = engine.evaluate(&args.query, &corpus);

            if args.json {
                search::format_json(&args.query, &intent, &results);
            } else {
                print_intent_line(&intent);
                search::format_human(&results);
            }
        }
        Command::Intent(args) => {
            let intent = engine.parse(&args.query);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&intent)?);
            } else {
                print_intent(&intent);
            }
        }
        Command::Find(args) => {
            cmd_find(&args)?;
        }
        Command::Concepts(args) => {
            let concepts = engine.taxonomy().concepts();
            if args.json {
                println!("{}", serde_json::to_string_pretty(concepts)?);
            } else {
                for concept in concepts {
                    println!("{}", concept.name);
                    println!("  primary: {}", concept.primary.join(", "));
                    println!("  folders: {}", concept.folder_patterns.join(", "));
                }
            }
        }
        Command::Mcp(args) => {
            let corpus = load_corpus(&args.corpus)?;
            mcp::run_mcp(engine, corpus)?;
        }
        Command::Completions(_) => {}
    }

    Ok(())
}

fn print_intent_line(intent: &QueryIntent) {
    let mut parts = Vec::new();
    if !intent.categories.is_empty() {
        parts.push(intent.categories.join(", "));
    }
    if let Some(n) = intent.quantity {
        parts.push(format!("limit {n}"));
    }
    if let Some(ranking) = intent.ranking {
        parts.push(format!("by {ranking}"));
    }
    if let Some(folder) = &intent.folder_path {
        parts.push(format!("in {folder}"));
    }
    if !parts.is_empty() {
        println!("Interpreted as: {}\n", parts.join("; "));
    }
}

fn print_intent(intent: &QueryIntent) {
    let or_dash = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());
    let categories = if intent.categories.is_empty() {
        "-".to_string()
    } else {
        intent.categories.join(", ")
    };

    println!("action:     {:?}", intent.action);
    println!("quantity:   {}", or_dash(intent.quantity.map(|n| n.to_string())));
    println!("ranking:    {}", or_dash(intent.ranking.map(|r| r.to_string())));
    println!("categories: {categories}");
    println!("time range: {}", or_dash(intent.time_range.clone()));
    println!("folder:     {}", or_dash(intent.folder_path.clone()));
    println!("confidence: {:.2}", intent.confidence);
}

fn cmd_find(args: &FindArgs) -> error::Result<()> {
    let corpus = load_corpus(&args.corpus)?;
    let options = LexicalOptions {
        fields: args.fields.clone(),
        case_sensitive: args.case_sensitive,
        exact: args.exact,
        min_length: args.min_length,
    };
    let matches = lexical::search_fields(&corpus, &args.query, &options);

    if args.json {
        println!("{}", serde_json::to_string(&matches)?);
    } else {
        format_matches(&matches);
    }
    Ok(())
}

fn format_matches(matches: &[LexicalMatch<'_>]) {
    if matches.is_empty() {
        println!("No matches found.");
        return;
    }

    for m in matches {
        let fields = m
            .matched_fields
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        println!("{:>4} {} [{fields}]", m.score, m.item.name);
    }
    println!("\n{} match(es)", matches.len());
}
