use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use docsense::lexical::Field;

#[derive(Debug, Parser)]
#[command(
    name = "docsense",
    about = "Understand natural-language document queries and rank matching items"
)]
pub struct Cli {
    /// Path to a JSON config file (default: $XDG_CONFIG_HOME/docsense/config.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search a corpus with a natural-language query
    Search(SearchArgs),
    /// Show how a query is interpreted
    Intent(IntentArgs),
    /// Plain substring search over item fields
    Find(FindArgs),
    /// List the business concepts in use
    Concepts(ConceptsArgs),
    /// Start MCP server for AI agent integration
    Mcp(McpArgs),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Search --

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// The search query
    pub query: String,

    /// JSON corpus file, or - for stdin
    #[arg(short = 'c', long)]
    pub corpus: PathBuf,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Intent --

#[derive(Debug, Parser)]
pub struct IntentArgs {
    /// The query to interpret
    pub query: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Find --

#[derive(Debug, Parser)]
pub struct FindArgs {
    /// Text to look for
    pub query: String,

    /// JSON corpus file, or - for stdin
    #[arg(short = 'c', long)]
    pub corpus: PathBuf,

    /// Field to search: name, path, type, mimeType or folder (repeatable)
    #[arg(short = 'f', long = "field", default_value = "name")]
    pub fields: Vec<Field>,

    /// Require the whole field to equal the query
    #[arg(long)]
    pub exact: bool,

    /// Match case exactly
    #[arg(long)]
    pub case_sensitive: bool,

    /// Ignore queries shorter than this many characters
    #[arg(long, default_value = "1")]
    pub min_length: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Concepts --

#[derive(Debug, Parser)]
pub struct ConceptsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- MCP --

#[derive(Debug, Parser)]
pub struct McpArgs {
    /// JSON corpus file served by the search tool
    #[arg(short = 'c', long)]
    pub corpus: PathBuf,
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "docsense",
            &mut std::io::stdout(),
        );
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn parse_search() {
        let cli = Cli::parse_from([
            "docsense",
            "search",
            "top 3 financial reports",
            "--corpus",
            "docs.json",
            "-vv",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Search(args) => {
                assert_eq!(args.query, "top 3 financial reports");
                assert_eq!(args.corpus, PathBuf::from("docs.json"));
                assert!(!args.json);
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn parse_find_defaults_and_fields() {
        let cli = Cli::parse_from(["docsense", "find", "budget", "-c", "-"]);
        match cli.command {
            Command::Find(args) => {
                assert_eq!(args.fields, [Field::Name]);
                assert_eq!(args.min_length, 1);
                assert!(!args.exact);
                assert!(!args.case_sensitive);
            }
            _ => panic!("expected find command"),
        }

        let cli = Cli::parse_from([
            "docsense", "find", "budget", "-c", "-", "-f", "path", "-f",
            "mimeType",
        ]);
        match cli.command {
            Command::Find(args) => {
                assert_eq!(args.fields, [Field::Path, Field::MimeType]);
            }
            _ => panic!("expected find command"),
        }
    }

    #[test]
    fn unknown_field_is_rejected() {
        let parsed = Cli::try_parse_from([
            "docsense", "find", "budget", "-c", "-", "-f", "size",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn global_config_flag() {
        let cli = Cli::parse_from([
            "docsense",
            "intent",
            "latest hr policies",
            "--config",
            "/tmp/docsense.json",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/docsense.json")));
        assert!(matches!(cli.command, Command::Intent(_)));
    }
}
