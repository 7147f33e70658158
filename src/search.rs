use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    config::EngineConfig,
    embedding::{Embedder, SemanticModel},
    error::Result,
    explain,
    intent::{self, QueryIntent},
    item::SearchableItem,
    rank,
    scorer::{self, ItemScores, MatchType, Scorer},
    taxonomy::Taxonomy,
};

/// Sub-scores behind a result. `relevance` is the combined score in
/// `[0, 1]`; the reported percentage is always `relevance * 100` rounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchDetails {
    pub semantic: f64,
    pub conceptual: f64,
    pub business: f64,
    pub folder: f64,
    pub relevance: f64,
}

impl MatchDetails {
    fn from_scores(scores: &ItemScores) -> Self {
        Self {
            semantic: scores.semantic,
            conceptual: scores.conceptual,
            business: scores.business,
            folder: scores.folder,
            relevance: scores.combined,
        }
    }

    /// Recompute the combined score from the breakdown alone.
    pub fn recombine(&self, scorer: &Scorer<'_>) -> f64 {
        scorer.combine(self.semantic, self.business, self.conceptual, self.folder)
    }
}

/// A single ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredResult {
    pub item: SearchableItem,
    /// Relevance as a percentage.
    pub score: u8,
    pub match_type: MatchType,
    pub confidence: f64,
    pub explanation: String,
    pub match_details: MatchDetails,
}

/// Per-query state shared by every chunk of one search.
pub(crate) struct QueryPlan {
    pub(crate) intent: QueryIntent,
    query_vector: Option<Vec<f32>>,
}

/// Parses queries and scores items against them.
///
/// An engine is immutable once built and can be shared between sessions.
pub struct Engine {
    taxonomy: Arc<Taxonomy>,
    config: EngineConfig,
    semantic: Option<SemanticModel>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_taxonomy(EngineConfig::default(), Taxonomy::builtin().clone())
    }
}

impl Engine {
    /// Build an engine, loading the taxonomy file named in `config` when
    /// there is one.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let taxonomy = match &config.taxonomy {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading taxonomy");
                Taxonomy::load(path)?
            }
            None => Taxonomy::builtin().clone(),
        };
        Ok(Self::with_taxonomy(config, taxonomy))
    }

    pub fn with_taxonomy(config: EngineConfig, taxonomy: Taxonomy) -> Self {
        Self {
            taxonomy: Arc::new(taxonomy),
            config,
            semantic: None,
        }
    }

    /// Attach an embedding model. If it fails to initialize the engine
    /// keeps working in heuristic-only mode.
    pub fn with_embedder(mut self, embedder: Box<dyn Embedder>) -> Self {
        self.semantic = SemanticModel::try_new(embedder);
        self
    }

    pub fn semantic_enabled(&self) -> bool {
        self.semantic.is_some()
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scorer(&self) -> Scorer<'_> {
        Scorer::new(&self.taxonomy, &self.config.scoring)
    }

    /// Parse `query` into a structured intent.
    pub fn parse(&self, query: &str) -> QueryIntent {
        intent::parse_query(query, &self.taxonomy, &self.config.scoring)
    }

    pub(crate) fn plan(&self, query: &str) -> QueryPlan {
        let intent = self.parse(query);
        let query_vector = self
            .semantic
            .as_ref()
            .and_then(|model| model.embed_query(query));
        QueryPlan {
            intent,
            query_vector,
        }
    }

    /// Score one item, returning `None` when it is malformed or not
    /// relevant enough to be shown.
    pub(crate) fn score_item(
        &self,
        plan: &QueryPlan,
        item: &SearchableItem,
    ) -> Option<ScoredResult> {
        if let Err(e) = item.validate() {
            tracing::warn!(error = %e, "skipping item");
            return None;
        }

        let semantic = match (&self.semantic, &plan.query_vector) {
            (Some(model), Some(query_vector)) => {
                model.similarity(query_vector, &item.text())
            }
            _ => None,
        };

        let scorer = self.scorer();
        let scores = scorer.score(item, &plan.intent, semantic);
        tracing::trace!(id = %item.id, ?scores, "scored item");
        if !scorer.is_admitted(&scores, &plan.intent) {
            return None;
        }

        Some(ScoredResult {
            item: item.clone(),
            score: scorer::percent(scores.combined),
            match_type: scores.match_type,
            confidence: scores.combined,
            explanation: explain::explain(
                &scores,
                item,
                &plan.intent,
                &self.config.scoring,
            ),
            match_details: MatchDetails::from_scores(&scores),
        })
    }

    pub(crate) fn score_chunk(
        &self,
        plan: &QueryPlan,
        chunk: &[SearchableItem],
        out: &mut Vec<ScoredResult>,
    ) {
        out.extend(chunk.iter().filter_map(|item| self.score_item(plan, item)));
    }

    /// Run the whole pipeline synchronously: parse, score every item, then
    /// rank. No debounce, no chunk pauses, no cache.
    pub fn evaluate(
        &self,
        query: &str,
        items: &[SearchableItem],
    ) -> Vec<ScoredResult> {
        let plan = self.plan(query);
        let mut results = Vec::new();
        self.score_chunk(&plan, items, &mut results);
        rank::apply_intent(results, &plan.intent)
    }
}

/// The machine-readable response shared by the CLI and the MCP server.
pub fn response_json(
    query: &str,
    intent: &QueryIntent,
    results: &[ScoredResult],
) -> serde_json::Value {
    json!({
        "query": query,
        "intent": intent,
        "resultCount": results.len(),
        "results": results,
    })
}

/// Format results for human-readable terminal output.
pub fn format_human(results: &[ScoredResult]) {
    if results.is_empty() {
        println!("No results found.");
        return;
    }

    for (i, r) in results.iter().enumerate() {
        println!(
            "{:>3}. [{:>3}%] {} ({})",
            i + 1,
            r.score,
            r.item.name,
            r.match_type.as_str()
        );
        let folder = r.item.folder_path();
        if !folder.is_empty() {
            println!("     {folder}");
        }
        println!("     {}", r.explanation);
    }
    println!("\n{} result(s)", results.len());
}

/// Format results as JSON output.
pub fn format_json(query: &str, intent: &QueryIntent, results: &[ScoredResult]) {
    println!("{}", response_json(query, intent, results));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        embedding::{cosine_similarity, testing::LetterEmbedder},
        intent::Ranking,
    };

    fn corpus() -> Vec<SearchableItem> {
        vec![
            SearchableItem::new("1", "Budget Analysis 2024")
                .with_folder("Finance", "/Finance/Reports")
                .with_kind("document"),
            SearchableItem::new("2", "Revenue Summary")
                .with_folder("Finance", "/Finance")
                .with_kind("document"),
            SearchableItem::new("3", "Employee Handbook")
                .with_folder("HR", "/HR")
                .with_kind("document"),
            SearchableItem::new("4", "Holiday Photo.png")
                .with_folder("Pictures", "/Pictures")
                .with_kind("image"),
        ]
    }

    #[test]
    fn evaluate_scores_and_ranks() {
        let engine = Engine::default();
        let results = engine.evaluate("budget analysis", &corpus());

        assert!(!results.is_empty());
        assert_eq!(results[0].item.id, "1");
        for w in results.windows(2) {
            assert!(w[0].match_details.relevance >= w[1].match_details.relevance);
        }
    }

    #[test]
    fn score_is_derivable_from_match_details() {
        let engine = Engine::default();
        let scorer = engine.scorer();
        for query in [
            "budget analysis",
            "employee handbook",
            "files from /Finance/Reports",
            "top 2 revenue reports",
        ] {
            for r in engine.evaluate(query, &corpus()) {
                let combined = r.match_details.recombine(&scorer);
                assert_eq!(combined, r.match_details.relevance);
                assert_eq!(scorer::percent(combined), r.score);
                assert_eq!(combined, r.confidence);
            }
        }
    }

    #[test]
    fn explicit_folder_restricts_results() {
        let engine = Engine::default();
        let results = engine.evaluate("files from /Finance/Reports", &corpus());

        assert_eq!(results.len(), 1);
        let r = &results[0];
        assert_eq!(r.item.id, "1");
        assert_eq!(r.match_type, MatchType::Hybrid);
        assert!((80..=95).contains(&r.score));
        assert!(r.explanation.starts_with("Perfect folder match"));
    }

    #[test]
    fn unknown_folder_yields_nothing() {
        let engine = Engine::default();
        assert!(engine.evaluate("files from /Legal", &corpus()).is_empty());
    }

    #[test]
    fn malformed_items_are_skipped() {
        let engine = Engine::default();
        let mut items = corpus();
        items.push(SearchableItem::new("5", "  ").with_folder("Finance", "/Finance"));
        items.push(SearchableItem::new("", "Budget Plan"));

        let results = engine.evaluate("budget", &items);
        assert!(results.iter().all(|r| r.item.id != "5" && !r.item.id.is_empty()));
    }

    #[test]
    fn quantity_and_ranking_follow_intent() {
        let engine = Engine::default();
        let results = engine.evaluate("top 1 finance budget", &corpus());
        assert_eq!(results.len(), 1);
        assert!(results[0].explanation.contains("One of the top 1 results"));

        let intent = engine.parse("top 1 finance budget");
        assert_eq!(intent.ranking, Some(Ranking::Top));
    }

    #[test]
    fn embedder_replaces_neutral_semantic_score() {
        let engine = Engine::default()
            .with_embedder(Box::new(LetterEmbedder { ready: true }));
        assert!(engine.semantic_enabled());

        let items = corpus();
        let results = engine.evaluate("budget report", &items);
        let r = results.iter().find(|r| r.item.id == "1").unwrap();

        let embedder = LetterEmbedder { ready: true };
        let expected = cosine_similarity(
            &embedder.embed("budget report").unwrap(),
            &embedder.embed(&items[0].text()).unwrap(),
        )
        .clamp(0.0, 1.0);
        assert_eq!(r.match_details.semantic, expected);
    }

    #[test]
    fn broken_item_embedding_falls_back_to_neutral() {
        let engine = Engine::default()
            .with_embedder(Box::new(LetterEmbedder { ready: true }));
        let items = vec![
            SearchableItem::new("9", "Corrupted Budget")
                .with_folder("Finance", "/Finance")
                .with_kind("document"),
        ];

        let results = engine.evaluate("budget report", &items);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].match_details.semantic, 0.5);
        assert!(results[0].match_details.relevance < 0.75);
    }

    #[test]
    fn failed_embedder_keeps_heuristic_mode() {
        let engine = Engine::default()
            .with_embedder(Box::new(LetterEmbedder { ready: false }));
        assert!(!engine.semantic_enabled());

        for r in engine.evaluate("budget report", &corpus()) {
            assert_eq!(r.match_details.semantic, 0.5);
        }
    }

    #[test]
    fn custom_taxonomy_file_is_loaded() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("taxonomy.json");
        std::fs::write(
            &path,
            r#"[{"name": "legal", "primary": ["contract"], "folderPatterns": ["legal"]}]"#,
        )
        .unwrap();

        let config = EngineConfig {
            taxonomy: Some(path),
            ..Default::default()
        };
        let engine = Engine::new(config).unwrap();
        assert_eq!(engine.taxonomy().len(), 1);
        assert_eq!(engine.parse("contract review").categories, ["legal"]);
    }

    #[test]
    fn response_json_shape() {
        let engine = Engine::default();
        let intent = engine.parse("budget");
        let results = engine.evaluate("budget", &corpus());
        let value = response_json("budget", &intent, &results);

        assert_eq!(value["query"], "budget");
        assert_eq!(value["resultCount"], results.len());
        assert!(value["results"][0]["matchDetails"]["relevance"].is_number());
        assert!(value["intent"]["categories"].is_array());
    }
}
