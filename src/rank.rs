//! Intent-driven ordering and truncation of scored results.

use std::cmp::Ordering;

use crate::{
    intent::{QueryIntent, Ranking},
    search::ScoredResult,
};

/// Sort `results` as the intent asks and apply its quantity limit.
///
/// Sorting happens before truncation, so "top 3" means the three best
/// results rather than the first three scored.
pub fn apply_intent(
    mut results: Vec<ScoredResult>,
    intent: &QueryIntent,
) -> Vec<ScoredResult> {
    if results.is_empty() {
        if let Some(folder) = intent.folder_path.as_deref() {
            tracing::debug!(folder, "no results inside requested folder");
        }
        return results;
    }

    match intent.ranking {
        None | Some(Ranking::Top | Ranking::MostRelevant) => {
            results.sort_by(by_relevance);
        }
        Some(Ranking::Latest | Ranking::Recent) => {
            results.sort_by(|a, b| b.item.timestamp().cmp(&a.item.timestamp()));
        }
        Some(Ranking::Oldest) => {
            results.sort_by(|a, b| a.item.timestamp().cmp(&b.item.timestamp()));
        }
        Some(Ranking::Any) => {}
    }

    if let Some(n) = intent.quantity {
        results.truncate(n);
    }
    results
}

fn by_relevance(a: &ScoredResult, b: &ScoredResult) -> Ordering {
    b.match_details
        .relevance
        .total_cmp(&a.match_details.relevance)
}
