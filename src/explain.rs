//! Human-readable justification for a result.

use crate::{
    config::ScoringConfig,
    intent::{QueryIntent, Ranking},
    item::SearchableItem,
    scorer::ItemScores,
};

/// Build the explanation for one scored item.
///
/// Each factor contributes at most one sentence, in priority order: folder
/// match, business category, document type, quantity, ranking. When none
/// applies a generic sentence is used.
pub fn explain(
    scores: &ItemScores,
    item: &SearchableItem,
    intent: &QueryIntent,
    scoring: &ScoringConfig,
) -> String {
    let mut sentences: Vec<String> = Vec::new();

    if let Some(folder) = intent.folder_path.as_deref()
        && scores.folder > scoring.folder_match_threshold
    {
        if scores.folder >= 1.0 {
            sentences.push(format!(
                "Perfect folder match: This document is located in {folder}"
            ));
        } else {
            sentences.push(format!(
                "Strong folder match: This document is in the {folder} directory"
            ));
        }
    }

    if scores.business > scoring.explain_business_threshold
        && !intent.categories.is_empty()
    {
        let names = intent
            .categories
            .iter()
            .map(|c| c.replace(" documents", ""))
            .collect::<Vec<_>>()
            .join(", ");
        sentences.push(format!("Matches {names} category"));
    }

    if intent.categories.iter().any(|c| c.contains("document"))
        && item.kind.as_deref() == Some("document")
    {
        sentences.push("Document type matches your request".to_string());
    }

    if let Some(n) = intent.quantity {
        sentences.push(format!("One of the top {n} results as requested"));
    }

    match intent.ranking {
        Some(Ranking::Recent | Ranking::Latest) => {
            sentences.push("Recently modified document".to_string())
        }
        Some(Ranking::Oldest) => {
            sentences.push("Longest-standing document".to_string())
        }
        Some(Ranking::Top | Ranking::MostRelevant) => {
            sentences.push("High relevance to your query".to_string())
        }
        Some(Ranking::Any) | None => {}
    }

    if sentences.is_empty() {
        let fallback = if scores.folder > scoring.neutral_score {
            "Partial folder path match"
        } else if scores.business > scoring.neutral_score {
            "Relevant to your business domain"
        } else {
            "General content relevance"
        };
        sentences.push(fallback.to_string());
    }

    format!("{}.", sentences.join(". "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::MatchType;

    fn scores(business: f64, folder: f64) -> ItemScores {
        ItemScores {
            semantic: 0.5,
            business,
            conceptual: 0.0,
            folder,
            combined: 0.5,
            match_type: MatchType::Semantic,
        }
    }

    fn item() -> SearchableItem {
        SearchableItem::new("1", "Audit Report").with_kind("document")
    }

    #[test]
    fn folder_match_comes_first() {
        let intent = QueryIntent {
            folder_path: Some("/Audit/Reports".into()),
            quantity: Some(2),
            ..Default::default()
        };
        let text = explain(&scores(0.0, 1.0), &item(), &intent, &Default::default());
        assert_eq!(
            text,
            "Perfect folder match: This document is located in /Audit/Reports. \
             One of the top 2 results as requested."
        );
    }

    #[test]
    fn category_and_document_type() {
        let intent = QueryIntent {
            categories: vec!["audit documents".into(), "operations".into()],
            ..Default::default()
        };
        let text = explain(&scores(0.7, 0.5), &item(), &intent, &Default::default());
        assert_eq!(
            text,
            "Matches audit, operations category. \
             Document type matches your request."
        );
    }

    #[test]
    fn ranking_sentence() {
        let intent = QueryIntent {
            ranking: Some(Ranking::Oldest),
            ..Default::default()
        };
        let text = explain(&scores(0.0, 0.5), &item(), &intent, &Default::default());
        assert_eq!(text, "Longest-standing document.");
    }

    #[test]
    fn generic_fallbacks() {
        let intent = QueryIntent::default();
        let scoring = ScoringConfig::default();
        assert_eq!(
            explain(&scores(0.55, 0.5), &item(), &intent, &scoring),
            "Relevant to your business domain."
        );
        assert_eq!(
            explain(&scores(0.2, 0.5), &item(), &intent, &scoring),
            "General content relevance."
        );
        assert_eq!(
            explain(&scores(0.2, 0.6), &item(), &intent, &scoring),
            "Partial folder path match."
        );
    }
}
