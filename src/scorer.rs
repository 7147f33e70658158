//! Per-item relevance scoring.
//!
//! Three independent signals are computed against the item's lowercase
//! text: business-category fit, related-concept fit, and an exact folder
//! gate. They are combined into one value in `[0, 1]`. A folder match
//! always lands in the folder band; everything else stays under the
//! heuristic cap.

use serde::{Deserialize, Serialize};

use crate::{
    config::ScoringConfig,
    intent::QueryIntent,
    item::SearchableItem,
    taxonomy::Taxonomy,
};

/// Which signal carried an item into the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Semantic,
    Conceptual,
    Business,
    Hybrid,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Semantic => "semantic",
            Self::Conceptual => "conceptual",
            Self::Business => "business",
            Self::Hybrid => "hybrid",
        }
    }
}

/// Sub-scores and the combined score for one item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemScores {
    pub semantic: f64,
    pub business: f64,
    pub conceptual: f64,
    pub folder: f64,
    pub combined: f64,
    pub match_type: MatchType,
}

pub struct Scorer<'a> {
    taxonomy: &'a Taxonomy,
    scoring: &'a ScoringConfig,
}

impl<'a> Scorer<'a> {
    pub fn new(taxonomy: &'a Taxonomy, scoring: &'a ScoringConfig) -> Self {
        Self { taxonomy, scoring }
    }

    /// Best category fit of `text`; neutral when the intent has none.
    pub fn business_score(&self, text: &str, intent: &QueryIntent) -> f64 {
        if intent.categories.is_empty() {
            return self.scoring.neutral_score;
        }
        intent
            .categories
            .iter()
            .filter_map(|name| self.taxonomy.get(name))
            .map(|concept| concept.business_fit(text, self.scoring))
            .fold(0.0, f64::max)
    }

    /// Related-concept phrases of all matched categories found in `text`.
    pub fn conceptual_score(&self, text: &str, intent: &QueryIntent) -> f64 {
        if intent.categories.is_empty() {
            return self.scoring.neutral_score;
        }
        let total: f64 = intent
            .categories
            .iter()
            .filter_map(|name| self.taxonomy.get(name))
            .map(|concept| concept.related_fit(text, self.scoring))
            .sum();
        total.min(1.0)
    }

    /// 1.0 on an exact folder path match, 0.0 otherwise, neutral when the
    /// intent names no folder.
    pub fn folder_score(
        &self,
        item: &SearchableItem,
        intent: &QueryIntent,
    ) -> f64 {
        let Some(target) = intent.folder_path.as_deref() else {
            return self.scoring.neutral_score;
        };
        let target = target.trim();
        let actual = item.folder_path();

        if actual == target || actual.to_lowercase() == target.to_lowercase() {
            1.0
        } else {
            0.0
        }
    }

    pub fn combine(
        &self,
        semantic: f64,
        business: f64,
        conceptual: f64,
        folder: f64,
    ) -> f64 {
        let s = self.scoring;
        if folder > s.folder_match_threshold {
            return (s.folder_band_base + folder * s.folder_band_bonus)
                .min(s.folder_band_cap);
        }
        let raw = semantic * s.semantic_weight
            + business * s.business_weight
            + conceptual * s.conceptual_weight;
        raw.min(s.heuristic_cap)
    }

    pub fn match_type(
        &self,
        business: f64,
        conceptual: f64,
        folder: f64,
    ) -> MatchType {
        let s = self.scoring;
        let strong_business = business > s.match_type_threshold;
        let strong_conceptual = conceptual > s.match_type_threshold;
        if folder > s.folder_match_threshold
            || (strong_business && strong_conceptual)
        {
            MatchType::Hybrid
        } else if strong_business {
            MatchType::Business
        } else if strong_conceptual {
            MatchType::Conceptual
        } else {
            MatchType::Semantic
        }
    }

    /// Score `item`. `semantic` is the embedding similarity when a model is
    /// available; otherwise the neutral score is used.
    pub fn score(
        &self,
        item: &SearchableItem,
        intent: &QueryIntent,
        semantic: Option<f64>,
    ) -> ItemScores {
        let text = item.text();
        let semantic = semantic.unwrap_or(self.scoring.neutral_score);
        let business = self.business_score(&text, intent);
        let conceptual = self.conceptual_score(&text, intent);
        let folder = self.folder_score(item, intent);

        ItemScores {
            semantic,
            business,
            conceptual,
            folder,
            combined: self.combine(semantic, business, conceptual, folder),
            match_type: self.match_type(business, conceptual, folder),
        }
    }

    /// Whether an item clears the folder gate.
    ///
    /// With an explicit folder in the intent, an item outside it is
    /// excluded no matter how well it scores otherwise.
    pub fn passes_folder_gate(
        &self,
        scores: &ItemScores,
        intent: &QueryIntent,
    ) -> bool {
        intent.folder_path.is_none() || scores.folder > 0.0
    }

    /// Folder gate plus the minimum relevance threshold.
    pub fn is_admitted(
        &self,
        scores: &ItemScores,
        intent: &QueryIntent,
    ) -> bool {
        let t = self.scoring.admission_threshold;
        let any_signal =
            scores.business > t || scores.conceptual > t || scores.folder > t;
        self.passes_folder_gate(scores, intent)
            && any_signal
            && scores.combined > t
    }
}

/// Convert a combined score in `[0, 1]` to a percentage.
pub fn percent(combined: f64) -> u8 {
    (combined * 100.0).round().clamp(0.0, 100.0) as u8
}
