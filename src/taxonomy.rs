//! The business concept taxonomy.
//!
//! A taxonomy is plain data: an ordered list of named concepts, each with
//! keyword sets. The built-in table covers the common business areas of a
//! document dashboard; a JSON file with the same shape can replace it.

use std::{path::Path, sync::LazyLock};

use serde::{Deserialize, Serialize};

use crate::{
    config::ScoringConfig,
    error::{Error, Result},
};

/// One named business concept and its keyword sets.
///
/// Keywords are stored lowercase; [`Taxonomy::new`] normalizes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    pub name: String,
    #[serde(default)]
    pub primary: Vec<String>,
    #[serde(default)]
    pub secondary: Vec<String>,
    #[serde(default)]
    pub document_types: Vec<String>,
    #[serde(default)]
    pub folder_patterns: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub related_concepts: Vec<String>,
}

impl Concept {
    fn normalize(mut self) -> Self {
        for set in [
            &mut self.primary,
            &mut self.secondary,
            &mut self.document_types,
            &mut self.folder_patterns,
            &mut self.examples,
            &mut self.related_concepts,
        ] {
            for keyword in set.iter_mut() {
                *keyword = keyword.trim().to_lowercase();
            }
            set.retain(|k| !k.is_empty());
        }
        self
    }

    /// How strongly `query` asks for this concept, in `[0, 1]`.
    ///
    /// A keyword counts once if any whitespace token of the query contains
    /// it or is contained in it.
    pub fn score_query(&self, query: &str, scoring: &ScoringConfig) -> f64 {
        let lower = query.to_lowercase();
        let tokens: Vec<&str> = lower.split_whitespace().collect();
        let hits = |set: &[String]| {
            set.iter()
                .filter(|kw| {
                    tokens
                        .iter()
                        .any(|t| t.contains(kw.as_str()) || kw.contains(t))
                })
                .count() as f64
        };

        let relevance = hits(&self.primary) * scoring.primary_weight
            + hits(&self.secondary) * scoring.secondary_weight
            + hits(&self.document_types) * scoring.document_type_weight;
        relevance.min(1.0)
    }

    /// How well an item's lowercase text fits this concept. Not capped.
    pub fn business_fit(
        &self,
        item_text: &str,
        scoring: &ScoringConfig,
    ) -> f64 {
        count_in(&self.folder_patterns, item_text)
            * scoring.folder_pattern_weight
            + count_in(&self.examples, item_text) * scoring.example_weight
            + count_in(&self.document_types, item_text)
                * scoring.item_document_type_weight
    }

    /// Related-concept contribution for an item's lowercase text. Not capped.
    pub fn related_fit(
        &self,
        item_text: &str,
        scoring: &ScoringConfig,
    ) -> f64 {
        count_in(&self.related_concepts, item_text)
            * scoring.related_concept_weight
    }
}

fn count_in(phrases: &[String], text: &str) -> f64 {
    phrases.iter().filter(|p| text.contains(p.as_str())).count() as f64
}

/// An ordered, read-only collection of concepts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Taxonomy {
    concepts: Vec<Concept>,
}

impl Taxonomy {
    pub fn new(concepts: Vec<Concept>) -> Self {
        Self {
            concepts: concepts.into_iter().map(Concept::normalize).collect(),
        }
    }

    /// The built-in business taxonomy.
    pub fn builtin() -> &'static Taxonomy {
        &BUILTIN
    }

    /// Load a taxonomy from a JSON array of concepts.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let concepts: Vec<Concept> = serde_json::from_str(json)?;
        if let Some(dup) = concepts.iter().enumerate().find_map(|(i, c)| {
            concepts[..i]
                .iter()
                .any(|o| o.name == c.name)
                .then_some(&c.name)
        }) {
            return Err(Error::Config(format!(
                "duplicate concept in taxonomy: {dup}"
            )));
        }
        Ok(Self::new(concepts))
    }

    pub fn concepts(&self) -> &[Concept] {
        &self.concepts
    }

    pub fn get(&self, name: &str) -> Option<&Concept> {
        self.concepts.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }
}

/// Concept relevance of `query` for `concept`, in `[0, 1]`.
pub fn score_concept(
    query: &str,
    concept: &Concept,
    scoring: &ScoringConfig,
) -> f64 {
    concept.score_query(query, scoring)
}

struct ConceptRow {
    name: &'static str,
    primary: &'static [&'static str],
    secondary: &'static [&'static str],
    document_types: &'static [&'static str],
    folder_patterns: &'static [&'static str],
    examples: &'static [&'static str],
    related_concepts: &'static [&'static str],
}

#[rustfmt::skip]
const BUILTIN_ROWS: &[ConceptRow] = &[
    ConceptRow {
        name: "financial reports",
        primary: &["finance", "budget", "revenue", "expense", "accounting", "fiscal"],
        secondary: &["monetary", "economic", "cost", "investment", "cash", "bank"],
        document_types: &["reports", "statements", "summaries", "analysis", "reviews"],
        folder_patterns: &["finance", "budget", "accounting", "reports", "fiscal"],
        examples: &[
            "Q4 Financial Report",
            "Budget Analysis",
            "Revenue Summary",
            "Expense Report",
        ],
        related_concepts: &[
            "budget documents",
            "accounting files",
            "financial statements",
            "expense analysis",
        ],
    },
    ConceptRow {
        name: "marketing materials",
        primary: &["marketing", "campaign", "brand", "advertising", "promotion"],
        secondary: &["social media", "content", "strategy", "market", "customer"],
        document_types: &["materials", "campaigns", "strategies", "plans", "content"],
        folder_patterns: &["marketing", "campaign", "brand", "advertising"],
        examples: &["Marketing Campaign Q4", "Brand Strategy", "Social Media Plan"],
        related_concepts: &[
            "advertising content",
            "promotional materials",
            "brand assets",
        ],
    },
    ConceptRow {
        name: "hr documents",
        primary: &["hr", "human resources", "employee", "personnel", "recruitment"],
        secondary: &["training", "performance", "hiring", "onboarding", "compensation"],
        document_types: &["documents", "policies", "procedures", "guides", "manuals"],
        folder_patterns: &["hr", "human resources", "personnel", "employee"],
        examples: &["Employee Handbook", "HR Policies", "Training Manual"],
        related_concepts: &["employee records", "personnel files", "staff documents"],
    },
    ConceptRow {
        name: "operations",
        primary: &["operations", "process", "workflow", "efficiency", "productivity"],
        secondary: &[
            "quality",
            "optimization",
            "automation",
            "standardization",
            "metrics",
        ],
        document_types: &["procedures", "workflows", "processes", "manuals", "guides"],
        folder_patterns: &["operations", "process", "workflow", "procedures"],
        examples: &[
            "Standard Operating Procedure",
            "Process Manual",
            "Workflow Guide",
        ],
        related_concepts: &[
            "process documents",
            "operational procedures",
            "workflow manuals",
        ],
    },
    ConceptRow {
        name: "technical documents",
        primary: &["technical", "technology", "software", "hardware", "system"],
        secondary: &["development", "implementation", "specification", "architecture"],
        document_types: &["specifications", "documentation", "manuals", "guides"],
        folder_patterns: &["technical", "development", "engineering", "it"],
        examples: &["Technical Specification", "System Documentation", "API Guide"],
        related_concepts: &["tech docs", "engineering documents", "system specs"],
    },
    ConceptRow {
        name: "audit documents",
        primary: &["audit", "compliance", "review", "inspection", "verification"],
        secondary: &["check", "examine", "assess", "evaluate", "validate"],
        document_types: &["reports", "documents", "files", "records", "papers"],
        folder_patterns: &["audit", "compliance", "review", "inspection"],
        examples: &["Audit Report", "Compliance Review", "Inspection Document"],
        related_concepts: &["audit files", "compliance documents", "review papers"],
    },
];

static BUILTIN: LazyLock<Taxonomy> = LazyLock::new(|| {
    let owned = |set: &[&str]| set.iter().map(|s| s.to_string()).collect();
    Taxonomy::new(
        BUILTIN_ROWS
            .iter()
            .map(|row| Concept {
                name: row.name.to_string(),
                primary: owned(row.primary),
                secondary: owned(row.secondary),
                document_types: owned(row.document_types),
                folder_patterns: owned(row.folder_patterns),
                examples: owned(row.examples),
                related_concepts: owned(row.related_concepts),
            })
            .collect(),
    )
});
