//! Query understanding.
//!
//! [`parse_query`] turns free text such as `"show me top 3 financial
//! reports"` into a [`QueryIntent`]: how many results, in what order, which
//! business categories, which folder. Parsing never fails; a query with no
//! recognizable cues yields a low-confidence intent with nothing set.

use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    config::ScoringConfig,
    taxonomy::{Taxonomy, score_concept},
};

const BASE_CONFIDENCE: f64 = 0.3;

/// What the user wants done with the matching items.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    #[default]
    Retrieve,
    Filter,
    Sort,
    Count,
    Analyze,
}

/// Requested result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ranking {
    Top,
    Latest,
    Oldest,
    MostRelevant,
    Any,
    Recent,
}

impl Ranking {
    fn from_word(word: &str) -> Option<Self> {
        match word {
            "top" | "first" => Some(Self::Top),
            "latest" | "last" => Some(Self::Latest),
            "oldest" => Some(Self::Oldest),
            "most" | "best" => Some(Self::MostRelevant),
            "any" => Some(Self::Any),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Latest => "latest",
            Self::Oldest => "oldest",
            Self::MostRelevant => "most_relevant",
            Self::Any => "any",
            Self::Recent => "recent",
        }
    }
}

impl fmt::Display for Ranking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured interpretation of a free-text query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryIntent {
    pub action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranking: Option<Ranking>,
    /// Matched concept names, in taxonomy order.
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_path: Option<String>,
    pub confidence: f64,
}

impl Default for QueryIntent {
    fn default() -> Self {
        Self {
            action: Action::Retrieve,
            quantity: None,
            ranking: None,
            categories: Vec::new(),
            time_range: None,
            folder_path: None,
            confidence: BASE_CONFIDENCE,
        }
    }
}

impl QueryIntent {
    fn with_confidence(mut self) -> Self {
        let mut confidence = BASE_CONFIDENCE;
        if self.quantity.is_some() {
            confidence += 0.2;
        }
        if self.ranking.is_some() {
            confidence += 0.2;
        }
        if !self.categories.is_empty() {
            confidence += 0.2;
        }
        if self.time_range.is_some() {
            confidence += 0.1;
        }
        if self.folder_path.is_some() {
            confidence += 0.2;
        }
        self.confidence = confidence.min(1.0);
        self
    }
}

const TIME_WORDS: &[&str] = &["recent", "latest", "oldest", "new", "old"];
const TIME_PHRASES: &[(&str, &str)] = &[("this", "week"), ("last", "month")];

/// Words that end a bare `<name> folder` phrase when walking backwards.
const FOLDER_STOP_WORDS: &[&str] = &[
    "from", "in", "inside", "within", "under", "at", "the", "a", "an", "my",
    "our", "your", "this", "that", "show", "get", "find", "list", "display",
    "retrieve", "bring", "me", "all", "files", "documents", "of",
];

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid number pattern"));

static PREPOSITION_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:from|in|inside|within|under|at)\s*(/[a-z0-9_-]+(?:/[a-z0-9_-]+)*)",
    )
    .expect("valid preposition path pattern")
});

static BARE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)(/[A-Za-z0-9_-]+(?:/[A-Za-z0-9_-]+)*)")
        .expect("valid bare path pattern")
});

static NAMED_FOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)((?:[a-z0-9_-]+\s+)+)folder\b")
        .expect("valid named folder pattern")
});

/// Parse `query` against `taxonomy`.
pub fn parse_query(
    query: &str,
    taxonomy: &Taxonomy,
    scoring: &ScoringConfig,
) -> QueryIntent {
    let lower = query.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let categories = taxonomy
        .concepts()
        .iter()
        .filter(|concept| {
            score_concept(&lower, concept, scoring) > scoring.category_threshold
        })
        .map(|concept| concept.name.clone())
        .collect();

    let intent = QueryIntent {
        action: detect_action(&words),
        quantity: detect_quantity(query),
        ranking: words.iter().find_map(|w| Ranking::from_word(w)),
        categories,
        time_range: detect_time_range(&words),
        folder_path: extract_folder_path(query),
        confidence: BASE_CONFIDENCE,
    }
    .with_confidence();

    tracing::debug!(query, ?intent, "parsed query intent");
    intent
}

fn detect_quantity(query: &str) -> Option<usize> {
    NUMBER
        .find(query)
        .and_then(|m| m.as_str().parse::<usize>().ok())
        .filter(|&n| n > 0)
}

fn detect_action(words: &[&str]) -> Action {
    for (i, word) in words.iter().enumerate() {
        let action = match *word {
            "count" => Some(Action::Count),
            "how" if words.get(i + 1) == Some(&"many") => Some(Action::Count),
            "analyze" | "analyse" | "summarize" | "summarise" | "compare" => {
                Some(Action::Analyze)
            }
            "sort" | "order" | "rank" => Some(Action::Sort),
            "filter" | "only" | "exclude" | "without" => Some(Action::Filter),
            _ => None,
        };
        if let Some(action) = action {
            return action;
        }
    }
    Action::Retrieve
}

fn detect_time_range(words: &[&str]) -> Option<String> {
    for (i, word) in words.iter().enumerate() {
        if let Some(&(first, second)) = TIME_PHRASES
            .iter()
            .find(|(a, b)| a == word && words.get(i + 1) == Some(b))
        {
            return Some(format!("{first} {second}"));
        }
        if TIME_WORDS.contains(word) {
            return Some(word.to_string());
        }
    }
    None
}

/// Find an explicit folder constraint in the query.
///
/// Tried in order, first hit wins: a preposition followed by a `/a/b`
/// path, a bare `/a/b` token, then `<words> folder`, which becomes
/// `/slug-case`.
pub fn extract_folder_path(query: &str) -> Option<String> {
    if let Some(caps) = PREPOSITION_PATH.captures(query) {
        return Some(caps[1].to_string());
    }

    if let Some(caps) = BARE_PATH.captures(query) {
        return Some(caps[1].to_string());
    }

    let caps = NAMED_FOLDER.captures(query)?;
    let lower = caps[1].to_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();
    let start = words
        .iter()
        .rposition(|w| FOLDER_STOP_WORDS.contains(w))
        .map_or(0, |i| i + 1);
    let name = &words[start..];
    if name.is_empty() {
        return None;
    }
    Some(format!("/{}", name.join("-")))
}
