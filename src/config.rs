//! Tunable scoring constants and executor settings.
//!
//! All weights, caps and thresholds used by the intent parser, scorer,
//! ranker and explainer live in one [`ScoringConfig`] so that a deployment
//! can retune them from a single JSON file without touching code.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const CONFIG_ENV_VAR: &str = "DOCSENSE_CONFIG";

const CONFIG_FILE_NAME: &str = "config.json";

/// Weights and thresholds for intent detection and relevance scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Concept relevance per primary keyword found in the query.
    pub primary_weight: f64,
    /// Concept relevance per secondary keyword found in the query.
    pub secondary_weight: f64,
    /// Concept relevance per document-type keyword found in the query.
    pub document_type_weight: f64,
    /// A concept must score strictly above this to become a category.
    pub category_threshold: f64,

    /// Business score per folder-pattern keyword found in the item text.
    pub folder_pattern_weight: f64,
    /// Business score per example title found in the item text.
    pub example_weight: f64,
    /// Business score per document-type keyword found in the item text.
    pub item_document_type_weight: f64,
    /// Conceptual score per related-concept phrase found in the item text.
    pub related_concept_weight: f64,

    /// Score reported by a signal that has no opinion.
    pub neutral_score: f64,

    pub semantic_weight: f64,
    pub business_weight: f64,
    pub conceptual_weight: f64,
    /// Upper bound for items that did not match an explicit folder.
    pub heuristic_cap: f64,

    pub folder_band_base: f64,
    pub folder_band_bonus: f64,
    pub folder_band_cap: f64,
    /// A folder score above this counts as a folder match.
    pub folder_match_threshold: f64,

    /// Business/conceptual scores above this decide the match type.
    pub match_type_threshold: f64,
    /// Minimum sub-score and combined score for an item to be admitted.
    pub admission_threshold: f64,
    /// Business score above which the explanation names the categories.
    pub explain_business_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            primary_weight: 0.4,
            secondary_weight: 0.2,
            document_type_weight: 0.3,
            category_threshold: 0.3,
            folder_pattern_weight: 0.4,
            example_weight: 0.3,
            item_document_type_weight: 0.2,
            related_concept_weight: 0.3,
            neutral_score: 0.5,
            semantic_weight: 0.2,
            business_weight: 0.4,
            conceptual_weight: 0.4,
            heuristic_cap: 0.75,
            folder_band_base: 0.8,
            folder_band_bonus: 0.15,
            folder_band_cap: 0.95,
            folder_match_threshold: 0.7,
            match_type_threshold: 0.7,
            admission_threshold: 0.1,
            explain_business_threshold: 0.6,
        }
    }
}

/// Settings for the chunked, debounced search executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Quiet period before a search starts working.
    pub debounce_ms: u64,
    /// Number of items scored between two yields.
    pub chunk_size: usize,
    /// Pause between chunks; zero yields to the scheduler without sleeping.
    pub yield_ms: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            chunk_size: 10,
            yield_ms: 10,
        }
    }
}

impl ExecutorConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn yield_interval(&self) -> Duration {
        Duration::from_millis(self.yield_ms)
    }

    /// Chunk size clamped to at least one item.
    pub fn effective_chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }
}

/// Complete engine configuration as stored in `config.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scoring: ScoringConfig,
    pub executor: ExecutorConfig,
    /// Optional JSON taxonomy replacing the built-in concept table.
    pub taxonomy: Option<PathBuf>,
}

impl EngineConfig {
    /// Load a configuration file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: EngineConfig =
            serde_json::from_str(&contents).map_err(|e| {
                Error::Config(format!(
                    "invalid config file {}: {e}",
                    path.display()
                ))
            })?;
        Ok(config)
    }

    /// Resolve the configuration from, in order of priority:
    /// 1. An explicit path (from --config)
    /// 2. The DOCSENSE_CONFIG environment variable
    /// 3. `$XDG_CONFIG_HOME/docsense/config.json`, if present
    /// 4. Built-in defaults
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let path = if let Some(path) = explicit {
            Some(path.to_path_buf())
        } else if let Ok(val) = std::env::var(CONFIG_ENV_VAR) {
            Some(PathBuf::from(val))
        } else {
            None
        };

        if let Some(path) = path {
            if !path.is_file() {
                return Err(Error::MissingConfig(path));
            }
            return Self::load(&path);
        }

        let xdg_path = xdg::BaseDirectories::with_prefix("docsense")
            .get_config_home()
            .map(|home| home.join(CONFIG_FILE_NAME));
        match xdg_path {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let scoring = ScoringConfig::default();
        assert_eq!(scoring.primary_weight, 0.4);
        assert_eq!(scoring.heuristic_cap, 0.75);
        assert_eq!(scoring.folder_band_cap, 0.95);

        let executor = ExecutorConfig::default();
        assert_eq!(executor.debounce(), Duration::from_millis(300));
        assert_eq!(executor.chunk_size, 10);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"scoring": {"heuristic_cap": 0.6}, "executor": {"chunk_size": 3}}"#,
        )
        .unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.scoring.heuristic_cap, 0.6);
        assert_eq!(config.scoring.primary_weight, 0.4);
        assert_eq!(config.executor.chunk_size, 3);
        assert_eq!(config.executor.debounce_ms, 300);
        assert!(config.taxonomy.is_none());
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope.json");
        let err = EngineConfig::resolve(Some(&missing)).unwrap_err();
        assert!(matches!(err, Error::MissingConfig(p) if p == missing));
    }

    #[test]
    fn invalid_file_is_a_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            EngineConfig::resolve(Some(&path)),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn zero_chunk_size_is_clamped() {
        let executor = ExecutorConfig {
            chunk_size: 0,
            ..Default::default()
        };
        assert_eq!(executor.effective_chunk_size(), 1);
    }
}
