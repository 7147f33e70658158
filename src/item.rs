//! The canonical searchable item and corpus loading.
//!
//! Callers adapt their records into [`SearchableItem`] once; the scorer
//! never branches on which optional fields a record happened to carry.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// The folder an item lives in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
}

/// A document or folder the engine can score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchableItem {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Free-form kind such as `"document"` or `"folder"`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<FolderRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,
}

impl SearchableItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_folder(
        mut self,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        self.folder = Some(FolderRef {
            name: name.into(),
            path: path.into(),
        });
        self
    }

    pub fn with_modified_time(mut self, time: DateTime<Utc>) -> Self {
        self.modified_time = Some(time);
        self
    }

    pub fn with_created_time(mut self, time: DateTime<Utc>) -> Self {
        self.created_time = Some(time);
        self
    }

    /// Lowercase concatenation of name, folder name, path, kind and MIME
    /// type. All keyword rules compare against this text.
    pub fn text(&self) -> String {
        let parts = [
            Some(self.name.as_str()),
            self.folder.as_ref().map(|f| f.name.as_str()),
            self.path.as_deref(),
            self.kind.as_deref(),
            self.mime_type.as_deref(),
        ];
        parts
            .into_iter()
            .flatten()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    /// Path of the containing folder, or `""` when unknown.
    pub fn folder_path(&self) -> &str {
        self.folder.as_ref().map_or("", |f| f.path.trim())
    }

    /// Modification time, falling back to creation time.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.modified_time.or(self.created_time)
    }

    /// Reject items the scorer cannot meaningfully use.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::MalformedItem {
                id: self.name.clone(),
                reason: "missing id".to_string(),
            });
        }
        if self.name.trim().is_empty() {
            return Err(Error::MalformedItem {
                id: self.id.clone(),
                reason: "missing name".to_string(),
            });
        }
        Ok(())
    }
}

fn string_or_number<'de, D>(
    deserializer: D,
) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

/// Parse a corpus from JSON.
///
/// Accepts a plain array of items, `{"documents": [...]}` (every entry
/// becomes a `"document"`), or `{"folders": [...]}` (every entry becomes a
/// `"folder"`).
pub fn corpus_from_json(json: &str) -> Result<Vec<SearchableItem>> {
    let value: serde_json::Value = serde_json::from_str(json)?;

    if value.is_array() {
        return Ok(serde_json::from_value(value)?);
    }

    for (key, kind) in [("documents", "document"), ("folders", "folder")] {
        if let Some(entries) = value.get(key).filter(|v| v.is_array()) {
            let mut items: Vec<SearchableItem> =
                serde_json::from_value(entries.clone())?;
            for item in &mut items {
                item.kind = Some(kind.to_string());
            }
            return Ok(items);
        }
    }

    Err(Error::Config(
        "corpus must be an array, {\"documents\": [...]} or {\"folders\": [...]}"
            .to_string(),
    ))
}

/// Load a corpus file; `-` reads standard input.
pub fn load_corpus(path: &Path) -> Result<Vec<SearchableItem>> {
    let contents = if path.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin())?
    } else {
        std::fs::read_to_string(path)?
    };
    corpus_from_json(&contents)
}
