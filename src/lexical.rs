//! Plain substring search over item fields, for filter boxes that need
//! instant feedback without intent parsing.

use std::{fmt, ops::Range, str::FromStr};

use serde::Serialize;

use crate::item::SearchableItem;

/// A searchable field of [`SearchableItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    Path,
    Type,
    MimeType,
    Folder,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Path => "path",
            Self::Type => "type",
            Self::MimeType => "mimeType",
            Self::Folder => "folder",
        }
    }

    fn value<'a>(&self, item: &'a SearchableItem) -> Option<&'a str> {
        let value = match self {
            Self::Name => Some(item.name.as_str()),
            Self::Path => item.path.as_deref(),
            Self::Type => item.kind.as_deref(),
            Self::MimeType => item.mime_type.as_deref(),
            Self::Folder => item.folder.as_ref().map(|f| f.name.as_str()),
        };
        value.filter(|v| !v.is_empty())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "path" => Ok(Self::Path),
            "type" => Ok(Self::Type),
            "mimeType" | "mime-type" | "mime" => Ok(Self::MimeType),
            "folder" => Ok(Self::Folder),
            other => Err(format!(
                "unknown field '{other}' (expected name, path, type, mimeType or folder)"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LexicalOptions {
    pub fields: Vec<Field>,
    pub case_sensitive: bool,
    pub exact: bool,
    /// Queries shorter than this many characters match nothing.
    pub min_length: usize,
}

impl Default for LexicalOptions {
    fn default() -> Self {
        Self {
            fields: vec![Field::Name],
            case_sensitive: false,
            exact: false,
            min_length: 1,
        }
    }
}

/// Where the query matched inside one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Highlight {
    pub field: Field,
    pub value: String,
    /// Byte range of the match in the compared value, which is lowercased
    /// unless the search is case sensitive.
    pub range: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LexicalMatch<'a> {
    pub item: &'a SearchableItem,
    pub score: u32,
    pub matched_fields: Vec<Field>,
    pub highlights: Vec<Highlight>,
}

const EXACT_SCORE: u32 = 100;
const PREFIX_SCORE: u32 = 50;
const INFIX_SCORE: u32 = 25;
const MAX_LENGTH_SCORE: u32 = 30;

/// Search `items` for `query` in the configured fields.
///
/// Each matching field adds to the item's score: 100 for an exact match,
/// otherwise 50 for a prefix or 25 for any other position, plus twice the
/// query length capped at 30. Results are sorted by descending score; ties
/// keep corpus order.
pub fn search_fields<'a>(
    items: &'a [SearchableItem],
    query: &str,
    options: &LexicalOptions,
) -> Vec<LexicalMatch<'a>> {
    let query_len = query.chars().count();
    if query.is_empty() || query_len < options.min_length.max(1) {
        return Vec::new();
    }

    let fold = |s: &str| {
        if options.case_sensitive {
            s.to_string()
        } else {
            s.to_lowercase()
        }
    };
    let needle = fold(query);
    let length_score = (query_len as u32).saturating_mul(2).min(MAX_LENGTH_SCORE);

    let mut matches: Vec<LexicalMatch<'a>> = items
        .iter()
        .filter_map(|item| {
            let mut score = 0;
            let mut matched_fields = Vec::new();
            let mut highlights = Vec::new();

            for &field in &options.fields {
                let Some(value) = field.value(item) else {
                    continue;
                };
                let haystack = fold(value);

                let hit = if options.exact {
                    (haystack == needle)
                        .then(|| (EXACT_SCORE, 0..haystack.len()))
                } else {
                    haystack.find(&needle).map(|at| {
                        let position =
                            if at == 0 { PREFIX_SCORE } else { INFIX_SCORE };
                        (position + length_score, at..at + needle.len())
                    })
                };

                if let Some((points, range)) = hit {
                    score += points;
                    matched_fields.push(field);
                    highlights.push(Highlight {
                        field,
                        value: value.to_string(),
                        range,
                    });
                }
            }

            (score > 0).then_some(LexicalMatch {
                item,
                score,
                matched_fields,
                highlights,
            })
        })
        .collect();

    matches.sort_by(|a, b| b.score.cmp(&a.score));
    matches
}
