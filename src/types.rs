//! Project records shared by every renderer.
//!
//! Records come straight from hand-edited JSON, so deserialization is lenient:
//! unknown keys are ignored, text fields accept numbers and treat any other
//! non-string as absent, `featured` follows JavaScript truthiness, and a
//! `media` value that is not an array counts as no media at all. Only an
//! entry that is not an object at all fails to load.

use crate::category;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single portfolio project as listed in a manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Identifier used in detail links and lookups. Empty when the manifest
    /// omits it for an array entry.
    #[serde(default, deserialize_with = "scalar_or_empty")]
    pub slug: String,
    /// Map key the record was stored under, for keyed manifests.
    #[serde(skip)]
    pub source_key: Option<String>,
    #[serde(default, deserialize_with = "display_scalar")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "display_scalar")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "display_scalar")]
    pub excerpt: Option<String>,
    /// Comma-separated category labels, e.g. `"Editing, UI/UX"`.
    #[serde(default, deserialize_with = "display_scalar")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "display_scalar")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "truthy")]
    pub featured: bool,
    #[serde(default, deserialize_with = "number")]
    pub feature_rank: Option<f64>,
    #[serde(default, deserialize_with = "display_scalar")]
    pub cover: Option<String>,
    #[serde(default, deserialize_with = "media_list")]
    pub media: Vec<MediaEntry>,
    #[serde(default, deserialize_with = "display_scalar")]
    pub thumb: Option<String>,
}

/// One entry of a project's `media` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MediaEntry {
    /// Bare path or URL.
    Path(String),
    /// Object form: `{ "file": "...", "type": "video" }` or `{ "src": "..." }`.
    Asset {
        #[serde(default)]
        file: Option<String>,
        #[serde(default)]
        src: Option<String>,
        #[serde(default, rename = "type")]
        kind: Option<String>,
    },
}

/// How a media entry is presented on the detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaEntry {
    /// Path of the asset: `file`, then `src`, else empty.
    pub fn path(&self) -> &str {
        match self {
            MediaEntry::Path(p) => p,
            MediaEntry::Asset { file, src, .. } => non_empty(file.as_deref())
                .or_else(|| non_empty(src.as_deref()))
                .unwrap_or(""),
        }
    }

    /// The explicit `type` field, if any.
    pub fn declared_kind(&self) -> Option<&str> {
        match self {
            MediaEntry::Path(_) => None,
            MediaEntry::Asset { kind, .. } => non_empty(kind.as_deref()),
        }
    }
}

impl Project {
    /// Title shown on cards and detail pages: `title`, falling back to the slug.
    pub fn display_title(&self) -> &str {
        non_empty(self.title.as_deref()).unwrap_or(&self.slug)
    }

    /// Long-form text: `description`, then `excerpt`.
    pub fn summary(&self) -> &str {
        non_empty(self.description.as_deref())
            .or_else(|| non_empty(self.excerpt.as_deref()))
            .unwrap_or("")
    }

    /// Grid thumbnail: `thumb`, then `cover`, then the first media entry.
    pub fn thumbnail(&self) -> Option<&str> {
        non_empty(self.thumb.as_deref())
            .or_else(|| non_empty(self.cover.as_deref()))
            .or_else(|| self.media.first().map(MediaEntry::path).filter(|p| !p.is_empty()))
    }

    /// Category labels split out of the comma-separated field.
    pub fn categories(&self) -> Vec<&str> {
        self.category
            .as_deref()
            .map(|c| category::split_categories(c).collect())
            .unwrap_or_default()
    }

    /// Media for the detail gallery; a lone cover stands in when `media` is empty.
    pub fn gallery_entries(&self) -> Vec<MediaEntry> {
        if !self.media.is_empty() {
            return self.media.clone();
        }
        match non_empty(self.cover.as_deref()) {
            Some(cover) => vec![MediaEntry::Path(cover.to_string())],
            None => Vec::new(),
        }
    }
}

pub(crate) fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

fn display_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn scalar_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    display_scalar(deserializer).map(Option::unwrap_or_default)
}

fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
        Value::Null => false,
    })
}

fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn media_list<'de, D>(deserializer: D) -> Result<Vec<MediaEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(MediaEntry::Path(s)),
            obj @ Value::Object(_) => serde_json::from_value(obj).ok(),
            _ => None,
        })
        .collect())
}
