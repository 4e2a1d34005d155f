//! Manifest loading and normalization.
//!
//! A manifest is a JSON document listing projects in one of two shapes:
//!
//! ```text
//! [ { "slug": "a", ... }, { "slug": "b", ... } ]        array: used as-is, order kept
//! { "a": { ... }, "b": { "slug": "bee", ... } }          keyed: key injected as slug
//! ```
//!
//! In the keyed shape an explicit non-empty `slug` inside the value wins over
//! the map key. The key is still kept on the record as `source_key` so that a
//! detail lookup by key keeps working. Any other top-level shape yields an
//! empty list.
//!
//! Loading never raises to the page: [`load_projects`] logs the failure and
//! returns `None`, and the caller renders its own fallback message.

use crate::types::Project;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where manifests are fetched from.
///
/// Every call is a fresh read; implementations must not cache.
pub trait ManifestSource {
    fn fetch(&self, path: &str) -> Result<String, ManifestError>;
}

/// Reads manifests relative to a site directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ManifestSource for DirSource {
    fn fetch(&self, path: &str) -> Result<String, ManifestError> {
        let full = self.root.join(path.trim_start_matches('/'));
        fs::read_to_string(&full).map_err(|source| ManifestError::Io { path: full, source })
    }
}

/// Normalize a parsed manifest into an ordered project list.
pub fn normalize(value: Value) -> Vec<Project> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter_map(|(idx, item)| match serde_json::from_value::<Project>(item) {
                Ok(project) => Some(project),
                Err(e) => {
                    warn!(index = idx, "skipping malformed manifest entry: {e}");
                    None
                }
            })
            .collect(),
        Value::Object(map) => map
            .into_iter()
            .filter_map(|(key, item)| match serde_json::from_value::<Project>(item) {
                Ok(mut project) => {
                    if project.slug.is_empty() {
                        project.slug = key.clone();
                    }
                    project.source_key = Some(key);
                    Some(project)
                }
                Err(e) => {
                    warn!(key = %key, "skipping malformed manifest entry: {e}");
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Parse manifest text into projects.
pub fn parse_manifest(text: &str) -> Result<Vec<Project>, ManifestError> {
    let value: Value = serde_json::from_str(text)?;
    Ok(normalize(value))
}

/// Fetch and parse a manifest, surfacing the error.
pub fn try_load_projects(
    source: &dyn ManifestSource,
    path: &str,
) -> Result<Vec<Project>, ManifestError> {
    let text = source.fetch(path)?;
    let projects = parse_manifest(&text)?;
    debug!(path, count = projects.len(), "loaded manifest");
    Ok(projects)
}

/// Fetch and parse a manifest; `None` on any failure.
pub fn load_projects(source: &dyn ManifestSource, path: &str) -> Option<Vec<Project>> {
    match try_load_projects(source, path) {
        Ok(projects) => Some(projects),
        Err(e) => {
            error!(path, "error loading {path}: {e}");
            None
        }
    }
}

/// Find a project by slug.
///
/// A record stored under `slug` as its map key is preferred; otherwise the
/// first record whose `slug` field equals it.
pub fn find_project<'a>(projects: &'a [Project], slug: &str) -> Option<&'a Project> {
    projects
        .iter()
        .find(|p| p.source_key.as_deref() == Some(slug))
        .or_else(|| projects.iter().find(|p| p.slug == slug))
}
