//! Off-render asset probing.
//!
//! Pages render first and probe afterwards. Each asset is checked on its own,
//! in parallel, and one failure never affects another: the result is just the
//! set of paths that failed, which the caller turns into per-element fallbacks.

use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Answers whether an asset would load.
pub trait AssetProbe: Sync {
    fn is_available(&self, url: &str) -> bool;
}

/// Probes assets against the files of a site directory.
///
/// URLs under `origin` and relative paths map to files below `root`; URLs on
/// any other host are assumed reachable.
#[derive(Debug, Clone)]
pub struct SiteRootProbe {
    root: PathBuf,
    origin: String,
}

impl SiteRootProbe {
    pub fn new(root: impl Into<PathBuf>, origin: &str) -> Self {
        Self {
            root: root.into(),
            origin: origin.trim_end_matches('/').to_string(),
        }
    }

    /// Local file an asset URL refers to, if it is one of ours.
    pub fn local_path(&self, url: &str) -> Option<PathBuf> {
        let under_origin = url
            .strip_prefix(&self.origin)
            .filter(|rest| rest.is_empty() || rest.starts_with(['/', '?', '#']));
        let rel = match under_origin {
            Some(rest) if !self.origin.is_empty() => rest,
            _ if url.contains("://") || url.starts_with("//") => return None,
            _ => url,
        };
        let rel = rel.split(['?', '#']).next().unwrap_or("");
        let rel = urlencoding::decode(rel)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| rel.to_string());
        let rel = rel.trim_start_matches("./").trim_start_matches('/');
        Some(self.root.join(Path::new(rel)))
    }
}

impl AssetProbe for SiteRootProbe {
    fn is_available(&self, url: &str) -> bool {
        match self.local_path(url) {
            Some(path) => path.is_file(),
            None => true,
        }
    }
}

/// Answers from an earlier probe run instead of touching the filesystem again.
#[derive(Debug, Clone, Copy)]
pub struct KnownBroken<'a>(pub &'a BTreeSet<String>);

impl AssetProbe for KnownBroken<'_> {
    fn is_available(&self, url: &str) -> bool {
        !self.0.contains(url)
    }
}

/// Probe `urls` in parallel; returns those that failed.
pub fn find_broken(probe: &dyn AssetProbe, urls: &[String]) -> BTreeSet<String> {
    urls.par_iter()
        .filter(|url| !probe.is_available(url))
        .inspect(|url| warn!(asset = %url, "asset failed to load"))
        .cloned()
        .collect()
}
