//! Shared test utilities for the simple-folio test suite.
//!
//! Provides project builders, in-memory stand-ins for the manifest source and
//! asset probe, and a fixture site copied into a temp directory.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let projects = load_fixture_projects(tmp.path());
//! let reel = find_project(&projects, "brand-reel");
//! assert_eq!(reel.title.as_deref(), Some("Brand Reel"));
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

use crate::manifest::{self, DirSource, ManifestError, ManifestSource};
use crate::probe::AssetProbe;
use crate::types::Project;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Load `projects.json` from a fixture copy. Panics on failure.
pub fn load_fixture_projects(root: &Path) -> Vec<Project> {
    manifest::try_load_projects(&DirSource::new(root), "projects.json")
        .unwrap_or_else(|e| panic!("fixture projects.json failed to load: {e}"))
}

// =========================================================================
// Builders
// =========================================================================

/// A project with the given slug, category, and featured flag. The title is
/// the slug, or absent when the slug is empty.
pub fn project(slug: &str, category: &str, featured: bool, rank: Option<f64>) -> Project {
    Project {
        slug: slug.to_string(),
        title: (!slug.is_empty()).then(|| slug.to_string()),
        category: Some(category.to_string()),
        featured,
        feature_rank: rank,
        ..Project::default()
    }
}

/// A small mixed portfolio in manifest order.
pub fn sample_projects() -> Vec<Project> {
    let mut projects = vec![
        project("travel-app", "UI/UX", true, Some(1.0)),
        project("brand-reel", "Editing, Brand Identity", false, None),
        project("river-doc", "Documentaries", true, Some(2.0)),
        project("logo-kit", "Brand Identity", false, None),
        project("bank-dashboard", "UI/UX", false, None),
    ];
    let titles = ["Travel App", "Brand Reel", "River", "logo kit", "Bank Dashboard"];
    for (p, title) in projects.iter_mut().zip(titles) {
        p.title = Some(title.to_string());
    }
    projects
}

// =========================================================================
// Lookups and extractors
// =========================================================================

/// Find a project by slug. Panics if not found.
pub fn find_project<'a>(projects: &'a [Project], slug: &str) -> &'a Project {
    manifest::find_project(projects, slug).unwrap_or_else(|| {
        let slugs: Vec<&str> = projects.iter().map(|p| p.slug.as_str()).collect();
        panic!("project '{slug}' not found. Available: {slugs:?}")
    })
}

/// Slugs of a project list, in order.
pub fn slugs<'a>(projects: &[&'a Project]) -> Vec<&'a str> {
    projects.iter().map(|p| p.slug.as_str()).collect()
}

// =========================================================================
// Stand-ins
// =========================================================================

/// Manifest source backed by a map of path to text.
#[derive(Debug, Default)]
pub struct MemorySource {
    files: BTreeMap<String, String>,
}

impl MemorySource {
    pub fn with(path: &str, text: &str) -> Self {
        let mut source = Self::default();
        source.files.insert(path.to_string(), text.to_string());
        source
    }
}

impl ManifestSource for MemorySource {
    fn fetch(&self, path: &str) -> Result<String, ManifestError> {
        self.files.get(path).cloned().ok_or_else(|| ManifestError::Io {
            path: path.into(),
            source: io::Error::from(io::ErrorKind::NotFound),
        })
    }
}

/// Probe that fails a fixed set of URLs and counts how often it was asked.
#[derive(Debug, Default)]
pub struct StaticProbe {
    missing: BTreeSet<String>,
    calls: AtomicUsize,
}

impl StaticProbe {
    pub fn missing(urls: &[&str]) -> Self {
        Self {
            missing: urls.iter().map(|u| u.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AssetProbe for StaticProbe {
    fn is_available(&self, url: &str) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        !self.missing.contains(url)
    }
}
