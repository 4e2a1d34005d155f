//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a `config.toml` in the site source directory overrides any
//! subset of them.
//!
//! ## Config File Location
//!
//! ```text
//! site/
//! ├── config.toml          # Overrides stock defaults
//! ├── projects.json        # Projects page manifest
//! ├── manifest.json        # Home page manifest
//! └── assets/
//!     └── ...
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "Portfolio"
//! origin = ""                 # Absolute origin for asset URLs, e.g. "https://me.dev"
//! detail_links = "pages"      # "pages" (project/<slug>.html) or "query" (project.html?slug=)
//!
//! [[site.nav]]
//! label = "Home"
//! href = "index.html"
//!
//! [manifests]
//! projects = "projects.json"
//! home = "manifest.json"
//!
//! [tabs]
//! preferred_order = ["ui/ux", "brand identity", "documentaries", "editing"]
//! default_category = "ui/ux"
//!
//! [view]
//! default_sort = "featured"   # "featured" or "title"
//!
//! [home]
//! featured_count = 3
//!
//! [motion]
//! lazy_threshold = 0.03
//! lazy_root_margin = 240.0
//! reveal_threshold = 0.12
//! hero_reveal_threshold = 0.4
//! counter_threshold = 0.6
//! counter_duration_ms = 900.0
//! scroll_cue_min_px = 120.0
//! scroll_cue_fraction = 0.35
//! hero_fold_margin = -40.0
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse, so override just the values you want:
//!
//! ```toml
//! [home]
//! featured_count = 4
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::nav::NavLink;
use crate::view::{DetailLinks, SortKey};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Identity, link style, and navigation.
    pub site: SiteSection,
    /// Manifest file names, relative to the source directory.
    pub manifests: ManifestsConfig,
    /// Category tab ordering.
    pub tabs: TabsConfig,
    /// Projects grid defaults.
    pub view: ViewConfig,
    /// Landing page.
    pub home: HomeConfig,
    /// Lazy loading and reveal tuning, shipped to the browser script.
    pub motion: MotionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    pub title: String,
    /// Absolute origin prepended to relative asset paths. Empty keeps them root-relative.
    pub origin: String,
    pub detail_links: DetailLinks,
    pub nav: Vec<NavLink>,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: "Portfolio".to_string(),
            origin: String::new(),
            detail_links: DetailLinks::default(),
            nav: vec![
                NavLink {
                    label: "Home".to_string(),
                    href: "index.html".to_string(),
                },
                NavLink {
                    label: "Projects".to_string(),
                    href: "projects.html".to_string(),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestsConfig {
    pub projects: String,
    pub home: String,
}

impl Default for ManifestsConfig {
    fn default() -> Self {
        Self {
            projects: "projects.json".to_string(),
            home: "manifest.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TabsConfig {
    /// Categories that lead the tab bar, in this order, when present.
    pub preferred_order: Vec<String>,
    /// Tab selected on first load; falls back to "View all" when absent.
    pub default_category: String,
}

impl Default for TabsConfig {
    fn default() -> Self {
        Self {
            preferred_order: ["ui/ux", "brand identity", "documentaries", "editing"]
                .into_iter()
                .map(String::from)
                .collect(),
            default_category: "ui/ux".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
    pub default_sort: SortKey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HomeConfig {
    pub featured_count: usize,
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self { featured_count: 3 }
    }
}

/// Thresholds are intersection ratios (0-1); margins and distances are pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MotionConfig {
    pub lazy_threshold: f64,
    pub lazy_root_margin: f64,
    pub reveal_threshold: f64,
    pub hero_reveal_threshold: f64,
    pub counter_threshold: f64,
    pub counter_duration_ms: f64,
    pub scroll_cue_min_px: f64,
    pub scroll_cue_fraction: f64,
    pub hero_fold_margin: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            lazy_threshold: 0.03,
            lazy_root_margin: 240.0,
            reveal_threshold: 0.12,
            hero_reveal_threshold: 0.4,
            counter_threshold: 0.6,
            counter_duration_ms: 900.0,
            scroll_cue_min_px: 120.0,
            scroll_cue_fraction: 0.35,
            hero_fold_margin: -40.0,
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.site.origin.is_empty() && url::Url::parse(&self.site.origin).is_err() {
            return Err(ConfigError::Validation(format!(
                "site.origin must be an absolute URL, got {:?}",
                self.site.origin
            )));
        }
        if self.manifests.projects.trim().is_empty() || self.manifests.home.trim().is_empty() {
            return Err(ConfigError::Validation(
                "manifests.projects and manifests.home must not be empty".into(),
            ));
        }
        if self.home.featured_count == 0 {
            return Err(ConfigError::Validation(
                "home.featured_count must be at least 1".into(),
            ));
        }
        let ratios = [
            ("motion.lazy_threshold", self.motion.lazy_threshold),
            ("motion.reveal_threshold", self.motion.reveal_threshold),
            ("motion.hero_reveal_threshold", self.motion.hero_reveal_threshold),
            ("motion.counter_threshold", self.motion.counter_threshold),
            ("motion.scroll_cue_fraction", self.motion.scroll_cue_fraction),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Validation(format!("{name} must be 0-1")));
            }
        }
        if self.motion.counter_duration_ms <= 0.0 {
            return Err(ConfigError::Validation(
                "motion.counter_duration_ms must be positive".into(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key by key; anything else in `overlay` (arrays included)
/// replaces the base value outright.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `config.toml`.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory, over stock defaults.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Simple Folio Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file next to projects.json in the site source directory.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
[site]
# Shown in the page <title> and header.
title = "Portfolio"

# Absolute origin prepended to relative asset paths, e.g. "https://me.dev".
# Leave empty to keep asset paths relative to the site root.
origin = ""

# How cards link to project pages:
#   "pages" -> project/<slug>.html, one pre-rendered page per project
#   "query" -> project.html?slug=<slug>, for hosts that render on request
detail_links = "pages"

# Top navigation. The link matching the current page is highlighted.
[[site.nav]]
label = "Home"
href = "index.html"

[[site.nav]]
label = "Projects"
href = "projects.html"

# ---------------------------------------------------------------------------
# Manifests (relative to the source directory)
# ---------------------------------------------------------------------------
[manifests]
# Projects page: array of projects, or an object keyed by slug.
projects = "projects.json"

# Home page featured picks.
home = "manifest.json"

# ---------------------------------------------------------------------------
# Category tabs
# ---------------------------------------------------------------------------
[tabs]
# Categories listed first, in this order, when any project uses them.
# Matching ignores case, then falls back to one name containing the other,
# so "ui/ux" also picks up "UI/UX Design".
preferred_order = ["ui/ux", "brand identity", "documentaries", "editing"]

# Tab selected on first load. Falls back to "View all" when no project has it.
default_category = "ui/ux"

# ---------------------------------------------------------------------------
# Projects grid
# ---------------------------------------------------------------------------
[view]
# "featured" (featured first, manifest order otherwise) or "title" (A-Z).
default_sort = "featured"

# ---------------------------------------------------------------------------
# Home page
# ---------------------------------------------------------------------------
[home]
# Number of featured cards. At most one per category until the categories
# run out, then any remaining featured projects fill in.
featured_count = 3

# ---------------------------------------------------------------------------
# Motion (lazy loading, reveals, counters, scroll cue)
# ---------------------------------------------------------------------------
[motion]
# Visible fraction that starts a lazy image load, and the pre-load margin (px).
lazy_threshold = 0.03
lazy_root_margin = 240.0

# Visible fraction that reveals a fade-up element, or the hero.
reveal_threshold = 0.12
hero_reveal_threshold = 0.4

# Visible fraction that starts a counter, and its animation length.
counter_threshold = 0.6
counter_duration_ms = 900.0

# The scroll cue hides past max(min_px, fraction x viewport height).
scroll_cue_min_px = 120.0
scroll_cue_fraction = 0.35

# Margin (px) for the hero fold observer; negative shrinks the viewport.
hero_fold_margin = -40.0
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_manifests() {
        let config = SiteConfig::default();
        assert_eq!(config.manifests.projects, "projects.json");
        assert_eq!(config.manifests.home, "manifest.json");
    }

    #[test]
    fn default_config_has_tabs() {
        let config = SiteConfig::default();
        assert_eq!(config.tabs.default_category, "ui/ux");
        assert_eq!(config.tabs.preferred_order.len(), 4);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[home]
featured_count = 5
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.home.featured_count, 5);
        // Defaults preserved
        assert_eq!(config.site.title, "Portfolio");
        assert_eq!(config.motion.counter_duration_ms, 900.0);
    }

    #[test]
    fn parse_enum_settings() {
        let toml = r#"
[site]
detail_links = "query"

[view]
default_sort = "title"
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.site.detail_links, DetailLinks::Query);
        assert_eq!(config.view.default_sort, SortKey::Title);
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[site]
title = "Ada Studio"
origin = "https://ada.dev"

[tabs]
default_category = "editing"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site.title, "Ada Studio");
        assert_eq!(config.site.origin, "https://ada.dev");
        assert_eq!(config.tabs.default_category, "editing");
        // Unspecified values should be defaults
        assert_eq!(config.tabs.preferred_order.len(), 4);
        assert_eq!(config.site.nav.len(), 2);
    }

    #[test]
    fn nav_overlay_replaces_whole_list() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[[site.nav]]
label = "Work"
href = "projects.html"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site.nav.len(), 1);
        assert_eq!(config.site.nav[0].label, "Work");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[home]
featured_count = 3

[view]
default_sort = "featured"
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[home]
featured_count = 6
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let home = merged.get("home").unwrap();
        assert_eq!(home.get("featured_count").unwrap().as_integer(), Some(6));
        // view preserved from base
        assert_eq!(
            merged.get("view").unwrap().get("default_sort").unwrap().as_str(),
            Some("featured")
        );
    }

    #[test]
    fn merge_toml_arrays_replace() {
        let base: toml::Value = toml::from_str(r#"order = ["a", "b", "c"]"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"order = ["z"]"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("order").unwrap().as_array().unwrap().len(), 1);
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[home]
featured = 3
"#;
        let result: Result<SiteConfig, _> = toml::from_str(toml_str);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[homepage]\ncount = 3\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_nav_key_rejected() {
        let toml_str = r#"
[[site.nav]]
label = "Home"
url = "index.html"
"#;
        let result: Result<SiteConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_relative_origin() {
        let mut config = SiteConfig::default();
        config.site.origin = "me.dev".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("site.origin"));
    }

    #[test]
    fn validate_rejects_zero_featured_count() {
        let mut config = SiteConfig::default();
        config.home.featured_count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_ratio_bounds() {
        let mut config = SiteConfig::default();
        config.motion.reveal_threshold = 1.0;
        assert!(config.validate().is_ok());
        config.motion.reveal_threshold = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("motion.reveal_threshold"));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[motion]\ncounter_duration_ms = 0.0\n",
        )
        .unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        for section in ["[site]", "[[site.nav]]", "[manifests]", "[tabs]", "[view]", "[home]", "[motion]"] {
            assert!(content.contains(section), "missing {section}");
        }
    }

    #[test]
    fn stock_tab_names_match_by_case_then_containment() {
        let tabs = SiteConfig::default().tabs;
        let labels = vec!["UI UX".to_string(), "Brand Identity Work".to_string()];
        let found = |name: &str| crate::category::find_matching_category(&labels, name);
        assert_eq!(found(&tabs.preferred_order[1]), Some("Brand Identity Work"));
        assert_eq!(found(&tabs.default_category), None);
        assert!(stock_config_toml().contains("one name containing the other"));
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        for section in ["site", "manifests", "tabs", "view", "home", "motion"] {
            assert!(val.get(section).is_some(), "missing {section}");
        }
    }

    #[test]
    fn resolve_config_with_overlay() {
        let overlay: toml::Value = toml::from_str("[view]\ndefault_sort = \"title\"\n").unwrap();
        let config = resolve_config(stock_defaults_value(), Some(overlay)).unwrap();
        assert_eq!(config.view.default_sort, SortKey::Title);
        assert_eq!(config.home.featured_count, 3);
    }
}
