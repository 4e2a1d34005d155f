//! Category labels and the tab bar built from them.
//!
//! Categories are not first-class data: a project's `category` field is a
//! comma-separated string, and a label is any trimmed, non-empty segment of it.
//!
//! ## Matching Rule
//!
//! Every comparison between a selected tab and a project's labels, and between
//! a preferred tab name and the labels present in the data, uses
//! [`labels_match`]: case-insensitive equality, or either string containing the
//! other. `"UI/UX"` therefore matches `"ui/ux design"`.
//!
//! ## Tab Order
//!
//! ```text
//! preferred (resolved, in preference order) → remaining (first appearance) → View all
//! ```

use crate::types::Project;
use maud::{Markup, html};

/// Key of the synthetic tab that shows every project.
pub const ALL_KEY: &str = "all";
/// Label of the synthetic tab that shows every project.
pub const ALL_LABEL: &str = "View all";

/// Split a comma-separated category field into trimmed, non-empty labels.
pub fn split_categories(field: &str) -> impl Iterator<Item = &str> {
    field.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Case-insensitive bidirectional containment.
pub fn labels_match(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    a == b || a.contains(&b) || b.contains(&a)
}

/// Distinct labels across all projects, in order of first appearance.
pub fn collect_categories(projects: &[Project]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for project in projects {
        for label in project.categories() {
            if !labels.iter().any(|l| l == label) {
                labels.push(label.to_string());
            }
        }
    }
    labels
}

/// Resolve a normalized name to the best actual label.
///
/// Exact case-insensitive match wins; otherwise the first label where one
/// string contains the other.
pub fn find_matching_category<'a>(labels: &'a [String], key: &str) -> Option<&'a str> {
    let key = key.to_lowercase();
    labels
        .iter()
        .find(|l| l.to_lowercase() == key)
        .or_else(|| labels.iter().find(|l| labels_match(l, &key)))
        .map(String::as_str)
}

/// One filter control in the tab bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Tab {
    /// Value the view filters on: the label itself, or [`ALL_KEY`].
    pub key: String,
    pub label: String,
    pub active: bool,
}

/// Ordered tab bar with exactly one active tab.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TabSet {
    pub tabs: Vec<Tab>,
}

impl TabSet {
    /// Key of the active tab, or [`ALL_KEY`] when none is marked.
    pub fn active_key(&self) -> &str {
        self.tabs
            .iter()
            .find(|t| t.active)
            .map(|t| t.key.as_str())
            .unwrap_or(ALL_KEY)
    }

    /// Mark the tab with `key` active and every other tab inactive.
    ///
    /// Returns `false` and leaves the set untouched when no tab has that key.
    pub fn activate(&mut self, key: &str) -> bool {
        if !self.tabs.iter().any(|t| t.key == key) {
            return false;
        }
        for tab in &mut self.tabs {
            tab.active = tab.key == key;
        }
        true
    }

    pub fn keys(&self) -> Vec<&str> {
        self.tabs.iter().map(|t| t.key.as_str()).collect()
    }
}

/// Build the tab bar for a project list.
///
/// `preferred` holds normalized names resolved against the actual labels;
/// unresolved names are skipped. The active tab is the label matching
/// `default_key`, or "View all" when nothing matches.
pub fn build_tabs(projects: &[Project], preferred: &[String], default_key: &str) -> TabSet {
    let labels = collect_categories(projects);

    let mut ordered: Vec<&str> = Vec::new();
    for pref in preferred {
        match find_matching_category(&labels, pref) {
            Some(found) if !ordered.contains(&found) => ordered.push(found),
            _ => {}
        }
    }
    for label in &labels {
        if !ordered.contains(&label.as_str()) {
            ordered.push(label);
        }
    }

    let default_active = find_matching_category(&labels, default_key).unwrap_or(ALL_KEY);

    let mut tabs: Vec<Tab> = ordered
        .into_iter()
        .map(|label| Tab {
            key: label.to_string(),
            label: label.to_string(),
            active: false,
        })
        .collect();
    tabs.push(Tab {
        key: ALL_KEY.to_string(),
        label: ALL_LABEL.to_string(),
        active: false,
    });

    let mut set = TabSet { tabs };
    set.activate(default_active);
    set
}

/// Render the tab bar.
///
/// With `href` set, tabs are links (one pre-rendered page per tab); without
/// it they are buttons carrying `data-cat` for an event-driven host.
pub fn render_tabs(tabs: &TabSet, href: Option<&dyn Fn(&str) -> String>) -> Markup {
    html! {
        @for tab in &tabs.tabs {
            @let class = if tab.active { "tab active" } else { "tab" };
            @match href {
                Some(link) => {
                    a class=(class) href=(link(&tab.key)) data-cat=(tab.key) { (tab.label) }
                }
                None => {
                    button class=(class) type="button" data-cat=(tab.key) { (tab.label) }
                }
            }
        }
    }
}
