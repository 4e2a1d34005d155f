//! Named render targets.
//!
//! Components never look up elements globally. They receive a
//! [`RenderTargets`] holding the targets the host page actually provides and
//! write into them by name. Writing to a name the host did not provide is a
//! silent no-op, which keeps every component safe on pages that only carry
//! part of the expected markup and lets tests run without a document.

use maud::{Markup, html};
use std::collections::{BTreeMap, BTreeSet};

/// Grid of project cards.
pub const PROJECTS_GRID: &str = "projectsGrid";
/// Category tab bar.
pub const PROJECT_TABS: &str = "projectTabs";
/// Sort control.
pub const SORT_SELECT: &str = "sortSelect";
pub const PROJECT_TITLE: &str = "projectTitle";
pub const PROJECT_DESC: &str = "projectDesc";
pub const PROJECT_META: &str = "projectMeta";
pub const PROJECT_HERO: &str = "projectHero";
pub const PROJECT_BODY: &str = "projectBody";
/// Featured picks on the home page.
pub const HOME_PROJECTS: &str = "homeProjects";
pub const LIKE_COUNT: &str = "likeCount";

/// Contents and state of one target element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Target {
    /// Inner HTML.
    pub html: String,
    pub classes: BTreeSet<String>,
    listeners: BTreeSet<String>,
}

impl Target {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

/// The set of targets a host page provides.
#[derive(Debug, Clone, Default)]
pub struct RenderTargets {
    targets: BTreeMap<String, Target>,
}

impl RenderTargets {
    /// Targets for the given names, all empty.
    pub fn with_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            targets: ids
                .into_iter()
                .map(|id| (id.to_string(), Target::default()))
                .collect(),
        }
    }

    pub fn has(&self, id: &str) -> bool {
        self.targets.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Target> {
        self.targets.get(id)
    }

    /// Inner HTML of a target, empty when absent.
    pub fn html(&self, id: &str) -> &str {
        self.targets.get(id).map(|t| t.html.as_str()).unwrap_or("")
    }

    pub fn set_html(&mut self, id: &str, markup: Markup) {
        if let Some(target) = self.targets.get_mut(id) {
            target.html = markup.into_string();
        }
    }

    /// Replace the contents with escaped text.
    pub fn set_text(&mut self, id: &str, text: &str) {
        self.set_html(id, html! { (text) });
    }

    pub fn clear(&mut self, id: &str) {
        if let Some(target) = self.targets.get_mut(id) {
            target.html.clear();
        }
    }

    pub fn add_class(&mut self, id: &str, class: &str) {
        if let Some(target) = self.targets.get_mut(id) {
            target.classes.insert(class.to_string());
        }
    }

    pub fn remove_class(&mut self, id: &str, class: &str) {
        if let Some(target) = self.targets.get_mut(id) {
            target.classes.remove(class);
        }
    }

    /// Attach a named listener once.
    ///
    /// Returns `true` only when the listener was newly attached; a second
    /// attach of the same event is ignored, as is an attach on a missing target.
    pub fn attach_listener(&mut self, id: &str, event: &str) -> bool {
        match self.targets.get_mut(id) {
            Some(target) => target.listeners.insert(event.to_string()),
            None => false,
        }
    }

    pub fn has_listener(&self, id: &str, event: &str) -> bool {
        self.targets
            .get(id)
            .is_some_and(|t| t.listeners.contains(event))
    }
}
