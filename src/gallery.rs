//! The projects page as explicit state plus events.
//!
//! All page state lives in one [`GalleryState`]: the loaded projects (or the
//! load error), the tab bar, the sort key, and the set of thumbnails known to
//! be broken. [`GalleryState::apply`] is the only transition function, and
//! [`render`] writes the state into whatever targets the host provides.
//!
//! ```text
//! load → GalleryState::new → mount (tabs + listener, first render)
//!                              │
//!       TabClicked / SortChanged / ThumbnailsProbed → apply → render
//! ```
//!
//! Thumbnail probing runs after the first render and feeds back in as an
//! event, so a slow or failing image never delays the grid.

use crate::category::{self, TabSet};
use crate::config::TabsConfig;
use crate::probe::{self, AssetProbe};
use crate::targets::{PROJECT_TABS, PROJECTS_GRID, RenderTargets, SORT_SELECT};
use crate::types::Project;
use crate::view::{self, DetailLinks, SortKey};
use std::collections::BTreeSet;
use tracing::debug;

/// Event name of the tab bar's click listener.
pub const TAB_CLICK: &str = "click";

/// Everything the projects page displays.
#[derive(Debug, Clone)]
pub struct GalleryState {
    pub projects: Vec<Project>,
    /// Set when the manifest could not be loaded.
    pub load_error: Option<String>,
    pub tabs: TabSet,
    pub sort: SortKey,
    pub links: DetailLinks,
    pub broken_thumbs: BTreeSet<String>,
}

/// Input the page reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum GalleryEvent {
    TabClicked(String),
    SortChanged(SortKey),
    ThumbnailsProbed(BTreeSet<String>),
}

impl GalleryState {
    /// Initial state from a load result.
    pub fn new(
        loaded: Result<Vec<Project>, String>,
        tabs_config: &TabsConfig,
        sort: SortKey,
        links: DetailLinks,
    ) -> Self {
        let (projects, load_error) = match loaded {
            Ok(projects) => (projects, None),
            Err(reason) => (Vec::new(), Some(reason)),
        };
        let tabs = category::build_tabs(
            &projects,
            &tabs_config.preferred_order,
            &tabs_config.default_category,
        );
        Self {
            projects,
            load_error,
            tabs,
            sort,
            links,
            broken_thumbs: BTreeSet::new(),
        }
    }

    /// Apply an event. Returns whether the page needs re-rendering.
    pub fn apply(&mut self, event: GalleryEvent) -> bool {
        match event {
            GalleryEvent::TabClicked(key) => self.tabs.activate(&key),
            GalleryEvent::SortChanged(sort) => {
                let changed = self.sort != sort;
                self.sort = sort;
                changed
            }
            GalleryEvent::ThumbnailsProbed(broken) => {
                if broken == self.broken_thumbs {
                    return false;
                }
                self.broken_thumbs = broken;
                true
            }
        }
    }

    pub fn active_category(&self) -> &str {
        self.tabs.active_key()
    }

    /// Projects currently shown, filtered and sorted.
    pub fn visible(&self) -> Vec<&Project> {
        view::visible_projects(&self.projects, self.active_category(), self.sort)
    }

    /// Every distinct thumbnail path, for probing.
    pub fn thumbnails(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self.projects.iter().filter_map(Project::thumbnail).collect();
        set.into_iter().map(str::to_string).collect()
    }
}

/// Write the grid and sort control for `state` into `targets`.
pub fn render(state: &GalleryState, targets: &mut RenderTargets) {
    targets.add_class(PROJECTS_GRID, "projects-grid");
    match &state.load_error {
        Some(reason) => targets.set_html(PROJECTS_GRID, view::render_load_error(reason)),
        None => {
            let visible = state.visible();
            targets.set_html(
                PROJECTS_GRID,
                view::render_grid(&visible, state.links, &state.broken_thumbs),
            );
        }
    }
    targets.set_html(SORT_SELECT, view::render_sort_control(state.sort, None));
}

/// A mounted projects page: state bound to its render targets.
pub struct GalleryPage {
    pub state: GalleryState,
    pub targets: RenderTargets,
}

impl GalleryPage {
    pub fn new(state: GalleryState, targets: RenderTargets) -> Self {
        Self { state, targets }
    }

    /// Build the tab bar, attach its listener once, and render the grid.
    ///
    /// Safe to call repeatedly; the tab listener is never attached twice.
    pub fn mount(&mut self) {
        self.targets
            .set_html(PROJECT_TABS, category::render_tabs(&self.state.tabs, None));
        if self.targets.attach_listener(PROJECT_TABS, TAB_CLICK) {
            debug!("tab listener attached");
        }
        render(&self.state, &mut self.targets);
    }

    /// Deliver an event and re-render when the state changed.
    ///
    /// Tab clicks are ignored unless the tab bar exists and has its listener.
    pub fn dispatch(&mut self, event: GalleryEvent) -> bool {
        if matches!(event, GalleryEvent::TabClicked(_))
            && !self.targets.has_listener(PROJECT_TABS, TAB_CLICK)
        {
            return false;
        }
        let is_tab = matches!(event, GalleryEvent::TabClicked(_));
        if !self.state.apply(event) {
            return false;
        }
        if is_tab {
            self.targets
                .set_html(PROJECT_TABS, category::render_tabs(&self.state.tabs, None));
        }
        render(&self.state, &mut self.targets);
        true
    }

    /// Probe every thumbnail and feed the result back as an event.
    pub fn probe_thumbnails(&mut self, probe: &dyn AssetProbe) -> bool {
        let broken = probe::find_broken(probe, &self.state.thumbnails());
        self.dispatch(GalleryEvent::ThumbnailsProbed(broken))
    }
}
