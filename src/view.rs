//! Filtered and sorted project grid.
//!
//! The grid is a pure function of three inputs: the loaded projects, the active
//! category key, and the sort key. Filtering uses the shared
//! [`labels_match`](crate::category::labels_match) rule; sorting is always
//! stable so equal elements keep their manifest order.

use crate::category::{self, ALL_KEY};
use crate::types::Project;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

/// Placeholder shown when a filter leaves nothing to display.
pub const NO_PROJECTS: &str = "No projects found.";
/// Background used when a card has no usable thumbnail.
pub const THUMB_FALLBACK_COLOR: &str = "#f6f6f6";

/// Grid ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Featured projects first, manifest order otherwise.
    #[default]
    Featured,
    /// Alphabetical by title.
    Title,
}

impl SortKey {
    pub const ALL: [SortKey; 2] = [SortKey::Featured, SortKey::Title];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Featured => "featured",
            SortKey::Title => "title",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Featured => "Featured",
            SortKey::Title => "Title",
        }
    }

    /// Parse a control value; anything unrecognized sorts by featured.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "title" => SortKey::Title,
            _ => SortKey::Featured,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How cards link to a project's detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLinks {
    /// `project.html?slug=<slug>`, for hosts that render detail pages on request.
    Query,
    /// `project/<slug>.html`, one pre-rendered page per project.
    #[default]
    Pages,
}

impl DetailLinks {
    /// Link to the detail page of `slug`, or `None` when it has none: an
    /// empty slug, or in `Pages` mode one that is not a usable file name.
    pub fn href(&self, slug: &str) -> Option<String> {
        if slug.is_empty() {
            return None;
        }
        let encoded = urlencoding::encode(slug);
        match self {
            DetailLinks::Query => Some(format!("project.html?slug={encoded}")),
            DetailLinks::Pages => {
                is_page_name(slug).then(|| format!("project/{encoded}.html"))
            }
        }
    }
}

/// Whether `slug` can name a file under `project/`.
pub fn is_page_name(slug: &str) -> bool {
    !slug.is_empty() && !slug.contains(['/', '\\']) && !slug.starts_with('.')
}

/// Projects whose labels match `key`; `all` (or an empty key) keeps everything.
pub fn filter_by_category<'a>(projects: &'a [Project], key: &str) -> Vec<&'a Project> {
    if key.is_empty() || key == ALL_KEY {
        return projects.iter().collect();
    }
    projects
        .iter()
        .filter(|p| p.categories().iter().any(|c| category::labels_match(c, key)))
        .collect()
}

/// Case-folded comparison with a codepoint tie-break.
pub fn title_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Stable sort by `key`.
pub fn sort_projects<'a>(mut list: Vec<&'a Project>, key: SortKey) -> Vec<&'a Project> {
    match key {
        SortKey::Featured => list.sort_by_key(|p| !p.featured),
        SortKey::Title => list.sort_by(|a, b| {
            title_order(
                a.title.as_deref().unwrap_or(""),
                b.title.as_deref().unwrap_or(""),
            )
        }),
    }
    list
}

/// Filter then sort: the list the grid displays.
pub fn visible_projects<'a>(projects: &'a [Project], key: &str, sort: SortKey) -> Vec<&'a Project> {
    sort_projects(filter_by_category(projects, key), sort)
}

/// `category · year`, skipping empty parts.
pub fn card_subtitle(project: &Project) -> String {
    [project.category.as_deref(), project.year.as_deref()]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" · ")
}

fn thumb_style(thumb: Option<&str>, broken: bool) -> String {
    match thumb {
        Some(img) if !broken => {
            format!(r#"background-image: url("{}")"#, img.replace('"', "\\\""))
        }
        Some(_) => format!("background-image: none; background-color: {THUMB_FALLBACK_COLOR}"),
        None => format!("background-color: {THUMB_FALLBACK_COLOR}"),
    }
}

/// One grid card linking to the project's detail page; without one the card
/// is rendered unlinked.
pub fn render_card(project: &Project, links: DetailLinks, thumb_broken: bool) -> Markup {
    let title = project.display_title();
    html! {
        a.project-card href=[links.href(&project.slug)] aria-label=(title) {
            div.project-thumb style=(thumb_style(project.thumbnail(), thumb_broken)) {}
            div.project-meta {
                h4 { (title) }
                div.meta-sub { (card_subtitle(project)) }
            }
        }
    }
}

/// The card grid, or the empty placeholder.
///
/// `broken` holds thumbnail paths known to fail; those cards get the flat
/// background instead of the image.
pub fn render_grid(list: &[&Project], links: DetailLinks, broken: &BTreeSet<String>) -> Markup {
    html! {
        @if list.is_empty() {
            div.grid-message { (NO_PROJECTS) }
        } @else {
            @for project in list {
                @let thumb_broken = project.thumbnail().is_some_and(|t| broken.contains(t));
                (render_card(project, links, thumb_broken))
            }
        }
    }
}

/// Message shown in place of the grid when the manifest failed to load.
pub fn render_load_error(reason: &str) -> Markup {
    html! {
        div.grid-message { "Error loading projects: " (reason) }
    }
}

/// The sort control: `<option>`s for a select, or links when `href` is given.
pub fn render_sort_control(current: SortKey, href: Option<&dyn Fn(SortKey) -> String>) -> Markup {
    html! {
        @for key in SortKey::ALL {
            @match href {
                Some(link) => {
                    a.sort-link.active[key == current] href=(link(key)) { (key.label()) }
                }
                None => {
                    option value=(key.as_str()) selected[key == current] { (key.label()) }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{project, sample_projects, slugs};

    #[test]
    fn filter_all_is_identity() {
        let projects = sample_projects();
        let all = filter_by_category(&projects, "all");
        assert_eq!(slugs(&all), slugs(&projects.iter().collect::<Vec<_>>()));
        assert_eq!(filter_by_category(&projects, "").len(), projects.len());
    }

    #[test]
    fn filter_matches_any_segment() {
        let projects = vec![
            project("a", "UI/UX", true, None),
            project("b", "Editing, UI/UX", false, None),
        ];
        assert_eq!(slugs(&filter_by_category(&projects, "ui/ux")), vec!["a", "b"]);
        assert_eq!(slugs(&filter_by_category(&projects, "Editing")), vec!["b"]);
    }

    #[test]
    fn filter_uses_bidirectional_containment() {
        let projects = vec![
            project("a", "UI/UX Design", false, None),
            project("b", "UI", false, None),
            project("c", "Documentaries", false, None),
        ];
        assert_eq!(slugs(&filter_by_category(&projects, "UI/UX")), vec!["a", "b"]);
    }

    #[test]
    fn filter_skips_projects_without_category() {
        let mut p = project("a", "", false, None);
        p.category = None;
        assert!(filter_by_category(&[p], "editing").is_empty());
    }

    #[test]
    fn featured_sort_is_stable_partition() {
        let projects = vec![
            project("a", "x", false, None),
            project("b", "x", true, None),
            project("c", "x", false, None),
            project("d", "x", true, None),
        ];
        let sorted = sort_projects(projects.iter().collect(), SortKey::Featured);
        assert_eq!(slugs(&sorted), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn featured_sort_ignores_rank() {
        let projects = vec![
            project("a", "x", true, Some(5.0)),
            project("b", "x", true, Some(1.0)),
        ];
        let sorted = sort_projects(projects.iter().collect(), SortKey::Featured);
        assert_eq!(slugs(&sorted), vec!["a", "b"]);
    }

    #[test]
    fn title_sort_puts_empty_titles_first() {
        let mut projects = vec![
            project("b", "x", false, None),
            project("a", "x", false, None),
            project("none", "x", false, None),
        ];
        projects[0].title = Some("beta".into());
        projects[1].title = Some("Alpha".into());
        projects[2].title = None;
        let sorted = sort_projects(projects.iter().collect(), SortKey::Title);
        assert_eq!(slugs(&sorted), vec!["none", "a", "b"]);
    }

    #[test]
    fn title_sort_is_idempotent() {
        let projects = sample_projects();
        let once = sort_projects(projects.iter().collect(), SortKey::Title);
        let twice = sort_projects(once.clone(), SortKey::Title);
        assert_eq!(slugs(&once), slugs(&twice));
    }

    #[test]
    fn title_order_is_case_insensitive() {
        assert_eq!(title_order("apple", "Banana"), Ordering::Less);
        assert_eq!(title_order("Zebra", "apple"), Ordering::Greater);
        assert_eq!(title_order("", "a"), Ordering::Less);
    }

    #[test]
    fn sort_key_parse_is_lenient() {
        assert_eq!(SortKey::parse_lenient("Title"), SortKey::Title);
        assert_eq!(SortKey::parse_lenient("featured"), SortKey::Featured);
        assert_eq!(SortKey::parse_lenient("newest"), SortKey::Featured);
    }

    #[test]
    fn detail_links_encode_slug() {
        assert_eq!(
            DetailLinks::Query.href("a b").as_deref(),
            Some("project.html?slug=a%20b")
        );
        assert_eq!(
            DetailLinks::Pages.href("ux-case").as_deref(),
            Some("project/ux-case.html")
        );
    }

    #[test]
    fn detail_links_skip_slugs_without_a_page() {
        assert_eq!(DetailLinks::Pages.href(""), None);
        assert_eq!(DetailLinks::Query.href(""), None);
        assert_eq!(DetailLinks::Pages.href("a/b"), None);
        assert_eq!(DetailLinks::Pages.href(".hidden"), None);
        assert!(DetailLinks::Query.href("a/b").is_some());
    }

    #[test]
    fn card_without_slug_is_unlinked() {
        let mut p = project("", "x", false, None);
        p.title = Some("Sketch".into());
        let html = render_card(&p, DetailLinks::Pages, false).into_string();
        assert!(html.contains("project-card"));
        assert!(!html.contains("href="));
    }

    #[test]
    fn subtitle_joins_non_empty_parts() {
        let mut p = project("a", "Editing", false, None);
        p.year = Some("2024".into());
        assert_eq!(card_subtitle(&p), "Editing · 2024");
        p.year = None;
        assert_eq!(card_subtitle(&p), "Editing");
        p.category = None;
        assert_eq!(card_subtitle(&p), "");
    }

    #[test]
    fn empty_grid_renders_placeholder() {
        let html = render_grid(&[], DetailLinks::Query, &BTreeSet::new()).into_string();
        assert!(html.contains(NO_PROJECTS));
        assert!(!html.contains("project-card"));
    }

    #[test]
    fn grid_renders_one_card_per_project() {
        let projects = sample_projects();
        let list: Vec<&Project> = projects.iter().collect();
        let html = render_grid(&list, DetailLinks::Query, &BTreeSet::new()).into_string();
        assert_eq!(html.matches("class=\"project-card\"").count(), projects.len());
        assert!(html.contains("project.html?slug=travel-app"));
    }

    #[test]
    fn broken_thumbnail_uses_flat_background() {
        let mut p = project("a", "x", false, None);
        p.thumb = Some("missing.jpg".into());
        let broken: BTreeSet<String> = ["missing.jpg".to_string()].into();
        let html = render_grid(&[&p], DetailLinks::Pages, &broken).into_string();
        assert!(html.contains("background-image: none"));
        assert!(html.contains(THUMB_FALLBACK_COLOR));
    }

    #[test]
    fn card_without_thumbnail_uses_flat_background() {
        let p = project("a", "x", false, None);
        let html = render_card(&p, DetailLinks::Pages, false).into_string();
        assert!(html.contains("background-color: #f6f6f6"));
        assert!(!html.contains("background-image"));
    }

    #[test]
    fn card_title_is_escaped() {
        let mut p = project("a", "x", false, None);
        p.title = Some("<script>alert(1)</script>".into());
        let html = render_card(&p, DetailLinks::Pages, false).into_string();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn sort_control_marks_current() {
        let html = render_sort_control(SortKey::Title, None).into_string();
        assert!(html.contains(r#"<option value="title" selected>"#));
        assert!(html.contains(r#"<option value="featured">"#));
    }
}
