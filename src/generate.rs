//! HTML site generation.
//!
//! Reads the site source directory, plans every page, and writes a static
//! portfolio. Planning ([`plan`]) is side-effect free apart from asset probing,
//! so `check` can run it without writing anything.
//!
//! ## Generated Pages
//!
//! - **Home** (`index.html`): featured picks from the home manifest
//! - **Projects** (`projects.html`): grid in its default tab and sort
//! - **Filter states** (`projects-<tab>-<sort>.html`): one page per other
//!   tab × sort combination, so tabs and sort controls work as plain links
//! - **Detail pages** (`project/<slug>.html`): one per project, or a single
//!   `project.html` selecting by `?slug=` when `detail_links = "query"`
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── projects.html
//! ├── projects-editing-featured.html
//! ├── projects-all-title.html
//! ├── project/
//! │   ├── travel-app.html
//! │   └── brand-reel.html
//! └── assets/                # Copied from the source directory
//!     └── ...
//! ```
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time:
//! - `static/style.css`: base styles
//! - `static/folio.js`: lazy loading, reveals, counters, likes, and the
//!   query-mode detail selector, tuned by `[motion]` serialized into each page
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping.

use crate::category::{self, TabSet};
use crate::config::SiteConfig;
use crate::detail::{self, DetailOutcome, MediaLoading};
use crate::gallery::{GalleryEvent, GalleryState};
use crate::home;
use crate::likes::{self, LikeState};
use crate::manifest::{self, DirSource};
use crate::nav;
use crate::probe::{self, KnownBroken, SiteRootProbe};
use crate::targets::{
    PROJECT_BODY, PROJECT_DESC, PROJECT_HERO, PROJECT_META, PROJECT_TITLE, RenderTargets,
};
use crate::types::Project;
use crate::view::{self, DetailLinks, SortKey};
use crate::visibility::{self, HERO_REVEAL_CLASS, REVEAL_CLASS, VISIBLE_CLASS};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

const CSS: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/folio.js");

/// File name of the single detail page in query-link mode.
pub const QUERY_DETAIL_PAGE: &str = "project.html";

/// Everything needed to write the site, resolved from the source directory.
#[derive(Debug, Clone)]
pub struct SitePlan {
    /// Projects page state in its default tab and sort.
    pub gallery: GalleryState,
    pub home_picks: Vec<Project>,
    /// Set when the home manifest could not be loaded.
    pub home_error: Option<String>,
    /// Projects that get a detail page, in manifest order.
    pub detail_projects: Vec<Project>,
    /// Slugs with no detail page, with the reason.
    pub skipped: Vec<(String, &'static str)>,
    /// Thumbnail and media URLs that do not resolve to a file.
    pub broken_assets: BTreeSet<String>,
}

/// What [`build`] wrote.
#[derive(Debug)]
pub struct BuildReport {
    pub plan: SitePlan,
    /// Pages written, relative to the output directory, in write order.
    pub pages: Vec<PathBuf>,
    pub copied_assets: usize,
}

fn load(source: &DirSource, path: &str) -> Result<Vec<Project>, String> {
    manifest::try_load_projects(source, path).map_err(|e| {
        error!(path, "error loading {path}: {e}");
        e.to_string()
    })
}

/// Where a project's detail page lives, or why it has none.
pub fn detail_file(links: DetailLinks, slug: &str) -> Result<PathBuf, &'static str> {
    if slug.is_empty() {
        return Err("no slug");
    }
    match links {
        DetailLinks::Query => Ok(PathBuf::from(QUERY_DETAIL_PAGE)),
        DetailLinks::Pages => {
            if !view::is_page_name(slug) {
                return Err("slug is not a valid file name");
            }
            Ok(Path::new("project").join(format!("{slug}.html")))
        }
    }
}

/// Load manifests, pick home cards, and probe every asset the site references.
pub fn plan(source: &Path, config: &SiteConfig) -> SitePlan {
    let dir = DirSource::new(source);
    let origin = config.site.origin.as_str();

    let mut gallery = GalleryState::new(
        load(&dir, &config.manifests.projects),
        &config.tabs,
        config.view.default_sort,
        config.site.detail_links,
    );

    let (home_picks, home_error) = match load(&dir, &config.manifests.home) {
        Ok(projects) => (
            home::pick_featured(&projects, config.home.featured_count)
                .into_iter()
                .cloned()
                .collect(),
            None,
        ),
        Err(reason) => (Vec::new(), Some(reason)),
    };

    let mut detail_projects = Vec::new();
    let mut skipped = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for project in &gallery.projects {
        let outcome = detail_file(config.site.detail_links, &project.slug);
        match outcome {
            Err(reason) => skipped.push((project.slug.clone(), reason)),
            Ok(_) if !seen.insert(project.slug.as_str()) => {
                skipped.push((project.slug.clone(), "duplicate slug"))
            }
            Ok(_) => detail_projects.push(project.clone()),
        }
    }
    for (slug, reason) in &skipped {
        warn!(slug = %slug, "no detail page: {reason}");
    }

    let mut urls: BTreeSet<String> = gallery.thumbnails().into_iter().collect();
    urls.extend(
        home_picks
            .iter()
            .filter_map(Project::thumbnail)
            .map(str::to_string),
    );
    for project in &detail_projects {
        urls.extend(detail::DetailView::from_project(project, origin).asset_urls());
    }
    let urls: Vec<String> = urls.into_iter().collect();
    let broken_assets = probe::find_broken(&SiteRootProbe::new(source, origin), &urls);
    gallery.apply(GalleryEvent::ThumbnailsProbed(broken_assets.clone()));

    SitePlan {
        gallery,
        home_picks,
        home_error,
        detail_projects,
        skipped,
        broken_assets,
    }
}

/// Build the whole site from `source` into `output`.
pub fn build(source: &Path, output: &Path, config: &SiteConfig) -> Result<BuildReport, GenerateError> {
    let plan = plan(source, config);
    fs::create_dir_all(output)?;

    let copied_assets = copy_assets(source, output)?;
    debug!(count = copied_assets, "copied assets");

    let motion = serde_json::to_string(&visibility::browser_config(&config.motion))?;
    let page = PageContext { config, motion: &motion };
    let mut pages = Vec::new();

    write_page(output, Path::new("index.html"), render_index(&page, &plan), &mut pages)?;

    let names = ProjectsPages::new(&plan.gallery.tabs, config.view.default_sort);
    for key in plan.gallery.tabs.keys() {
        for sort in SortKey::ALL {
            let mut state = plan.gallery.clone();
            state.apply(GalleryEvent::TabClicked(key.to_string()));
            state.apply(GalleryEvent::SortChanged(sort));
            let file = names.file(key, sort);
            write_page(output, Path::new(&file), render_projects_page(&page, &state, &names), &mut pages)?;
        }
    }

    let broken = KnownBroken(&plan.broken_assets);
    match config.site.detail_links {
        DetailLinks::Pages => {
            for project in &plan.detail_projects {
                let Ok(file) = detail_file(DetailLinks::Pages, &project.slug) else {
                    continue;
                };
                let outcome = DetailOutcome::Found(Box::new(project.clone()));
                let pathname = format!("/{}", file.to_string_lossy().replace('\\', "/"));
                let article = render_detail_article(&outcome, config, &broken, true);
                let markup = render_detail_page(&page, &pathname, Some("../"), article);
                write_page(output, &file, markup, &mut pages)?;
            }
        }
        DetailLinks::Query => {
            let markup = render_query_detail_page(&page, &plan, &broken);
            write_page(output, Path::new(QUERY_DETAIL_PAGE), markup, &mut pages)?;
        }
    }

    info!(pages = pages.len(), output = %output.display(), "site generated");
    Ok(BuildReport {
        plan,
        pages,
        copied_assets,
    })
}

fn write_page(
    output: &Path,
    rel: &Path,
    markup: Markup,
    pages: &mut Vec<PathBuf>,
) -> Result<(), GenerateError> {
    let path = output.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, markup.into_string())?;
    debug!(page = %rel.display(), "wrote page");
    pages.push(rel.to_path_buf());
    Ok(())
}

/// Copy site files into `output`, skipping manifests, config, hidden entries,
/// and the output directory itself when it sits inside the source.
fn copy_assets(source: &Path, output: &Path) -> Result<usize, GenerateError> {
    let output_abs = output.canonicalize().ok();
    let mut copied = 0;
    let walker = WalkDir::new(source).min_depth(1).into_iter().filter_entry(|entry| {
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        let is_output = output_abs
            .as_deref()
            .is_some_and(|out| entry.path().canonicalize().is_ok_and(|p| p == out));
        !hidden && !is_output
    });
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let skip = path.extension().is_some_and(|e| e == "json")
            || path.file_name().is_some_and(|n| n == "config.toml");
        if skip {
            continue;
        }
        let Ok(rel) = path.strip_prefix(source) else {
            continue;
        };
        let dest = output.join(rel);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(path, &dest)?;
        copied += 1;
    }
    Ok(copied)
}

// ============================================================================
// Projects page naming
// ============================================================================

/// File names for every tab × sort state of the projects page.
///
/// The default state is `projects.html`; every other state is
/// `projects-<tab>-<sort>.html`, with tab names slugified and de-duplicated.
#[derive(Debug, Clone)]
pub struct ProjectsPages {
    default_key: String,
    default_sort: SortKey,
    slugs: BTreeMap<String, String>,
}

impl ProjectsPages {
    pub fn new(tabs: &TabSet, default_sort: SortKey) -> Self {
        let mut slugs = BTreeMap::new();
        let mut used: HashSet<String> = HashSet::new();
        for key in tabs.keys() {
            let base = tab_slug(key);
            let mut slug = base.clone();
            let mut n = 2;
            while !used.insert(slug.clone()) {
                slug = format!("{base}-{n}");
                n += 1;
            }
            slugs.insert(key.to_string(), slug);
        }
        Self {
            default_key: tabs.active_key().to_string(),
            default_sort,
            slugs,
        }
    }

    pub fn file(&self, key: &str, sort: SortKey) -> String {
        if key == self.default_key && sort == self.default_sort {
            return "projects.html".to_string();
        }
        let slug = self
            .slugs
            .get(key)
            .cloned()
            .unwrap_or_else(|| tab_slug(key));
        format!("projects-{slug}-{sort}.html")
    }
}

/// Lowercase ASCII alphanumerics with single dashes between words.
pub fn tab_slug(label: &str) -> String {
    let mut slug = String::new();
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let trimmed = slug.trim_end_matches('-');
    if trimmed.is_empty() {
        "tab".to_string()
    } else {
        trimmed.to_string()
    }
}

// ============================================================================
// HTML Components
// ============================================================================

struct PageContext<'a> {
    config: &'a SiteConfig,
    /// `[motion]` and the browser hooks as JSON for the browser script.
    motion: &'a str,
}

/// Renders the base HTML document structure
fn base_document(
    page: &PageContext<'_>,
    title: &str,
    body_class: &str,
    base: Option<&str>,
    content: Markup,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                @if let Some(base) = base {
                    base href=(base);
                }
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body class=(body_class) {
                (content)
                script #folioConfig type="application/json" { (PreEscaped(page.motion)) }
                script { (PreEscaped(JS)) }
            }
        }
    }
}

/// Renders the site header with the brand link and main navigation
fn site_header(config: &SiteConfig, pathname: &str) -> Markup {
    html! {
        header.site-header {
            a.brand href="index.html" { (config.site.title) }
            (nav::render_nav(&config.site.nav, pathname))
        }
    }
}

fn page_title(config: &SiteConfig, title: &str) -> String {
    format!("{title} · {}", config.site.title)
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Slugs (and, in query mode, map keys) that resolve to a written detail page.
fn linked_slugs(plan: &SitePlan) -> HashSet<&str> {
    let mut slugs: HashSet<&str> = plan.detail_projects.iter().map(|p| p.slug.as_str()).collect();
    if plan.gallery.links == DetailLinks::Query {
        slugs.extend(
            plan.detail_projects
                .iter()
                .filter_map(|p| p.source_key.as_deref()),
        );
    }
    slugs
}

fn render_index(page: &PageContext<'_>, plan: &SitePlan) -> Markup {
    let config = page.config;
    let linked = linked_slugs(plan);
    let href = home::linked_href(config.site.detail_links, &linked);
    let picks: Vec<&Project> = plan.home_picks.iter().collect();
    let categories = plan.gallery.tabs.keys().len().saturating_sub(1);
    let content = html! {
        (site_header(config, "/index.html"))
        main.home-page {
            section class={ "hero " (HERO_REVEAL_CLASS) } {
                h1.hero-title { (config.site.title) }
                div class={ "scroll-cue " (VISIBLE_CLASS) } aria-hidden="true" { span { "Scroll" } }
            }
            section class={ "home-section " (REVEAL_CLASS) } {
                h2 { "Featured work" }
                div #homeProjects .home-projects {
                    (home::render_home_projects(&picks, &href))
                }
                a.more-link href="projects.html" { "All projects" }
            }
            @if plan.gallery.load_error.is_none() {
                section class={ "stats " (REVEAL_CLASS) } {
                    (visibility::counter("Projects", plan.gallery.projects.len() as u64))
                    (visibility::counter("Categories", categories as u64))
                }
            }
        }
    };
    base_document(page, &config.site.title, "home", None, content)
}

fn render_projects_page(page: &PageContext<'_>, state: &GalleryState, names: &ProjectsPages) -> Markup {
    let config = page.config;
    let active = state.active_category().to_string();
    let sort = state.sort;
    let tab_href = |key: &str| names.file(key, sort);
    let sort_href = |s: SortKey| names.file(&active, s);

    let content = html! {
        (site_header(config, "/projects.html"))
        main.projects-page {
            h1.page-title { "Projects" }
            div.projects-toolbar {
                nav #projectTabs .project-tabs { (category::render_tabs(&state.tabs, Some(&tab_href))) }
                div #sortSelect .sort-control { (view::render_sort_control(sort, Some(&sort_href))) }
            }
            div #projectsGrid .projects-grid {
                @match &state.load_error {
                    Some(reason) => { (view::render_load_error(reason)) }
                    None => { (view::render_grid(&state.visible(), state.links, &state.broken_thumbs)) }
                }
            }
        }
    };
    base_document(page, &page_title(config, "Projects"), "projects", None, content)
}

/// One detail article. Element ids are only emitted when the page holds a
/// single article; otherwise the article starts hidden and its media are
/// deferred until the script shows it.
fn render_detail_article(
    outcome: &DetailOutcome,
    config: &SiteConfig,
    broken: &KnownBroken<'_>,
    with_ids: bool,
) -> Markup {
    let loading = if with_ids {
        MediaLoading::Eager
    } else {
        MediaLoading::Deferred
    };
    let mut targets = RenderTargets::with_ids([
        PROJECT_TITLE,
        PROJECT_DESC,
        PROJECT_META,
        PROJECT_HERO,
        PROJECT_BODY,
    ]);
    detail::render_detail_with(outcome, &config.site.origin, Some(broken), &mut targets, loading);
    let id = |name: &'static str| with_ids.then_some(name);
    let slot = |name: &str| PreEscaped(targets.html(name).to_string());

    html! {
        header.project-header {
            h1.project-title id=[id(PROJECT_TITLE)] { (slot(PROJECT_TITLE)) }
            p.project-desc id=[id(PROJECT_DESC)] { (slot(PROJECT_DESC)) }
            div.project-meta id=[id(PROJECT_META)] { (slot(PROJECT_META)) }
        }
        div.project-hero id=[id(PROJECT_HERO)] { (slot(PROJECT_HERO)) }
        section.project-body id=[id(PROJECT_BODY)] { (slot(PROJECT_BODY)) }
    }
}

fn render_detail_page(
    page: &PageContext<'_>,
    pathname: &str,
    base: Option<&str>,
    article: Markup,
) -> Markup {
    let config = page.config;
    let content = html! {
        (site_header(config, pathname))
        main.project-page {
            article.project-detail { (article) }
            div.like-row {
                (likes::render_like_button(LikeState::default(), &likes::page_key(pathname)))
            }
        }
    };
    base_document(page, &page_title(config, "Project"), "project", base, content)
}

/// The query-mode detail page: every project plus the fallbacks, all hidden
/// until the browser script picks one by the `slug` parameter.
fn render_query_detail_page(page: &PageContext<'_>, plan: &SitePlan, broken: &KnownBroken<'_>) -> Markup {
    let config = page.config;
    let pathname = format!("/{QUERY_DETAIL_PAGE}");
    let article = |outcome: &DetailOutcome| render_detail_article(outcome, config, broken, false);

    let content = html! {
        (site_header(config, &pathname))
        main.project-page {
            @match &plan.gallery.load_error {
                Some(_) => {
                    article.project-detail data-fallback="load-failed" {
                        (article(&DetailOutcome::LoadFailed))
                    }
                }
                None => {
                    @for project in &plan.detail_projects {
                        article.project-detail
                            data-slug=(project.slug)
                            data-key=[project.source_key.as_deref()]
                            hidden {
                            (article(&DetailOutcome::Found(Box::new(project.clone()))))
                        }
                    }
                    article.project-detail data-fallback="missing-slug" hidden {
                        (article(&DetailOutcome::MissingSlug))
                    }
                    article.project-detail data-fallback="not-found" hidden {
                        (article(&DetailOutcome::NotFound(String::new())))
                    }
                }
            }
            div.like-row {
                (likes::render_like_button(LikeState::default(), &likes::page_key(&pathname)))
            }
        }
    };
    base_document(page, &page_title(config, "Project"), "project", None, content)
}

// ============================================================================
// Tests
// ============================================================================
