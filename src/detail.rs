//! Project detail page.
//!
//! A detail page is selected by its `slug` query parameter and ends in exactly
//! one of four states:
//!
//! | State | Trigger | Shown |
//! |-------|---------|-------|
//! | `MissingSlug` | no `slug` parameter | "Project not found" + "No project was specified." |
//! | `LoadFailed` | manifest fetch or parse failed | "Unable to load project data." |
//! | `NotFound` | no record matches | "Project not found" |
//! | `Found` | record matched | title, description, meta, hero, gallery |
//!
//! The manifest is only loaded once a slug is known, and media URLs are only
//! resolved (and probed) for a found project.

use crate::assets::{entry_kind, resolve_asset_url};
use crate::manifest;
use crate::probe::{self, AssetProbe};
use crate::targets::{
    PROJECT_BODY, PROJECT_DESC, PROJECT_HERO, PROJECT_META, PROJECT_TITLE, RenderTargets,
};
use crate::types::{MediaKind, Project, non_empty};
use crate::visibility;
use maud::{Markup, html};
use std::collections::BTreeSet;
use tracing::{debug, warn};

pub const NOT_FOUND_TITLE: &str = "Project not found";
pub const NO_SLUG_MESSAGE: &str = "No project was specified.";
pub const LOAD_FAILED_MESSAGE: &str = "Unable to load project data.";

/// Read the `slug` parameter from a query string (leading `?` optional).
pub fn slug_from_query(query: &str) -> Option<String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == "slug")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

/// Result of resolving a detail request.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailOutcome {
    MissingSlug,
    LoadFailed,
    NotFound(String),
    Found(Box<Project>),
}

/// Resolve a detail request.
///
/// `load` is only invoked when a slug is present.
pub fn resolve_detail(
    slug: Option<&str>,
    load: impl FnOnce() -> Option<Vec<Project>>,
) -> DetailOutcome {
    let Some(slug) = slug.filter(|s| !s.is_empty()) else {
        return DetailOutcome::MissingSlug;
    };
    let Some(projects) = load() else {
        return DetailOutcome::LoadFailed;
    };
    match manifest::find_project(&projects, slug) {
        Some(project) => DetailOutcome::Found(Box::new(project.clone())),
        None => DetailOutcome::NotFound(slug.to_string()),
    }
}

/// A resolved media element.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    pub kind: MediaKind,
    pub url: String,
    /// Set by probing; a broken image is rendered hidden.
    pub broken: bool,
}

/// Display model of a found project with absolute media URLs.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub title: String,
    pub alt: String,
    pub description: String,
    pub meta: Vec<String>,
    pub hero: Option<MediaItem>,
    pub gallery: Vec<MediaItem>,
}

impl DetailView {
    pub fn from_project(project: &Project, origin: &str) -> Self {
        let alt = non_empty(project.title.as_deref())
            .unwrap_or(&project.slug)
            .to_string();
        let title = if alt.is_empty() {
            "Untitled".to_string()
        } else {
            alt.clone()
        };

        let hero = non_empty(project.cover.as_deref()).map(|cover| MediaItem {
            kind: MediaKind::Image,
            url: resolve_asset_url(origin, cover),
            broken: false,
        });

        let gallery = project
            .gallery_entries()
            .iter()
            .map(|entry| MediaItem {
                kind: entry_kind(entry),
                url: resolve_asset_url(origin, entry.path()),
                broken: false,
            })
            .collect();

        let meta = [project.category.as_deref(), project.year.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            title,
            alt,
            description: project.summary().to_string(),
            meta,
            hero,
            gallery,
        }
    }

    /// Every distinct media URL on the page.
    pub fn asset_urls(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self
            .hero
            .iter()
            .chain(&self.gallery)
            .map(|m| m.url.as_str())
            .collect();
        set.into_iter().map(str::to_string).collect()
    }

    /// Flag items whose URL is in `broken`.
    ///
    /// Images get hidden; videos stay in place and are only logged.
    pub fn mark_broken(&mut self, broken: &BTreeSet<String>) {
        for item in self.hero.iter_mut().chain(self.gallery.iter_mut()) {
            if !broken.contains(&item.url) {
                continue;
            }
            match item.kind {
                MediaKind::Image => item.broken = true,
                MediaKind::Video => warn!(url = %item.url, "video failed to load"),
            }
        }
    }
}

fn render_meta(view: &DetailView) -> Markup {
    html! {
        @for line in &view.meta {
            div { (line) }
        }
    }
}

/// When a detail page's media may start downloading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaLoading {
    /// Hero at once, gallery images as they near the viewport, video metadata
    /// up front.
    #[default]
    Eager,
    /// Nothing is requested until the script reveals the page; used for
    /// articles that start hidden.
    Deferred,
}

fn render_hero(view: &DetailView, loading: MediaLoading) -> Markup {
    html! {
        @if let Some(hero) = &view.hero {
            @match loading {
                MediaLoading::Eager => {
                    img src=(hero.url) alt=(view.alt) loading="lazy" hidden[hero.broken]
                        onerror="this.style.display='none'";
                }
                MediaLoading::Deferred => {
                    (visibility::deferred_img(&hero.url, &view.alt, hero.broken))
                }
            }
        }
    }
}

/// The media gallery: one wrapper per item so failures stay local.
pub fn render_gallery(view: &DetailView) -> Markup {
    render_gallery_with(view, MediaLoading::Eager)
}

pub fn render_gallery_with(view: &DetailView, loading: MediaLoading) -> Markup {
    html! {
        div.project-gallery {
            @for item in &view.gallery {
                div.project-image {
                    @match (item.kind, loading) {
                        (MediaKind::Video, MediaLoading::Eager) => {
                            video controls preload="metadata" {
                                source src=(item.url);
                            }
                        }
                        (MediaKind::Video, MediaLoading::Deferred) => {
                            video controls preload="none" {
                                source data-defer-src=(item.url);
                            }
                        }
                        (MediaKind::Image, MediaLoading::Eager) => {
                            (visibility::lazy_img(&item.url, &view.alt, None, item.broken))
                        }
                        (MediaKind::Image, MediaLoading::Deferred) => {
                            (visibility::deferred_img(&item.url, &view.alt, item.broken))
                        }
                    }
                }
            }
        }
    }
}

/// Write `outcome` into the detail targets.
///
/// For a found project, media are probed after the first write when a probe
/// is given, and broken images are re-rendered hidden. Returns the view that
/// was rendered, if any.
pub fn render_detail(
    outcome: &DetailOutcome,
    origin: &str,
    probe: Option<&dyn AssetProbe>,
    targets: &mut RenderTargets,
) -> Option<DetailView> {
    render_detail_with(outcome, origin, probe, targets, MediaLoading::Eager)
}

/// [`render_detail`] with explicit media loading.
pub fn render_detail_with(
    outcome: &DetailOutcome,
    origin: &str,
    probe: Option<&dyn AssetProbe>,
    targets: &mut RenderTargets,
    loading: MediaLoading,
) -> Option<DetailView> {
    match outcome {
        DetailOutcome::MissingSlug => {
            targets.set_text(PROJECT_TITLE, NOT_FOUND_TITLE);
            targets.set_text(PROJECT_DESC, NO_SLUG_MESSAGE);
            targets.clear(PROJECT_BODY);
            None
        }
        DetailOutcome::LoadFailed => {
            targets.set_html(PROJECT_BODY, html! { p.detail-message { (LOAD_FAILED_MESSAGE) } });
            None
        }
        DetailOutcome::NotFound(slug) => {
            debug!(slug = %slug, "no project matches");
            targets.set_text(PROJECT_TITLE, NOT_FOUND_TITLE);
            targets.clear(PROJECT_DESC);
            targets.clear(PROJECT_BODY);
            None
        }
        DetailOutcome::Found(project) => {
            let mut view = DetailView::from_project(project, origin);
            write_view(&view, targets, loading);
            if let Some(probe) = probe {
                let broken = probe::find_broken(probe, &view.asset_urls());
                if !broken.is_empty() {
                    view.mark_broken(&broken);
                    write_view(&view, targets, loading);
                }
            }
            Some(view)
        }
    }
}

fn write_view(view: &DetailView, targets: &mut RenderTargets, loading: MediaLoading) {
    targets.set_text(PROJECT_TITLE, &view.title);
    targets.set_text(PROJECT_DESC, &view.description);
    targets.set_html(PROJECT_META, render_meta(view));
    targets.set_html(PROJECT_HERO, render_hero(view, loading));
    targets.set_html(PROJECT_BODY, render_gallery_with(view, loading));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{StaticProbe, project};
    use crate::types::MediaEntry;
    use std::cell::Cell;

    const ORIGIN: &str = "https://me.dev";

    fn all_targets() -> RenderTargets {
        RenderTargets::with_ids([
            PROJECT_TITLE,
            PROJECT_DESC,
            PROJECT_META,
            PROJECT_HERO,
            PROJECT_BODY,
        ])
    }

    fn manifest() -> Vec<Project> {
        vec![
            project("a", "UI/UX", true, None),
            project("b", "Editing, UI/UX", false, None),
        ]
    }

    #[test]
    fn slug_from_query_decodes() {
        assert_eq!(slug_from_query("?slug=travel-app").as_deref(), Some("travel-app"));
        assert_eq!(slug_from_query("x=1&slug=a%20b").as_deref(), Some("a b"));
        assert_eq!(slug_from_query("?slug="), None);
        assert_eq!(slug_from_query(""), None);
    }

    #[test]
    fn missing_slug_never_loads() {
        let loaded = Cell::new(false);
        let outcome = resolve_detail(None, || {
            loaded.set(true);
            Some(manifest())
        });
        assert_eq!(outcome, DetailOutcome::MissingSlug);
        assert!(!loaded.get());
    }

    #[test]
    fn three_fallbacks_are_distinct() {
        let mut missing = all_targets();
        render_detail(&resolve_detail(None, || None), ORIGIN, None, &mut missing);

        let mut failed = all_targets();
        render_detail(&resolve_detail(Some("a"), || None), ORIGIN, None, &mut failed);

        let mut not_found = all_targets();
        render_detail(
            &resolve_detail(Some("missing"), || Some(manifest())),
            ORIGIN,
            None,
            &mut not_found,
        );

        assert_eq!(missing.html(PROJECT_TITLE), NOT_FOUND_TITLE);
        assert_eq!(missing.html(PROJECT_DESC), NO_SLUG_MESSAGE);
        assert!(failed.html(PROJECT_BODY).contains(LOAD_FAILED_MESSAGE));
        assert_eq!(not_found.html(PROJECT_TITLE), NOT_FOUND_TITLE);
        assert_eq!(not_found.html(PROJECT_DESC), "");

        let snapshot = |t: &RenderTargets| {
            (
                t.html(PROJECT_TITLE).to_string(),
                t.html(PROJECT_DESC).to_string(),
                t.html(PROJECT_BODY).to_string(),
            )
        };
        assert_ne!(snapshot(&missing), snapshot(&failed));
        assert_ne!(snapshot(&missing), snapshot(&not_found));
        assert_ne!(snapshot(&failed), snapshot(&not_found));
    }

    #[test]
    fn not_found_touches_no_media() {
        let probe = StaticProbe::missing(&[]);
        let mut targets = all_targets();
        let view = render_detail(
            &resolve_detail(Some("missing"), || Some(manifest())),
            ORIGIN,
            Some(&probe),
            &mut targets,
        );
        assert!(view.is_none());
        assert_eq!(probe.calls(), 0);
        assert_eq!(targets.html(PROJECT_HERO), "");
    }

    #[test]
    fn found_renders_fields_and_absolute_media() {
        let mut p = project("reel", "Editing", false, None);
        p.title = Some("Showreel".into());
        p.description = Some("Cuts".into());
        p.year = Some("2024".into());
        p.cover = Some("assets/cover.jpg".into());
        p.media = vec![
            MediaEntry::Path("assets/one.jpg".into()),
            MediaEntry::Path("/assets/clip.mp4".into()),
        ];
        let mut targets = all_targets();
        let view = render_detail(
            &resolve_detail(Some("reel"), || Some(vec![p])),
            ORIGIN,
            None,
            &mut targets,
        )
        .unwrap();

        assert_eq!(targets.html(PROJECT_TITLE), "Showreel");
        assert_eq!(targets.html(PROJECT_DESC), "Cuts");
        assert_eq!(targets.html(PROJECT_META), "<div>Editing</div><div>2024</div>");
        assert!(targets.html(PROJECT_HERO).contains("https://me.dev/assets/cover.jpg"));
        let body = targets.html(PROJECT_BODY);
        assert!(body.contains(r#"src="https://me.dev/assets/one.jpg""#));
        assert!(body.contains("<video controls"));
        assert!(body.contains(r#"<source src="https://me.dev/assets/clip.mp4">"#));
        assert_eq!(view.gallery.len(), 2);
    }

    #[test]
    fn gallery_falls_back_to_cover() {
        let mut p = project("x", "Editing", false, None);
        p.cover = Some("c.jpg".into());
        let view = DetailView::from_project(&p, ORIGIN);
        assert_eq!(view.gallery.len(), 1);
        assert_eq!(view.gallery[0].url, "https://me.dev/c.jpg");
        assert_eq!(view.gallery[0].kind, MediaKind::Image);
    }

    #[test]
    fn title_falls_back_to_untitled() {
        let mut p = project("", "Editing", false, None);
        p.title = None;
        assert_eq!(DetailView::from_project(&p, ORIGIN).title, "Untitled");
    }

    #[test]
    fn broken_image_is_hidden_siblings_stay() {
        let mut p = project("x", "Editing", false, None);
        p.media = vec![
            MediaEntry::Path("ok.jpg".into()),
            MediaEntry::Path("gone.jpg".into()),
            MediaEntry::Path("gone.mp4".into()),
        ];
        let probe = StaticProbe::missing(&["https://me.dev/gone.jpg", "https://me.dev/gone.mp4"]);
        let mut targets = all_targets();
        let view = render_detail(
            &DetailOutcome::Found(Box::new(p)),
            ORIGIN,
            Some(&probe),
            &mut targets,
        )
        .unwrap();

        assert!(!view.gallery[0].broken);
        assert!(view.gallery[1].broken);
        // videos are only logged
        assert!(!view.gallery[2].broken);
        let body = targets.html(PROJECT_BODY);
        assert_eq!(body.matches("class=\"project-image\"").count(), 3);
        assert!(body.contains(r#"data-src="https://me.dev/gone.jpg" alt="x" hidden"#));
        assert!(!body.contains(r#"data-src="https://me.dev/ok.jpg" alt="x" hidden"#));
    }

    #[test]
    fn deferred_media_requests_nothing() {
        let mut p = project("reel", "Editing", false, None);
        p.cover = Some("cover.jpg".into());
        p.media = vec![
            MediaEntry::Path("one.jpg".into()),
            MediaEntry::Path("clip.mp4".into()),
        ];
        let mut targets = all_targets();
        render_detail_with(
            &DetailOutcome::Found(Box::new(p)),
            ORIGIN,
            None,
            &mut targets,
            MediaLoading::Deferred,
        );
        let media = format!("{}{}", targets.html(PROJECT_HERO), targets.html(PROJECT_BODY));
        assert!(!media.contains(" src="));
        assert!(!media.contains("preload=\"metadata\""));
        assert!(media.contains(r#"data-defer-src="https://me.dev/clip.mp4""#));
        assert!(media.contains(r#"data-defer-src="https://me.dev/cover.jpg""#));
    }

    #[test]
    fn missing_targets_do_not_panic() {
        let mut targets = RenderTargets::default();
        let outcome = resolve_detail(Some("a"), || Some(manifest()));
        assert!(render_detail(&outcome, ORIGIN, None, &mut targets).is_some());
    }
}
