//! Featured projects on the landing page.
//!
//! The home manifest is ranked by `feature_rank` and trimmed to a few cards,
//! preferring variety: the first pass takes at most one project per category,
//! the second pass tops the list up from whatever featured projects remain.

use crate::types::Project;
use crate::view::DetailLinks;
use crate::visibility;
use maud::{Markup, html};
use std::collections::HashSet;

/// Rank used for featured projects that carry none.
pub const UNRANKED: f64 = 999.0;

/// Sort rank of a project. A rank of 0 counts as unranked, like a missing one.
pub fn effective_rank(project: &Project) -> f64 {
    project
        .feature_rank
        .filter(|r| *r != 0.0 && !r.is_nan())
        .unwrap_or(UNRANKED)
}

/// Up to `count` featured projects, at most one per category where possible.
///
/// Categories compare as raw strings, so `"Editing"` and `"Editing, UI/UX"`
/// are different categories here, and all uncategorized projects share one.
pub fn pick_featured(projects: &[Project], count: usize) -> Vec<&Project> {
    let mut ranked: Vec<&Project> = projects.iter().filter(|p| p.featured).collect();
    ranked.sort_by(|a, b| effective_rank(a).total_cmp(&effective_rank(b)));

    let mut chosen: Vec<&Project> = Vec::with_capacity(count);
    let mut seen: HashSet<Option<&str>> = HashSet::new();
    for &project in &ranked {
        if chosen.len() >= count {
            break;
        }
        if seen.insert(project.category.as_deref()) {
            chosen.push(project);
        }
    }
    for &project in &ranked {
        if chosen.len() >= count {
            break;
        }
        if !chosen.iter().any(|c| std::ptr::eq(*c, project)) {
            chosen.push(project);
        }
    }
    chosen
}

/// A landing-page card: thumbnail with a title overlay, linked to `href`
/// when the project has a detail page.
pub fn render_home_card(project: &Project, href: Option<&str>) -> Markup {
    let title = project.display_title();
    html! {
        a.project-card href=[href] {
            @if let Some(thumb) = project.thumbnail() {
                (visibility::lazy_img(thumb, &format!("{title} thumb"), Some("thumb"), false))
            }
            div.card-overlay aria-hidden="true" {
                div.card-title { (title) }
            }
            div.meta aria-hidden="true" {
                div.meta-title { (title) }
            }
        }
    }
}

/// Every pick, linked through `href`.
pub fn render_home_projects(picks: &[&Project], href: &dyn Fn(&Project) -> Option<String>) -> Markup {
    html! {
        @for project in picks {
            (render_home_card(project, href(project).as_deref()))
        }
    }
}

/// Link resolver for picks that only links slugs with a written detail page.
///
/// Home picks come from their own manifest, so a pick may name a project the
/// projects manifest does not have.
pub fn linked_href<'a>(
    links: DetailLinks,
    pages: &'a HashSet<&'a str>,
) -> impl Fn(&Project) -> Option<String> + 'a {
    move |project| {
        if pages.contains(project.slug.as_str()) {
            links.href(&project.slug)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{project, slugs};

    fn with_category(slug: &str, category: &str, rank: Option<f64>) -> Project {
        project(slug, category, true, rank)
    }

    #[test]
    fn picks_by_rank_one_per_category() {
        let projects = vec![
            with_category("a", "Editing", Some(3.0)),
            with_category("b", "Editing", Some(1.0)),
            with_category("c", "UI/UX", Some(2.0)),
            with_category("d", "Brand", None),
        ];
        assert_eq!(slugs(&pick_featured(&projects, 3)), vec!["b", "c", "d"]);
    }

    #[test]
    fn fills_from_repeated_categories() {
        let projects = vec![
            with_category("a", "Editing", Some(1.0)),
            with_category("b", "Editing", Some(2.0)),
            with_category("c", "UI/UX", Some(3.0)),
            with_category("d", "UI/UX", Some(4.0)),
        ];
        assert_eq!(slugs(&pick_featured(&projects, 3)), vec!["a", "c", "b"]);
    }

    #[test]
    fn ignores_unfeatured_projects() {
        let projects = vec![
            project("a", "Editing", false, Some(1.0)),
            with_category("b", "UI/UX", None),
        ];
        assert_eq!(slugs(&pick_featured(&projects, 3)), vec!["b"]);
    }

    #[test]
    fn unranked_keep_manifest_order() {
        let projects = vec![
            with_category("x", "A", None),
            with_category("y", "B", None),
            with_category("z", "C", Some(1000.0)),
        ];
        assert_eq!(slugs(&pick_featured(&projects, 3)), vec!["x", "y", "z"]);
    }

    #[test]
    fn zero_rank_counts_as_unranked() {
        let projects = vec![
            with_category("zero", "A", Some(0.0)),
            with_category("two", "B", Some(2.0)),
            with_category("none", "C", None),
        ];
        assert_eq!(slugs(&pick_featured(&projects, 3)), vec!["two", "zero", "none"]);
    }

    #[test]
    fn zero_count_picks_nothing() {
        let projects = vec![with_category("a", "A", None)];
        assert!(pick_featured(&projects, 0).is_empty());
    }

    #[test]
    fn card_uses_thumbnail_and_title() {
        let mut p = with_category("reel", "Editing", None);
        p.title = Some("Reel".into());
        p.thumb = Some("assets/reel.jpg".into());
        let href = DetailLinks::Query.href(&p.slug);
        let html = render_home_card(&p, href.as_deref()).into_string();
        assert!(html.contains(r#"href="project.html?slug=reel""#));
        assert!(html.contains(r#"data-src="assets/reel.jpg" alt="Reel thumb""#));
        assert!(html.contains(r#"<div class="card-title">Reel</div>"#));
    }

    #[test]
    fn picks_without_a_detail_page_are_unlinked() {
        let picks = [with_category("kept", "A", None), with_category("gone", "B", None)];
        let refs: Vec<&Project> = picks.iter().collect();
        let pages: HashSet<&str> = ["kept"].into();
        let href = linked_href(DetailLinks::Pages, &pages);
        let html = render_home_projects(&refs, &href).into_string();
        assert_eq!(html.matches("href=").count(), 1);
        assert!(html.contains(r#"href="project/kept.html""#));
    }
}
