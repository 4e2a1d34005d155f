//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Each project is shown
//! by positional index and title, with its slug, categories, and generated
//! file as indented context lines. That makes `check` read as a content
//! inventory and `build` as a map from content to pages.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Projects
//! 001 Travel App
//!     Slug: travel-app
//!     Category: UI/UX · 2024
//!     Featured
//! 002 Brand Reel
//!     Slug: brand-reel
//!     Category: Editing, Brand Identity · 2023
//!
//! Tabs
//!     [UI/UX] Brand Identity · Editing · View all
//!
//! Home
//! 001 Bank Dashboard
//!
//! Broken assets
//!     assets/missing-thumb.jpg
//! ```
//!
//! ## Build
//!
//! ```text
//! Home → index.html
//! Projects → projects.html (+9 filter pages)
//! 001 Travel App → project/travel-app.html
//! 002 Brand Reel → project/brand-reel.html
//!
//! Generated 14 pages, copied 8 assets
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::detail::{DetailOutcome, DetailView, NOT_FOUND_TITLE};
use crate::gallery::GalleryState;
use crate::generate::{BuildReport, SitePlan, detail_file};
use crate::likes::LikeState;
use crate::types::Project;
use crate::view::card_subtitle;
use std::path::Path;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entity header: positional index + display title.
///
/// ```text
/// 001 Travel App
/// 002 (untitled)
/// ```
fn entity_header(index: usize, project: &Project) -> String {
    match project.display_title() {
        "" => format!("{} (untitled)", format_index(index)),
        title => format!("{} {}", format_index(index), title),
    }
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_check_output(plan: &SitePlan, source_root: &Path) -> Vec<String> {
    let mut lines = vec![format!("Source: {}", source_root.display()), String::new()];

    lines.push("Projects".to_string());
    match &plan.gallery.load_error {
        Some(reason) => lines.push(format!("{}Error: {reason}", indent(1))),
        None if plan.gallery.projects.is_empty() => {
            lines.push(format!("{}(none)", indent(1)))
        }
        None => {
            for (i, project) in plan.gallery.projects.iter().enumerate() {
                lines.push(entity_header(i + 1, project));
                if project.slug.is_empty() {
                    lines.push(format!("{}Slug: (missing)", indent(1)));
                } else {
                    lines.push(format!("{}Slug: {}", indent(1), project.slug));
                }
                let subtitle = card_subtitle(project);
                if !subtitle.is_empty() {
                    lines.push(format!("{}Category: {subtitle}", indent(1)));
                }
                let summary = project.summary();
                if !summary.is_empty() {
                    lines.push(format!("{}Summary: {}", indent(1), truncate_desc(summary, 60)));
                }
                if project.featured {
                    lines.push(format!("{}Featured", indent(1)));
                }
            }
        }
    }

    lines.push(String::new());
    lines.push("Tabs".to_string());
    lines.push(format!("{}{}", indent(1), format_tab_bar(&plan.gallery)));

    lines.push(String::new());
    lines.push("Home".to_string());
    match &plan.home_error {
        Some(reason) => lines.push(format!("{}Error: {reason}", indent(1))),
        None => {
            for (i, project) in plan.home_picks.iter().enumerate() {
                lines.push(entity_header(i + 1, project));
            }
        }
    }

    if !plan.skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped detail pages".to_string());
        for (slug, reason) in &plan.skipped {
            let name = if slug.is_empty() { "(no slug)" } else { slug.as_str() };
            lines.push(format!("{}{name}: {reason}", indent(1)));
        }
    }

    if !plan.broken_assets.is_empty() {
        lines.push(String::new());
        lines.push("Broken assets".to_string());
        for url in &plan.broken_assets {
            lines.push(format!("{}{url}", indent(1)));
        }
    }

    lines
}

pub fn print_check_output(plan: &SitePlan, source_root: &Path) {
    print_lines(format_check_output(plan, source_root));
}

// ============================================================================
// Build
// ============================================================================

pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let plan = &report.plan;
    let mut lines = vec!["Home \u{2192} index.html".to_string()];

    let filter_pages = report
        .pages
        .iter()
        .filter(|p| {
            p.file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with("projects-"))
        })
        .count();
    lines.push(format!(
        "Projects \u{2192} projects.html (+{filter_pages} filter pages)"
    ));

    for (i, project) in plan.detail_projects.iter().enumerate() {
        if let Ok(file) = detail_file(plan.gallery.links, &project.slug) {
            lines.push(format!(
                "{} \u{2192} {}",
                entity_header(i + 1, project),
                file.display()
            ));
        }
    }

    if !plan.broken_assets.is_empty() {
        lines.push(format!(
            "{} broken assets (run `check` to list them)",
            plan.broken_assets.len()
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {} pages, copied {} assets",
        report.pages.len(),
        report.copied_assets
    ));
    lines
}

pub fn print_build_output(report: &BuildReport) {
    print_lines(format_build_output(report));
}

// ============================================================================
// Grid
// ============================================================================

/// Tab bar on one line with the active tab bracketed.
fn format_tab_bar(state: &GalleryState) -> String {
    state
        .tabs
        .tabs
        .iter()
        .map(|t| {
            if t.active {
                format!("[{}]", t.label)
            } else {
                t.label.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" \u{b7} ")
}

pub fn format_grid_output(state: &GalleryState) -> Vec<String> {
    let mut lines = vec![
        format_tab_bar(state),
        format!("Sort: {}", state.sort.label()),
        String::new(),
    ];
    if let Some(reason) = &state.load_error {
        lines.push(format!("Error loading projects: {reason}"));
        return lines;
    }
    let visible = state.visible();
    if visible.is_empty() {
        lines.push(crate::view::NO_PROJECTS.to_string());
    }
    for (i, project) in visible.iter().enumerate() {
        let marker = if project.featured { " *" } else { "" };
        lines.push(format!("{}{marker}", entity_header(i + 1, project)));
        let subtitle = card_subtitle(project);
        if !subtitle.is_empty() {
            lines.push(format!("{}{subtitle}", indent(1)));
        }
        let href = state.links.href(&project.slug);
        lines.push(format!(
            "{}{}",
            indent(1),
            href.as_deref().unwrap_or("(no detail page)")
        ));
    }
    lines
}

pub fn print_grid_output(state: &GalleryState) {
    print_lines(format_grid_output(state));
}

// ============================================================================
// Detail
// ============================================================================

pub fn format_detail_output(outcome: &DetailOutcome, view: Option<&DetailView>) -> Vec<String> {
    match (outcome, view) {
        (_, Some(view)) => {
            let mut lines = vec![view.title.clone()];
            if !view.meta.is_empty() {
                lines.push(format!("{}{}", indent(1), view.meta.join(" \u{b7} ")));
            }
            if !view.description.is_empty() {
                lines.push(format!("{}{}", indent(1), view.description));
            }
            if let Some(hero) = &view.hero {
                lines.push(format!("{}Hero: {}", indent(1), hero.url));
            }
            for (i, item) in view.gallery.iter().enumerate() {
                let status = if item.broken { " (broken)" } else { "" };
                lines.push(format!(
                    "{}{} {:?}: {}{status}",
                    indent(1),
                    format_index(i + 1),
                    item.kind,
                    item.url
                ));
            }
            lines
        }
        (DetailOutcome::MissingSlug, None) => vec![
            NOT_FOUND_TITLE.to_string(),
            format!("{}{}", indent(1), crate::detail::NO_SLUG_MESSAGE),
        ],
        (DetailOutcome::LoadFailed, None) => vec![crate::detail::LOAD_FAILED_MESSAGE.to_string()],
        (DetailOutcome::NotFound(slug), None) => {
            vec![format!("{NOT_FOUND_TITLE}: {slug}")]
        }
        (DetailOutcome::Found(project), None) => vec![project.display_title().to_string()],
    }
}

pub fn print_detail_output(outcome: &DetailOutcome, view: Option<&DetailView>) {
    print_lines(format_detail_output(outcome, view));
}

// ============================================================================
// Likes
// ============================================================================

pub fn format_like_output(page: &str, state: LikeState) -> Vec<String> {
    let heart = if state.liked { "\u{2665}" } else { "\u{2661}" };
    vec![format!("{heart} {} {page}", state.count)]
}

pub fn print_like_output(page: &str, state: LikeState) {
    print_lines(format_like_output(page, state));
}

// ============================================================================
// Tests
// ============================================================================
