//! Site navigation bar with the current page highlighted.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};

/// A top-level navigation entry from `[site] nav` in config.toml.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

/// Last path segment of `pathname`; the site root maps to `index.html`.
pub fn current_file(pathname: &str) -> &str {
    let path = pathname.split(['?', '#']).next().unwrap_or("");
    match path.rsplit('/').next() {
        Some(last) if !last.is_empty() => last,
        _ => "index.html",
    }
}

/// Index of the link pointing at the page being shown, if any.
pub fn active_link(links: &[NavLink], pathname: &str) -> Option<usize> {
    let page = current_file(pathname);
    links.iter().position(|link| current_file(&link.href) == page)
}

pub fn render_nav(links: &[NavLink], pathname: &str) -> Markup {
    let active = active_link(links, pathname);
    html! {
        nav.main-nav {
            @for (i, link) in links.iter().enumerate() {
                a.nav-link.active[active == Some(i)] href=(link.href) { (link.label) }
            }
        }
    }
}
