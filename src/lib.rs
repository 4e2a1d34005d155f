//! # Simple Folio
//!
//! A headless renderer for design and video portfolio sites. Projects live in
//! hand-edited JSON manifests; the crate turns them into a home page of
//! featured work, a filterable projects grid, and per-project detail pages.
//!
//! # Architecture: Load, Derive, Render
//!
//! ```text
//! 1. Load     projects.json / manifest.json  →  Vec<Project>   (manifest)
//! 2. Derive   projects + config               →  tabs, views    (category, view, home)
//! 3. Render   views                           →  HTML targets   (gallery, detail, generate)
//! ```
//!
//! Every page works against a [`targets::RenderTargets`] map of element ids to
//! content. The interactive pages ([`gallery::GalleryPage`], the detail view)
//! render into those targets the same way a browser script would, and
//! [`generate`] snapshots them into static HTML files.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | `Project` and `Media`, with lenient deserialization of hand-edited fields |
//! | [`manifest`] | Fetches and normalizes a manifest (array or keyed object) |
//! | [`category`] | Comma-separated categories, tab building and matching |
//! | [`view`] | Filtering, sorting, card and grid markup |
//! | [`gallery`] | Projects page state machine: tabs, sort, thumbnail probing |
//! | [`home`] | Featured picks for the home page |
//! | [`detail`] | Slug resolution and detail page rendering |
//! | [`assets`] | Asset URL resolution against the site origin |
//! | [`probe`] | Asset availability checks (local files, parallel) |
//! | [`likes`] | Per-page like counters over a key-value store |
//! | [`nav`] | Main navigation with active-link detection |
//! | [`visibility`] | Viewport intersection model for lazy loading and reveals |
//! | [`targets`] | Element-id render targets |
//! | [`config`] | `config.toml` loading, merging over stock defaults, validation |
//! | [`generate`] | Static site build: plans pages and writes HTML + assets |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Tolerant Manifests
//!
//! Manifests are edited by hand, so a bad field never fails a whole load:
//! a non-array `media` is treated as empty, `featured` follows JavaScript
//! truthiness, and an empty or missing slug still renders a card. Only an
//! unreadable or unparseable file surfaces as an error, and the pages render
//! an inline message instead of crashing.
//!
//! ## Probing Once
//!
//! Checking whether thumbnails and media exist is the only slow step. A build
//! probes every asset once in [`generate::plan`] (in parallel with rayon) and
//! replays the result through [`probe::KnownBroken`] while rendering.
//!
//! ## Static Filter States
//!
//! The static build writes one projects page per tab and sort order, so the
//! grid works with scripting disabled. `folio.js` adds the motion layer
//! (lazy images, reveals, counters) and like buttons on top.

pub mod assets;
pub mod category;
pub mod config;
pub mod detail;
pub mod gallery;
pub mod generate;
pub mod home;
pub mod likes;
pub mod manifest;
pub mod nav;
pub mod output;
pub mod probe;
pub mod targets;
pub mod types;
pub mod view;
pub mod visibility;

#[cfg(test)]
pub(crate) mod test_helpers;
