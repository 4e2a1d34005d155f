//! Per-page "like" counter over a key-value store.
//!
//! Each page gets two keys derived from its path and query:
//!
//! ```text
//! likes:<sanitized>:count   → "12"
//! likes:<sanitized>:user    → "1" when this visitor has liked the page
//! ```
//!
//! Updates are plain read-modify-write with no locking. Two writers on the
//! same key can lose an update; the counter is a display nicety, not a ledger.

use maud::{Markup, html};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LikesError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// String key-value storage, shaped like a browser's local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Store persisted as a flat JSON object. Changes are written on [`save`](Self::save).
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open the store at `path`; a missing file is an empty store.
    pub fn open(path: &Path) -> Result<Self, LikesError> {
        let entries = if path.exists() {
            serde_json::from_str(&fs::read_to_string(path)?)?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn save(&self) -> Result<(), LikesError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.entries)?)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Storage key prefix for a page: every character outside `[A-Za-z0-9_-]`
/// becomes `_`.
pub fn page_key(path_and_query: &str) -> String {
    let sanitized: String = path_and_query
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("likes:{sanitized}")
}

/// Like count and whether this visitor has liked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LikeState {
    pub count: u64,
    pub liked: bool,
}

/// Leading decimal digits of a stored count; anything else reads as 0.
fn parse_count(raw: &str) -> u64 {
    let digits: String = raw
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}

/// The like counter for one page.
pub struct LikeCounter<'a, S: KeyValueStore> {
    store: &'a mut S,
    key: String,
}

impl<'a, S: KeyValueStore> LikeCounter<'a, S> {
    pub fn new(store: &'a mut S, path_and_query: &str) -> Self {
        Self {
            store,
            key: page_key(path_and_query),
        }
    }

    fn count_key(&self) -> String {
        format!("{}:count", self.key)
    }

    fn user_key(&self) -> String {
        format!("{}:user", self.key)
    }

    pub fn state(&self) -> LikeState {
        LikeState {
            count: self
                .store
                .get(&self.count_key())
                .map(|raw| parse_count(&raw))
                .unwrap_or(0),
            liked: self.store.get(&self.user_key()).as_deref() == Some("1"),
        }
    }

    /// Like, or undo a previous like. The count never drops below zero.
    pub fn toggle(&mut self) -> LikeState {
        let LikeState { mut count, liked } = self.state();
        let (count_key, user_key) = (self.count_key(), self.user_key());
        if liked {
            count = count.saturating_sub(1);
            self.store.remove(&user_key);
        } else {
            count += 1;
            self.store.set(&user_key, "1");
        }
        self.store.set(&count_key, &count.to_string());
        LikeState {
            count,
            liked: !liked,
        }
    }
}

/// Like button with its current count.
pub fn render_like_button(state: LikeState, key: &str) -> Markup {
    html! {
        button #likeBtn .like-btn .liked[state.liked] type="button" data-like-key=(key) {
            span #heartIcon .heart aria-hidden="true" { "♥" }
            span #likeCount { (state.count) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn page_key_sanitizes_path_and_query() {
        assert_eq!(
            page_key("/project/reel.html?slug=a b"),
            "likes:_project_reel_html_slug_a_b"
        );
        assert_eq!(page_key("/a-b_c"), "likes:_a-b_c");
    }

    #[test]
    fn toggle_likes_then_unlikes() {
        let mut store = MemoryStore::default();
        let mut counter = LikeCounter::new(&mut store, "/project.html?slug=a");
        assert_eq!(counter.state(), LikeState::default());

        let liked = counter.toggle();
        assert_eq!(liked, LikeState { count: 1, liked: true });
        let unliked = counter.toggle();
        assert_eq!(unliked, LikeState { count: 0, liked: false });
    }

    #[test]
    fn count_never_goes_negative() {
        let mut store = MemoryStore::default();
        let key = page_key("/p");
        store.set(&format!("{key}:user"), "1");
        let mut counter = LikeCounter::new(&mut store, "/p");
        assert_eq!(counter.toggle().count, 0);
    }

    #[test]
    fn garbage_count_reads_as_zero() {
        assert_eq!(parse_count("abc"), 0);
        assert_eq!(parse_count("12abc"), 12);
        assert_eq!(parse_count(""), 0);
    }

    #[test]
    fn pages_are_counted_separately() {
        let mut store = MemoryStore::default();
        LikeCounter::new(&mut store, "/a").toggle();
        assert_eq!(LikeCounter::new(&mut store, "/b").state().count, 0);
        assert_eq!(LikeCounter::new(&mut store, "/a").state().count, 1);
    }

    #[test]
    fn file_store_round_trips() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state/likes.json");
        let mut store = JsonFileStore::open(&path).unwrap();
        LikeCounter::new(&mut store, "/a").toggle();
        store.save().unwrap();

        let mut reopened = JsonFileStore::open(&path).unwrap();
        let state = LikeCounter::new(&mut reopened, "/a").state();
        assert_eq!(state, LikeState { count: 1, liked: true });
    }

    #[test]
    fn like_button_shows_count() {
        let html = render_like_button(LikeState { count: 3, liked: true }, "likes:_a").into_string();
        assert!(html.contains(r#"<span id="likeCount">3</span>"#));
        assert!(html.contains("liked"));
    }
}
