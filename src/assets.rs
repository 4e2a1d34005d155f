//! Asset paths: absolute URL resolution and media type inference.
//!
//! Manifests mix absolute URLs, root-relative paths, and relative paths. Every
//! path is resolved against the site origin before use, so a detail page at
//! any depth loads the same file.

use crate::types::{MediaEntry, MediaKind};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogg"];

static DUPLICATE_SLASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^:])/{2,}").expect("static regex"));

/// Resolve `path` to an absolute URL relative to `origin`.
///
/// ```text
/// ("https://me.dev", "img/a.jpg")          → https://me.dev/img/a.jpg
/// ("https://me.dev", "/img/a.jpg")         → https://me.dev/img/a.jpg
/// ("https://me.dev", "https://cdn.io/b")   → https://cdn.io/b
/// ```
///
/// When the origin cannot serve as a base URL, falls back to joining the
/// strings and collapsing duplicate slashes (a `://` separator is kept).
pub fn resolve_asset_url(origin: &str, path: &str) -> String {
    let origin = origin.trim_end_matches('/');
    match Url::parse(&format!("{origin}/")).and_then(|base| base.join(path)) {
        Ok(url) => url.into(),
        Err(_) => {
            let path = path.strip_prefix("./").unwrap_or(path);
            let joined = format!("{origin}/{path}");
            DUPLICATE_SLASHES.replace_all(&joined, "$1/").into_owned()
        }
    }
}

/// Decide how to present a media file.
///
/// An explicit type wins (`video` means video, anything else image); without
/// one, `mp4`/`webm`/`ogg` extensions are videos and everything else is an image.
pub fn infer_media_kind(path: &str, declared: Option<&str>) -> MediaKind {
    if let Some(kind) = declared {
        return if kind.eq_ignore_ascii_case("video") {
            MediaKind::Video
        } else {
            MediaKind::Image
        };
    }
    let is_video = path
        .rsplit_once('.')
        .map(|(_, ext)| VIDEO_EXTENSIONS.iter().any(|v| ext.eq_ignore_ascii_case(v)))
        .unwrap_or(false);
    if is_video {
        MediaKind::Video
    } else {
        MediaKind::Image
    }
}

/// Kind of a manifest media entry.
pub fn entry_kind(entry: &MediaEntry) -> MediaKind {
    infer_media_kind(entry.path(), entry.declared_kind())
}
