//! Working-copy path handling
//!
//! Paths inside the working copy always start with `/` and use `/` as the
//! separator regardless of host OS. Remote names may themselves contain
//! `/`; those are stored percent-escaped on the local side and unescaped
//! for display, so child paths are joined by plain concatenation without
//! filesystem normalization.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

/// Escape set for entry names: the separator itself plus `%` so that the
/// escaping round-trips for names that already contain percent signs.
const NAME_ESCAPE: &AsciiSet = &CONTROLS.add(b'/').add(b'%');

/// Escapes a remote entry name for use as a single local path segment.
pub fn escape_name(name: &str) -> String {
    utf8_percent_encode(name, NAME_ESCAPE).to_string()
}

/// Reverses [`escape_name`].
pub fn unescape_name(name: &str) -> String {
    percent_decode_str(name).decode_utf8_lossy().into_owned()
}

/// True for any spelling of the remote root.
pub fn root_like(path: &str) -> bool {
    path.is_empty() || path == "/" || path == "root"
}

/// Joins a child name onto a parent working-copy path.
///
/// Plain concatenation, preserving empty segments: escaped names decide
/// the segment boundaries, not the filesystem.
pub fn join_child(parent: &str, name: &str) -> String {
    if root_like(parent) {
        format!("/{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// Splits a working-copy path into parent directory and base name.
///
/// `"/a/b"` becomes `("/a", "b")`; entries directly under the root report
/// `"/"` as their parent.
pub fn split_parent(path: &str) -> (String, String) {
    match path.rsplit_once('/') {
        Some(("", base)) => ("/".to_string(), base.to_string()),
        Some((dir, base)) => (dir.to_string(), base.to_string()),
        None => ("/".to_string(), path.to_string()),
    }
}

/// Normalizes a user-supplied path to a `/`-prefixed working-copy path.
pub fn normalize(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Splits a `/`-prefixed path into its non-empty segments.
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}
