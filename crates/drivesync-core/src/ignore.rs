//! `.driveignore` pattern handling
//!
//! The ignore file holds one regex clause per line; `#` lines are
//! comments. Clauses are joined with `|` into a single compiled pattern
//! matched against entry names. The hidden-file filter is evaluated
//! independently, before this pattern.

use std::path::Path;

use regex::Regex;
use tracing::warn;

/// Loads and compiles the ignore pattern of a working copy.
///
/// Returns `None` when the file is absent, empty after comment stripping,
/// or fails to compile (a broken pattern must not silently drop entries).
pub fn load(ignore_file: &Path) -> Option<Regex> {
    let content = std::fs::read_to_string(ignore_file).ok()?;
    compile(content.lines())
}

/// Compiles non-comment clauses into one alternation.
pub fn compile<'a>(lines: impl IntoIterator<Item = &'a str>) -> Option<Regex> {
    let clauses: Vec<&str> = lines
        .into_iter()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();
    if clauses.is_empty() {
        return None;
    }
    match Regex::new(&clauses.join("|")) {
        Ok(re) => Some(re),
        Err(err) => {
            warn!(error = %err, "ignoring unparsable .driveignore pattern");
            None
        }
    }
}
