//! Local-vs-remote content diff (the `diff` verb)
//!
//! Resolves the change list in push orientation (src = local, dest =
//! remote), then renders a unified diff per differing file. Directories
//! and oversized files are reported, not diffed.

use anyhow::{Context as _, Result};
use similar::TextDiff;
use tokio_util::io::StreamReader;

use drivesync_core::{Change, Entry};

use crate::engine::Engine;

/// Largest file the diff verb will download and render.
const MAX_DIFF_SIZE: u64 = 5 * 1024 * 1024;

/// One rendered diff entry.
#[derive(Debug)]
pub struct DiffEntry {
    pub path: String,
    /// Unified diff text, or a one-line note when content cannot be
    /// compared (directories, too large, one side missing).
    pub text: String,
}

impl Engine {
    /// Diffs every differing path under the sources.
    pub async fn diff(&self) -> Result<Vec<DiffEntry>> {
        let changes = self.resolve_changes(true).await?;
        let mut out = Vec::new();
        for change in &changes {
            if let Some(entry) = self.diff_change(change).await {
                out.push(entry);
            }
        }
        Ok(out)
    }

    async fn diff_change(&self, change: &Change) -> Option<DiffEntry> {
        let path = change.path.as_str();
        let (local, remote) = (change.src.as_ref(), change.dest.as_ref());

        match (local, remote) {
            (None, None) => None,
            (Some(_), None) => note(path, "< local only"),
            (None, Some(_)) => note(path, "> remote only"),
            (Some(l), Some(r)) => {
                if l.is_dir && r.is_dir {
                    return None;
                }
                if l.is_dir != r.is_dir {
                    return note(path, "one side is a directory, the other a regular file");
                }
                if r.size > MAX_DIFF_SIZE || l.size > MAX_DIFF_SIZE {
                    return note(path, "too large to display");
                }
                match self.render_diff(l, r).await {
                    Ok(Some(text)) => Some(DiffEntry {
                        path: path.to_string(),
                        text,
                    }),
                    Ok(None) => None,
                    Err(err) => note(path, &format!("diff failed: {err:#}")),
                }
            }
        }
    }

    async fn render_diff(&self, local: &Entry, remote: &Entry) -> Result<Option<String>> {
        if local.md5_checksum() == remote.md5_checksum() {
            return Ok(None);
        }

        let local_path = local
            .source
            .local_path()
            .context("local entry has no path")?;
        let local_text = tokio::fs::read_to_string(local_path)
            .await
            .context("reading local file")?;

        let id = remote.remote_id.as_deref().unwrap_or_default();
        let stream = self.remote.download(id, None).await?;
        let mut reader = StreamReader::new(stream);
        let mut remote_bytes = Vec::new();
        tokio::io::copy(&mut reader, &mut remote_bytes)
            .await
            .context("downloading remote content")?;
        let remote_text = String::from_utf8_lossy(&remote_bytes).into_owned();

        let diff = TextDiff::from_lines(&remote_text, &local_text);
        let text = diff
            .unified_diff()
            .header("remote", "local")
            .to_string();
        Ok(Some(text))
    }
}

fn note(path: &str, text: &str) -> Option<DiffEntry> {
    Some(DiffEntry {
        path: path.to_string(),
        text: text.to_string(),
    })
}
