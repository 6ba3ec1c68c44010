//! Local directory walker
//!
//! Enumerates one directory of the working copy as a stream of entries,
//! applying the sentinel, hidden and ignore filters. Symbolic links are
//! resolved: the target's metadata is emitted under the link's own path,
//! and broken links are skipped.

use drivesync_core::{Context, CoreError, Entry, DOT_DIR};
use regex::Regex;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Buffer of the walker channel.
const WALK_CHANNEL_CAPACITY: usize = 64;

/// Streams the children of `rel_path` (a working-copy path).
///
/// The hidden filter runs first, the ignore pattern second; the two are
/// independent. The channel closes on completion or on the first
/// directory-read error, which is delivered in-stream.
pub fn list_local(
    context: &Context,
    rel_path: &str,
    include_hidden: bool,
    ignore: Option<Regex>,
) -> mpsc::Receiver<Result<Entry, CoreError>> {
    let (tx, rx) = mpsc::channel(WALK_CHANNEL_CAPACITY);
    let abs = context.abs_path_of(rel_path);

    tokio::spawn(async move {
        let mut dir = match tokio::fs::read_dir(&abs).await {
            Ok(dir) => dir,
            Err(err) => {
                let _ = tx.send(Err(err.into())).await;
                return;
            }
        };

        loop {
            let next = match dir.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => return,
                Err(err) => {
                    let _ = tx.send(Err(err.into())).await;
                    return;
                }
            };

            let name = next.file_name().to_string_lossy().into_owned();
            if name == DOT_DIR {
                continue;
            }
            if !include_hidden && name.starts_with('.') {
                continue;
            }
            if let Some(re) = &ignore {
                if re.is_match(&name) {
                    debug!(name, "skipping ignored entry");
                    continue;
                }
            }

            let path = next.path();
            let file_type = match next.file_type().await {
                Ok(ft) => ft,
                Err(err) => {
                    warn!(name, error = %err, "cannot stat entry, skipping");
                    continue;
                }
            };

            // Follow symlinks: target metadata under the link's path.
            let meta = if file_type.is_symlink() {
                match tokio::fs::metadata(&path).await {
                    Ok(meta) => meta,
                    Err(err) => {
                        warn!(name, error = %err, "skipping broken symlink");
                        continue;
                    }
                }
            } else {
                match next.metadata().await {
                    Ok(meta) => meta,
                    Err(err) => {
                        warn!(name, error = %err, "cannot read metadata, skipping");
                        continue;
                    }
                }
            };

            let entry = Entry::local(name, path, &meta);
            if tx.send(Ok(entry)).await.is_err() {
                return;
            }
        }
    });

    rx
}
