//! Remote listing (the `list` verb)
//!
//! Breadth-first traversal of the remote tree under each source path,
//! bounded by the configured depth (negative = unlimited). Returns rows
//! for the CLI to render.

use anyhow::{Context as _, Result};
use futures::future::BoxFuture;

use drivesync_core::domain::paths;
use drivesync_core::Entry;

use crate::engine::Engine;

/// One listed entry with its display path.
#[derive(Debug)]
pub struct ListedEntry {
    /// Working-copy path, display form (separators unescaped).
    pub path: String,
    pub entry: Entry,
}

impl Engine {
    /// Lists the remote contents of every source path.
    pub async fn list(&self) -> Result<Vec<ListedEntry>> {
        let mut rows = Vec::new();
        for source in &self.opts.sources {
            let root = if self.opts.in_trash {
                self.remote.find_by_path_trashed(source).await
            } else {
                self.remote.find_by_path(source).await
            }
            .map_err(anyhow::Error::new)
            .with_context(|| source.clone())?;

            if !root.is_dir {
                rows.push(ListedEntry {
                    path: display_path(source),
                    entry: root,
                });
                continue;
            }
            self.list_level(root, source.clone(), self.opts.depth, &mut rows)
                .await?;
        }
        Ok(rows)
    }

    fn list_level<'a>(
        &'a self,
        dir: Entry,
        dir_path: String,
        depth: i64,
        rows: &'a mut Vec<ListedEntry>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if depth == 0 {
                return Ok(());
            }
            let Some(parent_id) = dir.remote_id.clone() else {
                return Ok(());
            };

            let mut rx = self.remote.list_children(&parent_id, self.opts.hidden).await;
            let mut subdirs = Vec::new();
            while let Some(item) = rx.recv().await {
                let entry = item.context("listing failed")?;
                let child_path = paths::join_child(&dir_path, &entry.name);
                if entry.is_dir {
                    subdirs.push((entry.clone(), child_path.clone()));
                }
                rows.push(ListedEntry {
                    path: display_path(&child_path),
                    entry,
                });
            }

            let next_depth = if depth > 0 { depth - 1 } else { depth };
            for (subdir, child_path) in subdirs {
                self.list_level(subdir, child_path, next_depth, rows).await?;
            }
            Ok(())
        })
    }
}

fn display_path(path: &str) -> String {
    path.split('/')
        .map(paths::unescape_name)
        .collect::<Vec<_>>()
        .join("/")
}
