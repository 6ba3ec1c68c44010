//! Remote metadata display (the `stat` verb).

use anyhow::{Context as _, Result};
use futures::future::BoxFuture;

use drivesync_core::domain::paths;
use drivesync_core::ports::PermissionInfo;
use drivesync_core::Entry;

use crate::engine::Engine;

/// Metadata and permissions of one remote entry.
#[derive(Debug)]
pub struct StatInfo {
    pub path: String,
    pub entry: Entry,
    pub permissions: Vec<PermissionInfo>,
}

impl Engine {
    /// Stats every source path, recursing into directories under `-r`.
    pub async fn stat(&self) -> Result<Vec<StatInfo>> {
        let mut out = Vec::new();
        for source in &self.opts.sources {
            let entry = self
                .remote
                .find_by_path(source)
                .await
                .map_err(anyhow::Error::new)
                .with_context(|| source.clone())?;
            self.stat_entry(entry, source.clone(), &mut out).await?;
        }
        Ok(out)
    }

    fn stat_entry<'a>(
        &'a self,
        entry: Entry,
        path: String,
        out: &'a mut Vec<StatInfo>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let id = entry.remote_id.clone().unwrap_or_default();
            let permissions = self
                .remote
                .list_permissions(&id)
                .await
                .unwrap_or_default();

            let recurse = self.opts.recursive && entry.is_dir;
            out.push(StatInfo {
                path: path.clone(),
                entry,
                permissions,
            });

            if recurse {
                let mut rx = self.remote.list_children(&id, self.opts.hidden).await;
                while let Some(item) = rx.recv().await {
                    let child = item.context("listing failed")?;
                    let child_path = paths::join_child(&path, &child.name);
                    self.stat_entry(child, child_path, out).await?;
                }
            }
            Ok(())
        })
    }
}
