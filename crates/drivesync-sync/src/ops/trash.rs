//! Trash management: trash, untrash, emptytrash.

use anyhow::{Context as _, Result};

use crate::engine::Engine;

impl Engine {
    /// Moves every source path into the trash.
    pub async fn trash_sources(&self) -> Result<()> {
        for source in &self.opts.sources {
            let entry = self
                .remote
                .find_by_path(source)
                .await
                .map_err(anyhow::Error::new)
                .with_context(|| source.clone())?;
            let id = entry.remote_id.as_deref().unwrap_or_default();
            self.remote
                .trash(id)
                .await
                .with_context(|| source.clone())?;
        }
        Ok(())
    }

    /// Restores every source path from the trash; lookups are scoped to
    /// trashed entries.
    pub async fn untrash_sources(&self) -> Result<()> {
        for source in &self.opts.sources {
            let entry = self
                .remote
                .find_by_path_trashed(source)
                .await
                .map_err(anyhow::Error::new)
                .with_context(|| source.clone())?;
            let id = entry.remote_id.as_deref().unwrap_or_default();
            self.remote
                .untrash(id)
                .await
                .with_context(|| source.clone())?;
        }
        Ok(())
    }

    /// Permanently clears the trash.
    pub async fn empty_trash(&self) -> Result<()> {
        self.remote
            .empty_trash()
            .await
            .context("failed to empty trash")
    }
}
