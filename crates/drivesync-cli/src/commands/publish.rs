//! `pub` and `unpub`.

use anyhow::Result;
use clap::Args;

use drivesync_sync::SyncOptions;

use crate::commands::build_engine;

#[derive(Debug, Args)]
pub struct PublishCommand {
    /// Paths relative to the working-copy root
    pub paths: Vec<String>,
}

impl PublishCommand {
    pub async fn execute(self) -> Result<()> {
        let engine = build_engine(SyncOptions::default(), &self.paths).await?;
        for (path, url) in engine.publish().await? {
            println!("{path}: {url}");
        }
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct UnpublishCommand {
    /// Paths relative to the working-copy root
    pub paths: Vec<String>,
}

impl UnpublishCommand {
    pub async fn execute(self) -> Result<()> {
        let engine = build_engine(SyncOptions::default(), &self.paths).await?;
        engine.unpublish().await
    }
}
