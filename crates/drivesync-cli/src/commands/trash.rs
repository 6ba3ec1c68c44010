//! `trash`, `untrash` and `emptytrash`.

use anyhow::Result;
use clap::Args;

use drivesync_sync::SyncOptions;

use crate::commands::build_engine;
use crate::output;

#[derive(Debug, Args)]
pub struct TrashCommand {
    /// Paths relative to the working-copy root
    pub paths: Vec<String>,
}

impl TrashCommand {
    pub async fn execute(self) -> Result<()> {
        let engine = build_engine(SyncOptions::default(), &self.paths).await?;
        engine.trash_sources().await
    }
}

#[derive(Debug, Args)]
pub struct UntrashCommand {
    /// Paths relative to the working-copy root
    pub paths: Vec<String>,
}

impl UntrashCommand {
    pub async fn execute(self) -> Result<()> {
        let engine = build_engine(SyncOptions::default(), &self.paths).await?;
        engine.untrash_sources().await
    }
}

#[derive(Debug, Args)]
pub struct EmptyTrashCommand {
    /// Skip the confirmation prompt
    #[arg(long = "no-prompt")]
    pub no_prompt: bool,
}

impl EmptyTrashCommand {
    pub async fn execute(self) -> Result<()> {
        let engine = build_engine(SyncOptions::default(), &[]).await?;
        if !output::confirm(
            "Permanently empty the trash? This cannot be undone",
            self.no_prompt,
        ) {
            return Ok(());
        }
        engine.empty_trash().await
    }
}
