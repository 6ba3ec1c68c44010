//! `move`, `rename` and `copy`.

use anyhow::Result;
use clap::Args;

use drivesync_sync::SyncOptions;

use crate::commands::build_engine;

#[derive(Debug, Args)]
pub struct MoveCommand {
    /// Source paths followed by the destination folder
    pub paths: Vec<String>,

    /// Overwrite an existing entry at the destination
    #[arg(long)]
    pub force: bool,
}

impl MoveCommand {
    pub async fn execute(self) -> Result<()> {
        let opts = SyncOptions {
            force: self.force,
            ..Default::default()
        };
        let engine = build_engine(opts, &self.paths).await?;
        engine.move_entries().await
    }
}

#[derive(Debug, Args)]
pub struct RenameCommand {
    /// The path to rename followed by the new name
    pub paths: Vec<String>,

    /// Overwrite an existing entry with the new name
    #[arg(long)]
    pub force: bool,
}

impl RenameCommand {
    pub async fn execute(self) -> Result<()> {
        // The second positional is a bare title, not a path; hand it to
        // the engine untouched.
        let (path, new_name) = match self.paths.as_slice() {
            [path, new_name] => (path.clone(), new_name.clone()),
            _ => anyhow::bail!("rename: expected <src> <new-name>"),
        };
        let opts = SyncOptions {
            force: self.force,
            ..Default::default()
        };
        let engine = build_engine(opts, &[path]).await?;
        engine.rename_entry(&new_name).await
    }
}

#[derive(Debug, Args)]
pub struct CopyCommand {
    /// Source paths followed by the destination
    pub paths: Vec<String>,

    /// Copy folders recursively
    #[arg(short, long)]
    pub recursive: bool,
}

impl CopyCommand {
    pub async fn execute(self) -> Result<()> {
        let opts = SyncOptions {
            recursive: self.recursive,
            ..Default::default()
        };
        let engine = build_engine(opts, &self.paths).await?;
        engine.copy_entries().await
    }
}
