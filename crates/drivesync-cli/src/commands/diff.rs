//! `diff` — compare local files with their remote counterparts.

use anyhow::Result;
use clap::Args;

use drivesync_sync::SyncOptions;

use crate::commands::{build_engine, TransferFlags};

#[derive(Debug, Args)]
pub struct DiffCommand {
    /// Paths relative to the working-copy root
    pub paths: Vec<String>,

    #[command(flatten)]
    pub flags: TransferFlags,
}

impl DiffCommand {
    pub async fn execute(self) -> Result<()> {
        let mut opts = SyncOptions {
            recursive: true,
            ..Default::default()
        };
        self.flags.apply(&mut opts);

        let engine = build_engine(opts, &self.paths).await?;
        for entry in engine.diff().await? {
            println!("--- {}", entry.path);
            println!("{}", entry.text);
        }
        Ok(())
    }
}
