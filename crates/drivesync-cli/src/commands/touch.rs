//! `touch` — bump remote modification times.

use anyhow::Result;
use clap::Args;

use drivesync_sync::{Engine, SyncOptions};

use crate::commands::build_engine;

#[derive(Debug, Args)]
pub struct TouchCommand {
    /// Paths relative to the working-copy root
    pub paths: Vec<String>,

    /// Recurse into directories
    #[arg(short, long)]
    pub recursive: bool,

    /// Include hidden entries
    #[arg(long)]
    pub hidden: bool,
}

impl TouchCommand {
    pub async fn execute(self) -> Result<()> {
        let opts = SyncOptions {
            recursive: self.recursive,
            hidden: self.hidden,
            ..Default::default()
        };

        let engine = build_engine(opts, &self.paths).await?;
        let outcomes = engine.touch().await?;
        for outcome in &outcomes {
            match &outcome.result {
                Ok(mtime) => println!("{}: {}", outcome.path, mtime.format("%Y-%m-%d %H:%M:%S")),
                Err(err) => eprintln!("touch: {} {err}", outcome.path),
            }
        }
        Engine::touch_failures(&outcomes)
    }
}
