//! `pull` — bring the local tree into agreement with the remote.

use anyhow::{bail, Result};
use clap::Args;

use drivesync_sync::SyncOptions;

use crate::commands::{build_engine, TransferFlags};
use crate::output;

#[derive(Debug, Args)]
pub struct PullCommand {
    /// Paths relative to the working-copy root
    pub paths: Vec<String>,

    #[command(flatten)]
    pub flags: TransferFlags,

    /// Export formats for server-native documents (e.g. pdf,csv)
    #[arg(long, value_delimiter = ',')]
    pub export: Vec<String>,

    /// Directory to place exports in (defaults beside the file)
    #[arg(long = "exports-dir")]
    pub exports_dir: Option<std::path::PathBuf>,

    /// Stream file contents to stdout instead of writing files
    #[arg(long)]
    pub piped: bool,
}

impl PullCommand {
    pub async fn execute(self) -> Result<()> {
        let mut opts = SyncOptions {
            recursive: true,
            exports: self.export.clone(),
            exports_dir: self.exports_dir.clone(),
            piped: self.piped,
            ..Default::default()
        };
        self.flags.apply(&mut opts);

        let engine = build_engine(opts, &self.paths).await?;

        if self.piped {
            return engine.pull_piped().await;
        }

        println!("Resolving...");
        let changes = engine.resolve_changes(false).await?;
        let partitioned = engine.partition_conflicts(changes);

        if !partitioned.conflicts.is_empty() {
            output::warn_conflicts(&partitioned.conflicts);
            bail!("conflicts have prevented a pull operation");
        }

        let executable = partitioned.executable;
        if executable.is_empty() {
            println!("Everything is up-to-date.");
            return Ok(());
        }

        output::print_changes(&executable);
        if !output::confirm("Proceed with the changes?", self.flags.no_prompt) {
            return Ok(());
        }

        engine.execute_pull(executable).await
    }
}
