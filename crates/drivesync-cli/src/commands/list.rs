//! `list` — list remote contents.

use anyhow::Result;
use clap::Args;

use drivesync_sync::SyncOptions;

use crate::commands::build_engine;
use crate::output::pretty_bytes;

#[derive(Debug, Args)]
pub struct ListCommand {
    /// Paths relative to the working-copy root
    pub paths: Vec<String>,

    /// Recursion depth; negative for unlimited
    #[arg(short, long, default_value_t = 1)]
    pub depth: i64,

    /// Include hidden entries
    #[arg(long)]
    pub hidden: bool,

    /// Show owner names
    #[arg(long)]
    pub owners: bool,

    /// List trashed entries instead
    #[arg(long)]
    pub trashed: bool,

    /// Listing page size
    #[arg(long = "page-size")]
    pub page_size: Option<u32>,
}

impl ListCommand {
    pub async fn execute(self) -> Result<()> {
        let opts = SyncOptions {
            depth: self.depth,
            hidden: self.hidden,
            owners: self.owners,
            in_trash: self.trashed,
            page_size: self.page_size,
            ..Default::default()
        };

        let engine = build_engine(opts, &self.paths).await?;
        for row in engine.list().await? {
            let entry = &row.entry;
            let kind = if entry.is_dir { 'd' } else { '-' };
            let shared = if entry.shared { 's' } else { '-' };
            let owners = if self.owners && !entry.owner_names.is_empty() {
                format!(" {} ", entry.owner_names.join(" & "))
            } else {
                String::new()
            };
            println!(
                "{kind}{shared}{owners} {:<10} {:<28} {:<20} {}",
                pretty_bytes(entry.size),
                entry.remote_id.as_deref().unwrap_or(""),
                entry.mtime.format("%Y-%m-%d %H:%M:%S"),
                row.path
            );
        }
        Ok(())
    }
}
