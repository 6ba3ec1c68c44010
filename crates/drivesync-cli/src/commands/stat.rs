//! `stat` — show remote metadata and permissions.

use anyhow::Result;
use clap::Args;

use drivesync_sync::SyncOptions;

use crate::commands::build_engine;
use crate::output::pretty_bytes;

#[derive(Debug, Args)]
pub struct StatCommand {
    /// Paths relative to the working-copy root
    pub paths: Vec<String>,

    /// Recurse into directories
    #[arg(short, long)]
    pub recursive: bool,

    /// Include hidden entries
    #[arg(long)]
    pub hidden: bool,
}

impl StatCommand {
    pub async fn execute(self) -> Result<()> {
        let opts = SyncOptions {
            recursive: self.recursive,
            hidden: self.hidden,
            ..Default::default()
        };

        let engine = build_engine(opts, &self.paths).await?;
        for info in engine.stat().await? {
            let entry = &info.entry;
            println!("{}", info.path);
            println!("  id        {}", entry.remote_id.as_deref().unwrap_or(""));
            println!(
                "  kind      {}",
                if entry.is_dir { "folder" } else { "file" }
            );
            if !entry.is_dir {
                println!("  size      {}", pretty_bytes(entry.size));
                if let Some(md5) = &entry.md5 {
                    println!("  md5       {md5}");
                }
            }
            println!("  mtime     {}", entry.mtime.format("%Y-%m-%d %H:%M:%S"));
            if let Some(mime) = &entry.mime_type {
                println!("  mime      {mime}");
            }
            if let Some(etag) = &entry.etag {
                println!("  etag      {etag}");
            }
            println!("  shared    {}", entry.shared);
            for permission in &info.permissions {
                let who = permission
                    .email
                    .as_deref()
                    .or(permission.name.as_deref())
                    .unwrap_or(&permission.kind);
                println!("  perm      {:<10} {}", permission.role, who);
            }
        }
        Ok(())
    }
}
