//! `about` and `quota` — account and quota information.

use anyhow::Result;
use clap::Args;

use drivesync_sync::SyncOptions;

use crate::commands::build_engine;
use crate::output::pretty_bytes;

#[derive(Debug, Args)]
pub struct AboutCommand {
    /// Show feature rate limits
    #[arg(long)]
    pub features: bool,

    /// Show per-type maximum upload sizes
    #[arg(long = "file-sizes")]
    pub file_sizes: bool,
}

impl AboutCommand {
    pub async fn execute(self) -> Result<()> {
        let engine = build_engine(SyncOptions::default(), &[]).await?;
        let about = engine.about().await?;

        print_quota(&about);

        if self.features && !about.features.is_empty() {
            println!("{:<30} {:<30}", "Feature", "Request limit (queries/second)");
            for feature in &about.features {
                println!("{:<30} {:<30}", feature.name, feature.rate);
            }
            println!();
        }

        if self.file_sizes && !about.max_upload_sizes.is_empty() {
            println!("* Maximum upload sizes per file type *");
            println!("{:<36} {:<36}", "FileType", "Size");
            for limit in &about.max_upload_sizes {
                println!("{:<36} {:<36}", limit.file_type, pretty_bytes(limit.size));
            }
            println!();
        }

        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct QuotaCommand {}

impl QuotaCommand {
    pub async fn execute(self) -> Result<()> {
        let engine = build_engine(SyncOptions::default(), &[]).await?;
        print_quota(&engine.about().await?);
        Ok(())
    }
}

fn print_quota(about: &drivesync_core::ports::AboutInfo) {
    println!("Name: {}", about.name);
    if !about.quota_kind.is_empty() {
        println!("Account type:\t{}", about.quota_kind);
    }
    println!(
        "Bytes Used:\t{:<20} ({})",
        about.quota_used,
        pretty_bytes(about.quota_used)
    );
    println!(
        "Bytes Free:\t{:<20} ({})",
        about.quota_free(),
        pretty_bytes(about.quota_free())
    );
    println!(
        "Bytes InTrash:\t{:<20} ({})",
        about.quota_in_trash,
        pretty_bytes(about.quota_in_trash)
    );
    println!(
        "Total Bytes:\t{:<20} ({})",
        about.quota_total,
        pretty_bytes(about.quota_total)
    );

    if !about.service_usage.is_empty() {
        println!();
        println!("* Space used by services *");
        println!("{:<36} {:<36}", "Service", "Bytes");
        for usage in &about.service_usage {
            println!("{:<36} {:<36}", usage.service, pretty_bytes(usage.bytes_used));
        }
    }
    println!();
}
