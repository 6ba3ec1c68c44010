//! Command implementations.

pub mod about;
pub mod diff;
pub mod fileops;
pub mod init;
pub mod list;
pub mod publish;
pub mod pull;
pub mod push;
pub mod share;
pub mod stat;
pub mod touch;
pub mod trash;

use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Args;

use drivesync_core::domain::paths;
use drivesync_core::Context;
use drivesync_remote::{DriveClient, DriveGateway};
use drivesync_sync::{Engine, SyncOptions};

/// Flags shared by the transfer-style commands.
#[derive(Debug, Clone, Default, Args)]
pub struct TransferFlags {
    /// Include hidden (dot-prefixed) entries
    #[arg(long)]
    pub hidden: bool,

    /// Skip all confirmation prompts
    #[arg(long = "no-prompt")]
    pub no_prompt: bool,

    /// Never overwrite existing destination entries
    #[arg(long = "no-clobber")]
    pub no_clobber: bool,

    /// Treat every change as an addition
    #[arg(long)]
    pub force: bool,

    /// Compare by size and mtime only
    #[arg(long = "ignore-checksum")]
    pub ignore_checksum: bool,

    /// Skip conflict detection
    #[arg(long = "ignore-conflict")]
    pub ignore_conflict: bool,
}

impl TransferFlags {
    pub fn apply(&self, opts: &mut SyncOptions) {
        opts.hidden = self.hidden;
        opts.no_prompt = self.no_prompt;
        opts.no_clobber = self.no_clobber;
        opts.force = self.force;
        opts.ignore_checksum = self.ignore_checksum;
        opts.ignore_conflict = self.ignore_conflict;
    }
}

/// Discovers the working copy, refreshes the access token and wires up
/// the engine for one run.
pub async fn build_engine(mut opts: SyncOptions, arg_paths: &[String]) -> Result<Engine> {
    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    let context = Context::discover(&cwd)?;
    opts.sources = resolve_sources(&context, &cwd, arg_paths)?;
    let opts = opts.load_ignore(&context);

    let token = drivesync_remote::auth::access_token(
        &context.client_id,
        &context.client_secret,
        &context.refresh_token,
    )
    .await
    .context("authentication failed; re-run `drivesync init` if this persists")?;

    let mut client = DriveClient::new(token);
    if let Some(page_size) = opts.page_size {
        client = client.with_page_size(page_size);
    }
    let gateway = DriveGateway::new(client);
    Ok(Engine::new(context, Arc::new(gateway), opts))
}

/// Maps command-line paths to working-copy paths. Relative arguments are
/// resolved against the current directory's position inside the root; no
/// arguments means the current directory itself.
pub fn resolve_sources(
    context: &Context,
    cwd: &std::path::Path,
    arg_paths: &[String],
) -> Result<Vec<String>> {
    let base = context.rel_path_of(cwd)?;
    if arg_paths.is_empty() {
        return Ok(vec![base]);
    }
    Ok(arg_paths
        .iter()
        .map(|p| {
            if p.starts_with('/') {
                paths::normalize(p)
            } else {
                paths::normalize(&format!("{base}/{p}"))
            }
        })
        .collect())
}
