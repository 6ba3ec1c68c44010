//! drivesync — synchronize a local working copy with a cloud Drive
//!
//! Verbs:
//! - `init` sets up a working copy and authorizes the account
//! - `pull` / `push` reconcile the two trees
//! - `diff`, `stat`, `list`, `touch` inspect and nudge remote state
//! - `trash` / `untrash` / `emptytrash` manage the trash
//! - `pub` / `unpub` / `share` / `unshare` manage visibility
//! - `move` / `rename` / `copy` reorganize the remote tree
//! - `about` / `quota` report account information

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    about::{AboutCommand, QuotaCommand},
    diff::DiffCommand,
    fileops::{CopyCommand, MoveCommand, RenameCommand},
    init::InitCommand,
    list::ListCommand,
    publish::{PublishCommand, UnpublishCommand},
    pull::PullCommand,
    push::PushCommand,
    share::{ShareCommand, UnshareCommand},
    stat::StatCommand,
    touch::TouchCommand,
    trash::{EmptyTrashCommand, TrashCommand, UntrashCommand},
};

#[derive(Debug, Parser)]
#[command(name = "drivesync", version, about = "Push/pull synchronization for a cloud Drive")]
pub struct Cli {
    /// Verbose output (repeat for more: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Initialize a working copy and authorize the account
    Init(InitCommand),
    /// Pull remote changes into the working copy
    Pull(PullCommand),
    /// Push local changes to the remote
    Push(PushCommand),
    /// Compare local files with their remote counterparts
    Diff(DiffCommand),
    /// Display remote metadata for paths
    Stat(StatCommand),
    /// List remote contents
    List(ListCommand),
    /// Move paths to the trash
    Trash(TrashCommand),
    /// Restore paths from the trash
    Untrash(UntrashCommand),
    /// Permanently empty the trash
    Emptytrash(EmptyTrashCommand),
    /// Publish paths and print their public URLs
    #[command(name = "pub")]
    Publish(PublishCommand),
    /// Revoke public access
    #[command(name = "unpub")]
    Unpublish(UnpublishCommand),
    /// Grant access to specific accounts
    Share(ShareCommand),
    /// Revoke access from specific accounts
    Unshare(UnshareCommand),
    /// Move remote entries into another folder
    #[command(name = "move")]
    Move(MoveCommand),
    /// Rename a remote entry
    Rename(RenameCommand),
    /// Copy remote entries
    Copy(CopyCommand),
    /// Update remote modification times
    Touch(TouchCommand),
    /// Print quota usage
    Quota(QuotaCommand),
    /// Print account information
    About(AboutCommand),
    /// Print the version
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init(cmd) => cmd.execute().await,
        Commands::Pull(cmd) => cmd.execute().await,
        Commands::Push(cmd) => cmd.execute().await,
        Commands::Diff(cmd) => cmd.execute().await,
        Commands::Stat(cmd) => cmd.execute().await,
        Commands::List(cmd) => cmd.execute().await,
        Commands::Trash(cmd) => cmd.execute().await,
        Commands::Untrash(cmd) => cmd.execute().await,
        Commands::Emptytrash(cmd) => cmd.execute().await,
        Commands::Publish(cmd) => cmd.execute().await,
        Commands::Unpublish(cmd) => cmd.execute().await,
        Commands::Share(cmd) => cmd.execute().await,
        Commands::Unshare(cmd) => cmd.execute().await,
        Commands::Move(cmd) => cmd.execute().await,
        Commands::Rename(cmd) => cmd.execute().await,
        Commands::Copy(cmd) => cmd.execute().await,
        Commands::Touch(cmd) => cmd.execute().await,
        Commands::Quota(cmd) => cmd.execute().await,
        Commands::About(cmd) => cmd.execute().await,
        Commands::Version => {
            println!("drivesync {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
