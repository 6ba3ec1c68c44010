//! `share` and `unshare`.

use anyhow::Result;
use clap::Args;

use drivesync_core::ports::{AccountKind, Role};
use drivesync_sync::{ops::ShareSpec, SyncOptions};

use crate::commands::build_engine;

#[derive(Debug, Args)]
pub struct ShareCommand {
    /// Paths relative to the working-copy root
    pub paths: Vec<String>,

    /// Email or domain targets
    #[arg(long, value_delimiter = ',')]
    pub emails: Vec<String>,

    /// Role to grant: reader, writer, commenter, owner
    #[arg(long, default_value = "reader")]
    pub role: String,

    /// Account type: user, group, domain, anyone
    #[arg(long = "type", default_value = "user")]
    pub kind: String,

    /// Message for the notification email
    #[arg(long)]
    pub message: Option<String>,

    /// Send notification emails
    #[arg(long)]
    pub notify: bool,
}

impl ShareCommand {
    pub async fn execute(self) -> Result<()> {
        let engine = build_engine(SyncOptions::default(), &self.paths).await?;
        let spec = ShareSpec {
            targets: self.emails.clone(),
            role: Role::parse(&self.role),
            kind: AccountKind::parse(&self.kind),
            message: self.message.clone(),
            notify: self.notify,
        };
        engine.share(&spec).await
    }
}

#[derive(Debug, Args)]
pub struct UnshareCommand {
    /// Paths relative to the working-copy root
    pub paths: Vec<String>,

    /// Email targets whose access to revoke
    #[arg(long, value_delimiter = ',')]
    pub emails: Vec<String>,
}

impl UnshareCommand {
    pub async fn execute(self) -> Result<()> {
        let engine = build_engine(SyncOptions::default(), &self.paths).await?;
        engine.unshare(&self.emails).await
    }
}
