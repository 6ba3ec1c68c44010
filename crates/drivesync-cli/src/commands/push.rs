//! `push` — bring the remote tree into agreement with the local one.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use clap::Args;

use drivesync_core::domain::reduce_to_size;
use drivesync_core::ports::UploadOptions;
use drivesync_sync::{MountSession, QuotaStatus, SyncOptions};

use crate::commands::{build_engine, TransferFlags};
use crate::output::{self, pretty_bytes};

#[derive(Debug, Args)]
pub struct PushCommand {
    /// Paths relative to the working-copy root
    pub paths: Vec<String>,

    #[command(flatten)]
    pub flags: TransferFlags,

    /// Mount paths outside the working copy for this push
    #[arg(short = 'm', long = "mount")]
    pub mounts: Vec<PathBuf>,

    /// Run OCR over uploaded images and PDFs
    #[arg(long)]
    pub ocr: bool,

    /// Convert uploads to server-native documents
    #[arg(long)]
    pub convert: bool,

    /// Pin the uploaded revision
    #[arg(long)]
    pub pin: bool,

    /// Stream stdin into the target path
    #[arg(long)]
    pub piped: bool,
}

impl PushCommand {
    pub async fn execute(self) -> Result<()> {
        let mut opts = SyncOptions {
            recursive: true,
            piped: self.piped,
            upload: UploadOptions {
                ocr: self.ocr,
                convert: self.convert,
                pin: self.pin,
                ..Default::default()
            },
            ..Default::default()
        };
        self.flags.apply(&mut opts);

        let engine = build_engine(opts, &self.paths).await?;

        if self.piped {
            return engine.push_piped().await;
        }

        // Mount external paths under the root for the duration of the
        // run; the session removes its links on every exit path.
        let mount_session = if self.mounts.is_empty() {
            None
        } else {
            let (session, mount_sources) = MountSession::create(
                &engine.context().abs_path,
                &self.mounts,
                self.flags.hidden,
            );
            let session = Arc::new(Mutex::new(session));
            MountSession::install_signal_cleanup(session.clone());
            Some((session, mount_sources))
        };

        println!("Resolving...");
        let mut changes = engine.resolve_changes(true).await?;
        if let Some((_, mount_sources)) = &mount_session {
            for source in mount_sources {
                changes.extend(engine.change_list_resolve(source, true).await?);
            }
        }

        let partitioned = engine.partition_conflicts(changes);
        if !partitioned.conflicts.is_empty() {
            output::warn_conflicts(&partitioned.conflicts);
            bail!("conflicts have prevented a push");
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

        let projected = reduce_to_size(&executable, true);
        match engine.quota_status(projected).await? {
            QuotaStatus::AlmostExceeded => {
                eprintln!("Almost exceeding your drive quota");
            }
            QuotaStatus::Exceeded => {
                eprintln!(
                    "This change will exceed your drive quota: projected size {} ({})",
                    projected,
                    pretty_bytes(projected)
                );
                if self.flags.no_prompt {
                    bail!("quota exceeded");
                }
                if !output::confirm("Proceed anyway?", false) {
                    return Ok(());
                }
            }
            _ => {}
        }

        let result = engine.execute_push(executable).await;
        if let Some((session, _)) = mount_session {
            if let Ok(mut session) = session.lock() {
                session.clear();
            }
        }
        result
    }
}
