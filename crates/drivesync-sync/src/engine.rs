//! Engine wiring
//!
//! [`Engine`] owns one run's collaborators: the discovered working-copy
//! context, the remote store, the index store and the run options. The
//! operations themselves live in the sibling modules as further `impl`
//! blocks.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use drivesync_conflict::Partitioned;
use drivesync_core::ports::{AboutInfo, RemoteStore};
use drivesync_core::{Change, Context, IndexRecord, IndexStore};

use crate::options::SyncOptions;

/// One run of the synchronization engine.
pub struct Engine {
    pub(crate) context: Context,
    pub(crate) remote: Arc<dyn RemoteStore>,
    pub(crate) index: IndexStore,
    pub(crate) opts: SyncOptions,
}

impl Engine {
    pub fn new(context: Context, remote: Arc<dyn RemoteStore>, opts: SyncOptions) -> Self {
        let index = IndexStore::new(&context);
        Self {
            context,
            remote,
            index,
            opts,
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn opts(&self) -> &SyncOptions {
        &self.opts
    }

    pub fn index(&self) -> &IndexStore {
        &self.index
    }

    /// Classifies a resolved change list into executable changes and true
    /// conflicts, honoring `--ignore-conflict`.
    pub fn partition_conflicts(&self, changes: Vec<Change>) -> Partitioned {
        drivesync_conflict::partition(changes, self.opts.ignore_conflict, |id| {
            self.index.load(id).ok().flatten()
        })
    }

    /// Index lookup used by tests and callers outside the executors.
    pub fn index_record(&self, file_id: &str) -> Option<IndexRecord> {
        self.index.load(file_id).ok().flatten()
    }

    /// Account and quota description from the remote.
    pub async fn about(&self) -> Result<AboutInfo> {
        self.remote
            .about()
            .await
            .context("failed to query account information")
    }
}
