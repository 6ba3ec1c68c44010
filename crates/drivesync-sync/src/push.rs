//! Push executor
//!
//! Replays a change list against the remote, strictly in order so parent
//! directories always precede their children. Missing remote parents are
//! created through `remote_mkdir_all`, which memoizes created prefixes
//! and retries the lookup before inserting so concurrent callers racing
//! the same prefix converge on one folder.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{bail, Context as _, Result};
use futures::future::BoxFuture;
use indicatif::ProgressBar;
use tracing::{debug, warn};

use drivesync_core::domain::{differences, paths};
use drivesync_core::ports::{UploadBody, UploadRequest};
use drivesync_core::{Change, DiffMask, Entry, Op};

use crate::engine::Engine;

/// Memo of remote directories known to exist this run, keyed by path.
type DirMemo = Mutex<HashMap<String, Entry>>;

impl Engine {
    /// Executes a push change list sequentially.
    pub async fn execute_push(&self, changes: Vec<Change>) -> Result<()> {
        let memo: DirMemo = Mutex::new(HashMap::new());
        let progress = ProgressBar::new(changes.len() as u64);
        let mut first_err: Option<anyhow::Error> = None;

        for change in &changes {
            let result = match change.op() {
                Op::Add | Op::Mod | Op::ModConflict => self.remote_upsert(change, &memo).await,
                Op::Delete => self.remote_delete(change).await,
                Op::NoOp => Ok(()),
            };
            progress.inc(1);
            if let Err(err) = result {
                warn!(path = %change.path, error = %err, "push change failed");
                if first_err.is_none() {
                    first_err = Some(err.context(change.path.clone()));
                }
            }
        }

        progress.finish_and_clear();
        match first_err {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }

    async fn remote_upsert(&self, change: &Change, memo: &DirMemo) -> Result<()> {
        let src = change.src.as_ref().context("push change without a source")?;
        let mut src = src.clone();
        // Carry the existing remote id over so the upload updates in
        // place instead of inserting a duplicate.
        if let Some(dest) = &change.dest {
            src.remote_id = dest.remote_id.clone();
        }

        let (parent_path, _) = paths::split_parent(&change.path);
        let parent = self.remote_dir(&parent_path, memo).await?;
        let parent_id = parent
            .remote_id
            .clone()
            .context("resolved parent has no remote id")?;

        // The body travels when the content is known (or assumed) stale:
        // a brand-new file, or a checksum mismatch against the remote.
        let send_media = !src.is_dir
            && (change.dest.is_none()
                || differences(Some(&src), change.dest.as_ref(), change.ignore_checksum)
                    .contains(DiffMask::MD5));
        let body = if send_media {
            src.source
                .local_path()
                .map(|p| UploadBody::File(p.to_path_buf()))
        } else {
            None
        };

        let mut opts = self.opts.upload;
        opts.force_media = send_media;

        debug!(path = %change.path, send_media, "uploading");
        let uploaded = self
            .remote
            .upload(UploadRequest {
                parent_id,
                src,
                body,
                opts,
            })
            .await?;
        self.index.save_logged(&uploaded);
        Ok(())
    }

    async fn remote_delete(&self, change: &Change) -> Result<()> {
        let dest = change.dest.as_ref().context("delete change without a dest")?;
        let id = dest
            .remote_id
            .as_deref()
            .context("delete target has no remote id")?;

        self.remote.trash(id).await?;
        if let Err(err) = self.index.delete(id) {
            warn!(path = %change.path, error = %err, "failed to remove index record");
        }
        Ok(())
    }

    /// Resolves a remote directory, creating the missing suffix of the
    /// path when necessary.
    async fn remote_dir(&self, path: &str, memo: &DirMemo) -> Result<Entry> {
        if let Some(found) = memo.lock().unwrap().get(path) {
            return Ok(found.clone());
        }
        match self.remote.find_by_path(path).await {
            Ok(entry) => {
                memo.lock().unwrap().insert(path.to_string(), entry.clone());
                Ok(entry)
            }
            Err(err) if err.is_not_exists() => self.remote_mkdir_all(path.to_string(), memo).await,
            Err(err) => Err(err.into()),
        }
    }

    /// Creates one missing directory level, recursing for the prefix.
    fn remote_mkdir_all<'a>(
        &'a self,
        path: String,
        memo: &'a DirMemo,
    ) -> BoxFuture<'a, Result<Entry>> {
        Box::pin(async move {
            // Final retry: another worker may have raced us to it.
            if let Ok(found) = self.remote.find_by_path(&path).await {
                memo.lock().unwrap().insert(path, found.clone());
                return Ok(found);
            }

            let (rest, last) = paths::split_parent(&path);
            if last.is_empty() {
                bail!("cannot create remote root");
            }

            let parent = if paths::root_like(&rest) {
                self.remote.find_by_path("/").await.map_err(anyhow::Error::new)?
            } else {
                match self.remote.find_by_path(&rest).await {
                    Ok(parent) => parent,
                    Err(err) if err.is_not_exists() => {
                        self.remote_mkdir_all(rest.clone(), memo).await?
                    }
                    Err(err) => return Err(err.into()),
                }
            };
            let parent_id = parent
                .remote_id
                .clone()
                .context("parent folder has no remote id")?;

            debug!(%path, "creating remote directory");
            let created = self
                .remote
                .upload(UploadRequest {
                    parent_id,
                    src: Entry::new_folder(last),
                    body: None,
                    opts: self.opts.upload,
                })
                .await?;
            self.index.save_logged(&created);
            memo.lock().unwrap().insert(path, created.clone());
            Ok(created)
        })
    }

    /// Streams stdin into one remote entry per source, in order.
    pub async fn push_piped(&self) -> Result<()> {
        for source in &self.opts.sources {
            let existing = match self.remote.find_by_path(source).await {
                Ok(entry) => Some(entry),
                Err(err) if err.is_not_exists() => None,
                Err(err) => return Err(err.into()),
            };

            if let Some(remote) = &existing {
                if remote.has_export_links() {
                    bail!("'{source}' is a server-native document and cannot be pushed raw");
                }
                if !self.opts.force {
                    bail!("'{source}' already exists remotely; use --force to overwrite");
                }
            }

            let (parent_path, base) = paths::split_parent(source);
            let memo: DirMemo = Mutex::new(HashMap::new());
            let parent = self.remote_dir(&parent_path, &memo).await?;
            let parent_id = parent
                .remote_id
                .clone()
                .context("resolved parent has no remote id")?;

            let mut src = Entry::piped(base);
            src.remote_id = existing.and_then(|e| e.remote_id);

            let mut opts = self.opts.upload;
            opts.force_media = true;

            let uploaded = self
                .remote
                .upload(UploadRequest {
                    parent_id,
                    src,
                    body: Some(UploadBody::Stdin),
                    opts,
                })
                .await
                .with_context(|| source.clone())?;
            self.index.save_logged(&uploaded);
        }
        Ok(())
    }
}
