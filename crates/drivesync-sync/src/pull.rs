//! Pull executor
//!
//! Plays a resolved change list against the local filesystem in sliding
//! windows of bounded concurrency. Parents are created on demand inside
//! each worker (`create_dir_all` is idempotent), so the changes in a
//! window are independent. Per-change failures are logged and counted;
//! the first one becomes the run's result after the remaining changes
//! have been attempted.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use indicatif::ProgressBar;
use tokio::io::AsyncWriteExt;
use tokio_util::io::StreamReader;
use tracing::{debug, info, warn};

use drivesync_core::domain::differences;
use drivesync_core::{Change, DiffMask, Entry, Op};

use crate::engine::Engine;
use crate::ops::mime::mime_type_from_ext;

/// Concurrency window of the pull executor.
const MAX_CONCURRENT_PULLS: usize = 4;

impl Engine {
    /// Executes a pull change list.
    pub async fn execute_pull(&self, changes: Vec<Change>) -> Result<()> {
        let progress = ProgressBar::new(changes.len() as u64);
        let mut first_err: Option<anyhow::Error> = None;

        for window in changes.chunks(MAX_CONCURRENT_PULLS) {
            let results = join_all(window.iter().map(|c| self.play_pull_change(c))).await;
            for (change, result) in window.iter().zip(results) {
                progress.inc(1);
                if let Err(err) = result {
                    warn!(path = %change.path, error = %err, "pull change failed");
                    if first_err.is_none() {
                        first_err = Some(err.context(change.path.clone()));
                    }
                }
            }
        }

        progress.finish_and_clear();
        match first_err {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }

    async fn play_pull_change(&self, change: &Change) -> Result<()> {
        match change.op() {
            Op::Add => self.local_add(change).await,
            Op::Mod | Op::ModConflict => self.local_mod(change).await,
            Op::Delete => self.local_delete(change).await,
            Op::NoOp => Ok(()),
        }
    }

    async fn local_add(&self, change: &Change) -> Result<()> {
        let src = change.src.as_ref().context("add change without a source")?;
        let dest_abs = self.context.abs_path_of(&change.path);
        let parent_abs = self.context.abs_path_of(&change.parent);

        if parent_abs != dest_abs {
            tokio::fs::create_dir_all(&parent_abs)
                .await
                .context("creating parent directories")?;
        }

        if src.is_dir {
            match tokio::fs::create_dir(&dest_abs).await {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {}
                Err(err) => return Err(err).context("creating directory"),
            }
            self.index.save_logged(src);
            return Ok(());
        }

        self.download_to(src, &dest_abs).await?;
        stamp_mtime(&dest_abs, src.mtime)?;
        self.index.save_logged(src);
        Ok(())
    }

    async fn local_mod(&self, change: &Change) -> Result<()> {
        let src = change.src.as_ref().context("mod change without a source")?;
        let dest_abs = self.context.abs_path_of(&change.path);

        let mask = differences(
            change.src.as_ref(),
            change.dest.as_ref(),
            change.ignore_checksum,
        );

        if mask.contains(DiffMask::DIR_TYPE) {
            // Kind flipped: delete whatever is there and recreate.
            remove_local(&dest_abs).await?;
            return self.local_add(change).await;
        }

        if mask.contains(DiffMask::MD5) {
            self.download_to(src, &dest_abs).await?;
        }
        stamp_mtime(&dest_abs, src.mtime)?;
        self.index.save_logged(src);
        Ok(())
    }

    async fn local_delete(&self, change: &Change) -> Result<()> {
        let dest = change.dest.as_ref().context("delete change without a dest")?;
        let path = dest
            .source
            .local_path()
            .context("delete target has no local path")?;
        debug!(path = %path.display(), "removing local entry");
        remove_local(path).await
    }

    /// Materializes `src` at `dest_abs`: a direct download when the blob
    /// is reachable, otherwise an empty placeholder (which keeps the tree
    /// shape consistent so a later push does not see it as missing) plus
    /// any requested format exports.
    async fn download_to(&self, src: &Entry, dest_abs: &Path) -> Result<()> {
        if src.source.download_url().is_some() {
            let id = src.remote_id.as_deref().unwrap_or_default();
            return self.single_download(dest_abs, id, None).await;
        }

        tokio::fs::File::create(dest_abs)
            .await
            .context("creating placeholder")?;

        if !self.opts.exports.is_empty() && src.has_export_links() {
            let base = match &self.opts.exports_dir {
                Some(dir) => dir.join(&src.name),
                None => dest_abs.to_path_buf(),
            };
            let manifest = self.export_doc(src, &base).await?;
            for exported in manifest {
                info!(path = %dest_abs.display(), to = %exported.display(), "exported");
            }
        }
        Ok(())
    }

    async fn single_download(
        &self,
        dest_abs: &Path,
        id: &str,
        export_url: Option<&str>,
    ) -> Result<()> {
        let stream = self.remote.download(id, export_url).await?;
        let mut reader = StreamReader::new(stream);
        let mut file = tokio::fs::File::create(dest_abs)
            .await
            .with_context(|| format!("creating {}", dest_abs.display()))?;
        tokio::io::copy(&mut reader, &mut file)
            .await
            .context("streaming download")?;
        file.flush().await?;
        Ok(())
    }

    /// Downloads every requested export format of a server-native
    /// document into `<base>_exports/`, in parallel, and returns the
    /// paths that succeeded.
    async fn export_doc(&self, src: &Entry, base: &Path) -> Result<Vec<PathBuf>> {
        let dir = PathBuf::from(format!("{}_exports", base.display()));
        tokio::fs::create_dir_all(&dir)
            .await
            .context("creating exports directory")?;

        let id = src.remote_id.as_deref().unwrap_or_default();
        let jobs: Vec<(String, PathBuf)> = self
            .opts
            .exports
            .iter()
            .filter_map(|ext| {
                let mime = mime_type_from_ext(ext)?;
                let url = src.export_links.get(mime)?.clone();
                let dest = dir.join(format!("{}.{ext}", src.name));
                Some((url, dest))
            })
            .collect();

        let results = join_all(jobs.iter().map(|(url, dest)| async move {
            self.single_download(dest, id, Some(url)).await
        }))
        .await;

        let mut manifest = Vec::new();
        for ((_, dest), result) in jobs.iter().zip(results) {
            match result {
                Ok(()) => manifest.push(dest.clone()),
                Err(err) => warn!(dest = %dest.display(), error = %err, "export failed"),
            }
        }
        Ok(manifest)
    }

    /// Streams each source's bytes straight to stdout, in order.
    pub async fn pull_piped(&self) -> Result<()> {
        let mut stdout = tokio::io::stdout();
        for source in &self.opts.sources {
            let remote = self
                .remote
                .find_by_path(source)
                .await
                .map_err(anyhow::Error::new)
                .with_context(|| source.clone())?;

            if remote.has_export_links() {
                warn!(path = %source, "server-native document cannot be pulled raw, only exported");
                continue;
            }

            let id = remote.remote_id.as_deref().unwrap_or_default();
            let stream = self.remote.download(id, None).await?;
            let mut reader = StreamReader::new(stream);
            tokio::io::copy(&mut reader, &mut stdout)
                .await
                .with_context(|| format!("piping {source}"))?;
        }
        stdout.flush().await?;
        Ok(())
    }
}

async fn remove_local(path: &Path) -> Result<()> {
    let meta = match tokio::fs::symlink_metadata(path).await {
        Ok(meta) => meta,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err.into()),
    };
    if meta.is_dir() {
        tokio::fs::remove_dir_all(path).await?;
    } else {
        tokio::fs::remove_file(path).await?;
    }
    Ok(())
}

/// Stamps a file's modification time from the authoritative entry.
fn stamp_mtime(path: &Path, mtime: DateTime<Utc>) -> Result<()> {
    let ts = mtime.timestamp();
    if ts < 0 {
        return Ok(());
    }
    let system_time = std::time::UNIX_EPOCH + std::time::Duration::from_secs(ts as u64);
    let file = std::fs::File::options().write(true).open(path)?;
    file.set_modified(system_time)?;
    Ok(())
}
