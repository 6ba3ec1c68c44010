//! Pair/diff engine
//!
//! Walks the local and remote trees in step: children of each directory
//! are fetched as streams from both sides, merged by name, and each pair
//! recursed into concurrently in fixed-size chunks. The output is a flat
//! change list; ordering is unspecified.

use std::collections::HashMap;

use anyhow::{bail, Context as _, Result};
use futures::future::{join_all, BoxFuture};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use drivesync_core::domain::{differences, paths};
use drivesync_core::ports::EntryStream;
use drivesync_core::{Change, CoreError, DiffMask, Entry, Op};

use crate::engine::Engine;
use crate::walker;

/// Children are recursed into one task per chunk of this many pairs.
const CHUNK_SIZE: usize = 100;

/// One name slot across both trees.
#[derive(Debug)]
pub struct DirPair {
    pub remote: Option<Entry>,
    pub local: Option<Entry>,
}

impl DirPair {
    pub fn name(&self) -> &str {
        self.remote
            .as_ref()
            .or(self.local.as_ref())
            .map(|e| e.name.as_str())
            .unwrap_or_default()
    }
}

/// Merges two child streams by name.
///
/// Locals are drained into a name-keyed map first; each arriving remote
/// claims its match, and whatever remains local-only is appended at the
/// end. Exactly one pair per distinct name.
pub async fn merge(
    remotes: Option<EntryStream>,
    locals: Option<mpsc::Receiver<Result<Entry, CoreError>>>,
) -> Result<Vec<DirPair>> {
    let mut local_map: HashMap<String, Entry> = HashMap::new();
    if let Some(mut rx) = locals {
        while let Some(item) = rx.recv().await {
            let entry = item.context("local listing failed")?;
            local_map.insert(entry.name.clone(), entry);
        }
    }

    let mut merged = Vec::new();
    if let Some(mut rx) = remotes {
        while let Some(item) = rx.recv().await {
            let remote = item.context("remote listing failed")?;
            let local = local_map.remove(&remote.name);
            merged.push(DirPair {
                remote: Some(remote),
                local,
            });
        }
    }

    merged.extend(local_map.into_values().map(|local| DirPair {
        remote: None,
        local: Some(local),
    }));
    Ok(merged)
}

impl Engine {
    /// Resolves the change list for every configured source path.
    pub async fn resolve_changes(&self, is_push: bool) -> Result<Vec<Change>> {
        let mut all = Vec::new();
        for source in &self.opts.sources {
            all.extend(self.change_list_resolve(source, is_push).await?);
        }
        Ok(all)
    }

    /// Resolves one source path against both trees.
    pub async fn change_list_resolve(&self, rel: &str, is_push: bool) -> Result<Vec<Change>> {
        let remote = match self.remote.find_by_path(rel).await {
            Ok(entry) => Some(entry),
            // A missing remote is "new file" for a push but terminal for
            // a pull: there is nothing to pull from.
            Err(err) if err.is_not_exists() && is_push => None,
            Err(err) => return Err(anyhow::Error::new(err).context(rel.to_string())),
        };

        let local = match self.resolve_to_local(rel) {
            Ok(local) => local,
            Err(CoreError::Ignored(path)) => {
                warn!(%path, "requested path is ignored, skipping");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        if local.is_none() && remote.is_none() {
            bail!("'{rel}' doesn't exist locally nor remotely");
        }

        self.resolve_pair(is_push, rel.to_string(), rel.to_string(), remote, local)
            .await
    }

    /// Stats a working-copy path on the local filesystem.
    fn resolve_to_local(&self, rel: &str) -> Result<Option<Entry>, CoreError> {
        if let Some(re) = &self.opts.ignore_regex {
            if re.is_match(rel) {
                return Err(CoreError::Ignored(rel.to_string()));
            }
        }

        let abs = self.context.abs_path_of(rel);
        match std::fs::metadata(&abs) {
            Ok(meta) => {
                let name = paths::split_parent(rel).1;
                Ok(Some(Entry::local(name, abs, &meta)))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// The core recursion: emit this node's change, then recurse into the
    /// merged children in parallel chunks.
    fn resolve_pair<'a>(
        &'a self,
        is_push: bool,
        parent: String,
        path: String,
        remote: Option<Entry>,
        local: Option<Entry>,
    ) -> BoxFuture<'a, Result<Vec<Change>>> {
        Box::pin(async move {
            let mut changes = Vec::new();

            // Server-native documents cannot be clobbered from local.
            if is_push && remote.as_ref().is_some_and(Entry::has_export_links) {
                debug!(%path, "export-only document, skipping on push");
                return Ok(changes);
            }

            let change = if is_push {
                Change {
                    path: path.clone(),
                    parent: parent.clone(),
                    src: local.clone(),
                    dest: remote.clone(),
                    force: self.opts.force,
                    no_clobber: self.opts.no_clobber,
                    ignore_checksum: self.opts.ignore_checksum,
                    suppress_conflict: false,
                }
            } else {
                // Export-only documents have no bytes to compare; they
                // count as unchanged unless the kind or mtime moved.
                if !self.opts.force && remote.as_ref().is_some_and(Entry::has_export_links) {
                    let mask =
                        differences(remote.as_ref(), local.as_ref(), self.opts.ignore_checksum);
                    if !mask.contains(DiffMask::DIR_TYPE) && !mask.contains(DiffMask::MOD_TIME) {
                        return Ok(changes);
                    }
                }
                Change {
                    path: path.clone(),
                    parent: parent.clone(),
                    src: remote.clone(),
                    dest: local.clone(),
                    force: self.opts.force,
                    no_clobber: self.opts.no_clobber,
                    ignore_checksum: self.opts.ignore_checksum,
                    suppress_conflict: false,
                }
            };

            if change.op() != Op::NoOp {
                changes.push(change);
            }

            if !self.opts.recursive {
                return Ok(changes);
            }
            // Recursion follows the authoritative side; a non-directory
            // there ends this subtree.
            if !is_push && remote.as_ref().is_some_and(|r| !r.is_dir) {
                return Ok(changes);
            }
            if is_push && local.as_ref().is_some_and(|l| !l.is_dir) {
                return Ok(changes);
            }

            let local_rx = match &local {
                Some(l) if l.is_dir => Some(walker::list_local(
                    &self.context,
                    &path,
                    self.opts.hidden,
                    self.opts.ignore_regex.clone(),
                )),
                _ => None,
            };
            let remote_rx = match remote.as_ref().and_then(|r| {
                if r.is_dir {
                    r.remote_id.clone()
                } else {
                    None
                }
            }) {
                Some(id) => Some(self.remote.list_children(&id, self.opts.hidden).await),
                None => None,
            };

            let pairs = merge(remote_rx, local_rx)
                .await
                .with_context(|| format!("listing children of {path}"))?;

            let chunk_futures = chunked(pairs).into_iter().map(|chunk| {
                let path = path.clone();
                async move {
                    let mut acc = Vec::new();
                    for pair in chunk {
                        let child_path = paths::join_child(&path, pair.name());
                        match self
                            .resolve_pair(is_push, path.clone(), child_path.clone(), pair.remote, pair.local)
                            .await
                        {
                            Ok(mut child_changes) => acc.append(&mut child_changes),
                            Err(err) => {
                                warn!(path = %child_path, error = %err, "child resolution failed");
                            }
                        }
                    }
                    acc
                }
            });

            for chunk_changes in join_all(chunk_futures).await {
                changes.extend(chunk_changes);
            }
            Ok(changes)
        })
    }
}

fn chunked(pairs: Vec<DirPair>) -> Vec<Vec<DirPair>> {
    let mut chunks = Vec::new();
    let mut current = Vec::with_capacity(CHUNK_SIZE.min(pairs.len()));
    for pair in pairs {
        current.push(pair);
        if current.len() == CHUNK_SIZE {
            chunks.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
