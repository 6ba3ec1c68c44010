//! Remote reorganization: move, rename, copy.

use anyhow::{bail, Context as _, Result};

use drivesync_core::domain::paths;
use drivesync_core::{Entry, RemoteError};

use crate::engine::Engine;

impl Engine {
    /// Moves `sources[..n-1]` into the folder `sources[n-1]`.
    pub async fn move_entries(&self) -> Result<()> {
        let Some((dest, rest)) = self.opts.sources.split_last() else {
            bail!("move: expected <src> [src...] <dest>");
        };
        if rest.is_empty() {
            bail!("move: expected <src> [src...] <dest>");
        }

        for src in rest {
            // Refuse to nest a parent into its own subtree.
            let src_trim = src.trim_end_matches('/');
            if dest == src_trim || dest.starts_with(&format!("{src_trim}/")) {
                bail!("'{src}' cannot be nested into '{dest}'");
            }
            self.move_one(src, dest)
                .await
                .with_context(|| src.clone())?;
        }
        Ok(())
    }

    async fn move_one(&self, src: &str, dest: &str) -> Result<()> {
        let src_entry = self.find_remote(src).await?;
        let new_parent = self.find_remote(dest).await?;
        if !new_parent.is_dir {
            bail!("'{dest}' must be an existing folder");
        }

        let (old_parent_path, _) = paths::split_parent(src);
        let old_parent = self.find_remote(&old_parent_path).await?;

        let src_id = remote_id(&src_entry)?;
        let new_parent_id = remote_id(&new_parent)?;
        let old_parent_id = remote_id(&old_parent)?;

        if old_parent_id == new_parent_id {
            return Ok(()); // already there
        }
        if src_id == new_parent_id {
            bail!("cannot move '{src}' into itself");
        }

        // Duplicate check at the destination.
        let landing = paths::join_child(dest, &src_entry.name);
        match self.remote.find_by_path(&landing).await {
            Ok(existing) => {
                if remote_id(&existing)? == src_id {
                    return Ok(()); // moving onto itself
                }
                if !self.opts.force {
                    bail!("'{landing}' already exists; use --force to override");
                }
            }
            Err(err) if err.is_not_exists() => {}
            Err(err) => return Err(err.into()),
        }

        self.remote.insert_parent(&src_id, &new_parent_id).await?;
        self.remote.remove_parent(&src_id, &old_parent_id).await?;
        Ok(())
    }

    /// Renames `sources[0]` to the given title.
    pub async fn rename_entry(&self, new_name: &str) -> Result<()> {
        let [src] = self.opts.sources.as_slice() else {
            bail!("rename: expected <src> <new-name>");
        };

        let src_entry = self.find_remote(src).await?;
        let src_id = remote_id(&src_entry)?;

        let (parent_path, _) = paths::split_parent(src);
        let landing = paths::join_child(&parent_path, &paths::escape_name(new_name));
        match self.remote.find_by_path(&landing).await {
            Ok(existing) => {
                if remote_id(&existing)? == src_id {
                    return Ok(()); // renaming to itself
                }
                if !self.opts.force {
                    bail!("'{landing}' already exists; use --force to override");
                }
            }
            Err(err) if err.is_not_exists() => {}
            Err(err) => return Err(err.into()),
        }

        self.remote.rename(&src_id, new_name).await?;
        Ok(())
    }

    /// Copies `sources[..n-1]` to `sources[n-1]`.
    pub async fn copy_entries(&self) -> Result<()> {
        let Some((dest, rest)) = self.opts.sources.split_last() else {
            bail!("copy: expected <src> [src...] <dest>");
        };
        if rest.is_empty() {
            bail!("copy: expected <src> [src...] <dest>");
        }

        let dest_entry = match self.remote.find_by_path(dest).await {
            Ok(entry) => Some(entry),
            Err(err) if err.is_not_exists() => None,
            Err(err) => return Err(err.into()),
        };
        let dest_is_dir = dest_entry.as_ref().is_some_and(|e| e.is_dir);
        if !dest_is_dir && rest.len() > 1 {
            bail!("'{dest}' is not a directory");
        }

        for src in rest {
            let src_entry = self.find_remote(src).await.with_context(|| src.clone())?;
            if src_entry.is_dir {
                if !self.opts.recursive {
                    bail!("'{src}' is a folder; pass -r to copy folders");
                }
                bail!("recursive folder copy is not supported by the remote API");
            }
            if !src_entry.copyable {
                bail!("'{src}' is not copyable");
            }

            let (new_name, parent_id) = if dest_is_dir {
                let parent = dest_entry.as_ref().expect("checked above");
                (src_entry.name.clone(), Some(remote_id(parent)?))
            } else {
                let (parent_path, base) = paths::split_parent(dest);
                let parent = self.find_remote(&parent_path).await?;
                (base, Some(remote_id(&parent)?))
            };

            self.remote
                .copy(&new_name, parent_id.as_deref(), &src_entry)
                .await
                .with_context(|| src.clone())?;
        }
        Ok(())
    }

    async fn find_remote(&self, path: &str) -> Result<Entry, anyhow::Error> {
        self.remote
            .find_by_path(path)
            .await
            .map_err(|err| match err {
                RemoteError::PathNotExists => anyhow::anyhow!("'{path}' does not exist remotely"),
                other => other.into(),
            })
    }
}

fn remote_id(entry: &Entry) -> Result<String> {
    entry
        .remote_id
        .clone()
        .context("remote entry is missing its id")
}
