//! Mount sessions for pushing external paths
//!
//! `push -m` accepts paths outside the working copy by symlinking them
//! under the root for the duration of the run. The session owns exactly
//! the links it created and removes them on every exit path: normal
//! completion (drop) and Ctrl-C (the installed handler clears the shared
//! session before exiting).

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

/// Symlinks created for one push run.
#[derive(Debug, Default)]
pub struct MountSession {
    created: Vec<PathBuf>,
}

impl MountSession {
    /// Links each external path under the working-copy root by its base
    /// name. Returns the session and the working-copy sources the links
    /// are reachable as. Paths that cannot be linked (missing target,
    /// name clash, hidden without `--hidden`) are skipped with a warning.
    pub fn create(root: &Path, targets: &[PathBuf], include_hidden: bool) -> (Self, Vec<String>) {
        let mut session = Self::default();
        let mut sources = Vec::new();

        for target in targets {
            if !target.exists() {
                warn!(path = %target.display(), "mount target does not exist, skipping");
                continue;
            }
            let Some(base) = target.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                warn!(path = %target.display(), "mount target has no base name, skipping");
                continue;
            };
            if !include_hidden && base.starts_with('.') {
                continue;
            }

            let link = root.join(&base);
            match symlink(target, &link) {
                Ok(()) => {
                    debug!(target = %target.display(), link = %link.display(), "mounted");
                    session.created.push(link);
                    sources.push(format!("/{base}"));
                }
                Err(err) => {
                    // An existing entry wins; do not adopt it for cleanup.
                    warn!(path = %link.display(), error = %err, "cannot mount, skipping");
                }
            }
        }

        (session, sources)
    }

    /// Removes everything this session created. Idempotent.
    pub fn clear(&mut self) {
        for link in self.created.drain(..) {
            if let Err(err) = std::fs::remove_file(&link) {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %link.display(), error = %err, "failed to remove mount link");
                }
            }
        }
    }

    /// Installs a Ctrl-C handler that clears the shared session before
    /// terminating the process.
    pub fn install_signal_cleanup(session: Arc<Mutex<MountSession>>) {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                if let Ok(mut session) = session.lock() {
                    session.clear();
                }
                std::process::exit(1);
            }
        });
    }
}

impl Drop for MountSession {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn symlink(_target: &Path, _link: &Path) -> std::io::Result<()> {
    Err(std::io::Error::other("mounting requires symlink support"))
}
