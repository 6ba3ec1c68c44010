//! Working-copy context
//!
//! A working copy is any directory carrying the `.drivesync` sentinel
//! subdirectory, which holds `credentials.json` and the per-file index
//! records. The context is discovered by walking upward from the current
//! directory and is read-only for the rest of the process.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{paths, CoreError};

/// Name of the sentinel directory inside the working-copy root.
pub const DOT_DIR: &str = ".drivesync";

/// File name of the optional ignore-pattern file at the root.
pub const IGNORE_FILE: &str = ".driveignore";

const CREDENTIALS_FILE: &str = "credentials.json";
const INDICES_DIR: &str = "indices";

/// Credentials and root location of one working copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(skip)]
    pub abs_path: PathBuf,
}

impl Context {
    /// Walks upward from `start` until a directory containing the
    /// sentinel is found and reads its credentials.
    pub fn discover(start: &Path) -> Result<Self, CoreError> {
        let mut dir = start.to_path_buf();
        loop {
            if dot_dir_path(&dir).is_dir() {
                debug!(root = %dir.display(), "working copy discovered");
                let mut context = Self::read(&dir)?;
                context.abs_path = dir;
                std::fs::create_dir_all(indices_dir_path(&context.abs_path))?;
                return Ok(context);
            }
            if !dir.pop() {
                return Err(CoreError::NoContext);
            }
        }
    }

    /// Creates (or refreshes) the sentinel under `root` and persists the
    /// given credentials. Returns the ready context.
    pub fn initialize(
        root: &Path,
        client_id: String,
        client_secret: String,
        refresh_token: String,
    ) -> Result<Self, CoreError> {
        std::fs::create_dir_all(indices_dir_path(root))?;
        let context = Self {
            client_id,
            client_secret,
            refresh_token,
            abs_path: root.to_path_buf(),
        };
        context.write()?;
        Ok(context)
    }

    fn read(root: &Path) -> Result<Self, CoreError> {
        let data = std::fs::read(credentials_path(root))?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Persists the credentials file, owner read/write only.
    pub fn write(&self) -> Result<(), CoreError> {
        let data = serde_json::to_vec_pretty(self)?;
        let path = credentials_path(&self.abs_path);
        std::fs::write(&path, data)?;
        restrict_permissions(&path)?;
        Ok(())
    }

    /// Maps a working-copy path (always `/`-separated) onto the host
    /// filesystem under the root.
    pub fn abs_path_of(&self, rel: &str) -> PathBuf {
        let mut out = self.abs_path.clone();
        for segment in rel.split('/').filter(|s| !s.is_empty()) {
            out.push(segment);
        }
        out
    }

    /// Computes the working-copy path of a filesystem location, which must
    /// live under the root.
    pub fn rel_path_of(&self, abs: &Path) -> Result<String, CoreError> {
        let rel = abs
            .strip_prefix(&self.abs_path)
            .map_err(|_| CoreError::InvalidPath(abs.display().to_string()))?;
        let joined = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        Ok(paths::normalize(&joined))
    }

    /// The sentinel directory of this working copy.
    pub fn dot_dir(&self) -> PathBuf {
        dot_dir_path(&self.abs_path)
    }

    /// The directory holding per-file index records.
    pub fn indices_dir(&self) -> PathBuf {
        indices_dir_path(&self.abs_path)
    }

    /// The optional `.driveignore` file at the root.
    pub fn ignore_file(&self) -> PathBuf {
        self.abs_path.join(IGNORE_FILE)
    }
}

fn dot_dir_path(root: &Path) -> PathBuf {
    root.join(DOT_DIR)
}

fn credentials_path(root: &Path) -> PathBuf {
    dot_dir_path(root).join(CREDENTIALS_FILE)
}

fn indices_dir_path(root: &Path) -> PathBuf {
    dot_dir_path(root).join(INDICES_DIR)
}

#[cfg(unix)]
pub(crate) fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
pub(crate) fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
