//! Domain error types

use thiserror::Error;

/// Errors raised by the working-copy and domain layers.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No working copy found walking upward from the current directory.
    #[error("not inside a drivesync working copy; run `drivesync init` first")]
    NoContext,

    /// A path explicitly requested on the command line matches the ignore
    /// pattern; recoverable (warn and skip).
    #[error("'{0}' is set to be ignored; use --force to process it anyway")]
    Ignored(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

/// Errors surfaced by the remote gateway.
///
/// `PathNotExists` is deliberately a distinct variant: it is recoverable
/// (a push treats it as "new file"; a pull stops that subtree) while every
/// other failure propagates unchanged.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote path does not exist")]
    PathNotExists,

    #[error("remote API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RemoteError {
    pub fn is_not_exists(&self) -> bool {
        matches!(self, RemoteError::PathNotExists)
    }
}
