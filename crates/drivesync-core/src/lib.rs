//! drivesync-core — domain model and ports
//!
//! The inner layer of the workspace: the [`domain`] model (entries,
//! changes, operation computation, path rules), the working-copy
//! [`context`], the per-file [`index`] store, [`ignore`] pattern
//! handling, and the [`ports`] adapters implement.
//!
//! Nothing in this crate performs network I/O.

pub mod context;
pub mod domain;
pub mod ignore;
pub mod index;
pub mod ports;

pub use context::{Context, DOT_DIR, IGNORE_FILE};
pub use domain::{Change, ContentSource, CoreError, DiffMask, Entry, Op, RemoteError};
pub use index::{IndexRecord, IndexStore};
