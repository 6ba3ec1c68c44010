//! drivesync-sync — change resolution and execution
//!
//! The application layer: the [`engine::Engine`] walks both trees
//! ([`walker`], [`resolver`]), classifies conflicts, and plays change
//! lists through the [`pull`] and [`push`] executors. The supporting
//! verbs (list, stat, touch, diff, move/rename/copy, share, trash) live
//! under [`ops`].

pub mod engine;
pub mod mount;
pub mod ops;
pub mod options;
pub mod pull;
pub mod push;
pub mod quota;
pub mod resolver;
pub mod walker;

pub use engine::Engine;
pub use mount::MountSession;
pub use options::SyncOptions;
pub use quota::QuotaStatus;
