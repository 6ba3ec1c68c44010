//! Domain model: entries, changes, errors and path rules.

pub mod change;
pub mod entry;
pub mod errors;
pub mod paths;

pub use change::{differences, reduce_to_size, sort_by_precedence, Change, DiffMask, Op};
pub use entry::{round_to_second, ContentSource, Entry};
pub use errors::{CoreError, RemoteError};
