//! drivesync-conflict — Modify-vs-Modify classification
//!
//! Decides, for each modification candidate in a change list, whether
//! both sides were edited since the last sync (a true conflict) or only
//! one side moved (safe to replay).

pub mod detector;

pub use detector::{is_conflicting, partition, sift, Partitioned};
