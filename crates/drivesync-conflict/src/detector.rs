//! Conflict detection against the persisted index
//!
//! A modification candidate is conflicting only when BOTH sides moved
//! since the last sync: the counterpart's mtime (the state about to be
//! overwritten) no longer matches the indexed mtime, AND the
//! authoritative side's checksum no longer matches the indexed checksum.
//! A file that was never indexed has never been synced and cannot
//! conflict; a pure mtime mismatch with an unchanged counterpart (e.g. a
//! rename or a touch) is not a conflict either.

use drivesync_core::{Change, IndexRecord, Op};
use tracing::{debug, info};

/// Result of running a change list through the resolver.
#[derive(Debug, Default)]
pub struct Partitioned {
    /// Changes safe to execute: non-candidates plus re-admitted false
    /// alarms (their conflict label suppressed).
    pub executable: Vec<Change>,
    /// True conflicts; a non-empty list must abort the run unless the
    /// user overrides.
    pub conflicts: Vec<Change>,
}

/// Splits a change list into non-candidates and modification candidates.
pub fn sift(changes: Vec<Change>) -> (Vec<Change>, Vec<Change>) {
    changes
        .into_iter()
        .partition(|c| c.op() != Op::ModConflict)
}

/// The conflict predicate for one candidate.
///
/// In change coordinates the rule is the same for push and pull: the
/// counterpart is the destination side and the authoritative side is the
/// source.
pub fn is_conflicting(change: &Change, index: Option<&IndexRecord>) -> bool {
    let Some(index) = index else {
        // First sync of this file: nothing recorded, nothing to defend.
        return false;
    };
    let (Some(src), Some(dest)) = (&change.src, &change.dest) else {
        return false;
    };

    if dest.mtime.timestamp() == index.mtime {
        // Counterpart untouched since the last sync; a one-sided edit.
        return false;
    }

    let src_md5 = src.md5_checksum().unwrap_or_default();
    src_md5 != index.md5
}

/// Classifies a change list, looking up index records through `lookup`.
///
/// With `ignore_conflict` set the classification is skipped entirely and
/// every candidate is re-admitted with its conflict label suppressed.
pub fn partition(
    changes: Vec<Change>,
    ignore_conflict: bool,
    lookup: impl Fn(&str) -> Option<IndexRecord>,
) -> Partitioned {
    if ignore_conflict {
        let executable = changes.into_iter().map(suppress).collect();
        return Partitioned {
            executable,
            conflicts: Vec::new(),
        };
    }

    let (mut executable, candidates) = sift(changes);
    let mut conflicts = Vec::new();

    for change in candidates {
        let index = file_id(&change).and_then(|id| lookup(id));
        if is_conflicting(&change, index.as_ref()) {
            info!(path = %change.path, "both sides changed since last sync");
            conflicts.push(change);
        } else {
            debug!(path = %change.path, "modification is one-sided, re-admitting");
            executable.push(suppress(change));
        }
    }

    Partitioned {
        executable,
        conflicts,
    }
}

fn suppress(mut change: Change) -> Change {
    change.suppress_conflict = true;
    change
}

/// The remote id relevant to a change: whichever side carries one.
fn file_id(change: &Change) -> Option<&str> {
    change
        .dest
        .as_ref()
        .and_then(|e| e.remote_id.as_deref())
        .or_else(|| change.src.as_ref().and_then(|e| e.remote_id.as_deref()))
}
