//! Changes and operation computation
//!
//! A [`Change`] pairs the two observed states of one path and decides,
//! through [`Change::op`], what has to happen to bring the destination
//! side into agreement with the source side. The decision is a pure
//! function of the two entries and the carried flags.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use super::entry::Entry;

/// The operation a change resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Both sides already agree (or the change was collapsed by flags).
    NoOp,
    /// The destination side is missing the entry.
    Add,
    /// Only the destination side has the entry.
    Delete,
    /// Both sides have it and the content or kind differs.
    Mod,
    /// A modification that is still a conflict candidate: the resolver has
    /// not yet confirmed the counterpart side is unchanged.
    ModConflict,
}

impl Op {
    /// Display symbol for change listings.
    pub fn symbol(self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Delete => "-",
            Op::Mod | Op::ModConflict => "M",
            Op::NoOp => "",
        }
    }

    /// Human name used in per-op summaries.
    pub fn name(self) -> &'static str {
        match self {
            Op::Add => "Addition",
            Op::Delete => "Deletion",
            Op::Mod | Op::ModConflict => "Modification",
            Op::NoOp => "None",
        }
    }

    /// Replay rank: deletions free space before additions consume it.
    pub fn precedence(self) -> u8 {
        match self {
            Op::NoOp => 0,
            Op::Delete => 1,
            Op::Add => 2,
            Op::Mod | Op::ModConflict => 3,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bitset of attributes on which two entries disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiffMask(u8);

impl DiffMask {
    pub const NONE: DiffMask = DiffMask(0);
    pub const DIR_TYPE: DiffMask = DiffMask(1 << 0);
    pub const MD5: DiffMask = DiffMask(1 << 1);
    pub const MOD_TIME: DiffMask = DiffMask(1 << 2);
    pub const SIZE: DiffMask = DiffMask(1 << 3);

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: DiffMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for DiffMask {
    type Output = DiffMask;
    fn bitor(self, rhs: DiffMask) -> DiffMask {
        DiffMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for DiffMask {
    fn bitor_assign(&mut self, rhs: DiffMask) {
        self.0 |= rhs.0;
    }
}

/// Computes the difference mask between two optional entries.
///
/// A missing side differs in every attribute. The checksum bit is only
/// worth computing when the sizes matched; when they differ the content
/// cannot be equal anyway and the bit is set without hashing.
pub fn differences(src: Option<&Entry>, dest: Option<&Entry>, ignore_checksum: bool) -> DiffMask {
    let (src, dest) = match (src, dest) {
        (Some(s), Some(d)) => (s, d),
        _ => return DiffMask::DIR_TYPE | DiffMask::MD5 | DiffMask::MOD_TIME | DiffMask::SIZE,
    };

    let mut mask = DiffMask::NONE;
    if src.size != dest.size {
        mask |= DiffMask::SIZE;
    }
    if src.mtime != dest.mtime {
        mask |= DiffMask::MOD_TIME;
    }
    if src.is_dir != dest.is_dir {
        mask |= DiffMask::DIR_TYPE;
    }
    if !ignore_checksum && (mask.contains(DiffMask::SIZE) || src.md5_checksum() != dest.md5_checksum())
    {
        mask |= DiffMask::MD5;
    }
    mask
}

/// An intended transition of one path from a `src` state to a `dest` state.
///
/// `src` is the authoritative side, `dest` the side to be brought into
/// agreement: remote→local for a pull, local→remote for a push. `path` is
/// relative to the working-copy root, always `/`-separated and
/// `/`-prefixed regardless of host OS.
#[derive(Debug, Clone, Default)]
pub struct Change {
    pub path: String,
    pub parent: String,
    pub src: Option<Entry>,
    pub dest: Option<Entry>,
    pub force: bool,
    pub no_clobber: bool,
    pub ignore_checksum: bool,
    /// Set by the conflict resolver once the counterpart side is known to
    /// be unchanged (or the user opted out of conflict detection); turns a
    /// ModConflict candidate into a plain Mod.
    pub suppress_conflict: bool,
}

impl Change {
    /// The resolved operation. Pure: same inputs, same answer.
    pub fn op(&self) -> Op {
        if self.force {
            return Op::Add;
        }
        let op = self.raw_op();
        if op != Op::Add && self.no_clobber {
            return Op::NoOp;
        }
        op
    }

    fn raw_op(&self) -> Op {
        match (&self.src, &self.dest) {
            (None, None) => Op::NoOp,
            (Some(_), None) => Op::Add,
            (None, Some(_)) => Op::Delete,
            (Some(src), Some(dest)) => {
                if src.is_dir != dest.is_dir {
                    return Op::Mod;
                }
                if src.is_dir {
                    return Op::NoOp;
                }
                let mask = differences(Some(src), Some(dest), self.ignore_checksum);
                if mask.is_empty() {
                    Op::NoOp
                } else if self.suppress_conflict {
                    Op::Mod
                } else {
                    Op::ModConflict
                }
            }
        }
    }

    pub fn symbol(&self) -> &'static str {
        self.op().symbol()
    }
}

/// Orders changes for replay: deletions first, then additions, then
/// modifications. Only safe when clobbering is allowed.
pub fn sort_by_precedence(changes: &mut [Change]) {
    changes.sort_by_key(|c| c.op().precedence());
}

/// Sums the projected transfer size over a change list: source sizes for
/// a push, destination sizes for a pull.
pub fn reduce_to_size(changes: &[Change], is_push: bool) -> u64 {
    changes
        .iter()
        .filter_map(|c| {
            if is_push {
                c.src.as_ref()
            } else {
                c.dest.as_ref()
            }
        })
        .map(|e| e.size)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn file(name: &str, size: u64, secs: i64, md5: &str) -> Entry {
        Entry {
            name: name.to_string(),
            size,
            mtime: Utc.timestamp_opt(secs, 0).unwrap(),
            md5: Some(md5.to_string()),
            ..Default::default()
        }
    }

    fn folder(name: &str) -> Entry {
        Entry {
            name: name.to_string(),
            is_dir: true,
            ..Default::default()
        }
    }

    fn change(src: Option<Entry>, dest: Option<Entry>) -> Change {
        Change {
            path: "/x".to_string(),
            parent: "/".to_string(),
            src,
            dest,
            ..Default::default()
        }
    }

    #[test]
    fn both_missing_is_noop() {
        assert_eq!(change(None, None).op(), Op::NoOp);
    }

    #[test]
    fn src_only_is_add() {
        assert_eq!(change(Some(file("a", 1, 1, "x")), None).op(), Op::Add);
    }

    #[test]
    fn dest_only_is_delete() {
        assert_eq!(change(None, Some(file("a", 1, 1, "x"))).op(), Op::Delete);
    }

    #[test]
    fn force_is_always_add() {
        let mut c = change(None, Some(file("a", 1, 1, "x")));
        c.force = true;
        assert_eq!(c.op(), Op::Add);

        let mut c = change(None, None);
        c.force = true;
        assert_eq!(c.op(), Op::Add);
    }

    #[test]
    fn no_clobber_collapses_non_add() {
        let mut del = change(None, Some(file("a", 1, 1, "x")));
        del.no_clobber = true;
        assert_eq!(del.op(), Op::NoOp);

        let mut add = change(Some(file("a", 1, 1, "x")), None);
        add.no_clobber = true;
        assert_eq!(add.op(), Op::Add);
    }

    #[test]
    fn dir_kind_mismatch_is_mod() {
        assert_eq!(
            change(Some(folder("a")), Some(file("a", 1, 1, "x"))).op(),
            Op::Mod
        );
    }

    #[test]
    fn matching_directories_are_noop() {
        assert_eq!(change(Some(folder("a")), Some(folder("a"))).op(), Op::NoOp);
    }

    #[test]
    fn identical_files_are_noop() {
        let c = change(Some(file("a", 3, 10, "h")), Some(file("a", 3, 10, "h")));
        assert_eq!(c.op(), Op::NoOp);
    }

    #[test]
    fn differing_files_are_conflict_candidates() {
        let c = change(Some(file("a", 3, 10, "h1")), Some(file("a", 3, 99, "h2")));
        assert_eq!(c.op(), Op::ModConflict);
    }

    #[test]
    fn suppressed_candidate_reads_as_mod() {
        let mut c = change(Some(file("a", 3, 10, "h1")), Some(file("a", 3, 99, "h2")));
        c.suppress_conflict = true;
        assert_eq!(c.op(), Op::Mod);
    }

    #[test]
    fn mask_skips_checksum_when_sizes_differ() {
        // Neither entry has a blob source, so a checksum computation would
        // come back None == None; the size mismatch must set the bit alone.
        let a = Entry {
            name: "a".to_string(),
            size: 1,
            ..Default::default()
        };
        let b = Entry {
            name: "a".to_string(),
            size: 2,
            ..Default::default()
        };
        let mask = differences(Some(&a), Some(&b), false);
        assert!(mask.contains(DiffMask::SIZE));
        assert!(mask.contains(DiffMask::MD5));
    }

    #[test]
    fn mask_respects_ignore_checksum() {
        let a = file("a", 3, 10, "h1");
        let b = file("a", 3, 10, "h2");
        let mask = differences(Some(&a), Some(&b), true);
        assert!(mask.is_empty());
        let mask = differences(Some(&a), Some(&b), false);
        assert!(mask.contains(DiffMask::MD5));
    }

    #[test]
    fn missing_side_differs_everywhere() {
        let a = file("a", 3, 10, "h1");
        let mask = differences(Some(&a), None, false);
        assert!(mask.contains(DiffMask::SIZE));
        assert!(mask.contains(DiffMask::MOD_TIME));
        assert!(mask.contains(DiffMask::DIR_TYPE));
        assert!(mask.contains(DiffMask::MD5));
    }

    #[test]
    fn precedence_orders_delete_add_mod() {
        let mut changes = vec![
            change(Some(file("m", 1, 2, "a")), Some(file("m", 2, 3, "b"))),
            change(Some(file("a", 1, 1, "x")), None),
            change(None, Some(file("d", 1, 1, "x"))),
        ];
        sort_by_precedence(&mut changes);
        assert_eq!(changes[0].op(), Op::Delete);
        assert_eq!(changes[1].op(), Op::Add);
        assert_eq!(changes[2].op(), Op::ModConflict);
    }

    #[test]
    fn projected_size_sums_correct_side() {
        let changes = vec![
            change(Some(file("a", 10, 1, "x")), Some(file("a", 4, 2, "y"))),
            change(Some(file("b", 7, 1, "x")), None),
        ];
        assert_eq!(reduce_to_size(&changes, true), 17);
        assert_eq!(reduce_to_size(&changes, false), 4);
    }

    #[test]
    fn symbols() {
        assert_eq!(Op::Add.symbol(), "+");
        assert_eq!(Op::Delete.symbol(), "-");
        assert_eq!(Op::Mod.symbol(), "M");
        assert_eq!(Op::ModConflict.symbol(), "M");
    }
}
