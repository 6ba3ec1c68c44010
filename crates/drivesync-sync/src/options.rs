//! Run options shared by the engine's operations.

use std::path::PathBuf;

use drivesync_core::ports::UploadOptions;
use drivesync_core::Context;
use regex::Regex;

/// Options for one engine run, assembled by the CLI.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Working-copy paths the run operates on (normalized, `/`-prefixed).
    pub sources: Vec<String>,
    pub recursive: bool,
    /// Include hidden (dot-prefixed) entries.
    pub hidden: bool,
    /// Turn every change into an Add regardless of comparison.
    pub force: bool,
    /// Never overwrite existing destination state.
    pub no_clobber: bool,
    /// Skip confirmation prompts.
    pub no_prompt: bool,
    /// Compare by size/mtime only, skipping checksums.
    pub ignore_checksum: bool,
    /// Skip conflict classification entirely.
    pub ignore_conflict: bool,
    /// Export formats for server-native documents on pull (extensions).
    pub exports: Vec<String>,
    /// Alternate directory for export output.
    pub exports_dir: Option<PathBuf>,
    /// Stream through stdin/stdout instead of resolving a change list.
    pub piped: bool,
    /// Listing recursion depth; negative means unlimited.
    pub depth: i64,
    /// Remote listing page size; `None` keeps the gateway default.
    pub page_size: Option<u32>,
    /// Include owner names in listings.
    pub owners: bool,
    /// Operate on trashed entries in listings/lookups.
    pub in_trash: bool,
    /// Server-side upload switches (ocr, convert, pinning, indexing).
    pub upload: UploadOptions,
    /// Compiled `.driveignore` pattern, matched against entry names.
    pub ignore_regex: Option<Regex>,
}

impl SyncOptions {
    /// Loads the working copy's ignore pattern unless `force` is set, in
    /// which case nothing is filtered.
    pub fn load_ignore(mut self, context: &Context) -> Self {
        if !self.force {
            self.ignore_regex = drivesync_core::ignore::load(&context.ignore_file());
        }
        self
    }
}
