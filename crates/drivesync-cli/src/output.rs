//! Change rendering and prompts.

use std::collections::BTreeMap;

use drivesync_core::{Change, Op};

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Renders a size in binary-scaled units.
pub fn pretty_bytes(bytes: u64) -> String {
    const SUFFIXES: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];
    let mut value = bytes as f64;
    let mut index = 0;
    while value >= 1024.0 && index < SUFFIXES.len() - 1 {
        value /= 1024.0;
        index += 1;
    }
    format!("{value:.2}{}", SUFFIXES[index])
}

fn colored_symbol(op: Op) -> String {
    let color = match op {
        Op::Add => GREEN,
        Op::Delete => RED,
        Op::Mod | Op::ModConflict => YELLOW,
        Op::NoOp => return String::new(),
    };
    format!("{color}{}{RESET}", op.symbol())
}

#[derive(Default)]
struct SizeCounter {
    count: u64,
    src: u64,
    dest: u64,
}

impl SizeCounter {
    fn render(&self) -> String {
        let mut out = format!("count {}", self.count);
        if self.src > 0 {
            out.push_str(&format!(" src: {}", pretty_bytes(self.src)));
        }
        if self.dest > 0 {
            out.push_str(&format!(" dest: {}", pretty_bytes(self.dest)));
        }
        out
    }
}

/// Prints each non-NoOp change as `<symbol> <path>` followed by a per-op
/// summary with counts and byte totals.
pub fn print_changes(changes: &[Change]) {
    let mut summary: BTreeMap<&'static str, SizeCounter> = BTreeMap::new();

    for change in changes {
        let op = change.op();
        if op == Op::NoOp {
            continue;
        }
        println!("{} {}", colored_symbol(op), change.path);

        let counter = summary.entry(op.name()).or_default();
        counter.count += 1;
        if let Some(src) = &change.src {
            counter.src += src.size;
        }
        if let Some(dest) = &change.dest {
            counter.dest += dest.size;
        }
    }

    for (name, counter) in &summary {
        println!("{name} {}", counter.render());
    }
}

/// Lists conflicting paths with the override hint.
pub fn warn_conflicts(conflicts: &[Change]) {
    eprintln!(
        "These {} file(s) would be overwritten. Use --ignore-conflict to override this behaviour",
        conflicts.len()
    );
    for conflict in conflicts {
        eprintln!("{}", conflict.path);
    }
}

/// Asks for confirmation unless prompting is disabled.
pub fn confirm(question: &str, no_prompt: bool) -> bool {
    if no_prompt {
        return true;
    }
    dialoguer::Confirm::new()
        .with_prompt(question)
        .default(false)
        .interact()
        .unwrap_or(false)
}
