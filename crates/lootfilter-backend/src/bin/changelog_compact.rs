//! `changelog-compact` — compact a change-log file in place.
//!
//! Usage:
//!   changelog-compact <log-file>
//!
//! A log written by the backend is already compacted; this repairs a
//! hand-edited one by folding every line into the compaction tree and
//! rewriting the flattened result. Prints the compacted lines to stdout.

use std::process;

use lootfilter_backend::registry::Registry;
use lootfilter_changelog::ChangeLog;

fn main() {
    let path = match std::env::args().nth(1) {
        Some(path) => path,
        None => {
            eprintln!("usage: changelog-compact <log-file>");
            process::exit(1);
        }
    };

    let log = ChangeLog::new(&path);
    let compacted = match log.load_tree(&Registry) {
        Ok(tree) => tree.flatten(),
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    if let Err(e) = log.rewrite(&compacted) {
        eprintln!("{e}");
        process::exit(1);
    }
    for call in compacted {
        println!("{call}");
    }
}
