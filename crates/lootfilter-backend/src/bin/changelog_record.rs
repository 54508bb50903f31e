//! `changelog-record` — record one mutating call into a change-log file.
//!
//! Usage:
//!   changelog-record <log-file> <kind> <args...>
//!
//! Folds the existing log into its compaction tree, inserts the call, and
//! rewrites the file. Prints the resulting flattened log to stdout.

use std::process;

use lootfilter_backend::registry::{self, Registry};
use lootfilter_changelog::{Call, ChangeLog};

fn main() {
    let mut args = std::env::args().skip(1);
    let (path, kind) = match (args.next(), args.next()) {
        (Some(path), Some(kind)) => (path, kind),
        _ => {
            eprintln!("usage: changelog-record <log-file> <kind> <args...>");
            process::exit(1);
        }
    };

    let info = match registry::lookup(&kind) {
        Ok(info) => info,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    if !info.is_mutating() {
        eprintln!("{kind} is not a mutating operation; nothing to record");
        process::exit(1);
    }

    let log = ChangeLog::new(&path);
    let call = Call::new(kind, args.collect());
    if let Err(e) = log.record(&Registry, &call) {
        eprintln!("{e}");
        process::exit(1);
    }

    match log.read_calls(&Registry) {
        Ok(calls) => {
            for call in calls {
                println!("{call}");
            }
        }
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    }
}
