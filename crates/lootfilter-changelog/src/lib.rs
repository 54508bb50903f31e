//! Compacting change log for loot-filter customizations.
//!
//! The filter file a player runs is periodically replaced from an external
//! download, which would wipe every customization applied through the
//! frontend. This crate keeps those customizations durable: every mutating
//! call is recorded, per profile, into an ordered log that merges calls
//! targeting the same logical setting, so the whole log can be replayed
//! against each fresh download without growing unboundedly or re-applying
//! contradictory edits out of order.
//!
//! - [`call`] — the `kind arg1 ... argN` line form and its tokenizer.
//! - [`tree`] — the compaction trie keyed by kind and leading arguments.
//! - [`log`] — the per-profile log file: read, fold, record, atomic rewrite.
//! - [`fsio`] — temp-and-rename whole-file replacement.

pub mod call;
pub mod fsio;
pub mod log;
pub mod tree;

pub use call::{Call, CallParseError};
pub use log::{ArityFn, ChangeLog, ChangeLogError, KindArity};
pub use tree::{ChangeTree, Node, TreeError};
