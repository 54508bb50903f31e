//! Change-log file lifecycle.
//!
//! One log file per profile, one canonical call line per entry. The file is
//! the persisted form of a [`ChangeTree`]: on every mutating request it is
//! read fully, folded into the tree, mutated in memory, flattened, and
//! rewritten in full (atomically, never appended).
//!
//! The log never stores non-mutating calls; every line must name a kind the
//! arity source knows as mutating, with exactly `match_arity + 1` arguments.
//! Anything else is a fatal corruption, with no partial recovery.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::call::{Call, CallParseError};
use crate::fsio::atomic_write;
use crate::tree::{ChangeTree, TreeError};

// ── Arity source ──────────────────────────────────────────────────────────

/// Where the log learns each kind's match arity. Returns `Some(n)` for
/// mutating kinds only.
pub trait KindArity {
    fn match_arity(&self, kind: &str) -> Option<usize>;
}

/// Adapter for closure-backed arity sources, mostly useful in tests.
pub struct ArityFn<F>(pub F);

impl<F> KindArity for ArityFn<F>
where
    F: Fn(&str) -> Option<usize>,
{
    fn match_arity(&self, kind: &str) -> Option<usize> {
        (self.0)(kind)
    }
}

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ChangeLogError {
    #[error("corrupt change log {path:?} at line {line}: {reason}")]
    Corrupt {
        path: PathBuf,
        line: usize,
        reason: CorruptReason,
    },
    #[error("cannot record non-mutating kind {0:?} in change log")]
    NotMutating(String),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Error, PartialEq)]
pub enum CorruptReason {
    #[error("{0}")]
    Parse(#[from] CallParseError),
    #[error("unknown or non-mutating kind {0:?}")]
    UnknownKind(String),
    #[error("kind {kind:?} expects {expected} arguments, line has {got}")]
    WrongArgumentCount {
        kind: String,
        expected: usize,
        got: usize,
    },
}

// ── ChangeLog ─────────────────────────────────────────────────────────────

/// Handle to one profile's change-log file.
#[derive(Debug, Clone)]
pub struct ChangeLog {
    path: PathBuf,
}

impl ChangeLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and validates the flattened call sequence. A missing file is an
    /// empty log.
    pub fn read_calls(&self, arity: &dyn KindArity) -> Result<Vec<Call>, ChangeLogError> {
        let entries = self.read_entries(arity)?;
        Ok(entries.into_iter().map(|(call, _)| call).collect())
    }

    /// Like [`read_calls`](Self::read_calls), but pairs each call with the
    /// match arity it was validated against, so callers never consult the
    /// arity source a second time for the same line.
    pub fn read_entries(
        &self,
        arity: &dyn KindArity,
    ) -> Result<Vec<(Call, usize)>, ChangeLogError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut calls = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let call = Call::parse(line).map_err(|e| self.corrupt(idx + 1, e.into()))?;
            let match_arity = arity.match_arity(&call.kind).ok_or_else(|| {
                self.corrupt(idx + 1, CorruptReason::UnknownKind(call.kind.clone()))
            })?;
            if call.args.len() != match_arity + 1 {
                return Err(self.corrupt(
                    idx + 1,
                    CorruptReason::WrongArgumentCount {
                        kind: call.kind.clone(),
                        expected: match_arity + 1,
                        got: call.args.len(),
                    },
                ));
            }
            calls.push((call, match_arity));
        }
        Ok(calls)
    }

    /// Reads the log and folds it into its compaction tree.
    pub fn load_tree(&self, arity: &dyn KindArity) -> Result<ChangeTree, ChangeLogError> {
        let mut tree = ChangeTree::new();
        for (call, match_arity) in self.read_entries(arity)? {
            tree.insert(&call, match_arity)?;
        }
        Ok(tree)
    }

    /// Records one mutating call: fold the existing log into its tree,
    /// insert the call (overwriting any entry with the same kind and leading
    /// arguments in place), flatten, and rewrite the file in full.
    pub fn record(&self, arity: &dyn KindArity, call: &Call) -> Result<(), ChangeLogError> {
        let match_arity = arity
            .match_arity(&call.kind)
            .ok_or_else(|| ChangeLogError::NotMutating(call.kind.clone()))?;
        let mut tree = self.load_tree(arity)?;
        tree.insert(call, match_arity)?;
        self.rewrite(&tree.flatten())
    }

    /// Rewrites the log file with the given call sequence, one canonical
    /// line per call, via temp-and-rename.
    pub fn rewrite(&self, calls: &[Call]) -> Result<(), ChangeLogError> {
        let mut text = String::new();
        for call in calls {
            text.push_str(&call.to_line());
            text.push('\n');
        }
        atomic_write(&self.path, &text)?;
        Ok(())
    }

    fn corrupt(&self, line: usize, reason: CorruptReason) -> ChangeLogError {
        ChangeLogError::Corrupt {
            path: self.path.clone(),
            line,
            reason,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
