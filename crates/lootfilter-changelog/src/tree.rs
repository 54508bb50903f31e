//! Compaction trie over logged calls.
//!
//! The tree is keyed by call kind at the root, then by each of the first
//! `match_arity` argument values, and terminates in a leaf holding the
//! trailing value. Inserting a call whose kind and leading arguments are
//! already present overwrites the existing leaf in place, which is what
//! compacts the log: the repeat keeps its original position in iteration
//! order, only its value changes.
//!
//! Branches use [`IndexMap`] so sibling order is first-insertion order;
//! that order is the replay order and must survive flattening.

use indexmap::IndexMap;
use thiserror::Error;

use crate::call::Call;

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq)]
pub enum TreeError {
    /// A kind was inserted at two different depths. Cannot happen when every
    /// insert for a kind uses the registry's single match arity.
    #[error("conflicting match arity for kind {kind:?}")]
    ArityConflict { kind: String },
    /// The call does not carry `match_arity` leading arguments plus one
    /// trailing value.
    #[error("call {kind:?} has {got} arguments, match arity {match_arity} needs one more")]
    BadArgumentCount {
        kind: String,
        match_arity: usize,
        got: usize,
    },
}

// ── Node ──────────────────────────────────────────────────────────────────

/// One trie node: either the final trailing value, or an ordered map of the
/// next argument value to the node below it.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Leaf(String),
    Branch(IndexMap<String, Node>),
}

impl Node {
    fn seed(depth_remaining: usize) -> Self {
        if depth_remaining == 0 {
            Node::Leaf(String::new())
        } else {
            Node::Branch(IndexMap::new())
        }
    }

    fn insert(&mut self, keys: &[String], value: &str) -> Result<(), ()> {
        match keys.split_first() {
            None => match self {
                // Leaf overwrite at an existing key path: this is the
                // compaction step.
                Node::Leaf(v) => {
                    *v = value.to_string();
                    Ok(())
                }
                Node::Branch(_) => Err(()),
            },
            Some((key, rest)) => match self {
                Node::Branch(children) => children
                    .entry(key.clone())
                    .or_insert_with(|| Node::seed(rest.len()))
                    .insert(rest, value),
                Node::Leaf(_) => Err(()),
            },
        }
    }

    fn collect(&self, kind: &str, prefix: &mut Vec<String>, out: &mut Vec<Call>) {
        match self {
            Node::Leaf(value) => {
                let mut args = prefix.clone();
                args.push(value.clone());
                out.push(Call::new(kind, args));
            }
            Node::Branch(children) => {
                for (key, child) in children {
                    prefix.push(key.clone());
                    child.collect(kind, prefix, out);
                    prefix.pop();
                }
            }
        }
    }
}

// ── ChangeTree ────────────────────────────────────────────────────────────

/// The in-memory, compaction-oriented form of one profile's change log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeTree {
    kinds: IndexMap<String, Node>,
}

impl ChangeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a call under its kind and first `match_arity` arguments,
    /// setting the leaf to the trailing argument. A call matching an
    /// existing key path replaces that leaf's value in place.
    pub fn insert(&mut self, call: &Call, match_arity: usize) -> Result<(), TreeError> {
        if call.args.len() != match_arity + 1 {
            return Err(TreeError::BadArgumentCount {
                kind: call.kind.clone(),
                match_arity,
                got: call.args.len(),
            });
        }
        let (leading, trailing) = call.args.split_at(match_arity);
        let root = self
            .kinds
            .entry(call.kind.clone())
            .or_insert_with(|| Node::seed(match_arity));
        root.insert(leading, &trailing[0])
            .map_err(|()| TreeError::ArityConflict {
                kind: call.kind.clone(),
            })
    }

    /// Flattens the tree back to an ordered call sequence by pre-order
    /// traversal over key insertion order.
    pub fn flatten(&self) -> Vec<Call> {
        let mut out = Vec::new();
        let mut prefix = Vec::new();
        for (kind, node) in &self.kinds {
            node.collect(kind, &mut prefix, &mut out);
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
