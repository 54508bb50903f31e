//! Error taxonomy for one top-level request.
//!
//! Every variant is fatal to the request it occurs in: nothing is retried,
//! the remaining call tree is abandoned, and any not-yet-persisted artifact
//! mutation is dropped with it. The protocol layer renders the chain into
//! the diagnostic log and flips the exit-code file to the error marker.

use thiserror::Error;

use lootfilter_changelog::{CallParseError, ChangeLogError};

use crate::artifact::HostError;
use crate::profile::ProfileError;
use crate::registry::RegistryError;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("wrong argument count for {kind}: expected {expected}, got {got}")]
    ArityMismatch {
        kind: String,
        expected: usize,
        got: usize,
    },

    #[error("{kind} cannot run inside a batch")]
    NestedBatchRejected { kind: String },

    #[error("operation {kind} requires a profile")]
    ProfileRequired { kind: String },

    #[error("no artifact handle available for {kind}")]
    ArtifactUnavailable { kind: String },

    #[error("malformed batch input at line {line}")]
    BatchLine {
        line: usize,
        #[source]
        source: CallParseError,
    },

    #[error(transparent)]
    ChangeLog(#[from] ChangeLogError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Renders an error with its full source chain, one cause per line. The
/// diagnostic-log equivalent of a traceback.
pub fn render_chain(error: &BackendError) -> String {
    let mut out = format!("Error: {error}");
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        out.push_str(&format!("\n  caused by: {cause}"));
        source = cause.source();
    }
    out
}
