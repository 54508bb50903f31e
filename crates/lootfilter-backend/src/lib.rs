//! Backend engine for durable loot-filter customization.
//!
//! A file-driven frontend issues one operation per process invocation (or a
//! batch of them via the input file); this crate classifies the operation,
//! records mutating intent into the profile's compacting change log, applies
//! it to the filter through the collaborator traits, and answers through
//! the output/exit-code file protocol.
//!
//! - [`registry`] — static per-kind metadata (profile requirement, match
//!   arity for compaction).
//! - [`engine`] — batch/replay delegation with a single persist decision.
//! - [`artifact`] — the collaborator seam: filter handles and profile ops.
//! - [`profile`] — per-profile paths and configuration.
//! - [`protocol`] — the input/output/exit-code/log file quartet.

pub mod artifact;
pub mod engine;
pub mod error;
pub mod profile;
pub mod protocol;
pub mod registry;

pub use artifact::{Artifact, ArtifactHost, HostError};
pub use engine::{Engine, ExecCtx};
pub use error::BackendError;
pub use profile::{Profile, ProfileConfig, ProfileError};
pub use protocol::{run_request, ExitCode, OutputSink, Workspace};
pub use registry::{lookup, OpInfo, Registry, RegistryError, REPLAY_ALL, RUN_BATCH};
