//! Batch/replay delegation engine.
//!
//! Executes one call, or a whole sequence of calls, against a live artifact
//! handle, and decides once at the end whether the artifact gets persisted.
//! Two kinds recurse exactly one level:
//!
//! - replay-all fetches a fresh filter from the external source and
//!   re-applies every logged call to it;
//! - batch runs every line of the request input file, concatenating
//!   per-call output into one response.
//!
//! Neither may appear below the other (or below itself); the [`ExecCtx`]
//! flag passed down makes that a property of the call tree, not of name
//! comparisons. Depth is therefore at most two.
//!
//! A mutating call records its intent into the profile's change log before
//! the artifact-side effect is attempted. The log is the source of truth
//! for what the user asked for, independent of execution success: a call
//! whose effect fails stays recorded and will be applied by the next
//! replay. Reordering this would change observable replay outcomes after
//! partial failures.

use std::fs;
use std::path::PathBuf;

use lootfilter_changelog::{Call, ChangeLog};

use crate::artifact::{Artifact, ArtifactHost};
use crate::error::BackendError;
use crate::profile::Profile;
use crate::protocol::OutputSink;
use crate::registry::{self, Registry, REPLAY_ALL, RUN_BATCH};

// ── Execution context ─────────────────────────────────────────────────────

/// Position of a call in the (at most two deep) execution tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecCtx {
    /// The call runs below a batch or a replay; its output is appended to
    /// the shared stream and the artifact is not persisted per call.
    pub in_batch: bool,
    /// The call is an already-logged call being replayed: do not re-record
    /// it (that would duplicate or reorder the log) and emit no output.
    pub suppress_log: bool,
}

impl ExecCtx {
    pub const fn top_level() -> Self {
        Self {
            in_batch: false,
            suppress_log: false,
        }
    }

    const fn batched() -> Self {
        Self {
            in_batch: true,
            suppress_log: false,
        }
    }

    const fn replayed() -> Self {
        Self {
            in_batch: true,
            suppress_log: true,
        }
    }
}

// ── Engine ────────────────────────────────────────────────────────────────

/// One request's delegation state: the collaborator host, the profile the
/// request runs under, the shared output stream, and the batch input path.
pub struct Engine<'a, H: ArtifactHost> {
    host: &'a mut H,
    profile: Option<&'a Profile>,
    sink: &'a mut OutputSink,
    batch_input: PathBuf,
}

impl<'a, H: ArtifactHost> Engine<'a, H> {
    pub fn new(
        host: &'a mut H,
        profile: Option<&'a Profile>,
        sink: &'a mut OutputSink,
        batch_input: PathBuf,
    ) -> Self {
        Self {
            host,
            profile,
            sink,
            batch_input,
        }
    }

    /// Executes one call against the given artifact handle (if any),
    /// honoring the context's recursion and logging flags.
    pub fn execute(
        &mut self,
        mut artifact: Option<&mut H::Handle>,
        kind: &str,
        args: &[String],
        ctx: ExecCtx,
    ) -> Result<(), BackendError> {
        let info = registry::lookup(kind)?;
        if info.requires_profile && self.profile.is_none() {
            return Err(BackendError::ProfileRequired {
                kind: kind.to_string(),
            });
        }

        // Record mutation intent before anything else, so even a request
        // whose artifact-side effect fails has its deduplicated intent in
        // the log.
        if let Some(match_arity) = info.match_arity {
            if args.len() != match_arity + 1 {
                return Err(BackendError::ArityMismatch {
                    kind: kind.to_string(),
                    expected: match_arity + 1,
                    got: args.len(),
                });
            }
            if !ctx.suppress_log {
                if let Some(profile) = self.profile {
                    ChangeLog::new(profile.changes_path())
                        .record(&Registry, &Call::new(kind, args.to_vec()))?;
                }
            }
        }

        let output = match kind {
            RUN_BATCH | REPLAY_ALL if ctx.in_batch => {
                return Err(BackendError::NestedBatchRejected {
                    kind: kind.to_string(),
                });
            }
            RUN_BATCH => {
                if !args.is_empty() {
                    return Err(BackendError::ArityMismatch {
                        kind: kind.to_string(),
                        expected: 0,
                        got: args.len(),
                    });
                }
                // The batch writes its own output stream and makes its own
                // single persist decision; nothing further here.
                return self.run_batch(artifact);
            }
            REPLAY_ALL => {
                self.replay_all(args)?;
                String::new()
            }
            _ if !info.requires_profile => self.host.profile_call(kind, args)?,
            _ => match artifact.as_mut() {
                Some(handle) => handle.apply(kind, args)?,
                None => {
                    return Err(BackendError::ArtifactUnavailable {
                        kind: kind.to_string(),
                    });
                }
            },
        };

        if ctx.in_batch {
            if !ctx.suppress_log {
                self.sink.append(&output)?;
            }
        } else {
            self.sink.write(&output)?;
            if info.is_mutating() {
                if let Some(handle) = artifact.as_mut() {
                    handle.persist()?;
                }
            }
        }
        Ok(())
    }

    /// Runs every call listed in the batch input file, one per line, then
    /// persists the artifact exactly once iff any of them was mutating.
    fn run_batch(&mut self, mut artifact: Option<&mut H::Handle>) -> Result<(), BackendError> {
        // Output accumulates across the batch; start from a clean stream.
        self.sink.clear()?;
        let text = fs::read_to_string(&self.batch_input)?;
        let mut contains_mutator = false;
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let call = Call::parse(line).map_err(|source| BackendError::BatchLine {
                line: idx + 1,
                source,
            })?;
            if registry::lookup(&call.kind)?.is_mutating() {
                contains_mutator = true;
            }
            let handle = artifact.as_mut().map(|a| &mut **a);
            self.execute(handle, &call.kind, &call.args, ExecCtx::batched())?;
        }
        if contains_mutator {
            match artifact.as_mut() {
                Some(handle) => handle.persist()?,
                None => {
                    return Err(BackendError::ArtifactUnavailable {
                        kind: RUN_BATCH.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Fetches a fresh filter from the external source and re-applies the
    /// profile's entire change log to it, persisting once at the end.
    fn replay_all(&mut self, args: &[String]) -> Result<(), BackendError> {
        let profile = match self.profile {
            Some(profile) => profile,
            None => {
                return Err(BackendError::ProfileRequired {
                    kind: REPLAY_ALL.to_string(),
                });
            }
        };
        let only_if_missing = match args {
            [] => false,
            [flag] if flag == "only_if_missing" => true,
            _ => {
                return Err(BackendError::ArityMismatch {
                    kind: REPLAY_ALL.to_string(),
                    expected: 0,
                    got: args.len(),
                });
            }
        };
        if only_if_missing && self.host.output_exists(profile) {
            return Ok(());
        }

        let mut fresh = self.host.refresh(profile)?;
        let logged = ChangeLog::new(profile.changes_path()).read_calls(&Registry)?;
        for call in logged {
            self.execute(Some(&mut fresh), &call.kind, &call.args, ExecCtx::replayed())?;
        }
        fresh.persist()?;

        // The downloaded copy has served its purpose; drop it if the
        // profile's configuration says so.
        if profile.config_path().exists() {
            let config = profile.load_config()?;
            if config.remove_downloaded_filter {
                self.host.discard_source(profile)?;
            }
        }
        Ok(())
    }
}
