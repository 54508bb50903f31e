//! File-based request/response protocol.
//!
//! The frontend talks to the backend through four files in one working
//! directory: it stages multi-line input (batch calls, pasted item text) in
//! the input file, reads responses from the output file, polls the
//! exit-code file for completion, and the diagnostic log receives every
//! request plus full error chains. The exit code is tri-state: `-1` written
//! before execution, then `0` or `1` after, so a polling reader never has
//! to block on a partially-written response.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use lootfilter_changelog::fsio::atomic_write;
use lootfilter_changelog::Call;

use crate::artifact::ArtifactHost;
use crate::engine::{Engine, ExecCtx};
use crate::error::{render_chain, BackendError};
use crate::profile::Profile;
use crate::registry::{self, REPLAY_ALL};

pub const INPUT_FILENAME: &str = "backend.input";
pub const OUTPUT_FILENAME: &str = "backend.output";
pub const EXIT_CODE_FILENAME: &str = "backend.exit_code";
pub const LOG_FILENAME: &str = "backend.log";

/// Line separating consecutive results in a batch response.
pub const BATCH_SEPARATOR: &str = "@";

// ── Exit code ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    InProgress,
    Success,
    Error,
}

impl ExitCode {
    pub fn marker(self) -> &'static str {
        match self {
            ExitCode::InProgress => "-1",
            ExitCode::Success => "0",
            ExitCode::Error => "1",
        }
    }

    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker.trim() {
            "-1" => Some(ExitCode::InProgress),
            "0" => Some(ExitCode::Success),
            "1" => Some(ExitCode::Error),
            _ => None,
        }
    }
}

// ── Output sink ───────────────────────────────────────────────────────────

/// The response stream. A single call's result replaces the file whole; a
/// batch clears it once, then appends each result followed by a `@` line.
#[derive(Debug, Clone)]
pub struct OutputSink {
    path: PathBuf,
}

impl OutputSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn clear(&mut self) -> io::Result<()> {
        atomic_write(&self.path, "")
    }

    pub fn write(&mut self, text: &str) -> io::Result<()> {
        atomic_write(&self.path, text)
    }

    pub fn append(&mut self, text: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{text}\n{BATCH_SEPARATOR}")
    }
}

// ── Workspace ─────────────────────────────────────────────────────────────

/// The request/response file quartet inside one working directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    dir: PathBuf,
}

impl Workspace {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn input_path(&self) -> PathBuf {
        self.dir.join(INPUT_FILENAME)
    }

    pub fn output_path(&self) -> PathBuf {
        self.dir.join(OUTPUT_FILENAME)
    }

    pub fn exit_code_path(&self) -> PathBuf {
        self.dir.join(EXIT_CODE_FILENAME)
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.join(LOG_FILENAME)
    }

    pub fn sink(&self) -> OutputSink {
        OutputSink::new(self.output_path())
    }

    pub fn write_exit_code(&self, code: ExitCode) -> io::Result<()> {
        atomic_write(&self.exit_code_path(), code.marker())
    }

    pub fn read_exit_code(&self) -> io::Result<Option<ExitCode>> {
        Ok(ExitCode::from_marker(&std::fs::read_to_string(
            self.exit_code_path(),
        )?))
    }

    /// Appends one entry to the append-only diagnostic log.
    pub fn log_append(&self, text: &str) -> io::Result<()> {
        if let Some(parent) = self.log_path().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path())?;
        writeln!(file, "{text}")
    }
}

// ── Request wrapper ───────────────────────────────────────────────────────

/// Runs one top-level call inside the protocol envelope: in-progress marker
/// before, success or generic-error marker after, and any failure's full
/// chain appended to the diagnostic log before propagating. The only place
/// errors cross the system boundary.
pub fn run_request<H: ArtifactHost>(
    workspace: &Workspace,
    host: &mut H,
    profile: Option<&Profile>,
    kind: &str,
    args: &[String],
) -> Result<(), BackendError> {
    workspace.write_exit_code(ExitCode::InProgress)?;
    let described = Call::new(kind, args.to_vec()).to_line();
    match profile {
        Some(profile) => {
            workspace.log_append(&format!("request [{}]: {described}", profile.name()))?
        }
        None => workspace.log_append(&format!("request: {described}"))?,
    }

    match dispatch(workspace, host, profile, kind, args) {
        Ok(()) => {
            workspace.write_exit_code(ExitCode::Success)?;
            Ok(())
        }
        Err(error) => {
            workspace.log_append(&render_chain(&error))?;
            workspace.write_exit_code(ExitCode::Error)?;
            Err(error)
        }
    }
}

fn dispatch<H: ArtifactHost>(
    workspace: &Workspace,
    host: &mut H,
    profile: Option<&Profile>,
    kind: &str,
    args: &[String],
) -> Result<(), BackendError> {
    let info = registry::lookup(kind)?;

    // Replay-all fetches its own fresh handle from the source; everything
    // else touching the filter gets the profile's current one, opened once
    // here and shared by reference through the whole call tree.
    let mut artifact = if info.requires_profile && kind != REPLAY_ALL {
        let profile = profile.ok_or_else(|| BackendError::ProfileRequired {
            kind: kind.to_string(),
        })?;
        Some(host.open(profile)?)
    } else {
        None
    };

    let mut sink = workspace.sink();
    let mut engine = Engine::new(host, profile, &mut sink, workspace.input_path());
    engine.execute(artifact.as_mut(), kind, args, ExecCtx::top_level())
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_markers_roundtrip() {
        for code in [ExitCode::InProgress, ExitCode::Success, ExitCode::Error] {
            assert_eq!(ExitCode::from_marker(code.marker()), Some(code));
        }
        assert_eq!(ExitCode::from_marker("2"), None);
    }

    #[test]
    fn sink_append_separates_results() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = OutputSink::new(dir.path().join(OUTPUT_FILENAME));
        sink.clear().unwrap();
        sink.append("first").unwrap();
        sink.append("second").unwrap();
        let text = std::fs::read_to_string(dir.path().join(OUTPUT_FILENAME)).unwrap();
        assert_eq!(text, "first\n@\nsecond\n@\n");
    }

    #[test]
    fn workspace_paths() {
        let ws = Workspace::new("/tmp/dlf");
        assert_eq!(ws.input_path(), Path::new("/tmp/dlf/backend.input"));
        assert_eq!(ws.exit_code_path(), Path::new("/tmp/dlf/backend.exit_code"));
    }
}
