//! Collaborator boundary for the filter artifact and profile storage.
//!
//! The engine never parses filter text itself. Everything that understands
//! the filter's internal rule format, and everything that stores or
//! enumerates profiles, lives behind these traits. The engine only applies
//! calls to a handle, asks it to persist, and asks the host for handles.

use thiserror::Error;

use crate::profile::Profile;

/// Error raised by a collaborator. Opaque to the engine: it aborts the
/// current request and its text lands in the diagnostic log.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct HostError(pub String);

impl HostError {
    pub fn msg(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}

/// An open filter artifact. Created once per top-level request (or once per
/// replay), threaded by `&mut` through the whole recursion, persisted at
/// most once at the end.
pub trait Artifact {
    /// Applies one call and returns its response text (empty for setters).
    fn apply(&mut self, kind: &str, args: &[String]) -> Result<String, HostError>;

    /// Writes the artifact back to its output location.
    fn persist(&mut self) -> Result<(), HostError>;
}

/// Source of artifact handles and home of the profile-level operations.
pub trait ArtifactHost {
    type Handle: Artifact;

    /// Opens the profile's current (already customized) filter.
    fn open(&mut self, profile: &Profile) -> Result<Self::Handle, HostError>;

    /// Fetches a fresh copy of the filter from the external source,
    /// discarding current customizations. Used by replay-all.
    fn refresh(&mut self, profile: &Profile) -> Result<Self::Handle, HostError>;

    /// Whether the profile's customized output filter already exists.
    /// Drives replay-all's `only_if_missing` argument.
    fn output_exists(&self, profile: &Profile) -> bool;

    /// Removes the downloaded source copy after a successful replay. Called
    /// only when the profile's configuration asks for it; hosts that keep
    /// their downloads can leave the default no-op.
    fn discard_source(&mut self, _profile: &Profile) -> Result<(), HostError> {
        Ok(())
    }

    /// Handles the profile-level kinds that never touch a filter
    /// (`is_first_launch`, `get_all_profile_names`, `create_new_profile`,
    /// `set_active_profile`).
    fn profile_call(&mut self, kind: &str, args: &[String]) -> Result<String, HostError>;
}
