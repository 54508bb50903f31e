//! Per-profile paths and configuration.
//!
//! A profile is a directory under the profiles root holding the profile's
//! change log (`changes.txt`) and its configuration (`config.json`). The
//! engine only resolves paths and reads the configuration; creating and
//! enumerating profiles belongs to the host collaborator.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CHANGES_FILENAME: &str = "changes.txt";
pub const CONFIG_FILENAME: &str = "config.json";

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile {0:?} does not exist")]
    Missing(String),
    #[error("profile config {path:?}: {source}")]
    Config {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Paths the host collaborator needs to fetch and place filter copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Directory the external source drops new filter files into.
    pub download_directory: PathBuf,
    /// The freshly downloaded, uncustomized filter.
    pub downloaded_filter: PathBuf,
    /// Where the customized filter is written for the game client.
    pub output_filter: PathBuf,
    /// Delete the downloaded copy after a successful import.
    #[serde(default)]
    pub remove_downloaded_filter: bool,
}

/// One named profile inside a profiles root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    name: String,
    dir: PathBuf,
}

impl Profile {
    pub fn new(root: &Path, name: impl Into<String>) -> Self {
        let name = name.into();
        let dir = root.join(&name);
        Self { name, dir }
    }

    /// Resolves an existing profile, failing if its directory is absent.
    pub fn open(root: &Path, name: impl Into<String>) -> Result<Self, ProfileError> {
        let profile = Self::new(root, name);
        if !profile.dir.is_dir() {
            return Err(ProfileError::Missing(profile.name));
        }
        Ok(profile)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of this profile's change log.
    pub fn changes_path(&self) -> PathBuf {
        self.dir.join(CHANGES_FILENAME)
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILENAME)
    }

    pub fn load_config(&self) -> Result<ProfileConfig, ProfileError> {
        let path = self.config_path();
        let text = fs::read_to_string(&path)?;
        serde_json::from_str(&text).map_err(|source| ProfileError::Config { path, source })
    }

    pub fn store_config(&self, config: &ProfileConfig) -> Result<(), ProfileError> {
        // config.json is small and rarely written; the same atomic-replace
        // discipline as the change log still applies.
        let text = serde_json::to_string_pretty(config)
            .map_err(|source| ProfileError::Config {
                path: self.config_path(),
                source,
            })?;
        lootfilter_changelog::fsio::atomic_write(&self.config_path(), &text)?;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config(root: &Path) -> ProfileConfig {
        ProfileConfig {
            download_directory: root.join("downloads"),
            downloaded_filter: root.join("downloads/NeversinkStrict.filter"),
            output_filter: root.join("poe/NeversinkStrict.filter"),
            remove_downloaded_filter: true,
        }
    }

    #[test]
    fn open_missing_profile_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Profile::open(dir.path(), "NoSuch").unwrap_err();
        assert!(matches!(err, ProfileError::Missing(name) if name == "NoSuch"));
    }

    #[test]
    fn config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let profile = Profile::new(dir.path(), "League");
        let config = sample_config(dir.path());
        profile.store_config(&config).unwrap();

        let opened = Profile::open(dir.path(), "League").unwrap();
        assert_eq!(opened.load_config().unwrap(), config);
    }

    #[test]
    fn paths_live_under_profile_dir() {
        let dir = tempfile::tempdir().unwrap();
        let profile = Profile::new(dir.path(), "League");
        assert_eq!(profile.changes_path(), dir.path().join("League/changes.txt"));
        assert_eq!(profile.config_path(), dir.path().join("League/config.json"));
    }
}
