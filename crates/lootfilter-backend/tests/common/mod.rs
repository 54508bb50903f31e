#![allow(dead_code)]

//! Fake collaborator host wired through the real protocol and engine.
//!
//! The artifact renders itself as text: the base filter text followed by
//! one line per applied mutating call. Persisted renderings are collected
//! on the host so tests can count persist decisions and compare replay
//! outcomes byte for byte.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use lootfilter_backend::artifact::{Artifact, ArtifactHost, HostError};
use lootfilter_backend::profile::Profile;
use lootfilter_backend::registry;

#[derive(Default)]
pub struct FakeHost {
    /// Text of the profile's current (already customized) filter.
    pub current_text: String,
    /// Text a fresh download would contain.
    pub fresh_text: String,
    /// Whether the customized output filter already exists on disk.
    pub output_present: bool,
    /// Kind whose artifact-side effect should fail.
    pub fail_on: Option<String>,
    /// Renderings captured by every `persist` call, in order.
    pub persists: Rc<RefCell<Vec<String>>>,
    /// Profile-level calls routed to the host.
    pub profile_calls: Rc<RefCell<Vec<String>>>,
    pub refresh_count: Rc<RefCell<usize>>,
    pub discard_count: Rc<RefCell<usize>>,
}

impl FakeHost {
    pub fn with_fresh(fresh_text: &str) -> Self {
        Self {
            current_text: fresh_text.to_string(),
            fresh_text: fresh_text.to_string(),
            ..Self::default()
        }
    }

    pub fn persist_count(&self) -> usize {
        self.persists.borrow().len()
    }

    pub fn last_persisted(&self) -> Option<String> {
        self.persists.borrow().last().cloned()
    }

    fn artifact(&self, text: &str) -> FakeArtifact {
        FakeArtifact {
            text: text.to_string(),
            fail_on: self.fail_on.clone(),
            persists: Rc::clone(&self.persists),
        }
    }
}

impl ArtifactHost for FakeHost {
    type Handle = FakeArtifact;

    fn open(&mut self, _profile: &Profile) -> Result<FakeArtifact, HostError> {
        Ok(self.artifact(&self.current_text))
    }

    fn refresh(&mut self, _profile: &Profile) -> Result<FakeArtifact, HostError> {
        *self.refresh_count.borrow_mut() += 1;
        Ok(self.artifact(&self.fresh_text))
    }

    fn output_exists(&self, _profile: &Profile) -> bool {
        self.output_present
    }

    fn discard_source(&mut self, _profile: &Profile) -> Result<(), HostError> {
        *self.discard_count.borrow_mut() += 1;
        Ok(())
    }

    fn profile_call(&mut self, kind: &str, args: &[String]) -> Result<String, HostError> {
        self.profile_calls
            .borrow_mut()
            .push(format!("{kind} {}", args.join(" ")));
        match kind {
            "is_first_launch" => Ok("0".to_string()),
            "get_all_profile_names" => Ok("League\nStandard".to_string()),
            _ => Ok(String::new()),
        }
    }
}

pub struct FakeArtifact {
    text: String,
    fail_on: Option<String>,
    persists: Rc<RefCell<Vec<String>>>,
}

impl Artifact for FakeArtifact {
    fn apply(&mut self, kind: &str, args: &[String]) -> Result<String, HostError> {
        if self.fail_on.as_deref() == Some(kind) {
            return Err(HostError::msg(format!("filter rejected {kind}")));
        }
        let mutating = registry::lookup(kind)
            .map(|info| info.is_mutating())
            .unwrap_or(false);
        if mutating {
            self.text.push_str(&format!("# {kind} {}\n", args.join(";")));
            Ok(String::new())
        } else {
            Ok(format!("{kind}:{}", args.join(";")))
        }
    }

    fn persist(&mut self) -> Result<(), HostError> {
        self.persists.borrow_mut().push(self.text.clone());
        Ok(())
    }
}

/// Creates a profile directory under `root` and returns the profile.
pub fn make_profile(root: &Path, name: &str) -> Profile {
    let profile = Profile::new(root, name);
    std::fs::create_dir_all(profile.dir()).unwrap();
    profile
}

pub fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
