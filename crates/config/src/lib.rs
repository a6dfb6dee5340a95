// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sm-config: catalogue, profiles, and repo configuration loading.

mod catalogue;
mod error;
mod profiles;
mod repo;

pub use catalogue::load_catalogue;
pub use error::ConfigError;
pub use profiles::load_profiles;
pub use repo::{load_repo_config, RepoConfig, DEFAULT_PING_URL, DEFAULT_RELEASE_REPO_URL};

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use sm_core::{Profile, Service};

/// Everything loaded from a config directory. Workspace path, catalogue,
/// and profiles are process-wide; this struct is the explicit parameter
/// they're threaded through, never a module-level singleton.
#[derive(Debug, Clone)]
pub struct Config {
    pub config_dir: PathBuf,
    pub catalogue: HashMap<String, Service>,
    pub profiles: HashMap<String, Profile>,
    pub repo: RepoConfig,
}

impl Config {
    /// Load (or reload) all three documents from `config_dir`. Idempotent:
    /// calling it again with the same directory produces an independent
    /// `Config` with no references back to a previous load, which is what
    /// `update-config`'s hot-swap needs.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let services_file = config_dir.join("services.json");
        let services_dir = config_dir.join("services");
        let catalogue_path = if services_dir.is_dir() {
            services_dir
        } else {
            services_file
        };

        let catalogue = load_catalogue(&catalogue_path)?;
        let profiles = load_profiles(&config_dir.join("profiles.json"))?;
        let repo_config_path = config_dir.join("config.json");
        let repo = load_repo_config(repo_config_path.is_file().then_some(&repo_config_path));

        Ok(Config {
            config_dir: config_dir.to_path_buf(),
            catalogue,
            profiles,
            repo,
        })
    }

    /// Expand a profile name, or a single bare service id, into its leaf
    /// service ids. Unknown ids pass through unchanged so the caller's
    /// identifier-parsing errors surface at resolve time, not here.
    pub fn expand(&self, name: &str) -> Vec<String> {
        match self.profiles.get(name) {
            Some(profile) => profile.services.clone(),
            None => vec![name.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_returns_profile_members() {
        let mut profiles = HashMap::new();
        profiles.insert(
            "local-dev".to_string(),
            Profile {
                name: "local-dev".into(),
                services: vec!["FOO".into(), "BAR".into()],
            },
        );
        let cfg = Config {
            config_dir: PathBuf::new(),
            catalogue: HashMap::new(),
            profiles,
            repo: RepoConfig::default(),
        };
        assert_eq!(cfg.expand("local-dev"), vec!["FOO", "BAR"]);
    }

    #[test]
    fn expand_passes_through_bare_service_id() {
        let cfg = Config {
            config_dir: PathBuf::new(),
            catalogue: HashMap::new(),
            profiles: HashMap::new(),
            repo: RepoConfig::default(),
        };
        assert_eq!(cfg.expand("FOO"), vec!["FOO"]);
    }
}
