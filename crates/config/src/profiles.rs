// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loads named profiles (ordered service-id groups).

use std::collections::HashMap;
use std::path::Path;

use sm_core::Profile;

use crate::error::ConfigError;

pub fn load_profiles(path: &Path) -> Result<HashMap<String, Profile>, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::Missing {
            what: "profiles",
            path: path.display().to_string(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut profiles: HashMap<String, Profile> =
        serde_json::from_str(&contents).map_err(|source| ConfigError::Invalid {
            what: "profiles",
            path: path.display().to_string(),
            source,
        })?;
    for (name, profile) in profiles.iter_mut() {
        profile.name = name.clone();
    }
    Ok(profiles)
}
