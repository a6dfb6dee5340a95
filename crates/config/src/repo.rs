// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repository endpoint configuration, with per-field fallback to defaults.

use std::path::Path;

use serde::Deserialize;

/// Default release repository used when `config.json` is absent, unparsable,
/// or omits the `RELEASE` mapping.
pub const DEFAULT_RELEASE_REPO_URL: &str = "https://artifact-repo.internal.example/release";

/// Default ping endpoint used when `config.json` is absent, unparsable, or
/// specifies an empty ping path.
pub const DEFAULT_PING_URL: &str = "https://artifact-repo.internal.example/ping/ping";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoConfig {
    pub release_repo_url: String,
    pub ping_url: String,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            release_repo_url: DEFAULT_RELEASE_REPO_URL.to_string(),
            ping_url: DEFAULT_PING_URL.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawRepoConfig {
    #[serde(default)]
    repo_mappings: std::collections::HashMap<String, String>,
    #[serde(default)]
    ping_url: String,
}

/// Load repo config from `path`. Any failure to read or parse the file
/// yields full defaults rather than an error — the repo config is optional.
/// Individual empty fields in an otherwise-valid document fall back
/// independently.
pub fn load_repo_config(path: Option<&Path>) -> RepoConfig {
    let raw = path
        .and_then(|p| std::fs::read_to_string(p).ok())
        .and_then(|contents| serde_json::from_str::<RawRepoConfig>(&contents).ok())
        .unwrap_or_default();

    let release_repo_url = raw
        .repo_mappings
        .get("RELEASE")
        .filter(|v| !v.is_empty())
        .cloned()
        .unwrap_or_else(|| DEFAULT_RELEASE_REPO_URL.to_string());

    let ping_url = if raw.ping_url.is_empty() {
        DEFAULT_PING_URL.to_string()
    } else {
        raw.ping_url
    };

    RepoConfig {
        release_repo_url,
        ping_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = load_repo_config(None);
        assert_eq!(cfg, RepoConfig::default());
    }

    #[test]
    fn unparsable_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("config.json");
        std::fs::write(&file, "not json").unwrap();
        assert_eq!(load_repo_config(Some(&file)), RepoConfig::default());
    }

    #[test]
    fn partial_document_falls_back_per_field() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("config.json");
        std::fs::write(
            &file,
            r#"{"repo_mappings": {"RELEASE": "https://custom/release"}, "ping_url": ""}"#,
        )
        .unwrap();

        let cfg = load_repo_config(Some(&file));
        assert_eq!(cfg.release_repo_url, "https://custom/release");
        assert_eq!(cfg.ping_url, DEFAULT_PING_URL);
    }
}
