// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parsed Maven `maven-metadata.xml` index for an artifact.

use serde::{Deserialize, Serialize};

/// Invariant: every entry in `versions` is installable from the repository
/// this metadata was fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub group: String,
    pub artifact: String,
    pub latest: String,
    pub release: String,
    pub versions: Vec<String>,
}

impl Metadata {
    pub fn contains_version(&self, version: &str) -> bool {
        self.versions.iter().any(|v| v == version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_version_checks_list() {
        let m = Metadata {
            group: "uk.gov.hmrc".into(),
            artifact: "playtest".into(),
            latest: "2.33.0".into(),
            release: "2.33.0".into(),
            versions: vec!["2.32.0".into(), "2.33.0".into()],
        };
        assert!(m.contains_version("2.33.0"));
        assert!(!m.contains_version("9.9.9"));
    }
}
