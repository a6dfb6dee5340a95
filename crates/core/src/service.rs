// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Catalogue entries.

use serde::{Deserialize, Serialize};

/// Whether a service is started from a release artifact or from source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Release,
    Source,
}

/// The binary descriptor: how to install and where to put a released
/// artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinaryDescriptor {
    pub artifact: String,
    pub group_id: String,
    pub destination_subdir: String,
    /// The configured argv, command name included at index 0.
    pub argv_template: Vec<String>,
}

/// The source descriptor: how to build and run from a git checkout.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SourceDescriptor {
    pub repo_url: String,
    #[serde(default)]
    pub extra_args: Vec<String>,
}

/// A catalogue entry. Immutable once loaded; `id` is stamped by the config
/// loader from the catalogue's map key, not read from the entry body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub default_port: u16,
    pub binary: BinaryDescriptor,
    #[serde(default)]
    pub source: SourceDescriptor,
    #[serde(default)]
    pub frontend: bool,
    #[serde(default)]
    pub proxy_paths: Vec<String>,
    /// URL template containing `${port}`; `None` means use the default
    /// `http://localhost:<port>/ping/ping`.
    #[serde(default)]
    pub healthcheck_template: Option<String>,
}

impl Service {
    /// Resolve the healthcheck URL for a running instance on `port`.
    pub fn healthcheck_url(&self, port: u16) -> String {
        match &self.healthcheck_template {
            Some(tpl) => tpl.replace("${port}", &port.to_string()),
            None => format!("http://localhost:{port}/ping/ping"),
        }
    }
}
