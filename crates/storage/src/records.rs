// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The three ledger record types (§3 of the data model).

use serde::{Deserialize, Serialize};

pub const INSTALL_FILE: &str = ".install";
pub const STATE_FILE: &str = ".state";
pub const PROXY_FILE: &str = ".proxy_state";

/// Written atomically after a successful unpack. Invariant: if present, the
/// filesystem path exists and contains the unpacked root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallRecord {
    pub service_id: String,
    pub artifact: String,
    pub version: String,
    pub path: String,
    pub created_at: i64,
}

/// Written immediately after spawn succeeds. Cleared on stop, or on status
/// inspection if it predates the last boot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub service_id: String,
    pub artifact: String,
    pub version: String,
    pub path: String,
    pub started_at: i64,
    pub pid: u32,
    pub port: u16,
    pub argv: Vec<String>,
    pub healthcheck_url: String,
}

impl RunRecord {
    /// Started from a git checkout rather than a release artifact.
    pub fn is_source(&self) -> bool {
        self.version == "source"
    }
}

/// Persisted at the workspace root while the reverse proxy is running.
/// Cleared by the proxy's own shutdown signal handler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyRecord {
    pub started_at: i64,
    pub pid: u32,
    pub routes: std::collections::BTreeMap<String, String>,
}
