// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named groups of service identifiers.

use serde::{Deserialize, Serialize};

/// A named ordered list of service identifiers. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    pub services: Vec<String>,
}
