// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors for the config loader.

use sm_core::error::Classify;
use sm_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{what} not found at {path}")]
    Missing { what: &'static str, path: String },
    #[error("{what} at {path} is invalid: {source}")]
    Invalid {
        what: &'static str,
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl Classify for ConfigError {
    fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::Missing { .. } => ErrorKind::ConfigMissing,
            ConfigError::Invalid { .. } => ErrorKind::ConfigInvalid,
            ConfigError::Io { .. } => ErrorKind::IoError,
        }
    }
}
