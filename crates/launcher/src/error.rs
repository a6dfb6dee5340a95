// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors for process launch.

use sm_core::error::Classify;
use sm_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("executable not found at {0}")]
    ExecutableMissing(String),
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Classify for LaunchError {
    fn kind(&self) -> ErrorKind {
        match self {
            LaunchError::ExecutableMissing(_) => ErrorKind::NotInstalled,
            LaunchError::Spawn { .. } => ErrorKind::SpawnFailed,
            LaunchError::Io(_) => ErrorKind::IoError,
        }
    }
}
