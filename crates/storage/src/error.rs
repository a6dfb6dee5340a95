// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors for the ledger.

use sm_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("no install record found under {0}")]
    NotFound(String),
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize ledger record: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl sm_core::error::Classify for LedgerError {
    fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::NotFound(_) => ErrorKind::NotInstalled,
            LedgerError::Io { .. } => ErrorKind::IoError,
            LedgerError::Serialize(_) => ErrorKind::IoError,
        }
    }
}
