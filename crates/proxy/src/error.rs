// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors for the reverse proxy.

use sm_core::error::Classify;
use sm_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Ledger(#[from] sm_storage::LedgerError),
}

impl Classify for ProxyError {
    fn kind(&self) -> ErrorKind {
        match self {
            ProxyError::Io(_) => ErrorKind::IoError,
            ProxyError::Ledger(e) => e.kind(),
        }
    }
}
