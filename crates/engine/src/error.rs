// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors surfaced by the start engine, status inspector, and stopper.

use sm_core::error::Classify;
use sm_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("service not found: {0}")]
    ServiceNotFound(String),
    #[error(transparent)]
    Install(#[from] sm_installer::InstallError),
    #[error(transparent)]
    Launch(#[from] sm_launcher::LaunchError),
    #[error(transparent)]
    Ledger(#[from] sm_storage::LedgerError),
    #[error("service {0} is not running")]
    NotRunning(String),
    #[error("failed to terminate pid {pid}: {source}")]
    TerminateFailed { pid: u32, source: nix::errno::Errno },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Classify for EngineError {
    fn kind(&self) -> ErrorKind {
        match self {
            EngineError::ServiceNotFound(_) => ErrorKind::InvalidArgument,
            EngineError::Install(e) => e.kind(),
            EngineError::Launch(e) => e.kind(),
            EngineError::Ledger(e) => e.kind(),
            EngineError::NotRunning(_) => ErrorKind::NotRunning,
            EngineError::TerminateFailed { .. } => ErrorKind::IoError,
            EngineError::Io(_) => ErrorKind::IoError,
        }
    }
}
