// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors for artifact resolution and installation.

use sm_core::error::Classify;
use sm_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("metadata not found for {group}:{artifact}")]
    MetadataNotFound { group: String, artifact: String },
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),
    #[error("version {0} is not available offline")]
    NotAvailableOffline(String),
    #[error("could not parse version: {0}")]
    VersionUnparseable(String),
    #[error("checksum mismatch: expected {expected}, computed {computed}")]
    ChecksumMismatch { expected: String, computed: String },
    #[error("failed to unpack archive: {0}")]
    UnpackFailed(String),
    #[error("install directory path must be absolute: {0}")]
    NotAbsolute(String),
    #[error("invalid repository url {0:?}: {1}")]
    InvalidRepoUrl(String, String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Classify for InstallError {
    fn kind(&self) -> ErrorKind {
        match self {
            InstallError::MetadataNotFound { .. } => ErrorKind::MetadataNotFound,
            InstallError::NetworkUnreachable(_) => ErrorKind::NetworkUnreachable,
            InstallError::NotAvailableOffline(_) => ErrorKind::NotAvailableOffline,
            InstallError::VersionUnparseable(_) => ErrorKind::VersionUnparseable,
            InstallError::ChecksumMismatch { .. } => ErrorKind::ChecksumMismatch,
            InstallError::UnpackFailed(_) => ErrorKind::UnpackFailed,
            InstallError::NotAbsolute(_) => ErrorKind::InvalidArgument,
            InstallError::InvalidRepoUrl(..) => ErrorKind::InvalidArgument,
            InstallError::Io(_) => ErrorKind::IoError,
            InstallError::Http(_) => ErrorKind::NetworkUnreachable,
        }
    }
}
