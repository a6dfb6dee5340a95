// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An explicit exit code carried alongside an [`anyhow::Error`], so `main`
//! can choose 0/1/13 (§6) without matching on every command's error type.

use std::fmt;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// `--verify` reporting a missing service (§6: exit code 13).
    pub fn verify_missing() -> anyhow::Error {
        anyhow::Error::new(Self::new(13, "one or more services failed verification"))
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}
