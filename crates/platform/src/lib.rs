// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sm-platform: OS-specific lookups behind one small trait.
//!
//! Represented as a trait with one real (Unix) implementation rather than a
//! struct of function pointers, so call sites take `&dyn Platform` and tests
//! substitute a fake. Windows has no implementation: [`detect`] returns an
//! error which the CLI turns into a hard exit at startup, matching the
//! upstream tool's behavior on unsupported platforms.

mod error;
mod probe;

pub use error::PlatformError;
pub use probe::{service_name_token, Platform, UnixPlatform};

/// Select the platform backend for the current OS. Only Unix-like targets
/// (Linux, macOS) are supported.
pub fn detect() -> Result<Box<dyn Platform>, PlatformError> {
    if cfg!(unix) {
        Ok(Box::new(UnixPlatform))
    } else {
        Err(PlatformError::Unsupported(
            std::env::consts::OS.to_string(),
        ))
    }
}
