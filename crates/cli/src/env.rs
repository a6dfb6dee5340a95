// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI crate (§6
//! "Environment"), so tests can inject values instead of scattering
//! `std::env::var` calls through command handlers.

use std::path::PathBuf;

/// `WORKSPACE`: required, must be an absolute path.
pub fn workspace() -> Option<PathBuf> {
    std::env::var_os("WORKSPACE").map(PathBuf::from)
}

/// `SM_WORKERS`: default worker count override.
pub fn workers() -> Option<usize> {
    std::env::var("SM_WORKERS").ok().and_then(|s| s.parse().ok())
}

/// `SM_NOVPN`: presence (any value) disables the VPN check by default.
pub fn novpn() -> bool {
    std::env::var_os("SM_NOVPN").is_some()
}

/// `SM_TIMEOUT`: short-timeout override, in seconds.
pub fn timeout_seconds() -> Option<u64> {
    std::env::var("SM_TIMEOUT").ok().and_then(|s| s.parse().ok())
}

/// `JAVA_HOME`: only consulted by the `diagnostic` verb.
pub fn java_home() -> Option<String> {
    std::env::var("JAVA_HOME").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn novpn_true_when_set_to_empty_string() {
        std::env::set_var("SM_NOVPN", "");
        assert!(novpn());
        std::env::remove_var("SM_NOVPN");
    }

    #[test]
    #[serial]
    fn novpn_false_when_unset() {
        std::env::remove_var("SM_NOVPN");
        assert!(!novpn());
    }

    #[test]
    #[serial]
    fn workers_parses_valid_integer() {
        std::env::set_var("SM_WORKERS", "4");
        assert_eq!(workers(), Some(4));
        std::env::remove_var("SM_WORKERS");
    }
}
