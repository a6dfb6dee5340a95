// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `diagnostic` verb and the pre-`start` VPN reachability probe (§C),
//! grounded on `servicemanager/diagnostics.go`.

use std::path::Path;
use std::time::Duration;

use sm_config::RepoConfig;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// GET the repo's configured ping path with a short timeout. Network
/// timeouts here are reported, never retried (§7).
pub fn probe_repo(ping_url: &str, timeout: Duration) -> bool {
    let client = match reqwest::blocking::Client::builder().timeout(timeout).build() {
        Ok(c) => c,
        Err(_) => return false,
    };
    client.get(ping_url).send().map(|r| r.status().is_success()).unwrap_or(false)
}

/// Run before dispatching any `start` tasks unless `--no-vpn-check` /
/// `SM_NOVPN` is set. Never fatal: a warning only.
pub fn vpn_check(repo: &RepoConfig, timeout: Duration) -> bool {
    let ok = probe_repo(&repo.ping_url, timeout);
    if !ok {
        eprintln!(
            "warning: VPN/repo reachability check failed against {} (continuing anyway)",
            repo.ping_url
        );
    }
    ok
}

/// Print `JAVA_HOME`, workspace path, and the VPN/repo reachability
/// result. Returns whether the probe succeeded (affects exit code, never
/// aborts a `start`).
pub fn diagnostic(workspace: &Path, repo: &RepoConfig, timeout: Duration) -> bool {
    println!("workspace:  {}", workspace.display());
    println!(
        "JAVA_HOME:  {}",
        crate::env::java_home().unwrap_or_else(|| "(not set)".to_string())
    );
    println!("ping url:   {}", repo.ping_url);
    let ok = probe_repo(&repo.ping_url, timeout);
    println!("repo reachable: {}", if ok { "yes" } else { "no" });
    ok
}
