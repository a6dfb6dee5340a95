// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `logs <id>` and `debug <id>` verbs (§C), grounded on
//! `servicemanager/logfiles.go` and `servicemanager/debug.go`.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use sm_config::Config;
use sm_engine::service_root;
use sm_storage::{DefaultLedger, Ledger};

const DEFAULT_TAIL_LINES: usize = 200;

fn log_path(config: &Config, install_root: &Path, service_id: &str) -> Result<std::path::PathBuf> {
    let service = config
        .catalogue
        .get(service_id)
        .with_context(|| format!("unknown service '{service_id}'"))?;
    Ok(service_root(install_root, service).join("logs").join("stdout.log"))
}

fn tail_lines(path: &Path, n: usize) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let lines: Vec<&str> = contents.lines().collect();
    let start = lines.len().saturating_sub(n);
    Ok(lines[start..].iter().map(|s| s.to_string()).collect())
}

/// `logs <id>`: print the tail of the service's stdout log.
pub fn logs(config: &Config, install_root: &Path, service_id: &str) -> Result<()> {
    let path = log_path(config, install_root, service_id)?;
    if !path.exists() {
        bail!("no log file for '{service_id}' at {}", path.display());
    }
    for line in tail_lines(&path, DEFAULT_TAIL_LINES)? {
        println!("{line}");
    }
    Ok(())
}

/// `debug <id>`: print the install/run records plus the log tail.
pub fn debug(config: &Config, install_root: &Path, service_id: &str) -> Result<()> {
    let service = config
        .catalogue
        .get(service_id)
        .with_context(|| format!("unknown service '{service_id}'"))?;
    let dir = service_root(install_root, service);
    let ledger = DefaultLedger;

    match ledger.load_install(&dir) {
        Ok(install) => println!(
            "install: artifact={} version={} path={} created_at={}",
            install.artifact, install.version, install.path, install.created_at
        ),
        Err(_) => println!("install: (not installed)"),
    }

    match ledger.load_run(&dir) {
        Ok(run) => println!(
            "run: pid={} port={} started_at={} argv={:?}",
            run.pid, run.port, run.started_at, run.argv
        ),
        Err(_) => println!("run: (not running)"),
    }

    let log = dir.join("logs").join("stdout.log");
    if log.exists() {
        println!("--- last {DEFAULT_TAIL_LINES} log lines ---");
        for line in tail_lines(&log, DEFAULT_TAIL_LINES)? {
            println!("{line}");
        }
    } else {
        println!("log: (none)");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_lines_returns_at_most_n() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stdout.log");
        fs::write(&path, "a\nb\nc\nd\n").unwrap();
        let tail = tail_lines(&path, 2).unwrap();
        assert_eq!(tail, vec!["c".to_string(), "d".to_string()]);
    }

    #[test]
    fn tail_lines_handles_fewer_lines_than_n() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stdout.log");
        fs::write(&path, "only\n").unwrap();
        assert_eq!(tail_lines(&path, 200).unwrap(), vec!["only".to_string()]);
    }
}
