// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The source-build launch path (§4.6 "Source path"): shallow git clone,
//! `sbt`-style build-and-run, version sentinel `"source"`.

use std::fs::{self, File};
use std::path::Path;
use std::process::{Command, Stdio};

use sm_core::Service;
use sm_storage::{InstallRecord, RunRecord};
use tracing::info;

use crate::error::LaunchError;

/// Sentinel written as `RunRecord::version` (and `InstallRecord::version`)
/// for services started from a source checkout rather than a release
/// artifact. The stopper dispatches on this value (§4.10).
pub const SOURCE_VERSION: &str = "source";

const DEFAULT_BUILD_COMMAND: &str = "sbt";
const DEFAULT_BUILD_ARGS: &[&str] = &["run"];

/// Shallow-clone `service.source.repo_url` into `<install_dir>/src` and
/// invoke the build-and-run command there, with its stdout going to the
/// same log file a release launch would use.
pub fn launch_from_source(
    service: &Service,
    service_id: &str,
    install_dir: &Path,
    port: u16,
    now_unix: i64,
) -> Result<(InstallRecord, RunRecord), LaunchError> {
    if install_dir.exists() {
        fs::remove_dir_all(install_dir)?;
    }
    fs::create_dir_all(install_dir)?;
    let service_root = install_dir.join("src");

    info!(service = service_id, repo = %service.source.repo_url, "cloning source checkout");
    let status = Command::new("git")
        .args(["clone", "--depth", "1", &service.source.repo_url])
        .arg(&service_root)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|source| LaunchError::Spawn {
            command: "git clone".to_string(),
            source,
        })?;
    if !status.success() {
        return Err(LaunchError::ExecutableMissing(service.source.repo_url.clone()));
    }

    let log_dir = service_root.join("logs");
    fs::create_dir_all(&log_dir)?;
    let stdout_log = File::create(log_dir.join("stdout.log"))?;
    let stderr_log = stdout_log.try_clone()?;

    let mut argv = vec![
        format!("-Dservice.manager.serviceName={service_id}"),
        format!("-Dservice.manager.runFrom={SOURCE_VERSION}"),
        format!("-Duser.home={}", install_dir.display()),
    ];
    argv.extend(service.source.extra_args.iter().cloned());
    argv.push(format!("-Dhttp.port={port}"));

    info!(service = service_id, command = DEFAULT_BUILD_COMMAND, "starting build-and-run");
    let mut build_args: Vec<String> = DEFAULT_BUILD_ARGS.iter().map(|s| s.to_string()).collect();
    build_args.extend(argv.iter().cloned());

    let child = Command::new(DEFAULT_BUILD_COMMAND)
        .args(&build_args)
        .current_dir(&service_root)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout_log))
        .stderr(Stdio::from(stderr_log))
        .spawn()
        .map_err(|source| LaunchError::Spawn {
            command: DEFAULT_BUILD_COMMAND.to_string(),
            source,
        })?;

    let install_record = InstallRecord {
        service_id: service_id.to_string(),
        artifact: service.binary.artifact.clone(),
        version: SOURCE_VERSION.to_string(),
        path: service_root.display().to_string(),
        created_at: now_unix,
    };

    let mut full_argv = vec![DEFAULT_BUILD_COMMAND.to_string()];
    full_argv.extend(build_args);

    let run_record = RunRecord {
        service_id: service_id.to_string(),
        artifact: service.binary.artifact.clone(),
        version: SOURCE_VERSION.to_string(),
        path: service_root.display().to_string(),
        started_at: now_unix,
        pid: child.id(),
        port,
        argv: full_argv,
        healthcheck_url: service.healthcheck_url(port),
    };

    Ok((install_record, run_record))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_version_sentinel_is_literal_source() {
        assert_eq!(SOURCE_VERSION, "source");
    }
}
