// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spawns a release-mode service and produces its [`RunRecord`].

use std::fs::{self, File};
use std::path::Path;
use std::process::{Command, Stdio};

use sm_core::Service;
use sm_storage::RunRecord;
use tracing::info;

use crate::argv::{compose_argv, executable_path};
use crate::error::LaunchError;

/// Marker file a clean stop removes; a stop by raw signal does not, so a
/// stale one is possible and harmless to clear before relaunching.
const RUNNING_PID_FILE: &str = "RUNNING_PID";

/// Spawn `service` (already installed at `service_root`) on `port`, detached
/// from the parent. The parent does not wait for it.
pub fn launch(
    service: &Service,
    service_id: &str,
    version: &str,
    service_root: &Path,
    port: u16,
    extra_args: &[String],
    now_unix: i64,
) -> Result<RunRecord, LaunchError> {
    let stale_pid_file = service_root.join(RUNNING_PID_FILE);
    if stale_pid_file.exists() {
        fs::remove_file(&stale_pid_file)?;
    }

    let log_dir = service_root.join("logs");
    fs::create_dir_all(&log_dir)?;
    let stdout_log = File::create(log_dir.join("stdout.log"))?;
    let stderr_log = stdout_log.try_clone()?;

    let executable = executable_path(service, service_root);
    let argv = compose_argv(service, service_id, version, service_root, port, extra_args);

    info!(service = service_id, executable = %executable.display(), port, "spawning service");

    let child = Command::new(&executable)
        .args(&argv)
        .current_dir(service_root)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout_log))
        .stderr(Stdio::from(stderr_log))
        .spawn()
        .map_err(|source| LaunchError::Spawn {
            command: executable.display().to_string(),
            source,
        })?;

    let mut full_argv = vec![executable.display().to_string()];
    full_argv.extend(argv);

    Ok(RunRecord {
        service_id: service_id.to_string(),
        artifact: service.binary.artifact.clone(),
        version: version.to_string(),
        path: service_root.display().to_string(),
        started_at: now_unix,
        pid: child.id(),
        port,
        argv: full_argv,
        healthcheck_url: service.healthcheck_url(port),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sm_core::service::{BinaryDescriptor, SourceDescriptor};
    use std::os::unix::fs::PermissionsExt;

    fn service() -> Service {
        Service {
            id: "FOO".into(),
            name: "Foo".into(),
            default_port: 9999,
            binary: BinaryDescriptor {
                artifact: "playtest".into(),
                group_id: "uk.gov.hmrc".into(),
                destination_subdir: "foo".into(),
                argv_template: vec!["bin/playtest".into()],
            },
            source: SourceDescriptor::default(),
            frontend: false,
            proxy_paths: vec![],
            healthcheck_template: None,
        }
    }

    #[test]
    fn launch_writes_run_record_and_stdout_log() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("playtest-2.33.0");
        fs::create_dir_all(root.join("bin")).unwrap();
        let script = root.join("bin").join("playtest");
        fs::write(&script, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let svc = service();
        let record = launch(&svc, "FOO", "2.33.0", &root, 9999, &[], 1000).unwrap();

        assert_eq!(record.service_id, "FOO");
        assert_eq!(record.port, 9999);
        assert!(record.pid > 0);
        assert!(root.join("logs").join("stdout.log").exists());
    }

    #[test]
    fn launch_removes_stale_running_pid_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("playtest-2.33.0");
        fs::create_dir_all(root.join("bin")).unwrap();
        let script = root.join("bin").join("playtest");
        fs::write(&script, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        fs::write(root.join(RUNNING_PID_FILE), "12345").unwrap();

        let svc = service();
        launch(&svc, "FOO", "2.33.0", &root, 9999, &[], 1000).unwrap();

        assert!(!root.join(RUNNING_PID_FILE).exists());
    }
}
