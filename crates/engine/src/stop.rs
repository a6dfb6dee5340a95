// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stopper (§4.10): terminate by recorded PID, or by argv-match for
//! source-run services, then clear the run record.

use std::collections::HashMap;
use std::path::Path;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use sm_core::{Clock, Service};
use sm_launcher::{self, SOURCE_VERSION};
use sm_platform::Platform;
use sm_storage::{InstallRecord, Ledger, RunRecord};
use tracing::{info, warn};

use crate::error::EngineError;

pub struct Stopper<'a, L: Ledger> {
    pub catalogue: &'a HashMap<String, Service>,
    pub ledger: &'a L,
    pub install_root: &'a Path,
    pub platform: &'a dyn Platform,
    pub clock: &'a dyn Clock,
}

impl<'a, L: Ledger> Stopper<'a, L> {
    fn service_dir(&self, service_id: &str) -> Result<std::path::PathBuf, EngineError> {
        let service = self
            .catalogue
            .get(service_id)
            .ok_or_else(|| EngineError::ServiceNotFound(service_id.to_string()))?;
        Ok(self.install_root.join(&service.binary.destination_subdir))
    }

    /// Terminate every process for `service_id` and clear its run record.
    /// Failure to kill a stale PID is reported but not fatal.
    pub fn stop(&self, service_id: &str) -> Result<(), EngineError> {
        let dir = self.service_dir(service_id)?;
        let record = self
            .ledger
            .load_run(&dir)
            .map_err(|_| EngineError::NotRunning(service_id.to_string()))?;

        let pids = if record.version == SOURCE_VERSION {
            self.platform.pids_matching_service(service_id)
        } else {
            vec![record.pid]
        };

        for pid in pids {
            if let Err(err) = terminate(pid) {
                warn!(service = service_id, pid, error = %err, "failed to terminate pid");
            } else {
                info!(service = service_id, pid, "terminated");
            }
        }

        self.ledger.clear_run(&dir)?;
        Ok(())
    }

    /// Stop every currently-running service.
    pub fn stop_all(&self) -> Vec<(String, Result<(), EngineError>)> {
        self.ledger
            .find_all_run(self.install_root)
            .into_iter()
            .map(|(_, record)| {
                let id = record.service_id.clone();
                (id.clone(), self.stop(&id))
            })
            .collect()
    }

    /// `load RunRecord → verify matching InstallRecord → stop → launch with
    /// recorded argv and port → save new RunRecord`.
    pub fn restart(&self, service_id: &str) -> Result<RunRecord, EngineError> {
        let dir = self.service_dir(service_id)?;
        let service = self
            .catalogue
            .get(service_id)
            .ok_or_else(|| EngineError::ServiceNotFound(service_id.to_string()))?;

        let old_run = self
            .ledger
            .load_run(&dir)
            .map_err(|_| EngineError::NotRunning(service_id.to_string()))?;
        let install: InstallRecord = self.ledger.load_install(&dir)?;
        if install.version != old_run.version {
            return Err(EngineError::NotRunning(service_id.to_string()));
        }

        self.stop(service_id)?;

        let now = self.clock.now_unix();
        let extra_args = extract_extra_args(&old_run.argv, service.binary.argv_template.len());

        let new_run = sm_launcher::launch(
            service,
            service_id,
            &old_run.version,
            Path::new(&install.path),
            old_run.port,
            &extra_args,
            now,
        )?;
        self.ledger.save_run(&dir, &new_run)?;
        Ok(new_run)
    }
}

/// Recover the caller-supplied extra args from a recorded full argv.
///
/// `full_argv` is `[executable_path, ...compose_argv(...)]`, and
/// `compose_argv` itself leads with `argv_template.skip(1)` before the
/// `-Dservice.manager.*`/`-Duser.home=`/`-Dhttp.port=` triplet and the
/// caller's extra args. Strip `argv[0]` and that leading template slice by
/// position, then drop the triplet/port entries by prefix, so what remains
/// is exactly the extra args `compose_argv` will re-derive the rest around
/// on relaunch.
fn extract_extra_args(full_argv: &[String], template_len: usize) -> Vec<String> {
    let skip = 1 + template_len.saturating_sub(1);
    full_argv
        .iter()
        .skip(skip)
        .filter(|a| {
            !a.starts_with("-Dservice.manager.") && !a.starts_with("-Duser.home=") && !a.starts_with("-Dhttp.port=")
        })
        .cloned()
        .collect()
}

fn terminate(pid: u32) -> Result<(), EngineError> {
    signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM).map_err(|source| EngineError::TerminateFailed {
        pid,
        source,
    })
}
