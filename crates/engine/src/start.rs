// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker-pool start engine (§4.8): resolve → install → launch per task,
//! reporting progress and recording outcomes without aborting siblings.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use sm_core::{Clock, Service};
use sm_installer::{self, MetadataFetcher, Requested};
use sm_storage::{Ledger, RunRecord};
use tracing::warn;

use crate::error::EngineError;
use crate::progress::ProgressEvent;

/// A single unit of work: install and start one service at a requested
/// version/variant.
#[derive(Debug, Clone)]
pub struct Task {
    pub service_id: String,
    pub version: Option<String>,
    pub scala_variant: Option<String>,
    pub port: Option<u16>,
    pub extra_args: Vec<String>,
    pub from_source: bool,
}

pub struct EngineOutcome {
    pub service_id: String,
    pub result: Result<RunRecord, EngineError>,
}

/// Default worker count, overridden by `--workers` or `SM_WORKERS`.
pub const DEFAULT_WORKERS: usize = 2;

/// Every 500ms while awaiting, up to `2 * delay_seconds` ticks.
const AWAIT_TICK: Duration = Duration::from_millis(500);

pub struct StartEngine<L: Ledger> {
    pub catalogue: HashMap<String, Service>,
    pub install_root: PathBuf,
    pub repo_url: String,
    pub offline: bool,
    pub workers: usize,
    pub delay_seconds: Option<u64>,
    pub ledger: Arc<L>,
    pub clock: Arc<dyn Clock>,
}

impl<L: Ledger + Send + Sync + 'static> StartEngine<L> {
    /// `workers` is forced to 1 when exactly one task is requested, matching
    /// the single-worker shortcut (§4.8).
    fn effective_workers(&self, task_count: usize) -> usize {
        if task_count == 1 {
            1
        } else {
            self.workers.max(1)
        }
    }

    /// Run every task to completion. Blocks until the wait-group is empty.
    /// Never aborts on a single task's failure.
    pub fn run(&self, tasks: Vec<Task>, progress_tx: Option<SyncSender<ProgressEvent>>) -> Vec<EngineOutcome> {
        let worker_count = self.effective_workers(tasks.len());
        let (task_tx, task_rx): (Sender<Task>, Receiver<Task>) = channel();
        for task in tasks {
            let _ = task_tx.send(task);
        }
        drop(task_tx);

        let task_rx = Arc::new(Mutex::new(task_rx));
        let outcomes = Arc::new(Mutex::new(Vec::new()));

        thread::scope(|scope| {
            for _ in 0..worker_count {
                let task_rx = Arc::clone(&task_rx);
                let outcomes = Arc::clone(&outcomes);
                let progress_tx = progress_tx.clone();
                scope.spawn(move || loop {
                    let task = {
                        let rx = task_rx.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
                        rx.recv()
                    };
                    let Ok(task) = task else { break };
                    let service_id = task.service_id.clone();
                    let result = self.run_task(&task, progress_tx.as_ref());
                    if result.is_err() {
                        if let Some(tx) = &progress_tx {
                            let _ = tx.send(ProgressEvent::failed(&service_id));
                        }
                    }
                    outcomes
                        .lock()
                        .unwrap_or_else(std::sync::PoisonError::into_inner)
                        .push(EngineOutcome { service_id, result });
                });
            }
        });

        Arc::try_unwrap(outcomes)
            .map(|m| m.into_inner().unwrap_or_else(std::sync::PoisonError::into_inner))
            .unwrap_or_default()
    }

    fn run_task(&self, task: &Task, progress_tx: Option<&SyncSender<ProgressEvent>>) -> Result<RunRecord, EngineError> {
        let service = self
            .catalogue
            .get(&task.service_id)
            .ok_or_else(|| EngineError::ServiceNotFound(task.service_id.clone()))?;

        let service_dir = self.install_root.join(&service.binary.destination_subdir);
        let now = self.clock.now_unix();

        if let Some(tx) = progress_tx {
            let _ = tx.send(ProgressEvent::new(&task.service_id, 0, "Resolving"));
        }

        let (install_record, run_record) = if task.from_source {
            let port = task.port.unwrap_or(service.default_port);
            let (install_record, run_record) =
                sm_launcher::launch_from_source(service, &task.service_id, &service_dir, port, now)?;
            (install_record, run_record)
        } else {
            let requested = Requested {
                version: task.version.clone(),
                scala_variant: task.scala_variant.clone(),
            };
            let fetcher = MetadataFetcher::new(Duration::from_secs(30))?;
            let coords = sm_installer::resolve(service, &requested, self.offline, &fetcher, &self.repo_url)?;

            if let Some(tx) = progress_tx {
                let _ = tx.send(ProgressEvent::new(&task.service_id, 5, "Installing"));
            }

            let download_client = sm_installer::download_client()?;
            let tx_clone = progress_tx.cloned();
            let service_id = task.service_id.clone();
            let install_record = sm_installer::install(
                &task.service_id,
                &service_dir,
                &coords,
                &self.repo_url,
                &download_client,
                now,
                move |read, total| {
                    if let Some(tx) = &tx_clone {
                        let percent = total
                            .filter(|t| *t > 0)
                            .map(|t| ((read * 100) / t).min(100) as u8)
                            .unwrap_or(50);
                        let _ = tx.send(ProgressEvent::new(&service_id, percent, "Installing"));
                    }
                },
            )?;

            if let Some(tx) = progress_tx {
                let _ = tx.send(ProgressEvent::new(&task.service_id, 95, "Starting"));
            }

            let port = task.port.unwrap_or(service.default_port);
            let service_root = PathBuf::from(&install_record.path);
            let run_record = sm_launcher::launch(
                service,
                &task.service_id,
                &coords.version,
                &service_root,
                port,
                &task.extra_args,
                now,
            )?;
            (install_record, run_record)
        };

        self.ledger.save_install(&service_dir, &install_record)?;
        self.ledger.save_run(&service_dir, &run_record)?;

        if let Some(delay) = self.delay_seconds {
            self.await_healthcheck(&run_record, delay);
        }

        if let Some(tx) = progress_tx {
            let _ = tx.send(ProgressEvent::done(&task.service_id));
        }

        Ok(run_record)
    }

    /// Poll the new service's healthcheck every 500ms until it responds or
    /// `2 * delay_seconds` ticks elapse.
    fn await_healthcheck(&self, run_record: &RunRecord, delay_seconds: u64) {
        let max_ticks = delay_seconds.saturating_mul(2);
        let client = match reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(400))
            .build()
        {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "failed building healthcheck client");
                return;
            }
        };
        for _ in 0..max_ticks {
            if let Ok(resp) = client.get(&run_record.healthcheck_url).send() {
                if resp.status().is_success() {
                    return;
                }
            }
            thread::sleep(AWAIT_TICK);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sm_core::SystemClock;
    use sm_storage::DefaultLedger;

    fn engine(tempdir: &std::path::Path) -> StartEngine<DefaultLedger> {
        StartEngine {
            catalogue: HashMap::new(),
            install_root: tempdir.to_path_buf(),
            repo_url: "https://unreachable.invalid".into(),
            offline: false,
            workers: 2,
            delay_seconds: None,
            ledger: Arc::new(DefaultLedger),
            clock: Arc::new(SystemClock),
        }
    }

    #[test]
    fn single_task_forces_one_worker() {
        let dir = tempfile::tempdir().unwrap();
        let e = engine(dir.path());
        assert_eq!(e.effective_workers(1), 1);
        assert_eq!(e.effective_workers(3), 2);
    }

    #[test]
    fn unknown_service_reports_failure_without_aborting_batch() {
        let dir = tempfile::tempdir().unwrap();
        let e = engine(dir.path());
        let tasks = vec![
            Task {
                service_id: "MISSING_A".into(),
                version: None,
                scala_variant: None,
                port: None,
                extra_args: vec![],
                from_source: false,
            },
            Task {
                service_id: "MISSING_B".into(),
                version: None,
                scala_variant: None,
                port: None,
                extra_args: vec![],
                from_source: false,
            },
        ];
        let outcomes = e.run(tasks, None);
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.result.is_err()));
    }
}
