// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `restart` verb and the supplemented `restart-outdated` verb (§C),
//! grounded on `servicemanager/restartoutdated.go`: a thin composition of
//! the status inspector, resolver, stopper, and start engine — no new
//! subsystem.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use sm_config::Config;
use sm_core::{compare_versions, SystemClock};
use sm_engine::{Health, StartEngine, StatusInspector, Stopper, Task};
use sm_installer::MetadataFetcher;
use sm_storage::DefaultLedger;

pub fn restart_one(config: &Config, install_root: &Path, service_id: &str) -> anyhow::Result<()> {
    let platform = sm_platform::detect()?;
    let clock = SystemClock;
    let ledger = DefaultLedger;
    let stopper = Stopper {
        catalogue: &config.catalogue,
        ledger: &ledger,
        install_root,
        platform: platform.as_ref(),
        clock: &clock,
    };
    let record = stopper.restart(service_id)?;
    println!("restarted {service_id} (pid {})", record.pid);
    Ok(())
}

/// For every running release-version service, compare its installed
/// version against the latest metadata version and reinstall-and-restart
/// it if newer.
pub fn restart_outdated(config: &Config, install_root: &Path, offline: bool) -> anyhow::Result<Vec<String>> {
    if offline {
        println!("--offline: skipping restart-outdated (requires metadata lookup)");
        return Ok(Vec::new());
    }

    let platform = sm_platform::detect()?;
    let clock = SystemClock;
    let ledger = DefaultLedger;
    let inspector = StatusInspector {
        catalogue: &config.catalogue,
        ledger: &ledger,
        install_root,
        platform: platform.as_ref(),
        clock: &clock,
    };
    let stopper = Stopper {
        catalogue: &config.catalogue,
        ledger: &ledger,
        install_root,
        platform: platform.as_ref(),
        clock: &clock,
    };
    let fetcher = MetadataFetcher::new(Duration::from_secs(30))?;

    let mut outdated = Vec::new();
    for status in inspector.inspect() {
        if status.unmanaged || status.service_id == "MONGO" || status.health != Health::Pass || status.version.is_empty() {
            continue;
        }
        let Some(service) = config.catalogue.get(&status.service_id) else {
            continue;
        };
        let metadata = match fetcher.fetch(&config.repo.release_repo_url, &service.binary.group_id, &service.binary.artifact) {
            Ok(m) => m,
            Err(_) => continue,
        };
        let is_newer = compare_versions(&status.version, &metadata.latest)
            .map(|ord| ord == std::cmp::Ordering::Less)
            .unwrap_or(false);
        if is_newer {
            outdated.push(status.service_id);
        }
    }

    if outdated.is_empty() {
        println!("all running services are up to date");
        return Ok(Vec::new());
    }

    for id in &outdated {
        stopper.stop(id)?;
    }

    let engine = StartEngine {
        catalogue: config.catalogue.clone(),
        install_root: install_root.to_path_buf(),
        repo_url: config.repo.release_repo_url.clone(),
        offline: false,
        workers: sm_engine::DEFAULT_WORKERS,
        delay_seconds: None,
        ledger: Arc::new(DefaultLedger),
        clock: Arc::new(SystemClock),
    };
    let tasks = outdated
        .iter()
        .map(|id| Task {
            service_id: id.clone(),
            version: None,
            scala_variant: None,
            port: None,
            extra_args: Vec::new(),
            from_source: false,
        })
        .collect();

    let mut restarted = Vec::new();
    for outcome in engine.run(tasks, None) {
        match outcome.result {
            Ok(record) => {
                restarted.push(outcome.service_id.clone());
                println!("restarted {} -> {}", outcome.service_id, record.version);
            }
            Err(err) => eprintln!("{}: {err}", outcome.service_id),
        }
    }
    Ok(restarted)
}
