// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `stop` / `stop-all` verbs (§4.10).

use std::path::Path;

use sm_config::Config;
use sm_core::SystemClock;
use sm_engine::Stopper;
use sm_storage::DefaultLedger;

pub fn stop_one(config: &Config, install_root: &Path, service_id: &str) -> anyhow::Result<()> {
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
    stopper.stop(service_id)?;
    println!("stopped {service_id}");
    Ok(())
}

pub fn stop_all(config: &Config, install_root: &Path) -> anyhow::Result<()> {
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
    for (id, result) in stopper.stop_all() {
        match result {
            Ok(()) => println!("stopped {id}"),
            Err(err) => eprintln!("{id}: {err}"),
        }
    }
    Ok(())
}
