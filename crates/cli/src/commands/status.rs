// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `status`/`-s`, `verify`, and `prune` verbs (§4.9).

use std::io;
use std::path::Path;

use sm_config::Config;
use sm_core::SystemClock;
use sm_engine::{Health, StatusInspector};
use sm_storage::DefaultLedger;

use crate::table::{Column, Table};

fn health_label(health: Health) -> &'static str {
    match health {
        Health::Pass => "PASS",
        Health::Fail => "FAIL",
        Health::Boot => "BOOT",
    }
}

/// `status`/`-s`: render every managed and unmanaged service's state.
pub fn status(config: &Config, install_root: &Path, plain: bool) -> anyhow::Result<()> {
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

    let statuses = inspector.inspect();
    let mut table = if plain {
        Table::new(vec![
            Column::left("ID"),
            Column::left("VERSION"),
            Column::right("PID"),
            Column::right("PORT"),
            Column::left("STATUS"),
        ])
    } else {
        Table::new(vec![
            Column::left("ID"),
            Column::left("VERSION"),
            Column::right("PID"),
            Column::right("PORT"),
            Column::status("STATUS"),
        ])
    };

    for s in statuses {
        let id = if s.unmanaged { format!("{} (unmanaged)", s.service_id) } else { s.service_id.clone() };
        table.row(vec![
            id,
            if s.version.is_empty() { "-".to_string() } else { s.version },
            s.pid.to_string(),
            s.port.to_string(),
            health_label(s.health).to_string(),
        ]);
    }
    table.render(&mut io::stdout());
    Ok(())
}

/// `verify`: exit non-zero (code 13, handled by the caller) when any
/// requested service is missing or unhealthy.
pub fn verify(config: &Config, install_root: &Path, requested: &[String]) -> anyhow::Result<bool> {
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
    Ok(inspector.verify(requested))
}

/// `prune`: remove run records for services no longer backed by a live
/// process, printing what was acted upon (§7).
pub fn prune(config: &Config, install_root: &Path) -> anyhow::Result<()> {
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
    let pruned = inspector.prune();
    if pruned.is_empty() {
        println!("nothing to prune");
    } else {
        for id in pruned {
            println!("pruned {id}");
        }
    }
    Ok(())
}
