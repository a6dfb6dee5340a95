// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `reverse-proxy` verb (§4.11). The rest of the CLI is synchronous; this
//! is the one seam that needs a Tokio runtime, so it builds one just for
//! this call rather than wrapping the whole binary in `#[tokio::main]`.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use sm_config::Config;
use sm_core::{Clock, SystemClock};
use sm_proxy::{build_routes, DEFAULT_LISTEN_PORT};
use sm_storage::DefaultLedger;

pub fn reverse_proxy(config: &Config, workspace: &Path, requested: &[String], port: Option<u16>) -> Result<()> {
    let services: Vec<_> = if requested.is_empty() {
        config.catalogue.values().filter(|s| s.frontend).cloned().collect()
    } else {
        requested
            .iter()
            .filter_map(|id| config.catalogue.get(id).cloned())
            .collect()
    };

    let routes = build_routes(services.iter());
    let listen_port = port.unwrap_or(DEFAULT_LISTEN_PORT);
    println!("reverse proxy listening on :{listen_port} ({} route(s))", routes.len());

    let clock = SystemClock;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(sm_proxy::serve(
        routes,
        listen_port,
        workspace,
        Arc::new(DefaultLedger),
        std::process::id(),
        clock.now_unix(),
    ))?;
    Ok(())
}
