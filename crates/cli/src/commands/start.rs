// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `start` verb: expand identifiers into tasks, dispatch through the start
//! engine, and render progress unless disabled (§4.7, §4.8).

use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sm_config::Config;
use sm_core::SystemClock;
use sm_engine::{progress_channel, run_renderer, EngineOutcome, Renderer, StartEngine, Task, DEFAULT_WORKERS};
use sm_storage::DefaultLedger;

use crate::identifier;

/// Parsed `--appendArgs` JSON: `{"ID": ["-Dk=v", ...], ...}`.
pub fn parse_append_args(raw: &str) -> Result<HashMap<String, Vec<String>>> {
    serde_json::from_str(raw).context("--appendArgs must be a JSON object of id -> arg array")
}

pub struct StartOptions {
    pub workspace: std::path::PathBuf,
    pub tokens: Vec<String>,
    pub from_source: bool,
    pub offline: bool,
    pub workers: Option<usize>,
    pub delay_seconds: Option<u64>,
    pub port: Option<u16>,
    pub append_args: HashMap<String, Vec<String>>,
    pub noprogress: bool,
    pub terminal_rows: usize,
    pub terminal_cols: usize,
}

/// Run the batch. Returns per-service outcomes so the caller can build the
/// post-batch failure footer (§7 "User-visible behavior").
pub fn start(config: &Config, opts: StartOptions) -> Vec<EngineOutcome> {
    let leaf_ids: Vec<String> = opts
        .tokens
        .iter()
        .flat_map(|token| config.expand(token))
        .collect();
    let identifiers = identifier::parse_all(&leaf_ids);

    let mut tasks: Vec<Task> = Vec::new();
    for (i, id) in identifiers.iter().enumerate() {
        let extra_args = opts.append_args.get(&id.service_id).cloned().unwrap_or_default();
        // `--port` applies only to the first service when starting several.
        let port = if i == 0 { opts.port } else { None };
        tasks.push(Task {
            service_id: id.service_id.clone(),
            version: id.version.clone(),
            scala_variant: id.scala_variant.clone(),
            port,
            extra_args,
            from_source: opts.from_source,
        });
    }

    let workers = opts.workers.unwrap_or(DEFAULT_WORKERS);
    let engine = StartEngine {
        catalogue: config.catalogue.clone(),
        install_root: crate::commands::config::install_root(&opts.workspace),
        repo_url: config.repo.release_repo_url.clone(),
        offline: opts.offline,
        workers,
        delay_seconds: opts.delay_seconds,
        ledger: Arc::new(DefaultLedger),
        clock: Arc::new(SystemClock),
    };

    let watchlist: Vec<String> = tasks.iter().map(|t| t.service_id.clone()).collect();

    if opts.noprogress || watchlist.is_empty() {
        return engine.run(tasks, None);
    }

    let (tx, rx) = progress_channel();
    let renderer: Renderer<io::Stdout> = Renderer::new(io::stdout(), opts.terminal_rows, opts.terminal_cols, watchlist);
    let render_handle = std::thread::spawn(move || run_renderer(rx, Some(renderer)));

    let outcomes = engine.run(tasks, Some(tx));
    let _ = render_handle.join();
    outcomes
}

/// Print `<id>: <message>` for every failed outcome (§7).
pub fn print_failure_footer(outcomes: &[EngineOutcome]) {
    let failures: Vec<&EngineOutcome> = outcomes.iter().filter(|o| o.result.is_err()).collect();
    if failures.is_empty() {
        return;
    }
    println!("{}", crate::color::header("Failures:"));
    for outcome in failures {
        if let Err(err) = &outcome.result {
            println!("  {}: {}", outcome.service_id, err);
        }
    }
}

/// Short-timeout override from `SM_TIMEOUT`, defaulting to the diagnostic
/// probe's default.
pub fn short_timeout() -> Duration {
    crate::env::timeout_seconds()
        .map(Duration::from_secs)
        .unwrap_or(crate::commands::diagnostic::DEFAULT_TIMEOUT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_append_args_rejects_non_object() {
        assert!(parse_append_args("[1,2,3]").is_err());
    }

    #[test]
    fn parse_append_args_parses_id_to_args_map() {
        let map = parse_append_args(r#"{"FOO": ["-Dk=v"]}"#).unwrap();
        assert_eq!(map.get("FOO"), Some(&vec!["-Dk=v".to_string()]));
    }
}
