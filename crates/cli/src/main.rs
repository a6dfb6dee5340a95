// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `sm`: single multiplexed binary, mutually-exclusive verbs selected by
//! boolean flags (§6).

mod color;
mod commands;
mod env;
mod exit_error;
mod identifier;
mod legacy_args;
mod table;

use std::path::PathBuf;

use clap::Parser;
use exit_error::ExitError;

/// `sm`: developer-workstation JVM microservice orchestrator.
#[derive(Parser, Debug)]
#[command(name = "sm", styles = color::styles())]
struct Cli {
    /// Resolve, install, and launch the given service(s)/profile(s).
    #[arg(long)]
    start: bool,
    /// Stop the given service(s).
    #[arg(long)]
    stop: bool,
    /// Stop every currently running service.
    #[arg(long = "stop-all")]
    stop_all: bool,
    /// Stop then relaunch the given service(s) at their recorded version.
    #[arg(long)]
    restart: bool,
    /// Restart every running service whose installed version is outdated.
    #[arg(long = "restart-outdated")]
    restart_outdated: bool,
    /// Show PASS/BOOT/FAIL status for every managed and unmanaged service.
    #[arg(short = 's', long)]
    status: bool,
    /// Print the catalogue's configured default ports.
    #[arg(long)]
    ports: bool,
    /// Report duplicate static port assignments across the catalogue.
    #[arg(long)]
    checkports: bool,
    /// Regex search over catalogue ids/artifacts.
    #[arg(long, value_name = "RE")]
    search: Option<String>,
    /// Enumerate the full catalogue.
    #[arg(long)]
    list: bool,
    /// Print the tail of a service's stdout log.
    #[arg(long, value_name = "ID")]
    logs: Option<String>,
    /// Print a service's install/run records plus its last log lines.
    #[arg(long, value_name = "ID")]
    debug: Option<String>,
    /// Print workspace, JAVA_HOME, and repo reachability.
    #[arg(long)]
    diagnostic: bool,
    /// Serve the path-prefix reverse proxy.
    #[arg(long = "reverse-proxy")]
    reverse_proxy: bool,
    /// Standalone: list installed (not necessarily running) services. As a
    /// modifier on `--start`: skip network resolution.
    #[arg(long)]
    offline: bool,
    /// Remove run records no longer backed by a live process.
    #[arg(long)]
    prune: bool,
    /// Exit 13 if any requested service fails verification.
    #[arg(long)]
    verify: bool,
    /// Re-parse the config directory in place.
    #[arg(long = "update-config")]
    update_config: bool,
    /// Print the orchestrator's own build version.
    #[arg(long = "version")]
    version_verb: bool,

    /// Explicit version override, e.g. `-r 1.4.33`.
    #[arg(short = 'r', value_name = "VERSION")]
    r: Option<String>,
    /// With `--start`: wipe and recreate the install directory (already the
    /// installer's unconditional behavior; accepted for compatibility).
    #[arg(long)]
    clean: bool,
    /// Launch from a source checkout instead of a release artifact.
    #[arg(long)]
    src: bool,
    /// Worker pool size, overriding `SM_WORKERS`/the default of 2.
    #[arg(long)]
    workers: Option<usize>,
    /// Alias for `--delay-seconds` (post-start healthcheck await budget).
    #[arg(long)]
    wait: Option<u64>,
    /// Seconds to poll the new service's healthcheck before returning.
    #[arg(long = "delay-seconds")]
    delay_seconds: Option<u64>,
    /// Override the first started service's port.
    #[arg(long)]
    port: Option<u16>,
    /// Disable the in-place progress renderer.
    #[arg(long)]
    noprogress: bool,
    /// Force plain (non-colored, non-redrawing) output.
    #[arg(long = "format-plain")]
    format_plain: bool,
    /// Skip the pre-start VPN/repo reachability probe.
    #[arg(long = "no-vpn-check")]
    no_vpn_check: bool,
    /// Override the config directory (default `$WORKSPACE/service-manager-config`).
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON object of service id to extra JVM args: `{"ID":["-Dk=v"]}`.
    #[arg(long = "appendArgs", value_name = "JSON")]
    append_args: Option<String>,
    /// Verbose logging (`RUST_LOG=debug` shorthand).
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Service/profile identifiers, deduplicated preserving order.
    #[arg(value_name = "ID")]
    tokens: Vec<String>,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.version_verb {
        println!("sm {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let workspace = commands::config::workspace()?;
    let config_dir = commands::config::config_dir(&workspace, cli.config.as_deref());
    let config = commands::config::load(&config_dir)?;
    let install_root = commands::config::install_root(&workspace);

    let raw_tokens: Vec<String> = {
        let mut seen = std::collections::HashSet::new();
        cli.tokens.iter().filter(|t| seen.insert((*t).clone())).cloned().collect()
    };

    if cli.update_config {
        return commands::config::update_config(&config_dir);
    }

    if cli.diagnostic {
        let timeout = commands::start::short_timeout();
        let ok = commands::diagnostic::diagnostic(&workspace, &config.repo, timeout);
        if !ok {
            anyhow::bail!(ExitError::new(1, "diagnostic probe failed"));
        }
        return Ok(());
    }

    if cli.checkports {
        commands::list::checkports(&config);
        return Ok(());
    }

    if cli.ports {
        commands::list::ports(&config);
        return Ok(());
    }

    if let Some(pattern) = &cli.search {
        return commands::list::search(&config, pattern);
    }

    if cli.list {
        commands::list::list(&config);
        return Ok(());
    }

    if cli.offline && !cli.start {
        commands::list::offline(&config, &install_root);
        return Ok(());
    }

    if let Some(id) = &cli.logs {
        return commands::logs::logs(&config, &install_root, id);
    }

    if let Some(id) = &cli.debug {
        return commands::logs::debug(&config, &install_root, id);
    }

    if cli.reverse_proxy {
        return commands::proxy::reverse_proxy(&config, &workspace, &raw_tokens, cli.port);
    }

    if cli.prune {
        return commands::status::prune(&config, &install_root);
    }

    if cli.verify {
        let ok = commands::status::verify(&config, &install_root, &raw_tokens)?;
        if !ok {
            return Err(ExitError::verify_missing());
        }
        return Ok(());
    }

    if cli.status {
        let platform = sm_platform::detect()?;
        let (cols, _rows) = platform.terminal_size();
        let plain = sm_engine::use_plain_output(cols as usize, cli.format_plain);
        return commands::status::status(&config, &install_root, plain);
    }

    if cli.restart_outdated {
        commands::restart::restart_outdated(&config, &install_root, cli.offline)?;
        return Ok(());
    }

    if cli.restart {
        for id in &raw_tokens {
            commands::restart::restart_one(&config, &install_root, id)?;
        }
        return Ok(());
    }

    if cli.stop_all {
        return commands::stop::stop_all(&config, &install_root);
    }

    if cli.stop {
        for id in &raw_tokens {
            commands::stop::stop_one(&config, &install_root, id)?;
        }
        return Ok(());
    }

    if cli.start {
        if !cli.no_vpn_check && !env::novpn() {
            let timeout = commands::start::short_timeout();
            commands::diagnostic::vpn_check(&config.repo, timeout);
        }

        let append_args = cli
            .append_args
            .as_deref()
            .map(commands::start::parse_append_args)
            .transpose()?
            .unwrap_or_default();

        if cli.clean {
            // The installer already wipes and recreates the service root on
            // every install; `--clean` is accepted for compatibility only.
        }

        let platform = sm_platform::detect()?;
        let (cols, rows) = platform.terminal_size();

        let mut tokens_with_version = raw_tokens.clone();
        if let Some(version) = &cli.r {
            if tokens_with_version.len() == 1 {
                tokens_with_version[0] = format!("{}:{}", tokens_with_version[0], version);
            }
        }

        let opts = commands::start::StartOptions {
            workspace: workspace.clone(),
            tokens: tokens_with_version,
            from_source: cli.src,
            offline: cli.offline,
            workers: cli.workers.or_else(env::workers),
            delay_seconds: cli.delay_seconds.or(cli.wait),
            port: cli.port,
            append_args,
            noprogress: cli.noprogress || cli.format_plain,
            terminal_rows: rows as usize,
            terminal_cols: cols as usize,
        };

        let outcomes = commands::start::start(&config, opts);
        commands::start::print_failure_footer(&outcomes);
        if outcomes.iter().any(|o| o.result.is_err()) {
            anyhow::bail!(ExitError::new(1, "one or more services failed to start"));
        }
        return Ok(());
    }

    anyhow::bail!(ExitError::new(1, "no verb given; see --help"));
}

fn main() {
    let raw_args = legacy_args::normalize(std::env::args().collect());
    let cli = Cli::parse_from(raw_args);
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        let code = err
            .downcast_ref::<ExitError>()
            .map(|e| e.code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}
