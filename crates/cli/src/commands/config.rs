// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace/config resolution shared by every command, and the
//! `update-config` verb (§C: re-parse the config directory in place).

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use sm_config::Config;

/// Default config directory relative to `$WORKSPACE`.
const DEFAULT_CONFIG_SUBDIR: &str = "service-manager-config";

/// Default install directory relative to `$WORKSPACE`.
const INSTALL_SUBDIR: &str = "install";

/// Resolve `$WORKSPACE`, requiring it set and absolute (§6 Environment).
pub fn workspace() -> Result<PathBuf> {
    let dir = crate::env::workspace().context("WORKSPACE is not set")?;
    if !dir.is_absolute() {
        bail!("WORKSPACE must be an absolute path, got '{}'", dir.display());
    }
    Ok(dir)
}

/// Resolve the config directory: `--config <dir>` overrides
/// `$WORKSPACE/service-manager-config`.
pub fn config_dir(workspace: &Path, override_dir: Option<&Path>) -> PathBuf {
    override_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| workspace.join(DEFAULT_CONFIG_SUBDIR))
}

pub fn install_root(workspace: &Path) -> PathBuf {
    workspace.join(INSTALL_SUBDIR)
}

/// Load (or reload) the catalogue/profiles/repo config. Used both at
/// startup and by the `update-config` verb.
pub fn load(dir: &Path) -> Result<Config> {
    Config::load(dir).with_context(|| format!("failed to load config from {}", dir.display()))
}

/// `update-config`: re-invoke the loader and report the resulting counts.
/// This repo treats pulling the config repo itself as an external step
/// (§1); this only re-parses whatever is already on disk.
pub fn update_config(dir: &Path) -> Result<()> {
    let config = load(dir)?;
    println!(
        "reloaded {} service(s), {} profile(s) from {}",
        config.catalogue.len(),
        config.profiles.len(),
        dir.display()
    );
    Ok(())
}
