// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The ledger as an injectable seam: a trait, not file I/O baked into
//! consumers, so tests can substitute an in-memory implementation.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::LedgerError;
use crate::records::{InstallRecord, ProxyRecord, RunRecord, INSTALL_FILE, PROXY_FILE, STATE_FILE};

/// Durable per-service state: install record, run record, proxy record.
///
/// `clear_run` is idempotent. `load_proxy` never fails — an absent or
/// corrupt proxy file yields a default (empty) record.
pub trait Ledger: Send + Sync {
    fn save_install(&self, dir: &Path, record: &InstallRecord) -> Result<(), LedgerError>;
    fn load_install(&self, dir: &Path) -> Result<InstallRecord, LedgerError>;

    fn save_run(&self, dir: &Path, record: &RunRecord) -> Result<(), LedgerError>;
    fn load_run(&self, dir: &Path) -> Result<RunRecord, LedgerError>;
    fn clear_run(&self, dir: &Path) -> Result<(), LedgerError>;

    fn save_proxy(&self, workspace: &Path, record: &ProxyRecord) -> Result<(), LedgerError>;
    fn load_proxy(&self, workspace: &Path) -> ProxyRecord;
    fn clear_proxy(&self, workspace: &Path) -> Result<(), LedgerError>;

    /// Enumerate every immediate subdirectory of `install_root` and return
    /// the RunRecords found, skipping any directory without one.
    fn find_all_run(&self, install_root: &Path) -> Vec<(PathBuf, RunRecord)>;
}

/// The production ledger: one JSON file per record, per directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultLedger;

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    let contents = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&contents) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ledger file is corrupt, treating as absent");
            None
        }
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), LedgerError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| LedgerError::Io {
            path: parent.display().to_string(),
            source,
        })?;
    }
    let contents = serde_json::to_string_pretty(value)?;
    fs::write(path, contents).map_err(|source| LedgerError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn clear_file(path: &Path) -> Result<(), LedgerError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(LedgerError::Io {
            path: path.display().to_string(),
            source,
        }),
    }
}

impl Ledger for DefaultLedger {
    fn save_install(&self, dir: &Path, record: &InstallRecord) -> Result<(), LedgerError> {
        write_json(&dir.join(INSTALL_FILE), record)
    }

    fn load_install(&self, dir: &Path) -> Result<InstallRecord, LedgerError> {
        read_json(&dir.join(INSTALL_FILE))
            .ok_or_else(|| LedgerError::NotFound(dir.display().to_string()))
    }

    fn save_run(&self, dir: &Path, record: &RunRecord) -> Result<(), LedgerError> {
        write_json(&dir.join(STATE_FILE), record)
    }

    fn load_run(&self, dir: &Path) -> Result<RunRecord, LedgerError> {
        read_json(&dir.join(STATE_FILE))
            .ok_or_else(|| LedgerError::NotFound(dir.display().to_string()))
    }

    fn clear_run(&self, dir: &Path) -> Result<(), LedgerError> {
        clear_file(&dir.join(STATE_FILE))
    }

    fn save_proxy(&self, workspace: &Path, record: &ProxyRecord) -> Result<(), LedgerError> {
        write_json(&workspace.join(PROXY_FILE), record)
    }

    fn load_proxy(&self, workspace: &Path) -> ProxyRecord {
        read_json(&workspace.join(PROXY_FILE)).unwrap_or_default()
    }

    fn clear_proxy(&self, workspace: &Path) -> Result<(), LedgerError> {
        clear_file(&workspace.join(PROXY_FILE))
    }

    fn find_all_run(&self, install_root: &Path) -> Vec<(PathBuf, RunRecord)> {
        let entries = match fs::read_dir(install_root) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(path = %install_root.display(), error = %err, "install root unreadable");
                return Vec::new();
            }
        };

        entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .filter_map(|dir| {
                let record = self.load_run(&dir).ok()?;
                Some((dir, record))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_install(id: &str) -> InstallRecord {
        InstallRecord {
            service_id: id.into(),
            artifact: "playtest".into(),
            version: "1.0.0".into(),
            path: "/tmp/x".into(),
            created_at: 1,
        }
    }

    fn sample_run(id: &str) -> RunRecord {
        RunRecord {
            service_id: id.into(),
            artifact: "playtest".into(),
            version: "1.0.0".into(),
            path: "/tmp/x".into(),
            started_at: 1,
            pid: 42,
            port: 9999,
            argv: vec![],
            healthcheck_url: String::new(),
        }
    }

    #[test]
    fn save_then_load_install_roundtrips() {
        let dir = tempdir().unwrap();
        let ledger = DefaultLedger;
        let record = sample_install("FOO");
        ledger.save_install(dir.path(), &record).unwrap();
        let loaded = ledger.load_install(dir.path()).unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn load_install_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let ledger = DefaultLedger;
        assert!(matches!(
            ledger.load_install(dir.path()),
            Err(LedgerError::NotFound(_))
        ));
    }

    #[test]
    fn corrupt_install_file_treated_as_absent() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(INSTALL_FILE), "not json").unwrap();
        let ledger = DefaultLedger;
        assert!(matches!(
            ledger.load_install(dir.path()),
            Err(LedgerError::NotFound(_))
        ));
    }

    #[test]
    fn clear_run_is_idempotent() {
        let dir = tempdir().unwrap();
        let ledger = DefaultLedger;
        ledger.save_run(dir.path(), &sample_run("FOO")).unwrap();
        ledger.clear_run(dir.path()).unwrap();
        ledger.clear_run(dir.path()).unwrap();
        assert!(ledger.load_run(dir.path()).is_err());
    }

    #[test]
    fn load_proxy_on_absence_returns_default() {
        let dir = tempdir().unwrap();
        let ledger = DefaultLedger;
        assert_eq!(ledger.load_proxy(dir.path()), ProxyRecord::default());
    }

    #[test]
    fn find_all_run_skips_dirs_without_run_record() {
        let root = tempdir().unwrap();
        let ledger = DefaultLedger;

        let foo = root.path().join("foo");
        fs::create_dir_all(&foo).unwrap();
        ledger.save_run(&foo, &sample_run("FOO")).unwrap();

        let bar = root.path().join("bar");
        fs::create_dir_all(&bar).unwrap();
        // bar has no run record

        let found = ledger.find_all_run(root.path());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].1.service_id, "FOO");
    }
}
