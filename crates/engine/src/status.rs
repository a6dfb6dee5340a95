// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status inspector (§4.9): correlates ledger records with live OS process
//! and port state, applying boot/fail grace semantics.

use std::collections::HashMap;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use sm_core::{Clock, Service};
use sm_platform::Platform;
use sm_storage::{Ledger, RunRecord};
use tracing::debug;

/// Derived liveness, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Pass,
    Fail,
    Boot,
}

const RELEASE_GRACE_SECONDS: i64 = 30;
const SOURCE_GRACE_SECONDS: i64 = 60;
const HEALTHCHECK_TIMEOUT: Duration = Duration::from_secs(5);
const MONGO_ADDR: &str = "localhost:27017";
const MONGO_CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

/// A single row in the status table: either a managed service or an
/// unmanaged port occupant.
#[derive(Debug, Clone)]
pub struct ServiceStatus {
    pub service_id: String,
    pub version: String,
    pub pid: u32,
    pub port: u16,
    pub health: Health,
    pub unmanaged: bool,
}

pub struct StatusInspector<'a, L: Ledger> {
    pub catalogue: &'a HashMap<String, Service>,
    pub ledger: &'a L,
    pub install_root: &'a Path,
    pub platform: &'a dyn Platform,
    pub clock: &'a dyn Clock,
}

impl<'a, L: Ledger> StatusInspector<'a, L> {
    /// Walk every RunRecord, evicting stale ones and deriving health for the
    /// rest. Results are sorted by service id with a synthetic `MONGO`
    /// status always prepended.
    pub fn inspect(&self) -> Vec<ServiceStatus> {
        let boot_time = self.platform.boot_time().unwrap_or(0);
        let live_pids = self.platform.live_pids();
        let now = self.clock.now_unix();

        let mut statuses: Vec<ServiceStatus> = Vec::new();
        for (dir, record) in self.ledger.find_all_run(self.install_root) {
            if record.started_at < boot_time {
                let _ = self.ledger.clear_run(&dir);
                continue;
            }
            let health = self.derive_health(&record, &live_pids, now);
            statuses.push(ServiceStatus {
                service_id: record.service_id.clone(),
                version: record.version.clone(),
                pid: record.pid,
                port: record.port,
                health,
                unmanaged: false,
            });
        }
        let unmanaged = self.unmanaged_statuses(&statuses);
        statuses = merge_sorted_by_id(statuses, unmanaged);

        let mongo = ServiceStatus {
            service_id: "MONGO".into(),
            version: String::new(),
            pid: 0,
            port: 27017,
            health: mongo_health(),
            unmanaged: false,
        };
        let mut result = vec![mongo];
        result.extend(statuses);
        result
    }

    fn derive_health(&self, record: &RunRecord, live_pids: &std::collections::HashSet<u32>, now: i64) -> Health {
        if !live_pids.contains(&record.pid) {
            return Health::Fail;
        }
        if probe_healthcheck(&record.healthcheck_url) {
            return Health::Pass;
        }
        let grace = if record.is_source() {
            SOURCE_GRACE_SECONDS
        } else {
            RELEASE_GRACE_SECONDS
        };
        if now - record.started_at > grace {
            Health::Fail
        } else {
            Health::Boot
        }
    }

    fn unmanaged_statuses(&self, known: &[ServiceStatus]) -> Vec<ServiceStatus> {
        let port_to_pid = self.platform.port_to_pid();
        let known_ports: std::collections::HashSet<u16> = known.iter().map(|s| s.port).collect();

        let mut unmanaged = Vec::new();
        for service in self.catalogue.values() {
            if known_ports.contains(&service.default_port) {
                continue;
            }
            if let Some(pid) = port_to_pid.get(&service.default_port) {
                unmanaged.push(ServiceStatus {
                    service_id: service.id.clone(),
                    version: String::new(),
                    pid: *pid,
                    port: service.default_port,
                    health: Health::Fail,
                    unmanaged: true,
                });
            }
        }
        unmanaged.sort_by(|a, b| a.service_id.cmp(&b.service_id));
        unmanaged
    }

    /// Print `<id> OK`/`<id> MISSING` for each requested service; returns
    /// whether every one was PASS.
    pub fn verify(&self, requested: &[String]) -> bool {
        let statuses = self.inspect();
        let by_id: HashMap<&str, &ServiceStatus> =
            statuses.iter().map(|s| (s.service_id.as_str(), s)).collect();
        let mut all_ok = true;
        for id in requested {
            match by_id.get(id.as_str()) {
                Some(s) if s.health == Health::Pass => println!("{id} OK"),
                _ => {
                    println!("{id} MISSING");
                    all_ok = false;
                }
            }
        }
        all_ok
    }

    /// Clear RunRecords for every FAIL status (excluding the synthetic
    /// MONGO row).
    pub fn prune(&self) -> Vec<String> {
        let mut pruned = Vec::new();
        for status in self.inspect() {
            if status.service_id == "MONGO" || status.health != Health::Fail || status.unmanaged {
                continue;
            }
            if let Some(service) = self.catalogue.get(&status.service_id) {
                let dir = self.install_root.join(&service.binary.destination_subdir);
                if self.ledger.clear_run(&dir).is_ok() {
                    pruned.push(status.service_id);
                }
            }
        }
        pruned
    }
}

/// Merge two groups and sort the combined result by service id, so an
/// unmanaged entry interleaves correctly rather than trailing every managed
/// one regardless of id.
fn merge_sorted_by_id(mut a: Vec<ServiceStatus>, b: Vec<ServiceStatus>) -> Vec<ServiceStatus> {
    a.extend(b);
    a.sort_by(|x, y| x.service_id.cmp(&y.service_id));
    a
}

fn probe_healthcheck(url: &str) -> bool {
    let client = match reqwest::blocking::Client::builder()
        .timeout(HEALTHCHECK_TIMEOUT)
        .build()
    {
        Ok(c) => c,
        Err(_) => return false,
    };
    client
        .get(url)
        .send()
        .map(|r| r.status().is_success())
        .unwrap_or(false)
}

fn mongo_health() -> Health {
    let addr: Option<SocketAddr> = MONGO_ADDR.to_socket_addrs().ok().and_then(|mut a| a.next());
    match addr {
        Some(addr) => {
            if TcpStream::connect_timeout(&addr, MONGO_CONNECT_TIMEOUT).is_ok() {
                Health::Pass
            } else {
                Health::Fail
            }
        }
        None => {
            debug!("could not resolve mongo address");
            Health::Fail
        }
    }
}

/// Choose plain output when the terminal is narrower than 80 columns or the
/// caller explicitly requested it.
pub fn use_plain_output(terminal_cols: usize, explicit_flag: bool) -> bool {
    explicit_flag || terminal_cols < 80
}

pub fn service_root(install_root: &Path, service: &Service) -> PathBuf {
    install_root.join(&service.binary.destination_subdir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_output_below_eighty_columns() {
        assert!(use_plain_output(79, false));
        assert!(!use_plain_output(80, false));
        assert!(use_plain_output(120, true));
    }

    #[test]
    fn source_grace_is_twice_release_grace() {
        assert_eq!(SOURCE_GRACE_SECONDS, RELEASE_GRACE_SECONDS * 2);
    }

    fn status(id: &str, unmanaged: bool) -> ServiceStatus {
        ServiceStatus {
            service_id: id.to_string(),
            version: String::new(),
            pid: 1,
            port: 0,
            health: Health::Pass,
            unmanaged,
        }
    }

    #[test]
    fn merge_sorted_by_id_interleaves_unmanaged_entries() {
        let managed = vec![status("ALPHA", false), status("ZEBRA", false)];
        let unmanaged = vec![status("MIDDLE", true)];
        let merged = merge_sorted_by_id(managed, unmanaged);
        let ids: Vec<&str> = merged.iter().map(|s| s.service_id.as_str()).collect();
        assert_eq!(ids, vec!["ALPHA", "MIDDLE", "ZEBRA"]);
    }
}
