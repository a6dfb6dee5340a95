// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The platform probe: five capability queries, each backed by a
//! platform-specific mechanism. Individually, failure is non-fatal —
//! queries return empty results rather than erroring.

use std::collections::{HashMap, HashSet};
use std::process::Command;

use regex::Regex;
use tracing::{debug, warn};

/// The pattern a service run-from-source stamps into its JVM argv so the
/// stopper can find every related process.
pub fn service_name_token(service_id: &str) -> String {
    format!("service.manager.serviceName={service_id}")
}

/// The capability bundle. Each method is a pure query; none of them can
/// bring the process down.
pub trait Platform: Send + Sync {
    fn boot_time(&self) -> Option<i64>;
    fn live_pids(&self) -> HashSet<u32>;
    fn port_to_pid(&self) -> HashMap<u16, u32>;
    fn pids_matching_service(&self, service_id: &str) -> Vec<u32>;
    fn terminal_size(&self) -> (u16, u16);
}

/// Linux and macOS implementation, shelling out to the same utilities the
/// original tool used (`uptime`, `ps`, `lsof`) and reading terminal size via
/// the `TIOCGWINSZ` ioctl.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnixPlatform;

impl Platform for UnixPlatform {
    fn boot_time(&self) -> Option<i64> {
        if cfg!(target_os = "macos") {
            boot_time_macos()
        } else {
            boot_time_linux()
        }
    }

    fn live_pids(&self) -> HashSet<u32> {
        let output = match Command::new("ps").args(["-eo", "pid"]).output() {
            Ok(o) => o,
            Err(err) => {
                warn!(error = %err, "ps failed, live pid set is empty");
                return HashSet::new();
            }
        };
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .skip(1)
            .filter_map(|line| line.trim().parse::<u32>().ok())
            .collect()
    }

    fn port_to_pid(&self) -> HashMap<u16, u32> {
        let output = match Command::new("lsof").args(["-iTCP", "-sTCP:LISTEN", "-P", "-n"]).output()
        {
            Ok(o) => o,
            Err(err) => {
                warn!(error = %err, "lsof failed, port map is empty");
                return HashMap::new();
            }
        };
        parse_lsof_listen(&String::from_utf8_lossy(&output.stdout))
    }

    fn pids_matching_service(&self, service_id: &str) -> Vec<u32> {
        let output = match Command::new("ps").args(["-eo", "pid,args"]).output() {
            Ok(o) => o,
            Err(err) => {
                warn!(error = %err, "ps failed, no service pids found");
                return Vec::new();
            }
        };
        let token = service_name_token(service_id);
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .skip(1)
            .filter(|line| line.contains(&token))
            .filter_map(|line| line.trim().split_whitespace().next())
            .filter_map(|pid| pid.parse::<u32>().ok())
            .collect()
    }

    fn terminal_size(&self) -> (u16, u16) {
        terminal_size_ioctl().unwrap_or((80, 25))
    }
}

fn boot_time_linux() -> Option<i64> {
    let output = Command::new("sh").args(["-c", "uptime -s"]).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout);
    parse_uptime_s(text.trim())
}

/// Parse `uptime -s`'s `"2006-01-02 15:04:05"`-shaped output into a unix
/// timestamp, without pulling in a datetime-parsing dependency for a single
/// fixed format.
fn parse_uptime_s(text: &str) -> Option<i64> {
    let re = Regex::new(r"^(\d{4})-(\d{2})-(\d{2}) (\d{2}):(\d{2}):(\d{2})$").ok()?;
    let caps = re.captures(text)?;
    let y: i64 = caps[1].parse().ok()?;
    let mo: i64 = caps[2].parse().ok()?;
    let d: i64 = caps[3].parse().ok()?;
    let h: i64 = caps[4].parse().ok()?;
    let mi: i64 = caps[5].parse().ok()?;
    let s: i64 = caps[6].parse().ok()?;
    Some(days_from_civil(y, mo, d) * 86400 + h * 3600 + mi * 60 + s)
}

/// Howard Hinnant's civil-to-days algorithm; avoids a chrono dependency
/// for a boot-time parse that happens once per invocation.
fn days_from_civil(y: i64, m: i64, d: i64) -> i64 {
    let y = if m <= 2 { y - 1 } else { y };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = (y - era * 400) as i64;
    let mp = (m + 9) % 12;
    let doy = (153 * mp + 2) / 5 + d - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146097 + doe - 719468
}

fn boot_time_macos() -> Option<i64> {
    let output = Command::new("sh")
        .args(["-c", "sysctl -n kern.boottime"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout);
    let re = Regex::new(r"sec = (\d+)").ok()?;
    re.captures(&text)?.get(1)?.as_str().parse().ok()
}

fn parse_lsof_listen(text: &str) -> HashMap<u16, u32> {
    let mut map = HashMap::new();
    for line in text.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 9 {
            continue;
        }
        let Ok(pid) = fields[1].parse::<u32>() else {
            continue;
        };
        let name = fields[8];
        let Some(port_str) = name.rsplit(':').next() else {
            continue;
        };
        if let Ok(port) = port_str.parse::<u16>() {
            map.insert(port, pid);
        }
    }
    map
}

#[cfg(unix)]
#[allow(unsafe_code)]
fn terminal_size_ioctl() -> Option<(u16, u16)> {
    use std::os::unix::io::AsRawFd;

    #[repr(C)]
    #[derive(Default)]
    struct Winsize {
        ws_row: u16,
        ws_col: u16,
        ws_xpixel: u16,
        ws_ypixel: u16,
    }

    nix::ioctl_read_bad!(tiocgwinsz, libc::TIOCGWINSZ, Winsize);

    let stdout = std::io::stdout();
    let mut ws = Winsize::default();
    // SAFETY: `ws` is a plain-old-data struct matching `struct winsize`
    // from `<sys/ioctl.h>`, sized and laid out identically to the kernel's
    // expectation for `TIOCGWINSZ`.
    let result = unsafe { tiocgwinsz(stdout.as_raw_fd(), &mut ws) };
    match result {
        Ok(_) if ws.ws_col > 0 && ws.ws_row > 0 => Some((ws.ws_col, ws.ws_row)),
        _ => {
            debug!("TIOCGWINSZ unavailable, falling back to 80x25");
            None
        }
    }
}

#[cfg(not(unix))]
fn terminal_size_ioctl() -> Option<(u16, u16)> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_name_token_format() {
        assert_eq!(
            service_name_token("FOO"),
            "service.manager.serviceName=FOO"
        );
    }

    #[test]
    fn parse_uptime_s_known_date() {
        // 2024-01-01 00:00:00 UTC
        assert_eq!(parse_uptime_s("2024-01-01 00:00:00"), Some(1_704_067_200));
    }

    #[test]
    fn parse_uptime_s_rejects_garbage() {
        assert_eq!(parse_uptime_s("not a date"), None);
    }

    #[test]
    fn parse_lsof_listen_extracts_port_pid() {
        let text = "COMMAND   PID USER   FD   TYPE DEVICE SIZE/OFF NODE NAME\n\
                     java     1234 user   10u  IPv4 123456 0t0 TCP *:9999 (LISTEN)\n";
        let map = parse_lsof_listen(text);
        assert_eq!(map.get(&9999), Some(&1234));
    }
}
