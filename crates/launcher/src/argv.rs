// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Argv composition (§4.6).

use std::path::{Path, PathBuf};

use sm_core::Service;

/// The executable path: `<service-root>/bin/<basename-of-configured-command>`.
pub fn executable_path(service: &Service, service_root: &Path) -> PathBuf {
    let command = service
        .binary
        .argv_template
        .first()
        .map(String::as_str)
        .unwrap_or("");
    let basename = Path::new(command)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    service_root.join("bin").join(basename)
}

/// Compose the full argv for a spawn: the service's configured args (minus
/// the command name), the orchestrator-supplied triplet, any extra args,
/// and `-Dhttp.port=<port>` last.
pub fn compose_argv(
    service: &Service,
    service_id: &str,
    version: &str,
    service_root: &Path,
    port: u16,
    extra_args: &[String],
) -> Vec<String> {
    let mut argv: Vec<String> = service
        .binary
        .argv_template
        .iter()
        .skip(1)
        .cloned()
        .collect();

    argv.push(format!("-Dservice.manager.serviceName={service_id}"));
    argv.push(format!("-Dservice.manager.runFrom={version}"));

    let user_home = service_root
        .parent()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| service_root.display().to_string());
    argv.push(format!("-Duser.home={user_home}"));

    argv.extend(extra_args.iter().cloned());
    argv.push(format!("-Dhttp.port={port}"));
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use sm_core::service::{BinaryDescriptor, SourceDescriptor};

    fn service() -> Service {
        Service {
            id: "FOO".into(),
            name: "Foo".into(),
            default_port: 9999,
            binary: BinaryDescriptor {
                artifact: "playtest".into(),
                group_id: "uk.gov.hmrc".into(),
                destination_subdir: "foo".into(),
                argv_template: vec!["bin/playtest".into(), "-J-Xmx512m".into()],
            },
            source: SourceDescriptor::default(),
            frontend: false,
            proxy_paths: vec![],
            healthcheck_template: None,
        }
    }

    #[test]
    fn executable_path_uses_bin_and_basename() {
        let svc = service();
        let root = Path::new("/ws/install/foo/playtest-2.33.0");
        assert_eq!(
            executable_path(&svc, root),
            PathBuf::from("/ws/install/foo/playtest-2.33.0/bin/playtest")
        );
    }

    #[test]
    fn compose_argv_orders_triplet_then_extra_then_port() {
        let svc = service();
        let root = Path::new("/ws/install/foo/playtest-2.33.0");
        let argv = compose_argv(&svc, "FOO", "2.33.0", root, 9999, &["-Dfoo=bar".into()]);
        assert_eq!(
            argv,
            vec![
                "-J-Xmx512m".to_string(),
                "-Dservice.manager.serviceName=FOO".to_string(),
                "-Dservice.manager.runFrom=2.33.0".to_string(),
                "-Duser.home=/ws/install/foo".to_string(),
                "-Dfoo=bar".to_string(),
                "-Dhttp.port=9999".to_string(),
            ]
        );
    }
}
