// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `list`, `search <re>`, `ports`, `checkports`, and the standalone
//! `offline` verb (§C), grounded on `servicemanager/list.go` and
//! `servicemanager/checkports.go`.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use regex::Regex;
use sm_config::Config;
use sm_core::Service;
use sm_storage::{DefaultLedger, Ledger};

use crate::table::{Column, Table};

fn sorted_ids(catalogue: &HashMap<String, Service>) -> Vec<&String> {
    let mut ids: Vec<&String> = catalogue.keys().collect();
    ids.sort();
    ids
}

/// `list`: every catalogued service id and name, plain style (no status).
pub fn list(config: &Config) {
    let mut table = Table::new(vec![Column::left("ID"), Column::left("NAME"), Column::right("PORT")]);
    for id in sorted_ids(&config.catalogue) {
        let service = &config.catalogue[id];
        table.row(vec![id.clone(), service.name.clone(), service.default_port.to_string()]);
    }
    table.render(&mut io::stdout());
}

/// `search <re>`: filter catalogue ids/artifacts by a regular expression.
pub fn search(config: &Config, pattern: &str) -> anyhow::Result<()> {
    let re = Regex::new(pattern)?;
    let mut table = Table::new(vec![Column::left("ID"), Column::left("NAME"), Column::left("ARTIFACT")]);
    for id in sorted_ids(&config.catalogue) {
        let service = &config.catalogue[id];
        if re.is_match(id) || re.is_match(&service.binary.artifact) {
            table.row(vec![id.clone(), service.name.clone(), service.binary.artifact.clone()]);
        }
    }
    table.render(&mut io::stdout());
    Ok(())
}

/// `ports`: the catalogue's configured default ports.
pub fn ports(config: &Config) {
    let mut table = Table::new(vec![Column::left("ID"), Column::right("DEFAULT_PORT")]);
    for id in sorted_ids(&config.catalogue) {
        table.row(vec![id.clone(), config.catalogue[id].default_port.to_string()]);
    }
    table.render(&mut io::stdout());
}

/// `checkports`: detect duplicate static port assignments across the
/// catalogue, reported ascending by port, once per duplicate pair.
pub fn checkports(config: &Config) -> bool {
    let mut by_port: HashMap<u16, Vec<&String>> = HashMap::new();
    for id in sorted_ids(&config.catalogue) {
        by_port.entry(config.catalogue[id].default_port).or_default().push(id);
    }

    let mut ports: Vec<u16> = by_port.keys().copied().collect();
    ports.sort_unstable();

    let mut found = false;
    for port in ports {
        let ids = &by_port[&port];
        if ids.len() > 1 {
            found = true;
            println!("Duplicate port found: {port} in services: {} and {}", ids[0], ids[1..].join(", "));
        }
    }
    if !found {
        println!("no duplicate ports found");
    }
    found
}

/// Standalone `offline` verb: services with an install record on disk,
/// regardless of whether they're currently running.
pub fn offline(config: &Config, install_root: &Path) {
    let ledger = DefaultLedger;
    let mut table = Table::new(vec![Column::left("ID"), Column::left("VERSION")]);
    for id in sorted_ids(&config.catalogue) {
        let service = &config.catalogue[id];
        let dir = install_root.join(&service.binary.destination_subdir);
        if let Ok(install) = ledger.load_install(&dir) {
            table.row(vec![id.clone(), install.version]);
        }
    }
    table.render(&mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use sm_config::RepoConfig;
    use sm_core::service::{BinaryDescriptor, SourceDescriptor};

    fn service(port: u16, artifact: &str) -> Service {
        Service {
            id: String::new(),
            name: "Foo".into(),
            default_port: port,
            binary: BinaryDescriptor {
                artifact: artifact.into(),
                group_id: "uk.gov.hmrc".into(),
                destination_subdir: artifact.into(),
                argv_template: vec![],
            },
            source: SourceDescriptor::default(),
            frontend: false,
            proxy_paths: vec![],
            healthcheck_template: None,
        }
    }

    fn config(catalogue: HashMap<String, Service>) -> Config {
        Config {
            config_dir: std::path::PathBuf::new(),
            catalogue,
            profiles: HashMap::new(),
            repo: RepoConfig::default(),
        }
    }

    #[test]
    fn checkports_detects_shared_port() {
        let mut catalogue = HashMap::new();
        catalogue.insert("A".to_string(), service(9000, "a"));
        catalogue.insert("B".to_string(), service(9000, "b"));
        catalogue.insert("C".to_string(), service(9001, "c"));
        assert!(checkports(&config(catalogue)));
    }

    #[test]
    fn checkports_clean_catalogue_returns_false() {
        let mut catalogue = HashMap::new();
        catalogue.insert("A".to_string(), service(9000, "a"));
        catalogue.insert("B".to_string(), service(9001, "b"));
        assert!(!checkports(&config(catalogue)));
    }

    #[test]
    fn search_matches_by_pattern() {
        let mut catalogue = HashMap::new();
        catalogue.insert("FOO_ABC".to_string(), service(9000, "foo-abc"));
        catalogue.insert("BAR".to_string(), service(9001, "bar"));
        assert!(search(&config(catalogue), "^FOO").is_ok());
    }
}
