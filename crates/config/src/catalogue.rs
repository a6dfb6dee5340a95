// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loads the service catalogue: one monolithic JSON file, or a directory of
//! per-service JSON files walked recursively.

use std::collections::HashMap;
use std::path::Path;

use sm_core::Service;
use tracing::warn;

use crate::error::ConfigError;

/// Load the catalogue from `path`. If `path` is a directory, every `.json`
/// file beneath it (recursively) is parsed as a `{id: Service}` map and
/// merged into the result; a key seen in more than one file emits a
/// warning and the last file visited (in directory-walk order) wins.
pub fn load_catalogue(path: &Path) -> Result<HashMap<String, Service>, ConfigError> {
    let mut merged = HashMap::new();

    if path.is_dir() {
        for file in walk_json_files(path) {
            let partial = parse_catalogue_file(&file)?;
            for (id, service) in partial {
                if merged.contains_key(&id) {
                    warn!(id = %id, file = %file.display(), "duplicate service id, last writer wins");
                }
                merged.insert(id, service);
            }
        }
    } else if path.is_file() {
        merged = parse_catalogue_file(path)?;
    } else {
        return Err(ConfigError::Missing {
            what: "catalogue",
            path: path.display().to_string(),
        });
    }

    for (id, service) in merged.iter_mut() {
        service.id = id.clone();
    }

    Ok(merged)
}

fn parse_catalogue_file(path: &Path) -> Result<HashMap<String, Service>, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::Invalid {
        what: "catalogue",
        path: path.display().to_string(),
        source,
    })
}

fn walk_json_files(root: &Path) -> Vec<std::path::PathBuf> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().and_then(|e| e.to_str()) == Some("json") {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    const FOO_JSON: &str = r#"{
        "FOO": {
            "name": "Foo",
            "default_port": 9999,
            "binary": {
                "artifact": "playtest",
                "group_id": "uk.gov.hmrc",
                "destination_subdir": "foo",
                "argv_template": ["bin/playtest"]
            }
        }
    }"#;

    #[test]
    fn loads_monolithic_file_and_stamps_id() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("services.json");
        write(&file, FOO_JSON);

        let catalogue = load_catalogue(&file).unwrap();
        assert_eq!(catalogue["FOO"].id, "FOO");
        assert_eq!(catalogue["FOO"].default_port, 9999);
    }

    #[test]
    fn loads_directory_recursively() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("a/foo.json"), FOO_JSON);

        let catalogue = load_catalogue(dir.path()).unwrap();
        assert_eq!(catalogue.len(), 1);
        assert!(catalogue.contains_key("FOO"));
    }

    #[test]
    fn missing_path_is_config_missing() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            load_catalogue(&missing),
            Err(ConfigError::Missing { .. })
        ));
    }

    #[test]
    fn duplicate_id_across_files_last_writer_wins() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("a.json"), FOO_JSON);
        let second = FOO_JSON.replace("9999", "8888");
        write(&dir.path().join("b.json"), &second);

        let catalogue = load_catalogue(dir.path()).unwrap();
        assert_eq!(catalogue["FOO"].default_port, 8888);
    }
}
