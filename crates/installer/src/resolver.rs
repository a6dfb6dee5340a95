// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Given a service and an optional requested version/variant, determine the
//! concrete artifact coordinates to install.

use sm_core::{
    artifact::{SCALA_VARIANT_ORDER, SCALA_WILDCARD},
    ArtifactCoordinates, Service, Version,
};

use crate::error::InstallError;
use crate::metadata::MetadataFetcher;

/// What the caller asked for: a service id plus optional overrides. Mirrors
/// the `ID[_scala][:version]` identifier grammar from the CLI surface.
#[derive(Debug, Clone, Default)]
pub struct Requested {
    pub version: Option<String>,
    pub scala_variant: Option<String>,
}

fn initial_coordinates(service: &Service) -> ArtifactCoordinates {
    let artifact = &service.binary.artifact;
    let suffix = SCALA_VARIANT_ORDER
        .iter()
        .chain(std::iter::once(&SCALA_WILDCARD))
        .find(|v| artifact.ends_with(*v))
        .copied()
        .unwrap_or("");
    ArtifactCoordinates::new(&service.binary.group_id, artifact, "", suffix)
}

/// Resolve concrete `(group, artifact, version)` coordinates. Makes no
/// network calls when a specific version is supplied (resolver idempotence,
/// §8 invariant 6).
pub fn resolve(
    service: &Service,
    requested: &Requested,
    offline: bool,
    fetcher: &MetadataFetcher,
    repo_url: &str,
) -> Result<ArtifactCoordinates, InstallError> {
    let mut coords = initial_coordinates(service);

    if let Some(variant) = &requested.scala_variant {
        coords = coords.with_scala_variant(variant);
    }

    if let Some(version) = &requested.version {
        coords.version = version.clone();
        return Ok(coords);
    }

    if offline {
        return Err(InstallError::NotAvailableOffline(coords.artifact.clone()));
    }

    if coords.is_wildcard() {
        resolve_wildcard(&coords, requested, fetcher, repo_url)
    } else {
        let metadata = fetcher.fetch(repo_url, &coords.group, &coords.artifact)?;
        coords.version = metadata.latest;
        Ok(coords)
    }
}

fn resolve_wildcard(
    coords: &ArtifactCoordinates,
    requested: &Requested,
    fetcher: &MetadataFetcher,
    repo_url: &str,
) -> Result<ArtifactCoordinates, InstallError> {
    let mut best: Option<(ArtifactCoordinates, u64)> = None;

    for variant in SCALA_VARIANT_ORDER {
        let candidate = coords.with_scala_variant(variant);
        let metadata = match fetcher.fetch(repo_url, &candidate.group, &candidate.artifact) {
            Ok(m) => m,
            Err(_) => continue,
        };

        if let Some(version) = &requested.version {
            if metadata.contains_version(version) {
                let mut chosen = candidate;
                chosen.version = version.clone();
                return Ok(chosen);
            }
        }

        let Some(key) = Version::parse(&metadata.latest).comparable_key() else {
            continue;
        };
        let mut chosen = candidate;
        chosen.version = metadata.latest;
        match &best {
            Some((_, best_key)) if *best_key >= key => {}
            _ => best = Some((chosen, key)),
        }
    }

    best.map(|(coords, _)| coords).ok_or_else(|| InstallError::MetadataNotFound {
        group: coords.group.clone(),
        artifact: coords.base_artifact().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sm_core::service::{BinaryDescriptor, SourceDescriptor};

    fn service_with_artifact(artifact: &str) -> Service {
        Service {
            id: "FOO".into(),
            name: "Foo".into(),
            default_port: 9999,
            binary: BinaryDescriptor {
                artifact: artifact.into(),
                group_id: "uk.gov.hmrc".into(),
                destination_subdir: "foo".into(),
                argv_template: vec!["bin/playtest".into()],
            },
            source: SourceDescriptor::default(),
            frontend: false,
            proxy_paths: vec![],
            healthcheck_template: None,
        }
    }

    #[test]
    fn explicit_version_short_circuits_without_network() {
        let service = service_with_artifact("playtest");
        let fetcher = MetadataFetcher::new(std::time::Duration::from_secs(1)).unwrap();
        let requested = Requested {
            version: Some("1.2.3".into()),
            scala_variant: None,
        };
        let coords = resolve(&service, &requested, false, &fetcher, "https://unreachable.invalid").unwrap();
        assert_eq!(coords.version, "1.2.3");
        assert_eq!(coords.artifact, "playtest");
    }

    #[test]
    fn explicit_scala_variant_substitutes_suffix() {
        let service = service_with_artifact("playtest_%%");
        let fetcher = MetadataFetcher::new(std::time::Duration::from_secs(1)).unwrap();
        let requested = Requested {
            version: Some("1.2.3".into()),
            scala_variant: Some("_2.13".into()),
        };
        let coords = resolve(&service, &requested, false, &fetcher, "https://unreachable.invalid").unwrap();
        assert_eq!(coords.artifact, "playtest_2.13");
    }

    #[test]
    fn offline_without_version_fails() {
        let service = service_with_artifact("playtest");
        let fetcher = MetadataFetcher::new(std::time::Duration::from_secs(1)).unwrap();
        let requested = Requested::default();
        let err = resolve(&service, &requested, true, &fetcher, "https://unreachable.invalid").unwrap_err();
        assert!(matches!(err, InstallError::NotAvailableOffline(_)));
    }

    #[test]
    fn initial_coordinates_detects_wildcard_suffix() {
        let service = service_with_artifact("playtest_%%");
        let coords = initial_coordinates(&service);
        assert!(coords.is_wildcard());
        assert_eq!(coords.base_artifact(), "playtest");
    }

    #[test]
    fn initial_coordinates_detects_no_suffix() {
        let service = service_with_artifact("playtest");
        let coords = initial_coordinates(&service);
        assert_eq!(coords.scala_suffix, "");
    }
}
