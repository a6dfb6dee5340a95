// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fetches and parses the Maven-style `maven-metadata.xml` index.

use std::time::Duration;

use serde::Deserialize;
use sm_core::Metadata;
use tracing::debug;

use crate::error::InstallError;

/// Wire shape of `maven-metadata.xml`.
#[derive(Debug, Deserialize)]
struct MavenMetadataXml {
    #[serde(rename = "groupId", default)]
    group_id: String,
    #[serde(rename = "artifactId", default)]
    artifact_id: String,
    versioning: Versioning,
}

#[derive(Debug, Deserialize)]
struct Versioning {
    #[serde(default)]
    latest: String,
    #[serde(default)]
    release: String,
    #[serde(default)]
    versions: VersionList,
}

#[derive(Debug, Default, Deserialize)]
struct VersionList {
    #[serde(default, rename = "version")]
    version: Vec<String>,
}

/// Short-timeout HTTP client for metadata and health probes, distinct from
/// the long-timeout client the installer uses for archive downloads.
pub struct MetadataFetcher {
    client: reqwest::blocking::Client,
}

const USER_AGENT: &str = concat!("service-manager/", env!("CARGO_PKG_VERSION"));

impl MetadataFetcher {
    pub fn new(short_timeout: Duration) -> Result<Self, InstallError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(short_timeout)
            .build()?;
        Ok(Self { client })
    }

    /// Fetch `<repo>/<group-as-path>/<artifact>/maven-metadata.xml` and
    /// parse it. Returns `MetadataNotFound` on any non-200 response.
    pub fn fetch(&self, repo_url: &str, group: &str, artifact: &str) -> Result<Metadata, InstallError> {
        let group_path = group.replace('.', "/");
        let url = format!(
            "{}/{}/{}/maven-metadata.xml",
            repo_url.trim_end_matches('/'),
            group_path,
            artifact
        );
        debug!(url = %url, "fetching artifact metadata");

        let response = self.client.get(&url).send().map_err(InstallError::Http)?;
        if !response.status().is_success() {
            return Err(InstallError::MetadataNotFound {
                group: group.to_string(),
                artifact: artifact.to_string(),
            });
        }
        let body = response.text().map_err(InstallError::Http)?;
        parse_metadata_xml(&body).ok_or_else(|| InstallError::MetadataNotFound {
            group: group.to_string(),
            artifact: artifact.to_string(),
        })
    }
}

pub fn parse_metadata_xml(xml: &str) -> Option<Metadata> {
    let parsed: MavenMetadataXml = quick_xml::de::from_str(xml).ok()?;
    Some(Metadata {
        group: parsed.group_id,
        artifact: parsed.artifact_id,
        latest: parsed.versioning.latest,
        release: parsed.versioning.release,
        versions: parsed.versioning.versions.version,
    })
}
