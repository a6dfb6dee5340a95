// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Downloads an artifact, stream-decompresses it, verifies its checksum,
//! and writes an [`InstallRecord`].

use std::collections::BTreeSet;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use flate2::read::GzDecoder;
use md5::{Digest, Md5};
use sm_core::ArtifactCoordinates;
use sm_storage::InstallRecord;
use tar::Archive;
use tracing::{info, warn};

use crate::error::InstallError;

const PROGRESS_STEP_BYTES: u64 = 1024 * 1024;
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Long-timeout HTTP client for archive downloads, distinct from the
/// metadata/health short-timeout client.
pub fn download_client() -> Result<reqwest::blocking::Client, InstallError> {
    Ok(reqwest::blocking::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()?)
}

/// Tees a reader through a byte counter, invoking `on_progress` every time
/// at least [`PROGRESS_STEP_BYTES`] more bytes have been read since the
/// last call.
struct ProgressTee<'a, R> {
    inner: R,
    total_read: u64,
    last_reported: u64,
    content_length: Option<u64>,
    on_progress: &'a mut dyn FnMut(u64, Option<u64>),
}

impl<'a, R: Read> Read for ProgressTee<'a, R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.total_read += n as u64;
        if n == 0 || self.total_read - self.last_reported >= PROGRESS_STEP_BYTES {
            self.last_reported = self.total_read;
            (self.on_progress)(self.total_read, self.content_length);
        }
        Ok(n)
    }
}

/// Hashes bytes as they pass through, alongside whatever inner reader they
/// are being decoded from.
struct HashingTee<R> {
    inner: R,
    hasher: Md5,
}

impl<R: Read> Read for HashingTee<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}

/// Install `coords` into `install_dir`.
///
/// `install_dir` must be absolute: callers composing a relative path have a
/// bug, so this aborts rather than returning a recoverable error, matching
/// the upstream tool's precondition.
#[allow(clippy::panic)]
pub fn install(
    service_id: &str,
    install_dir: &Path,
    coords: &ArtifactCoordinates,
    repo_url: &str,
    client: &reqwest::blocking::Client,
    now_unix: i64,
    mut on_progress: impl FnMut(u64, Option<u64>),
) -> Result<InstallRecord, InstallError> {
    if !install_dir.is_absolute() {
        panic!("install directory must be absolute, got {}", install_dir.display());
    }

    if install_dir.exists() {
        fs::remove_dir_all(install_dir)?;
    }
    fs::create_dir_all(install_dir)?;

    let url = download_url(repo_url, coords)?;
    info!(url = %url, "downloading artifact");
    let response = client.get(&url).send()?;
    if !response.status().is_success() {
        return Err(InstallError::MetadataNotFound {
            group: coords.group.clone(),
            artifact: coords.artifact.clone(),
        });
    }
    let expected_md5 = response
        .headers()
        .get("X-Checksum-Md5")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    let content_length = response.content_length();

    let mut tee = ProgressTee {
        inner: HashingTee {
            inner: response,
            hasher: Md5::new(),
        },
        total_read: 0,
        last_reported: 0,
        content_length,
        on_progress: &mut on_progress,
    };

    let top_level_dirs = {
        let gz = GzDecoder::new(&mut tee);
        let mut archive = Archive::new(gz);
        extract(&mut archive, install_dir)?
    };

    let computed_md5 = format!("{:x}", tee.inner.hasher.finalize());
    if let Some(expected) = expected_md5 {
        if !expected.eq_ignore_ascii_case(&computed_md5) {
            return Err(InstallError::ChecksumMismatch {
                expected,
                computed: computed_md5,
            });
        }
    }

    let service_root = top_level_dirs
        .iter()
        .next_back()
        .ok_or_else(|| InstallError::UnpackFailed("archive contained no top-level directory".into()))?;

    if top_level_dirs.len() > 1 {
        warn!(
            service = service_id,
            dirs = ?top_level_dirs,
            "archive contained multiple top-level directories, using the lexicographically last"
        );
    }

    let record = InstallRecord {
        service_id: service_id.to_string(),
        artifact: coords.artifact.clone(),
        version: coords.version.clone(),
        path: install_dir.join(service_root).display().to_string(),
        created_at: now_unix,
    };
    Ok(record)
}

fn download_url(repo_url: &str, coords: &ArtifactCoordinates) -> Result<String, InstallError> {
    let mut url = reqwest::Url::parse(repo_url.trim_end_matches('/'))
        .map_err(|e| InstallError::InvalidRepoUrl(repo_url.to_string(), e.to_string()))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| InstallError::InvalidRepoUrl(repo_url.to_string(), "url cannot be a base".into()))?;
        for part in coords.group.split('.') {
            segments.push(part);
        }
        segments.push(&coords.artifact);
        segments.push(&coords.version);
        segments.push(&coords.archive_name());
    }
    Ok(url.to_string())
}

/// Extract every tar entry under `dest`, preserving mode bits, and return
/// the set of first-path-component directory names observed (excluding
/// `.`).
fn extract<R: Read>(archive: &mut Archive<R>, dest: &Path) -> Result<BTreeSet<String>, InstallError> {
    let mut top_level = BTreeSet::new();
    for entry in archive.entries().map_err(|e| InstallError::UnpackFailed(e.to_string()))? {
        let mut entry = entry.map_err(|e| InstallError::UnpackFailed(e.to_string()))?;
        let path = entry.path().map_err(|e| InstallError::UnpackFailed(e.to_string()))?.into_owned();

        if let Some(first) = path.components().next() {
            let name = first.as_os_str().to_string_lossy().to_string();
            if name != "." {
                top_level.insert(name);
            }
        }

        entry
            .unpack_in(dest)
            .map_err(|e| InstallError::UnpackFailed(e.to_string()))?;
    }
    Ok(top_level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_url_percent_encodes_group_path() {
        let coords = ArtifactCoordinates::new("uk.gov.hmrc", "playtest", "2.33.0", "");
        let url = download_url("https://repo.internal.example/release", &coords).unwrap();
        assert_eq!(
            url,
            "https://repo.internal.example/release/uk/gov/hmrc/playtest/2.33.0/playtest-2.33.0.tgz"
        );
    }

    #[test]
    fn download_url_rejects_unparseable_repo_url() {
        let coords = ArtifactCoordinates::new("g", "a", "1.0.0", "");
        let err = download_url("not a url", &coords).unwrap_err();
        assert!(matches!(err, InstallError::InvalidRepoUrl(..)));
    }

    #[test]
    #[should_panic(expected = "must be absolute")]
    fn install_panics_on_relative_path() {
        let coords = ArtifactCoordinates::new("g", "a", "1.0.0", "");
        let client = download_client().unwrap();
        let _ = install(
            "FOO",
            Path::new("relative/path"),
            &coords,
            "https://unreachable.invalid",
            &client,
            0,
            |_, _| {},
        );
    }
}
