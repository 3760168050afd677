//! Artifact retrieval and extraction.
//!
//! Requests a generated project archive from the export service, persists it
//! under the output directory, and unpacks it into a per-test working
//! directory. A failed fetch or extraction is terminal for that test; no
//! retries are attempted.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::{GenerationRequest, TestConfig};
use crate::error::{Error, Result};

/// Client for the export service. The seam exists so tests can substitute a
/// stub instead of a live HTTP endpoint.
#[async_trait]
pub trait ExportClient: Send + Sync {
    /// Requests a generated project archive for the given parameters.
    async fn fetch_archive(&self, request: &GenerationRequest) -> Result<Vec<u8>>;
}

/// HTTP client for a live export endpoint.
pub struct HttpExportClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpExportClient {
    /// Creates a client for the service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ExportClient for HttpExportClient {
    async fn fetch_archive(&self, request: &GenerationRequest) -> Result<Vec<u8>> {
        let url = format!("{}/api/export/zip", self.base_url.trim_end_matches('/'));

        tracing::info!(url = %url, template = %request.template, "requesting export archive");

        let response = self.http.post(&url).json(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            // Surface the body verbatim; the service reports generation
            // errors as plain text.
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Fetch {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Downloads and unpacks export archives into per-test directories.
pub struct ArtifactFetcher<C> {
    client: C,
    output_dir: PathBuf,
}

impl<C: ExportClient> ArtifactFetcher<C> {
    /// Creates a fetcher writing under `output_dir`.
    pub fn new(client: C, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            output_dir: output_dir.into(),
        }
    }

    /// Fetches the archive for `config` and extracts it.
    ///
    /// The archive lands at `{output_dir}/{id}.zip` and the tree at
    /// `{output_dir}/{id}/`. A pre-existing extraction directory is removed
    /// first so re-runs start clean.
    pub async fn fetch(&self, config: &TestConfig) -> Result<PathBuf> {
        let bytes = self.client.fetch_archive(&config.generation).await?;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let archive_path = self.output_dir.join(format!("{}.zip", config.id));
        tokio::fs::write(&archive_path, &bytes).await?;

        tracing::info!(
            test_id = %config.id,
            archive = ?archive_path,
            bytes = bytes.len(),
            "archive downloaded"
        );

        let target = self.output_dir.join(&config.id);
        if target.exists() {
            tokio::fs::remove_dir_all(&target).await?;
        }
        tokio::fs::create_dir_all(&target).await?;

        extract_archive(&archive_path, &target).await?;
        Ok(target)
    }
}

/// Unpacks `archive` into `target` using the external `unzip` utility.
async fn extract_archive(archive: &Path, target: &Path) -> Result<()> {
    let output = Command::new("unzip")
        .arg("-o")
        .arg(archive)
        .arg("-d")
        .arg(target)
        .output()
        .await
        .map_err(|e| Error::Extraction {
            archive: archive.to_path_buf(),
            reason: format!("failed to run unzip: {}", e),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Extraction {
            archive: archive.to_path_buf(),
            reason: format!("unzip exited with {}: {}", output.status, stderr.trim()),
        });
    }

    Ok(())
}
