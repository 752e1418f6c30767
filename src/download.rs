//! Delivery of exported artifacts as named files.
//!
//! `Downloader` stands in for a platform "save as" primitive. The CLI uses
//! `FileDownloader`, which writes into a directory.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::csv::CsvExport;

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("invalid filename: {0}")]
    InvalidFilename(String),

    #[error("write {path} failed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl crate::error::ErrorCode for DownloadError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidFilename(_) => "E_INVALID_FILENAME",
            Self::Io { .. } => "E_DOWNLOAD_IO",
        }
    }
}

#[async_trait::async_trait]
pub trait Downloader: Send + Sync {
    /// Deliver `bytes` under `filename`. Returns where the bytes ended up.
    ///
    /// # Errors
    ///
    /// Returns a [`DownloadError`] if the artifact cannot be delivered.
    async fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, DownloadError>;

    /// Deliver a CSV export under its own filename.
    ///
    /// # Errors
    ///
    /// See [`Downloader::deliver`].
    async fn deliver_csv(&self, export: &CsvExport) -> Result<PathBuf, DownloadError> {
        self.deliver(&export.filename, &export.bytes).await
    }
}

/// Writes artifacts into a fixed directory.
#[derive(Debug, Clone)]
pub struct FileDownloader {
    dir: PathBuf,
}

impl FileDownloader {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait::async_trait]
impl Downloader for FileDownloader {
    async fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, DownloadError> {
        // Only a bare file name; never let a caller-supplied name escape `dir`.
        let name = Path::new(filename)
            .file_name()
            .filter(|n| n.len() == filename.len())
            .ok_or_else(|| DownloadError::InvalidFilename(filename.to_string()))?;
        let path = self.dir.join(name);

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| DownloadError::Io { path: self.dir.clone(), source })?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| DownloadError::Io { path: path.clone(), source })?;

        info!(path = %path.display(), bytes = bytes.len(), "download: delivered");
        Ok(path)
    }
}

#[cfg(test)]
#[path = "download_test.rs"]
mod tests;
