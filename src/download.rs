use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Extensions kept as-is when inferred from a URL path
const ALLOWED_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".gif", ".webp"];

/// Extension used when the URL gives no usable one
const DEFAULT_EXTENSION: &str = ".jpg";

/// Errors surfaced by a single download attempt
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The request could not be sent or completed (network error, timeout)
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("server returned HTTP {0}")]
    HttpStatus(u16),

    /// The response body could not be written to disk
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Fetches one URL to one destination file.
///
/// A fetch owns no state beyond its HTTP client; success or failure of one
/// URL says nothing about the next, which is why the crawl loop can absorb
/// failures per candidate.
pub trait Fetcher {
    /// Fetch `url` and write the full body to `dest`, overwriting any
    /// existing file. Returns the number of bytes written.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, DownloadError>;
}

/// HTTP downloader with a bounded per-request timeout and redirects followed
#[derive(Debug, Clone)]
pub struct Downloader {
    client: reqwest::Client,
}

impl Downloader {
    /// Build a downloader whose requests abort after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, DownloadError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl Fetcher for Downloader {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, DownloadError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::HttpStatus(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        tokio::fs::write(dest, &bytes)
            .await
            .map_err(|source| DownloadError::Write {
                path: dest.to_path_buf(),
                source,
            })?;

        Ok(bytes.len() as u64)
    }
}

/// Infer a filename extension from a URL's trailing path segment.
///
/// Total: any URL, including unparseable ones, query-only paths, and
/// unknown extensions, maps into the allowlist, defaulting to `.jpg`.
pub fn file_extension(url: &str) -> &'static str {
    let Ok(parsed) = Url::parse(url) else {
        return DEFAULT_EXTENSION;
    };

    let segment = parsed.path().rsplit('/').next().unwrap_or("");
    let Some((_, ext)) = segment.rsplit_once('.') else {
        return DEFAULT_EXTENSION;
    };

    let dotted = format!(".{}", ext.to_ascii_lowercase());
    ALLOWED_EXTENSIONS
        .iter()
        .copied()
        .find(|allowed| *allowed == dotted)
        .unwrap_or(DEFAULT_EXTENSION)
}
