//! Image staging — download source images into the local staging directory.
//!
//! Staged filenames are deterministic (`{prefix}{ext}`), so a re-run over the
//! same input finds its files already on disk and performs no network I/O.
//! Every network or filesystem failure is absorbed here and surfaces to the
//! caller as `None`; the acquisition pipeline treats that as an ordinary
//! unreachable candidate.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{Error, Result};

/// A downloaded image staged on the local filesystem
#[derive(Debug, Clone)]
pub struct StagedFile {
    /// Absolute or staging-relative path of the staged bytes
    pub path: PathBuf,
    /// Content type, from the download response or the HEAD probe; `None`
    /// when the file was already staged and no probe was needed
    pub content_type: Option<String>,
    /// Bare filename (`{prefix}{ext}`), reused as the object key on publish
    pub filename: String,
}

/// Trait for acquiring source images into the staging directory
///
/// The migration pipeline is written against this seam so tests can swap in
/// an in-memory fake; [`HttpFetcher`] is the real implementation.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Stage the image at `url` under `staging_dir` with the given filename
    /// prefix. Returns `None` on any failure — errors never propagate.
    async fn fetch(
        &self,
        url: &str,
        staging_dir: &Path,
        name_prefix: &str,
    ) -> Option<StagedFile>;
}

/// HTTP image fetcher backed by a shared reqwest client
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with a default client
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Resolve the file extension for `url`, probing the server with a HEAD
    /// request when the path itself carries no extension.
    ///
    /// Returns the extension (with leading dot) and the probed content type,
    /// if a probe was made.
    async fn resolve_extension(&self, raw_url: &str, url: &Url) -> Result<(String, Option<String>)> {
        if let Some(ext) = extension_from_path(url) {
            return Ok((ext, None));
        }

        let response = self.client.head(raw_url).send().await?.error_for_status()?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let ext = content_type
            .as_deref()
            .map(media_type_extension)
            .unwrap_or(FALLBACK_EXTENSION);

        Ok((ext.to_string(), content_type))
    }

    async fn fetch_inner(
        &self,
        raw_url: &str,
        staging_dir: &Path,
        name_prefix: &str,
    ) -> Result<StagedFile> {
        let url = Url::parse(raw_url).map_err(|e| Error::InvalidUrl(format!("{raw_url}: {e}")))?;

        let (ext, probed_content_type) = self.resolve_extension(raw_url, &url).await?;
        let filename = format!("{name_prefix}{ext}");
        let path = staging_dir.join(&filename);

        if tokio::fs::try_exists(&path).await? {
            tracing::debug!(file = %filename, "image already staged, skipping download");
            return Ok(StagedFile {
                path,
                content_type: probed_content_type,
                filename,
            });
        }

        let response = self.client.get(raw_url).send().await?.error_for_status()?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;

        tokio::fs::write(&path, &bytes).await?;

        Ok(StagedFile {
            path,
            content_type,
            filename,
        })
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &str,
        staging_dir: &Path,
        name_prefix: &str,
    ) -> Option<StagedFile> {
        match self.fetch_inner(url, staging_dir, name_prefix).await {
            Ok(staged) => Some(staged),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "failed to stage image");
                None
            }
        }
    }
}

/// Extension used when neither the URL path nor the probe yields one
const FALLBACK_EXTENSION: &str = ".jpg";

/// Extract an extension (with leading dot) from the URL path component
fn extension_from_path(url: &Url) -> Option<String> {
    Path::new(url.path())
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
}

/// Map a media type to a file extension
///
/// Parameters (`; charset=…`) are ignored; unknown types fall back to `.jpg`.
fn media_type_extension(content_type: &str) -> &'static str {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim();
    match media_type {
        "image/jpeg" => ".jpg",
        "image/png" => ".png",
        "image/webp" => ".webp",
        _ => FALLBACK_EXTENSION,
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn media_type_extension_table() {
        assert_eq!(media_type_extension("image/jpeg"), ".jpg");
        assert_eq!(media_type_extension("image/png"), ".png");
        assert_eq!(media_type_extension("image/webp"), ".webp");
        assert_eq!(media_type_extension("image/gif"), ".jpg");
        assert_eq!(media_type_extension("text/html"), ".jpg");
        assert_eq!(media_type_extension("image/png; charset=binary"), ".png");
    }

    #[test]
    fn extension_from_path_cases() {
        let with_ext = Url::parse("http://img.test/photos/rose.png?size=large").unwrap();
        assert_eq!(extension_from_path(&with_ext).as_deref(), Some(".png"));

        let without_ext = Url::parse("http://img.test/photos/rose").unwrap();
        assert_eq!(extension_from_path(&without_ext), None);

        let root = Url::parse("http://img.test/").unwrap();
        assert_eq!(extension_from_path(&root), None);
    }

    #[tokio::test]
    async fn downloads_and_stages_bytes_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/plants/fern.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(b"png-bytes".to_vec()),
            )
            .expect(1)
            .mount(&server)
            .await;

        let staging = TempDir::new().unwrap();
        let fetcher = HttpFetcher::new();
        let url = format!("{}/plants/fern.png", server.uri());

        let staged = fetcher
            .fetch(&url, staging.path(), "7_fern_original1")
            .await
            .unwrap();

        assert_eq!(staged.filename, "7_fern_original1.png");
        assert_eq!(staged.content_type.as_deref(), Some("image/png"));
        let bytes = tokio::fs::read(&staged.path).await.unwrap();
        assert_eq!(bytes, b"png-bytes");
    }

    #[tokio::test]
    async fn infers_extension_from_head_probe() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/image"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-type", "image/webp"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/image"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/webp")
                    .set_body_bytes(b"webp-bytes".to_vec()),
            )
            .expect(1)
            .mount(&server)
            .await;

        let staging = TempDir::new().unwrap();
        let fetcher = HttpFetcher::new();
        let url = format!("{}/image", server.uri());

        let staged = fetcher
            .fetch(&url, staging.path(), "3_orchid_original1")
            .await
            .unwrap();

        assert_eq!(staged.filename, "3_orchid_original1.webp");
        assert!(staged.path.to_string_lossy().ends_with(".webp"));
    }

    #[tokio::test]
    async fn probe_without_content_type_falls_back_to_jpg() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/mystery"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/mystery"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"bytes".to_vec()))
            .mount(&server)
            .await;

        let staging = TempDir::new().unwrap();
        let fetcher = HttpFetcher::new();
        let url = format!("{}/mystery", server.uri());

        let staged = fetcher
            .fetch(&url, staging.path(), "9_unknown_backup1")
            .await
            .unwrap();

        assert_eq!(staged.filename, "9_unknown_backup1.jpg");
    }

    #[tokio::test]
    async fn already_staged_file_short_circuits_network() {
        let staging = TempDir::new().unwrap();
        tokio::fs::write(staging.path().join("4_ivy_original1.jpg"), b"cached")
            .await
            .unwrap();

        // Port 9 (discard) refuses connections; any network attempt would fail
        let fetcher = HttpFetcher::new();
        let staged = fetcher
            .fetch(
                "http://127.0.0.1:9/photos/ivy.jpg",
                staging.path(),
                "4_ivy_original1",
            )
            .await
            .unwrap();

        assert_eq!(staged.filename, "4_ivy_original1.jpg");
        assert_eq!(staged.content_type, None);
        let bytes = tokio::fs::read(&staged.path).await.unwrap();
        assert_eq!(bytes, b"cached");
    }

    #[tokio::test]
    async fn http_error_status_is_absorbed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone.jpg"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let staging = TempDir::new().unwrap();
        let fetcher = HttpFetcher::new();
        let url = format!("{}/gone.jpg", server.uri());

        assert!(fetcher.fetch(&url, staging.path(), "1_x_original1").await.is_none());
        // Nothing staged on failure
        assert!(!staging.path().join("1_x_original1.jpg").exists());
    }

    #[tokio::test]
    async fn connection_failure_is_absorbed() {
        let staging = TempDir::new().unwrap();
        let fetcher = HttpFetcher::new();

        let result = fetcher
            .fetch(
                "http://127.0.0.1:9/dead/leaf.jpg",
                staging.path(),
                "2_x_original1",
            )
            .await;

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn unparseable_url_is_absorbed() {
        let staging = TempDir::new().unwrap();
        let fetcher = HttpFetcher::new();

        assert!(
            fetcher
                .fetch("not a url", staging.path(), "5_x_original1")
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn failed_head_probe_is_absorbed() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/forbidden"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let staging = TempDir::new().unwrap();
        let fetcher = HttpFetcher::new();
        let url = format!("{}/forbidden", server.uri());

        assert!(
            fetcher
                .fetch(&url, staging.path(), "6_x_original1")
                .await
                .is_none()
        );
    }
}
