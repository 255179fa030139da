use crate::error::{HarvestError, Result};
use crate::results::{DownloadOutcome, DownloadRecord, DownloadReport};
use crate::utils::{file_name_for_url, numbered_file_name};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use url::Url;

/// Source of image bytes
#[allow(async_fn_in_trait)]
pub trait ImageFetcher {
    /// Stream the body behind `url` into `sink`, returning the number of bytes written
    async fn fetch<W: AsyncWrite + Unpin>(&self, url: &Url, sink: &mut W) -> Result<u64>;
}

/// Fetches images with plain HTTP GET requests
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl ImageFetcher for HttpFetcher {
    async fn fetch<W: AsyncWrite + Unpin>(&self, url: &Url, sink: &mut W) -> Result<u64> {
        let mut response = self.client.get(url.clone()).send().await?.error_for_status()?;

        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            sink.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        sink.flush().await?;

        Ok(written)
    }
}

/// Writes images into a folder, one after another, never overwriting existing files
pub struct Downloader<F> {
    fetcher: F,
    folder: PathBuf,
}

impl<F: ImageFetcher> Downloader<F> {
    pub fn new(fetcher: F, folder: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            folder: folder.into(),
        }
    }

    /// Download every URL in order.
    ///
    /// Only failing to create the destination folder aborts the batch; a URL
    /// that cannot be fetched or written is recorded as failed and the next
    /// one is attempted.
    pub async fn download_all(&self, urls: &[Url]) -> Result<DownloadReport> {
        if !fs::try_exists(&self.folder).await? {
            fs::create_dir_all(&self.folder).await?;
            ::log::debug!("Created folder: {}", self.folder.display());
        }

        let mut report = DownloadReport::default();
        for url in urls {
            report.records.push(self.download_one(url).await);
        }

        ::log::info!(
            "Downloaded {} of {} images ({} failed)",
            report.succeeded(),
            report.records.len(),
            report.failed()
        );
        Ok(report)
    }

    async fn download_one(&self, url: &Url) -> DownloadRecord {
        let file_name = file_name_for_url(url);

        let (path, mut file) = match reserve_file(&self.folder, &file_name).await {
            Ok(reserved) => reserved,
            Err(e) => return failed_record(url, None, HarvestError::image_fetch(url.as_str(), e)),
        };

        match self.fetcher.fetch(url, &mut file).await {
            Ok(bytes) => {
                ::log::debug!("Downloaded: {} -> {}", url, path.display());
                DownloadRecord {
                    url: url.to_string(),
                    path: Some(path),
                    outcome: DownloadOutcome::Saved { bytes },
                }
            }
            Err(e) => {
                drop(file);
                if let Err(remove_err) = fs::remove_file(&path).await {
                    ::log::warn!(
                        "Failed to remove partial file {}: {}",
                        path.display(),
                        remove_err
                    );
                }
                let error = match e {
                    HarvestError::ImageFetch { .. } => e,
                    other => HarvestError::image_fetch(url.as_str(), other),
                };
                failed_record(url, None, error)
            }
        }
    }
}

fn failed_record(url: &Url, path: Option<PathBuf>, error: HarvestError) -> DownloadRecord {
    ::log::warn!("{}", error);
    let reason = match error {
        HarvestError::ImageFetch { reason, .. } => reason,
        other => other.to_string(),
    };
    DownloadRecord {
        url: url.to_string(),
        path,
        outcome: DownloadOutcome::Failed { reason },
    }
}

/// Create the first free `name`, `name_1`, `name_2`, ... in `folder`.
///
/// Creation uses create-new semantics, so the existence check and the
/// reservation are a single atomic step even with other writers in the folder.
pub async fn reserve_file(folder: &Path, file_name: &str) -> std::io::Result<(PathBuf, File)> {
    let mut attempt = 0;
    loop {
        let path = folder.join(numbered_file_name(file_name, attempt));
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryFetcher, TestServer};
    use crate::utils::build_http_client;
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_collisions_get_numbered_suffixes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("photo.png"), b"original").unwrap();

        let fetcher = MemoryFetcher::default()
            .with_body("https://a.example.com/photo.png", b"first")
            .with_body("https://b.example.com/photo.png", b"second");
        let downloader = Downloader::new(fetcher, dir.path());

        let report = downloader
            .download_all(&[
                url("https://a.example.com/photo.png"),
                url("https://b.example.com/photo.png"),
            ])
            .await
            .unwrap();

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.records[0].path, Some(dir.path().join("photo_1.png")));
        assert_eq!(report.records[1].path, Some(dir.path().join("photo_2.png")));
        assert_eq!(std::fs::read(dir.path().join("photo.png")).unwrap(), b"original");
        assert_eq!(std::fs::read(dir.path().join("photo_1.png")).unwrap(), b"first");
        assert_eq!(std::fs::read(dir.path().join("photo_2.png")).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = MemoryFetcher::default()
            .with_body("https://example.com/a.png", b"aaa")
            .with_failure("https://example.com/b.png")
            .with_body("https://example.com/c.png", b"ccc");
        let downloader = Downloader::new(fetcher, dir.path());

        let report = downloader
            .download_all(&[
                url("https://example.com/a.png"),
                url("https://example.com/b.png"),
                url("https://example.com/c.png"),
            ])
            .await
            .unwrap();

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert!(matches!(
            report.records[1].outcome,
            DownloadOutcome::Failed { .. }
        ));
        assert_eq!(report.records[1].path, None);
        assert_eq!(
            report.records[2].outcome,
            DownloadOutcome::Saved { bytes: 3 }
        );
        assert!(dir.path().join("a.png").exists());
        assert!(!dir.path().join("b.png").exists());
        assert!(dir.path().join("c.png").exists());
    }

    #[tokio::test]
    async fn test_partial_file_is_removed_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher =
            MemoryFetcher::default().with_truncated("https://example.com/big.jpg", b"partial");
        let downloader = Downloader::new(fetcher, dir.path());

        let report = downloader
            .download_all(&[url("https://example.com/big.jpg")])
            .await
            .unwrap();

        assert_eq!(report.failed(), 1);
        assert!(!dir.path().join("big.jpg").exists());
    }

    #[tokio::test]
    async fn test_creates_missing_folder_and_uses_placeholder_name() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("nested").join("images");
        let fetcher = MemoryFetcher::default()
            .with_body("https://example.com/", b"root")
            .with_body("https://example.com/gallery/", b"gallery");
        let downloader = Downloader::new(fetcher, &folder);

        let report = downloader
            .download_all(&[
                url("https://example.com/"),
                url("https://example.com/gallery/"),
            ])
            .await
            .unwrap();

        assert_eq!(report.succeeded(), 2);
        assert_eq!(std::fs::read(folder.join("image")).unwrap(), b"root");
        assert_eq!(std::fs::read(folder.join("image_1")).unwrap(), b"gallery");
    }

    #[tokio::test]
    async fn test_reserve_file_skips_taken_names() {
        let dir = tempfile::tempdir().unwrap();
        let (first, _) = reserve_file(dir.path(), "photo.png").await.unwrap();
        let (second, _) = reserve_file(dir.path(), "photo.png").await.unwrap();
        let (third, _) = reserve_file(dir.path(), "photo.png").await.unwrap();

        assert_eq!(first, dir.path().join("photo.png"));
        assert_eq!(second, dir.path().join("photo_1.png"));
        assert_eq!(third, dir.path().join("photo_2.png"));
    }

    fn http_downloader(folder: &Path, connect_timeout: Duration) -> Downloader<HttpFetcher> {
        let client = build_http_client(&BTreeMap::new(), connect_timeout).unwrap();
        Downloader::new(HttpFetcher::new(client), folder)
    }

    #[tokio::test]
    async fn test_http_fetcher_streams_body_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let base = TestServer::default()
            .route("/photos/cat.png", 200, b"\x89PNG-cat-bytes")
            .start()
            .await;
        let downloader = http_downloader(dir.path(), Duration::from_secs(5));

        let report = downloader
            .download_all(&[base.join("photos/cat.png").unwrap()])
            .await
            .unwrap();

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.records[0].outcome, DownloadOutcome::Saved { bytes: 14 });
        assert_eq!(report.records[0].path, Some(dir.path().join("cat.png")));
        assert_eq!(
            std::fs::read(dir.path().join("cat.png")).unwrap(),
            b"\x89PNG-cat-bytes"
        );
    }

    #[tokio::test]
    async fn test_http_error_status_is_a_failed_record() {
        let dir = tempfile::tempdir().unwrap();
        let base = TestServer::default()
            .route("/gone.png", 410, b"<html>gone</html>")
            .start()
            .await;
        let downloader = http_downloader(dir.path(), Duration::from_secs(5));

        let report = downloader
            .download_all(&[
                base.join("missing.png").unwrap(),
                base.join("gone.png").unwrap(),
            ])
            .await
            .unwrap();

        assert_eq!(report.failed(), 2);
        for record in &report.records {
            assert!(matches!(record.outcome, DownloadOutcome::Failed { .. }));
            assert_eq!(record.path, None);
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_slow_body_outlasting_connect_timeout_still_completes() {
        let dir = tempfile::tempdir().unwrap();
        let base = TestServer::default()
            .slow_route("/slow.jpg", b"slow", Duration::from_millis(250))
            .start()
            .await;
        let downloader = http_downloader(dir.path(), Duration::from_millis(400));

        let report = downloader
            .download_all(&[base.join("slow.jpg").unwrap()])
            .await
            .unwrap();

        assert_eq!(report.succeeded(), 1);
        assert_eq!(std::fs::read(dir.path().join("slow.jpg")).unwrap(), b"slow");
    }
}
