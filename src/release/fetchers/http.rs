//! HTTP fetcher for release assets

use std::path::Path;

use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::release::fetcher::Fetcher;
use crate::release::fetchers::archive;
use crate::version::error::FetchError;

/// File name used when the URL path has no usable last segment
const DEFAULT_FILE_NAME: &str = "download";

/// Downloads assets over HTTP and unpacks archives in place
///
/// The body is streamed into a temporary file inside the destination
/// directory, then unpacked on the blocking pool.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, destination: &Path, url: &str) -> Result<(), FetchError> {
        let mut response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let download = NamedTempFile::new_in(destination)?;
        let mut file = tokio::fs::File::from_std(download.reopen()?);
        let mut received: u64 = 0;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            received += chunk.len() as u64;
        }
        file.flush().await?;
        drop(file);

        let file_name = file_name_from_url(url);
        let destination = destination.to_path_buf();
        let kind = tokio::task::spawn_blocking(move || {
            archive::extract(download, &destination, &file_name)
        })
        .await
        .map_err(|e| FetchError::Archive(e.to_string()))??;
        debug!("Downloaded {} bytes from {} as {:?}", received, url, kind);

        Ok(())
    }
}

/// Last path segment of the requested URL, ignoring query and fragment
fn file_name_from_url(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|url| {
            url.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|name| !name.is_empty() && name != "." && name != "..")
        .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::fetchers::archive::tests::{gzip_bytes, tar_bytes};
    use std::io::Write;
    use mockito::Server;
    use rstest::rstest;
    use tempfile::TempDir;

    #[tokio::test]
    async fn fetch_stores_plain_asset_under_its_url_name() {
        let mut server = Server::new_async().await;
        let temp_dir = TempDir::new().unwrap();

        let mock = server
            .mock("GET", "/download/v0.14.1/fake-service-linux")
            .with_status(200)
            .with_body("binary")
            .create_async()
            .await;

        let url = format!("{}/download/v0.14.1/fake-service-linux", server.url());
        HttpFetcher::new(reqwest::Client::new())
            .fetch(temp_dir.path(), &url)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            std::fs::read(temp_dir.path().join("fake-service-linux")).unwrap(),
            b"binary"
        );
    }

    #[tokio::test]
    async fn fetch_unpacks_tar_gz_asset() {
        let mut server = Server::new_async().await;
        let temp_dir = TempDir::new().unwrap();

        let mock = server
            .mock("GET", "/download/tool-linux.tar.gz")
            .with_status(200)
            .with_body(gzip_bytes(&tar_bytes("tool", b"binary")))
            .create_async()
            .await;

        let url = format!("{}/download/tool-linux.tar.gz", server.url());
        HttpFetcher::new(reqwest::Client::new())
            .fetch(temp_dir.path(), &url)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(std::fs::read(temp_dir.path().join("tool")).unwrap(), b"binary");
        assert!(!temp_dir.path().join("tool-linux.tar.gz").exists());
    }

    #[tokio::test]
    async fn fetch_streams_chunked_body_to_disk() {
        let mut server = Server::new_async().await;
        let temp_dir = TempDir::new().unwrap();

        let chunk = vec![b'x'; 64 * 1024];
        let expected_len = chunk.len() * 8;
        let mock = server
            .mock("GET", "/download/v0.14.1/fake-service-linux")
            .with_status(200)
            .with_chunked_body(move |w| {
                for _ in 0..8 {
                    w.write_all(&chunk)?;
                }
                Ok(())
            })
            .create_async()
            .await;

        let url = format!("{}/download/v0.14.1/fake-service-linux", server.url());
        HttpFetcher::new(reqwest::Client::new())
            .fetch(temp_dir.path(), &url)
            .await
            .unwrap();

        mock.assert_async().await;
        let content = std::fs::read(temp_dir.path().join("fake-service-linux")).unwrap();
        assert_eq!(content.len(), expected_len);
        assert!(content.iter().all(|b| *b == b'x'));
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn fetch_unpacks_archive_split_across_chunks() {
        let mut server = Server::new_async().await;
        let temp_dir = TempDir::new().unwrap();

        let body = gzip_bytes(&tar_bytes("tool", &vec![b'y'; 100_000]));
        let mock = server
            .mock("GET", "/download/tool-linux.tar.gz")
            .with_status(200)
            .with_chunked_body(move |w| {
                for part in body.chunks(4096) {
                    w.write_all(part)?;
                }
                Ok(())
            })
            .create_async()
            .await;

        let url = format!("{}/download/tool-linux.tar.gz", server.url());
        HttpFetcher::new(reqwest::Client::new())
            .fetch(temp_dir.path(), &url)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(std::fs::read(temp_dir.path().join("tool")).unwrap().len(), 100_000);
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn fetch_returns_status_error_for_missing_asset() {
        let mut server = Server::new_async().await;
        let temp_dir = TempDir::new().unwrap();

        let mock = server
            .mock("GET", "/download/missing")
            .with_status(404)
            .create_async()
            .await;

        let url = format!("{}/download/missing", server.url());
        let result = HttpFetcher::new(reqwest::Client::new())
            .fetch(temp_dir.path(), &url)
            .await;

        mock.assert_async().await;
        assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
    }

    #[rstest]
    #[case("https://example.com/releases/download/v1.0.0/tool.zip", "tool.zip")]
    #[case("https://example.com/tool-linux?token=abc#frag", "tool-linux")]
    #[case("https://example.com/", "download")]
    #[case("not a url", "download")]
    fn file_name_from_url_uses_last_segment(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(file_name_from_url(url), expected);
    }
}
