use futures::stream::StreamExt;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use crate::error::FetchError;

/// Source of raw asset bytes, keyed by URL
///
/// The pipeline is generic over this so tests can substitute a local mock
/// for the live HTTP client.
pub trait AssetSource {
    /// Retrieve `url` into `dest`, creating the file only on success
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError>;
}

/// Production asset source backed by a shared reqwest client
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(get_user_agent())
            .timeout(request_timeout)
            .build()?;

        Ok(HttpSource { client })
    }

    async fn stream_to_file(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(FetchError::BadStatus(status));
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| FetchError::io(dest, e))?;
        }

        // Chunked write: memory use is bounded by chunk size, not asset size
        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| FetchError::io(dest, e))?;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(FetchError::Transport)?;
            file.write_all(&chunk)
                .await
                .map_err(|e| FetchError::io(dest, e))?;
        }

        file.flush().await.map_err(|e| FetchError::io(dest, e))?;
        Ok(())
    }
}

impl AssetSource for HttpSource {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        let result = self.stream_to_file(url, dest).await;

        // Don't leave a partial file behind on a mid-stream failure
        if result.is_err() && dest.exists() {
            if let Err(cleanup_err) = tokio::fs::remove_file(dest).await {
                eprintln!("Failed to cleanup partial download: {}", cleanup_err);
            }
        }

        result
    }
}

/// Get standard user agent string
pub fn get_user_agent() -> &'static str {
    "HeroFetch"
}
