//! Asset downloads through the authenticated session
//!
//! One attempt per call and no retry: a failed download is reported to the
//! caller, which decides whether the failure is fatal.

use crate::archive::store::ArchiveStore;
use crate::session::{Session, SessionError};
use crate::{ArchiveError, FetchError, FetchFailure};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::path::Path;
use url::Url;

/// Anything that can turn an asset URL into bytes
#[async_trait]
pub trait AssetSource: Send + Sync {
    async fn fetch_asset(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Downloads assets with the session's credentials
pub struct AssetDownloader<'a, S: ?Sized> {
    session: &'a S,
}

impl<'a, S: Session + ?Sized> AssetDownloader<'a, S> {
    pub fn new(session: &'a S) -> Self {
        Self { session }
    }

    /// Fetches the raw bytes at `url`
    ///
    /// # Errors
    ///
    /// A [`FetchError`] carrying the URL when it is not an http(s) URL, when
    /// the request fails in transit, or when the response status is not 2xx.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let parsed = Url::parse(url)
            .ok()
            .filter(|u| u.scheme() == "http" || u.scheme() == "https")
            .ok_or_else(|| FetchError::new(url, FetchFailure::InvalidUrl))?;

        let response = self
            .session
            .authenticated_get(&parsed)
            .await
            .map_err(|e| FetchError::new(url, transport_failure(e)))?;

        if !response.is_success() {
            return Err(FetchError::new(url, status_failure(response.status)));
        }

        tracing::debug!("Downloaded {} ({} bytes)", url, response.body.len());
        Ok(response.body)
    }
}

#[async_trait]
impl<'a, S: Session + ?Sized> AssetSource for AssetDownloader<'a, S> {
    async fn fetch_asset(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.download(url).await
    }
}

/// Downloads `url` and writes it to `path`
///
/// Fetch failures and write failures both propagate.
pub async fn download_to<A, St>(
    source: &A,
    store: &St,
    url: &str,
    path: &Path,
) -> Result<usize, ArchiveError>
where
    A: AssetSource + ?Sized,
    St: ArchiveStore + ?Sized,
{
    let bytes = source.fetch_asset(url).await?;
    store.write_bytes(path, &bytes).await?;
    Ok(bytes.len())
}

fn status_failure(status: u16) -> FetchFailure {
    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown Status")
        .to_string();
    FetchFailure::Status { status, reason }
}

fn transport_failure(error: SessionError) -> FetchFailure {
    match error {
        SessionError::Transport { message, .. } => FetchFailure::Transport(message),
        other => FetchFailure::Transport(other.to_string()),
    }
}
