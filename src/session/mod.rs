//! Session capability
//!
//! The archiver never logs in by itself. An operator authenticates in their
//! own browser and hands the resulting session over; from then on every page
//! load and asset download goes through a [`Session`].
//!
//! - `Session`: navigate to a page, issue an authenticated GET
//! - `ReadySession`: a session the operator has confirmed as logged in
//! - `HttpSession`: the reqwest-backed implementation

mod http;

pub use http::{build_http_client, HttpSession};

use async_trait::async_trait;
use scraper::Html;
use thiserror::Error;
use url::Url;

/// Errors raised by the session capability
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Navigation to {url} failed with HTTP {status}")]
    Navigation { url: String, status: u16 },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Session is not authenticated: {0}")]
    NotAuthenticated(String),

    #[error("Invalid cookie header: {0}")]
    InvalidCookie(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// A page loaded through the session
#[derive(Debug, Clone)]
pub struct RenderedPage {
    url: Url,
    html: String,
}

impl RenderedPage {
    pub fn new(url: Url, html: impl Into<String>) -> Self {
        Self {
            url,
            html: html.into(),
        }
    }

    /// Final URL of the page, used to resolve relative references
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Parses the markup for selector evaluation
    ///
    /// `Html` is not `Send`; keep it out of `.await` points.
    pub fn document(&self) -> Html {
        Html::parse_document(&self.html)
    }
}

/// Raw response of an authenticated GET
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Page-loading and fetching capability of an authenticated browsing session
#[async_trait]
pub trait Session: Send + Sync {
    /// Loads a page; non-success statuses are errors
    async fn navigate(&self, url: &Url) -> SessionResult<RenderedPage>;

    /// Issues a GET carrying the session's credentials
    ///
    /// Returns the response whatever its status; only transport failures are
    /// errors.
    async fn authenticated_get(&self, url: &Url) -> SessionResult<HttpResponse>;
}

/// A session the operator has confirmed as authenticated
///
/// The archiver only accepts this wrapper, so confirmation is a precondition
/// enforced by the type rather than a pause inside the pipeline.
#[derive(Debug)]
pub struct ReadySession<S> {
    inner: S,
}

impl<S: Session> ReadySession<S> {
    /// Wraps a session after the operator confirmed the login
    pub fn operator_confirmed(inner: S) -> Self {
        tracing::debug!("Session marked ready by operator confirmation");
        Self { inner }
    }

    pub fn session(&self) -> &S {
        &self.inner
    }
}
