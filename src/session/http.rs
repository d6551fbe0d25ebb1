//! HTTP session implementation
//!
//! Pages are fetched as served markup; the catalog renders every field the
//! archiver reads on the server, so no script execution is needed. The
//! operator's cookie header is attached only to requests on the catalog's own
//! site (its host and subdomains, on the catalog's port), so third-party images
//! in descriptions never see it.

use crate::config::SessionConfig;
use crate::session::{HttpResponse, RenderedPage, Session, SessionError, SessionResult};
use async_trait::async_trait;
use reqwest::header::{HeaderValue, COOKIE};
use reqwest::{Client, Response};
use std::time::Duration;
use url::{Host, Url};

/// Builds the HTTP client shared by page loads and downloads
pub fn build_http_client(config: &SessionConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Session backed by a reqwest client and the operator's cookie header
#[derive(Debug, Clone)]
pub struct HttpSession {
    client: Client,
    scope: CookieScope,
    cookie: Option<HeaderValue>,
}

impl HttpSession {
    /// Creates a session for the catalog at `base_url`
    ///
    /// # Arguments
    ///
    /// * `config` - Session configuration (timeouts, user agent)
    /// * `base_url` - Catalog root; its site receives the cookie
    /// * `cookie` - `Cookie` header value copied from the operator's browser
    pub fn new(
        config: &SessionConfig,
        base_url: &Url,
        cookie: Option<&str>,
    ) -> SessionResult<Self> {
        let cookie = cookie
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|c| {
                HeaderValue::from_str(c).map_err(|e| SessionError::InvalidCookie(e.to_string()))
            })
            .transpose()?;

        Ok(Self {
            client: build_http_client(config)?,
            scope: CookieScope::for_base(base_url),
            cookie,
        })
    }

    /// Sends a GET, attaching the cookie when `url` is on the catalog site
    async fn get(&self, url: &Url) -> SessionResult<Response> {
        let mut request = self.client.get(url.clone());
        if let Some(cookie) = &self.cookie {
            if self.scope.covers(url) {
                request = request.header(COOKIE, cookie.clone());
            }
        }

        request.send().await.map_err(|e| transport_error(url, e))
    }
}

#[async_trait]
impl Session for HttpSession {
    async fn navigate(&self, url: &Url) -> SessionResult<RenderedPage> {
        tracing::debug!("Navigating to {}", url);
        let response = self.get(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::Navigation {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(url, e))?;
        Ok(RenderedPage::new(final_url, body))
    }

    async fn authenticated_get(&self, url: &Url) -> SessionResult<HttpResponse> {
        let response = self.get(url).await?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(url, e))?;
        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// Hosts that receive the operator's cookie
///
/// Follows a `Domain=` cookie set on the catalog's site: the catalog host and
/// its subdomains, with a leading `www.` dropped so sibling hosts such as
/// `static.` match. IP hosts match exactly. Unlike a browser jar the port must
/// also be the catalog's.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CookieScope {
    site: String,
    is_domain: bool,
    port: Option<u16>,
}

impl CookieScope {
    fn for_base(base_url: &Url) -> Self {
        let (site, is_domain) = match base_url.host() {
            Some(Host::Domain(domain)) => {
                let domain = domain.to_ascii_lowercase();
                let site = domain.strip_prefix("www.").unwrap_or(&domain).to_string();
                (site, true)
            }
            Some(host) => (host.to_string(), false),
            None => (String::new(), false),
        };

        Self {
            site,
            is_domain,
            port: base_url.port_or_known_default(),
        }
    }

    fn covers(&self, url: &Url) -> bool {
        if !matches!(url.scheme(), "http" | "https") || url.port_or_known_default() != self.port {
            return false;
        }

        match url.host() {
            Some(Host::Domain(domain)) if self.is_domain => {
                let domain = domain.to_ascii_lowercase();
                domain == self.site || domain.ends_with(&format!(".{}", self.site))
            }
            Some(host) => !self.is_domain && host.to_string() == self.site,
            None => false,
        }
    }
}

/// Classifies a reqwest failure into a transport error
fn transport_error(url: &Url, error: reqwest::Error) -> SessionError {
    let message = if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection refused".to_string()
    } else {
        error.to_string()
    };

    SessionError::Transport {
        url: url.to_string(),
        message,
    }
}
