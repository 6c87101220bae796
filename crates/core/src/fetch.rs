//! Page fetching from local files and remote URLs.
//!
//! Both strategies implement [`PageFetcher`]. `try_fetch` reports what went
//! wrong; `fetch` keeps the crawler contract of never failing and signalling
//! an unavailable page with an empty string.

use std::future::Future;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use reqwest::redirect::Policy;
use url::Url;

use crate::{MirrorError, Result};

/// HTTP client configuration for fetching web pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Per-request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
    /// Maximum number of redirects followed per request.
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: concat!("mdmirror/", env!("CARGO_PKG_VERSION")).to_string(),
            max_redirects: 10,
        }
    }
}

/// Retrieves raw HTML for an address.
///
/// Callers depend only on this trait; the crawler is generic over it.
pub trait PageFetcher: Send + Sync {
    /// Fetches `address`, reporting failures as errors.
    fn try_fetch(&self, address: &str) -> impl Future<Output = Result<String>> + Send;

    /// Fetches `address`, returning an empty string when the page is unavailable.
    ///
    /// Failures are logged at warn level and never propagated. An empty
    /// result means "page unavailable", not "page is literally empty".
    fn fetch(&self, address: &str) -> impl Future<Output = String> + Send {
        async move {
            match self.try_fetch(address).await {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(address, error = %e, "could not fetch page");
                    String::new()
                }
            }
        }
    }

    /// Releases resources owned by the fetcher.
    fn close(self)
    where
        Self: Sized,
    {
    }
}

/// Reads pages from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetcher;

impl PageFetcher for FileFetcher {
    async fn try_fetch(&self, address: &str) -> Result<String> {
        let path = PathBuf::from(address);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(MirrorError::FileNotFound(path)),
            Err(e) if e.kind() == ErrorKind::InvalidData => Err(MirrorError::InvalidEncoding),
            Err(e) => Err(MirrorError::Io(e)),
        }
    }
}

/// Fetches pages over HTTP(S).
///
/// Owns one connection pool; release it with [`PageFetcher::close`] once the
/// crawl is done.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: u64,
}

impl HttpFetcher {
    /// Builds the client (and its pool) from `config`.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(config.user_agent.as_str())
            .redirect(Policy::limited(config.max_redirects))
            .build()
            .map_err(MirrorError::HttpError)?;

        Ok(Self { client, timeout: config.timeout })
    }
}

impl PageFetcher for HttpFetcher {
    async fn try_fetch(&self, address: &str) -> Result<String> {
        let url = Url::parse(address).map_err(|e| MirrorError::InvalidUrl(format!("{address}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(MirrorError::InvalidUrl(format!(
                "{address}: URL must use http:// or https://"
            )));
        }

        let response = self
            .client
            .get(url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() { MirrorError::Timeout { timeout: self.timeout } } else { MirrorError::HttpError(e) }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MirrorError::HttpStatus { status: status.as_u16(), url: address.to_string() });
        }

        Ok(response.text().await?)
    }

    fn close(self) {
        tracing::debug!("closing HTTP connection pool");
        drop(self.client);
    }
}

/// Reads HTML content from standard input.
///
/// This function reads all available input from stdin until EOF.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|e| {
        if e.kind() == ErrorKind::InvalidData { MirrorError::InvalidEncoding } else { MirrorError::Io(e) }
    })?;

    Ok(buffer)
}
