//! Bounded-concurrency HTTP fetcher.
//!
//! ### Concurrency
//! - A semaphore caps the number of requests in flight (default 9: three
//!   result pages times three fetches each).
//! - The permit is held until the body is read and is released on every
//!   exit path, including timeouts.
//!
//! ### Timeouts
//! - Each fetch, body included, is bounded by `timeout`. On expiry the request
//!   is dropped and `FETCH_TIMEOUT` is returned.
//!
//! ### Credentials
//! - The client has no cookie store and sends no authorization headers.

pub mod target;

use bytes::Bytes;
use reqwest::Url;
use reqwest::{Client, StatusCode, header};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

pub use target::{is_unsupported_document, parse_http_url};

use titlefix_core::{AppConfig, Error};

/// Configuration for the fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "titlefix/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Per-fetch timeout (default: 30s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,

    /// Number of fetches allowed in flight at once (default: 9)
    pub max_concurrent: usize,

    /// Whether the system proxy settings apply (default: true)
    pub use_system_proxy: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "titlefix/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(30_000),
            max_redirects: 5,
            max_concurrent: 3 * 3,
            use_system_proxy: true,
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            max_concurrent: config.max_concurrent_fetches,
            use_system_proxy: config.use_system_proxy,
            ..Default::default()
        }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The URL requested
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Raw response body
    pub bytes: Bytes,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

/// Shared HTTP fetcher. Clones share the client and the permit pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    http: Client,
    config: FetchConfig,
    permits: Arc<Semaphore>,
    in_flight: Arc<AtomicUsize>,
}

/// Decrements the in-flight counter when dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Fetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        if config.max_concurrent == 0 {
            return Err(Error::InvalidInput("max_concurrent must be at least 1".into()));
        }

        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true);

        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        let http = builder
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {e}")))?;

        let permits = Arc::new(Semaphore::new(config.max_concurrent));

        Ok(Self { http, config, permits, in_flight: Arc::new(AtomicUsize::new(0)) })
    }

    /// Fetch a URL, returning the raw body and metadata.
    ///
    /// Waits for a permit first; the wait does not count against the timeout.
    pub async fn fetch(&self, url_str: &str) -> Result<FetchResponse, Error> {
        let url = parse_http_url(url_str)?;

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| Error::HttpError("fetcher is shut down".into()))?;
        let _in_flight = InFlight::enter(&self.in_flight);

        tokio::time::timeout(self.config.timeout, self.fetch_unbounded(url))
            .await
            .map_err(|_| Error::FetchTimeout(format!("{url_str}: no response within {:?}", self.config.timeout)))?
    }

    async fn fetch_unbounded(&self, url: Url) -> Result<FetchResponse, Error> {
        let start = Instant::now();

        let response = self
            .http
            .get(url.as_str())
            .header(header::ACCEPT, "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .send()
            .await
            .map_err(|e| Error::HttpError(format!("{url}: network error: {e}")))?;

        let status = response.status();

        if !status.is_success() {
            return Err(Error::HttpError(format!(
                "{url}: status {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            )));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{url}: {len} bytes exceeds {}", self.config.max_bytes)));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::HttpError(format!("{url}: failed to read response: {e}")))?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!(
                "{url}: {} bytes exceeds {}",
                bytes.len(),
                self.config.max_bytes
            )));
        }

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(%url, %final_url, fetch_ms, bytes = bytes.len(), "fetched");

        Ok(FetchResponse { url, final_url, status, content_type, bytes, fetch_ms })
    }

    /// Number of fetches currently holding a permit.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Permits not currently held.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }
}
