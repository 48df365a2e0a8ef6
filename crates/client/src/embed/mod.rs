//! Specialized title lookup for social-media status posts.
//!
//! ### Specification
//!
//! - **Endpoint**: oEmbed, `https://publish.twitter.com/oembed` by default.
//! - **Query**: `url=<status url>&omit_script=t&lang=<language>`.
//! - **Payload**: `{ "html": "<blockquote>...</blockquote>", ... }`. Any other
//!   shape means "no title".
//! - **Text**: the embed markup is flattened with a newline after every `<br>`
//!   and `<p>`. The newlines are kept in the returned title.
//!
//! Requests go through the shared [`Fetcher`] and count against its
//! concurrency bound and timeout.

use serde::Deserialize;
use std::sync::LazyLock;

use regex::Regex;
use titlefix_core::{AppConfig, Error};
use url::Url;

use crate::fetch::{Fetcher, parse_http_url};
use crate::parser::HtmlParser;

/// Default oEmbed endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://publish.twitter.com/oembed";

/// Hosts that serve status posts.
const STATUS_HOSTS: &[&str] = &["twitter.com", "mobile.twitter.com", "x.com"];

static STATUS_PATH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^/\w+/status/\d+").expect("valid regex"));

/// Whether the URL is a status post served by the embed API.
pub fn is_status_url(url: &str) -> bool {
    let Ok(url) = Url::parse(url) else {
        return false;
    };
    let host_matches = url
        .host_str()
        .is_some_and(|host| STATUS_HOSTS.iter().any(|h| host.eq_ignore_ascii_case(h)));
    host_matches && STATUS_PATH.is_match(url.path())
}

/// The only part of the oEmbed payload we use.
#[derive(Debug, Deserialize)]
struct EmbedPayload {
    html: String,
}

/// Client for the oEmbed endpoint.
#[derive(Debug, Clone)]
pub struct EmbedClient {
    fetcher: Fetcher,
    endpoint: Url,
    language: String,
}

impl EmbedClient {
    pub fn new(fetcher: Fetcher, endpoint: &str, language: impl Into<String>) -> Result<Self, Error> {
        Ok(Self { fetcher, endpoint: parse_http_url(endpoint)?, language: language.into() })
    }

    pub fn from_config(fetcher: Fetcher, config: &AppConfig) -> Result<Self, Error> {
        Self::new(fetcher, &config.oembed_endpoint, config.language())
    }

    /// Request URL for one status post.
    pub fn request_url(&self, status_url: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("url", status_url)
            .append_pair("omit_script", "t")
            .append_pair("lang", &self.language);
        url
    }

    /// Look up the text of a status post.
    ///
    /// `Ok(None)` when the payload has no usable `html` or the markup has no
    /// text. Network and HTTP failures and non-JSON bodies are returned as errors.
    pub async fn lookup(&self, status_url: &str, parser: &dyn HtmlParser) -> Result<Option<String>, Error> {
        let request_url = self.request_url(status_url);
        tracing::debug!(url = %status_url, endpoint = %self.endpoint, "embed lookup");

        let response = self.fetcher.fetch(request_url.as_str()).await?;

        let value: serde_json::Value = serde_json::from_slice(&response.bytes)
            .map_err(|e| Error::EmbedFailed(format!("{request_url}: response is not JSON: {e}")))?;

        let payload = match EmbedPayload::deserialize(&value) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::debug!(url = %status_url, error = %e, "embed payload has no html");
                return Ok(None);
            }
        };

        parser.pretty_embed(&payload.html).await
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}
