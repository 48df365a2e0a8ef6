//! Title resolution service.
//!
//! ### Pipeline
//! 1. Unsupported documents (PDF) are skipped without touching the network
//!    or the cache.
//! 2. Any cache entry is final, a cached failure included.
//! 3. Status posts go through the embed API first.
//! 4. Everything else, and status posts the embed API could not answer, is
//!    fetched and its `<title>` extracted, trimmed and newline-collapsed.
//! 5. The outcome is written to the cache in the background, absent or not.
//!
//! Failures never escape [`TitleResolver::resolve`]: they are logged and the
//! title is absent.

use std::sync::Arc;

use titlefix_core::{AppConfig, CacheDb, Error};
use tokio::task::JoinHandle;

use crate::embed::{EmbedClient, is_status_url};
use crate::extract::{extract_title, normalize_title};
use crate::fetch::{FetchConfig, Fetcher, is_unsupported_document};
use crate::parser::{HtmlParser, select_parser};

/// Outcome of one resolution plus the pending cache write, if any.
#[derive(Debug)]
pub struct Resolution {
    pub title: Option<String>,
    /// Background cache write; `None` when nothing is written (PDFs, cache hits).
    pub write: Option<JoinHandle<()>>,
}

/// Resolves full titles for search result URLs.
#[derive(Clone)]
pub struct TitleResolver {
    cache: CacheDb,
    fetcher: Fetcher,
    embed: EmbedClient,
    parser: Arc<dyn HtmlParser>,
}

impl std::fmt::Debug for TitleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TitleResolver")
            .field("fetcher", &self.fetcher)
            .field("embed", &self.embed.endpoint().as_str())
            .field("parser", &self.parser.name())
            .finish_non_exhaustive()
    }
}

impl TitleResolver {
    /// Build the resolver and its collaborators from configuration.
    pub fn new(cache: CacheDb, config: &AppConfig) -> Result<Self, Error> {
        let fetcher = Fetcher::new(FetchConfig::from(config))?;
        let embed = EmbedClient::from_config(fetcher.clone(), config)?;
        let parser = select_parser(config.parser_mode);
        Ok(Self::with_parts(cache, fetcher, embed, parser))
    }

    pub fn with_parts(cache: CacheDb, fetcher: Fetcher, embed: EmbedClient, parser: Arc<dyn HtmlParser>) -> Self {
        Self { cache, fetcher, embed, parser }
    }

    /// Resolve the full title of `url`.
    pub async fn resolve(&self, url: &str) -> Option<String> {
        self.resolve_tracked(url).await.title
    }

    /// Resolve `url` and hand back the background cache write.
    ///
    /// Dropping the handle does not cancel the write.
    pub async fn resolve_tracked(&self, url: &str) -> Resolution {
        if is_unsupported_document(url) {
            tracing::debug!(%url, "skipping unsupported document");
            return Resolution { title: None, write: None };
        }

        match self.cache.get_entry(url).await {
            Ok(Some(entry)) => {
                tracing::debug!(%url, cached = entry.title.is_some(), "cache hit");
                return Resolution { title: entry.title, write: None };
            }
            Ok(None) => {}
            Err(e) => tracing::error!(%url, error = %e, "cache read failed; treating as a miss"),
        }

        let title = match self.lookup_embed(url).await {
            Some(title) => Some(title),
            None => self.fetch_title(url).await,
        };

        let write = self.spawn_cache_write(url, title.clone());
        Resolution { title, write: Some(write) }
    }

    async fn lookup_embed(&self, url: &str) -> Option<String> {
        if !is_status_url(url) {
            return None;
        }
        match self.embed.lookup(url, self.parser.as_ref()).await {
            Ok(title) => title,
            Err(e) => {
                tracing::error!(%url, error = %e, "embed lookup failed");
                None
            }
        }
    }

    async fn fetch_title(&self, url: &str) -> Option<String> {
        let extracted = match self.fetcher.fetch(url).await {
            Ok(response) => extract_title(self.parser.as_ref(), &response).await,
            Err(e) => Err(e),
        };

        match extracted {
            Ok(title) => title.map(|raw| normalize_title(&raw)),
            Err(e @ Error::UnknownEncoding(_)) => {
                tracing::warn!(%url, error = %e, "could not determine page encoding");
                None
            }
            Err(e) => {
                tracing::error!(%url, error = %e, "title fetch failed");
                None
            }
        }
    }

    fn spawn_cache_write(&self, url: &str, title: Option<String>) -> JoinHandle<()> {
        let cache = self.cache.clone();
        let url = url.to_string();
        tokio::spawn(async move {
            if let Err(e) = cache.put_title(&url, title.as_deref()).await {
                tracing::error!(%url, ?title, error = %e, "cache write failed");
            }
        })
    }

    pub fn cache(&self) -> &CacheDb {
        &self.cache
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }
}
