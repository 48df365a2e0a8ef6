//! HTML parser proxy.
//!
//! Callers parse through [`HtmlParser`] and never care where the parsing
//! happens. Two implementations exist:
//!
//! - [`LocalParser`] parses in-process.
//! - [`DelegateParser`] forwards serialized requests to a dedicated parser
//!   thread (the delegate context) and waits for its serialized answer.
//!
//! [`select_parser`] picks one from the configured [`ParserMode`]; in `auto`
//! mode a capability probe runs once and its result decides.

mod delegate;

pub use delegate::DelegateParser;

use std::sync::Arc;

use async_trait::async_trait;
use titlefix_core::{Error, OffscreenMessage, OffscreenResponse, ParserMode};

use crate::offscreen;

/// A parsing request; same shape as the delegate wire message.
pub type ParseRequest = OffscreenMessage;

/// Parses HTML wherever parsing is available.
#[async_trait]
pub trait HtmlParser: Send + Sync {
    /// Run one parsing request.
    async fn query(&self, request: ParseRequest) -> Result<OffscreenResponse, Error>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn query_title(&self, html: &str) -> Result<Option<String>, Error> {
        self.query(ParseRequest::QueryTitle { html: html.to_string() }).await
    }

    async fn query_charset(&self, html: &str) -> Result<Option<String>, Error> {
        self.query(ParseRequest::QueryCharset { html: html.to_string() }).await
    }

    async fn query_content_type(&self, html: &str) -> Result<Option<String>, Error> {
        self.query(ParseRequest::QueryContentType { html: html.to_string() })
            .await
    }

    /// Text of embed markup with `<br>`/`<p>` turned into newlines.
    async fn pretty_embed(&self, html: &str) -> Result<Option<String>, Error> {
        self.query(ParseRequest::PrettyTwitter { html: html.to_string() })
            .await
    }
}

/// In-process parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalParser;

#[async_trait]
impl HtmlParser for LocalParser {
    async fn query(&self, request: ParseRequest) -> Result<OffscreenResponse, Error> {
        Ok(offscreen::handle(&request))
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

/// Choose the parser implementation for this process.
///
/// Call once at startup and share the result.
pub fn select_parser(mode: ParserMode) -> Arc<dyn HtmlParser> {
    let parser: Arc<dyn HtmlParser> = match mode {
        ParserMode::Local => Arc::new(LocalParser),
        ParserMode::Delegate => Arc::new(DelegateParser::new()),
        ParserMode::Auto => {
            if crate::dom::probe() {
                Arc::new(LocalParser)
            } else {
                tracing::warn!("in-process HTML parsing failed the probe; using the parser delegate");
                Arc::new(DelegateParser::new())
            }
        }
    };
    tracing::info!(?mode, parser = parser.name(), "selected HTML parser");
    parser
}
