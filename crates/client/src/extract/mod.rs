//! Title extraction from fetched documents.
//!
//! ### Algorithm
//! - Decode the body as lossy UTF-8 to get a preview good enough for reading
//!   `<meta>` tags.
//! - Collect the three encoding signals and run [`detect_encoding`].
//! - UTF-8 documents are queried as-is; Shift_JIS and EUC-JP documents are
//!   transcoded from the raw bytes first.
//!
//! All parsing goes through the [`HtmlParser`] proxy. The title is returned
//! exactly as the document has it; see [`normalize_title`] for cleanup.

pub mod normalize;

pub use normalize::normalize_title;

use titlefix_core::Error;

use crate::encoding::{Encoding, detect_encoding};
use crate::fetch::FetchResponse;
use crate::parser::HtmlParser;

/// Raw text of the three encoding signals; empty when a signal is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectionSignals {
    pub http_content_type: String,
    pub meta_charset: String,
    pub meta_content_type: String,
}

impl DetectionSignals {
    /// Gather the signals from the response header and the document preview.
    pub async fn gather(parser: &dyn HtmlParser, content_type: Option<&str>, preview: &str) -> Result<Self, Error> {
        Ok(Self {
            http_content_type: content_type.unwrap_or_default().to_string(),
            meta_charset: parser.query_charset(preview).await?.unwrap_or_default(),
            meta_content_type: parser.query_content_type(preview).await?.unwrap_or_default(),
        })
    }

    pub fn detect(&self) -> Option<Encoding> {
        detect_encoding(&self.http_content_type, &self.meta_charset, &self.meta_content_type)
    }
}

/// Extract the raw `<title>` text of a fetched document.
///
/// Returns `Ok(None)` when the document has no title and
/// `Err(UnknownEncoding)` when the encoding signals are missing or disagree.
pub async fn extract_title(parser: &dyn HtmlParser, response: &FetchResponse) -> Result<Option<String>, Error> {
    let preview = String::from_utf8_lossy(&response.bytes);
    let signals = DetectionSignals::gather(parser, response.content_type.as_deref(), &preview).await?;

    let Some(encoding) = signals.detect() else {
        return Err(Error::UnknownEncoding(format!(
            "{}: header={:?} charset={:?} http-equiv={:?}",
            response.url, signals.http_content_type, signals.meta_charset, signals.meta_content_type
        )));
    };

    tracing::debug!(url = %response.url, ?encoding, "detected encoding");

    match encoding {
        Encoding::Utf8 => parser.query_title(&preview).await,
        Encoding::ShiftJis | Encoding::EucJp => {
            let decoded = encoding.codec().decode_without_bom_handling(&response.bytes).0;
            parser.query_title(&decoded).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{DelegateParser, LocalParser};
    use bytes::Bytes;
    use reqwest::{StatusCode, Url};

    fn response(content_type: Option<&str>, bytes: Vec<u8>) -> FetchResponse {
        let url = Url::parse("https://example.com/page").unwrap();
        FetchResponse {
            url: url.clone(),
            final_url: url,
            status: StatusCode::OK,
            content_type: content_type.map(str::to_string),
            bytes: Bytes::from(bytes),
            fetch_ms: 0,
        }
    }

    fn encode(encoding: &'static encoding_rs::Encoding, text: &str) -> Vec<u8> {
        encoding.encode(text).0.into_owned()
    }

    #[tokio::test]
    async fn test_utf8_from_header() {
        let resp = response(Some("text/html; charset=utf-8"), "<title>日本語のタイトル</title>".as_bytes().to_vec());
        let title = extract_title(&LocalParser, &resp).await.unwrap();
        assert_eq!(title.as_deref(), Some("日本語のタイトル"));
    }

    #[tokio::test]
    async fn test_shift_jis_from_meta_charset() {
        let html = r#"<html><head><meta charset="Shift_JIS"><title>検索結果のタイトル</title></head></html>"#;
        let resp = response(Some("text/html"), encode(encoding_rs::SHIFT_JIS, html));
        let title = extract_title(&LocalParser, &resp).await.unwrap();
        assert_eq!(title.as_deref(), Some("検索結果のタイトル"));
    }

    #[tokio::test]
    async fn test_euc_jp_from_http_equiv() {
        let html = r#"<html><head><meta http-equiv="Content-Type" content="text/html; charset=EUC-JP"><title>ニュース一覧</title></head></html>"#;
        let resp = response(None, encode(encoding_rs::EUC_JP, html));
        let title = extract_title(&LocalParser, &resp).await.unwrap();
        assert_eq!(title.as_deref(), Some("ニュース一覧"));
    }

    #[tokio::test]
    async fn test_conflicting_signals() {
        let html = r#"<meta charset="EUC-JP"><title>x</title>"#;
        let resp = response(Some("text/html; charset=Shift_JIS"), html.as_bytes().to_vec());
        let result = extract_title(&LocalParser, &resp).await;
        assert!(matches!(result, Err(Error::UnknownEncoding(_))));
    }

    #[tokio::test]
    async fn test_no_signals() {
        let resp = response(Some("text/html"), b"<title>x</title>".to_vec());
        let result = extract_title(&LocalParser, &resp).await;
        assert!(matches!(result, Err(Error::UnknownEncoding(_))));
    }

    #[tokio::test]
    async fn test_missing_title() {
        let resp = response(Some("text/html; charset=utf-8"), b"<html><body>hi</body></html>".to_vec());
        assert_eq!(extract_title(&LocalParser, &resp).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_title_is_not_trimmed() {
        let resp = response(Some("text/html; charset=utf-8"), b"<title>\n  Padded\n</title>".to_vec());
        let title = extract_title(&LocalParser, &resp).await.unwrap();
        assert_eq!(title.as_deref(), Some("\n  Padded\n"));
    }

    #[tokio::test]
    async fn test_through_delegate() {
        let html = r#"<meta charset="shift_jis"><title>委譲されたタイトル</title>"#;
        let resp = response(None, encode(encoding_rs::SHIFT_JIS, html));
        let parser = DelegateParser::new();
        let title = extract_title(&parser, &resp).await.unwrap();
        assert_eq!(title.as_deref(), Some("委譲されたタイトル"));
    }

    #[tokio::test]
    async fn test_gather_signals() {
        let preview = r#"<meta charset="utf-8"><meta http-equiv="content-type" content="text/html; charset=utf-8">"#;
        let signals = DetectionSignals::gather(&LocalParser, None, preview).await.unwrap();
        assert_eq!(signals.http_content_type, "");
        assert_eq!(signals.meta_charset, "utf-8");
        assert_eq!(signals.meta_content_type, "text/html; charset=utf-8");
        assert_eq!(signals.detect(), Some(Encoding::Utf8));
    }
}
