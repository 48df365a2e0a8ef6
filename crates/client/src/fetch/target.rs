//! Checks on resolution targets before anything is fetched.

use url::Url;

/// Document types that never carry an HTML `<title>`.
const UNSUPPORTED_EXTENSIONS: &[&str] = &[".pdf"];

/// Parse an absolute http(s) URL.
pub fn parse_http_url(input: &str) -> Result<Url, titlefix_core::Error> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(titlefix_core::Error::InvalidUrl("empty URL".into()));
    }

    let url = Url::parse(trimmed).map_err(|e| titlefix_core::Error::InvalidUrl(format!("{trimmed}: {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(titlefix_core::Error::InvalidUrl(format!("unsupported scheme: {scheme}"))),
    }
}

/// Whether the URL points at a non-HTML document such as a PDF.
///
/// Both the raw string and the parsed path are checked, so `report.PDF?dl=1`
/// is caught as well.
pub fn is_unsupported_document(url: &str) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    if UNSUPPORTED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        return true;
    }
    Url::parse(&lower)
        .map(|u| UNSUPPORTED_EXTENSIONS.iter().any(|ext| u.path().ends_with(ext)))
        .unwrap_or(false)
}
