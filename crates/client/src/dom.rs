//! DOM queries used by the title pipeline.
//!
//! Every function parses its input, answers, and drops the document before
//! returning; `scraper::Html` is never held across an await point.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Node, Selector};

static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").expect("invalid selector"));
static META_CHARSET: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[charset]").expect("invalid selector"));
static META_HTTP_EQUIV: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[http-equiv]").expect("invalid selector"));

/// Text content of the first `<title>` element.
pub fn query_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&TITLE)
        .next()
        .map(|title| title.text().collect::<String>())
}

/// Value of the first `<meta charset>` attribute.
pub fn query_charset(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&META_CHARSET)
        .next()
        .and_then(|meta| meta.value().attr("charset"))
        .map(str::to_string)
}

/// `content` of the first `<meta http-equiv="Content-Type">`.
pub fn query_content_type(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&META_HTTP_EQUIV)
        .find(|meta| {
            meta.value()
                .attr("http-equiv")
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("content-type"))
        })
        .and_then(|meta| meta.value().attr("content"))
        .map(str::to_string)
}

/// Document text with a newline appended inside every `<br>` and `<p>`.
///
/// Plain text extraction collapses block structure; embed markup relies on
/// `<p>` and `<br>` for its line breaks. Returns `None` for empty text.
pub fn pretty_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let mut out = String::new();
    append_text(document.root_element(), &mut out);
    if out.is_empty() { None } else { Some(out) }
}

fn append_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    append_text(child, out);
                }
            }
            _ => {}
        }
    }
    if matches!(element.value().name(), "br" | "p") {
        out.push('\n');
    }
}

/// Check that in-process parsing actually works.
pub fn probe() -> bool {
    query_title("<title>test</title>").as_deref() == Some("test")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_title() {
        let html = "<html><head><title>  Hello\n World </title></head><body></body></html>";
        assert_eq!(query_title(html).as_deref(), Some("  Hello\n World "));
    }

    #[test]
    fn test_query_title_missing() {
        assert_eq!(query_title("<html><body><p>no title</p></body></html>"), None);
    }

    #[test]
    fn test_query_title_first_wins() {
        let html = "<title>First</title><svg><title>Second</title></svg>";
        assert_eq!(query_title(html).as_deref(), Some("First"));
    }

    #[test]
    fn test_query_charset() {
        let html = r#"<html><head><meta charset="Shift_JIS"><title>x</title></head></html>"#;
        assert_eq!(query_charset(html).as_deref(), Some("Shift_JIS"));
        assert_eq!(query_charset("<title>x</title>"), None);
    }

    #[test]
    fn test_query_content_type() {
        let html = r#"<head><meta http-equiv="Content-Type" content="text/html; charset=EUC-JP"></head>"#;
        assert_eq!(query_content_type(html).as_deref(), Some("text/html; charset=EUC-JP"));
    }

    #[test]
    fn test_query_content_type_case_insensitive() {
        let html = r#"<head><meta http-equiv="refresh" content="5"><meta http-equiv="content-type" content="text/html; charset=utf-8"></head>"#;
        assert_eq!(query_content_type(html).as_deref(), Some("text/html; charset=utf-8"));
    }

    #[test]
    fn test_pretty_text_line_breaks() {
        let html = r#"<blockquote class="twitter-tweet"><p lang="en" dir="ltr">first line<br>second line</p>&mdash; Someone (@someone) <a href="https://twitter.com/someone/status/1">June 1, 2020</a></blockquote>"#;
        let text = pretty_text(html).unwrap();
        assert!(text.starts_with("first line\nsecond line\n"), "got {text:?}");
        assert!(text.contains("— Someone (@someone) June 1, 2020"));
    }

    #[test]
    fn test_pretty_text_empty() {
        assert_eq!(pretty_text(""), None);
    }

    #[test]
    fn test_probe() {
        assert!(probe());
    }
}
