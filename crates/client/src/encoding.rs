//! Character encoding detection from HTTP and HTML signals.
//!
//! Three signals are considered: the `Content-Type` response header, the
//! HTML5 `<meta charset>` attribute, and the HTML4
//! `<meta http-equiv="Content-Type" content="...">` attribute. Detection only
//! succeeds when every signal that names a supported encoding names the same
//! one; silence or disagreement yields `None`.

use std::sync::LazyLock;

use regex::Regex;

/// Encodings the extractor can convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Utf8,
    ShiftJis,
    EucJp,
}

impl Encoding {
    /// Detection order. A signal maps to the first encoding whose pattern matches.
    pub const ALL: [Encoding; 3] = [Encoding::Utf8, Encoding::ShiftJis, Encoding::EucJp];

    /// The `encoding_rs` codec for this encoding.
    pub fn codec(self) -> &'static encoding_rs::Encoding {
        match self {
            Encoding::Utf8 => encoding_rs::UTF_8,
            Encoding::ShiftJis => encoding_rs::SHIFT_JIS,
            Encoding::EucJp => encoding_rs::EUC_JP,
        }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            Encoding::Utf8 => &UTF8,
            Encoding::ShiftJis => &SHIFT_JIS,
            Encoding::EucJp => &EUC_JP,
        }
    }
}

static UTF8: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)UTF[-_]8").expect("valid regex"));
static SHIFT_JIS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Shift[-_]JIS").expect("valid regex"));
static EUC_JP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)EUC[-_]JP").expect("valid regex"));

/// Map one signal to the first encoding it names.
fn test_encoding(source: &str) -> Option<Encoding> {
    Encoding::ALL.into_iter().find(|e| e.pattern().is_match(source))
}

/// Infer the document encoding.
///
/// Each argument is the raw text of one signal; pass `""` when it is absent.
pub fn detect_encoding(http_content_type: &str, meta_charset: &str, meta_content_type: &str) -> Option<Encoding> {
    let mut found: Option<Encoding> = None;
    for encoding in [http_content_type, meta_charset, meta_content_type]
        .into_iter()
        .filter_map(test_encoding)
    {
        match found {
            None => found = Some(encoding),
            Some(previous) if previous != encoding => return None,
            Some(_) => {}
        }
    }
    found
}
