//! Title resolution pipeline for titlefix.
//!
//! This crate provides the network fetcher, encoding detection, title
//! extraction, the parser proxy (in-process or delegate thread), the
//! specialized embed lookup, and the resolution service that ties them
//! together with the cache from `titlefix-core`.

pub mod dom;
pub mod embed;
pub mod encoding;
pub mod extract;
pub mod fetch;
pub mod guard;
pub mod listener;
pub mod offscreen;
pub mod parser;
pub mod resolve;
pub mod sweeper;

pub use embed::{EmbedClient, is_status_url};
pub use encoding::{Encoding, detect_encoding};
pub use extract::{extract_title, normalize_title};
pub use fetch::{FetchConfig, FetchResponse, Fetcher};
pub use guard::{MAX_TITLE_CHARS, should_replace};
pub use listener::{Dispatch, on_message};
pub use parser::{DelegateParser, HtmlParser, LocalParser, ParseRequest, select_parser};
pub use resolve::{Resolution, TitleResolver};
pub use sweeper::spawn_sweeper;
