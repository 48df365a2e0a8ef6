//! Core types and shared functionality for titlefix.
//!
//! This crate provides:
//! - Title cache with SQLite backend
//! - Unified error types
//! - Configuration structures
//! - Wire message types exchanged across the dispatch and parser boundaries

pub mod cache;
pub mod config;
pub mod error;
pub mod message;

pub use cache::{CacheDb, TitleEntry};
pub use config::{AppConfig, ConfigError, ParserMode};
pub use error::Error;
pub use message::{BackgroundMessage, BackgroundResponse, OffscreenMessage, OffscreenResponse};
