//! SQLite-backed cache of resolved page titles.
//!
//! This module provides a persistent title cache using SQLite with async
//! access via tokio-rusqlite. It supports:
//!
//! - URL-keyed storage, including failed resolutions
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Retention sweeps and per-domain purges

pub mod connection;
pub mod migrations;
pub mod titles;

pub use crate::Error;

pub use connection::CacheDb;
pub use titles::TitleEntry;
