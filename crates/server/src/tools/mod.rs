//! MCP tool implementations.
//!
//! This module contains all tools exposed by the titlefix server.

pub mod cache;
pub mod dispatch;
pub mod get_title;

pub use dispatch::{DispatchMessageParams, dispatch_impl};
pub use get_title::{GetTitleParams, get_title_impl};
