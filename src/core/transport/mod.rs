//! Transport layer for the MCP server.
//!
//! - **STDIO**: rmcp over standard input/output - feature: `stdio`
//! - **HTTP**: JSON-RPC over POST plus info endpoints - feature: `http`
//!
//! Each transport handles the connection lifecycle and delegates
//! message processing to [`McpServer`](crate::core::McpServer).

mod config;
mod error;
mod service;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::TransportService;

#[cfg(feature = "http")]
pub use config::HttpConfig;
