//! AytchMCP - a Model Context Protocol server.
//!
//! Exposes three tools (`echo`, `weather`, `calculator`), two resources
//! (`system://info`, `docs://content`) and a set of prompt templates over
//! STDIO or HTTP.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the server handler and transports
//! - **domains**: business logic organized by bounded contexts
//!   - **tools**: tools that clients can call
//!   - **resources**: data that clients can read
//!   - **prompts**: prompt templates, built-in and loaded from disk
//!
//! # Example
//!
//! ```rust,no_run
//! use aytch_mcp::core::{Config, McpServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(None)?;
//!     let transport = TransportService::new(config.transport.clone());
//!     transport.run(McpServer::new(config)).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
