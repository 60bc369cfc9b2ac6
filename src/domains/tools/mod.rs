//! Tools domain module.
//!
//! Tools are executable functions that MCP clients call to perform actions
//! or computations.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one module per tool)
//! - `router.rs` - rmcp ToolRouter builder for the STDIO transport
//! - `registry.rs` - Enabled tools, metadata and dispatch for HTTP
//! - `error.rs` - Tool dispatch error types
//!
//! ## Adding a New Tool
//!
//! 1. Create a module in `definitions/` implementing `ToolDefinition`
//! 2. Export it in `definitions/mod.rs`
//! 3. Add a `ToolKind` variant in `registry.rs`

pub mod definitions;
mod error;
mod registry;
pub mod router;

pub use error::ToolError;
pub use registry::{ToolKind, ToolRegistry};
pub use router::build_tool_router;
