//! Prompts domain module.
//!
//! Prompts are template messages that clients fill in with arguments.
//!
//! ## Architecture
//!
//! - `definitions/` - Built-in prompt definitions (one file per prompt)
//! - `registry.rs` - Central registration of the built-in prompts
//! - `loader.rs` - Prompts loaded from the prompts directory
//! - `service.rs` - Prompt service for listing and rendering
//! - `templates.rs` - Template rendering engine
//!
//! ## Adding a New Prompt
//!
//! Either drop a `*.json` or `*.txt` file into the prompts directory, or:
//!
//! 1. Create a new file in `definitions/` (e.g., `my_prompt.rs`)
//! 2. Implement the `PromptDefinition` trait
//! 3. Export in `definitions/mod.rs`
//! 4. Register in `registry.rs`

pub mod definitions;
mod error;
mod loader;
mod registry;
mod service;
pub mod templates;

pub use definitions::PromptDefinition;
pub use error::PromptError;
pub use loader::load_prompts;
pub use registry::{get_all_prompts, prompt_names};
pub use service::PromptService;
pub use templates::PromptTemplate;
