//! Command handlers for the output-size CLI
//!
//! Each submodule handles a specific CLI command.

pub mod completions;
pub mod measure;
pub mod render;

// Re-export command functions for convenient access
pub use completions::cmd_completions;
pub use measure::cmd_measure;
pub use render::cmd_render;
