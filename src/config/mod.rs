//! Configuration for output-size
//!
//! This module provides:
//! - The validated run configuration built from action inputs / CLI flags
//! - The `.output-size.toml` build recipe and its loader

pub mod loader;
pub mod recipe;
pub mod run;

pub use loader::RecipeLoader;
pub use recipe::{
    AppRecipe, BuildRecipe, CompilerRecipe, CompressionMethod, CompressionRecipe, FailurePolicy,
    RuntimeRecipe, VersionFormat, RECIPE_FILE_NAME,
};
pub use run::{ConfigError, RawInputs, RunConfig, DEFAULT_BASELINE_BRANCH};
