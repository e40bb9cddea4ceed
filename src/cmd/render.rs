//! Render command implementation
//!
//! Regenerates the Markdown table from a JSON report without rebuilding anything.

use anyhow::{Context, Result};
use std::path::Path;

use crate::error::OutputSizeError;
use crate::infra::RealFileSystem;
use crate::report::{markdown, store};

/// Print the Markdown rendering of the report stored at `path`
pub fn cmd_render(path: &Path) -> Result<()> {
    print!("{}", render_file(path)?);
    Ok(())
}

fn render_file(path: &Path) -> Result<String> {
    let report = store::load_json(&RealFileSystem, path).map_err(OutputSizeError::from)?;
    let mut rendered = markdown::render(&report)
        .map_err(OutputSizeError::from)
        .with_context(|| format!("render {}", path.display()))?;
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    Ok(rendered)
}
