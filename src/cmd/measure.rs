//! Measure command implementation

use anyhow::Result;
use std::path::Path;

use crate::cli::MeasureArgs;
use crate::config::{RecipeLoader, RunConfig, RECIPE_FILE_NAME};
use crate::error::OutputSizeError;
use crate::fmt::CHECKMARK;
use crate::orchestrator::{Orchestrator, RunOutcome};

/// Run a measurement configured from flags and the Actions environment
pub fn cmd_measure(args: MeasureArgs) -> Result<()> {
    let config = RunConfig::from_inputs(args.into()).map_err(OutputSizeError::from)?;

    let recipe_path = config.recipe_path.as_deref();
    let recipe = RecipeLoader::load(&config.workspace, recipe_path).map_err(|e| {
        OutputSizeError::Recipe {
            path: recipe_path
                .map(Path::to_path_buf)
                .unwrap_or_else(|| config.workspace.join(RECIPE_FILE_NAME)),
            reason: format!("{:#}", e),
        }
    })?;

    match Orchestrator::new(config, recipe).run()? {
        RunOutcome::NothingToCompare { .. } => {}
        RunOutcome::Reported { report, .. } => {
            println!(
                "{} Measured {} revision(s)",
                CHECKMARK,
                report.measurements().len()
            );
        }
    }
    Ok(())
}
