//! Measurement run orchestration
//!
//! Sequences planning, the per-revision builds and report output. Revisions are built
//! strictly one after another: they share the compiler checkout and the scratch
//! directory. Reports are only written once every revision has been measured, so a
//! failed run leaves no output files behind.

use anyhow::{Context, Result};
use console::style;
use std::path::{Path, PathBuf};

use crate::actions;
use crate::config::{BuildRecipe, RunConfig};
use crate::error::OutputSizeError;
use crate::fmt::{CHART, TEST_TUBE};
use crate::infra::{CommandExecutor, FileSystem, RealCommandExecutor, RealFileSystem, Shell};
use crate::pipeline::{clone_reference_app, RevisionBuilder};
use crate::plan::{MeasurementPlan, MeasurementPlanner};
use crate::report::{markdown, store, AppInfo, ComparisonReport, Measurement};
use crate::tools::ToolChain;

/// Prefix of the scratch directory created for a run
pub const SCRATCH_PREFIX: &str = "output-size";

/// Scratch directory of one run
///
/// A directory the run created itself is removed again when the guard drops, on success
/// and on failure alike. A directory named in the configuration is left in place.
struct ScratchDir<'a, FS: FileSystem> {
    fs: &'a FS,
    path: PathBuf,
    owned: bool,
}

impl<FS: FileSystem> ScratchDir<'_, FS> {
    fn path(&self) -> &Path {
        &self.path
    }
}

impl<FS: FileSystem> Drop for ScratchDir<'_, FS> {
    fn drop(&mut self) {
        if !self.owned {
            return;
        }
        match self.fs.remove_dir_all(&self.path) {
            Ok(()) => log::debug!("removed scratch directory {}", self.path.display()),
            Err(e) => log::warn!(
                "could not remove scratch directory {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

/// How a successful run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The trigger had nothing to compare; no report was produced
    NothingToCompare {
        /// Why
        reason: String,
    },
    /// Every planned revision was measured
    Reported {
        /// The completed report
        report: ComparisonReport,
        /// Its Markdown rendering
        rendered: String,
    },
}

/// Drives one measurement run
pub struct Orchestrator<FS: FileSystem = RealFileSystem, CE: CommandExecutor = RealCommandExecutor>
{
    shell: Shell<FS, CE>,
    config: RunConfig,
    recipe: BuildRecipe,
    check_tools: bool,
}

impl Orchestrator<RealFileSystem, RealCommandExecutor> {
    /// Orchestrator running real commands, with tool preflight enabled
    pub fn new(config: RunConfig, recipe: BuildRecipe) -> Self {
        Self::with_shell(Shell::new(), config, recipe).check_tools(true)
    }
}

impl<FS: FileSystem, CE: CommandExecutor> Orchestrator<FS, CE> {
    /// Orchestrator over a custom shell; tool preflight is off
    pub fn with_shell(shell: Shell<FS, CE>, config: RunConfig, recipe: BuildRecipe) -> Self {
        Self {
            shell,
            config,
            recipe,
            check_tools: false,
        }
    }

    /// Enable or disable the `PATH` check for external tools
    pub fn check_tools(mut self, enabled: bool) -> Self {
        self.check_tools = enabled;
        self
    }

    /// Shell used for every external effect
    pub fn shell(&self) -> &Shell<FS, CE> {
        &self.shell
    }

    /// Run the measurement
    pub fn run(&self) -> Result<RunOutcome> {
        actions::group("Run parameters...", || {
            println!("{:#?}", self.config);
        });

        let planner = MeasurementPlanner::new(&self.config.baseline_branch);
        let plan = planner
            .plan(&self.config.trigger)
            .map_err(OutputSizeError::from)
            .context("plan measurements")?;

        let (trigger_url, requests) = match plan {
            MeasurementPlan::NothingToCompare { reason } => {
                actions::info(&format!(
                    "No comparisons to make ({}), exiting early.",
                    reason
                ));
                return Ok(RunOutcome::NothingToCompare { reason });
            }
            MeasurementPlan::Compare {
                trigger_url,
                requests,
            } => (trigger_url, requests),
        };

        if self.check_tools {
            ToolChain::for_recipe(&self.recipe)
                .check_all()
                .map_err(OutputSizeError::from)
                .context("check build tools")?;
        }

        let scratch = self.scratch_dir()?;
        log::info!("scratch directory: {}", scratch.path().display());

        let app = actions::group("Cloning reference app...", || {
            clone_reference_app(&self.shell, &self.config.app_repo, scratch.path())
        })
        .map_err(OutputSizeError::from)
        .with_context(|| format!("clone reference app from {}", self.config.app_repo))?;

        let mut report = ComparisonReport::new(
            AppInfo {
                name: self.config.app_name.clone(),
                repo: self.config.app_repo.clone(),
                commit: app.commit.clone(),
            },
            trigger_url,
        );

        let builder = RevisionBuilder::new(&self.shell, &self.recipe);
        for request in &requests {
            println!("{} Measuring size for {}", TEST_TUBE, style(&request.label).bold());
            let outcome = actions::group(&format!("Building {}", request.revision), || {
                builder.build(
                    &request.revision,
                    &self.config.workspace,
                    &app.path,
                    scratch.path(),
                )
            })
            .map_err(OutputSizeError::from)
            .with_context(|| format!("measure {} at {}", request.label, request.revision))?;

            report.push(Measurement {
                label: request.label.clone(),
                revision: request.revision.clone(),
                resolved_commit: outcome.resolved_commit,
                raw_size: outcome.sizes.raw,
                minified_size: outcome.sizes.minified,
                compressed_size: outcome.sizes.compressed,
            });
        }

        let rendered = markdown::render(&report)
            .map_err(OutputSizeError::from)
            .context("render report")?;
        println!("\n{} Report\n\n{}", CHART, rendered);

        self.persist(&report, &rendered)?;

        Ok(RunOutcome::Reported { report, rendered })
    }

    fn scratch_dir(&self) -> Result<ScratchDir<'_, FS>> {
        let fs = self.shell.fs();
        match &self.config.scratch_dir {
            Some(dir) => {
                self.shell
                    .fs()
                    .create_dir_all(dir)
                    .map_err(|source| OutputSizeError::Io {
                        context: format!("create scratch directory {}", dir.display()),
                        source,
                    })?;
                Ok(ScratchDir {
                    fs,
                    path: dir.clone(),
                    owned: false,
                })
            }
            None => Ok(ScratchDir {
                fs,
                path: self
                    .shell
                    .create_temp_dir(SCRATCH_PREFIX)
                    .context("create scratch directory")?,
                owned: true,
            }),
        }
    }

    fn persist(&self, report: &ComparisonReport, rendered: &str) -> Result<()> {
        let fs = self.shell.fs();
        if let Some(path) = &self.config.report_json {
            store::save_json(fs, path, report)
                .map_err(OutputSizeError::from)
                .with_context(|| format!("save json report to {:?}", path))?;
        }
        if let Some(path) = &self.config.report_md {
            if let Err(e) = store::save_markdown(fs, path, rendered) {
                // Both reports or neither
                if let Some(json) = &self.config.report_json {
                    if let Err(cleanup) = fs.remove_file(json) {
                        log::warn!("could not remove {}: {}", json.display(), cleanup);
                    }
                }
                return Err(OutputSizeError::from(e))
                    .with_context(|| format!("save markdown report to {:?}", path));
            }
        }
        Ok(())
    }
}
