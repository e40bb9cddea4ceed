//! Command-line interface definition

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::RawInputs;

/// Build-size regression reporter
///
/// Builds a reference app with several compiler revisions and reports how the
/// proposed revision changes the raw, minified and gzip-compressed output size.
/// Without a subcommand, runs a measurement configured from the GitHub Actions
/// environment.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true, args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Disable emoji output (useful for CI/CD or accessibility)
    #[arg(long, global = true)]
    pub no_emoji: bool,

    /// Measurement settings used when no subcommand is given
    #[command(flatten)]
    pub measure: MeasureArgs,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Measure output size across compiler revisions
    Measure(MeasureArgs),

    /// Print the Markdown rendering of a saved JSON report
    Render {
        /// Report written by `--report-json`
        #[arg(value_name = "REPORT_JSON")]
        report: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Measurement inputs; every flag falls back to its GitHub Actions variable
#[derive(Args, Debug, Clone, Default)]
pub struct MeasureArgs {
    /// Reference app display name
    #[arg(long, env = "INPUT_NAME")]
    pub name: Option<String>,

    /// Reference app repository URL
    #[arg(long, env = "INPUT_REPO")]
    pub repo: Option<String>,

    /// Write the JSON report here
    #[arg(long, env = "INPUT_REPORT_JSON", value_name = "PATH")]
    pub report_json: Option<String>,

    /// Write the Markdown report here
    #[arg(long, env = "INPUT_REPORT_MD", value_name = "PATH")]
    pub report_md: Option<String>,

    /// Trunk branch measured as the baseline
    #[arg(long, env = "INPUT_BASELINE", value_name = "BRANCH")]
    pub baseline: Option<String>,

    /// Compiler checkout to measure
    #[arg(long, env = "GITHUB_WORKSPACE", value_name = "DIR")]
    pub workspace: Option<String>,

    /// Event that triggered the run (pull_request, push)
    #[arg(long, env = "GITHUB_EVENT_NAME")]
    pub event_name: Option<String>,

    /// Commit the run was triggered for
    #[arg(long, env = "GITHUB_SHA")]
    pub commit: Option<String>,

    /// Ref the run was triggered for
    #[arg(long = "ref", env = "GITHUB_REF")]
    pub git_ref: Option<String>,

    /// Pull request source branch
    #[arg(long, env = "GITHUB_HEAD_REF")]
    pub head_ref: Option<String>,

    /// Pull request destination branch
    #[arg(long, env = "GITHUB_BASE_REF")]
    pub base_ref: Option<String>,

    /// Webhook payload file
    #[arg(long, env = "GITHUB_EVENT_PATH", value_name = "PATH")]
    pub event_path: Option<String>,

    /// Build recipe (defaults to .output-size.toml in the workspace)
    #[arg(long, value_name = "PATH")]
    pub recipe: Option<String>,

    /// Scratch directory (defaults to a fresh temporary directory)
    #[arg(long, value_name = "DIR")]
    pub scratch_dir: Option<String>,
}

impl From<MeasureArgs> for RawInputs {
    fn from(args: MeasureArgs) -> Self {
        RawInputs {
            name: args.name,
            repo: args.repo,
            report_json: args.report_json,
            report_md: args.report_md,
            baseline: args.baseline,
            workspace: args.workspace,
            event_name: args.event_name,
            commit: args.commit,
            git_ref: args.git_ref,
            head_ref: args.head_ref,
            base_ref: args.base_ref,
            event_path: args.event_path,
            recipe: args.recipe,
            scratch_dir: args.scratch_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert()
    }

    #[test]
    fn test_render_subcommand_parses_path() {
        let cli = Cli::try_parse_from(["output-size", "render", "report.json"]).unwrap();
        match cli.command {
            Some(Commands::Render { report }) => assert_eq!(report, PathBuf::from("report.json")),
            other => panic!("expected render, got {:?}", other),
        }
    }

    #[test]
    fn test_flags_map_to_raw_inputs() {
        let cli = Cli::try_parse_from([
            "output-size",
            "measure",
            "--name",
            "todomvc",
            "--ref",
            "refs/heads/main",
        ])
        .unwrap();
        let Some(Commands::Measure(args)) = cli.command else {
            panic!("expected measure");
        };

        let raw = RawInputs::from(args);
        assert_eq!(raw.name.as_deref(), Some("todomvc"));
        assert_eq!(raw.git_ref.as_deref(), Some("refs/heads/main"));
    }
}
