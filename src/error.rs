//! Enhanced error types with contextual suggestions
//!
//! Provides structured error types that include:
//! - Actionable error messages
//! - Suggested fixes and recovery actions
//! - Documentation links
//! - Proper exit codes for CI/CD
//!
//! # Examples
//!
//! ```
//! use output_size::error::OutputSizeError;
//! use output_size::plan::PlanError;
//!
//! let err = OutputSizeError::from(PlanError::ForbiddenTrigger {
//!     event: "pull_request_target".to_string(),
//! });
//! assert_eq!(err.exit_code(), 78);
//! assert!(err.docs_url().is_some());
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::pipeline::BuildError;
use crate::plan::PlanError;
use crate::report::ReportError;
use crate::tools::ToolError;

/// Top-level output-size errors with contextual suggestions
#[derive(Error, Debug)]
pub enum OutputSizeError {
    /// Invalid or missing run configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The trigger cannot be measured
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// A required program is not installed
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Building or measuring a revision failed
    #[error(transparent)]
    Build(#[from] BuildError),

    /// Rendering or persisting the report failed
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Generic I/O error with context
    #[error("I/O error: {context}")]
    Io {
        /// Context about where the error occurred
        context: String,
        #[source]
        /// IO error source
        source: std::io::Error,
    },

    /// Recipe file could not be loaded
    #[error("Invalid build recipe: {}", path.display())]
    Recipe {
        /// Recipe file
        path: PathBuf,
        /// Rendered cause chain
        reason: String,
    },
}

impl OutputSizeError {
    /// Get actionable suggestion for resolving this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use output_size::error::OutputSizeError;
    /// use output_size::tools::ToolError;
    ///
    /// let error = OutputSizeError::from(ToolError::MissingTool {
    ///     tool: "gzip".to_string(),
    ///     install_hint: "apt install gzip".to_string(),
    /// });
    /// assert_eq!(error.suggestion().unwrap(), "apt install gzip");
    /// ```
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Config(ConfigError::MissingInput { input, env_var }) => Some(format!(
                "Set the `{}` action input, or export {} when running by hand",
                input, env_var
            )),
            Self::Config(_) => {
                Some("Check that GITHUB_EVENT_PATH points at the webhook payload JSON".to_string())
            }
            Self::Plan(PlanError::ForbiddenTrigger { .. }) => Some(
                "Measure on `pull_request` and publish the report from a separate \
                 `workflow_run` workflow"
                    .to_string(),
            ),
            Self::Plan(PlanError::UnsupportedTrigger { .. }) => {
                Some("Supported triggers: pull_request, push".to_string())
            }
            Self::Plan(PlanError::MissingField { .. }) => Some(
                "Run inside a GitHub Actions workflow or pass the matching --flag".to_string(),
            ),
            Self::Tool(ToolError::MissingTool { install_hint, .. }) => Some(install_hint.clone()),
            Self::Tool(_) => None,
            Self::Build(e) if e.is_version_error() => Some(
                "The compiler must declare its version as <semver>+<runtime-version>; \
                 adjust [compiler] in .output-size.toml if it lives elsewhere"
                    .to_string(),
            ),
            Self::Build(e) if e.is_missing_artifact() => Some(
                "The build did not produce the expected artifact; check the build log above"
                    .to_string(),
            ),
            Self::Build(_) => Some("Check the command output above".to_string()),
            Self::Report(e) if e.is_zero_baseline() => Some(
                "A revision produced an empty artifact; check its build log".to_string(),
            ),
            Self::Report(_) => None,
            Self::Io { context, .. } => Some(format!(
                "Check file permissions and that {} is accessible",
                context
            )),
            Self::Recipe { .. } => Some(format!(
                "Fix the recipe or remove it to use the defaults ({})",
                crate::config::RECIPE_FILE_NAME
            )),
        }
    }

    /// Get documentation URL for this error.
    pub fn docs_url(&self) -> Option<&str> {
        match self {
            Self::Plan(PlanError::ForbiddenTrigger { .. }) => Some(
                "https://securitylab.github.com/research/github-actions-preventing-pwn-requests/",
            ),
            Self::Config(ConfigError::MissingInput { .. }) => Some(
                "https://docs.github.com/en/actions/learn-github-actions/variables#default-environment-variables",
            ),
            _ => None,
        }
    }

    /// Get appropriate exit code for this error, following sysexits.h conventions.
    ///
    /// # Examples
    ///
    /// ```
    /// use output_size::error::OutputSizeError;
    /// use output_size::report::ReportError;
    ///
    /// assert_eq!(OutputSizeError::from(ReportError::ZeroBaseline).exit_code(), 65);
    /// ```
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 78,                              // EX_CONFIG
            Self::Plan(_) => 78,                                // EX_CONFIG
            Self::Tool(_) => 127,                               // Command not found
            Self::Build(e) if e.is_version_error() => 65,       // EX_DATAERR
            Self::Build(e) if e.is_missing_artifact() => 66,    // EX_NOINPUT
            Self::Build(_) => 1,                                // Generic error (build failed)
            Self::Report(e) if e.is_zero_baseline() => 65,      // EX_DATAERR
            Self::Report(ReportError::Decode { .. }) => 65,     // EX_DATAERR
            Self::Report(ReportError::Read { .. }) => 66,       // EX_NOINPUT
            Self::Report(_) => 74,                              // EX_IOERR
            Self::Io { .. } => 74,                              // EX_IOERR
            Self::Recipe { .. } => 78,                          // EX_CONFIG
        }
    }
}

/// Error formatter with colors and structured output
pub struct ErrorFormatter;

impl ErrorFormatter {
    /// Format error with suggestions and documentation links
    pub fn format(error: &anyhow::Error) -> String {
        use console::style;

        let mut output = String::new();

        // Main error message
        output.push_str(&format!("{} {}\n", style("error:").red().bold(), error));

        // Error chain (caused by)
        for (indent, err) in error.chain().skip(1).enumerate() {
            output.push_str(&format!(
                "{}{} {}\n",
                "  ".repeat(indent + 1),
                style("caused by:").yellow(),
                err
            ));
        }

        if let Some(os_error) = Self::find(error) {
            if let Some(suggestion) = os_error.suggestion() {
                output.push_str(&format!(
                    "\n{} {}\n",
                    style("help:").cyan().bold(),
                    suggestion
                ));
            }

            if let Some(docs) = os_error.docs_url() {
                output.push_str(&format!("{} {}\n", style("docs:").blue(), docs));
            }
        }

        output
    }

    /// One-line summary suitable for a workflow annotation
    pub fn summary(error: &anyhow::Error) -> String {
        format!("{:#}", error)
    }

    /// Get exit code from error
    pub fn exit_code(error: &anyhow::Error) -> i32 {
        Self::find(error).map_or(1, OutputSizeError::exit_code)
    }

    // Context layers sit on top of the typed error, so walk the whole chain.
    fn find(error: &anyhow::Error) -> Option<&OutputSizeError> {
        error
            .chain()
            .find_map(|e| e.downcast_ref::<OutputSizeError>())
    }
}
