//! Run configuration gathered once at the process boundary
//!
//! Values come from action inputs and the GitHub workflow environment (or the matching
//! command-line flags). They are validated here and handed to the core by value; nothing
//! below this layer reads the environment.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::infra::{FileSystem, RealFileSystem};
use crate::plan::{EventPayload, TriggerContext, TriggerKind};

/// Default trunk branch
pub const DEFAULT_BASELINE_BRANCH: &str = "master";

/// Run configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required input was not provided
    #[error("missing required input `{input}` ({env_var})")]
    MissingInput {
        /// Input name
        input: &'static str,
        /// Environment variable supplying it
        env_var: &'static str,
    },

    /// The webhook payload could not be read
    #[error("read event payload from {}", path.display())]
    ReadEvent {
        /// Payload file
        path: PathBuf,
        #[source]
        /// IO error source
        source: std::io::Error,
    },

    /// The webhook payload is not valid JSON
    #[error("parse event payload {}", path.display())]
    InvalidEventPayload {
        /// Payload file
        path: PathBuf,
        #[source]
        /// Decoder error
        source: serde_json::Error,
    },

    /// Relative paths could not be anchored
    #[error("determine current directory")]
    CurrentDir(#[source] std::io::Error),
}

/// Unvalidated inputs, one field per recognized setting.
///
/// Empty strings count as "not provided", matching how Actions passes unset inputs.
#[derive(Debug, Clone, Default)]
pub struct RawInputs {
    /// Reference app display name (`INPUT_NAME`)
    pub name: Option<String>,
    /// Reference app repository URL (`INPUT_REPO`)
    pub repo: Option<String>,
    /// JSON report destination (`INPUT_REPORT_JSON`)
    pub report_json: Option<String>,
    /// Markdown report destination (`INPUT_REPORT_MD`)
    pub report_md: Option<String>,
    /// Trunk branch (`INPUT_BASELINE`)
    pub baseline: Option<String>,
    /// Compiler checkout (`GITHUB_WORKSPACE`)
    pub workspace: Option<String>,
    /// Event name (`GITHUB_EVENT_NAME`)
    pub event_name: Option<String>,
    /// Commit (`GITHUB_SHA`)
    pub commit: Option<String>,
    /// Ref (`GITHUB_REF`)
    pub git_ref: Option<String>,
    /// Pull request source branch (`GITHUB_HEAD_REF`)
    pub head_ref: Option<String>,
    /// Pull request destination branch (`GITHUB_BASE_REF`)
    pub base_ref: Option<String>,
    /// Webhook payload file (`GITHUB_EVENT_PATH`)
    pub event_path: Option<String>,
    /// Build recipe override
    pub recipe: Option<String>,
    /// Scratch directory override
    pub scratch_dir: Option<String>,
}

/// Validated run configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Reference app display name
    pub app_name: String,
    /// Reference app repository URL
    pub app_repo: String,
    /// Compiler checkout measured at each revision
    pub workspace: PathBuf,
    /// Where to write the JSON report, if anywhere
    pub report_json: Option<PathBuf>,
    /// Where to write the Markdown report, if anywhere
    pub report_md: Option<PathBuf>,
    /// Trunk branch for the optional baseline row
    pub baseline_branch: String,
    /// Explicit recipe file
    pub recipe_path: Option<PathBuf>,
    /// Explicit scratch directory; a fresh temp dir otherwise
    pub scratch_dir: Option<PathBuf>,
    /// Trigger description for the planner
    pub trigger: TriggerContext,
}

impl RunConfig {
    /// Validate raw inputs, reading the event payload from disk
    pub fn from_inputs(raw: RawInputs) -> Result<Self, ConfigError> {
        Self::from_inputs_with_fs(raw, &RealFileSystem)
    }

    /// Validate raw inputs with a custom filesystem implementation
    pub fn from_inputs_with_fs<FS: FileSystem>(
        raw: RawInputs,
        fs: &FS,
    ) -> Result<Self, ConfigError> {
        let app_name = require(raw.name, "name", "INPUT_NAME")?;
        let app_repo = require(raw.repo, "repo", "INPUT_REPO")?;
        let workspace = require(raw.workspace, "workspace", "GITHUB_WORKSPACE")?;
        let event_name = require(raw.event_name, "event name", "GITHUB_EVENT_NAME")?;

        let event = match non_empty(raw.event_path) {
            Some(path) => load_event(Path::new(&path), fs)?,
            None => EventPayload::default(),
        };

        // Every path is absolute from here on: the pipeline changes directory between steps.
        let cwd = fs.current_dir().map_err(ConfigError::CurrentDir)?;
        let anchored = |path: String| cwd.join(path);

        Ok(Self {
            app_name,
            app_repo,
            workspace: anchored(workspace),
            report_json: non_empty(raw.report_json).map(anchored),
            report_md: non_empty(raw.report_md).map(anchored),
            baseline_branch: non_empty(raw.baseline)
                .unwrap_or_else(|| DEFAULT_BASELINE_BRANCH.to_string()),
            recipe_path: non_empty(raw.recipe).map(anchored),
            scratch_dir: non_empty(raw.scratch_dir).map(anchored),
            trigger: TriggerContext {
                kind: TriggerKind::parse(&event_name),
                commit: non_empty(raw.commit).unwrap_or_default(),
                git_ref: non_empty(raw.git_ref).unwrap_or_default(),
                head_ref: non_empty(raw.head_ref).unwrap_or_default(),
                base_ref: non_empty(raw.base_ref).unwrap_or_default(),
                event,
            },
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn require(
    value: Option<String>,
    input: &'static str,
    env_var: &'static str,
) -> Result<String, ConfigError> {
    non_empty(value).ok_or(ConfigError::MissingInput { input, env_var })
}

fn load_event<FS: FileSystem>(path: &Path, fs: &FS) -> Result<EventPayload, ConfigError> {
    let raw = fs
        .read_to_string(path)
        .map_err(|source| ConfigError::ReadEvent {
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::InvalidEventPayload {
        path: path.to_path_buf(),
        source,
    })
}
