//! Tool detection and verification module
//!
//! Checks that the external programs a measurement run shells out to are on `PATH`
//! before any scratch directory is created:
//! - git (always)
//! - the runtime installer named by the recipe (`go` by default)
//! - gzip (only with the external compression method)

use crate::config::recipe::{BuildRecipe, CompressionMethod, VERSION_PLACEHOLDER};
use crate::fmt::{CHECKMARK, CROSSMARK, HAMMER, INFO};
use crate::infra::{CommandExecutor, RealCommandExecutor};
use console::style;
use std::process::Command;
use thiserror::Error;

/// Errors that can occur during tool operations
#[derive(Error, Debug)]
pub enum ToolError {
    /// I/O error during tool execution
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Tool execution failed
    #[error("Failed to get version for {0}")]
    VersionFailed(String),

    /// Required tool is missing
    #[error("Required tool missing: {tool}")]
    MissingTool {
        /// Binary name
        tool: String,
        /// How to install it
        install_hint: String,
    },
}

/// Represents an external program with detection capabilities
///
/// # Examples
///
/// ```no_run
/// use output_size::tools::Tool;
///
/// let git = Tool::new("Git", "git", "--version");
/// if git.is_installed() {
///     println!("{}", git.version()?);
/// }
/// # Ok::<(), output_size::tools::ToolError>(())
/// ```
#[derive(Debug)]
pub struct Tool<CE: CommandExecutor = RealCommandExecutor> {
    /// Human-readable name
    pub name: &'static str,
    /// Binary name in PATH
    pub binary: String,
    /// Argument printing the version (e.g., "--version")
    pub version_flag: &'static str,
    /// Command executor for running version checks
    cmd_executor: CE,
}

impl<CE: CommandExecutor> Tool<CE> {
    /// Create a new Tool with a custom command executor
    pub fn with_executor(
        name: &'static str,
        binary: impl Into<String>,
        version_flag: &'static str,
        cmd_executor: CE,
    ) -> Self {
        Self {
            name,
            binary: binary.into(),
            version_flag,
            cmd_executor,
        }
    }

    /// Check if the tool is installed and available in PATH
    pub fn is_installed(&self) -> bool {
        which::which(&self.binary).is_ok()
    }

    /// Get the first line of the tool's version output
    pub fn version(&self) -> Result<String, ToolError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(self.version_flag);
        let output = self.cmd_executor.output(&mut cmd)?;

        if !output.status.success() {
            return Err(ToolError::VersionFailed(self.name.to_string()));
        }

        let version = String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or("")
            .to_string();

        Ok(version)
    }

    /// Check and report the tool status
    pub fn check(&self) -> ToolStatus {
        if self.is_installed() {
            match self.version() {
                Ok(version) => ToolStatus::Available(version),
                Err(_) => ToolStatus::InstalledButVersionUnknown,
            }
        } else {
            ToolStatus::Missing
        }
    }

    /// Installation hint shown when the tool is missing
    pub fn install_hint(&self) -> String {
        match self.binary.as_str() {
            "git" => "install git from https://git-scm.com/downloads".to_string(),
            "go" => "install Go from https://go.dev/dl/ or use actions/setup-go".to_string(),
            "gzip" => {
                "install gzip, or set `method = \"builtin\"` under [compression] in .output-size.toml"
                    .to_string()
            }
            other => format!("make sure `{}` is on PATH", other),
        }
    }
}

impl Tool<RealCommandExecutor> {
    /// Create a new Tool with real command execution
    pub fn new(name: &'static str, binary: impl Into<String>, version_flag: &'static str) -> Self {
        Self::with_executor(name, binary, version_flag, RealCommandExecutor)
    }
}

/// Status of a tool check
#[derive(Debug)]
pub enum ToolStatus {
    /// Tool is available and version was successfully retrieved
    Available(String),
    /// Tool binary exists but version check failed
    InstalledButVersionUnknown,
    /// Tool binary not found
    Missing,
}

/// Programs a measurement run needs, derived from the build recipe
pub struct ToolChain<CE: CommandExecutor = RealCommandExecutor> {
    /// Tools checked in order
    pub tools: Vec<Tool<CE>>,
}

impl ToolChain<RealCommandExecutor> {
    /// Tools required by `recipe`, checked with real command execution
    pub fn for_recipe(recipe: &BuildRecipe) -> Self {
        Self::for_recipe_with_executor(recipe, RealCommandExecutor)
    }
}

impl<CE: CommandExecutor + Clone> ToolChain<CE> {
    /// Tools required by `recipe` with a custom command executor
    pub fn for_recipe_with_executor(recipe: &BuildRecipe, cmd_executor: CE) -> Self {
        let mut tools = vec![Tool::with_executor(
            "Git",
            "git",
            "--version",
            cmd_executor.clone(),
        )];

        // Installer programs; versioned runtime wrappers only exist after provisioning.
        for program in recipe.runtime.install.iter().filter_map(|c| c.first()) {
            if program.contains(VERSION_PLACEHOLDER) || tools.iter().any(|t| &t.binary == program)
            {
                continue;
            }
            let flag = if program == "go" { "version" } else { "--version" };
            tools.push(Tool::with_executor(
                "Runtime installer",
                program.clone(),
                flag,
                cmd_executor.clone(),
            ));
        }

        if recipe.compression.method == CompressionMethod::Gzip {
            tools.push(Tool::with_executor("gzip", "gzip", "--version", cmd_executor));
        }

        Self { tools }
    }
}

impl<CE: CommandExecutor> ToolChain<CE> {
    /// Check all tools, printing their status; fails on the first missing one
    pub fn check_all(&self) -> Result<(), ToolError> {
        println!("\n{} Checking build tools...", HAMMER);

        let mut missing: Option<&Tool<CE>> = None;
        for tool in &self.tools {
            match tool.check() {
                ToolStatus::Available(version) => {
                    println!(
                        "   {} {} - {}",
                        CHECKMARK,
                        style(&tool.binary).bold(),
                        style(version).dim()
                    );
                }
                ToolStatus::InstalledButVersionUnknown => {
                    println!(
                        "   {} {} - {}",
                        CHECKMARK,
                        style(&tool.binary).bold(),
                        style("(version unknown)").dim()
                    );
                }
                ToolStatus::Missing => {
                    println!(
                        "   {} {} - {}",
                        CROSSMARK,
                        style(&tool.binary).bold(),
                        style("NOT FOUND").red()
                    );
                    if missing.is_none() {
                        missing = Some(tool);
                    }
                }
            }
        }

        match missing {
            Some(tool) => {
                println!("\n{} {}", INFO, tool.install_hint());
                Err(ToolError::MissingTool {
                    tool: tool.binary.clone(),
                    install_hint: tool.install_hint(),
                })
            }
            None => Ok(()),
        }
    }

    /// Binaries this toolchain checks
    pub fn binaries(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.binary.as_str()).collect()
    }
}
