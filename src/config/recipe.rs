//! Build recipe describing how to build the compiler and the reference app
//!
//! The recipe lives in `.output-size.toml` at the root of the compiler workspace. Every
//! field has a default matching a GopherJS workspace, so the file is optional.

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Recipe file name
pub const RECIPE_FILE_NAME: &str = ".output-size.toml";

/// Placeholder replaced by the resolved runtime version
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// Placeholder replaced by the artifact output path
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Complete build recipe
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildRecipe {
    /// How to find the runtime version and install the compiler
    pub compiler: CompilerRecipe,
    /// How to provision the runtime the compiler depends on
    pub runtime: RuntimeRecipe,
    /// How to build the reference app
    pub app: AppRecipe,
    /// How to produce the compressed artifact
    pub compression: CompressionRecipe,
}

/// How the dependency version is declared in the compiler sources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionFormat {
    /// A `const`/`var` declaration initialized with a string literal
    #[default]
    Declaration,
    /// The file contains nothing but the version string
    Plain,
}

/// Compiler-side recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CompilerRecipe {
    /// File holding the version declaration, relative to the compiler checkout
    pub version_file: String,
    /// How the version is stored in `version_file`
    pub version_format: VersionFormat,
    /// Declared symbol carrying `<semver>+<dependency-version>`
    pub version_symbol: String,
    /// Prefix every dependency version must start with
    pub dependency_prefix: String,
    /// Arguments passed to the runtime command to install the compiler
    pub install_args: Vec<String>,
}

impl Default for CompilerRecipe {
    fn default() -> Self {
        Self {
            version_file: "compiler/version_check.go".to_string(),
            version_format: VersionFormat::Declaration,
            version_symbol: "Version".to_string(),
            dependency_prefix: "go1".to_string(),
            install_args: strings(&["install", "-v", "."]),
        }
    }
}

/// Runtime provisioning recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RuntimeRecipe {
    /// Commands run in order to install a runtime version; `{version}` is substituted
    pub install: Vec<Vec<String>>,
    /// Program that invokes the installed runtime; `{version}` is substituted
    pub command: String,
    /// Arguments printing the runtime root directory
    pub root_query: Vec<String>,
    /// Environment variable through which the app build receives the runtime root
    pub root_env: String,
}

impl Default for RuntimeRecipe {
    fn default() -> Self {
        Self {
            install: vec![
                strings(&["go", "install", "golang.org/dl/{version}@latest"]),
                strings(&["{version}", "download"]),
            ],
            command: VERSION_PLACEHOLDER.to_string(),
            root_query: strings(&["env", "GOROOT"]),
            root_env: "GOPHERJS_GOROOT".to_string(),
        }
    }
}

/// Reference app build recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AppRecipe {
    /// Binary produced by installing the compiler
    pub compiler_binary: String,
    /// Arguments for the unoptimized build; `{output}` is substituted
    pub build_args: Vec<String>,
    /// Arguments for the minified build; `{output}` is substituted
    pub minified_build_args: Vec<String>,
    /// File name of the artifact inside the scratch directory
    pub artifact_name: String,
}

impl Default for AppRecipe {
    fn default() -> Self {
        Self {
            compiler_binary: "gopherjs".to_string(),
            build_args: strings(&["build", "-v", "-o", OUTPUT_PLACEHOLDER, "."]),
            minified_build_args: strings(&["build", "-v", "-m", "-o", OUTPUT_PLACEHOLDER, "."]),
            artifact_name: "app.js".to_string(),
        }
    }
}

/// Compression backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompressionMethod {
    /// External `gzip` binary
    #[default]
    Gzip,
    /// In-process gzip encoder
    Builtin,
}

/// What to do when the external compressor exits unsuccessfully
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Ignore the exit status; the compressed artifact must still exist
    #[default]
    Ignore,
    /// Treat it as a failed build
    Abort,
}

/// Compression recipe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CompressionRecipe {
    /// Compression backend
    pub method: CompressionMethod,
    /// Handling of a failing external compressor
    pub on_failure: FailurePolicy,
}

impl BuildRecipe {
    /// Validate that every command can actually be assembled
    pub fn validate(&self) -> Result<()> {
        if self.compiler.version_file.trim().is_empty() {
            anyhow::bail!("compiler.version-file must not be empty");
        }
        if self.compiler.version_format == VersionFormat::Declaration
            && self.compiler.version_symbol.trim().is_empty()
        {
            anyhow::bail!("compiler.version-symbol is required for the declaration format");
        }
        if self.runtime.command.trim().is_empty() {
            anyhow::bail!("runtime.command must not be empty");
        }
        if let Some(pos) = self.runtime.install.iter().position(|c| c.is_empty()) {
            anyhow::bail!("runtime.install command #{} is empty", pos + 1);
        }
        if self.app.compiler_binary.trim().is_empty() {
            anyhow::bail!("app.compiler-binary must not be empty");
        }
        if self.app.artifact_name.trim().is_empty() || self.app.artifact_name.contains('/') {
            anyhow::bail!(
                "app.artifact-name must be a plain file name, got {:?}",
                self.app.artifact_name
            );
        }

        for (field, args) in [
            ("app.build-args", &self.app.build_args),
            ("app.minified-build-args", &self.app.minified_build_args),
        ] {
            if !args.iter().any(|a| a.contains(OUTPUT_PLACEHOLDER)) {
                anyhow::bail!("{} must contain the {} placeholder", field, OUTPUT_PLACEHOLDER);
            }
        }

        Ok(())
    }
}

/// Replace `placeholder` with `value` in every argument
pub fn substitute(args: &[String], placeholder: &str, value: &str) -> Vec<String> {
    args.iter().map(|a| a.replace(placeholder, value)).collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
