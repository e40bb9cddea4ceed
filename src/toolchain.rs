//! Runtime provisioning
//!
//! The compiler at each revision depends on a specific runtime release. The provisioner
//! installs that release through the recipe's install commands and hands back a
//! [`RuntimeHandle`] that knows how to invoke it.

use crate::config::recipe::{substitute, RuntimeRecipe, VERSION_PLACEHOLDER};
use crate::infra::{CommandExecutor, FileSystem, InfraError, Shell};
use thiserror::Error;

/// Runtime provisioning errors
#[derive(Debug, Error)]
pub enum ToolchainError {
    /// One of the install commands failed
    #[error("install runtime {version}")]
    Install {
        /// Requested runtime version
        version: String,
        #[source]
        /// Underlying command failure
        source: InfraError,
    },

    /// Querying the runtime root failed
    #[error("query root of runtime {version}")]
    RootQuery {
        /// Runtime version
        version: String,
        #[source]
        /// Underlying command failure
        source: InfraError,
    },

    /// The root query printed nothing
    #[error("runtime {version} reported an empty root directory")]
    EmptyRoot {
        /// Runtime version
        version: String,
    },
}

/// An installed runtime release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeHandle {
    /// Version string, e.g. `go1.19.13`
    pub version: String,
    /// Program invoking this release
    pub command: String,
}

/// Installs runtime releases following a [`RuntimeRecipe`]
pub struct RuntimeProvisioner<'a, FS: FileSystem, CE: CommandExecutor> {
    shell: &'a Shell<FS, CE>,
    recipe: &'a RuntimeRecipe,
}

impl<'a, FS: FileSystem, CE: CommandExecutor> RuntimeProvisioner<'a, FS, CE> {
    /// Create a provisioner
    pub fn new(shell: &'a Shell<FS, CE>, recipe: &'a RuntimeRecipe) -> Self {
        Self { shell, recipe }
    }

    /// Install `version`, running each install command in order
    ///
    /// Install commands are idempotent with the default recipe, so an already
    /// installed release just gets re-verified.
    pub fn install(&self, version: &str) -> Result<RuntimeHandle, ToolchainError> {
        for command in &self.recipe.install {
            let command = substitute(command, VERSION_PLACEHOLDER, version);
            // Validated non-empty when the recipe was loaded
            let Some((program, args)) = command.split_first() else {
                continue;
            };
            self.shell
                .run(program, args)
                .map_err(|source| ToolchainError::Install {
                    version: version.to_string(),
                    source,
                })?;
        }

        Ok(RuntimeHandle {
            version: version.to_string(),
            command: self.recipe.command.replace(VERSION_PLACEHOLDER, version),
        })
    }

    /// Environment entry pointing the app build at the runtime's root directory
    pub fn root_env(&self, runtime: &RuntimeHandle) -> Result<(String, String), ToolchainError> {
        let root = self
            .shell
            .capture(&runtime.command, &self.recipe.root_query)
            .map_err(|source| ToolchainError::RootQuery {
                version: runtime.version.clone(),
                source,
            })?;

        if root.is_empty() {
            return Err(ToolchainError::EmptyRoot {
                version: runtime.version.clone(),
            });
        }
        log::debug!("{}={}", self.recipe.root_env, root);
        Ok((self.recipe.root_env.clone(), root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{mock_exit_status, RealFileSystem};
    use std::cell::RefCell;
    use std::process::{Command, ExitStatus, Output};

    struct RecordingExecutor {
        stdout: &'static [u8],
        fail_program: Option<&'static str>,
        seen: RefCell<Vec<String>>,
    }

    impl RecordingExecutor {
        fn new(stdout: &'static [u8]) -> Self {
            Self {
                stdout,
                fail_program: None,
                seen: RefCell::new(Vec::new()),
            }
        }

        fn code_for(&self, cmd: &Command) -> i32 {
            let program = cmd.get_program().to_string_lossy().to_string();
            let mut line = program.clone();
            for arg in cmd.get_args() {
                line.push(' ');
                line.push_str(&arg.to_string_lossy());
            }
            self.seen.borrow_mut().push(line);
            if self.fail_program == Some(program.as_str()) {
                1
            } else {
                0
            }
        }
    }

    impl CommandExecutor for RecordingExecutor {
        fn status(&self, cmd: &mut Command) -> std::io::Result<ExitStatus> {
            Ok(mock_exit_status(self.code_for(cmd)))
        }

        fn output(&self, cmd: &mut Command) -> std::io::Result<Output> {
            Ok(Output {
                status: mock_exit_status(self.code_for(cmd)),
                stdout: self.stdout.to_vec(),
                stderr: vec![],
            })
        }
    }

    #[test]
    fn test_install_runs_substituted_commands_in_order() {
        let shell = Shell::with_parts(RealFileSystem, RecordingExecutor::new(b""));
        let recipe = RuntimeRecipe::default();

        let runtime = RuntimeProvisioner::new(&shell, &recipe)
            .install("go1.19.13")
            .unwrap();

        assert_eq!(runtime.command, "go1.19.13");
        assert_eq!(
            *shell.executor().seen.borrow(),
            vec![
                "go install golang.org/dl/go1.19.13@latest".to_string(),
                "go1.19.13 download".to_string(),
            ]
        );
    }

    #[test]
    fn test_install_stops_at_first_failure() {
        let mut executor = RecordingExecutor::new(b"");
        executor.fail_program = Some("go");
        let shell = Shell::with_parts(RealFileSystem, executor);
        let recipe = RuntimeRecipe::default();

        let err = RuntimeProvisioner::new(&shell, &recipe)
            .install("go1.19.13")
            .unwrap_err();

        assert_eq!(err.to_string(), "install runtime go1.19.13");
        assert_eq!(shell.executor().seen.borrow().len(), 1);
    }

    #[test]
    fn test_root_env_uses_recipe_variable() {
        let shell = Shell::with_parts(
            RealFileSystem,
            RecordingExecutor::new(b"/root/sdk/go1.19.13\n"),
        );
        let recipe = RuntimeRecipe::default();
        let provisioner = RuntimeProvisioner::new(&shell, &recipe);
        let runtime = RuntimeHandle {
            version: "go1.19.13".to_string(),
            command: "go1.19.13".to_string(),
        };

        let env = provisioner.root_env(&runtime).unwrap();
        assert_eq!(
            env,
            (
                "GOPHERJS_GOROOT".to_string(),
                "/root/sdk/go1.19.13".to_string()
            )
        );
        assert_eq!(
            shell.executor().seen.borrow().last().unwrap(),
            "go1.19.13 env GOROOT"
        );
    }

    #[test]
    fn test_root_env_rejects_empty_output() {
        let shell = Shell::with_parts(RealFileSystem, RecordingExecutor::new(b"\n"));
        let recipe = RuntimeRecipe::default();
        let runtime = RuntimeHandle {
            version: "go1.19.13".to_string(),
            command: "go1.19.13".to_string(),
        };

        let err = RuntimeProvisioner::new(&shell, &recipe)
            .root_env(&runtime)
            .unwrap_err();
        assert!(matches!(err, ToolchainError::EmptyRoot { .. }));
    }
}
