//! Git operations on the compiler and reference app checkouts

use crate::infra::{CommandExecutor, FileSystem, InfraError, Shell};
use thiserror::Error;

/// Git operation errors
#[derive(Debug, Error)]
pub enum GitError {
    /// `git clone` failed
    #[error("clone {url}")]
    Clone {
        /// Remote URL
        url: String,
        #[source]
        /// Underlying command failure
        source: InfraError,
    },

    /// `git checkout` failed
    #[error("checkout {revision}")]
    Checkout {
        /// Requested revision
        revision: String,
        #[source]
        /// Underlying command failure
        source: InfraError,
    },

    /// Any other git query failed
    #[error("git {operation}")]
    Query {
        /// What was being asked
        operation: &'static str,
        #[source]
        /// Underlying command failure
        source: InfraError,
    },

    /// `rev-parse` returned something that is not a commit hash
    #[error("unexpected commit hash {0:?}")]
    InvalidCommit(String),
}

/// Git commands run in the shell's current working directory
pub struct GitRepository<'a, FS: FileSystem, CE: CommandExecutor> {
    shell: &'a Shell<FS, CE>,
}

impl<'a, FS: FileSystem, CE: CommandExecutor> GitRepository<'a, FS, CE> {
    /// Wrap a shell
    pub fn new(shell: &'a Shell<FS, CE>) -> Self {
        Self { shell }
    }

    /// Clone `url` into the directory `dest` (relative to the working directory)
    pub fn clone_into(&self, url: &str, dest: &str) -> Result<(), GitError> {
        self.shell
            .run("git", ["clone", url, dest])
            .map_err(|source| GitError::Clone {
                url: url.to_string(),
                source,
            })
    }

    /// Check out `revision` (branch, tag or commit)
    pub fn checkout(&self, revision: &str) -> Result<(), GitError> {
        self.shell
            .run("git", ["checkout", revision])
            .map_err(|source| GitError::Checkout {
                revision: revision.to_string(),
                source,
            })
    }

    /// Print the checked out revision to the log
    pub fn show_head(&self) -> Result<(), GitError> {
        self.shell
            .run(
                "git",
                ["log", "--oneline", "-1", "--no-merges", "--abbrev-commit"],
            )
            .map_err(|source| GitError::Query {
                operation: "log",
                source,
            })
    }

    /// Full hash of the commit at HEAD
    pub fn head_commit(&self) -> Result<String, GitError> {
        let hash = self
            .shell
            .capture("git", ["rev-parse", "HEAD"])
            .map_err(|source| GitError::Query {
                operation: "rev-parse HEAD",
                source,
            })?;

        if hash.is_empty() || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(GitError::InvalidCommit(hash));
        }
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{mock_exit_status, RealFileSystem};
    use std::cell::RefCell;
    use std::process::{Command, ExitStatus, Output};

    struct MockCommandExecutor {
        stdout: Vec<u8>,
        code: i32,
        seen: RefCell<Vec<String>>,
    }

    impl MockCommandExecutor {
        fn new(stdout: &[u8], code: i32) -> Self {
            Self {
                stdout: stdout.to_vec(),
                code,
                seen: RefCell::new(Vec::new()),
            }
        }

        fn record(&self, cmd: &Command) {
            let args: Vec<String> = cmd
                .get_args()
                .map(|a| a.to_string_lossy().to_string())
                .collect();
            self.seen.borrow_mut().push(args.join(" "));
        }
    }

    impl CommandExecutor for MockCommandExecutor {
        fn status(&self, cmd: &mut Command) -> std::io::Result<ExitStatus> {
            self.record(cmd);
            Ok(mock_exit_status(self.code))
        }

        fn output(&self, cmd: &mut Command) -> std::io::Result<Output> {
            self.record(cmd);
            Ok(Output {
                status: mock_exit_status(self.code),
                stdout: self.stdout.clone(),
                stderr: vec![],
            })
        }
    }

    #[test]
    fn test_head_commit_returns_trimmed_hash() {
        let shell = Shell::with_parts(
            RealFileSystem,
            MockCommandExecutor::new(b"0123456789abcdef0123456789abcdef01234567\n", 0),
        );

        let hash = GitRepository::new(&shell).head_commit().unwrap();
        assert_eq!(hash, "0123456789abcdef0123456789abcdef01234567");
    }

    #[test]
    fn test_head_commit_rejects_non_hex_output() {
        let shell = Shell::with_parts(RealFileSystem, MockCommandExecutor::new(b"HEAD\n", 0));

        let result = GitRepository::new(&shell).head_commit();
        assert!(matches!(result, Err(GitError::InvalidCommit(_))));
    }

    #[test]
    fn test_checkout_failure_names_revision() {
        let shell = Shell::with_parts(RealFileSystem, MockCommandExecutor::new(b"", 1));

        let err = GitRepository::new(&shell)
            .checkout("feature/size")
            .unwrap_err();
        assert_eq!(err.to_string(), "checkout feature/size");
    }

    #[test]
    fn test_clone_passes_url_and_destination() {
        let shell = Shell::with_parts(RealFileSystem, MockCommandExecutor::new(b"", 0));

        GitRepository::new(&shell)
            .clone_into("https://github.com/gopherjs/todomvc", "app")
            .unwrap();

        assert_eq!(
            *shell.executor().seen.borrow(),
            vec!["clone https://github.com/gopherjs/todomvc app".to_string()]
        );
    }
}
