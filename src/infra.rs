//! Infrastructure traits for abstracting I/O operations.
//!
//! This module provides trait abstractions for filesystem and command execution operations,
//! plus the [`Shell`] facade the measurement pipeline talks to. Everything that touches the
//! process environment (working directory, subprocesses, temp directories) goes through here
//! so the pipeline can be driven by mocks in tests.

use console::style;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output};
use thiserror::Error;

/// Errors raised by the [`Shell`] collaborator contracts
#[derive(Debug, Error)]
pub enum InfraError {
    /// Program could not be started at all
    #[error("failed to start `{command}`")]
    Spawn {
        /// Rendered command line
        command: String,
        #[source]
        /// Underlying spawn error
        source: io::Error,
    },

    /// Program ran but exited unsuccessfully
    #[error("`{command}` exited with {status}")]
    CommandFailed {
        /// Rendered command line
        command: String,
        /// Exit status reported by the OS
        status: ExitStatus,
        /// Captured stderr (empty for streamed commands)
        stderr: String,
    },

    /// Captured stdout was not valid UTF-8
    #[error("`{command}` produced non UTF-8 output")]
    InvalidUtf8 {
        /// Rendered command line
        command: String,
    },

    /// Changing into or restoring a working directory failed
    #[error("change working directory to {}", path.display())]
    ChangeDir {
        /// Target directory
        path: PathBuf,
        #[source]
        /// IO error source
        source: io::Error,
    },

    /// Generic filesystem failure with context
    #[error("{context}")]
    Io {
        /// What was being done
        context: String,
        #[source]
        /// IO error source
        source: io::Error,
    },
}

/// Trait for abstracting filesystem operations.
///
/// This trait allows for dependency injection of filesystem operations,
/// making code more testable and allowing for alternative implementations
/// (e.g., in-memory filesystems for testing).
pub trait FileSystem {
    /// Current working directory of the process.
    fn current_dir(&self) -> io::Result<PathBuf>;

    /// Change the working directory of the process.
    fn set_current_dir(&self, path: &Path) -> io::Result<()>;

    /// Size in bytes of the entry at `path`.
    fn file_size(&self, path: &Path) -> io::Result<u64>;

    /// Whether `path` is an existing regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Read the entire contents of a file.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Read the entire contents of a file into a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write a slice of bytes to a file.
    fn write(&self, path: &Path, contents: impl AsRef<[u8]>) -> io::Result<()>;

    /// Remove a file.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Create a directory and all missing parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove a directory and everything below it.
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// Real filesystem implementation that delegates to std::fs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn current_dir(&self) -> io::Result<PathBuf> {
        std::env::current_dir()
    }

    fn set_current_dir(&self, path: &Path) -> io::Result<()> {
        std::env::set_current_dir(path)
    }

    fn file_size(&self, path: &Path) -> io::Result<u64> {
        std::fs::metadata(path).map(|m| m.len())
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: impl AsRef<[u8]>) -> io::Result<()> {
        std::fs::write(path, contents)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_dir_all(path)
    }
}

/// Trait for abstracting command execution.
///
/// This trait allows for dependency injection of command execution operations,
/// enabling testing without running real commands.
pub trait CommandExecutor {
    /// Execute a command with inherited stdio and return its exit status.
    fn status(&self, cmd: &mut Command) -> io::Result<ExitStatus>;

    /// Execute a command and return its output (stdout, stderr, status).
    fn output(&self, cmd: &mut Command) -> io::Result<Output>;
}

/// Real command executor that delegates to std::process::Command.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealCommandExecutor;

impl CommandExecutor for RealCommandExecutor {
    fn status(&self, cmd: &mut Command) -> io::Result<ExitStatus> {
        cmd.status()
    }

    fn output(&self, cmd: &mut Command) -> io::Result<Output> {
        cmd.output()
    }
}

/// Restores the saved working directory when dropped unless [`DirGuard::restore`] ran.
struct DirGuard<'a, FS: FileSystem> {
    fs: &'a FS,
    previous: Option<PathBuf>,
}

impl<FS: FileSystem> DirGuard<'_, FS> {
    fn restore(mut self) -> Result<(), InfraError> {
        match self.previous.take() {
            Some(previous) => {
                self.fs
                    .set_current_dir(&previous)
                    .map_err(|source| InfraError::ChangeDir {
                        path: previous,
                        source,
                    })
            }
            None => Ok(()),
        }
    }
}

impl<FS: FileSystem> Drop for DirGuard<'_, FS> {
    fn drop(&mut self) {
        // Only reached on unwinding; the normal path goes through `restore`.
        if let Some(previous) = self.previous.take() {
            if let Err(e) = self.fs.set_current_dir(&previous) {
                log::error!("failed to restore working directory {}: {}", previous.display(), e);
            }
        }
    }
}

/// Process-level collaborator used by the measurement pipeline.
///
/// Every command is echoed as `$ program args...` before it runs. The shell is not
/// `Sync`-safe with respect to the working directory: callers run it from one thread only.
///
/// # Examples
///
/// ```no_run
/// use output_size::infra::Shell;
///
/// let shell = Shell::new();
/// let head = shell.capture("git", ["rev-parse", "HEAD"])?;
/// println!("HEAD is {}", head);
/// # Ok::<(), output_size::infra::InfraError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Shell<FS: FileSystem = RealFileSystem, CE: CommandExecutor = RealCommandExecutor> {
    fs: FS,
    cmd_executor: CE,
}

impl Shell<RealFileSystem, RealCommandExecutor> {
    /// Create a shell backed by the real filesystem and real processes
    pub fn new() -> Self {
        Self {
            fs: RealFileSystem,
            cmd_executor: RealCommandExecutor,
        }
    }
}

impl<FS: FileSystem, CE: CommandExecutor> Shell<FS, CE> {
    /// Create a shell from custom implementations (for testing)
    pub fn with_parts(fs: FS, cmd_executor: CE) -> Self {
        Self { fs, cmd_executor }
    }

    /// Filesystem used by this shell
    pub fn fs(&self) -> &FS {
        &self.fs
    }

    /// Command executor used by this shell
    pub fn executor(&self) -> &CE {
        &self.cmd_executor
    }

    /// Run a command with live output; fails on a non-zero exit.
    pub fn run<I, S>(&self, program: &str, args: I) -> Result<(), InfraError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.run_with_env(program, args, &[])
    }

    /// Run a command with extra environment variables; fails on a non-zero exit.
    pub fn run_with_env<I, S>(
        &self,
        program: &str,
        args: I,
        env: &[(String, String)],
    ) -> Result<(), InfraError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let (mut cmd, line) = prepare(program, args, env);
        let status = self
            .cmd_executor
            .status(&mut cmd)
            .map_err(|source| InfraError::Spawn {
                command: line.clone(),
                source,
            })?;

        if !status.success() {
            return Err(InfraError::CommandFailed {
                command: line,
                status,
                stderr: String::new(),
            });
        }
        Ok(())
    }

    /// Run a command and return its stdout with surrounding whitespace trimmed.
    pub fn capture<I, S>(&self, program: &str, args: I) -> Result<String, InfraError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.capture_with_env(program, args, &[])
    }

    /// Like [`Shell::capture`] with extra environment variables.
    pub fn capture_with_env<I, S>(
        &self,
        program: &str,
        args: I,
        env: &[(String, String)],
    ) -> Result<String, InfraError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let (mut cmd, line) = prepare(program, args, env);
        let output = self
            .cmd_executor
            .output(&mut cmd)
            .map_err(|source| InfraError::Spawn {
                command: line.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(InfraError::CommandFailed {
                command: line,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout =
            String::from_utf8(output.stdout).map_err(|_| InfraError::InvalidUtf8 { command: line })?;
        Ok(stdout.trim().to_string())
    }

    /// Run `action` with the working directory set to `dir`.
    ///
    /// The previous working directory is restored on every exit path, including when
    /// `action` fails or panics. If `action` succeeds but the restore fails, the restore
    /// error is returned; if both fail, the action's error wins and the restore failure
    /// is logged.
    pub fn with_working_dir<T, E, F>(&self, dir: &Path, action: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<InfraError>,
    {
        let previous = self.fs.current_dir().map_err(|source| InfraError::Io {
            context: "determine current directory".to_string(),
            source,
        })?;
        self.fs
            .set_current_dir(dir)
            .map_err(|source| InfraError::ChangeDir {
                path: dir.to_path_buf(),
                source,
            })?;
        log::debug!("entered {}", dir.display());

        let guard = DirGuard {
            fs: &self.fs,
            previous: Some(previous),
        };
        let result = action();
        let restored = guard.restore();

        match (result, restored) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e.into()),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(restore_err)) => {
                log::error!("{}", restore_err);
                Err(e)
            }
        }
    }

    /// Create a fresh uniquely named directory under the system temp dir.
    pub fn create_temp_dir(&self, prefix: &str) -> Result<PathBuf, InfraError> {
        let dir = std::env::temp_dir().join(format!(
            "{}-{}",
            prefix,
            uuid::Uuid::new_v4().simple()
        ));
        self.fs
            .create_dir_all(&dir)
            .map_err(|source| InfraError::Io {
                context: format!("create temporary directory {}", dir.display()),
                source,
            })?;
        Ok(dir)
    }

    /// Size of the file at `path`; fails if it is missing.
    pub fn file_size(&self, path: &Path) -> Result<u64, InfraError> {
        self.fs.file_size(path).map_err(|source| InfraError::Io {
            context: format!("stat {}", path.display()),
            source,
        })
    }
}

fn prepare<I, S>(program: &str, args: I, env: &[(String, String)]) -> (Command, String)
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    let mut line = program.to_string();
    for arg in args {
        let arg = arg.as_ref();
        line.push(' ');
        line.push_str(&arg.to_string_lossy());
        cmd.arg(arg);
    }
    for (key, value) in env {
        cmd.env(key, value);
    }
    println!("{} {}", style("$").dim(), line);
    (cmd, line)
}

/// Create an ExitStatus with the given exit code for use in test mocks.
#[cfg(all(test, unix))]
pub fn mock_exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8) // Unix stores exit code in upper bits
}

#[cfg(all(test, windows))]
pub fn mock_exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}
