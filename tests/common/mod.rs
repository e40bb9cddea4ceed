//! Common test utilities and helpers
//!
//! [`SimulatedWorkspace`] stands in for the compiler checkout, the reference app clone and
//! every external program the pipeline runs. The filesystem and the executor share one
//! state, so `git checkout` decides which sizes the next `gopherjs build` writes and
//! `gzip` really replaces the artifact with its `.gz` sibling.
//!
//! # Usage
//!
//! ```rust,no_run
//! mod common;
//! use common::{SimulatedWorkspace, Sizes};
//!
//! let ws = SimulatedWorkspace::new().revision("master", Sizes::new(900, 400, 100));
//! let shell = ws.shell();
//! ```

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output};
use std::rc::Rc;

use output_size::config::RunConfig;
use output_size::infra::{CommandExecutor, FileSystem, Shell};
use output_size::plan::{EventPayload, PullRequestInfo, TriggerContext, TriggerKind};

/// Compiler checkout
pub const WORKSPACE: &str = "/work/gopherjs";
/// Scratch directory handed to the orchestrator
pub const SCRATCH: &str = "/scratch";
/// Working directory of the simulated process before a run
pub const START_DIR: &str = "/home/runner";
/// Where the JSON report lands
pub const REPORT_JSON: &str = "/out/size-report.json";
/// Where the Markdown report lands
pub const REPORT_MD: &str = "/out/size-report.md";
/// Commit of the cloned reference app
pub const APP_COMMIT: &str = "a1b2c3d4e5f60718293a4b5c6d7e8f9012345678";
/// Reference app repository
pub const APP_REPO: &str = "https://github.com/gopherjs/todomvc";
/// Version declared by revisions without an explicit one
pub const DEFAULT_VERSION: &str = "1.19.0-beta1+go1.19.13";
/// Pull request head commit used by [`pull_request_config`]
pub const PR_COMMIT: &str = "3f2e1d0c";

/// Artifact sizes a revision produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sizes {
    pub raw: u64,
    pub minified: u64,
    pub compressed: u64,
}

impl Sizes {
    pub fn new(raw: u64, minified: u64, compressed: u64) -> Self {
        Self {
            raw,
            minified,
            compressed,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    cwd: PathBuf,
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
    read_only: Vec<PathBuf>,
    checked_out: Option<String>,
    sizes: HashMap<String, Sizes>,
    versions: HashMap<String, String>,
    commits: HashMap<String, String>,
    failing: Vec<String>,
    gzip_exit: i32,
    log: Vec<String>,
}

impl State {
    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    fn version_file(&self) -> PathBuf {
        Path::new(WORKSPACE).join("compiler/version_check.go")
    }
}

/// In-memory filesystem view of a [`SimulatedWorkspace`]
#[derive(Debug, Clone)]
pub struct SimFs(Rc<RefCell<State>>);

/// Scripted executor view of a [`SimulatedWorkspace`]
#[derive(Debug, Clone)]
pub struct SimExecutor(Rc<RefCell<State>>);

/// Builder and inspector for the simulated environment
#[derive(Debug, Clone)]
pub struct SimulatedWorkspace {
    state: Rc<RefCell<State>>,
}

impl Default for SimulatedWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedWorkspace {
    pub fn new() -> Self {
        let state = State {
            cwd: PathBuf::from(START_DIR),
            ..State::default()
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Register a revision that builds artifacts of the given sizes
    pub fn revision(self, name: &str, sizes: Sizes) -> Self {
        {
            let mut state = self.state.borrow_mut();
            let commit = format!("{:040x}", state.commits.len() + 1);
            state.sizes.insert(name.to_string(), sizes);
            state.commits.insert(name.to_string(), commit);
        }
        self
    }

    /// Declare `version` in the compiler sources at `revision`
    pub fn version(self, revision: &str, version: &str) -> Self {
        self.state
            .borrow_mut()
            .versions
            .insert(revision.to_string(), version.to_string());
        self
    }

    /// Make every command line starting with `prefix` exit with status 1
    pub fn fail_command(self, prefix: &str) -> Self {
        self.state.borrow_mut().failing.push(prefix.to_string());
        self
    }

    /// Make `gzip` exit with `code` without producing output
    pub fn gzip_exit(self, code: i32) -> Self {
        self.state.borrow_mut().gzip_exit = code;
        self
    }

    /// Make writes to `path` fail with a permission error
    pub fn read_only(self, path: &str) -> Self {
        self.state.borrow_mut().read_only.push(PathBuf::from(path));
        self
    }

    pub fn shell(&self) -> Shell<SimFs, SimExecutor> {
        Shell::with_parts(
            SimFs(Rc::clone(&self.state)),
            SimExecutor(Rc::clone(&self.state)),
        )
    }

    /// Every command line run so far
    pub fn log(&self) -> Vec<String> {
        self.state.borrow().log.clone()
    }

    /// Command lines starting with `prefix`
    pub fn commands(&self, prefix: &str) -> Vec<String> {
        self.log()
            .into_iter()
            .filter(|line| line.starts_with(prefix))
            .collect()
    }

    pub fn commit_of(&self, revision: &str) -> String {
        self.state.borrow().commits[revision].clone()
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.state.borrow().files.get(Path::new(path)).cloned()
    }

    /// Files left behind in the scratch directory
    pub fn scratch_files(&self) -> Vec<PathBuf> {
        self.state
            .borrow()
            .files
            .keys()
            .filter(|p| p.starts_with(SCRATCH))
            .cloned()
            .collect()
    }

    pub fn cwd(&self) -> PathBuf {
        self.state.borrow().cwd.clone()
    }

    /// Directories created and not removed again
    pub fn dirs(&self) -> Vec<PathBuf> {
        self.state.borrow().dirs.iter().cloned().collect()
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} does not exist", path.display()),
    )
}

impl FileSystem for SimFs {
    fn current_dir(&self) -> io::Result<PathBuf> {
        Ok(self.0.borrow().cwd.clone())
    }

    fn set_current_dir(&self, path: &Path) -> io::Result<()> {
        let mut state = self.0.borrow_mut();
        state.cwd = state.resolve(path);
        Ok(())
    }

    fn file_size(&self, path: &Path) -> io::Result<u64> {
        let state = self.0.borrow();
        let path = state.resolve(path);
        state
            .files
            .get(&path)
            .map(|c| c.len() as u64)
            .ok_or_else(|| not_found(&path))
    }

    fn is_file(&self, path: &Path) -> bool {
        let state = self.0.borrow();
        state.files.contains_key(&state.resolve(path))
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let state = self.0.borrow();
        let path = state.resolve(path);
        state.files.get(&path).cloned().ok_or_else(|| not_found(&path))
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let state = self.0.borrow();
        let path = state.resolve(path);
        if path == state.version_file() {
            let revision = state.checked_out.as_deref().unwrap_or_default();
            let version = state
                .versions
                .get(revision)
                .map(String::as_str)
                .unwrap_or(DEFAULT_VERSION);
            return Ok(format!(
                "package compiler\n\n// Version is the GopherJS compiler version string.\nconst Version = \"{}\"\n",
                version
            ));
        }
        let bytes = state.files.get(&path).ok_or_else(|| not_found(&path))?;
        String::from_utf8(bytes.clone()).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn write(&self, path: &Path, contents: impl AsRef<[u8]>) -> io::Result<()> {
        let mut state = self.0.borrow_mut();
        let path = state.resolve(path);
        if state.read_only.contains(&path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} is read-only", path.display()),
            ));
        }
        state.files.insert(path, contents.as_ref().to_vec());
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let mut state = self.0.borrow_mut();
        let path = state.resolve(path);
        state
            .files
            .remove(&path)
            .map(|_| ())
            .ok_or_else(|| not_found(&path))
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.0.borrow_mut();
        let path = state.resolve(path);
        state.dirs.insert(path);
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.0.borrow_mut();
        let path = state.resolve(path);
        if !state.dirs.remove(&path) {
            return Err(not_found(&path));
        }
        state.dirs.retain(|d| !d.starts_with(&path));
        state.files.retain(|f, _| !f.starts_with(&path));
        Ok(())
    }
}

#[cfg(unix)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}

impl SimExecutor {
    fn dispatch(&self, cmd: &Command) -> (i32, String) {
        let program = cmd.get_program().to_string_lossy().into_owned();
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        let has_root_env = cmd
            .get_envs()
            .any(|(key, value)| key == "GOPHERJS_GOROOT" && value.is_some());

        let mut state = self.0.borrow_mut();
        let line = std::iter::once(program.clone())
            .chain(args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ");
        state.log.push(line.clone());
        if state.failing.iter().any(|prefix| line.starts_with(prefix)) {
            return (1, String::new());
        }

        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        match (program.as_str(), args.as_slice()) {
            ("git", ["clone", _, _]) | ("git", ["log", ..]) => (0, String::new()),
            ("git", ["checkout", revision]) => {
                if !state.commits.contains_key(*revision) {
                    return (1, String::new());
                }
                state.checked_out = Some(revision.to_string());
                (0, String::new())
            }
            ("git", ["rev-parse", "HEAD"]) => {
                if state.cwd.ends_with("app") {
                    return (0, format!("{}\n", APP_COMMIT));
                }
                match state.checked_out.as_ref().and_then(|r| state.commits.get(r)) {
                    Some(commit) => (0, format!("{}\n", commit)),
                    None => (128, String::new()),
                }
            }
            ("go", ["install", _]) => (0, String::new()),
            (_, ["download"]) | (_, ["install", "-v", "."]) => (0, String::new()),
            (runtime, ["env", "GOROOT"]) => (0, format!("/sdk/{}\n", runtime)),
            ("gopherjs", ["build", rest @ ..]) => {
                if !has_root_env {
                    return (2, String::new());
                }
                let Some(sizes) = state.checked_out.as_ref().and_then(|r| state.sizes.get(r))
                else {
                    return (2, String::new());
                };
                let size = if rest.contains(&"-m") {
                    sizes.minified
                } else {
                    sizes.raw
                };
                let Some(output) = rest
                    .iter()
                    .position(|a| *a == "-o")
                    .and_then(|i| rest.get(i + 1))
                else {
                    return (2, String::new());
                };
                let output = state.resolve(Path::new(output));
                state.files.insert(output, vec![b'x'; size as usize]);
                (0, String::new())
            }
            ("gzip", ["-f", artifact]) => {
                if state.gzip_exit != 0 {
                    return (state.gzip_exit, String::new());
                }
                let Some(sizes) = state.checked_out.as_ref().and_then(|r| state.sizes.get(r))
                else {
                    return (1, String::new());
                };
                let compressed = sizes.compressed;
                let artifact = state.resolve(Path::new(artifact));
                if state.files.remove(&artifact).is_none() {
                    return (1, String::new());
                }
                let mut gz = artifact.into_os_string();
                gz.push(".gz");
                state
                    .files
                    .insert(PathBuf::from(gz), vec![0x1f; compressed as usize]);
                (0, String::new())
            }
            _ => (127, String::new()),
        }
    }
}

impl CommandExecutor for SimExecutor {
    fn status(&self, cmd: &mut Command) -> io::Result<ExitStatus> {
        let (code, _) = self.dispatch(cmd);
        Ok(exit_status(code))
    }

    fn output(&self, cmd: &mut Command) -> io::Result<Output> {
        let (code, stdout) = self.dispatch(cmd);
        Ok(Output {
            status: exit_status(code),
            stdout: stdout.into_bytes(),
            stderr: Vec::new(),
        })
    }
}

/// Run configuration for a pull request from `feature` into `base`
pub fn pull_request_config(base: &str) -> RunConfig {
    run_config(TriggerContext {
        kind: TriggerKind::PullRequest,
        commit: PR_COMMIT.to_string(),
        git_ref: "refs/pull/7/merge".to_string(),
        head_ref: "feature".to_string(),
        base_ref: base.to_string(),
        event: EventPayload {
            pull_request: Some(PullRequestInfo {
                html_url: "https://github.com/gopherjs/gopherjs/pull/7".to_string(),
            }),
            ..EventPayload::default()
        },
    })
}

/// Run configuration for `trigger` writing both reports
pub fn run_config(trigger: TriggerContext) -> RunConfig {
    RunConfig {
        app_name: "todomvc".to_string(),
        app_repo: APP_REPO.to_string(),
        workspace: PathBuf::from(WORKSPACE),
        report_json: Some(PathBuf::from(REPORT_JSON)),
        report_md: Some(PathBuf::from(REPORT_MD)),
        baseline_branch: "master".to_string(),
        recipe_path: None,
        scratch_dir: Some(PathBuf::from(SCRATCH)),
        trigger,
    }
}
