//! Reference app checkout

use std::path::{Path, PathBuf};

use crate::git::GitRepository;
use crate::infra::{CommandExecutor, FileSystem, Shell};

use super::error::BuildError;

/// Directory name of the clone inside the scratch directory
pub const APP_DIR: &str = "app";

/// A cloned reference app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppCheckout {
    /// Clone location
    pub path: PathBuf,
    /// Commit at HEAD after cloning
    pub commit: String,
}

/// Clone `repo` into `<scratch>/app` and record the commit it is at
pub fn clone_reference_app<FS: FileSystem, CE: CommandExecutor>(
    shell: &Shell<FS, CE>,
    repo: &str,
    scratch: &Path,
) -> Result<AppCheckout, BuildError> {
    let git = GitRepository::new(shell);
    let path = scratch.join(APP_DIR);

    shell.with_working_dir(scratch, || {
        git.clone_into(repo, APP_DIR)
            .map_err(BuildError::AppCheckout)
    })?;

    let commit = shell.with_working_dir(&path, || {
        git.head_commit().map_err(BuildError::AppCheckout)
    })?;
    log::info!("reference app at {}", commit);

    Ok(AppCheckout { path, commit })
}
