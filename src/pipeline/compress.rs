//! Artifact compression
//!
//! Produces `<artifact>.gz` next to the artifact, either with the external `gzip` binary
//! or in-process with `flate2`. The input artifact is consumed in both cases.

use crate::config::recipe::{CompressionMethod, CompressionRecipe, FailurePolicy};
use crate::fmt::WARNING;
use crate::infra::{CommandExecutor, FileSystem, InfraError, Shell};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Compression errors
#[derive(Debug, Error)]
pub enum CompressError {
    /// External compressor failed under the `abort` policy
    #[error("gzip failed")]
    Command(#[source] InfraError),

    /// In-process compression failed
    #[error("compress {} in process", path.display())]
    Builtin {
        /// Input artifact
        path: PathBuf,
        #[source]
        /// IO error source
        source: std::io::Error,
    },
}

/// Path of the compressed artifact for `artifact`
pub fn compressed_path(artifact: &Path) -> PathBuf {
    let mut name = OsString::from(artifact.as_os_str());
    name.push(".gz");
    PathBuf::from(name)
}

/// Compresses artifacts following a [`CompressionRecipe`]
pub struct Compressor<'a, FS: FileSystem, CE: CommandExecutor> {
    shell: &'a Shell<FS, CE>,
    recipe: CompressionRecipe,
}

impl<'a, FS: FileSystem, CE: CommandExecutor> Compressor<'a, FS, CE> {
    /// Create a compressor
    pub fn new(shell: &'a Shell<FS, CE>, recipe: CompressionRecipe) -> Self {
        Self { shell, recipe }
    }

    /// Compress `artifact`, returning the path of the `.gz` file
    ///
    /// Under [`FailurePolicy::Ignore`] a failing `gzip` is only logged; whether the
    /// compressed file exists is left for the size probe to decide.
    pub fn compress(&self, artifact: &Path) -> Result<PathBuf, CompressError> {
        let target = compressed_path(artifact);
        match self.recipe.method {
            CompressionMethod::Gzip => self.external(artifact)?,
            CompressionMethod::Builtin => self.builtin(artifact, &target)?,
        }
        Ok(target)
    }

    fn external(&self, artifact: &Path) -> Result<(), CompressError> {
        let result = self
            .shell
            .run("gzip", [OsString::from("-f"), artifact.as_os_str().to_owned()]);

        match (result, self.recipe.on_failure) {
            (Ok(()), _) => Ok(()),
            (Err(e), FailurePolicy::Ignore) => {
                log::warn!("ignoring compressor failure: {}", e);
                println!("   {} gzip failed, continuing: {}", WARNING, e);
                Ok(())
            }
            (Err(e), FailurePolicy::Abort) => Err(CompressError::Command(e)),
        }
    }

    fn builtin(&self, artifact: &Path, target: &Path) -> Result<(), CompressError> {
        let fs = self.shell.fs();
        let wrap = |source| CompressError::Builtin {
            path: artifact.to_path_buf(),
            source,
        };

        let contents = fs.read(artifact).map_err(wrap)?;
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&contents).map_err(wrap)?;
        let compressed = encoder.finish().map_err(wrap)?;

        fs.write(target, compressed).map_err(wrap)?;
        fs.remove_file(artifact).map_err(wrap)?;
        Ok(())
    }
}
