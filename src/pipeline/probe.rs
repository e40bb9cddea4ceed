//! Artifact size probe

use crate::infra::FileSystem;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Size measurement errors
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Nothing exists at the path
    #[error("artifact {} does not exist", path.display())]
    Missing {
        /// Expected artifact
        path: PathBuf,
    },

    /// The path exists but is a directory or special file
    #[error("artifact {} is not a regular file", path.display())]
    NotAFile {
        /// Offending path
        path: PathBuf,
    },

    /// Stat failed for another reason
    #[error("stat {}", path.display())]
    Io {
        /// Artifact path
        path: PathBuf,
        #[source]
        /// IO error source
        source: io::Error,
    },
}

/// Measures artifact sizes with a fresh stat on every call
pub struct SizeProbe<'a, FS: FileSystem> {
    fs: &'a FS,
}

impl<'a, FS: FileSystem> SizeProbe<'a, FS> {
    /// Create a probe over `fs`
    pub fn new(fs: &'a FS) -> Self {
        Self { fs }
    }

    /// Size in bytes of the regular file at `path`
    pub fn size_of(&self, path: &Path) -> Result<u64, ProbeError> {
        let size = match self.fs.file_size(path) {
            Ok(size) => size,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ProbeError::Missing {
                    path: path.to_path_buf(),
                })
            }
            Err(source) => {
                return Err(ProbeError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        if !self.fs.is_file(path) {
            return Err(ProbeError::NotAFile {
                path: path.to_path_buf(),
            });
        }
        Ok(size)
    }
}
