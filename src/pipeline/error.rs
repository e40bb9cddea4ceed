//! Error types for the measurement pipeline

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use super::compress::CompressError;
use super::probe::ProbeError;
use super::version::VersionError;
use crate::git::GitError;
use crate::infra::InfraError;
use crate::toolchain::ToolchainError;

/// Which build variant an artifact belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Unoptimized build
    Raw,
    /// Minified build
    Minified,
    /// Gzip-compressed minified build
    Compressed,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Raw => "raw",
            Self::Minified => "minified",
            Self::Compressed => "compressed",
        })
    }
}

/// Errors that can occur while building and measuring one revision
#[derive(Error, Debug)]
pub enum BuildError {
    /// Checking out or inspecting the compiler revision failed
    #[error("check out compiler at {revision}")]
    Checkout {
        /// Requested revision
        revision: String,
        #[source]
        /// Git failure
        source: GitError,
    },

    /// Cloning the reference app failed
    #[error("check out reference app")]
    AppCheckout(#[source] GitError),

    /// The runtime version could not be determined
    #[error("determine runtime version")]
    Version(#[source] VersionError),

    /// The runtime could not be provisioned
    #[error("provision runtime")]
    Toolchain(#[source] ToolchainError),

    /// Installing the compiler failed
    #[error("install compiler at {revision}")]
    InstallCompiler {
        /// Compiler revision
        revision: String,
        #[source]
        /// Command failure
        source: InfraError,
    },

    /// Building the reference app failed
    #[error("build reference app ({kind})")]
    AppBuild {
        /// Variant being built
        kind: ArtifactKind,
        #[source]
        /// Command failure
        source: InfraError,
    },

    /// Compression failed
    #[error("compress {}", path.display())]
    Compress {
        /// Artifact being compressed
        path: PathBuf,
        #[source]
        /// Compression failure
        source: CompressError,
    },

    /// Measuring an artifact failed
    #[error("measure {kind} artifact")]
    Probe {
        /// Variant being measured
        kind: ArtifactKind,
        #[source]
        /// Probe failure
        source: ProbeError,
    },

    /// Removing a measured artifact failed
    #[error("delete {}", path.display())]
    Cleanup {
        /// Artifact path
        path: PathBuf,
        #[source]
        /// IO error source
        source: std::io::Error,
    },

    /// Entering or leaving a working directory failed
    #[error(transparent)]
    Infra(#[from] InfraError),
}

impl BuildError {
    /// Whether the failure is a malformed version declaration
    pub fn is_version_error(&self) -> bool {
        matches!(self, Self::Version(_))
    }

    /// Whether the failure is an artifact that was never produced
    pub fn is_missing_artifact(&self) -> bool {
        matches!(
            self,
            Self::Probe {
                source: ProbeError::Missing { .. },
                ..
            }
        )
    }
}
