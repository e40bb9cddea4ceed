//! Measurement pipeline
//!
//! Builds one compiler revision and measures the reference app it produces:
//! 1. git checkout of the revision in the compiler workspace
//! 2. runtime version resolution and provisioning
//! 3. compiler install
//! 4. raw, minified and compressed app builds, each measured then deleted

pub mod app;
pub mod builder;
pub mod compress;
pub mod error;
pub mod probe;
pub mod version;

pub use app::{clone_reference_app, AppCheckout};
pub use builder::{ArtifactSizes, BuildOutcome, RevisionBuilder};
pub use compress::{CompressError, Compressor};
pub use error::{ArtifactKind, BuildError};
pub use probe::{ProbeError, SizeProbe};
pub use version::{
    split_dependency_version, DeclarationResolver, PlainFileResolver, VersionError,
    VersionResolver,
};
