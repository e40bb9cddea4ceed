//! Revision builder
//!
//! Rebuilds the compiler at one revision, then builds the reference app with it three
//! times (raw, minified, compressed) and measures each artifact. Every artifact is
//! deleted as soon as it has been measured so the scratch directory never carries
//! state from one revision into the next.

use console::style;
use std::path::Path;

use crate::config::recipe::{substitute, BuildRecipe, OUTPUT_PLACEHOLDER};
use crate::fmt::{format_byte_count, CHECKMARK};
use crate::git::GitRepository;
use crate::infra::{CommandExecutor, FileSystem, Shell};
use crate::toolchain::{RuntimeHandle, RuntimeProvisioner};

use super::compress::Compressor;
use super::error::{ArtifactKind, BuildError};
use super::probe::SizeProbe;
use super::version::{resolver_for, VersionResolver};

/// Sizes of the three artifact variants, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactSizes {
    /// Unoptimized build
    pub raw: u64,
    /// Minified build
    pub minified: u64,
    /// Gzip-compressed minified build
    pub compressed: u64,
}

/// Result of building and measuring one revision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    /// Commit the revision resolved to
    pub resolved_commit: String,
    /// Measured sizes
    pub sizes: ArtifactSizes,
}

/// Builds the compiler at a revision and measures the reference app it produces
pub struct RevisionBuilder<'a, FS: FileSystem, CE: CommandExecutor> {
    shell: &'a Shell<FS, CE>,
    recipe: &'a BuildRecipe,
    resolver: Box<dyn VersionResolver + 'a>,
}

impl<'a, FS: FileSystem, CE: CommandExecutor> RevisionBuilder<'a, FS, CE> {
    /// Create a builder resolving versions the way `recipe` describes
    pub fn new(shell: &'a Shell<FS, CE>, recipe: &'a BuildRecipe) -> Self {
        let resolver = resolver_for(&recipe.compiler, shell.fs());
        Self::with_resolver(shell, recipe, resolver)
    }

    /// Create a builder with a custom version resolver
    pub fn with_resolver(
        shell: &'a Shell<FS, CE>,
        recipe: &'a BuildRecipe,
        resolver: Box<dyn VersionResolver + 'a>,
    ) -> Self {
        Self {
            shell,
            recipe,
            resolver,
        }
    }

    /// Build and measure `revision`.
    ///
    /// Mutates the compiler checkout (checks out `revision`) and writes artifacts to
    /// `scratch`. Any failure aborts without producing an outcome.
    pub fn build(
        &self,
        revision: &str,
        compiler_checkout: &Path,
        app_checkout: &Path,
        scratch: &Path,
    ) -> Result<BuildOutcome, BuildError> {
        let (resolved_commit, runtime) = self
            .shell
            .with_working_dir(compiler_checkout, || {
                self.install_compiler(revision, compiler_checkout)
            })?;

        let sizes = self.shell.with_working_dir(app_checkout, || {
            self.measure_app(&runtime, scratch)
        })?;

        Ok(BuildOutcome {
            resolved_commit,
            sizes,
        })
    }

    fn install_compiler(
        &self,
        revision: &str,
        compiler_checkout: &Path,
    ) -> Result<(String, RuntimeHandle), BuildError> {
        let git = GitRepository::new(self.shell);
        let checkout_failed = |source| BuildError::Checkout {
            revision: revision.to_string(),
            source,
        };

        git.checkout(revision).map_err(checkout_failed)?;
        git.show_head().map_err(checkout_failed)?;
        let resolved_commit = git.head_commit().map_err(checkout_failed)?;

        let version = self
            .resolver
            .resolve_dependency_version(compiler_checkout)
            .map_err(BuildError::Version)?;
        log::info!("{} targets runtime {}", revision, version);

        let runtime = RuntimeProvisioner::new(self.shell, &self.recipe.runtime)
            .install(&version)
            .map_err(BuildError::Toolchain)?;

        self.shell
            .run(&runtime.command, &self.recipe.compiler.install_args)
            .map_err(|source| BuildError::InstallCompiler {
                revision: revision.to_string(),
                source,
            })?;

        Ok((resolved_commit, runtime))
    }

    fn measure_app(
        &self,
        runtime: &RuntimeHandle,
        scratch: &Path,
    ) -> Result<ArtifactSizes, BuildError> {
        let env = [RuntimeProvisioner::new(self.shell, &self.recipe.runtime)
            .root_env(runtime)
            .map_err(BuildError::Toolchain)?];
        let output = scratch.join(&self.recipe.app.artifact_name);
        let probe = SizeProbe::new(self.shell.fs());

        self.build_app(ArtifactKind::Raw, &self.recipe.app.build_args, &output, &env)?;
        let raw = self.measure(&probe, ArtifactKind::Raw, &output)?;
        self.delete(&output)?;

        self.build_app(
            ArtifactKind::Minified,
            &self.recipe.app.minified_build_args,
            &output,
            &env,
        )?;
        let minified = self.measure(&probe, ArtifactKind::Minified, &output)?;

        let compressed_path = Compressor::new(self.shell, self.recipe.compression)
            .compress(&output)
            .map_err(|source| BuildError::Compress {
                path: output.clone(),
                source,
            })?;
        // A failed external compressor may leave the input behind
        if self.shell.fs().is_file(&output) {
            self.delete(&output)?;
        }
        let compressed = self.measure(&probe, ArtifactKind::Compressed, &compressed_path)?;
        self.delete(&compressed_path)?;

        Ok(ArtifactSizes {
            raw,
            minified,
            compressed,
        })
    }

    fn build_app(
        &self,
        kind: ArtifactKind,
        args: &[String],
        output: &Path,
        env: &[(String, String)],
    ) -> Result<(), BuildError> {
        let args = substitute(args, OUTPUT_PLACEHOLDER, &output.to_string_lossy());
        self.shell
            .run_with_env(&self.recipe.app.compiler_binary, &args, env)
            .map_err(|source| BuildError::AppBuild { kind, source })
    }

    fn measure(
        &self,
        probe: &SizeProbe<'_, FS>,
        kind: ArtifactKind,
        path: &Path,
    ) -> Result<u64, BuildError> {
        let size = probe
            .size_of(path)
            .map_err(|source| BuildError::Probe { kind, source })?;
        println!(
            "   {} {} artifact: {}",
            CHECKMARK,
            kind,
            style(format_byte_count(size)).yellow()
        );
        Ok(size)
    }

    fn delete(&self, path: &Path) -> Result<(), BuildError> {
        self.shell
            .fs()
            .remove_file(path)
            .map_err(|source| BuildError::Cleanup {
                path: path.to_path_buf(),
                source,
            })
    }
}
