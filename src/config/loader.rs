//! Build recipe loading

use super::recipe::{BuildRecipe, RECIPE_FILE_NAME};
use crate::infra::{FileSystem, RealFileSystem};
use anyhow::{Context, Result};
use std::path::Path;

/// Handles loading build recipes
pub struct RecipeLoader;

impl RecipeLoader {
    /// Load the recipe for a compiler workspace.
    ///
    /// With an explicit `recipe_path` the file must exist. Without one,
    /// `.output-size.toml` in `workspace` is used if present, defaults otherwise.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use output_size::config::RecipeLoader;
    /// use std::path::Path;
    ///
    /// let recipe = RecipeLoader::load(Path::new("."), None)?;
    /// println!("Building with {}", recipe.app.compiler_binary);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(workspace: &Path, recipe_path: Option<&Path>) -> Result<BuildRecipe> {
        Self::load_with_fs(workspace, recipe_path, &RealFileSystem)
    }

    /// Load a recipe with a custom filesystem implementation
    pub fn load_with_fs<FS: FileSystem>(
        workspace: &Path,
        recipe_path: Option<&Path>,
        fs: &FS,
    ) -> Result<BuildRecipe> {
        let (path, required) = match recipe_path {
            Some(path) => (path.to_path_buf(), true),
            None => (workspace.join(RECIPE_FILE_NAME), false),
        };

        // Read directly instead of checking existence first
        let contents = match fs.read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                log::debug!("no recipe at {}, using defaults", path.display());
                return Ok(BuildRecipe::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read recipe {}", path.display()));
            }
        };

        let recipe: BuildRecipe = toml_edit::de::from_str(&contents)
            .with_context(|| format!("Failed to parse recipe {}", path.display()))?;

        recipe
            .validate()
            .with_context(|| format!("Invalid recipe {}", path.display()))?;

        Ok(recipe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::recipe::{CompressionMethod, FailurePolicy, VersionFormat};
    use std::io;
    use std::path::PathBuf;

    // Mock FileSystem for testing
    struct MockFileSystem {
        file_content: Option<String>,
        should_fail_read: bool,
    }

    impl MockFileSystem {
        fn new() -> Self {
            Self {
                file_content: None,
                should_fail_read: false,
            }
        }

        fn with_content(content: &str) -> Self {
            Self {
                file_content: Some(content.to_string()),
                should_fail_read: false,
            }
        }

        fn with_read_error() -> Self {
            Self {
                file_content: None,
                should_fail_read: true,
            }
        }
    }

    impl FileSystem for MockFileSystem {
        fn read_to_string(&self, _path: &Path) -> io::Result<String> {
            if self.should_fail_read {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "permission denied",
                ));
            }
            self.file_content
                .clone()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "file not found"))
        }

        fn current_dir(&self) -> io::Result<PathBuf> {
            unimplemented!()
        }

        fn set_current_dir(&self, _path: &Path) -> io::Result<()> {
            unimplemented!()
        }

        fn file_size(&self, _path: &Path) -> io::Result<u64> {
            unimplemented!()
        }

        fn is_file(&self, _path: &Path) -> bool {
            unimplemented!()
        }

        fn read(&self, _path: &Path) -> io::Result<Vec<u8>> {
            unimplemented!()
        }

        fn write(&self, _path: &Path, _contents: impl AsRef<[u8]>) -> io::Result<()> {
            unimplemented!()
        }

        fn remove_file(&self, _path: &Path) -> io::Result<()> {
            unimplemented!()
        }

        fn create_dir_all(&self, _path: &Path) -> io::Result<()> {
            unimplemented!()
        }

        fn remove_dir_all(&self, _path: &Path) -> io::Result<()> {
            unimplemented!()
        }
    }

    #[test]
    fn test_loader_loads_from_valid_toml() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(
            temp.path().join(RECIPE_FILE_NAME),
            r#"
[compiler]
version-file = "VERSION"
version-format = "plain"
dependency-prefix = "1."

[compression]
method = "builtin"
on-failure = "abort"
"#,
        )
        .unwrap();

        let recipe = RecipeLoader::load(temp.path(), None).unwrap();
        assert_eq!(recipe.compiler.version_file, "VERSION");
        assert_eq!(recipe.compiler.version_format, VersionFormat::Plain);
        assert_eq!(recipe.compiler.dependency_prefix, "1.");
        assert_eq!(recipe.compression.method, CompressionMethod::Builtin);
        assert_eq!(recipe.compression.on_failure, FailurePolicy::Abort);
        // Untouched sections keep their defaults
        assert_eq!(recipe.app.compiler_binary, "gopherjs");
    }

    #[test]
    fn test_loader_with_missing_default_file_uses_defaults() {
        let fs = MockFileSystem::new();
        let recipe = RecipeLoader::load_with_fs(Path::new("/ws"), None, &fs).unwrap();
        assert_eq!(recipe, BuildRecipe::default());
    }

    #[test]
    fn test_loader_with_missing_explicit_file_returns_error() {
        let fs = MockFileSystem::new();
        let result =
            RecipeLoader::load_with_fs(Path::new("/ws"), Some(Path::new("/custom.toml")), &fs);

        let err_msg = format!("{:#}", result.unwrap_err());
        assert!(err_msg.contains("/custom.toml"));
    }

    #[test]
    fn test_loader_with_invalid_toml_returns_error() {
        let fs = MockFileSystem::with_content("invalid { toml syntax");
        let result = RecipeLoader::load_with_fs(Path::new("/ws"), None, &fs);
        assert!(result.is_err(), "Expected error for invalid TOML");
    }

    #[test]
    fn test_loader_with_permission_error_returns_error() {
        let fs = MockFileSystem::with_read_error();
        let result = RecipeLoader::load_with_fs(Path::new("/ws"), None, &fs);

        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("Failed to read"));
    }

    #[test]
    fn test_loader_rejects_recipe_failing_validation() {
        let fs = MockFileSystem::with_content(
            r#"
[app]
build-args = ["build", "."]
"#,
        );
        let result = RecipeLoader::load_with_fs(Path::new("/ws"), None, &fs);

        let err_msg = format!("{:#}", result.unwrap_err());
        assert!(err_msg.contains("Invalid recipe"));
        assert!(err_msg.contains("{output}"));
    }

    #[test]
    fn test_loader_handles_empty_file() {
        let fs = MockFileSystem::with_content("");
        let recipe = RecipeLoader::load_with_fs(Path::new("/ws"), None, &fs).unwrap();
        assert_eq!(recipe, BuildRecipe::default());
    }
}
