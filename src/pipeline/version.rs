//! Dependency runtime version resolution
//!
//! A compiler revision declares the runtime it targets as `<semver>+<dependency-version>`,
//! e.g. `1.19.0-beta1+go1.19.13`. Where that string lives is a property of the compiler
//! sources, so it is read through the [`VersionResolver`] capability and the pipeline only
//! ever sees the extracted dependency version.

use crate::config::recipe::{CompilerRecipe, VersionFormat};
use crate::infra::FileSystem;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::str::Chars;
use thiserror::Error;

/// Version resolution errors
#[derive(Debug, Error)]
pub enum VersionError {
    /// The version file could not be read
    #[error("read {}", path.display())]
    Read {
        /// Version file
        path: PathBuf,
        #[source]
        /// IO error source
        source: std::io::Error,
    },

    /// No declaration of the symbol was found
    #[error("no string declaration of `{symbol}` found in {}", path.display())]
    DeclarationNotFound {
        /// Declared symbol
        symbol: String,
        /// Version file
        path: PathBuf,
    },

    /// The symbol is declared more than once
    #[error("`{symbol}` is declared {count} times in {}", path.display())]
    AmbiguousDeclaration {
        /// Declared symbol
        symbol: String,
        /// Number of declarations
        count: usize,
        /// Version file
        path: PathBuf,
    },

    /// A plain version file is empty
    #[error("{} is empty", path.display())]
    Empty {
        /// Version file
        path: PathBuf,
    },

    /// The version string has no `+` separator
    #[error("expected '+' separator to be present in the version string, got: {version}")]
    MissingSeparator {
        /// Full version string
        version: String,
    },

    /// The text after `+` is not a dependency version
    #[error("expected a version starting with {prefix:?} after '+' separator, got: {dependency}")]
    UnexpectedDependency {
        /// Text after the separator
        dependency: String,
        /// Required prefix
        prefix: String,
    },

    /// The declared string literal has an escape sequence Go would reject
    #[error("invalid escape sequence in the declaration of `{symbol}` in {}", path.display())]
    InvalidEscape {
        /// Declared symbol
        symbol: String,
        /// Version file
        path: PathBuf,
    },

    /// The lookup pattern for the symbol could not be compiled
    #[error("invalid version symbol `{symbol}`")]
    Pattern {
        /// Declared symbol
        symbol: String,
        #[source]
        /// Regex error
        source: regex::Error,
    },
}

/// Resolves the dependency runtime version a compiler source tree targets
pub trait VersionResolver {
    /// Dependency version declared by the sources under `source_tree`
    fn resolve_dependency_version(&self, source_tree: &Path) -> Result<String, VersionError>;
}

/// Split `<semver>+<dependency>` on the last `+` and validate the dependency prefix
///
/// # Examples
///
/// ```
/// use output_size::pipeline::version::split_dependency_version;
///
/// let dep = split_dependency_version("1.19.0-beta1+go1.19.13", "go1").unwrap();
/// assert_eq!(dep, "go1.19.13");
///
/// assert!(split_dependency_version("1.2.3", "go1").is_err());
/// assert!(split_dependency_version("1.2.3+bogus", "go1").is_err());
/// ```
pub fn split_dependency_version(version: &str, prefix: &str) -> Result<String, VersionError> {
    let (_, dependency) =
        version
            .rsplit_once('+')
            .ok_or_else(|| VersionError::MissingSeparator {
                version: version.to_string(),
            })?;

    if !dependency.starts_with(prefix) {
        return Err(VersionError::UnexpectedDependency {
            dependency: dependency.to_string(),
            prefix: prefix.to_string(),
        });
    }
    Ok(dependency.to_string())
}

enum Literal<'s> {
    /// `"..."`, still escaped
    Interpreted(&'s str),
    /// `` `...` ``, taken verbatim
    Raw(&'s str),
}

/// Decode the body of a Go interpreted string literal
///
/// `None` for an escape Go does not accept, or for byte escapes that do not form UTF-8.
fn unquote(body: &str) -> Option<String> {
    let mut out = Vec::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        let mut buf = [0; 4];
        if c != '\\' {
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        let byte = match chars.next()? {
            'a' => 0x07,
            'b' => 0x08,
            'f' => 0x0c,
            'n' => b'\n',
            'r' => b'\r',
            't' => b'\t',
            'v' => 0x0b,
            '\\' => b'\\',
            '"' => b'"',
            'x' => u8::try_from(digits(&mut chars, 2, 16)?).ok()?,
            first @ '0'..='7' => {
                let high = first.to_digit(8)?;
                u8::try_from(high * 64 + digits(&mut chars, 2, 8)?).ok()?
            }
            kind @ ('u' | 'U') => {
                let count = if kind == 'u' { 4 } else { 8 };
                let c = char::from_u32(digits(&mut chars, count, 16)?)?;
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                continue;
            }
            _ => return None,
        };
        out.push(byte);
    }
    String::from_utf8(out).ok()
}

/// Exactly `count` digits in `radix`
fn digits(chars: &mut Chars<'_>, count: usize, radix: u32) -> Option<u32> {
    let mut value: u32 = 0;
    for _ in 0..count {
        value = value.checked_mul(radix)?.checked_add(chars.next()?.to_digit(radix)?)?;
    }
    Some(value)
}

/// Reads a `const`/`var` declaration initialized with a string literal
pub struct DeclarationResolver<'a, FS: FileSystem> {
    fs: &'a FS,
    file: String,
    symbol: String,
    prefix: String,
}

impl<'a, FS: FileSystem> DeclarationResolver<'a, FS> {
    /// Look for `symbol` in `file` (relative to the source tree)
    pub fn new(
        fs: &'a FS,
        file: impl Into<String>,
        symbol: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            fs,
            file: file.into(),
            symbol: symbol.into(),
            prefix: prefix.into(),
        }
    }

    fn declared_value(&self, path: &Path, source: &str) -> Result<String, VersionError> {
        // Either `const Version = "..."`, a typed `var Version string = "..."`, or an
        // entry inside a parenthesized const block. Raw string literals are accepted too.
        let pattern = format!(
            r#"(?m)^\s*(?:(?:const|var)\s+)?{}(?:\s+[A-Za-z_][\w.]*)?\s*=\s*(?:"((?:[^"\\]|\\.)*)"|`([^`]*)`)"#,
            regex::escape(&self.symbol)
        );
        let re = Regex::new(&pattern).map_err(|source| VersionError::Pattern {
            symbol: self.symbol.clone(),
            source,
        })?;

        let values: Vec<_> = re
            .captures_iter(source)
            .filter_map(|caps| match (caps.get(1), caps.get(2)) {
                (Some(interpreted), _) => Some(Literal::Interpreted(interpreted.as_str())),
                (None, Some(raw)) => Some(Literal::Raw(raw.as_str())),
                (None, None) => None,
            })
            .collect();

        match values.as_slice() {
            [Literal::Raw(value)] => Ok(value.to_string()),
            [Literal::Interpreted(body)] => {
                unquote(body).ok_or_else(|| VersionError::InvalidEscape {
                    symbol: self.symbol.clone(),
                    path: path.to_path_buf(),
                })
            }
            [] => Err(VersionError::DeclarationNotFound {
                symbol: self.symbol.clone(),
                path: path.to_path_buf(),
            }),
            many => Err(VersionError::AmbiguousDeclaration {
                symbol: self.symbol.clone(),
                count: many.len(),
                path: path.to_path_buf(),
            }),
        }
    }
}

impl<FS: FileSystem> VersionResolver for DeclarationResolver<'_, FS> {
    fn resolve_dependency_version(&self, source_tree: &Path) -> Result<String, VersionError> {
        let path = source_tree.join(&self.file);
        let source = self
            .fs
            .read_to_string(&path)
            .map_err(|source| VersionError::Read {
                path: path.clone(),
                source,
            })?;

        let version = self.declared_value(&path, &source)?;
        log::debug!("{} declares {} = {:?}", path.display(), self.symbol, version);
        split_dependency_version(&version, &self.prefix)
    }
}

/// Reads a metadata file containing only the version string
pub struct PlainFileResolver<'a, FS: FileSystem> {
    fs: &'a FS,
    file: String,
    prefix: String,
}

impl<'a, FS: FileSystem> PlainFileResolver<'a, FS> {
    /// Read the version from `file` (relative to the source tree)
    pub fn new(fs: &'a FS, file: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            fs,
            file: file.into(),
            prefix: prefix.into(),
        }
    }
}

impl<FS: FileSystem> VersionResolver for PlainFileResolver<'_, FS> {
    fn resolve_dependency_version(&self, source_tree: &Path) -> Result<String, VersionError> {
        let path = source_tree.join(&self.file);
        let contents = self
            .fs
            .read_to_string(&path)
            .map_err(|source| VersionError::Read {
                path: path.clone(),
                source,
            })?;

        let version = contents.trim();
        if version.is_empty() {
            return Err(VersionError::Empty { path });
        }
        split_dependency_version(version, &self.prefix)
    }
}

/// Resolver matching the recipe's version format
pub fn resolver_for<'a, FS: FileSystem>(
    recipe: &CompilerRecipe,
    fs: &'a FS,
) -> Box<dyn VersionResolver + 'a> {
    match recipe.version_format {
        VersionFormat::Declaration => Box::new(DeclarationResolver::new(
            fs,
            &recipe.version_file,
            &recipe.version_symbol,
            &recipe.dependency_prefix,
        )),
        VersionFormat::Plain => Box::new(PlainFileResolver::new(
            fs,
            &recipe.version_file,
            &recipe.dependency_prefix,
        )),
    }
}
