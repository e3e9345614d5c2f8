//! Error types for import resolution and symbol lookup

use std::path::PathBuf;
use testgen_syntax::ParseError;

/// Errors while mapping an import path to a package directory
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// IO error reading module metadata
    #[error("io error reading {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Malformed `go.mod`
    #[error("invalid go.mod {path}:{line}: {message}")]
    InvalidGoMod {
        /// Path of the `go.mod` file
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// What was wrong
        message: String,
    },

    /// No directory on disk provides the import path
    #[error("package not found: {import_path}")]
    PackageNotFound {
        /// Requested import path
        import_path: String,
    },
}

impl ResolveError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors from the symbol locator
#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    /// A type reference names a qualifier the file does not import
    #[error("qualifier not found: '{qualifier}' in {file}")]
    QualifierNotFound {
        /// Package qualifier as written
        qualifier: String,
        /// File holding the reference
        file: PathBuf,
    },

    /// Imported package has no directory on disk
    #[error("package not found for '{qualifier}': {import_path}")]
    PackageNotFound {
        /// Package qualifier as written
        qualifier: String,
        /// Resolved import path
        import_path: String,
    },

    /// A candidate file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        /// Candidate file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A candidate file is not valid Go
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Module metadata could not be interpreted
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl LocateError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
