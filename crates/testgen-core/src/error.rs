//! Error types for test generation
//!
//! Per-file failures fall into three groups:
//! - structural: the source or existing test file does not parse
//! - resolution: a type qualifier in a signature cannot be resolved
//! - collaborator: the generator, the store, or the configuration failed
//!
//! Absent symbols are not errors; they contribute nothing to the context.

use std::path::PathBuf;
use testgen_symbol::{LocateError, ResolveError};
use testgen_syntax::ParseError;

/// Generator collaborator failures
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// Transport failure
    #[error("request failed: {0}")]
    Request(String),

    /// Non-success HTTP status
    #[error("generator returned status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Response body could not be decoded
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Response contains no fenced code block
    #[error("code not found: {0}")]
    CodeNotFound(&'static str),

    /// No endpoint configured
    #[error("no generator endpoint configured")]
    NoEndpoint,
}

/// Configuration failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Home directory could not be determined
    #[error("cannot determine home directory")]
    NoHomeDir,

    /// IO error
    #[error("io error on {path}: {source}")]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON
    #[error("invalid config {path}: {source}")]
    Json {
        /// Config file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// Unknown key for `config set`
    #[error("unknown config key: '{0}'")]
    UnknownKey(String),

    /// Value not valid for key
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue {
        /// Config key
        key: String,
        /// Offending value
        value: String,
    },
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Main error type
#[derive(Debug, thiserror::Error)]
pub enum TestgenError {
    /// Source or existing test file does not parse
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Declaration lookup failed
    #[error(transparent)]
    Locate(#[from] LocateError),

    /// Package resolution failed
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Generator failed for one target
    #[error("generation failed for {target}: {source}")]
    Generate {
        /// Canonical test name of the target
        target: String,
        /// Underlying error
        #[source]
        source: GenerateError,
    },

    /// Reading or writing a file failed
    #[error("io error on {path}: {source}")]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Invalid target filter
    #[error("invalid filter: {0}")]
    Filter(#[from] regex::Error),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl TestgenError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create generation error for a target
    pub fn generate(target: impl Into<String>, source: GenerateError) -> Self {
        Self::Generate {
            target: target.into(),
            source,
        }
    }

    /// Whether the error aborts only the current file
    ///
    /// Configuration and filter errors affect every file and always stop a
    /// batch, whatever the continue-on-error policy says.
    #[inline]
    #[must_use]
    pub fn is_fatal_for_file(&self) -> bool {
        !matches!(self, Self::Config(_) | Self::Filter(_))
    }
}
