//! Parse errors
//!
//! Every variant is fatal for the file that produced it: a malformed file
//! makes all further analysis of it meaningless.

use std::path::PathBuf;

/// Errors produced while parsing Go source
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    /// tree-sitter rejected the Go grammar
    #[error("parser initialization failed: {0}")]
    ParserInit(String),

    /// tree-sitter returned no tree at all
    #[error("parse failed for {path}")]
    ParseFailed {
        /// File being parsed
        path: PathBuf,
    },

    /// The tree contains an ERROR or MISSING node
    #[error("syntax error in {path} at {line}:{column} near `{snippet}`")]
    Syntax {
        /// File being parsed
        path: PathBuf,
        /// 1-based line
        line: usize,
        /// 1-based column
        column: usize,
        /// Offending source text, truncated
        snippet: String,
    },

    /// The file has no `package` clause
    #[error("missing package clause in {path}")]
    MissingPackage {
        /// File being parsed
        path: PathBuf,
    },
}

impl ParseError {
    /// Path of the file that failed, when known
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::ParserInit(_) => None,
            Self::ParseFailed { path }
            | Self::Syntax { path, .. }
            | Self::MissingPackage { path } => Some(path),
        }
    }
}
