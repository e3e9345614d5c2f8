//! Generation policy: mode and granularity

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What to do when a test already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Leave existing tests alone
    Skip,

    /// Generate again and add alongside existing tests
    #[default]
    Append,
}

/// Scope of skip/append decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Whole test file at once
    File,

    /// Each target function independently
    #[default]
    Function,
}

/// Mode × granularity, supplied by the caller and never mutated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GenerationPolicy {
    /// Skip or append
    pub mode: Mode,

    /// File or function
    pub granularity: Granularity,
}

impl GenerationPolicy {
    /// Create policy
    #[inline]
    #[must_use]
    pub fn new(mode: Mode, granularity: Granularity) -> Self {
        Self { mode, granularity }
    }
}

impl fmt::Display for GenerationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mode={} granularity={}", self.mode, self.granularity)
    }
}

/// Unknown policy keyword
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: '{value}' (expected {expected})")]
pub struct PolicyParseError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Skip => "skip",
            Self::Append => "append",
        })
    }
}

impl FromStr for Mode {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "append" => Ok(Self::Append),
            _ => Err(PolicyParseError {
                kind: "mode",
                value: s.to_string(),
                expected: "skip|append",
            }),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::File => "file",
            Self::Function => "function",
        })
    }
}

impl FromStr for Granularity {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "function" | "func" => Ok(Self::Function),
            _ => Err(PolicyParseError {
                kind: "granularity",
                value: s.to_string(),
                expected: "file|function",
            }),
        }
    }
}
