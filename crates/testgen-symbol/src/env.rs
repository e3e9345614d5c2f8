//! Go toolchain environment
//!
//! Locations of GOROOT, GOPATH and the module cache, detected from the
//! environment with `go env -json` as a fallback.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Toolchain directories used by package resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoEnv {
    /// Standard distribution root
    pub goroot: Option<PathBuf>,

    /// First GOPATH entry
    pub gopath: Option<PathBuf>,

    /// Module download cache
    pub gomodcache: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct GoEnvJson {
    #[serde(rename = "GOROOT", default)]
    goroot: String,
    #[serde(rename = "GOPATH", default)]
    gopath: String,
    #[serde(rename = "GOMODCACHE", default)]
    gomodcache: String,
}

fn non_empty(value: &str) -> Option<PathBuf> {
    std::env::split_paths(value).find(|p| !p.as_os_str().is_empty())
}

impl GoEnv {
    /// Create with explicit directories
    #[inline]
    #[must_use]
    pub fn new(goroot: Option<PathBuf>, gopath: Option<PathBuf>, gomodcache: Option<PathBuf>) -> Self {
        Self {
            goroot,
            gopath,
            gomodcache,
        }
    }

    /// Detect from `GOROOT`/`GOPATH`/`GOMODCACHE`, then `go env -json`,
    /// then `$HOME/go`
    #[must_use]
    pub fn detect() -> Self {
        let var = |name: &str| std::env::var(name).ok().and_then(|v| non_empty(&v));

        let mut env = Self::new(var("GOROOT"), var("GOPATH"), var("GOMODCACHE"));

        if env.goroot.is_none() || env.gopath.is_none() || env.gomodcache.is_none() {
            if let Some(probed) = Self::probe() {
                env = env.or(probed);
            }
        }

        if env.gopath.is_none() {
            env.gopath = std::env::var_os("HOME").map(|home| Path::new(&home).join("go"));
        }

        tracing::debug!(
            "go env: goroot={:?} gopath={:?} gomodcache={:?}",
            env.goroot,
            env.gopath,
            env.gomodcache
        );
        env
    }

    /// Ask the `go` tool; `None` when it is unavailable
    fn probe() -> Option<Self> {
        let output = Command::new("go").args(["env", "-json"]).output().ok()?;
        if !output.status.success() {
            return None;
        }
        Self::from_json(&output.stdout)
    }

    /// Parse the output of `go env -json`
    #[must_use]
    pub fn from_json(bytes: &[u8]) -> Option<Self> {
        let json: GoEnvJson = serde_json::from_slice(bytes).ok()?;
        Some(Self::new(
            non_empty(&json.goroot),
            non_empty(&json.gopath),
            non_empty(&json.gomodcache),
        ))
    }

    /// Fill unset fields from `other`
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self {
            goroot: self.goroot.or(other.goroot),
            gopath: self.gopath.or(other.gopath),
            gomodcache: self.gomodcache.or(other.gomodcache),
        }
    }

    /// Module cache, defaulting to `GOPATH/pkg/mod`
    #[must_use]
    pub fn modcache(&self) -> Option<PathBuf> {
        self.gomodcache
            .clone()
            .or_else(|| self.gopath.as_ref().map(|p| p.join("pkg").join("mod")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_go_env_json() {
        let json = br#"{"GOROOT":"/usr/local/go","GOPATH":"/home/u/go","GOMODCACHE":"","GOOS":"linux"}"#;
        let env = GoEnv::from_json(json).unwrap();
        assert_eq!(env.goroot, Some(PathBuf::from("/usr/local/go")));
        assert_eq!(env.gopath, Some(PathBuf::from("/home/u/go")));
        assert_eq!(env.gomodcache, None);
        assert_eq!(env.modcache(), Some(PathBuf::from("/home/u/go/pkg/mod")));
    }

    #[test]
    fn explicit_fields_win_over_fallback() {
        let explicit = GoEnv::new(Some("/opt/go".into()), None, None);
        let probed = GoEnv::new(Some("/usr/go".into()), Some("/gp".into()), None);
        let env = explicit.or(probed);
        assert_eq!(env.goroot, Some(PathBuf::from("/opt/go")));
        assert_eq!(env.gopath, Some(PathBuf::from("/gp")));
    }

    #[test]
    fn invalid_json_is_ignored() {
        assert!(GoEnv::from_json(b"not json").is_none());
    }
}
