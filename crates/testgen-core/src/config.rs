//! Persisted configuration
//!
//! JSON at `$HOME/.go-testgen/config.json`. A missing file is created with
//! defaults on first load.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use testgen_symbol::GoEnv;

/// Directory under the home directory holding configuration
pub const CONFIG_DIR: &str = ".go-testgen";

/// Configuration file name
pub const CONFIG_FILE: &str = "config.json";

/// Keys accepted by [`Config::set`]
pub const CONFIG_KEYS: &[&str] = &[
    "endpoint",
    "timeout_secs",
    "prompt",
    "goroot",
    "gopath",
    "gomodcache",
    "formatter",
];

/// go-testgen configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Completion endpoint URL
    pub endpoint: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Custom guidance appended to every prompt
    pub prompt: Option<String>,

    /// GOROOT override
    pub goroot: Option<PathBuf>,

    /// GOPATH override
    pub gopath: Option<PathBuf>,

    /// GOMODCACHE override
    pub gomodcache: Option<PathBuf>,

    /// Formatter run on written test files; empty disables formatting
    pub formatter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout_secs: 120,
            prompt: None,
            goroot: None,
            gopath: None,
            gomodcache: None,
            formatter: "goimports".to_string(),
        }
    }
}

fn optional<T: From<String>>(value: &str) -> Option<T> {
    let value = value.trim();
    (!value.is_empty()).then(|| T::from(value.to_string()))
}

impl Config {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With endpoint
    #[inline]
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// With custom prompt
    #[inline]
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Default location, `$HOME/.go-testgen/config.json`
    ///
    /// # Errors
    /// Returns [`ConfigError::NoHomeDir`] when no home directory is known
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::home_dir()
            .map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
            .ok_or(ConfigError::NoHomeDir)
    }

    /// Load from the default location
    ///
    /// # Errors
    /// See [`Config::load_from`]
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load from `path`, writing defaults when the file does not exist
    ///
    /// # Errors
    /// Returns IO or JSON errors
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            tracing::info!("created default config at {}", path.display());
            return Ok(config);
        }

        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save to the default location
    ///
    /// # Errors
    /// See [`Config::save_to`]
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::default_path()?)
    }

    /// Save to `path` as pretty JSON, creating parent directories
    ///
    /// # Errors
    /// Returns IO or JSON errors
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| ConfigError::io_error(dir, e))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(|e| ConfigError::io_error(path, e))
    }

    /// Set one key from its textual value
    ///
    /// An empty value clears optional keys.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnknownKey`] or [`ConfigError::InvalidValue`]
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "endpoint" => self.endpoint = value.trim().to_string(),
            "timeout_secs" => {
                self.timeout_secs = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                })?;
            }
            "prompt" => self.prompt = optional(value),
            "goroot" => self.goroot = optional(value),
            "gopath" => self.gopath = optional(value),
            "gomodcache" => self.gomodcache = optional(value),
            "formatter" => self.formatter = value.trim().to_string(),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Toolchain environment: configured overrides, then detection
    #[must_use]
    pub fn go_env(&self) -> GoEnv {
        let explicit = GoEnv::new(self.goroot.clone(), self.gopath.clone(), self.gomodcache.clone());
        if explicit.goroot.is_some() && explicit.gopath.is_some() && explicit.gomodcache.is_some() {
            return explicit;
        }
        explicit.or(GoEnv::detect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_writes_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(CONFIG_DIR).join(CONFIG_FILE);

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn set_and_reload() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(CONFIG_FILE);

        let mut config = Config::new();
        config.set("endpoint", "http://localhost:9000/complete").unwrap();
        config.set("timeout_secs", "30").unwrap();
        config.set("goroot", "/opt/go").unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.endpoint, "http://localhost:9000/complete");
        assert_eq!(loaded.timeout_secs, 30);
        assert_eq!(loaded.goroot, Some(PathBuf::from("/opt/go")));

        config.set("goroot", "").unwrap();
        assert_eq!(config.goroot, None);
    }

    #[test]
    fn invalid_keys_and_values() {
        let mut config = Config::new();
        assert!(matches!(config.set("model", "x"), Err(ConfigError::UnknownKey(_))));
        assert!(matches!(
            config.set("timeout_secs", "soon"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"endpoint":"http://x"}"#).unwrap();
        assert_eq!(config.formatter, "goimports");
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn fully_configured_env_skips_detection() {
        let mut config = Config::new();
        config.set("goroot", "/g").unwrap();
        config.set("gopath", "/p").unwrap();
        config.set("gomodcache", "/m").unwrap();
        assert_eq!(
            config.go_env(),
            GoEnv::new(Some("/g".into()), Some("/p".into()), Some("/m".into()))
        );
    }
}
