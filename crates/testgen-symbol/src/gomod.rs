//! Minimal `go.mod` reader
//!
//! Only the directives that affect where a package lives are kept:
//! `module`, `require` and `replace`.

use crate::error::ResolveError;
use std::path::Path;

/// Parsed `go.mod`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoMod {
    /// Module path
    pub module: String,

    /// Required modules as `(path, version)`
    pub requires: Vec<(String, String)>,

    /// Replace directives
    pub replaces: Vec<Replace>,
}

/// One `replace old [v] => new [v]` directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replace {
    /// Replaced module path
    pub old: String,

    /// Replacement path or module
    pub new: String,

    /// Replacement version, absent for local directories
    pub version: Option<String>,
}

impl Replace {
    /// Whether the replacement is a directory relative to the module root
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.new.starts_with("./") || self.new.starts_with("../") || self.new.starts_with('/')
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Block {
    None,
    Require,
    Replace,
    Other,
}

fn unquote(s: &str) -> &str {
    s.trim_matches(|c| c == '"' || c == '`')
}

impl GoMod {
    /// Parse `go.mod` text read from `path`
    ///
    /// # Errors
    /// Returns [`ResolveError::InvalidGoMod`] for a malformed directive or a
    /// missing `module` line
    pub fn parse(path: &Path, text: &str) -> Result<Self, ResolveError> {
        let invalid = |line: usize, message: &str| ResolveError::InvalidGoMod {
            path: path.to_path_buf(),
            line,
            message: message.to_string(),
        };

        let mut gomod = Self::default();
        let mut block = Block::None;

        for (idx, raw) in text.lines().enumerate() {
            let lineno = idx + 1;
            let line = raw.split("//").next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            if block != Block::None {
                if line == ")" {
                    block = Block::None;
                    continue;
                }
                match block {
                    Block::Require => gomod.require(line).ok_or_else(|| invalid(lineno, "bad require"))?,
                    Block::Replace => gomod.replace(line).ok_or_else(|| invalid(lineno, "bad replace"))?,
                    _ => {}
                }
                continue;
            }

            let (directive, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
            let rest = rest.trim();
            let opens_block = rest == "(";

            match directive {
                "module" => gomod.module = unquote(rest).to_string(),
                "require" if opens_block => block = Block::Require,
                "require" => gomod.require(rest).ok_or_else(|| invalid(lineno, "bad require"))?,
                "replace" if opens_block => block = Block::Replace,
                "replace" => gomod.replace(rest).ok_or_else(|| invalid(lineno, "bad replace"))?,
                _ if opens_block => block = Block::Other,
                _ => {}
            }
        }

        if gomod.module.is_empty() {
            return Err(invalid(1, "missing module directive"));
        }
        Ok(gomod)
    }

    fn require(&mut self, spec: &str) -> Option<()> {
        let mut parts = spec.split_whitespace();
        let path = unquote(parts.next()?);
        let version = parts.next()?;
        self.requires.push((path.to_string(), version.to_string()));
        Some(())
    }

    fn replace(&mut self, spec: &str) -> Option<()> {
        let (old, new) = spec.split_once("=>")?;
        let old = unquote(old.split_whitespace().next()?);
        let mut new = new.split_whitespace();
        let target = unquote(new.next()?);
        self.replaces.push(Replace {
            old: old.to_string(),
            new: target.to_string(),
            version: new.next().map(str::to_string),
        });
        Some(())
    }

    /// Longest required module that prefixes `import_path`
    #[must_use]
    pub fn required_for(&self, import_path: &str) -> Option<(&str, &str)> {
        self.requires
            .iter()
            .filter(|(module, _)| is_within(import_path, module))
            .max_by_key(|(module, _)| module.len())
            .map(|(m, v)| (m.as_str(), v.as_str()))
    }

    /// Longest replace directive that prefixes `import_path`
    #[must_use]
    pub fn replacement_for(&self, import_path: &str) -> Option<&Replace> {
        self.replaces
            .iter()
            .filter(|r| is_within(import_path, &r.old))
            .max_by_key(|r| r.old.len())
    }
}

/// Whether `path` equals `prefix` or lies below it
#[must_use]
pub fn is_within(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Path below `prefix`, empty when equal
#[must_use]
pub fn suffix_of<'a>(path: &'a str, prefix: &str) -> &'a str {
    path.strip_prefix(prefix)
        .map(|rest| rest.trim_start_matches('/'))
        .unwrap_or("")
}

/// Module cache escaping: each upper-case letter becomes `!` + lower-case
#[must_use]
pub fn escape_module_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            out.push('!');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
