//! Testing utilities for the go-testgen workspace
//!
//! Shared fixtures: on-disk Go module trees and a scripted generator.

#![allow(missing_docs)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use testgen_core::{GenerateError, TestGenerator};

/// Temporary directory laid out as a Go module
#[derive(Debug)]
pub struct GoModule {
    dir: TempDir,
}

impl GoModule {
    /// Create a module root with a `go.mod` declaring `module`
    pub fn new(module: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("go.mod"), format!("module {module}\n\ngo 1.21\n")).unwrap();
        Self { dir }
    }

    /// Write `content` at `rel`, creating parent directories
    pub fn file(self, rel: &str, content: &str) -> Self {
        self.write(rel, content);
        self
    }

    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// File content, `None` when absent
    pub fn read(&self, rel: &str) -> Option<String> {
        std::fs::read_to_string(self.path(rel)).ok()
    }
}

/// Generator answering with an empty fenced test named after the prompt
///
/// Recognises `Name the test function <Name>.` in the prompt; bodies can be
/// overridden per test name. Every prompt is recorded; clones share the
/// record.
#[derive(Debug, Clone, Default)]
pub struct ScriptedGenerator {
    bodies: BTreeMap<String, String>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `test_name` with `code` instead of an empty test
    pub fn with_body(mut self, test_name: &str, code: &str) -> Self {
        self.bodies.insert(test_name.to_string(), code.to_string());
        self
    }

    /// Prompts received so far, in order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Test names requested so far, in order
    pub fn requested(&self) -> Vec<String> {
        self.prompts().iter().filter_map(|p| requested_name(p)).collect()
    }
}

/// Test name asked for by a prompt
pub fn requested_name(prompt: &str) -> Option<String> {
    let rest = prompt.split("Name the test function ").nth(1)?;
    let end = rest.find('.')?;
    Some(rest[..end].to_string())
}

impl TestGenerator for ScriptedGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let name = requested_name(prompt).ok_or_else(|| GenerateError::InvalidResponse("no test name in prompt".into()))?;
        let code = self
            .bodies
            .get(&name)
            .cloned()
            .unwrap_or_else(|| format!("func {name}(t *testing.T) {{}}"));
        Ok(format!("Sure.\n```go\n{code}\n```\n"))
    }
}
