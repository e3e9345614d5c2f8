//! Read-only filesystem seam
//!
//! The locator only ever reads; everything it needs from the filesystem
//! goes through [`SourceFs`] so tests can substitute an in-memory tree.

use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Filesystem operations used during symbol search
pub trait SourceFs: Send + Sync {
    /// Read a file to a string
    ///
    /// # Errors
    /// Returns the underlying IO error
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Whether `path` exists
    fn exists(&self, path: &Path) -> bool;

    /// Whether `path` is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Non-test `.go` files under `dir`, sorted by name, depth-first
    ///
    /// # Errors
    /// Returns the underlying IO error
    fn go_files(&self, dir: &Path, recursive: bool) -> io::Result<Vec<PathBuf>>;
}

/// Whether `path` names a generated or hand-written test file
#[inline]
#[must_use]
pub fn is_test_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with("_test.go"))
}

/// Whether `path` names a Go source file
#[inline]
#[must_use]
pub fn is_go_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "go")
}

/// Real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

impl SourceFs for OsFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn go_files(&self, dir: &Path, recursive: bool) -> io::Result<Vec<PathBuf>> {
        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(if recursive { usize::MAX } else { 1 })
            .sort_by_file_name();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(io::Error::from)?;
            let path = entry.path();
            if entry.file_type().is_file() && is_go_file(path) && !is_test_file(path) {
                files.push(path.to_path_buf());
            }
        }
        Ok(files)
    }
}
