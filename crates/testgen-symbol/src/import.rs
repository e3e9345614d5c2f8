//! Import binding lookup and package origin
//!
//! Maps the short qualifier used in a file (`foo` in `foo.Bar`) back to the
//! import that introduced it.

use std::path::PathBuf;
use testgen_syntax::ImportBinding;

/// Find the import bound to `short` in a file's import list
///
/// An aliased import matches only on its alias; an unaliased import matches
/// on its last path segment with any `/v<digits>` suffix removed. Blank and
/// dot imports never match. The first match wins.
#[must_use]
pub fn find_import<'a>(short: &str, imports: &'a [ImportBinding]) -> Option<&'a ImportBinding> {
    imports
        .iter()
        .filter(|imp| imp.is_qualifying())
        .find(|imp| imp.local_name() == short)
}

/// Where a located package comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Standard library; sources are never scanned
    Stdlib,

    /// Current module, a dependency, or vendored code
    Project,
}

/// A package directory on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLocation {
    /// Import path that was resolved
    pub import_path: String,

    /// Package directory
    pub dir: PathBuf,

    /// Standard library or project code
    pub origin: Origin,
}

impl PackageLocation {
    /// Whether lookups should skip this package
    #[inline]
    #[must_use]
    pub fn is_stdlib(&self) -> bool {
        self.origin == Origin::Stdlib
    }
}
