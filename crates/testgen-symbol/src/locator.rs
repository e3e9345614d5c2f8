//! Declaration lookup across file, package and imported packages
//!
//! Search order, stopping at the first hit:
//!
//! 1. the current file (unqualified references only)
//! 2. sibling non-test files of the same package directory
//! 3. every non-test file below the imported package directory
//!
//! Standard-library packages are never scanned. Package scans are memoized
//! for the lifetime of the locator.

use crate::error::{LocateError, ResolveError};
use crate::fs::{OsFs, SourceFs};
use crate::import::find_import;
use crate::resolver::PackageResolver;
use moka::sync::Cache;
use std::path::{Path, PathBuf};
use testgen_syntax::{GoParser, SourceFile, SourceParser};

/// Default memo capacity (entries)
const MEMO_CAPACITY: u64 = 10_000;

/// Declaration source text, or `None` when nothing was found
pub type ResolvedSource = Option<String>;

/// What is being looked up
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SymbolKey {
    /// Top-level type
    Type(String),

    /// Function (empty receiver) or method
    Func {
        /// Receiver base type name, empty for plain functions
        receiver: String,
        /// Function name
        name: String,
    },
}

impl SymbolKey {
    fn find_in(&self, file: &SourceFile) -> ResolvedSource {
        match self {
            Self::Type(name) => file.find_type(name).map(|t| t.source.clone()),
            Self::Func { receiver, name } => file.find_func(receiver, name).map(|f| f.source.clone()),
        }
    }

    fn is_type(&self) -> bool {
        matches!(self, Self::Type(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MemoKey {
    dir: PathBuf,
    excluded: Option<PathBuf>,
    symbol: SymbolKey,
}

/// Finds the declaring source text of types and functions
pub struct SymbolLocator<F: SourceFs = OsFs, P: SourceParser = GoParser> {
    fs: F,
    parser: P,
    resolver: PackageResolver,
    memo: Cache<MemoKey, ResolvedSource>,
}

impl<F: SourceFs, P: SourceParser> std::fmt::Debug for SymbolLocator<F, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolLocator")
            .field("resolver", &self.resolver)
            .field("memo_entries", &self.memo.entry_count())
            .finish_non_exhaustive()
    }
}

impl SymbolLocator {
    /// Locator over the real filesystem with the tree-sitter parser
    #[must_use]
    pub fn with_resolver(resolver: PackageResolver) -> Self {
        Self::new(OsFs, GoParser::new(), resolver)
    }
}

impl<F: SourceFs, P: SourceParser> SymbolLocator<F, P> {
    /// Create locator from its collaborators
    #[must_use]
    pub fn new(fs: F, parser: P, resolver: PackageResolver) -> Self {
        Self {
            fs,
            parser,
            resolver,
            memo: Cache::new(MEMO_CAPACITY),
        }
    }

    /// Filesystem collaborator
    #[inline]
    #[must_use]
    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// Parser collaborator
    #[inline]
    #[must_use]
    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// Package resolver
    #[inline]
    #[must_use]
    pub fn resolver(&self) -> &PackageResolver {
        &self.resolver
    }

    /// Find a type declaration
    ///
    /// # Errors
    /// Fails when `qualifier` is not imported by `file`, when the imported
    /// package has no directory, or when a candidate file cannot be read or
    /// parsed
    pub fn find_type(
        &self,
        file: &SourceFile,
        qualifier: Option<&str>,
        name: &str,
    ) -> Result<ResolvedSource, LocateError> {
        self.find(file, qualifier, SymbolKey::Type(name.to_string()))
    }

    /// Find a function (empty `type_name`) or method declaration
    ///
    /// An unknown qualifier or missing package yields `None`.
    ///
    /// # Errors
    /// Fails when a candidate file cannot be read or parsed
    pub fn find_function(
        &self,
        file: &SourceFile,
        qualifier: Option<&str>,
        type_name: &str,
        func_name: &str,
    ) -> Result<ResolvedSource, LocateError> {
        self.find(
            file,
            qualifier,
            SymbolKey::Func {
                receiver: type_name.to_string(),
                name: func_name.to_string(),
            },
        )
    }

    fn find(&self, file: &SourceFile, qualifier: Option<&str>, key: SymbolKey) -> Result<ResolvedSource, LocateError> {
        let Some(qualifier) = qualifier.filter(|q| !q.is_empty()) else {
            if let Some(found) = key.find_in(file) {
                return Ok(Some(found));
            }
            return self.scan(file.dir(), Some(&file.path), &key);
        };

        let Some(import) = find_import(qualifier, &file.imports) else {
            if key.is_type() {
                return Err(LocateError::QualifierNotFound {
                    qualifier: qualifier.to_string(),
                    file: file.path.clone(),
                });
            }
            tracing::warn!("qualifier '{}' not imported in {}", qualifier, file.path.display());
            return Ok(None);
        };

        let location = match self.resolver.locate(&self.fs, &import.path, file.dir()) {
            Ok(location) => location,
            Err(ResolveError::PackageNotFound { import_path }) if !key.is_type() => {
                tracing::warn!("package not found: {}", import_path);
                return Ok(None);
            }
            Err(ResolveError::PackageNotFound { import_path }) => {
                return Err(LocateError::PackageNotFound {
                    qualifier: qualifier.to_string(),
                    import_path,
                });
            }
            Err(e) => return Err(e.into()),
        };

        if location.is_stdlib() {
            tracing::debug!("skipping stdlib package {}", location.import_path);
            return Ok(None);
        }

        self.scan(&location.dir, None, &key)
    }

    /// Search a package directory, non-recursively when a file is excluded
    fn scan(&self, dir: &Path, excluded: Option<&Path>, key: &SymbolKey) -> Result<ResolvedSource, LocateError> {
        let memo_key = MemoKey {
            dir: dir.to_path_buf(),
            excluded: excluded.map(Path::to_path_buf),
            symbol: key.clone(),
        };
        if let Some(hit) = self.memo.get(&memo_key) {
            return Ok(hit);
        }

        let recursive = excluded.is_none();
        let files = self
            .fs
            .go_files(dir, recursive)
            .map_err(|e| LocateError::io_error(dir, e))?;

        let mut found = None;
        for path in files {
            if excluded == Some(path.as_path()) {
                continue;
            }
            let text = self
                .fs
                .read_to_string(&path)
                .map_err(|e| LocateError::io_error(&path, e))?;
            let parsed = self.parser.parse(&path, &text)?;
            if let Some(source) = key.find_in(&parsed) {
                tracing::debug!("found {:?} in {}", key, path.display());
                found = Some(source);
                break;
            }
        }

        self.memo.insert(memo_key, found.clone());
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::GoEnv;
    use std::collections::BTreeMap;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory tree counting reads
    #[derive(Default)]
    struct MemFs {
        files: BTreeMap<PathBuf, String>,
        reads: AtomicUsize,
    }

    impl MemFs {
        fn with(mut self, path: &str, text: &str) -> Self {
            self.files.insert(PathBuf::from(path), text.to_string());
            self
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    impl SourceFs for MemFs {
        fn read_to_string(&self, path: &Path) -> io::Result<String> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        }

        fn exists(&self, path: &Path) -> bool {
            self.files.contains_key(path) || self.is_dir(path)
        }

        fn is_dir(&self, path: &Path) -> bool {
            self.files.keys().any(|p| p.starts_with(path) && p != path)
        }

        fn go_files(&self, dir: &Path, recursive: bool) -> io::Result<Vec<PathBuf>> {
            Ok(self
                .files
                .keys()
                .filter(|p| p.extension().is_some_and(|e| e == "go"))
                .filter(|p| !crate::fs::is_test_file(p))
                .filter(|p| {
                    if recursive {
                        p.starts_with(dir)
                    } else {
                        p.parent() == Some(dir)
                    }
                })
                .cloned()
                .collect())
        }
    }

    fn locator(fs: MemFs) -> SymbolLocator<MemFs> {
        let env = GoEnv::new(Some("/goroot".into()), None, None);
        SymbolLocator::new(fs, GoParser::new(), PackageResolver::new(env))
    }

    fn parse(path: &str, text: &str) -> SourceFile {
        GoParser::new().parse(Path::new(path), text).unwrap()
    }

    const MAIN: &str = "package app\n\nimport (\n\t\"fmt\"\n\tm \"example.com/app/model\"\n)\n\ntype Local struct{}\n\nfunc Run() { fmt.Println(m.User{}) }\n";

    fn project() -> MemFs {
        MemFs::default()
            .with("/app/go.mod", "module example.com/app\n")
            .with("/app/main.go", MAIN)
            .with("/app/helper.go", "package app\n\ntype Local int\n\ntype Sibling struct{}\n\nfunc (s *Sibling) Do() {}\n")
            .with("/app/model/user.go", "package model\n\ntype User struct {\n\tName string\n}\n")
            .with("/app/model/nested/role.go", "package nested\n\ntype Role string\n")
            .with("/app/model/user_test.go", "package model\n\ntype User struct{ Fake bool }\n")
    }

    #[test]
    fn local_file_has_priority() {
        let loc = locator(project());
        let file = parse("/app/main.go", MAIN);
        let found = loc.find_type(&file, None, "Local").unwrap();
        assert_eq!(found.as_deref(), Some("type Local struct{}"));
        assert_eq!(loc.fs().reads(), 0);
    }

    #[test]
    fn sibling_files_are_searched() {
        let loc = locator(project());
        let file = parse("/app/main.go", MAIN);
        assert_eq!(
            loc.find_type(&file, None, "Sibling").unwrap().as_deref(),
            Some("type Sibling struct{}")
        );
        assert!(loc
            .find_function(&file, None, "Sibling", "Do")
            .unwrap()
            .unwrap()
            .starts_with("func (s *Sibling) Do()"));
    }

    #[test]
    fn qualified_lookup_scans_package_recursively_skipping_tests() {
        let loc = locator(project());
        let file = parse("/app/main.go", MAIN);
        assert_eq!(
            loc.find_type(&file, Some("m"), "User").unwrap().as_deref(),
            Some("type User struct {\n\tName string\n}")
        );
        assert_eq!(
            loc.find_type(&file, Some("m"), "Role").unwrap().as_deref(),
            Some("type Role string")
        );
    }

    #[test]
    fn stdlib_qualifier_is_empty_without_scan() {
        let loc = locator(project());
        let file = parse("/app/main.go", MAIN);
        let reads_before = loc.fs().reads();
        assert_eq!(loc.find_type(&file, Some("fmt"), "Stringer").unwrap(), None);
        // only go.mod is read while resolving
        assert_eq!(loc.fs().reads(), reads_before + 1);
    }

    #[test]
    fn unknown_qualifier_is_hard_for_types_soft_for_functions() {
        let loc = locator(project());
        let file = parse("/app/main.go", MAIN);
        assert!(matches!(
            loc.find_type(&file, Some("nope"), "T"),
            Err(LocateError::QualifierNotFound { .. })
        ));
        assert_eq!(loc.find_function(&file, Some("nope"), "", "F").unwrap(), None);
    }

    #[test]
    fn missing_symbol_is_not_an_error() {
        let loc = locator(project());
        let file = parse("/app/main.go", MAIN);
        assert_eq!(loc.find_type(&file, None, "Missing").unwrap(), None);
    }

    #[test]
    fn parse_error_in_candidate_aborts_lookup() {
        let fs = project().with("/app/broken.go", "package app\n\nfunc Broken( {\n");
        let loc = locator(fs);
        let file = parse("/app/main.go", MAIN);
        assert!(matches!(
            loc.find_type(&file, None, "Sibling"),
            Err(LocateError::Parse(_))
        ));
    }

    #[test]
    fn package_scans_are_memoized() {
        let loc = locator(project());
        let file = parse("/app/main.go", MAIN);

        loc.find_type(&file, None, "Missing").unwrap();
        let after_first = loc.fs().reads();
        loc.find_type(&file, None, "Missing").unwrap();
        assert_eq!(loc.fs().reads(), after_first);
    }
}
