//! Import path to package directory
//!
//! Follows the Go build lookup order: the enclosing module, `GOROOT/src`,
//! `vendor/`, `replace` directives, the module cache, then GOPATH. A dot-less
//! path found nowhere is assumed to be standard library.

use crate::env::GoEnv;
use crate::error::ResolveError;
use crate::fs::SourceFs;
use crate::gomod::{escape_module_path, is_within, suffix_of, GoMod};
use crate::import::{Origin, PackageLocation};
use std::path::{Path, PathBuf};

/// Locates packages on disk
#[derive(Debug, Clone, Default)]
pub struct PackageResolver {
    env: GoEnv,
}

/// Enclosing module of a directory
#[derive(Debug, Clone)]
struct ModuleRoot {
    dir: PathBuf,
    gomod: GoMod,
}

impl PackageResolver {
    /// Create resolver over a toolchain environment
    #[inline]
    #[must_use]
    pub fn new(env: GoEnv) -> Self {
        Self { env }
    }

    /// Toolchain environment
    #[inline]
    #[must_use]
    pub fn env(&self) -> &GoEnv {
        &self.env
    }

    /// Classify a package directory
    ///
    /// Anything below `GOROOT/src` is standard library.
    #[must_use]
    pub fn classify(&self, dir: &Path) -> Origin {
        match &self.env.goroot {
            Some(goroot) if dir.starts_with(goroot.join("src")) => Origin::Stdlib,
            _ => Origin::Project,
        }
    }

    /// Resolve `import_path` as seen from a file in `from_dir`
    ///
    /// # Errors
    /// Returns [`ResolveError::PackageNotFound`] when no candidate directory
    /// exists, or an IO/parse error for the enclosing `go.mod`
    pub fn locate(
        &self,
        fs: &impl SourceFs,
        import_path: &str,
        from_dir: &Path,
    ) -> Result<PackageLocation, ResolveError> {
        let module = Self::module_root(fs, from_dir)?;

        if let Some(root) = &module {
            if is_within(import_path, &root.gomod.module) {
                let dir = join_rel(&root.dir, suffix_of(import_path, &root.gomod.module));
                return self.found(fs, import_path, dir);
            }
        }

        if is_stdlib_path(import_path) {
            if let Some(goroot) = &self.env.goroot {
                let dir = join_rel(&goroot.join("src"), import_path);
                if fs.is_dir(&dir) {
                    return self.found(fs, import_path, dir);
                }
            }
        }

        if let Some(root) = &module {
            if let Some(dir) = self.module_candidate(fs, root, import_path) {
                return self.found(fs, import_path, dir);
            }
        }

        if let Some(gopath) = &self.env.gopath {
            let dir = join_rel(&gopath.join("src"), import_path);
            if fs.is_dir(&dir) {
                return self.found(fs, import_path, dir);
            }
        }

        if is_stdlib_path(import_path) {
            let dir = self
                .env
                .goroot
                .as_ref()
                .map(|goroot| join_rel(&goroot.join("src"), import_path))
                .unwrap_or_default();
            tracing::debug!("assuming stdlib for unresolved package {}", import_path);
            return Ok(PackageLocation {
                import_path: import_path.to_string(),
                dir,
                origin: Origin::Stdlib,
            });
        }

        Err(ResolveError::PackageNotFound {
            import_path: import_path.to_string(),
        })
    }

    fn module_candidate(&self, fs: &impl SourceFs, root: &ModuleRoot, import_path: &str) -> Option<PathBuf> {
        let vendored = join_rel(&root.dir.join("vendor"), import_path);
        if fs.is_dir(&vendored) {
            return Some(vendored);
        }

        if let Some(replace) = root.gomod.replacement_for(import_path) {
            let rest = suffix_of(import_path, &replace.old);
            if replace.is_local() {
                return Some(join_rel(&root.dir.join(&replace.new), rest));
            }
            let version = replace.version.as_deref()?;
            return self.cached(&replace.new, version, rest);
        }

        let (module, version) = root.gomod.required_for(import_path)?;
        self.cached(module, version, suffix_of(import_path, module))
    }

    fn cached(&self, module: &str, version: &str, rest: &str) -> Option<PathBuf> {
        let cache = self.env.modcache()?;
        let dir = cache.join(format!("{}@{}", escape_module_path(module), version));
        Some(join_rel(&dir, rest))
    }

    fn found(&self, fs: &impl SourceFs, import_path: &str, dir: PathBuf) -> Result<PackageLocation, ResolveError> {
        if !fs.is_dir(&dir) {
            return Err(ResolveError::PackageNotFound {
                import_path: import_path.to_string(),
            });
        }
        let origin = self.classify(&dir);
        tracing::debug!("resolved {} -> {}", import_path, dir.display());
        Ok(PackageLocation {
            import_path: import_path.to_string(),
            dir,
            origin,
        })
    }

    fn module_root(fs: &impl SourceFs, from_dir: &Path) -> Result<Option<ModuleRoot>, ResolveError> {
        for dir in from_dir.ancestors() {
            let path = dir.join("go.mod");
            if !fs.exists(&path) {
                continue;
            }
            let text = fs
                .read_to_string(&path)
                .map_err(|e| ResolveError::io_error(&path, e))?;
            let gomod = GoMod::parse(&path, &text)?;
            return Ok(Some(ModuleRoot {
                dir: dir.to_path_buf(),
                gomod,
            }));
        }
        Ok(None)
    }
}

/// Standard library paths have no dot in their first element
#[must_use]
pub fn is_stdlib_path(import_path: &str) -> bool {
    import_path
        .split('/')
        .next()
        .is_some_and(|first| !first.contains('.'))
}

fn join_rel(base: &Path, rel: &str) -> PathBuf {
    rel.split('/')
        .filter(|s| !s.is_empty())
        .fold(base.to_path_buf(), |acc, seg| acc.join(seg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::OsFs;
    use std::fs;

    fn mkdir(path: &Path) {
        fs::create_dir_all(path).unwrap();
    }

    #[test]
    fn module_prefix_maps_into_module_root() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::write(root.join("go.mod"), "module example.com/app\n").unwrap();
        mkdir(&root.join("internal/store"));
        mkdir(&root.join("cmd"));

        let loc = PackageResolver::default()
            .locate(&OsFs, "example.com/app/internal/store", &root.join("cmd"))
            .unwrap();
        assert_eq!(loc.dir, root.join("internal").join("store"));
        assert_eq!(loc.origin, Origin::Project);
    }

    #[test]
    fn unresolved_dotless_path_falls_back_to_stdlib() {
        let tmp = tempfile::tempdir().unwrap();
        let resolver = PackageResolver::new(GoEnv::new(Some("/nonexistent/goroot".into()), None, None));
        let loc = resolver.locate(&OsFs, "net/http", tmp.path()).unwrap();
        assert!(loc.is_stdlib());
        assert_eq!(loc.dir, PathBuf::from("/nonexistent/goroot/src/net/http"));
    }

    #[test]
    fn goroot_package_is_classified_from_its_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let goroot = tmp.path().join("goroot");
        mkdir(&goroot.join("src/fmt"));

        let resolver = PackageResolver::new(GoEnv::new(Some(goroot.clone()), None, None));
        let loc = resolver.locate(&OsFs, "fmt", tmp.path()).unwrap();
        assert_eq!(loc.origin, Origin::Stdlib);
        assert_eq!(loc.dir, goroot.join("src").join("fmt"));
    }

    #[test]
    fn dotless_gopath_package_is_project() {
        let tmp = tempfile::tempdir().unwrap();
        let goroot = tmp.path().join("goroot");
        let gopath = tmp.path().join("gopath");
        mkdir(&goroot.join("src/fmt"));
        mkdir(&gopath.join("src/myproj/util"));
        let work = tmp.path().join("work");
        mkdir(&work);

        let resolver = PackageResolver::new(GoEnv::new(Some(goroot), Some(gopath.clone()), None));
        let loc = resolver.locate(&OsFs, "myproj/util", &work).unwrap();
        assert_eq!(loc.origin, Origin::Project);
        assert_eq!(loc.dir, gopath.join("src").join("myproj").join("util"));
    }

    #[test]
    fn dotless_replace_target_is_project() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("app");
        mkdir(&root);
        mkdir(&tmp.path().join("mylib/codec"));
        fs::write(root.join("go.mod"), "module example.com/app\n\nreplace mylib => ../mylib\n").unwrap();

        let resolver = PackageResolver::new(GoEnv::new(Some(tmp.path().join("goroot")), None, None));
        let loc = resolver.locate(&OsFs, "mylib/codec", &root).unwrap();
        assert_eq!(loc.origin, Origin::Project);
        assert_eq!(loc.dir, root.join("../mylib").join("codec"));
    }

    #[test]
    fn dotless_module_path_is_not_stdlib() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::write(root.join("go.mod"), "module myapp\n").unwrap();
        mkdir(&root.join("util"));

        let loc = PackageResolver::default().locate(&OsFs, "myapp/util", root).unwrap();
        assert_eq!(loc.origin, Origin::Project);
    }

    #[test]
    fn vendor_then_replace_then_modcache() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("app");
        let cache = tmp.path().join("modcache");
        mkdir(&root);
        fs::write(
            root.join("go.mod"),
            "module example.com/app\n\nrequire (\n\texample.com/vend v1.0.0\n\texample.com/Remote v1.2.3\n\texample.com/lib v1.0.0\n)\n\nreplace example.com/lib => ../lib\n",
        )
        .unwrap();
        mkdir(&root.join("vendor/example.com/vend"));
        mkdir(&tmp.path().join("lib/sub"));
        mkdir(&cache.join("example.com/!remote@v1.2.3/pkg"));

        let resolver = PackageResolver::new(GoEnv::new(None, None, Some(cache.clone())));

        let vend = resolver.locate(&OsFs, "example.com/vend", &root).unwrap();
        assert_eq!(vend.dir, root.join("vendor").join("example.com").join("vend"));

        let lib = resolver.locate(&OsFs, "example.com/lib/sub", &root).unwrap();
        assert_eq!(lib.dir, root.join("../lib").join("sub"));

        let remote = resolver.locate(&OsFs, "example.com/Remote/pkg", &root).unwrap();
        assert_eq!(remote.dir, cache.join("example.com/!remote@v1.2.3").join("pkg"));
    }

    #[test]
    fn missing_package_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("go.mod"), "module example.com/app\n").unwrap();
        let err = PackageResolver::default()
            .locate(&OsFs, "example.com/other/pkg", tmp.path())
            .unwrap_err();
        assert!(matches!(err, ResolveError::PackageNotFound { .. }));
    }

    #[test]
    fn classify_under_goroot() {
        let resolver = PackageResolver::new(GoEnv::new(Some("/usr/local/go".into()), None, None));
        assert_eq!(resolver.classify(Path::new("/usr/local/go/src/fmt")), Origin::Stdlib);
        assert_eq!(resolver.classify(Path::new("/home/u/app/fmt")), Origin::Project);
        assert_eq!(PackageResolver::default().classify(Path::new("/usr/local/go/src/fmt")), Origin::Project);
    }

    #[test]
    fn stdlib_path_detection() {
        assert!(is_stdlib_path("fmt"));
        assert!(is_stdlib_path("encoding/json"));
        assert!(!is_stdlib_path("github.com/x/y"));
    }
}
