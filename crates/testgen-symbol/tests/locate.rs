//! Symbol lookup over real module trees

use pretty_assertions::assert_eq;
use std::path::Path;
use testgen_symbol::{GoEnv, LocateError, PackageResolver, SymbolLocator};
use testgen_syntax::{GoParser, SourceFile, SourceParser};
use testgen_test_utils::GoModule;

fn parse(path: &Path) -> SourceFile {
    let text = std::fs::read_to_string(path).unwrap();
    GoParser::new().parse(path, &text).unwrap()
}

fn locator(modcache: Option<&Path>) -> SymbolLocator {
    let env = GoEnv::new(None, None, modcache.map(Path::to_path_buf));
    SymbolLocator::with_resolver(PackageResolver::new(env))
}

#[test]
fn same_file_declaration_wins_over_sibling() {
    let module = GoModule::new("example.com/app")
        .file("svc/a.go", "package svc\n\ntype Config struct{ A int }\n\nfunc Run(c Config) {}\n")
        .file("svc/b.go", "package svc\n\ntype Config struct{ B int }\n");
    let file = parse(&module.path("svc/a.go"));

    let found = locator(None).find_type(&file, None, "Config").unwrap();
    assert_eq!(found.as_deref(), Some("type Config struct{ A int }"));
}

#[test]
fn sibling_file_is_searched_but_not_tests() {
    let module = GoModule::new("example.com/app")
        .file("svc/a.go", "package svc\n\nfunc Run(c Config) {}\n")
        .file("svc/a_test.go", "package svc\n\ntype Config struct{ FromTest bool }\n")
        .file("svc/b.go", "package svc\n\ntype Config struct{ B int }\n");
    let file = parse(&module.path("svc/a.go"));

    let found = locator(None).find_type(&file, None, "Config").unwrap();
    assert_eq!(found.as_deref(), Some("type Config struct{ B int }"));
}

#[test]
fn module_internal_package_resolves() {
    let module = GoModule::new("example.com/app")
        .file(
            "cmd/main.go",
            "package main\n\nimport \"example.com/app/internal/store\"\n\nfunc main() { store.Open() }\n",
        )
        .file(
            "internal/store/store.go",
            "package store\n\ntype DB struct{}\n\nfunc Open() *DB { return &DB{} }\n",
        );
    let file = parse(&module.path("cmd/main.go"));
    let locator = locator(None);

    assert_eq!(
        locator.find_type(&file, Some("store"), "DB").unwrap().as_deref(),
        Some("type DB struct{}")
    );
    assert_eq!(
        locator.find_function(&file, Some("store"), "", "Open").unwrap().as_deref(),
        Some("func Open() *DB { return &DB{} }")
    );
}

#[test]
fn versioned_import_resolves_through_modcache() {
    let cache = tempfile::tempdir().unwrap();
    let pkg = cache.path().join("github.com/volatiletech/null/v9@v9.0.0");
    std::fs::create_dir_all(&pkg).unwrap();
    std::fs::write(pkg.join("string.go"), "package null\n\ntype String struct{ Valid bool }\n").unwrap();

    let module = GoModule::new("example.com/app")
        .file(
            "go.mod",
            "module example.com/app\n\ngo 1.21\n\nrequire github.com/volatiletech/null/v9 v9.0.0\n",
        )
        .file(
            "user.go",
            "package app\n\nimport \"github.com/volatiletech/null/v9\"\n\nfunc Name(s null.String) string { return \"\" }\n",
        );
    let file = parse(&module.path("user.go"));

    let found = locator(Some(cache.path())).find_type(&file, Some("null"), "String").unwrap();
    assert_eq!(found.as_deref(), Some("type String struct{ Valid bool }"));
}

#[test]
fn aliased_versioned_import_resolves_through_modcache() {
    let cache = tempfile::tempdir().unwrap();
    let pkg = cache.path().join("github.com/volatiletech/null/v9@v9.0.0");
    std::fs::create_dir_all(&pkg).unwrap();
    std::fs::write(pkg.join("time.go"), "package null\n\ntype Time struct{ Valid bool }\n").unwrap();

    let module = GoModule::new("example.com/app")
        .file(
            "go.mod",
            "module example.com/app\n\nrequire github.com/volatiletech/null/v9 v9.0.0\n",
        )
        .file(
            "event.go",
            "package app\n\nimport nl \"github.com/volatiletech/null/v9\"\n\nfunc At(t nl.Time) {}\n",
        );
    let file = parse(&module.path("event.go"));
    let locator = locator(Some(cache.path()));

    let found = locator.find_type(&file, Some("nl"), "Time").unwrap();
    assert_eq!(found.as_deref(), Some("type Time struct{ Valid bool }"));
    assert!(matches!(
        locator.find_type(&file, Some("null"), "Time"),
        Err(LocateError::QualifierNotFound { .. })
    ));
}

#[test]
fn aliased_import_resolves_through_local_replace() {
    let module = GoModule::new("example.com/app")
        .file(
            "go.mod",
            "module example.com/app\n\nrequire example.com/lib v1.2.0\n\nreplace example.com/lib => ./third_party/lib\n",
        )
        .file("third_party/lib/codec/codec.go", "package codec\n\ntype Encoder interface{ Encode() }\n")
        .file(
            "main.go",
            "package app\n\nimport enc \"example.com/lib/codec\"\n\nfunc Use(e enc.Encoder) {}\n",
        );
    let file = parse(&module.path("main.go"));

    let found = locator(None).find_type(&file, Some("enc"), "Encoder").unwrap();
    assert_eq!(found.as_deref(), Some("type Encoder interface{ Encode() }"));
}

#[test]
fn stdlib_symbols_are_not_searched() {
    let module = GoModule::new("example.com/app").file(
        "main.go",
        "package app\n\nimport \"context\"\n\nfunc Run(ctx context.Context) {}\n",
    );
    let file = parse(&module.path("main.go"));

    assert_eq!(locator(None).find_type(&file, Some("context"), "Context").unwrap(), None);
}

#[test]
fn unknown_qualifier_differs_for_types_and_functions() {
    let module = GoModule::new("example.com/app").file("main.go", "package app\n\nfunc Run() {}\n");
    let file = parse(&module.path("main.go"));
    let locator = locator(None);

    let err = locator.find_type(&file, Some("missing"), "T").unwrap_err();
    assert!(matches!(err, LocateError::QualifierNotFound { ref qualifier, .. } if qualifier == "missing"));
    assert_eq!(locator.find_function(&file, Some("missing"), "", "F").unwrap(), None);
}
