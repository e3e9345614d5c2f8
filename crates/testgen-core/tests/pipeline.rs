//! End-to-end generation over on-disk modules

use pretty_assertions::assert_eq;
use testgen_composition::{GenerationPolicy, Granularity, Mode};
use testgen_core::{FileOutcome, Pipeline, PipelineOptions};
use testgen_symbol::{GoEnv, PackageResolver, SymbolLocator};
use testgen_test_utils::{GoModule, ScriptedGenerator};

const SERVICE: &str = r#"package greet

import (
	"fmt"

	"example.com/greet/model"
)

type Greeter struct {
	Prefix string
}

func (g *Greeter) Greet(u model.User) string {
	return fmt.Sprintf("%s %s", g.Prefix, format(u.Name))
}

func Process(g *Greeter) {}
"#;

const HELPERS: &str = "package greet\n\nfunc format(s string) string { return s }\n";

const MODEL: &str = "package model\n\ntype User struct {\n\tName string\n}\n";

fn module() -> GoModule {
    GoModule::new("example.com/greet")
        .file("service.go", SERVICE)
        .file("helpers.go", HELPERS)
        .file("model/user.go", MODEL)
}

fn pipeline(generator: &ScriptedGenerator, policy: GenerationPolicy) -> Pipeline {
    let locator = SymbolLocator::with_resolver(PackageResolver::new(GoEnv::default()));
    Pipeline::new(locator, Box::new(generator.clone()))
        .with_options(PipelineOptions::new().with_policy(policy))
}

#[test]
fn writes_header_and_tests_in_declaration_order() {
    let module = module();
    let generator = ScriptedGenerator::new();

    let outcome = pipeline(&generator, GenerationPolicy::default())
        .process_file(&module.path("service.go"))
        .unwrap();
    assert_eq!(outcome, FileOutcome::Written { generated: 2 });

    assert_eq!(
        module.read("service_test.go").unwrap(),
        "// Code generated by go-testgen.\n\npackage greet\n\nimport \"testing\"\n\n\
         func Test_Greeter_Greet(t *testing.T) {}\n\nfunc Test_Process(t *testing.T) {}\n"
    );
    assert_eq!(generator.requested(), vec!["Test_Greeter_Greet", "Test_Process"]);
}

#[test]
fn prompt_carries_local_and_external_context() {
    let module = module();
    let generator = ScriptedGenerator::new();

    pipeline(&generator, GenerationPolicy::default())
        .process_file(&module.path("service.go"))
        .unwrap();

    let prompt = &generator.prompts()[0];
    let local = prompt.find("Model: Greeter\nDefinition:\ntype Greeter struct").unwrap();
    let helper = prompt.find("func format(s string) string { return s }").unwrap();
    let external = prompt.find("Package: model Model: User\nDefinition:\ntype User struct").unwrap();
    assert!(local < helper && helper < external);
    assert!(prompt.contains("\"example.com/greet/model\""));
}

#[test]
fn skip_function_second_run_is_a_no_op() {
    let module = module();
    let generator = ScriptedGenerator::new();
    let policy = GenerationPolicy::new(Mode::Skip, Granularity::Function);
    let pipeline = pipeline(&generator, policy);

    pipeline.process_file(&module.path("service.go")).unwrap();
    let first = module.read("service_test.go").unwrap();

    let outcome = pipeline.process_file(&module.path("service.go")).unwrap();
    assert_eq!(outcome, FileOutcome::Unchanged);
    assert_eq!(module.read("service_test.go").unwrap(), first);
    assert_eq!(generator.requested().len(), 2);
}

#[test]
fn skip_function_fills_only_missing_tests() {
    let module = module().file(
        "service_test.go",
        "package greet\n\nimport \"testing\"\n\nfunc Test_Process(t *testing.T) { t.Log(\"kept\") }\n",
    );
    let generator = ScriptedGenerator::new();

    let outcome = pipeline(&generator, GenerationPolicy::new(Mode::Skip, Granularity::Function))
        .process_file(&module.path("service.go"))
        .unwrap();
    assert_eq!(outcome, FileOutcome::Written { generated: 1 });
    assert_eq!(generator.requested(), vec!["Test_Greeter_Greet"]);
    assert_eq!(
        module.read("service_test.go").unwrap(),
        "package greet\n\nimport \"testing\"\n\nfunc Test_Process(t *testing.T) { t.Log(\"kept\") }\n\n\
         func Test_Greeter_Greet(t *testing.T) {}\n"
    );
}

#[test]
fn skip_file_leaves_existing_test_file_alone() {
    let existing = "package greet\n\nimport \"testing\"\n\nfunc TestOther(t *testing.T) {}\n";
    let module = module().file("service_test.go", existing);
    let generator = ScriptedGenerator::new();

    let outcome = pipeline(&generator, GenerationPolicy::new(Mode::Skip, Granularity::File))
        .process_file(&module.path("service.go"))
        .unwrap();
    assert_eq!(outcome, FileOutcome::Skipped);
    assert!(generator.prompts().is_empty());
    assert_eq!(module.read("service_test.go").unwrap(), existing);
}

#[test]
fn append_renames_colliding_test() {
    let existing = "package greet\n\nimport \"testing\"\n\nfunc Test_Process(t *testing.T) {}\n";
    let module = module().file("service_test.go", existing);
    let generator = ScriptedGenerator::new();

    let locator = SymbolLocator::with_resolver(PackageResolver::new(GoEnv::default()));
    let options = PipelineOptions::new().with_filter("^Process$").unwrap();
    let outcome = Pipeline::new(locator, Box::new(generator.clone()))
        .with_options(options)
        .process_file(&module.path("service.go"))
        .unwrap();
    assert_eq!(outcome, FileOutcome::Written { generated: 1 });

    assert_eq!(
        module.read("service_test.go").unwrap(),
        format!("{existing}\nfunc Test_Process_2(t *testing.T) {{}}\n")
    );
}

#[test]
fn batch_visits_files_in_sorted_order() {
    let module = module();
    let generator = ScriptedGenerator::new();

    let summary = pipeline(&generator, GenerationPolicy::default())
        .process_path(module.root())
        .unwrap();

    assert_eq!(summary.written, 2);
    assert_eq!(summary.no_targets, 1);
    assert_eq!(summary.generated, 3);
    assert!(summary.failed.is_empty());
    assert_eq!(
        generator.requested(),
        vec!["Test_format", "Test_Greeter_Greet", "Test_Process"]
    );
    assert!(module.read("helpers_test.go").is_some());
    assert!(module.read("model/user_test.go").is_none());
}
