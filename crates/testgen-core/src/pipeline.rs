//! Per-file and batch test generation
//!
//! For each source file:
//!
//! 1. parse it and select target functions
//! 2. index the existing test file, if any, and plan per target
//! 3. for targets needing work: collect references, build context and
//!    prompt, call the generator, extract code
//! 4. merge into the test file text and hand it to the store
//!
//! Files are processed one at a time, in sorted depth-first order.

use crate::context::ContextBuilder;
use crate::error::TestgenError;
use crate::generator::TestGenerator;
use crate::prompt::{build_prompt, extract_code, PromptParts};
use crate::references::collect_references;
use regex::Regex;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use testgen_composition::{
    test_name_for, Decision, FilePlan, GeneratedTest, GenerationPolicy, Granularity, Mode, Reconciler, TestIndex,
};
use testgen_symbol::fs::{is_go_file, is_test_file};
use testgen_symbol::{OsFs, SourceFs, SymbolLocator};
use testgen_syntax::{GoParser, SourceParser};
use walkdir::{DirEntry, WalkDir};

/// Test file path for a source file: `x.go` -> `x_test.go`
#[must_use]
pub fn test_path_for(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(format!("{stem}_test.go"))
}

/// Persistence collaborator for test files
pub trait TestStore: Send + Sync {
    /// Read a test file; `None` when it does not exist
    ///
    /// # Errors
    /// Returns any IO error other than not-found
    fn read(&self, path: &Path) -> io::Result<Option<String>>;

    /// Replace a test file's content
    ///
    /// # Errors
    /// Returns the underlying IO error
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;
}

/// Filesystem-backed [`TestStore`]
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl TestStore for FsStore {
    fn read(&self, path: &Path) -> io::Result<Option<String>> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }
}

/// Formatting collaborator run after a test file is written
pub trait Formatter: Send + Sync {
    /// Format the file in place
    ///
    /// # Errors
    /// Returns an IO error when the formatter fails
    fn format(&self, path: &Path) -> io::Result<()>;
}

/// Runs `<command> -w <file>`, `goimports` by default
#[derive(Debug, Clone)]
pub struct GoImports {
    command: String,
}

impl GoImports {
    /// Create formatter running `command`
    #[inline]
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Default for GoImports {
    fn default() -> Self {
        Self::new("goimports")
    }
}

impl Formatter for GoImports {
    fn format(&self, path: &Path) -> io::Result<()> {
        let output = Command::new(&self.command).arg("-w").arg(path).output()?;
        if output.status.success() {
            Ok(())
        } else {
            Err(io::Error::other(String::from_utf8_lossy(&output.stderr).trim().to_string()))
        }
    }
}

/// Formatter that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFormat;

impl Formatter for NoFormat {
    fn format(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }
}

/// Caller-supplied knobs
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Skip/append × file/function
    pub policy: GenerationPolicy,

    /// Only functions whose name matches are targets
    pub filter: Option<Regex>,

    /// Log per-file failures and keep going
    pub continue_on_error: bool,

    /// Custom prompt guidance
    pub custom_prompt: Option<String>,
}

impl PipelineOptions {
    /// Create default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With policy
    #[inline]
    #[must_use]
    pub fn with_policy(mut self, policy: GenerationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// With target filter
    ///
    /// # Errors
    /// Returns [`TestgenError::Filter`] for an invalid regex
    pub fn with_filter(mut self, pattern: &str) -> Result<Self, TestgenError> {
        self.filter = Some(Regex::new(pattern)?);
        Ok(self)
    }

    /// With continue-on-error
    #[inline]
    #[must_use]
    pub fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    /// With custom prompt guidance
    #[inline]
    #[must_use]
    pub fn with_custom_prompt(mut self, prompt: Option<String>) -> Self {
        self.custom_prompt = prompt;
        self
    }
}

/// Result of processing one source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// No function matched the filter
    NoTargets,

    /// The whole file was skipped by policy
    Skipped,

    /// Every target was skipped; nothing written
    Unchanged,

    /// Test file written
    Written {
        /// Number of generated tests
        generated: usize,
    },
}

/// Totals for a batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Files whose test file was written
    pub written: usize,

    /// Files skipped by policy
    pub skipped: usize,

    /// Files where every target was skipped
    pub unchanged: usize,

    /// Files without targets
    pub no_targets: usize,

    /// Tests generated across all files
    pub generated: usize,

    /// Files that failed, with their error
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchSummary {
    /// Account for one file
    pub fn record(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::NoTargets => self.no_targets += 1,
            FileOutcome::Skipped => self.skipped += 1,
            FileOutcome::Unchanged => self.unchanged += 1,
            FileOutcome::Written { generated } => {
                self.written += 1;
                self.generated += generated;
            }
        }
    }

    /// Files processed, including failures
    #[inline]
    #[must_use]
    pub fn files(&self) -> usize {
        self.written + self.skipped + self.unchanged + self.no_targets + self.failed.len()
    }
}

/// Test generation pipeline
pub struct Pipeline<F: SourceFs = OsFs, P: SourceParser = GoParser> {
    locator: SymbolLocator<F, P>,
    generator: Box<dyn TestGenerator>,
    store: Box<dyn TestStore>,
    formatter: Box<dyn Formatter>,
    options: PipelineOptions,
}

impl<F: SourceFs, P: SourceParser> std::fmt::Debug for Pipeline<F, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("locator", &self.locator)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<F: SourceFs, P: SourceParser> Pipeline<F, P> {
    /// Create pipeline writing through [`FsStore`] without formatting
    #[must_use]
    pub fn new(locator: SymbolLocator<F, P>, generator: Box<dyn TestGenerator>) -> Self {
        Self {
            locator,
            generator,
            store: Box::new(FsStore),
            formatter: Box::new(NoFormat),
            options: PipelineOptions::default(),
        }
    }

    /// With store
    #[must_use]
    pub fn with_store(mut self, store: Box<dyn TestStore>) -> Self {
        self.store = store;
        self
    }

    /// With formatter
    #[must_use]
    pub fn with_formatter(mut self, formatter: Box<dyn Formatter>) -> Self {
        self.formatter = formatter;
        self
    }

    /// With options
    #[must_use]
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Active options
    #[inline]
    #[must_use]
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Generate tests for one source file
    ///
    /// # Errors
    /// Fails on a malformed source or test file, an unresolvable signature
    /// type, a generator failure, or a store failure
    pub fn process_file(&self, path: &Path) -> Result<FileOutcome, TestgenError> {
        let text = self
            .locator
            .fs()
            .read_to_string(path)
            .map_err(|e| TestgenError::io_error(path, e))?;
        let file = self.locator.parser().parse(path, &text)?;

        let targets: Vec<_> = file
            .funcs
            .iter()
            .filter(|f| self.options.filter.as_ref().map_or(true, |re| re.is_match(&f.name)))
            .collect();
        if targets.is_empty() {
            tracing::info!("no functions found in {}, skipping", path.display());
            return Ok(FileOutcome::NoTargets);
        }

        let test_path = test_path_for(path);
        let existing = self
            .store
            .read(&test_path)
            .map_err(|e| TestgenError::io_error(&test_path, e))?;

        let policy = self.options.policy;
        let skip_file = policy.mode == Mode::Skip && policy.granularity == Granularity::File;
        let index = match &existing {
            Some(_) if skip_file => Some(TestIndex::default()),
            Some(test_text) => Some(TestIndex::from_source(&self.locator.parser().parse(&test_path, test_text)?)),
            None => None,
        };

        let reconciler = Reconciler::new(policy);
        let names: Vec<String> = targets.iter().map(|f| test_name_for(f)).collect();
        let plans = match reconciler.plan(index.as_ref(), &names) {
            FilePlan::SkipFile => {
                tracing::info!("test file exists for {}, skipping", path.display());
                return Ok(FileOutcome::Skipped);
            }
            FilePlan::Targets(plans) => plans,
        };

        let mut generated = Vec::new();
        for (target, plan) in targets.iter().zip(&plans) {
            let name = &plan.test_name;
            match plan.decision {
                Decision::Skip => {
                    tracing::info!("[{}] test exists, skipping", name);
                    continue;
                }
                Decision::Append => tracing::info!("[{}] test exists, appending", name),
                Decision::Generate => tracing::info!("[{}] generating", name),
            }

            let refs = collect_references(&file, target);
            let context = ContextBuilder::new(&self.locator).build(&file, &refs)?;
            let prompt = build_prompt(&PromptParts {
                imports: &file.imports,
                target: &target.source,
                context: &context,
                test_name: name,
                custom: self.options.custom_prompt.as_deref(),
            });
            tracing::debug!("[{}] prompt:\n{}", name, prompt);

            let response = self
                .generator
                .generate(&prompt)
                .map_err(|e| TestgenError::generate(name.as_str(), e))?;
            let code = extract_code(&response).map_err(|e| TestgenError::generate(name.as_str(), e))?;
            if code.trim().is_empty() {
                tracing::warn!("[{}] generator returned an empty test, dropping", name);
                continue;
            }
            generated.push(GeneratedTest::new(name.as_str(), code));
        }

        let Some(merged) = reconciler.merge(existing.as_deref(), &file.package, &generated) else {
            tracing::info!("no tests generated for {}", path.display());
            return Ok(FileOutcome::Unchanged);
        };

        self.store
            .write(&test_path, &merged)
            .map_err(|e| TestgenError::io_error(&test_path, e))?;
        if let Err(e) = self.formatter.format(&test_path) {
            tracing::warn!("failed to format {}: {}", test_path.display(), e);
        }

        tracing::info!("wrote {} ({} tests)", test_path.display(), generated.len());
        Ok(FileOutcome::Written {
            generated: generated.len(),
        })
    }

    /// Generate tests for a file, or every source file below a directory
    ///
    /// # Errors
    /// Returns the first per-file error unless continue-on-error is set;
    /// configuration errors always stop the batch
    pub fn process_path(&self, path: &Path) -> Result<BatchSummary, TestgenError> {
        let mut summary = BatchSummary::default();

        for file in source_files(path)? {
            tracing::info!("processing {}", file.display());
            match self.process_file(&file) {
                Ok(outcome) => summary.record(outcome),
                Err(e) if self.options.continue_on_error && e.is_fatal_for_file() => {
                    tracing::error!("failed to process {}: {}", file.display(), e);
                    summary.failed.push((file, e.to_string()));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(summary)
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name == "vendor" || name == "testdata"
}

/// Source files to process below `path`, sorted depth-first
///
/// # Errors
/// Returns IO errors from the directory walk
pub fn source_files(path: &Path) -> Result<Vec<PathBuf>, TestgenError> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e));
    for entry in walker {
        let entry = entry.map_err(|e| TestgenError::io_error(path, e.into()))?;
        let p = entry.path();
        if entry.file_type().is_file() && is_go_file(p) && !is_test_file(p) {
            files.push(p.to_path_buf());
        }
    }
    Ok(files)
}
