//! go-testgen core
//!
//! Turns Go functions into generated unit tests:
//! - Collects the types and callables a function references
//! - Resolves them to declaration text as prompt context
//! - Assembles the prompt and calls the generator collaborator
//! - Reconciles the result with the existing test file
//!
//! # Example
//!
//! ```rust,ignore
//! use testgen_core::{Config, HttpGenerator, Pipeline, PipelineOptions};
//! use testgen_symbol::{PackageResolver, SymbolLocator};
//!
//! let config = Config::load()?;
//! let locator = SymbolLocator::with_resolver(PackageResolver::new(config.go_env()));
//! let pipeline = Pipeline::new(locator, Box::new(HttpGenerator::from_config(&config)?))
//!     .with_options(PipelineOptions::new());
//!
//! let summary = pipeline.process_path("./internal".as_ref())?;
//! println!("wrote {} test files", summary.written);
//! ```

// Core modules
pub mod config;
pub mod context;
pub mod error;
pub mod generator;
pub mod pipeline;
pub mod prompt;
pub mod references;

// Re-exports for convenience
pub use config::Config;
pub use context::{provenance_header, ContextBuilder};
pub use error::{ConfigError, GenerateError, TestgenError};
pub use generator::{HttpGenerator, TestGenerator};
pub use pipeline::{
    source_files, test_path_for, BatchSummary, FileOutcome, Formatter, FsStore, GoImports, NoFormat, Pipeline,
    PipelineOptions, TestStore,
};
pub use prompt::{build_prompt, extract_code, imports_section, PromptParts, DEFAULT_PROMPT};
pub use references::{collect_references, CallReference, References, TypeReference};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with go-testgen
    pub use crate::{
        collect_references, BatchSummary, Config, ContextBuilder, FileOutcome, HttpGenerator, Pipeline,
        PipelineOptions, TestGenerator, TestgenError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
