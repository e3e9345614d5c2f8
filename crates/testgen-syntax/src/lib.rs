//! Go Syntax Front End
//!
//! Parses Go source files into a closed node model used by the resolver and
//! the test reconciler.
//!
//! # Core Concepts
//!
//! - [`SourceParser`]: Parser collaborator, implemented by [`GoParser`]
//! - [`SourceFile`]: Package name, imports, type and function declarations
//! - [`TypeExpr`]: Type expressions reduced to named types and wrappers
//! - [`Node`]: Lowered function bodies (identifiers, selectors, calls, bindings)
//!
//! # Example
//!
//! ```rust,ignore
//! use testgen_syntax::{GoParser, SourceParser};
//!
//! let file = GoParser::new().parse(path, &text)?;
//! for import in &file.imports {
//!     println!("{} => {}", import.local_name(), import.path);
//! }
//! ```

mod error;
mod model;
mod parser;

pub mod fragment;

pub use error::ParseError;
pub use model::{FuncDecl, ImportBinding, Node, Param, SourceFile, TypeDecl, TypeExpr};
pub use parser::{GoParser, SourceParser};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        FuncDecl, GoParser, ImportBinding, Node, ParseError, SourceFile, SourceParser, TypeExpr,
    };
}
