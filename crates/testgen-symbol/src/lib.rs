//! Go Symbol Resolution
//!
//! Finds the declaring source text of types and functions referenced from a
//! Go file.
//!
//! # Overview
//!
//! - [`find_import`]: map a short qualifier to the import that introduced it
//! - [`PackageResolver`]: map an import path to a package directory and
//!   classify it as standard library or project code
//! - [`SymbolLocator`]: search the current file, its package, and imported
//!   packages for a declaration
//!
//! # Example
//!
//! ```rust,ignore
//! use testgen_symbol::{GoEnv, PackageResolver, SymbolLocator};
//!
//! let locator = SymbolLocator::with_resolver(PackageResolver::new(GoEnv::detect()));
//! if let Some(source) = locator.find_type(&file, Some("model"), "User")? {
//!     println!("{source}");
//! }
//! ```

pub mod env;
pub mod fs;
pub mod gomod;
pub mod import;
pub mod locator;
pub mod resolver;

mod error;

// Re-exports
pub use env::GoEnv;
pub use error::{LocateError, ResolveError};
pub use fs::{OsFs, SourceFs};
pub use gomod::GoMod;
pub use import::{find_import, Origin, PackageLocation};
pub use locator::{ResolvedSource, SymbolKey, SymbolLocator};
pub use resolver::PackageResolver;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for symbol lookup
    pub use crate::{
        find_import, GoEnv, LocateError, OsFs, PackageResolver, ResolvedSource, SourceFs, SymbolLocator,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
