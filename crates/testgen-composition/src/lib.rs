//! Test Reconciliation
//!
//! Decides, per target function, whether a test must be generated, skipped,
//! or appended, and merges generated code into the test file text.
//!
//! # Core Concepts
//!
//! - [`test_func_name`]: Canonical test name of a function or method
//! - [`TestIndex`]: Tests already present in a file, keyed by name
//! - [`GenerationPolicy`]: [`Mode`] × [`Granularity`]
//! - [`Reconciler`]: Policy matrix ([`Reconciler::plan`]) and merge
//!   ([`Reconciler::merge`])
//!
//! # Example
//!
//! ```rust,ignore
//! use testgen_composition::{GenerationPolicy, Reconciler, TestIndex};
//!
//! let reconciler = Reconciler::new(GenerationPolicy::default());
//! let plan = reconciler.plan(Some(&TestIndex::from_source(&test_file)), &names);
//! for target in plan.pending() {
//!     // generate code for target.test_name
//! }
//! let text = reconciler.merge(Some(&existing), &package, &generated);
//! ```

mod index;
mod naming;
mod policy;
mod reconcile;

// Re-exports
pub use index::{TestIndex, TestRecord, TEST_PREFIX};
pub use naming::{test_func_name, test_name_for, TEST_NAME_PREFIX};
pub use policy::{GenerationPolicy, Granularity, Mode, PolicyParseError};
pub use reconcile::{test_file_header, Decision, FilePlan, GeneratedTest, Reconciler, TargetPlan};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
