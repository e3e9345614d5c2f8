//! Skip/append reconciliation and merge
//!
//! Decisions per target:
//!
//! | mode   | granularity | no test file | name exists | name absent |
//! |--------|-------------|--------------|-------------|-------------|
//! | any    | any         | generate     | -           | -           |
//! | skip   | file        | -            | skip file   | skip file   |
//! | skip   | function    | -            | skip        | generate    |
//! | append | any         | -            | append      | generate    |
//!
//! Existing declarations are never altered. A generated function whose
//! name is already taken is renamed to the first free `<Name>_<n>`, `n >= 2`.

use crate::index::TestIndex;
use crate::policy::{Granularity, GenerationPolicy, Mode};
use std::collections::BTreeSet;
use testgen_syntax::fragment::{rename_top_level_func, top_level_func_names};

/// Per-target outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// No test exists yet; generate one
    Generate,

    /// A test exists; leave it
    Skip,

    /// A test exists; generate another alongside it
    Append,
}

impl Decision {
    /// Whether the target needs generated code
    #[inline]
    #[must_use]
    pub fn needs_generation(self) -> bool {
        !matches!(self, Self::Skip)
    }
}

/// Decision for one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPlan {
    /// Canonical test name of the target
    pub test_name: String,

    /// What to do
    pub decision: Decision,
}

/// Decisions for a whole file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilePlan {
    /// The test file exists and the policy skips whole files
    SkipFile,

    /// One plan per target, in target order
    Targets(Vec<TargetPlan>),
}

impl FilePlan {
    /// Targets that need generated code
    pub fn pending(&self) -> impl Iterator<Item = &TargetPlan> {
        let targets = match self {
            Self::SkipFile => &[][..],
            Self::Targets(targets) => targets.as_slice(),
        };
        targets.iter().filter(|t| t.decision.needs_generation())
    }
}

/// Generated code for one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedTest {
    /// Canonical test name the code was generated for
    pub test_name: String,

    /// Go declarations, without package clause or imports
    pub code: String,
}

impl GeneratedTest {
    /// Create generated test
    #[inline]
    #[must_use]
    pub fn new(test_name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            code: code.into(),
        }
    }
}

/// Header of a freshly created test file
#[must_use]
pub fn test_file_header(package: &str) -> String {
    format!("// Code generated by go-testgen.\n\npackage {package}\n\nimport \"testing\"\n")
}

/// Applies a [`GenerationPolicy`] to one test file
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler {
    policy: GenerationPolicy,
}

impl Reconciler {
    /// Create reconciler
    #[inline]
    #[must_use]
    pub fn new(policy: GenerationPolicy) -> Self {
        Self { policy }
    }

    /// Active policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> GenerationPolicy {
        self.policy
    }

    /// Decide what to do for each target test name
    ///
    /// `existing` is `None` when the test file does not exist.
    #[must_use]
    pub fn plan<S: AsRef<str>>(&self, existing: Option<&TestIndex>, targets: &[S]) -> FilePlan {
        let Some(index) = existing else {
            return FilePlan::Targets(
                targets
                    .iter()
                    .map(|t| TargetPlan {
                        test_name: t.as_ref().to_string(),
                        decision: Decision::Generate,
                    })
                    .collect(),
            );
        };

        if self.policy.mode == Mode::Skip && self.policy.granularity == Granularity::File {
            return FilePlan::SkipFile;
        }

        let plans = targets
            .iter()
            .map(|t| {
                let test_name = t.as_ref().to_string();
                let decision = match (index.contains(&test_name), self.policy.mode) {
                    (false, _) => Decision::Generate,
                    (true, Mode::Skip) => Decision::Skip,
                    (true, Mode::Append) => Decision::Append,
                };
                tracing::debug!("[{}] {:?}", test_name, decision);
                TargetPlan { test_name, decision }
            })
            .collect();

        FilePlan::Targets(plans)
    }

    /// Merge generated code into the test file text
    ///
    /// Returns `None` when nothing was generated, leaving the file unchanged.
    /// Otherwise returns the existing text (or a fresh header) followed by
    /// every generated fragment in order, with colliding top-level function
    /// names renamed.
    #[must_use]
    pub fn merge(&self, existing: Option<&str>, package: &str, generated: &[GeneratedTest]) -> Option<String> {
        let fragments: Vec<&GeneratedTest> = generated.iter().filter(|g| !g.code.trim().is_empty()).collect();
        if fragments.is_empty() {
            return None;
        }

        let mut taken: BTreeSet<String> = existing
            .map(|text| top_level_func_names(text).into_iter().collect())
            .unwrap_or_default();

        let mut out = match existing {
            Some(text) => text.trim_end().to_string(),
            None => test_file_header(package).trim_end().to_string(),
        };
        out.push('\n');

        for fragment in fragments {
            let mut code = fragment.code.trim().to_string();
            for name in top_level_func_names(&code) {
                if taken.contains(&name) {
                    let fresh = free_name(&name, &taken);
                    tracing::info!("[{}] {} exists, renaming to {}", fragment.test_name, name, fresh);
                    code = rename_top_level_func(&code, &name, &fresh);
                    taken.insert(fresh);
                } else {
                    taken.insert(name);
                }
            }
            out.push('\n');
            out.push_str(&code);
            out.push('\n');
        }

        Some(out)
    }
}

fn free_name(name: &str, taken: &BTreeSet<String>) -> String {
    (2..)
        .map(|n| format!("{name}_{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| name.to_string())
}
