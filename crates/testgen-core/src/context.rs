//! Context blob assembly
//!
//! Resolves collected references to declaration text. Local references are
//! resolved before external ones, types before calls within each pass. Type
//! entries carry a provenance header:
//!
//! ```text
//! Model: Greeter
//! Definition:
//! type Greeter struct { ... }
//!
//! Package: model Model: User
//! Definition:
//! type User struct { ... }
//! ```

use crate::references::{CallReference, References, TypeReference};
use testgen_symbol::{LocateError, SourceFs, SymbolLocator};
use testgen_syntax::{SourceFile, SourceParser};

/// Header line for a type entry
#[must_use]
pub fn provenance_header(qualifier: Option<&str>, name: &str) -> String {
    match qualifier {
        Some(q) => format!("Package: {q} Model: {name}"),
        None => format!("Model: {name}"),
    }
}

/// Builds the context blob for one target
#[derive(Debug)]
pub struct ContextBuilder<'a, F: SourceFs, P: SourceParser> {
    locator: &'a SymbolLocator<F, P>,
}

impl<'a, F: SourceFs, P: SourceParser> ContextBuilder<'a, F, P> {
    /// Create builder over a locator
    #[inline]
    #[must_use]
    pub fn new(locator: &'a SymbolLocator<F, P>) -> Self {
        Self { locator }
    }

    /// Resolve `refs` as seen from `file` and concatenate the results
    ///
    /// # Errors
    /// Propagates hard lookup failures; absent declarations are skipped
    pub fn build(&self, file: &SourceFile, refs: &References) -> Result<String, LocateError> {
        let mut blocks = Vec::new();

        for local in [true, false] {
            for ty in refs.types.iter().filter(|t| t.qualifier.is_none() == local) {
                if let Some(block) = self.type_block(file, ty)? {
                    blocks.push(block);
                }
            }
            for call in refs.calls.iter().filter(|c| c.qualifier.is_none() == local) {
                if let Some(block) = self.call_block(file, call)? {
                    blocks.push(block);
                }
            }
        }

        Ok(blocks.join("\n"))
    }

    fn type_block(&self, file: &SourceFile, ty: &TypeReference) -> Result<Option<String>, LocateError> {
        let qualifier = ty.qualifier.as_deref();
        let source = self.locator.find_type(file, qualifier, &ty.name)?;
        Ok(source.map(|src| {
            format!(
                "{}\nDefinition:\n{}\n",
                provenance_header(qualifier, &ty.name),
                src
            )
        }))
    }

    fn call_block(&self, file: &SourceFile, call: &CallReference) -> Result<Option<String>, LocateError> {
        let source = self.locator.find_function(
            file,
            call.qualifier.as_deref(),
            &call.type_name,
            &call.func_name,
        )?;
        Ok(source.map(|src| format!("{src}\n")))
    }
}
