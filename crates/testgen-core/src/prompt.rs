//! Prompt assembly and response parsing

use crate::error::GenerateError;
use testgen_syntax::ImportBinding;

/// Guidance appended when no custom prompt is configured
pub const DEFAULT_PROMPT: &str = "Use table-driven tests with t.Run subtests. \
Cover the normal path, boundary values and error returns. \
Prefer the standard testing package and keep each case independent.";

/// Inputs of one prompt
#[derive(Debug, Clone, Copy)]
pub struct PromptParts<'a> {
    /// Imports of the file declaring the target
    pub imports: &'a [ImportBinding],

    /// Target declaration source
    pub target: &'a str,

    /// Context blob
    pub context: &'a str,

    /// Canonical test name the generated test must use
    pub test_name: &'a str,

    /// Custom guidance, [`DEFAULT_PROMPT`] when `None`
    pub custom: Option<&'a str>,
}

/// Render an import list as a Go import block
#[must_use]
pub fn imports_section(imports: &[ImportBinding]) -> String {
    let mut out = String::from("import (\n");
    for imp in imports {
        match &imp.alias {
            Some(alias) => out.push_str(&format!("\t{} \"{}\"\n", alias, imp.path)),
            None => out.push_str(&format!("\t\"{}\"\n", imp.path)),
        }
    }
    out.push_str(")\n");
    out
}

/// Build the prompt text for one target
#[must_use]
pub fn build_prompt(parts: &PromptParts<'_>) -> String {
    let custom = parts
        .custom
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_PROMPT);

    format!(
        "Generate unit tests for below function: \n{imports}\n{target}\n\n\
The related types and functions definition code is:\n{context}\n\n\
Name the test function {name}. \
You should only output the test function, nothing else. \
Don't output the package declaration, imports, or any other code.\n\n\
{custom}\n",
        imports = imports_section(parts.imports),
        target = parts.target,
        context = parts.context,
        name = parts.test_name,
        custom = custom,
    )
}

/// Extract generated code from a response
///
/// Takes everything between the first ```` ```go ```` (or bare ```` ``` ````)
/// fence and the last fence, with surrounding newlines trimmed.
///
/// # Errors
/// Returns [`GenerateError::CodeNotFound`] when either fence is missing
pub fn extract_code(response: &str) -> Result<String, GenerateError> {
    let start = match response.find("```go") {
        Some(i) => i + 5,
        None => {
            response
                .find("```")
                .ok_or(GenerateError::CodeNotFound("missing starting backticks"))?
                + 3
        }
    };

    let end = response
        .rfind("```")
        .filter(|&end| end > start)
        .ok_or(GenerateError::CodeNotFound("missing ending backticks"))?;

    let code = response[start..end].trim_matches(|c| c == '\n' || c == '\r');
    Ok(code.to_string())
}
