//! Text helpers for generated test fragments
//!
//! Generated code arrives as a bare sequence of declarations without a
//! package clause, so it cannot go through [`crate::GoParser`]. These
//! helpers work line-wise on top-level `func` headers instead.

use once_cell::sync::Lazy;
use regex::Regex;

static TOP_LEVEL_FUNC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^func\s+([A-Za-z_]\w*)\s*[\(\[]").expect("valid regex"));

/// Names of top-level (receiver-less) functions, in order of appearance
#[must_use]
pub fn top_level_func_names(text: &str) -> Vec<String> {
    TOP_LEVEL_FUNC
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Rename the top-level function `old` to `new` in `text`
///
/// Only the declaration header changes; call sites inside the fragment are
/// left alone.
#[must_use]
pub fn rename_top_level_func(text: &str, old: &str, new: &str) -> String {
    let pattern = format!(r"(?m)^func\s+{}(\s*[\(\[])", regex::escape(old));
    match Regex::new(&pattern) {
        Ok(re) => re.replace(text, format!("func {new}${{1}}")).into_owned(),
        Err(_) => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn finds_top_level_funcs_only() {
        let text = "func Test_A(t *testing.T) {\n\tfunc() {}()\n}\n\nfunc (s *Suite) Test_B() {}\n\nfunc helper[T any](v T) {}\n";
        assert_eq!(top_level_func_names(text), vec!["Test_A", "helper"]);
    }

    #[test]
    fn rename_touches_only_the_header() {
        let text = "func Test_A(t *testing.T) {\n\tTest_A(t)\n}\n";
        assert_eq!(
            rename_top_level_func(text, "Test_A", "Test_A_2"),
            "func Test_A_2(t *testing.T) {\n\tTest_A(t)\n}\n"
        );
    }

    #[test]
    fn rename_does_not_match_prefixes() {
        let text = "func Test_AB(t *testing.T) {}\n";
        assert_eq!(rename_top_level_func(text, "Test_A", "Test_A_2"), text);
    }

    #[test]
    fn empty_fragment_has_no_funcs() {
        assert!(top_level_func_names("").is_empty());
    }

    proptest::proptest! {
        #[test]
        fn header_names_are_found_and_renamed(name in "[A-Z][A-Za-z0-9_]{0,12}") {
            let text = format!("func {name}(t *testing.T) {{}}\n");
            proptest::prop_assert_eq!(top_level_func_names(&text), vec![name.clone()]);

            let renamed = rename_top_level_func(&text, &name, "Renamed");
            proptest::prop_assert_eq!(top_level_func_names(&renamed), vec!["Renamed".to_string()]);
        }
    }
}
