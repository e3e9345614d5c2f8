//! Canonical test names
//!
//! `Test_<Receiver>_<Func>` for methods, `Test_<Func>` for functions. The
//! receiver is reduced to its innermost named type so the same method always
//! maps to the same test, whatever pointer or container wrapping it has.

use testgen_syntax::FuncDecl;

/// Prefix shared by every canonical test name
pub const TEST_NAME_PREFIX: &str = "Test_";

/// Canonical test name from a receiver base type name and a function name
#[must_use]
pub fn test_func_name(receiver: Option<&str>, func: &str) -> String {
    match receiver.filter(|r| !r.is_empty()) {
        Some(receiver) => format!("{TEST_NAME_PREFIX}{receiver}_{func}"),
        None => format!("{TEST_NAME_PREFIX}{func}"),
    }
}

/// Canonical test name for a declaration
#[must_use]
pub fn test_name_for(decl: &FuncDecl) -> String {
    let receiver = decl.receiver.as_ref().and_then(|r| r.ty.receiver_base());
    test_func_name(receiver, &decl.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::Path;
    use testgen_syntax::{GoParser, SourceParser};

    fn decl(src: &str) -> FuncDecl {
        let file = GoParser::new()
            .parse(Path::new("a.go"), &format!("package a\n\n{src}\n"))
            .unwrap();
        file.funcs.into_iter().next().unwrap()
    }

    #[test]
    fn wrapped_receiver_uses_innermost_named_type() {
        let d = decl("func (g *[]map[string]Greeter) Greet() {}");
        assert_eq!(test_name_for(&d), "Test_Greeter_Greet");
    }

    #[test]
    fn plain_function() {
        assert_eq!(test_name_for(&decl("func Process() {}")), "Test_Process");
        assert_eq!(test_func_name(None, "Process"), "Test_Process");
    }

    #[test]
    fn pointer_and_value_receivers_agree() {
        assert_eq!(
            test_name_for(&decl("func (g *Greeter) Greet() {}")),
            test_name_for(&decl("func (g Greeter) Greet() {}"))
        );
    }

    #[test]
    fn generic_receiver_uses_base_type() {
        let d = decl("func (s *Stack[T]) Push(v T) {}");
        assert_eq!(test_name_for(&d), "Test_Stack_Push");
    }

    proptest! {
        #[test]
        fn name_depends_only_on_receiver_and_func(
            receiver in "[A-Z][A-Za-z0-9]{0,10}",
            func in "[A-Z][A-Za-z0-9]{0,10}",
            depth in 0usize..4,
        ) {
            let mut ty = receiver.clone();
            for _ in 0..depth {
                ty = format!("*[]map[string]{ty}");
            }
            let d = decl(&format!("func (r {ty}) {func}() {{}}"));
            prop_assert_eq!(test_name_for(&d), test_func_name(Some(&receiver), &func));
        }
    }
}
