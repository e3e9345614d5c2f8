//! Index of tests already present in a test file

use std::collections::BTreeMap;
use testgen_syntax::{FuncDecl, SourceFile};

/// Name prefix that marks a function as a test
pub const TEST_PREFIX: &str = "Test";

/// An existing test declaration
#[derive(Debug, Clone, PartialEq)]
pub struct TestRecord {
    /// Exact declared name
    pub name: String,

    /// Parsed declaration
    pub declaration: FuncDecl,
}

/// Existing tests keyed by exact name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestIndex {
    records: BTreeMap<String, TestRecord>,
}

impl TestIndex {
    /// Index top-level functions whose name starts with `Test`
    #[must_use]
    pub fn from_source(file: &SourceFile) -> Self {
        let records = file
            .funcs
            .iter()
            .filter(|f| !f.is_method() && f.name.starts_with(TEST_PREFIX))
            .map(|f| {
                (
                    f.name.clone(),
                    TestRecord {
                        name: f.name.clone(),
                        declaration: f.clone(),
                    },
                )
            })
            .collect();
        Self { records }
    }

    /// Whether a test named `name` exists
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    /// Lookup by exact name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TestRecord> {
        self.records.get(name)
    }

    /// Indexed names in lexicographic order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Number of indexed tests
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no tests are indexed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use testgen_syntax::{GoParser, SourceParser};

    #[test]
    fn indexes_only_top_level_test_functions() {
        let src = "package a\n\nimport \"testing\"\n\nfunc Test_Greeter_Greet(t *testing.T) {}\n\nfunc TestLegacy(t *testing.T) {}\n\nfunc helper() {}\n\nfunc (s *Suite) TestInSuite() {}\n";
        let file = GoParser::new().parse(Path::new("a_test.go"), src).unwrap();
        let index = TestIndex::from_source(&file);

        assert_eq!(index.names().collect::<Vec<_>>(), vec!["TestLegacy", "Test_Greeter_Greet"]);
        assert!(index.contains("Test_Greeter_Greet"));
        assert!(!index.contains("helper"));
        assert!(!index.contains("TestInSuite"));
        assert_eq!(index.get("TestLegacy").unwrap().declaration.name, "TestLegacy");
    }
}
