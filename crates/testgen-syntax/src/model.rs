//! Closed node model for parsed Go files
//!
//! Only the shapes the resolver and reconciler inspect are represented:
//! named types and their wrappers, identifiers, selectors, calls, and
//! local bindings. Everything else is flattened into [`Node::Group`].

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Trailing major-version element of a module path (`/v9`).
static VERSION_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"/v\d+$").expect("valid regex"));

/// A parsed compilation unit
///
/// Immutable once built; a file is reparsed on every invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    /// Path the file was read from
    pub path: PathBuf,

    /// Package clause name
    pub package: String,

    /// Import list in declaration order
    pub imports: Vec<ImportBinding>,

    /// Top-level type declarations
    pub types: Vec<TypeDecl>,

    /// Top-level function and method declarations
    pub funcs: Vec<FuncDecl>,
}

impl SourceFile {
    /// Directory holding this file (its package directory)
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Find a top-level type declaration by exact name
    #[must_use]
    pub fn find_type(&self, name: &str) -> Option<&TypeDecl> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Find a function (empty `receiver`) or method by name
    ///
    /// Receiver matching is exact on the base type name and ignores pointer
    /// indirection, so `T` matches both `func (T) M()` and `func (*T) M()`.
    #[must_use]
    pub fn find_func(&self, receiver: &str, name: &str) -> Option<&FuncDecl> {
        self.funcs.iter().find(|f| {
            if f.name != name {
                return false;
            }
            match (&f.receiver, receiver.is_empty()) {
                (None, true) => true,
                (Some(recv), false) => recv.ty.receiver_base() == Some(receiver),
                _ => false,
            }
        })
    }
}

/// One entry of a file's import list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    /// Explicit alias (`foo "pkg/v9"`), including `_` and `.`
    pub alias: Option<String>,

    /// Fully qualified import path, unquoted
    pub path: String,
}

impl ImportBinding {
    /// Create binding
    #[inline]
    #[must_use]
    pub fn new(alias: Option<String>, path: impl Into<String>) -> Self {
        Self {
            alias,
            path: path.into(),
        }
    }

    /// Name this import is referred to by inside the file
    ///
    /// The explicit alias when present, otherwise the last path segment with
    /// a trailing `/v<digits>` removed.
    #[must_use]
    pub fn local_name(&self) -> &str {
        if let Some(alias) = &self.alias {
            return alias;
        }
        let stem = match VERSION_SUFFIX.find(&self.path) {
            Some(m) => &self.path[..m.start()],
            None => self.path.as_str(),
        };
        stem.rsplit('/').next().unwrap_or(stem)
    }

    /// Blank and dot imports never act as a qualifier
    #[inline]
    #[must_use]
    pub fn is_qualifying(&self) -> bool {
        !matches!(self.alias.as_deref(), Some("_") | Some("."))
    }
}

/// A top-level `type` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    /// Declared name
    pub name: String,

    /// Declaration text, always starting with `type `
    pub source: String,
}

/// A function or method declaration
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    /// Function name
    pub name: String,

    /// Receiver, for methods
    pub receiver: Option<Param>,

    /// Names of declared type parameters
    pub type_params: Vec<String>,

    /// Parameters in order; unnamed parameters carry no names
    pub params: Vec<Param>,

    /// Results in order; unnamed results carry no names
    pub results: Vec<Param>,

    /// Lowered body, absent for external (assembly) declarations
    pub body: Option<Node>,

    /// Declaration source text
    pub source: String,
}

impl FuncDecl {
    /// Whether this is a method
    #[inline]
    #[must_use]
    pub fn is_method(&self) -> bool {
        self.receiver.is_some()
    }
}

/// A parameter, result, or receiver field
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Declared names (possibly empty)
    pub names: Vec<String>,

    /// Declared type
    pub ty: TypeExpr,
}

/// Type expression, reduced to the wrappers the resolver unwraps
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// `Name` or `pkg.Name`
    Named {
        /// Package qualifier
        qualifier: Option<String>,
        /// Type name
        name: String,
    },

    /// `*T`
    Pointer(Box<TypeExpr>),

    /// `[]T`
    Slice(Box<TypeExpr>),

    /// `[N]T` and `[...]T`
    Array(Box<TypeExpr>),

    /// `map[K]V`
    Map {
        /// Key type
        key: Box<TypeExpr>,
        /// Value type
        value: Box<TypeExpr>,
    },

    /// `chan T`
    Chan(Box<TypeExpr>),

    /// `Base[Args...]`
    Generic {
        /// Instantiated type
        base: Box<TypeExpr>,
        /// Type arguments
        args: Vec<TypeExpr>,
    },

    /// Struct, interface, and function literals
    Other,
}

impl TypeExpr {
    /// Unqualified named type
    #[inline]
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            qualifier: None,
            name: name.into(),
        }
    }

    /// Qualified named type
    #[inline]
    #[must_use]
    pub fn qualified(qualifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Named {
            qualifier: Some(qualifier.into()),
            name: name.into(),
        }
    }

    /// Innermost named type of a receiver
    ///
    /// Pointer, slice, array, and channel wrappers are unwrapped; maps
    /// resolve to their value type; generics to their base type.
    #[must_use]
    pub fn receiver_base(&self) -> Option<&str> {
        match self {
            Self::Named { name, .. } => Some(name),
            Self::Pointer(inner) | Self::Slice(inner) | Self::Array(inner) | Self::Chan(inner) => {
                inner.receiver_base()
            }
            Self::Map { value, .. } => value.receiver_base(),
            Self::Generic { base, .. } => base.receiver_base(),
            Self::Other => None,
        }
    }

    /// Every named type reachable through wrappers, in source order
    ///
    /// Maps contribute both key and value; generics contribute the base type
    /// and every argument.
    #[must_use]
    pub fn base_names(&self) -> Vec<(Option<&str>, &str)> {
        let mut out = Vec::new();
        self.collect_base_names(&mut out);
        out
    }

    fn collect_base_names<'a>(&'a self, out: &mut Vec<(Option<&'a str>, &'a str)>) {
        match self {
            Self::Named { qualifier, name } => out.push((qualifier.as_deref(), name)),
            Self::Pointer(inner) | Self::Slice(inner) | Self::Array(inner) | Self::Chan(inner) => {
                inner.collect_base_names(out);
            }
            Self::Map { key, value } => {
                key.collect_base_names(out);
                value.collect_base_names(out);
            }
            Self::Generic { base, args } => {
                base.collect_base_names(out);
                for arg in args {
                    arg.collect_base_names(out);
                }
            }
            Self::Other => {}
        }
    }

    /// Strip pointer indirection
    #[must_use]
    pub fn deref(&self) -> &TypeExpr {
        match self {
            Self::Pointer(inner) => inner.deref(),
            other => other,
        }
    }
}

/// Lowered function body node
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Value identifier
    Ident(String),

    /// `operand.field`
    Selector {
        /// Left-hand expression
        operand: Box<Node>,
        /// Selected name
        field: String,
    },

    /// `function(args...)`
    Call {
        /// Callee expression
        function: Box<Node>,
        /// Arguments, including type arguments of `new`/`make`
        args: Vec<Node>,
    },

    /// A type mentioned inside the body
    Type(TypeExpr),

    /// Local variable introduced by a declaration
    Binding {
        /// Variable name
        name: String,
        /// Static type, when the declaration shape states it
        ty: Option<TypeExpr>,
    },

    /// Any other construct, children in source order
    Group(Vec<Node>),
}

impl Node {
    /// Visit this node and all descendants, pre-order
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        match self {
            Self::Selector { operand, .. } => operand.walk(f),
            Self::Call { function, args } => {
                function.walk(f);
                for arg in args {
                    arg.walk(f);
                }
            }
            Self::Group(children) => {
                for child in children {
                    child.walk(f);
                }
            }
            Self::Ident(_) | Self::Type(_) | Self::Binding { .. } => {}
        }
    }
}
