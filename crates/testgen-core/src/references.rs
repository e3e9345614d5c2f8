//! Reference collection for a target function
//!
//! Walks the signature and body of one function and records the types and
//! callables whose declarations should accompany it as context. References
//! are kept in ordered sets: unqualified references sort first, then by
//! qualifier, then by name, so the same function always yields the same
//! sequence.
//!
//! Owner types of method calls are inferred only from declarations that
//! state them (parameters, receivers, `var x T`, `x := T{}`); calls on
//! anything else are dropped rather than guessed.

use std::collections::{BTreeSet, HashMap, HashSet};
use testgen_symbol::find_import;
use testgen_syntax::{FuncDecl, Node, SourceFile, TypeExpr};

/// Types predeclared by the language
const PREDECLARED_TYPES: &[&str] = &[
    "any", "bool", "byte", "comparable", "complex64", "complex128", "error", "float32", "float64",
    "int", "int8", "int16", "int32", "int64", "rune", "string", "uint", "uint8", "uint16", "uint32",
    "uint64", "uintptr",
];

/// Builtin functions
const BUILTIN_FUNCS: &[&str] = &[
    "append", "cap", "clear", "close", "complex", "copy", "delete", "imag", "len", "make", "max",
    "min", "new", "panic", "print", "println", "real", "recover",
];

/// A type whose declaration is needed
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeReference {
    /// Package qualifier; `None` resolves within the current package
    pub qualifier: Option<String>,

    /// Type name
    pub name: String,
}

impl TypeReference {
    /// Create type reference
    #[inline]
    #[must_use]
    pub fn new(qualifier: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            qualifier: qualifier.map(str::to_string),
            name: name.into(),
        }
    }
}

/// A function or method whose declaration is needed
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallReference {
    /// Package qualifier; `None` resolves within the current package
    pub qualifier: Option<String>,

    /// Owner type for methods, empty for plain functions
    pub type_name: String,

    /// Function name
    pub func_name: String,
}

impl CallReference {
    /// Create call reference
    #[inline]
    #[must_use]
    pub fn new(qualifier: Option<&str>, type_name: impl Into<String>, func_name: impl Into<String>) -> Self {
        Self {
            qualifier: qualifier.map(str::to_string),
            type_name: type_name.into(),
            func_name: func_name.into(),
        }
    }
}

/// Deduplicated, ordered references of one function
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct References {
    /// Referenced types
    pub types: BTreeSet<TypeReference>,

    /// Referenced callables
    pub calls: BTreeSet<CallReference>,
}

impl References {
    /// Whether nothing was referenced
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.calls.is_empty()
    }
}

/// Collect the references of `func`, declared in `file`
#[must_use]
pub fn collect_references(file: &SourceFile, func: &FuncDecl) -> References {
    let mut collector = Collector::new(file, func);
    collector.signature();
    if let Some(body) = &func.body {
        collector.visit(body);
    }
    tracing::debug!(
        "{}: {} type refs, {} call refs",
        func.name,
        collector.refs.types.len(),
        collector.refs.calls.len()
    );
    collector.refs
}

struct Collector<'a> {
    file: &'a SourceFile,
    func: &'a FuncDecl,
    type_params: HashSet<&'a str>,
    locals: HashMap<&'a str, Option<&'a TypeExpr>>,
    refs: References,
}

impl<'a> Collector<'a> {
    fn new(file: &'a SourceFile, func: &'a FuncDecl) -> Self {
        let mut type_params: HashSet<&str> = func.type_params.iter().map(String::as_str).collect();
        let mut locals = HashMap::new();

        if let Some(recv) = &func.receiver {
            if let TypeExpr::Generic { args, .. } = recv.ty.deref() {
                for arg in args {
                    if let TypeExpr::Named { qualifier: None, name } = arg {
                        type_params.insert(name);
                    }
                }
            }
        }

        let declared = func
            .receiver
            .iter()
            .chain(&func.params)
            .chain(&func.results);
        for param in declared {
            for name in &param.names {
                locals.entry(name.as_str()).or_insert(Some(&param.ty));
            }
        }

        if let Some(body) = &func.body {
            body.walk(&mut |node| {
                if let Node::Binding { name, ty } = node {
                    locals.entry(name.as_str()).or_insert(ty.as_ref());
                }
            });
        }

        Self {
            file,
            func,
            type_params,
            locals,
            refs: References::default(),
        }
    }

    /// Import alias not shadowed by a local name
    fn is_alias(&self, name: &str) -> bool {
        !self.locals.contains_key(name) && find_import(name, &self.file.imports).is_some()
    }

    fn skip_unqualified_type(&self, name: &str) -> bool {
        PREDECLARED_TYPES.contains(&name) || self.type_params.contains(name)
    }

    fn add_type(&mut self, ty: &TypeExpr, from_signature: bool) {
        for (qualifier, name) in ty.base_names() {
            match qualifier {
                None if self.skip_unqualified_type(name) => {}
                None => {
                    self.refs.types.insert(TypeReference::new(None, name));
                }
                Some(q) if from_signature || self.is_alias(q) => {
                    self.refs.types.insert(TypeReference::new(Some(q), name));
                }
                Some(q) => tracing::debug!("dropping type {}.{}: unknown qualifier", q, name),
            }
        }
    }

    fn signature(&mut self) {
        let func = self.func;
        let declared = func.receiver.iter().chain(&func.params).chain(&func.results);
        for param in declared {
            self.add_type(&param.ty, true);
        }
    }

    fn visit(&mut self, node: &Node) {
        match node {
            Node::Ident(_) | Node::Binding { ty: None, .. } => {}
            Node::Binding { ty: Some(ty), .. } | Node::Type(ty) => self.add_type(ty, false),
            Node::Selector { operand, field } => match operand.as_ref() {
                Node::Ident(q) if self.is_alias(q) => {
                    self.refs.types.insert(TypeReference::new(Some(q.as_str()), field.clone()));
                }
                other => self.visit(other),
            },
            Node::Call { function, args } => {
                self.call(function);
                for arg in args {
                    self.visit(arg);
                }
            }
            Node::Group(children) => {
                for child in children {
                    self.visit(child);
                }
            }
        }
    }

    fn call(&mut self, function: &Node) {
        match function {
            Node::Ident(name) => self.direct_call(name),
            Node::Selector { operand, field } => match operand.as_ref() {
                Node::Ident(q) if self.is_alias(q) => {
                    self.refs.calls.insert(CallReference::new(Some(q.as_str()), "", field.clone()));
                }
                Node::Ident(var) => self.method_call(var, field),
                other => self.visit(other),
            },
            other => self.visit(other),
        }
    }

    fn direct_call(&mut self, name: &str) {
        if BUILTIN_FUNCS.contains(&name) || self.skip_unqualified_type(name) || self.locals.contains_key(name) {
            return;
        }
        if self.func.receiver.is_none() && name == self.func.name {
            return;
        }
        if self.file.find_type(name).is_some() {
            // conversion to a type of this file
            self.refs.types.insert(TypeReference::new(None, name));
            return;
        }
        self.refs.calls.insert(CallReference::new(None, "", name));
    }

    fn method_call(&mut self, var: &str, method: &str) {
        let owner = self.locals.get(var).copied().flatten().map(|ty| match ty.deref() {
            TypeExpr::Generic { base, .. } => base.deref(),
            other => other,
        });

        match owner {
            Some(TypeExpr::Named { qualifier: None, name }) => {
                if !self.type_params.contains(name.as_str()) {
                    self.refs.calls.insert(CallReference::new(None, name.clone(), method));
                }
            }
            Some(TypeExpr::Named { qualifier: Some(q), name }) if self.is_alias(q) => {
                self.refs.calls.insert(CallReference::new(Some(q.as_str()), name.clone(), method));
            }
            _ => tracing::debug!("dropping call {}.{}: owner type unknown", var, method),
        }
    }
}
