//! tree-sitter-go front end
//!
//! Parses Go source with tree-sitter and lowers the concrete syntax tree to
//! the closed model in [`crate::model`]. Declaration text is the exact source
//! slice of the matched node, so injected context stays minimal.

use crate::error::ParseError;
use crate::model::{FuncDecl, ImportBinding, Node, Param, SourceFile, TypeDecl, TypeExpr};
use std::path::Path;
use tree_sitter::Node as TsNode;

/// Parser collaborator
///
/// Implementations must be pure: the same text always yields the same file.
pub trait SourceParser: Send + Sync {
    /// Parse `text`, read from `path`, into a [`SourceFile`]
    ///
    /// # Errors
    /// Returns [`ParseError`] when the text is not valid Go
    fn parse(&self, path: &Path, text: &str) -> Result<SourceFile, ParseError>;
}

/// tree-sitter backed Go parser
#[derive(Debug, Clone, Copy, Default)]
pub struct GoParser;

impl GoParser {
    /// Create parser
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SourceParser for GoParser {
    fn parse(&self, path: &Path, text: &str) -> Result<SourceFile, ParseError> {
        let language: tree_sitter::Language = tree_sitter_go::LANGUAGE.into();

        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| ParseError::ParserInit(e.to_string()))?;

        let tree = parser.parse(text, None).ok_or_else(|| ParseError::ParseFailed {
            path: path.to_path_buf(),
        })?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(syntax_error(root, text, path));
        }

        Lowering { src: text }.file(root, path)
    }
}

/// Locate the first ERROR or MISSING node below `node`
fn syntax_error(node: TsNode<'_>, src: &str, path: &Path) -> ParseError {
    let culprit = first_error(node).unwrap_or(node);
    let pos = culprit.start_position();
    let snippet: String = text(culprit, src).chars().take(40).collect();

    ParseError::Syntax {
        path: path.to_path_buf(),
        line: pos.row + 1,
        column: pos.column + 1,
        snippet,
    }
}

fn first_error(node: TsNode<'_>) -> Option<TsNode<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|c| c.has_error() || c.is_missing())
        .find_map(first_error)
}

#[inline]
fn text<'s>(node: TsNode<'_>, src: &'s str) -> &'s str {
    node.utf8_text(src.as_bytes()).unwrap_or("")
}

/// Type node kinds that may appear in expression position
fn is_type_kind(kind: &str) -> bool {
    matches!(
        kind,
        "type_identifier"
            | "qualified_type"
            | "pointer_type"
            | "slice_type"
            | "array_type"
            | "implicit_length_array_type"
            | "map_type"
            | "channel_type"
            | "generic_type"
            | "struct_type"
            | "interface_type"
            | "function_type"
            | "parenthesized_type"
            | "negated_type"
    )
}

struct Lowering<'s> {
    src: &'s str,
}

impl<'s> Lowering<'s> {
    fn text(&self, node: TsNode<'_>) -> String {
        text(node, self.src).to_string()
    }

    fn file(&self, root: TsNode<'_>, path: &Path) -> Result<SourceFile, ParseError> {
        let mut package = None;
        let mut imports = Vec::new();
        let mut types = Vec::new();
        let mut funcs = Vec::new();

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "package_clause" => {
                    let mut inner = child.walk();
                    package = child
                        .named_children(&mut inner)
                        .find(|n| n.kind() == "package_identifier")
                        .map(|n| self.text(n));
                }
                "import_declaration" => self.imports(child, &mut imports),
                "type_declaration" => self.type_decls(child, &mut types),
                "function_declaration" | "method_declaration" => funcs.push(self.func(child)),
                _ => {}
            }
        }

        let package = package.ok_or_else(|| ParseError::MissingPackage {
            path: path.to_path_buf(),
        })?;

        Ok(SourceFile {
            path: path.to_path_buf(),
            package,
            imports,
            types,
            funcs,
        })
    }

    fn imports(&self, node: TsNode<'_>, out: &mut Vec<ImportBinding>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "import_spec" => out.extend(self.import_spec(child)),
                "import_spec_list" => {
                    let mut inner = child.walk();
                    for spec in child.named_children(&mut inner) {
                        if spec.kind() == "import_spec" {
                            out.extend(self.import_spec(spec));
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn import_spec(&self, node: TsNode<'_>) -> Option<ImportBinding> {
        let path = node.child_by_field_name("path")?;
        let path = text(path, self.src).trim_matches(|c| c == '"' || c == '`');
        let alias = node.child_by_field_name("name").map(|n| self.text(n));
        Some(ImportBinding::new(alias, path))
    }

    fn type_decls(&self, node: TsNode<'_>, out: &mut Vec<TypeDecl>) {
        let mut cursor = node.walk();
        for spec in node.named_children(&mut cursor) {
            if !matches!(spec.kind(), "type_spec" | "type_alias") {
                continue;
            }
            if let Some(name) = spec.child_by_field_name("name") {
                out.push(TypeDecl {
                    name: self.text(name),
                    source: format!("type {}", text(spec, self.src)),
                });
            }
        }
    }

    fn func(&self, node: TsNode<'_>) -> FuncDecl {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n))
            .unwrap_or_default();

        let receiver = node
            .child_by_field_name("receiver")
            .and_then(|list| self.params(list).into_iter().next());

        let type_params = node
            .child_by_field_name("type_parameters")
            .map(|list| self.type_params(list))
            .unwrap_or_default();

        let params = node
            .child_by_field_name("parameters")
            .map(|list| self.params(list))
            .unwrap_or_default();

        let results = node
            .child_by_field_name("result")
            .map(|result| self.results(result))
            .unwrap_or_default();

        let body = node.child_by_field_name("body").and_then(|b| self.node(b));

        FuncDecl {
            name,
            receiver,
            type_params,
            params,
            results,
            body,
            source: self.text(node),
        }
    }

    fn type_params(&self, list: TsNode<'_>) -> Vec<String> {
        let mut names = Vec::new();
        let mut cursor = list.walk();
        for decl in list.named_children(&mut cursor) {
            if decl.kind() != "type_parameter_declaration" {
                continue;
            }
            let mut inner = decl.walk();
            names.extend(
                decl.children_by_field_name("name", &mut inner)
                    .map(|n| self.text(n)),
            );
        }
        names
    }

    fn params(&self, list: TsNode<'_>) -> Vec<Param> {
        let mut params = Vec::new();
        let mut cursor = list.walk();
        for decl in list.named_children(&mut cursor) {
            let variadic = match decl.kind() {
                "parameter_declaration" => false,
                "variadic_parameter_declaration" => true,
                _ => continue,
            };
            let Some(ty) = decl.child_by_field_name("type") else {
                continue;
            };
            let mut ty = self.ty(ty);
            if variadic {
                ty = TypeExpr::Slice(Box::new(ty));
            }
            let mut inner = decl.walk();
            let names = decl
                .children_by_field_name("name", &mut inner)
                .map(|n| self.text(n))
                .collect();
            params.push(Param { names, ty });
        }
        params
    }

    fn results(&self, node: TsNode<'_>) -> Vec<Param> {
        if node.kind() == "parameter_list" {
            self.params(node)
        } else {
            vec![Param {
                names: Vec::new(),
                ty: self.ty(node),
            }]
        }
    }

    fn field_ty(&self, node: TsNode<'_>, field: &str) -> TypeExpr {
        node.child_by_field_name(field)
            .map(|n| self.ty(n))
            .unwrap_or(TypeExpr::Other)
    }

    fn first_named_ty(&self, node: TsNode<'_>) -> TypeExpr {
        let mut cursor = node.walk();
        let inner = node
            .named_children(&mut cursor)
            .find(|n| n.kind() != "comment");
        inner.map(|n| self.ty(n)).unwrap_or(TypeExpr::Other)
    }

    fn ty(&self, node: TsNode<'_>) -> TypeExpr {
        match node.kind() {
            "type_identifier" => TypeExpr::named(self.text(node)),
            "qualified_type" => {
                let package = node.child_by_field_name("package").map(|n| self.text(n));
                let name = node.child_by_field_name("name").map(|n| self.text(n));
                match (package, name) {
                    (Some(package), Some(name)) => TypeExpr::qualified(package, name),
                    _ => TypeExpr::Other,
                }
            }
            "pointer_type" => TypeExpr::Pointer(Box::new(self.first_named_ty(node))),
            "slice_type" => TypeExpr::Slice(Box::new(self.field_ty(node, "element"))),
            "array_type" | "implicit_length_array_type" => {
                TypeExpr::Array(Box::new(self.field_ty(node, "element")))
            }
            "map_type" => TypeExpr::Map {
                key: Box::new(self.field_ty(node, "key")),
                value: Box::new(self.field_ty(node, "value")),
            },
            "channel_type" => TypeExpr::Chan(Box::new(self.field_ty(node, "value"))),
            "generic_type" => {
                let base = self.field_ty(node, "type");
                let args = node
                    .child_by_field_name("type_arguments")
                    .map(|list| {
                        let mut cursor = list.walk();
                        let args: Vec<_> = list
                            .named_children(&mut cursor)
                            .filter(|n| n.kind() != "comment")
                            .map(|n| self.ty(n))
                            .collect();
                        args
                    })
                    .unwrap_or_default();
                TypeExpr::Generic {
                    base: Box::new(base),
                    args,
                }
            }
            "parenthesized_type" | "type_elem" | "type_constraint" => self.first_named_ty(node),
            _ => TypeExpr::Other,
        }
    }

    /// Type of `T{..}` or `&T{..}`, the only initializer shapes trusted
    fn literal_ty(&self, node: TsNode<'_>) -> Option<TypeExpr> {
        match node.kind() {
            "composite_literal" => match self.field_ty(node, "type") {
                TypeExpr::Other => None,
                ty => Some(ty),
            },
            "unary_expression" => {
                let op = node.child_by_field_name("operator")?;
                if text(op, self.src) != "&" {
                    return None;
                }
                let operand = node.child_by_field_name("operand")?;
                self.literal_ty(operand)
                    .filter(|_| operand.kind() == "composite_literal")
                    .map(|ty| TypeExpr::Pointer(Box::new(ty)))
            }
            "parenthesized_expression" => {
                let mut cursor = node.walk();
                let inner = node.named_children(&mut cursor).next()?;
                self.literal_ty(inner)
            }
            _ => None,
        }
    }

    fn named_nodes(&self, node: Option<TsNode<'_>>) -> Vec<Node> {
        let Some(node) = node else {
            return Vec::new();
        };
        let mut cursor = node.walk();
        let children: Vec<_> = node.named_children(&mut cursor).collect();
        children.into_iter().filter_map(|c| self.node(c)).collect()
    }

    fn list_items<'t>(&self, node: Option<TsNode<'t>>) -> Vec<TsNode<'t>> {
        let Some(node) = node else {
            return Vec::new();
        };
        let mut cursor = node.walk();
        let items: Vec<_> = node
            .named_children(&mut cursor)
            .filter(|n| n.kind() != "comment")
            .collect();
        items
    }

    fn node(&self, node: TsNode<'_>) -> Option<Node> {
        let kind = node.kind();
        match kind {
            "identifier" => Some(Node::Ident(self.text(node))),
            "selector_expression" => {
                let operand = node
                    .child_by_field_name("operand")
                    .and_then(|n| self.node(n))
                    .unwrap_or(Node::Group(Vec::new()));
                let field = node.child_by_field_name("field")?;
                Some(Node::Selector {
                    operand: Box::new(operand),
                    field: self.text(field),
                })
            }
            "call_expression" => {
                let function = node.child_by_field_name("function").and_then(|n| self.node(n))?;
                let mut args = self.named_nodes(node.child_by_field_name("arguments"));
                if let Some(type_args) = node.child_by_field_name("type_arguments") {
                    let mut cursor = type_args.walk();
                    let extra: Vec<_> = type_args
                        .named_children(&mut cursor)
                        .map(|n| Node::Type(self.ty(n)))
                        .collect();
                    args.extend(extra);
                }
                Some(Node::Call {
                    function: Box::new(function),
                    args,
                })
            }
            "composite_literal" => {
                let mut children = vec![Node::Type(self.field_ty(node, "type"))];
                children.extend(node.child_by_field_name("body").and_then(|b| self.node(b)));
                Some(Node::Group(children))
            }
            "type_conversion_expression" | "type_assertion_expression" => {
                let mut children = vec![Node::Type(self.field_ty(node, "type"))];
                children.extend(node.child_by_field_name("operand").and_then(|o| self.node(o)));
                Some(Node::Group(children))
            }
            "short_var_declaration" => Some(self.short_var(node)),
            "var_spec" => Some(self.var_spec(node)),
            "range_clause" => {
                let mut children: Vec<Node> = node
                    .child_by_field_name("right")
                    .and_then(|r| self.node(r))
                    .into_iter()
                    .collect();
                for item in self.list_items(node.child_by_field_name("left")) {
                    if item.kind() == "identifier" && text(item, self.src) != "_" {
                        children.push(Node::Binding {
                            name: self.text(item),
                            ty: None,
                        });
                    }
                }
                Some(Node::Group(children))
            }
            "func_literal" => {
                let mut children = Vec::new();
                if let Some(list) = node.child_by_field_name("parameters") {
                    for param in self.params(list) {
                        children.push(Node::Type(param.ty.clone()));
                        for name in param.names {
                            children.push(Node::Binding {
                                name,
                                ty: Some(param.ty.clone()),
                            });
                        }
                    }
                }
                if let Some(result) = node.child_by_field_name("result") {
                    children.extend(self.results(result).into_iter().map(|p| Node::Type(p.ty)));
                }
                children.extend(node.child_by_field_name("body").and_then(|b| self.node(b)));
                Some(Node::Group(children))
            }
            "comment"
            | "field_identifier"
            | "package_identifier"
            | "label_name"
            | "blank_identifier"
            | "interpreted_string_literal"
            | "raw_string_literal"
            | "rune_literal"
            | "int_literal"
            | "float_literal"
            | "imaginary_literal"
            | "true"
            | "false"
            | "nil"
            | "iota" => None,
            _ if is_type_kind(kind) => Some(Node::Type(self.ty(node))),
            _ => {
                let children = self.named_nodes(Some(node));
                if children.is_empty() {
                    None
                } else {
                    Some(Node::Group(children))
                }
            }
        }
    }

    fn short_var(&self, node: TsNode<'_>) -> Node {
        let left = self.list_items(node.child_by_field_name("left"));
        let right = self.list_items(node.child_by_field_name("right"));

        let mut children: Vec<Node> = right.iter().filter_map(|r| self.node(*r)).collect();
        let paired = left.len() == right.len();

        for (i, item) in left.iter().enumerate() {
            if item.kind() != "identifier" || text(*item, self.src) == "_" {
                continue;
            }
            let ty = if paired {
                right.get(i).and_then(|r| self.literal_ty(*r))
            } else {
                None
            };
            children.push(Node::Binding {
                name: self.text(*item),
                ty,
            });
        }

        Node::Group(children)
    }

    fn var_spec(&self, node: TsNode<'_>) -> Node {
        let declared = node.child_by_field_name("type").map(|t| self.ty(t));
        let values = self.list_items(node.child_by_field_name("value"));

        let mut children: Vec<Node> = values.iter().filter_map(|v| self.node(*v)).collect();

        let mut cursor = node.walk();
        let names: Vec<_> = node.children_by_field_name("name", &mut cursor).collect();
        let paired = names.len() == values.len();

        for (i, name) in names.iter().enumerate() {
            let ty = match &declared {
                Some(ty) => Some(ty.clone()),
                None if paired => values.get(i).and_then(|v| self.literal_ty(*v)),
                None => None,
            };
            children.push(Node::Binding {
                name: self.text(*name),
                ty,
            });
        }

        Node::Group(children)
    }
}
