// SPDX-License-Identifier: Apache-2.0

//! Code structure extraction with tree-sitter.
//!
//! Produces the functions, classes and imports of a source file along with a
//! cyclomatic complexity estimate. JavaScript, TypeScript, Python and Go are
//! parsed; every other language yields an empty structure. Syntax errors do
//! not abort extraction: tree-sitter recovers and the well-formed parts of
//! the file are still reported.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};
use tree_sitter::{Language as Grammar, Node, Parser};

use crate::language::Language;

thread_local! {
    static PARSER: RefCell<Parser> = RefCell::new(Parser::new());
}

/// A function or bound arrow function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
    /// Function name, `anonymous` when it has none.
    pub name: String,
    /// 1-based line of the definition.
    pub line: usize,
    /// 0-based column of the definition.
    pub column: usize,
    /// Parameter names; `...name` for rest parameters, `unknown` for patterns.
    pub params: Vec<String>,
    /// Declared `async`.
    pub is_async: bool,
    /// JavaScript arrow function.
    pub is_arrow: bool,
    /// 1 + decision points in the body.
    pub complexity: u32,
}

/// A class (or Go struct with its methods).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    /// Class name.
    pub name: String,
    /// 1-based line.
    pub line: usize,
    /// 0-based column.
    pub column: usize,
    /// Method names in declaration order.
    pub methods: Vec<String>,
    /// Direct superclass, when it is a plain name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
}

/// An import statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportInfo {
    /// Imported module or path, without quotes.
    pub source: String,
    /// 1-based line.
    pub line: usize,
}

/// Structure of one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeStructure {
    /// Functions in source order.
    pub functions: Vec<FunctionInfo>,
    /// Classes in source order.
    pub classes: Vec<ClassInfo>,
    /// Imports in source order.
    pub imports: Vec<ImportInfo>,
    /// Sum of function complexities.
    pub complexity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    Ecma,
    Python,
    Go,
}

fn grammar_for(path: &str, language: Language) -> Option<(Grammar, Dialect)> {
    let ext = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let grammar = match language {
        Language::Javascript | Language::Typescript if ext == "jsx" || ext == "tsx" => (
            Grammar::from(tree_sitter_typescript::LANGUAGE_TSX),
            Dialect::Ecma,
        ),
        Language::Javascript => (
            Grammar::from(tree_sitter_javascript::LANGUAGE),
            Dialect::Ecma,
        ),
        Language::Typescript => (
            Grammar::from(tree_sitter_typescript::LANGUAGE_TYPESCRIPT),
            Dialect::Ecma,
        ),
        Language::Python => (Grammar::from(tree_sitter_python::LANGUAGE), Dialect::Python),
        Language::Go => (Grammar::from(tree_sitter_go::LANGUAGE), Dialect::Go),
        _ => return None,
    };
    Some(grammar)
}

/// Whether [`parse_structure`] understands `language`.
#[must_use]
pub fn has_structure_support(language: Language) -> bool {
    matches!(
        language,
        Language::Javascript | Language::Typescript | Language::Python | Language::Go
    )
}

/// Extracts the structure of `content`.
///
/// Unsupported languages and parser failures give an empty structure.
#[must_use]
pub fn parse_structure(content: &str, path: &str, language: Language) -> CodeStructure {
    let Some((grammar, dialect)) = grammar_for(path, language) else {
        tracing::debug!(file = %path, language = %language, "No syntax tree support, using pattern matching only");
        return CodeStructure::default();
    };

    let tree = PARSER.with(|cell| {
        let mut parser = cell.borrow_mut();
        if let Err(e) = parser.set_language(&grammar) {
            tracing::warn!(error = %e, "Failed to load tree-sitter grammar");
            return None;
        }
        parser.parse(content, None)
    });

    let Some(tree) = tree else {
        tracing::warn!(file = %path, "tree-sitter failed to parse file");
        return CodeStructure::default();
    };

    let src = content.as_bytes();
    let mut structure = CodeStructure::default();
    let mut go_methods: Vec<(String, String)> = Vec::new();

    for_each_descendant(tree.root_node(), |node| match dialect {
        Dialect::Ecma => visit_ecma(node, src, &mut structure),
        Dialect::Python => visit_python(node, src, &mut structure),
        Dialect::Go => visit_go(node, src, &mut structure, &mut go_methods),
    });

    for (receiver, method) in go_methods {
        if let Some(class) = structure.classes.iter_mut().find(|c| c.name == receiver) {
            class.methods.push(method);
        }
    }

    structure.complexity = structure.functions.iter().map(|f| f.complexity).sum();
    structure
}

/// Pre-order walk over `root` and all of its descendants.
fn for_each_descendant<'t>(root: Node<'t>, mut visit: impl FnMut(Node<'t>)) {
    let mut cursor = root.walk();
    'walk: loop {
        visit(cursor.node());
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                continue 'walk;
            }
            if !cursor.goto_parent() {
                break 'walk;
            }
        }
    }
}

fn text<'a>(node: Node<'_>, src: &'a [u8]) -> &'a str {
    node.utf8_text(src).unwrap_or("")
}

fn field_text(node: Node<'_>, field: &str, src: &[u8]) -> Option<String> {
    node.child_by_field_name(field)
        .map(|child| text(child, src).to_string())
}

fn unquote(raw: &str) -> String {
    raw.trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .to_string()
}

fn starts_with_async(node: Node<'_>) -> bool {
    node.child(0).is_some_and(|first| first.kind() == "async")
}

fn is_decision(node: Node<'_>, dialect: Dialect) -> bool {
    let kind = node.kind();
    let logical = |ops: &[&str]| {
        node.child_by_field_name("operator")
            .is_some_and(|op| ops.contains(&op.kind()))
    };

    match dialect {
        Dialect::Ecma => match kind {
            "if_statement" | "for_statement" | "for_in_statement" | "while_statement"
            | "do_statement" | "switch_statement" | "ternary_expression" | "catch_clause" => true,
            "binary_expression" => logical(&["&&", "||", "??"]),
            _ => false,
        },
        Dialect::Python => matches!(
            kind,
            "if_statement"
                | "elif_clause"
                | "for_statement"
                | "while_statement"
                | "conditional_expression"
                | "boolean_operator"
                | "except_clause"
        ),
        Dialect::Go => match kind {
            "if_statement"
            | "for_statement"
            | "expression_switch_statement"
            | "type_switch_statement"
            | "select_statement" => true,
            "binary_expression" => logical(&["&&", "||"]),
            _ => false,
        },
    }
}

fn complexity_of(node: Node<'_>, dialect: Dialect) -> u32 {
    let mut complexity = 1;
    for_each_descendant(node, |n| {
        if is_decision(n, dialect) {
            complexity += 1;
        }
    });
    complexity
}

fn function_info(
    node: Node<'_>,
    name: String,
    params: Vec<String>,
    is_arrow: bool,
    dialect: Dialect,
) -> FunctionInfo {
    let start = node.start_position();
    FunctionInfo {
        name,
        line: start.row + 1,
        column: start.column,
        params,
        is_async: starts_with_async(node),
        is_arrow,
        complexity: complexity_of(node, dialect),
    }
}

// JavaScript / TypeScript

fn visit_ecma(node: Node<'_>, src: &[u8], out: &mut CodeStructure) {
    match node.kind() {
        "function_declaration" | "generator_function_declaration" => {
            let name = field_text(node, "name", src).unwrap_or_else(|| "anonymous".to_string());
            let params = ecma_params(node, src);
            out.functions
                .push(function_info(node, name, params, false, Dialect::Ecma));
        }
        "arrow_function" => {
            let Some(parent) = node.parent() else { return };
            let name = match parent.kind() {
                "variable_declarator" => parent
                    .child_by_field_name("name")
                    .filter(|n| n.kind() == "identifier")
                    .map_or_else(|| "anonymous".to_string(), |n| text(n, src).to_string()),
                "assignment_expression" => "anonymous".to_string(),
                _ => return,
            };
            let params = ecma_params(node, src);
            out.functions
                .push(function_info(node, name, params, true, Dialect::Ecma));
        }
        "class_declaration" | "abstract_class_declaration" => {
            out.classes.push(ecma_class(node, src));
        }
        "import_statement" => {
            if let Some(source) = node.child_by_field_name("source") {
                out.imports.push(ImportInfo {
                    source: unquote(text(source, src)),
                    line: node.start_position().row + 1,
                });
            }
        }
        _ => {}
    }
}

fn ecma_params(function: Node<'_>, src: &[u8]) -> Vec<String> {
    // `x => x` has a single `parameter` field instead of a list.
    if let Some(single) = function.child_by_field_name("parameter") {
        return vec![ecma_param_name(single, src)];
    }
    let Some(list) = function.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut cursor = list.walk();
    list.named_children(&mut cursor)
        .filter(|p| p.kind() != "comment")
        .map(|p| ecma_param_name(p, src))
        .collect()
}

fn ecma_param_name(param: Node<'_>, src: &[u8]) -> String {
    match param.kind() {
        "identifier" => text(param, src).to_string(),
        "rest_pattern" => match param.named_child(0) {
            Some(inner) if inner.kind() == "identifier" => format!("...{}", text(inner, src)),
            _ => "unknown".to_string(),
        },
        // TypeScript wraps the binding with its type annotation.
        "required_parameter" | "optional_parameter" => param
            .child_by_field_name("pattern")
            .map_or_else(|| "unknown".to_string(), |p| ecma_param_name(p, src)),
        _ => "unknown".to_string(),
    }
}

fn ecma_class(node: Node<'_>, src: &[u8]) -> ClassInfo {
    let start = node.start_position();
    let mut methods = Vec::new();
    let mut extends = None;

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "class_heritage" => extends = ecma_superclass(child, src),
            "class_body" => {
                let mut body_cursor = child.walk();
                for member in child.named_children(&mut body_cursor) {
                    if member.kind() != "method_definition" {
                        continue;
                    }
                    if let Some(key) = member.child_by_field_name("name") {
                        match key.kind() {
                            "property_identifier" => methods.push(text(key, src).to_string()),
                            "string" => methods.push(unquote(text(key, src))),
                            _ => {}
                        }
                    }
                }
            }
            _ => {}
        }
    }

    ClassInfo {
        name: field_text(node, "name", src).unwrap_or_else(|| "anonymous".to_string()),
        line: start.row + 1,
        column: start.column,
        methods,
        extends,
    }
}

fn ecma_superclass(heritage: Node<'_>, src: &[u8]) -> Option<String> {
    let mut cursor = heritage.walk();
    let first = heritage.named_children(&mut cursor).next()?;
    let target = if first.kind() == "extends_clause" {
        first
            .child_by_field_name("value")
            .or_else(|| first.named_child(0))?
    } else {
        first
    };
    matches!(target.kind(), "identifier" | "type_identifier").then(|| text(target, src).to_string())
}

// Python

fn visit_python(node: Node<'_>, src: &[u8], out: &mut CodeStructure) {
    match node.kind() {
        "function_definition" => {
            let name = field_text(node, "name", src).unwrap_or_else(|| "anonymous".to_string());
            let mut params = python_params(node, src);
            if python_is_method(node)
                && params
                    .first()
                    .is_some_and(|first| first == "self" || first == "cls")
            {
                params.remove(0);
            }
            out.functions
                .push(function_info(node, name, params, false, Dialect::Python));
        }
        "class_definition" => out.classes.push(python_class(node, src)),
        "import_statement" => {
            let mut cursor = node.walk();
            for name in node.children_by_field_name("name", &mut cursor) {
                let module = if name.kind() == "aliased_import" {
                    field_text(name, "name", src).unwrap_or_default()
                } else {
                    text(name, src).to_string()
                };
                out.imports.push(ImportInfo {
                    source: module,
                    line: node.start_position().row + 1,
                });
            }
        }
        "import_from_statement" => {
            if let Some(module) = field_text(node, "module_name", src) {
                out.imports.push(ImportInfo {
                    source: module,
                    line: node.start_position().row + 1,
                });
            }
        }
        _ => {}
    }
}

fn python_is_method(function: Node<'_>) -> bool {
    let mut parent = function.parent();
    if parent.is_some_and(|p| p.kind() == "decorated_definition") {
        parent = parent.and_then(|p| p.parent());
    }
    parent.is_some_and(|block| {
        block.kind() == "block"
            && block
                .parent()
                .is_some_and(|class| class.kind() == "class_definition")
    })
}

fn python_params(function: Node<'_>, src: &[u8]) -> Vec<String> {
    let Some(list) = function.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut cursor = list.walk();
    list.named_children(&mut cursor)
        .filter_map(|p| python_param_name(p, src))
        .collect()
}

fn python_param_name(param: Node<'_>, src: &[u8]) -> Option<String> {
    let name = match param.kind() {
        "identifier" => text(param, src).to_string(),
        "default_parameter" | "typed_default_parameter" => field_text(param, "name", src)?,
        "typed_parameter" => return python_param_name(param.named_child(0)?, src),
        "list_splat_pattern" => format!("*{}", text(param.named_child(0)?, src)),
        "dictionary_splat_pattern" => format!("**{}", text(param.named_child(0)?, src)),
        // `*` and `/` separators
        "keyword_separator" | "positional_separator" | "comment" => return None,
        _ => "unknown".to_string(),
    };
    Some(name)
}

fn python_class(node: Node<'_>, src: &[u8]) -> ClassInfo {
    let start = node.start_position();
    let extends = node.child_by_field_name("superclasses").and_then(|args| {
        let mut cursor = args.walk();
        args.named_children(&mut cursor)
            .find(|arg| matches!(arg.kind(), "identifier" | "attribute"))
            .map(|arg| text(arg, src).to_string())
    });

    let mut methods = Vec::new();
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for statement in body.named_children(&mut cursor) {
            let definition = if statement.kind() == "decorated_definition" {
                statement.child_by_field_name("definition")
            } else {
                Some(statement)
            };
            if let Some(def) = definition.filter(|d| d.kind() == "function_definition")
                && let Some(name) = field_text(def, "name", src)
            {
                methods.push(name);
            }
        }
    }

    ClassInfo {
        name: field_text(node, "name", src).unwrap_or_else(|| "anonymous".to_string()),
        line: start.row + 1,
        column: start.column,
        methods,
        extends,
    }
}

// Go

fn visit_go(
    node: Node<'_>,
    src: &[u8],
    out: &mut CodeStructure,
    methods: &mut Vec<(String, String)>,
) {
    match node.kind() {
        "function_declaration" | "method_declaration" => {
            let name = field_text(node, "name", src).unwrap_or_else(|| "anonymous".to_string());
            if node.kind() == "method_declaration"
                && let Some(receiver) = node
                    .child_by_field_name("receiver")
                    .and_then(|r| go_receiver_type(r, src))
            {
                methods.push((receiver, name.clone()));
            }
            let params = go_params(node, src);
            out.functions
                .push(function_info(node, name, params, false, Dialect::Go));
        }
        "type_spec" => {
            let is_struct = node
                .child_by_field_name("type")
                .is_some_and(|t| t.kind() == "struct_type");
            if is_struct && let Some(name) = field_text(node, "name", src) {
                let start = node.start_position();
                out.classes.push(ClassInfo {
                    name,
                    line: start.row + 1,
                    column: start.column,
                    methods: Vec::new(),
                    extends: None,
                });
            }
        }
        "import_spec" => {
            if let Some(path) = field_text(node, "path", src) {
                out.imports.push(ImportInfo {
                    source: unquote(&path),
                    line: node.start_position().row + 1,
                });
            }
        }
        _ => {}
    }
}

fn go_receiver_type(receiver: Node<'_>, src: &[u8]) -> Option<String> {
    let mut found = None;
    for_each_descendant(receiver, |n| {
        if found.is_none() && n.kind() == "type_identifier" {
            found = Some(text(n, src).to_string());
        }
    });
    found
}

fn go_params(function: Node<'_>, src: &[u8]) -> Vec<String> {
    let Some(list) = function.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut params = Vec::new();
    let mut cursor = list.walk();
    for decl in list.named_children(&mut cursor) {
        match decl.kind() {
            "parameter_declaration" => {
                let mut names_cursor = decl.walk();
                let names: Vec<String> = decl
                    .children_by_field_name("name", &mut names_cursor)
                    .map(|n| text(n, src).to_string())
                    .collect();
                if names.is_empty() {
                    params.push("unknown".to_string());
                } else {
                    params.extend(names);
                }
            }
            "variadic_parameter_declaration" => {
                params.push(field_text(decl, "name", src).map_or_else(
                    || "unknown".to_string(),
                    |name| format!("...{name}"),
                ));
            }
            _ => {}
        }
    }
    params
}
