//! Tree-sitter parser integration for JavaScript/TypeScript.
//!
//! Parses a config file with the tree-sitter grammar matching its extension
//! and lowers the CST to the statement-level [`Program`] model. Only the
//! constructs the migration cares about are structured; everything else is
//! carried as verbatim text.

use crate::providers::TreeProvider;
use crate::tree::{
    Declarator, ExportDefault, Expr, ImportBinding, ImportDecl, ObjectExpr, Program, Statement,
    StatementKind, VarDecl,
};
use std::path::Path;
use thiserror::Error;
use tree_sitter::{Language as TsLanguage, Node, Parser};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to load the {0} grammar: {1}")]
    Grammar(&'static str, tree_sitter::LanguageError),
    #[error("tree-sitter produced no parse tree")]
    Empty,
    #[error("source is not syntactically valid {0}")]
    Syntax(&'static str),
}

/// Language variant, selected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsVariant {
    JavaScript,
    Jsx,
    TypeScript,
    Tsx,
}

impl JsVariant {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "js" | "mjs" | "cjs" => Some(JsVariant::JavaScript),
            "jsx" => Some(JsVariant::Jsx),
            "ts" | "mts" | "cts" => Some(JsVariant::TypeScript),
            "tsx" => Some(JsVariant::Tsx),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            JsVariant::JavaScript => "JavaScript",
            JsVariant::Jsx => "JSX",
            JsVariant::TypeScript => "TypeScript",
            JsVariant::Tsx => "TSX",
        }
    }

    fn grammar(self) -> TsLanguage {
        match self {
            JsVariant::JavaScript | JsVariant::Jsx => tree_sitter_javascript::LANGUAGE.into(),
            JsVariant::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            JsVariant::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// Determine the language variant from a file path.
pub fn detect_variant(path: &Path) -> JsVariant {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(JsVariant::from_extension)
        .unwrap_or(JsVariant::TypeScript)
}

/// Tree provider backed by tree-sitter grammars.
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeSitterProvider;

impl TreeProvider for TreeSitterProvider {
    fn parse(&self, path: &Path, source: &str) -> Result<Program, ParseError> {
        let variant = detect_variant(path);
        let mut parser = Parser::new();
        parser
            .set_language(&variant.grammar())
            .map_err(|err| ParseError::Grammar(variant.name(), err))?;
        let tree = parser.parse(source, None).ok_or(ParseError::Empty)?;
        if tree.root_node().has_error() {
            return Err(ParseError::Syntax(variant.name()));
        }
        Ok(lower_program(tree.root_node(), source))
    }

    fn serialize(&self, program: &Program) -> String {
        program.to_source()
    }
}

/// Get text for a tree-sitter node.
fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

fn lower_program(root: Node, source: &str) -> Program {
    let mut statements = Vec::new();
    let mut cursor = root.walk();
    let mut prev_end = 0;
    for child in root.children(&mut cursor) {
        let gap = source[prev_end..child.start_byte()].to_string();
        prev_end = child.end_byte();
        statements.push(Statement {
            gap,
            kind: lower_statement(&child, source),
        });
    }
    Program::new(statements, source[prev_end..].to_string())
}

fn lower_statement(node: &Node, source: &str) -> StatementKind {
    let raw = node_text(node, source).to_string();
    match node.kind() {
        "import_statement" => lower_import(node, source)
            .map(StatementKind::Import)
            .unwrap_or(StatementKind::Other(raw)),
        "export_statement" => lower_export(node, source).unwrap_or(StatementKind::Other(raw)),
        "lexical_declaration" | "variable_declaration" => lower_var_decl(node, source)
            .map(StatementKind::Var)
            .unwrap_or(StatementKind::Other(raw)),
        _ => StatementKind::Other(raw),
    }
}

fn lower_export(node: &Node, source: &str) -> Option<StatementKind> {
    let raw = node_text(node, source).to_string();
    let mut cursor = node.walk();
    let is_default = node.children(&mut cursor).any(|c| c.kind() == "default");

    if is_default {
        // `export default <expr>;` carries the expression in the `value`
        // field; `export default function ...` uses `declaration` instead and
        // is never a migration target, so it stays raw.
        let expr = if let Some(value) = node.child_by_field_name("value") {
            lower_expr(&value, source)
        } else if let Some(decl) = node.child_by_field_name("declaration") {
            Expr::Raw(node_text(&decl, source).to_string())
        } else {
            return None;
        };
        return Some(StatementKind::ExportDefault(ExportDefault::parsed(
            raw, expr,
        )));
    }

    // `export { cfg as default }` (and `export { default } from ...`) is a
    // default export too; it is kept verbatim but must count as one so the
    // file is not mistaken for a named-only shape.
    if clause_exports_default(node, source) {
        let expr = Expr::Raw(raw.clone());
        return Some(StatementKind::ExportDefault(ExportDefault::parsed(
            raw, expr,
        )));
    }

    if let Some(decl) = node.child_by_field_name("declaration") {
        if matches!(decl.kind(), "lexical_declaration" | "variable_declaration") {
            if let Some(var) = lower_var_decl(&decl, source) {
                return Some(StatementKind::ExportNamed(var.with_raw(raw)));
            }
        }
    }

    // export clauses, re-exports and type-only exports pass through verbatim
    None
}

/// True when an export clause contains a specifier whose exported name is
/// `default`, i.e. `export { x as default }` or a bare `default` re-export.
fn clause_exports_default(node: &Node, source: &str) -> bool {
    let mut cursor = node.walk();
    let clause = node
        .children(&mut cursor)
        .find(|c| c.kind() == "export_clause");
    let Some(clause) = clause else {
        return false;
    };
    let mut spec_cursor = clause.walk();
    let found = clause.named_children(&mut spec_cursor).any(|spec| {
        if spec.kind() != "export_specifier" {
            return false;
        }
        // the exported name is the alias when present, the name otherwise
        spec.child_by_field_name("alias")
            .or_else(|| spec.child_by_field_name("name"))
            .map(|n| node_text(&n, source) == "default")
            .unwrap_or(false)
    });
    found
}

fn lower_var_decl(node: &Node, source: &str) -> Option<VarDecl> {
    let kind = node.child(0).map(|c| node_text(&c, source).to_string())?;
    let mut declarators = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "variable_declarator" {
            continue;
        }
        let raw = node_text(&child, source).to_string();
        let name = child
            .child_by_field_name("name")
            .filter(|n| n.kind() == "identifier")
            .map(|n| node_text(&n, source).to_string());
        let init = child
            .child_by_field_name("value")
            .map(|v| lower_expr(&v, source));
        declarators.push(Declarator { raw, name, init });
    }
    if declarators.is_empty() {
        return None;
    }
    Some(VarDecl::new(
        node_text(node, source).to_string(),
        kind,
        declarators,
    ))
}

fn lower_expr(node: &Node, source: &str) -> Expr {
    let text = node_text(node, source).to_string();
    match node.kind() {
        "object" => match text
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
        {
            Some(interior) => Expr::Object(ObjectExpr::from_interior(interior.to_string())),
            None => Expr::Raw(text),
        },
        "identifier" => Expr::Ident(text),
        _ => Expr::Raw(text),
    }
}

fn lower_import(node: &Node, source: &str) -> Option<ImportDecl> {
    let raw = node_text(node, source).to_string();
    let src = node.child_by_field_name("source")?;
    let module = unquote(node_text(&src, source));

    let mut type_only = false;
    let mut default_binding = None;
    let mut namespace_binding = None;
    let mut named = Vec::new();

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            // statement-level `import type { ... }`
            "type" => type_only = true,
            "import_clause" => {
                let mut clause_cursor = child.walk();
                for part in child.children(&mut clause_cursor) {
                    match part.kind() {
                        "identifier" => {
                            default_binding = Some(node_text(&part, source).to_string());
                        }
                        "namespace_import" => {
                            let mut ns_cursor = part.walk();
                            namespace_binding = part
                                .children(&mut ns_cursor)
                                .find(|n| n.kind() == "identifier")
                                .map(|n| node_text(&n, source).to_string());
                        }
                        "named_imports" => {
                            let mut spec_cursor = part.walk();
                            for spec in part.named_children(&mut spec_cursor) {
                                if spec.kind() != "import_specifier" {
                                    continue;
                                }
                                if let Some(binding) = lower_import_specifier(&spec, source) {
                                    named.push(binding);
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    Some(ImportDecl::parsed(
        raw,
        module,
        type_only,
        default_binding,
        namespace_binding,
        named,
    ))
}

fn lower_import_specifier(spec: &Node, source: &str) -> Option<ImportBinding> {
    let mut cursor = spec.walk();
    let type_only = spec.children(&mut cursor).any(|c| c.kind() == "type");
    let imported = spec
        .child_by_field_name("name")
        .map(|n| node_text(&n, source).to_string())?;
    let local = spec
        .child_by_field_name("alias")
        .map(|n| node_text(&n, source).to_string());
    Some(ImportBinding {
        imported,
        local,
        type_only,
    })
}

fn unquote(text: &str) -> String {
    text.trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .to_string()
}
