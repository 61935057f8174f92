//! Statement-level tree model for JS/TS configuration files.
//!
//! The model is deliberately shallow: the engine only rewrites top-level
//! export structure, so every statement keeps its original source text and is
//! re-printed from structure only once the rewriter actually touches it.
//! Value expressions move between containers as their original text spans,
//! which keeps comments and internal formatting attached to them. Each
//! statement also carries the whitespace gap that preceded it in the source,
//! so untouched statement runs (blank lines and same-line trailing comments
//! included) serialize byte for byte.

/// A parsed configuration file: an ordered, mutable statement list plus the
/// indexes derived at parse time.
#[derive(Debug, Clone)]
pub struct Program {
    pub statements: Vec<Statement>,
    /// Source text after the last statement, usually the final newline.
    pub trailing: String,
    /// Where the default-exported object expression lives, if anywhere.
    pub default_object: Option<DefaultObjectRef>,
    /// Named exports that carry an initializer, in declaration order.
    pub export_decls: Vec<NamedExportRef>,
    /// True if any default export exists, resolvable to an object or not.
    pub has_default_export: bool,
}

/// Location of the default-exported object expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultObjectRef {
    /// `export default { ... }`
    Literal { stmt: usize },
    /// `const config = { ... }; export default config;`
    ViaVariable {
        export_stmt: usize,
        decl_stmt: usize,
        name: String,
    },
}

/// A named export with an initializer: `export const tags = [...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedExportRef {
    pub name: String,
    pub stmt: usize,
}

/// One top-level statement plus the whitespace that preceded it.
#[derive(Debug, Clone)]
pub struct Statement {
    /// Verbatim source between the previous statement and this one.
    pub gap: String,
    pub kind: StatementKind,
}

#[derive(Debug, Clone)]
pub enum StatementKind {
    Import(ImportDecl),
    ExportDefault(ExportDefault),
    /// `export const`/`let`/`var` with one or more declarators.
    ExportNamed(VarDecl),
    /// Top-level (non-exported) variable declaration.
    Var(VarDecl),
    /// Anything the engine never touches, passed through verbatim:
    /// comments, type re-exports, function declarations, side effects.
    Other(String),
}

impl StatementKind {
    pub fn to_source(&self) -> String {
        match self {
            StatementKind::Import(import) => import.to_source(),
            StatementKind::ExportDefault(export) => export.to_source(),
            StatementKind::ExportNamed(decl) => decl.to_source(true),
            StatementKind::Var(decl) => decl.to_source(false),
            StatementKind::Other(raw) => raw.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportDefault {
    raw: Option<String>,
    pub expr: Expr,
}

impl ExportDefault {
    pub fn parsed(raw: String, expr: Expr) -> Self {
        Self {
            raw: Some(raw),
            expr,
        }
    }

    pub fn synthesized(expr: Expr) -> Self {
        Self { raw: None, expr }
    }

    /// Replace the exported expression, invalidating the original text.
    pub fn set_expr(&mut self, expr: Expr) {
        self.raw = None;
        self.expr = expr;
    }

    pub fn to_source(&self) -> String {
        match &self.raw {
            Some(raw) => raw.clone(),
            None => format!("export default {};", self.expr.to_source()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VarDecl {
    raw: Option<String>,
    /// `const`, `let` or `var`.
    pub kind: String,
    pub declarators: Vec<Declarator>,
}

impl VarDecl {
    pub fn new(raw: String, kind: String, declarators: Vec<Declarator>) -> Self {
        Self {
            raw: Some(raw),
            kind,
            declarators,
        }
    }

    /// Replace the original statement text, e.g. when an inner declaration is
    /// re-wrapped as `export <decl>`.
    pub fn with_raw(mut self, raw: String) -> Self {
        self.raw = Some(raw);
        self
    }

    /// Keep only declarators matching the predicate. Dropping any declarator
    /// invalidates the original text so the statement is re-printed.
    pub fn retain_declarators<F>(&mut self, pred: F)
    where
        F: FnMut(&Declarator) -> bool,
    {
        let before = self.declarators.len();
        self.declarators.retain(pred);
        if self.declarators.len() != before {
            self.raw = None;
        }
    }

    pub fn to_source(&self, exported: bool) -> String {
        if let Some(raw) = &self.raw {
            return raw.clone();
        }
        let decls = self
            .declarators
            .iter()
            .map(|d| d.raw.clone())
            .collect::<Vec<_>>()
            .join(", ");
        let prefix = if exported { "export " } else { "" };
        format!("{}{} {};", prefix, self.kind, decls)
    }
}

#[derive(Debug, Clone)]
pub struct Declarator {
    /// Original declarator text: `name[: Type] = init`.
    pub raw: String,
    /// Bound identifier, when the binding is a plain identifier.
    pub name: Option<String>,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Object(ObjectExpr),
    Ident(String),
    Call(CallExpr),
    /// Verbatim expression text for everything else.
    Raw(String),
}

impl Expr {
    pub fn call(callee: &str, arg: Expr) -> Self {
        Expr::Call(CallExpr {
            callee: callee.to_string(),
            arg: Box::new(arg),
        })
    }

    pub fn to_source(&self) -> String {
        match self {
            Expr::Object(obj) => obj.to_source(),
            Expr::Ident(name) => name.clone(),
            Expr::Call(call) => format!("{}({})", call.callee, call.arg.to_source()),
            Expr::Raw(text) => text.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub callee: String,
    pub arg: Box<Expr>,
}

/// An object literal. The original interior (text between the braces) is kept
/// verbatim; merged properties are appended after it at print time.
#[derive(Debug, Clone, Default)]
pub struct ObjectExpr {
    interior: String,
    appended: Vec<Property>,
}

#[derive(Debug, Clone)]
pub struct Property {
    pub key: String,
    pub value: Expr,
}

impl ObjectExpr {
    pub fn from_interior(interior: String) -> Self {
        Self {
            interior,
            appended: Vec::new(),
        }
    }

    /// Append a property after the pre-existing ones.
    pub fn push_property(&mut self, property: Property) {
        self.appended.push(property);
    }

    pub fn to_source(&self) -> String {
        if self.appended.is_empty() {
            return format!("{{{}}}", self.interior);
        }
        let merged = self
            .appended
            .iter()
            .map(|p| format!("{}: {}", p.key, p.value.to_source()))
            .collect::<Vec<_>>()
            .join(", ");
        let base = self.interior.trim_end();
        if base.trim_start().is_empty() {
            return format!("{{ {} }}", merged);
        }
        // A line comment ending the interior would swallow a same-line
        // append, so the merged properties move onto their own line. The
        // leading comma form stays valid whether or not the last property
        // already ends with one.
        let last_line = base.rsplit('\n').next().unwrap_or(base);
        if let Some(pos) = last_line.find("//") {
            let code = last_line[..pos].trim_end();
            let ends_with_comma = if code.is_empty() {
                base[..base.len() - last_line.len()].trim_end().ends_with(',')
            } else {
                code.ends_with(',')
            };
            let lead = if ends_with_comma { "  " } else { ", " };
            return format!("{{{}\n{}{}\n}}", base, lead, merged);
        }
        let base = base.strip_suffix(',').unwrap_or(base).trim_end();
        format!("{{{}, {} }}", base, merged)
    }
}

#[derive(Debug, Clone)]
pub struct ImportDecl {
    raw: Option<String>,
    /// Module specifier without quotes.
    pub source: String,
    /// Statement-level `import type { ... }`.
    pub type_only: bool,
    pub default_binding: Option<String>,
    pub namespace_binding: Option<String>,
    pub named: Vec<ImportBinding>,
}

#[derive(Debug, Clone)]
pub struct ImportBinding {
    pub imported: String,
    /// `Some` when the binding is aliased with `as`.
    pub local: Option<String>,
    /// Inline `type` marker on the specifier.
    pub type_only: bool,
}

impl ImportDecl {
    pub fn parsed(
        raw: String,
        source: String,
        type_only: bool,
        default_binding: Option<String>,
        namespace_binding: Option<String>,
        named: Vec<ImportBinding>,
    ) -> Self {
        Self {
            raw: Some(raw),
            source,
            type_only,
            default_binding,
            namespace_binding,
            named,
        }
    }

    /// A synthesized `import { name } from 'module';`.
    pub fn named_value(name: &str, module: &str) -> Self {
        Self {
            raw: None,
            source: module.to_string(),
            type_only: false,
            default_binding: None,
            namespace_binding: None,
            named: vec![ImportBinding {
                imported: name.to_string(),
                local: None,
                type_only: false,
            }],
        }
    }

    pub fn has_bindings(&self) -> bool {
        self.default_binding.is_some() || self.namespace_binding.is_some() || !self.named.is_empty()
    }

    /// True once a mutation invalidated the original statement text.
    pub fn was_modified(&self) -> bool {
        self.raw.is_none()
    }

    /// Keep only named bindings matching the predicate; relative order of the
    /// survivors is preserved.
    pub fn retain_named<F>(&mut self, pred: F)
    where
        F: FnMut(&ImportBinding) -> bool,
    {
        let before = self.named.len();
        self.named.retain(pred);
        if self.named.len() != before {
            self.raw = None;
        }
    }

    pub fn to_source(&self) -> String {
        if let Some(raw) = &self.raw {
            return raw.clone();
        }
        let mut parts = Vec::new();
        if let Some(default) = &self.default_binding {
            parts.push(default.clone());
        }
        if let Some(namespace) = &self.namespace_binding {
            parts.push(format!("* as {}", namespace));
        }
        if !self.named.is_empty() {
            let specs = self
                .named
                .iter()
                .map(|b| {
                    let mut spec = String::new();
                    if b.type_only {
                        spec.push_str("type ");
                    }
                    spec.push_str(&b.imported);
                    if let Some(local) = &b.local {
                        spec.push_str(" as ");
                        spec.push_str(local);
                    }
                    spec
                })
                .collect::<Vec<_>>()
                .join(", ");
            parts.push(format!("{{ {} }}", specs));
        }
        let keyword = if self.type_only {
            "import type"
        } else {
            "import"
        };
        if parts.is_empty() {
            format!("{} '{}';", keyword, self.source)
        } else {
            format!("{} {} from '{}';", keyword, parts.join(", "), self.source)
        }
    }
}

impl Program {
    pub fn new(statements: Vec<Statement>, trailing: String) -> Self {
        let mut program = Self {
            statements,
            trailing,
            default_object: None,
            export_decls: Vec::new(),
            has_default_export: false,
        };
        program.refresh_indexes();
        program
    }

    /// Recompute the derived indexes from the statement list.
    pub fn refresh_indexes(&mut self) {
        self.default_object = None;
        self.export_decls.clear();
        self.has_default_export = false;

        for (idx, stmt) in self.statements.iter().enumerate() {
            match &stmt.kind {
                StatementKind::ExportNamed(decl) => {
                    for declarator in &decl.declarators {
                        if let (Some(name), Some(_)) = (&declarator.name, &declarator.init) {
                            self.export_decls.push(NamedExportRef {
                                name: name.clone(),
                                stmt: idx,
                            });
                        }
                    }
                }
                StatementKind::ExportDefault(export) => {
                    self.has_default_export = true;
                    if self.default_object.is_some() {
                        continue;
                    }
                    match &export.expr {
                        Expr::Object(_) => {
                            self.default_object = Some(DefaultObjectRef::Literal { stmt: idx });
                        }
                        Expr::Ident(name) => {
                            if let Some(decl_stmt) = self.find_object_variable(name) {
                                self.default_object = Some(DefaultObjectRef::ViaVariable {
                                    export_stmt: idx,
                                    decl_stmt,
                                    name: name.clone(),
                                });
                            }
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }
    }

    /// Index of the non-exported variable declaration binding `name` to an
    /// object literal, if one exists.
    fn find_object_variable(&self, name: &str) -> Option<usize> {
        self.statements.iter().position(|stmt| {
            matches!(&stmt.kind, StatementKind::Var(decl) if decl.declarators.iter().any(|d| {
                d.name.as_deref() == Some(name) && matches!(d.init, Some(Expr::Object(_)))
            }))
        })
    }

    /// Insert a synthesized statement, fixing up the displaced statement's
    /// gap so the insertion lands on its own line.
    pub fn insert_statement(&mut self, idx: usize, kind: StatementKind) {
        let gap = if idx == 0 {
            String::new()
        } else {
            "\n".to_string()
        };
        if let Some(next) = self.statements.get_mut(idx) {
            if !next.gap.contains('\n') {
                next.gap = "\n".to_string();
            }
        }
        self.statements.insert(idx, Statement { gap, kind });
    }

    /// Append a synthesized statement at the end of the file.
    pub fn push_statement(&mut self, kind: StatementKind) {
        let end = self.statements.len();
        self.insert_statement(end, kind);
    }

    /// Remove a statement; its successor inherits the removed statement's
    /// position (gap), so surrounding blank lines do not pile up.
    pub fn remove_statement(&mut self, idx: usize) -> Statement {
        let removed = self.statements.remove(idx);
        if let Some(next) = self.statements.get_mut(idx) {
            next.gap = removed.gap.clone();
        }
        removed
    }

    pub fn to_source(&self) -> String {
        let mut out = String::new();
        for stmt in &self.statements {
            out.push_str(&stmt.gap);
            out.push_str(&stmt.kind.to_source());
        }
        out.push_str(&self.trailing);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_without_appends_round_trips_interior() {
        let obj = ObjectExpr::from_interior(" framework: 'x' ".to_string());
        assert_eq!(obj.to_source(), "{ framework: 'x' }");
    }

    #[test]
    fn object_append_onto_empty_interior() {
        let mut obj = ObjectExpr::default();
        obj.push_property(Property {
            key: "tags".to_string(),
            value: Expr::Raw("['a']".to_string()),
        });
        assert_eq!(obj.to_source(), "{ tags: ['a'] }");
    }

    #[test]
    fn object_append_strips_trailing_comma() {
        let mut obj = ObjectExpr::from_interior("\n  parameters: {},\n".to_string());
        obj.push_property(Property {
            key: "tags".to_string(),
            value: Expr::Raw("[]".to_string()),
        });
        assert_eq!(obj.to_source(), "{\n  parameters: {}, tags: [] }");
    }

    #[test]
    fn object_append_survives_trailing_line_comment() {
        let mut obj = ObjectExpr::from_interior("\n  parameters: {} // keep\n".to_string());
        obj.push_property(Property {
            key: "tags".to_string(),
            value: Expr::Raw("['a']".to_string()),
        });
        assert_eq!(
            obj.to_source(),
            "{\n  parameters: {} // keep\n, tags: ['a']\n}"
        );
    }

    #[test]
    fn object_append_after_comma_then_line_comment() {
        let mut obj = ObjectExpr::from_interior("\n  parameters: {}, // keep\n".to_string());
        obj.push_property(Property {
            key: "tags".to_string(),
            value: Expr::Raw("[]".to_string()),
        });
        assert_eq!(
            obj.to_source(),
            "{\n  parameters: {}, // keep\n  tags: []\n}"
        );
    }

    #[test]
    fn call_expression_wraps_argument() {
        let expr = Expr::call("defineMain", Expr::Object(ObjectExpr::default()));
        assert_eq!(expr.to_source(), "defineMain({})");
    }

    #[test]
    fn synthesized_import_prints_single_binding() {
        let import = ImportDecl::named_value("defineMain", "@storybook/react-vite/node");
        assert_eq!(
            import.to_source(),
            "import { defineMain } from '@storybook/react-vite/node';"
        );
    }

    #[test]
    fn modified_import_reprints_surviving_bindings() {
        let mut import = ImportDecl::parsed(
            "import type { StorybookConfig, Foo as Bar } from '@storybook/react';".to_string(),
            "@storybook/react".to_string(),
            true,
            None,
            None,
            vec![
                ImportBinding {
                    imported: "StorybookConfig".to_string(),
                    local: None,
                    type_only: false,
                },
                ImportBinding {
                    imported: "Foo".to_string(),
                    local: Some("Bar".to_string()),
                    type_only: false,
                },
            ],
        );
        import.retain_named(|b| b.imported != "StorybookConfig");
        assert!(import.was_modified());
        assert_eq!(
            import.to_source(),
            "import type { Foo as Bar } from '@storybook/react';"
        );
    }

    #[test]
    fn untouched_import_keeps_original_text() {
        let mut import = ImportDecl::parsed(
            "import {join} from  'node:path'".to_string(),
            "node:path".to_string(),
            false,
            None,
            None,
            vec![ImportBinding {
                imported: "join".to_string(),
                local: None,
                type_only: false,
            }],
        );
        import.retain_named(|_| true);
        assert!(!import.was_modified());
        assert_eq!(import.to_source(), "import {join} from  'node:path'");
    }

    #[test]
    fn pruned_var_decl_reprints_remaining_declarators() {
        let mut decl = VarDecl::new(
            "export const a = 1, b = 2;".to_string(),
            "const".to_string(),
            vec![
                Declarator {
                    raw: "a = 1".to_string(),
                    name: Some("a".to_string()),
                    init: Some(Expr::Raw("1".to_string())),
                },
                Declarator {
                    raw: "b = 2".to_string(),
                    name: Some("b".to_string()),
                    init: Some(Expr::Raw("2".to_string())),
                },
            ],
        );
        decl.retain_declarators(|d| d.name.as_deref() != Some("a"));
        assert_eq!(decl.to_source(true), "export const b = 2;");
    }

    #[test]
    fn inserting_at_the_top_pushes_the_old_first_statement_down() {
        let mut program = Program::new(
            vec![Statement {
                gap: String::new(),
                kind: StatementKind::Other("export default defineMain({});".to_string()),
            }],
            "\n".to_string(),
        );
        program.insert_statement(
            0,
            StatementKind::Import(ImportDecl::named_value("defineMain", "pkg/node")),
        );
        assert_eq!(
            program.to_source(),
            "import { defineMain } from 'pkg/node';\nexport default defineMain({});\n"
        );
    }

    #[test]
    fn removing_a_statement_hands_its_gap_to_the_successor() {
        let mut program = Program::new(
            vec![
                Statement {
                    gap: String::new(),
                    kind: StatementKind::Other("const a = 1;".to_string()),
                },
                Statement {
                    gap: "\n\n".to_string(),
                    kind: StatementKind::Other("const b = 2;".to_string()),
                },
                Statement {
                    gap: "\n".to_string(),
                    kind: StatementKind::Other("const c = 3;".to_string()),
                },
            ],
            "\n".to_string(),
        );
        program.remove_statement(1);
        assert_eq!(program.to_source(), "const a = 1;\n\nconst c = 3;\n");
    }
}
