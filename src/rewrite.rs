//! Shape rewriting: merge a legacy export shape into the canonical
//! factory-function call.
//!
//! Mutation works by relocation: initializer expressions are taken out of
//! their declarators with `Option::take` and pushed into the canonical object
//! as-is, so their text (comments included) survives the rewrite byte for
//! byte. Statements that contributed an initializer are then pruned by name,
//! so removals never depend on statement indexes that earlier edits shifted.

use crate::classify::ExportShape;
use crate::tree::{
    DefaultObjectRef, ExportDefault, Expr, ObjectExpr, Program, Property, StatementKind,
};
use std::collections::HashSet;
use std::mem;

/// Apply the rewrite for a classified shape. `Unrecognized` is a no-op; the
/// engine never calls this for it.
pub fn apply(program: &mut Program, shape: ExportShape, method: &str) {
    match shape {
        ExportShape::Mixed => rewrite_mixed(program, method),
        ExportShape::DefaultOnly => rewrite_default_only(program, method),
        ExportShape::NamedOnly => rewrite_named_only(program, method),
        ExportShape::Unrecognized => {}
    }
}

fn rewrite_mixed(program: &mut Program, method: &str) {
    let properties = take_named_properties(program);
    let taken: HashSet<String> = properties.iter().map(|p| p.key.clone()).collect();
    install_canonical_default(program, method, properties);
    prune_named_exports(program, &taken);
}

fn rewrite_default_only(program: &mut Program, method: &str) {
    install_canonical_default(program, method, Vec::new());
}

fn rewrite_named_only(program: &mut Program, method: &str) {
    let properties = take_named_properties(program);
    let taken: HashSet<String> = properties.iter().map(|p| p.key.clone()).collect();
    prune_named_exports(program, &taken);

    let mut object = ObjectExpr::default();
    for property in properties {
        object.push_property(property);
    }
    let call = Expr::call(method, Expr::Object(object));
    program.push_statement(StatementKind::ExportDefault(ExportDefault::synthesized(
        call,
    )));
}

/// Relocate every named-export initializer into a property list, in
/// declaration order.
fn take_named_properties(program: &mut Program) -> Vec<Property> {
    let mut properties = Vec::new();
    for stmt in &mut program.statements {
        if let StatementKind::ExportNamed(decl) = &mut stmt.kind {
            for declarator in &mut decl.declarators {
                if let Some(name) = declarator.name.clone() {
                    if let Some(init) = declarator.init.take() {
                        properties.push(Property {
                            key: name,
                            value: init,
                        });
                    }
                }
            }
        }
    }
    program.export_decls.clear();
    properties
}

/// Drop the declarators whose initializers were merged; a statement survives
/// while it still has declarators left.
fn prune_named_exports(program: &mut Program, taken: &HashSet<String>) {
    for stmt in &mut program.statements {
        if let StatementKind::ExportNamed(decl) = &mut stmt.kind {
            decl.retain_declarators(|d| d.name.as_deref().map_or(true, |n| !taken.contains(n)));
        }
    }
    let mut idx = 0;
    while idx < program.statements.len() {
        let emptied = matches!(
            &program.statements[idx].kind,
            StatementKind::ExportNamed(decl) if decl.declarators.is_empty()
        );
        if emptied {
            program.remove_statement(idx);
        } else {
            idx += 1;
        }
    }
}

/// Detach the default-exported object (removing the intermediate variable
/// declaration in the via-variable form), append the merged properties, and
/// install the factory call as the default export's expression.
fn install_canonical_default(program: &mut Program, method: &str, properties: Vec<Property>) {
    let Some(target) = program.default_object.take() else {
        return;
    };

    let (export_stmt, mut object) = match target {
        DefaultObjectRef::Literal { stmt } => {
            let Some(object) = take_literal_object(program, stmt) else {
                return;
            };
            (stmt, object)
        }
        DefaultObjectRef::ViaVariable {
            export_stmt,
            decl_stmt,
            name,
        } => {
            let Some((object, stmt_removed)) = take_variable_object(program, decl_stmt, &name)
            else {
                return;
            };
            // removing the declaration shifts everything after it by one
            let export_stmt = if stmt_removed && decl_stmt < export_stmt {
                export_stmt - 1
            } else {
                export_stmt
            };
            (export_stmt, object)
        }
    };

    for property in properties {
        object.push_property(property);
    }

    if let StatementKind::ExportDefault(export) = &mut program.statements[export_stmt].kind {
        export.set_expr(Expr::call(method, Expr::Object(object)));
    }
}

fn take_literal_object(program: &mut Program, stmt: usize) -> Option<ObjectExpr> {
    let StatementKind::ExportDefault(export) = &mut program.statements[stmt].kind else {
        return None;
    };
    match mem::replace(&mut export.expr, Expr::Raw(String::new())) {
        Expr::Object(object) => Some(object),
        other => {
            export.expr = other;
            None
        }
    }
}

/// Take the object literal bound to `name` out of the variable declaration at
/// `stmt`, removing the declarator (and the statement itself once it holds no
/// declarators). Returns the object and whether the statement was removed.
fn take_variable_object(
    program: &mut Program,
    stmt: usize,
    name: &str,
) -> Option<(ObjectExpr, bool)> {
    let StatementKind::Var(decl) = &mut program.statements[stmt].kind else {
        return None;
    };
    let mut object = None;
    for declarator in &mut decl.declarators {
        if declarator.name.as_deref() == Some(name) {
            if let Some(Expr::Object(obj)) = declarator.init.take() {
                object = Some(obj);
            }
        }
    }
    let object = object?;
    decl.retain_declarators(|d| d.name.as_deref() != Some(name));
    let stmt_removed = decl.declarators.is_empty();
    if stmt_removed {
        program.remove_statement(stmt);
    }
    Some((object, stmt_removed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::parser::TreeSitterProvider;
    use crate::providers::TreeProvider;
    use std::path::PathBuf;

    fn rewrite(source: &str, method: &str) -> String {
        let mut program = TreeSitterProvider
            .parse(&PathBuf::from("main.ts"), source)
            .unwrap();
        let shape = classify(&program);
        assert_ne!(shape, ExportShape::Unrecognized);
        apply(&mut program, shape, method);
        program.to_source()
    }

    #[test]
    fn mixed_merges_named_exports_into_default_object() {
        let output = rewrite(
            "export const tags = [];\nexport default { parameters: {} };\n",
            "defineMain",
        );
        assert_eq!(
            output,
            "export default defineMain({ parameters: {}, tags: [] });\n"
        );
    }

    #[test]
    fn mixed_keeps_unrelated_declarators() {
        let output = rewrite(
            "export const tags = [], other = 1;\nexport default {};\n",
            "defineMain",
        );
        assert_eq!(
            output,
            "export const other = 1;\nexport default defineMain({ tags: [] });\n"
        );
    }

    #[test]
    fn default_only_literal_is_wrapped_in_place() {
        let output = rewrite("export default { framework: 'x' };\n", "defineMain");
        assert_eq!(output, "export default defineMain({ framework: 'x' });\n");
    }

    #[test]
    fn default_via_variable_inlines_the_object() {
        let output = rewrite(
            "const config = { framework: 'x' };\nexport default config;\n",
            "defineMain",
        );
        assert_eq!(output, "export default defineMain({ framework: 'x' });\n");
    }

    #[test]
    fn via_variable_keeps_sibling_declarators() {
        let output = rewrite(
            "const other = 1, config = { framework: 'x' };\nexport default config;\n",
            "defineMain",
        );
        assert_eq!(
            output,
            "const other = 1;\nexport default defineMain({ framework: 'x' });\n"
        );
    }

    #[test]
    fn named_only_builds_a_new_default_export() {
        let output = rewrite(
            "export const tags = ['a'];\nexport const framework = 'x';\n",
            "defineMain",
        );
        assert_eq!(
            output,
            "export default defineMain({ tags: ['a'], framework: 'x' });\n"
        );
    }

    #[test]
    fn named_only_appends_after_untouched_statements() {
        let output = rewrite(
            "import { join } from 'node:path';\nexport const framework = join('a', 'b');\n",
            "definePreview",
        );
        assert_eq!(
            output,
            "import { join } from 'node:path';\nexport default definePreview({ framework: join('a', 'b') });\n"
        );
    }

    #[test]
    fn value_expressions_move_verbatim() {
        let output = rewrite(
            "export const tags = [/* keep */ 'a',   'b'];\nexport default {};\n",
            "defineMain",
        );
        assert_eq!(
            output,
            "export default defineMain({ tags: [/* keep */ 'a',   'b'] });\n"
        );
    }

    #[test]
    fn default_object_with_trailing_line_comment_keeps_merged_properties() {
        let output = rewrite(
            "export const tags = ['a'];\nexport default {\n  parameters: {} // keep\n};\n",
            "defineMain",
        );
        assert_eq!(
            output,
            "export default defineMain({\n  parameters: {} // keep\n, tags: ['a']\n});\n"
        );
    }

    #[test]
    fn blank_lines_between_kept_statements_survive() {
        let output = rewrite(
            "const helper = 1; // counter\n\nexport default { parameters: {} };\n",
            "defineMain",
        );
        assert_eq!(
            output,
            "const helper = 1; // counter\n\nexport default defineMain({ parameters: {} });\n"
        );
    }
}
