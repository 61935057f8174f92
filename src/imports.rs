//! Import reconciliation: make sure the factory function is imported exactly
//! once, and strip type-only imports the canonical call makes redundant.

use crate::tree::{ImportDecl, Program, StatementKind};

/// Type-only bindings that become inferable once the config is produced by
/// the factory call.
pub const DISALLOWED_TYPE_IMPORTS: &[&str] = &["StorybookConfig", "Preview"];

fn is_storybook_source(source: &str) -> bool {
    source == "storybook" || source.starts_with("storybook/") || source.starts_with("@storybook/")
}

pub fn reconcile(program: &mut Program, method: &str, module_path: &str) {
    ensure_factory_import(program, method, module_path);
    strip_disallowed_type_imports(program);
}

/// Insert `import { <method> } from '<module_path>';` at the top of the file
/// unless an import from that exact module path already exists.
fn ensure_factory_import(program: &mut Program, method: &str, module_path: &str) {
    let exists = program
        .statements
        .iter()
        .any(|s| matches!(&s.kind, StatementKind::Import(import) if import.source == module_path));
    if !exists {
        program.insert_statement(
            0,
            StatementKind::Import(ImportDecl::named_value(method, module_path)),
        );
    }
}

/// Remove disallowed type-only bindings from storybook-namespace imports.
/// A statement emptied of bindings is dropped; otherwise it is kept with the
/// surviving bindings in their original order.
fn strip_disallowed_type_imports(program: &mut Program) {
    for stmt in &mut program.statements {
        if let StatementKind::Import(import) = &mut stmt.kind {
            if !is_storybook_source(&import.source) {
                continue;
            }
            let stmt_type_only = import.type_only;
            import.retain_named(|binding| {
                let type_binding = stmt_type_only || binding.type_only;
                !(type_binding && DISALLOWED_TYPE_IMPORTS.contains(&binding.imported.as_str()))
            });
        }
    }
    let mut idx = 0;
    while idx < program.statements.len() {
        let emptied = matches!(
            &program.statements[idx].kind,
            StatementKind::Import(import) if import.was_modified() && !import.has_bindings()
        );
        if emptied {
            program.remove_statement(idx);
        } else {
            idx += 1;
        }
    }
}
