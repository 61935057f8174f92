//! Export-shape classification.
//!
//! Detection is a total function over the parsed tree: every file maps to one
//! of the three legacy shapes or to `Unrecognized`, never to an error.

use crate::tree::Program;

/// The legacy export structure a config file uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportShape {
    /// A default-exported object coexists with named value exports.
    Mixed,
    /// The only relevant export is the default object, literal or bound
    /// through an intermediate variable.
    DefaultOnly,
    /// Only named value exports, no default export at all.
    NamedOnly,
    /// None of the above; the file must be left untouched.
    Unrecognized,
}

pub fn classify(program: &Program) -> ExportShape {
    let has_default_object = program.default_object.is_some();
    let has_named = !program.export_decls.is_empty();

    match (has_default_object, has_named) {
        (true, true) => ExportShape::Mixed,
        (true, false) => ExportShape::DefaultOnly,
        // A default export that did not resolve to an object (e.g. bound to a
        // call expression) blocks the named-only rewrite.
        (false, true) if !program.has_default_export => ExportShape::NamedOnly,
        _ => ExportShape::Unrecognized,
    }
}
