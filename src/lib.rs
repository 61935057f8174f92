//! csfmod migrates Storybook `main`/`preview` config files from the legacy
//! export shapes to a single CSF factory call (`defineMain` / `definePreview`),
//! preserving every property's value expression verbatim.

pub mod batch;
pub mod classify;
pub mod config;
pub mod imports;
pub mod migrate;
pub mod parser;
pub mod providers;
pub mod rewrite;
pub mod tree;

// Re-export commonly used types
pub use crate::batch::{migrate_files, MigrationOutcome};
pub use crate::classify::{classify, ExportShape};
pub use crate::config::{ConfigKind, FileInfo, MigrateOptions, MigrationConfig};
pub use crate::migrate::Migrator;
pub use crate::parser::{detect_variant, JsVariant, ParseError, TreeSitterProvider};
pub use crate::providers::{
    CollectSink, DiagnosticSink, Formatter, LogSink, PassthroughFormatter, TreeProvider,
};
