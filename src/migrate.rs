//! The migration engine: classify, rewrite, reconcile imports, then decide
//! what text to hand back.
//!
//! Control flow mirrors the output policy exactly: a parse failure is logged
//! and skips the file; an unrecognized shape leaves the file byte-identical;
//! a dry run reports the would-be output and still returns the original text;
//! otherwise the serialized tree is returned raw or formatted.

use crate::classify::{classify, ExportShape};
use crate::config::{FileInfo, MigrateOptions, MigrationConfig};
use crate::imports;
use crate::parser::TreeSitterProvider;
use crate::providers::{DiagnosticSink, Formatter, PassthroughFormatter, TreeProvider};
use crate::rewrite;
use anyhow::Result;
use colored::Colorize;

pub struct Migrator<P = TreeSitterProvider, F = PassthroughFormatter> {
    provider: P,
    formatter: F,
    config: MigrationConfig,
}

impl Migrator {
    /// Engine with the built-in tree-sitter provider and no formatting.
    pub fn new(config: MigrationConfig) -> Self {
        Self::with_collaborators(config, TreeSitterProvider, PassthroughFormatter)
    }
}

impl<P: TreeProvider, F: Formatter> Migrator<P, F> {
    pub fn with_collaborators(config: MigrationConfig, provider: P, formatter: F) -> Self {
        Self {
            provider,
            formatter,
            config,
        }
    }

    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Migrate one file. Returns the text the caller should write back; the
    /// original text comes back unchanged when the file is skipped (parse
    /// failure, unrecognized shape, dry run).
    pub fn migrate(
        &self,
        info: &FileInfo,
        options: &MigrateOptions,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<String> {
        let mut program = match self.provider.parse(&info.path, &info.source) {
            Ok(program) => program,
            Err(err) => {
                sink.line(&format!(
                    "Error when parsing {}, skipping:\n{}",
                    info.path.display(),
                    err
                ));
                return Ok(info.source.clone());
            }
        };

        let shape = classify(&program);
        if shape == ExportShape::Unrecognized {
            return Ok(info.source.clone());
        }

        let method = self.config.kind.method_name();
        rewrite::apply(&mut program, shape, method);
        imports::reconcile(&mut program, method, &self.config.module_path());

        let output = self.provider.serialize(&program);

        if options.dry_run {
            sink.line(&format!(
                "Would write to {}:\n{}",
                info.path.display().to_string().yellow(),
                output.green()
            ));
            return Ok(info.source.clone());
        }

        if options.skip_formatting {
            return Ok(output);
        }
        self.formatter.format(&info.path, output)
    }
}
