//! Parallel migration over many files.
//!
//! Every invocation owns its tree exclusively, so files are processed with
//! rayon workers and no coordination. A failure in one file never aborts the
//! rest: it becomes an outcome carrying the original text and a diagnostic.

use crate::config::{FileInfo, MigrateOptions};
use crate::migrate::Migrator;
use crate::providers::{CollectSink, DiagnosticSink, Formatter, TreeProvider};
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;

/// Result of migrating a single file.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationOutcome {
    pub path: PathBuf,
    /// Text the caller should write back (the original text when unmodified).
    pub text: String,
    pub modified: bool,
    /// Diagnostic lines emitted while migrating this file.
    pub diagnostics: Vec<String>,
}

pub fn migrate_files<P, F>(
    migrator: &Migrator<P, F>,
    files: &[FileInfo],
    options: &MigrateOptions,
) -> Vec<MigrationOutcome>
where
    P: TreeProvider + Sync,
    F: Formatter + Sync,
{
    files
        .par_iter()
        .map(|info| {
            let mut sink = CollectSink::default();
            match migrator.migrate(info, options, &mut sink) {
                Ok(text) => MigrationOutcome {
                    path: info.path.clone(),
                    modified: text != info.source,
                    text,
                    diagnostics: sink.into_lines(),
                },
                Err(err) => {
                    sink.line(&format!(
                        "Failed to migrate {}: {:#}",
                        info.path.display(),
                        err
                    ));
                    MigrationOutcome {
                        path: info.path.clone(),
                        text: info.source.clone(),
                        modified: false,
                        diagnostics: sink.into_lines(),
                    }
                }
            }
        })
        .collect()
}
