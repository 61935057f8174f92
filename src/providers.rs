//! Collaborator seams.
//!
//! The parser, formatter and diagnostic sink are passed into the engine as
//! explicit dependencies rather than imported as singletons, so tests (and
//! embedders with their own toolchain) can substitute fakes.

use crate::parser::ParseError;
use crate::tree::Program;
use std::path::Path;

/// Parses text into a mutable tree and serializes it back.
pub trait TreeProvider {
    fn parse(&self, path: &Path, source: &str) -> Result<Program, ParseError>;
    fn serialize(&self, program: &Program) -> String;
}

/// Deterministic code formatting of the rewritten output. Failures propagate
/// to the caller; they indicate a downstream tooling problem, not a migration
/// problem.
pub trait Formatter {
    fn format(&self, path: &Path, text: String) -> anyhow::Result<String>;
}

/// Receives human-readable lines for parse-failure skips and dry-run
/// previews. Never fails.
pub trait DiagnosticSink {
    fn line(&mut self, message: &str);
}

/// Formatter that returns the text unchanged. Embedders hook their own
/// formatter (prettier, dprint, ...) through the [`Formatter`] trait instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughFormatter;

impl Formatter for PassthroughFormatter {
    fn format(&self, _path: &Path, text: String) -> anyhow::Result<String> {
        Ok(text)
    }
}

/// Sink forwarding every line to the `log` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn line(&mut self, message: &str) {
        log::info!("{message}");
    }
}

/// Sink collecting lines in memory, for tests and batch reporting.
#[derive(Debug, Default, Clone)]
pub struct CollectSink {
    lines: Vec<String>,
}

impl CollectSink {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl DiagnosticSink for CollectSink {
    fn line(&mut self, message: &str) {
        self.lines.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_sink_records_lines_in_order() {
        let mut sink = CollectSink::default();
        sink.line("first");
        sink.line("second");
        assert_eq!(sink.lines(), ["first", "second"]);
    }

    #[test]
    fn passthrough_formatter_is_identity() {
        let formatted = PassthroughFormatter
            .format(Path::new("main.ts"), "export default {};\n".to_string())
            .unwrap();
        assert_eq!(formatted, "export default {};\n");
    }
}
