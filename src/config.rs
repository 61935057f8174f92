//! Invocation configuration: which factory to migrate toward and how the
//! output should be produced.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which config file is being migrated. Selects the factory-function name and
/// the module-path suffix it is imported from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigKind {
    Main,
    Preview,
}

impl ConfigKind {
    pub fn method_name(self) -> &'static str {
        match self {
            ConfigKind::Main => "defineMain",
            ConfigKind::Preview => "definePreview",
        }
    }

    pub fn module_suffix(self) -> &'static str {
        match self {
            ConfigKind::Main => "node",
            ConfigKind::Preview => "browser",
        }
    }
}

/// Migration target: the config kind plus the framework package that exports
/// the factory functions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationConfig {
    pub kind: ConfigKind,
    pub framework_package: String,
}

impl MigrationConfig {
    pub fn new(kind: ConfigKind, framework_package: impl Into<String>) -> Self {
        Self {
            kind,
            framework_package: framework_package.into(),
        }
    }

    /// Module path the factory function must be imported from.
    pub fn module_path(&self) -> String {
        format!("{}/{}", self.framework_package, self.kind.module_suffix())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrateOptions {
    /// Report the would-be output and return the original text unchanged.
    pub dry_run: bool,
    /// Return the raw serialized text without running the formatter.
    pub skip_formatting: bool,
}

/// One input file: a path identifier and its original text. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub path: PathBuf,
    pub source: String,
}

impl FileInfo {
    pub fn new(path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_path_uses_the_kind_suffix() {
        let main = MigrationConfig::new(ConfigKind::Main, "@storybook/react-vite");
        assert_eq!(main.module_path(), "@storybook/react-vite/node");

        let preview = MigrationConfig::new(ConfigKind::Preview, "@storybook/react-vite");
        assert_eq!(preview.module_path(), "@storybook/react-vite/browser");
    }

    #[test]
    fn options_default_to_a_real_formatted_run() {
        let options = MigrateOptions::default();
        assert!(!options.dry_run);
        assert!(!options.skip_formatting);
    }
}
