//! Configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use stencil_value::DiagnosticPolicy;

/// Root configuration, read from `stencil.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StencilConfig {
    /// Template discovery and execution.
    pub templates: TemplatesConfig,
    /// Reporting of recoverable operation problems.
    pub diagnostics: DiagnosticPolicy,
}

/// Template discovery and execution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    /// Directory holding the templates. Logical names are relative to it.
    pub root: PathBuf,
    /// Extension of template files, including the leading dot.
    pub extension: String,
    /// Sub-directory names skipped when scanning for entry templates.
    pub exclude_dirs: Vec<String>,
    /// Recompile the entry template on every render.
    pub hot_reload: bool,
    /// HTML-escape interpolated values.
    pub escape_html: bool,
    /// Fail renders that reference missing variables.
    pub strict_variables: bool,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("templates"),
            extension: ".tmpl".to_string(),
            exclude_dirs: vec!["layouts".to_string(), "partials".to_string()],
            hot_reload: false,
            escape_html: false,
            strict_variables: false,
        }
    }
}

impl TemplatesConfig {
    /// Whether `file_name` carries the configured extension.
    pub fn matches_extension(&self, file_name: &str) -> bool {
        file_name.len() > self.extension.len() && file_name.ends_with(&self.extension)
    }

    /// Whether a directory with this name is skipped during scans.
    pub fn is_excluded(&self, dir_name: &str) -> bool {
        self.exclude_dirs.iter().any(|d| d == dir_name)
    }
}
