//! Engine error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while scanning, compiling or rendering templates.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A template file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal failed.
    #[error("failed to scan template root: {0}")]
    Walk(#[from] walkdir::Error),

    /// An `extends`, `template` or `var` directive is malformed.
    #[error("malformed directive in {file}: {message}")]
    Directive { file: String, message: String },

    /// The executor rejected a template.
    #[error("template error: {0}")]
    Executor(#[from] handlebars::TemplateError),

    /// The executor failed while rendering.
    #[error("render error: {0}")]
    Render(#[from] handlebars::RenderError),

    /// A path resolved outside the template root.
    #[error("{path} is not under template root {root}")]
    PathOutsideRoot { path: PathBuf, root: PathBuf },

    /// No entry template with this logical name exists.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// Templates include each other in a loop.
    #[error("dependency cycle: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),

    /// The engine state lock was poisoned by a panicking thread.
    #[error("engine state lock poisoned")]
    Lock,

    /// The file watcher could not be started.
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn directive(file: &str, message: impl Into<String>) -> Self {
        Self::Directive {
            file: file.to_string(),
            message: message.into(),
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
