//! CLI error type and exit code mapping.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use stencil_common_config::{ConfigError, EnvError};
use stencil_engine::EngineError;
use thiserror::Error;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("{message}")]
    Io {
        message: String,
        #[source]
        source: io::Error,
        path: Option<PathBuf>,
    },

    #[error(transparent)]
    Template(#[from] EngineError),

    #[error("{message}")]
    User { message: String, hint: Option<String> },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        let code = match self {
            Self::Config { .. } => 2,
            Self::Io { .. } => 3,
            Self::Template(EngineError::Io { .. } | EngineError::Walk(_)) => 3,
            Self::Template(_) => 5,
            Self::User { .. } => 1,
        };
        ExitCode::from(code)
    }

    /// Get hint for this error if available
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::User { hint, .. } => hint.as_deref(),
            Self::Template(EngineError::TemplateNotFound(_)) => {
                Some("run `stencil list` to see the templates that can be rendered")
            }
            _ => None,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create an IO error with path
    pub fn io_with_path(
        message: impl Into<String>,
        source: io::Error,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source,
            path: Some(path.into()),
        }
    }

    /// Create a user error (user did something wrong)
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
            hint: None,
        }
    }

    /// Create a user error with hint
    pub fn user_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: err,
            path: None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<EnvError> for CliError {
    fn from(err: EnvError) -> Self {
        Self::Config {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::user(format!("invalid JSON: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::user("x").exit_code(), ExitCode::from(1));
        assert_eq!(CliError::config("x").exit_code(), ExitCode::from(2));
        let io = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert_eq!(CliError::from(io).exit_code(), ExitCode::from(3));
        assert_eq!(
            CliError::from(EngineError::TemplateNotFound("a.tmpl".into())).exit_code(),
            ExitCode::from(5)
        );
        assert_eq!(
            CliError::from(EngineError::DependencyCycle(vec!["a".into(), "a".into()])).exit_code(),
            ExitCode::from(5)
        );
    }

    #[test]
    fn test_hints() {
        let err = CliError::from(EngineError::TemplateNotFound("a.tmpl".into()));
        assert!(err.hint().unwrap().contains("stencil list"));
        assert_eq!(CliError::user_with_hint("bad", "try this").hint(), Some("try this"));
        assert!(CliError::config("x").hint().is_none());
    }

    #[test]
    fn test_config_error_conversion() {
        let err = CliError::from(ConfigError::ValidationError {
            message: "bad extension".into(),
        });
        assert!(matches!(err, CliError::Config { .. }));
        assert!(err.to_string().contains("bad extension"));
    }
}
