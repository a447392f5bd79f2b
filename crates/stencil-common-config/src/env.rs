//! Environment variable handling.

use std::env;
use std::path::PathBuf;
use thiserror::Error;

use crate::types::StencilConfig;

/// Environment variable errors.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("failed to load .env file: {0}")]
    DotenvError(#[from] dotenvy::Error),
}

/// Environment variable names.
pub mod vars {
    // Configuration
    pub const STENCIL_CONFIG: &str = "STENCIL_CONFIG";
    pub const STENCIL_ROOT: &str = "STENCIL_ROOT";
    pub const STENCIL_EXTENSION: &str = "STENCIL_EXTENSION";
    pub const STENCIL_HOT_RELOAD: &str = "STENCIL_HOT_RELOAD";
    pub const STENCIL_ESCAPE_HTML: &str = "STENCIL_ESCAPE_HTML";
    pub const STENCIL_STRICT: &str = "STENCIL_STRICT";

    // Logging
    pub const STENCIL_LOG_LEVEL: &str = "STENCIL_LOG_LEVEL";
    pub const STENCIL_LOG_FORMAT: &str = "STENCIL_LOG_FORMAT";
}

/// Environment configuration.
pub struct Environment {
    _guard: (),
}

impl Environment {
    /// Initialize environment from .env files.
    ///
    /// Missing files are skipped; unreadable or malformed ones are errors.
    pub fn init() -> Result<Self, EnvError> {
        // Variables that are already set are never replaced, so the
        // local file is loaded first to take precedence over `.env`.
        for file in [".env.local", ".env"] {
            match dotenvy::from_filename(file) {
                Ok(_) => {}
                Err(err) if err.not_found() => {}
                Err(err) => return Err(err.into()),
            }
        }

        Ok(Self { _guard: () })
    }

    /// Apply `STENCIL_*` overrides from the process environment.
    pub fn apply_overrides(config: &mut StencilConfig) -> Result<(), EnvError> {
        apply_overrides_from(config, |var| env::var(var).ok())
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

/// Apply `STENCIL_*` overrides using `lookup` to read variables.
pub fn apply_overrides_from(
    config: &mut StencilConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), EnvError> {
    let templates = &mut config.templates;

    if let Some(root) = lookup(vars::STENCIL_ROOT) {
        templates.root = PathBuf::from(root);
    }
    if let Some(extension) = lookup(vars::STENCIL_EXTENSION) {
        if !extension.starts_with('.') || extension.len() < 2 {
            return Err(EnvError::InvalidValue {
                var: vars::STENCIL_EXTENSION.to_string(),
                message: "expected an extension starting with '.'".to_string(),
            });
        }
        templates.extension = extension;
    }
    if let Some(v) = lookup(vars::STENCIL_HOT_RELOAD) {
        templates.hot_reload = parse_bool(&v);
    }
    if let Some(v) = lookup(vars::STENCIL_ESCAPE_HTML) {
        templates.escape_html = parse_bool(&v);
    }
    if let Some(v) = lookup(vars::STENCIL_STRICT) {
        templates.strict_variables = parse_bool(&v);
    }
    Ok(())
}
