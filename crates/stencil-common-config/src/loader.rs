//! Configuration file loading and parsing.

use crate::types::StencilConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the project directory.
pub const CONFIG_FILE: &str = "stencil.yaml";

static ENV_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").expect("valid regex"));

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error(
        "invalid YAML at line {}: {message}",
        line.map_or_else(|| "unknown".to_string(), |l| l.to_string())
    )]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },
}

/// Configuration loader.
pub struct ConfigLoader {
    base_path: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for the given project directory.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            base_path: project_dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the configuration file this loader reads.
    pub fn config_path(&self) -> PathBuf {
        self.base_path.join(CONFIG_FILE)
    }

    /// Load `stencil.yaml`, falling back to defaults when it is absent.
    ///
    /// A relative `templates.root` is resolved against the project directory.
    pub fn load(&self) -> Result<StencilConfig, ConfigError> {
        let config_path = self.config_path();
        if !config_path.exists() {
            let mut config = StencilConfig::default();
            self.resolve_root(&mut config);
            return Ok(config);
        }
        self.load_file(&config_path)
    }

    /// Load an explicit configuration file.
    pub fn load_file(&self, path: &Path) -> Result<StencilConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let expanded = expand_env_vars(&contents)?;

        let mut config: StencilConfig =
            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        validate(&config)?;
        self.resolve_root(&mut config);
        Ok(config)
    }

    fn resolve_root(&self, config: &mut StencilConfig) {
        if config.templates.root.is_relative() {
            config.templates.root = self.base_path.join(&config.templates.root);
        }
    }

    /// Save configuration to `stencil.yaml`.
    pub fn save(&self, config: &StencilConfig) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.base_path)?;

        let yaml = serde_yaml::to_string(config).map_err(|e| ConfigError::ParseError {
            line: None,
            message: e.to_string(),
        })?;

        std::fs::write(self.config_path(), yaml)?;
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }
}

/// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
pub fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
    let mut result = content.to_string();

    for cap in ENV_VAR.captures_iter(content) {
        let full_match = &cap[0];
        let var_name = &cap[1];
        let default = cap.get(2).map(|m| m.as_str());

        let value = match std::env::var(var_name) {
            Ok(v) => v,
            Err(_) => match default {
                Some(d) => d.to_string(),
                None => {
                    return Err(ConfigError::EnvVarNotFound {
                        var: var_name.to_string(),
                    })
                }
            },
        };

        result = result.replace(full_match, &value);
    }

    Ok(result)
}

/// Validate configuration values.
pub fn validate(config: &StencilConfig) -> Result<(), ConfigError> {
    let extension = &config.templates.extension;
    if !extension.starts_with('.') || extension.len() < 2 {
        return Err(ConfigError::ValidationError {
            message: format!("templates.extension must start with '.', got {extension:?}"),
        });
    }

    if let Some(dir) = config
        .templates
        .exclude_dirs
        .iter()
        .find(|d| d.is_empty() || d.contains(['/', '\\']))
    {
        return Err(ConfigError::ValidationError {
            message: format!(
                "templates.exclude_dirs entries must be plain directory names, got {dir:?}"
            ),
        });
    }

    Ok(())
}
