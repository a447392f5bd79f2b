//! Render command implementation.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueHint};
use serde_json::Value as Json;
use stencil_common_log::spans;
use stencil_engine::{parse_literal, Params};
use stencil_value::Value;
use tracing::info;

use crate::cli::{parse_assignment, CommandContext};
use crate::error::CliError;

/// Render an entry template
#[derive(Debug, Parser)]
pub struct RenderCommand {
    /// Logical name of the entry template, e.g. `blog/post.tmpl`
    pub name: String,

    /// JSON or YAML file with render parameters
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub data: Option<PathBuf>,

    /// Set a parameter; the value uses the `var` literal syntax
    #[arg(short, long, value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,

    /// Write output to a file instead of stdout
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

impl RenderCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let _span = spans::template_span("render", &self.name).entered();

        let mut params = match &self.data {
            Some(path) => load_params(path)?,
            None => Params::new(),
        };
        for (key, literal) in &self.set {
            params.insert(key.clone(), parse_literal(literal));
        }

        let output = stencil_common_log::timed!("render", ctx.engine.render(&self.name, &params))?;

        match &self.output {
            Some(path) => {
                std::fs::write(path, &output).map_err(|e| {
                    CliError::io_with_path(format!("failed to write {}", path.display()), e, path)
                })?;
                info!(path = %path.display(), bytes = output.len(), "wrote rendered output");
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(&output)?;
                stdout.flush()?;
            }
        }
        Ok(())
    }
}

/// Read render parameters from a JSON or YAML object.
pub fn load_params(path: &Path) -> Result<Params, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        CliError::io_with_path(format!("failed to read {}", path.display()), e, path)
    })?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    );
    let data: Json = if is_yaml {
        serde_yaml::from_str(&text)
            .map_err(|e| CliError::user(format!("invalid YAML in {}: {e}", path.display())))?
    } else {
        serde_json::from_str(&text)?
    };

    match data {
        Json::Object(fields) => Ok(fields
            .into_iter()
            .map(|(key, value)| (key, Value::from(value)))
            .collect()),
        Json::Null => Ok(Params::new()),
        other => Err(CliError::user_with_hint(
            format!("{} must hold an object, got {other}", path.display()),
            "wrap the values in a top-level mapping of parameter names",
        )),
    }
}
