//! Vars command implementation.

use std::collections::BTreeMap;

use clap::Parser;
use serde::Serialize;
use serde_json::Value as Json;
use stencil_engine::{from_logical_name, EngineError, Params};

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput};

/// Show the parameters a template renders with by default
#[derive(Debug, Parser)]
pub struct VarsCommand {
    /// Logical name of the entry template
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
struct Variables(BTreeMap<String, Json>);

impl FormattedOutput for Variables {
    fn format_text(&self) -> String {
        if self.0.is_empty() {
            return "no declared variables".to_string();
        }
        self.0
            .iter()
            .map(|(name, value)| format!("{name} = {value}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl VarsCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let path = from_logical_name(&self.name, ctx.engine.root());
        if !ctx.engine.is_entry(&path) || !path.is_file() {
            return Err(EngineError::TemplateNotFound(self.name.clone()).into());
        }
        ctx.engine.parse_file(&path)?;
        let params = ctx.engine.effective_params(&self.name, &Params::new())?;

        print_output(
            ctx,
            &Variables(params.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()),
        )
    }
}
