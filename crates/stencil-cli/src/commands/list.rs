//! List command implementation.

use clap::Parser;
use serde::Serialize;
use stencil_engine::EngineError;
use tracing::warn;

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput};

/// List entry templates
#[derive(Debug, Parser)]
pub struct ListCommand {
    /// Include each template's dependencies
    #[arg(short, long)]
    pub long: bool,
}

#[derive(Debug, Serialize)]
struct Entry {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    dependencies: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
struct Entries(Vec<Entry>);

impl FormattedOutput for Entries {
    fn format_text(&self) -> String {
        self.0
            .iter()
            .map(|e| match &e.dependencies {
                Some(deps) if !deps.is_empty() => format!("{} <- {}", e.name, deps.join(", ")),
                _ => e.name.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl ListCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        match ctx.engine.parse() {
            Ok(()) => {}
            Err(err @ (EngineError::Walk(_) | EngineError::Lock)) => {
                return Err(err.into());
            }
            Err(err) => warn!(error = %err, "some templates failed to compile"),
        }

        let mut entries = Vec::new();
        for name in ctx.engine.bundle_names()? {
            let dependencies = if self.long {
                Some(ctx.engine.descendants(&name)?)
            } else {
                None
            };
            entries.push(Entry { name, dependencies });
        }
        print_output(ctx, &Entries(entries))
    }
}
