//! Ops command implementation.

use clap::Parser;
use serde::Serialize;
use stencil_value::Operation;

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput};

/// List available operations
#[derive(Debug, Parser)]
pub struct OpsCommand {}

#[derive(Debug, Serialize)]
struct OperationInfo {
    name: String,
    arity: String,
    description: String,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
struct Operations(Vec<OperationInfo>);

impl FormattedOutput for Operations {
    fn format_text(&self) -> String {
        let width = self.0.iter().map(|o| o.name.len()).max().unwrap_or(0);
        self.0
            .iter()
            .map(|o| format!("{:width$}  {:>6}  {}", o.name, o.arity, o.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OpsCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let operations = ctx
            .engine
            .operations()
            .operations()
            .map(|op| OperationInfo {
                name: op.name().to_string(),
                arity: op.arity().to_string(),
                description: op.description().to_string(),
            })
            .collect();
        print_output(ctx, &Operations(operations))
    }
}
