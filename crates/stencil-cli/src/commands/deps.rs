//! Deps command implementation.

use std::path::PathBuf;

use clap::{Parser, ValueHint};
use serde::Serialize;
use stencil_engine::{to_logical_name, DependencyGraphBuilder};

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput};

/// Show the resolved dependencies of a template file
#[derive(Debug, Parser)]
pub struct DepsCommand {
    /// Template file, absolute or relative to the template root
    #[arg(value_hint = ValueHint::FilePath)]
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
struct Dependencies {
    template: String,
    dependencies: Vec<String>,
}

impl FormattedOutput for Dependencies {
    fn format_text(&self) -> String {
        if self.dependencies.is_empty() {
            return format!("{}: no dependencies", self.template);
        }
        let mut out = format!("{}:", self.template);
        for (i, dep) in self.dependencies.iter().enumerate() {
            out.push_str(&format!("\n  {}. {dep}", i + 1));
        }
        out
    }
}

impl DepsCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let root = ctx.engine.root();
        let path = if self.file.is_absolute() {
            self.file.clone()
        } else {
            root.join(&self.file)
        };
        let template = to_logical_name(&path, root)?;

        let dependencies = DependencyGraphBuilder::new(root)
            .resolve(&path)?
            .iter()
            .map(|p| to_logical_name(p, root))
            .collect::<Result<Vec<_>, _>>()?;

        print_output(ctx, &Dependencies {
            template,
            dependencies,
        })
    }
}
