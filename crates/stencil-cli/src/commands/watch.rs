//! Watch command implementation.

use std::sync::Arc;

use clap::Parser;
use stencil_engine::TemplateWatcher;
use tracing::{info, warn};

use crate::cli::CommandContext;
use crate::error::CliError;

/// Recompile templates as they change
#[derive(Debug, Parser)]
pub struct WatchCommand {}

impl WatchCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        if let Err(err) = ctx.engine.parse() {
            warn!(error = %err, "some templates failed to compile");
        }
        let watcher = TemplateWatcher::new(Arc::clone(&ctx.engine))?;
        info!(root = %ctx.engine.root().display(), "watching templates");

        while let Some(event) = watcher.next_event() {
            if ctx.quiet {
                continue;
            }
            if event.rebuilt.is_empty() {
                println!("{:?} {}", event.kind, event.name);
            } else {
                println!("{:?} {} -> rebuilt {}", event.kind, event.name, event.rebuilt.join(", "));
            }
        }
        Ok(())
    }
}
