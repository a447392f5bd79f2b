//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{ArgAction, Parser, Subcommand, ValueHint};
use stencil_common_config::{vars, ConfigLoader, Environment, StencilConfig};
use stencil_engine::Engine;

use crate::commands::{
    DepsCommand, ListCommand, OpsCommand, RenderCommand, VarsCommand, WatchCommand,
};
use crate::error::CliError;

/// Stencil - template bundles with composable value operations
///
/// Compiles entry templates together with everything they extend or
/// include, and renders them with declared defaults.
#[derive(Debug, Parser)]
#[command(
    name = "stencil",
    author,
    version,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase verbosity level"
    )]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Suppress non-error output"
    )]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(
        short,
        long,
        global = true,
        env = vars::STENCIL_CONFIG,
        value_hint = ValueHint::FilePath,
        help = "Path to configuration file"
    )]
    pub config: Option<PathBuf>,

    /// Template root, overriding the configuration
    #[arg(
        short,
        long,
        global = true,
        value_hint = ValueHint::DirPath,
        help = "Template root directory"
    )]
    pub root: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        value_enum,
        help = "Output format (text, json)"
    )]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render an entry template
    Render(RenderCommand),

    /// Show the resolved dependencies of a template file
    Deps(DepsCommand),

    /// Show the parameters a template renders with by default
    Vars(VarsCommand),

    /// List entry templates
    #[command(visible_alias = "ls")]
    List(ListCommand),

    /// List available operations
    Ops(OpsCommand),

    /// Recompile templates as they change
    Watch(WatchCommand),
}

impl Cli {
    /// Load configuration from file or the current directory, then apply
    /// environment and command line overrides.
    pub fn load_config(&self) -> Result<StencilConfig, CliError> {
        Environment::init()?;

        let mut config = match &self.config {
            Some(path) => {
                let project_dir = path
                    .parent()
                    .unwrap_or_else(|| std::path::Path::new("."));
                ConfigLoader::new(project_dir).load_file(path)?
            }
            None => ConfigLoader::default().load()?,
        };

        Environment::apply_overrides(&mut config)?;
        if let Some(root) = &self.root {
            config.templates.root = root.clone();
        }
        Ok(config)
    }

    /// Execute the selected command
    pub fn execute(self, config: StencilConfig) -> Result<(), CliError> {
        let ctx = CommandContext {
            engine: Arc::new(Engine::new(config)?),
            format: self.format,
            quiet: self.quiet,
        };

        match self.command {
            Command::Render(cmd) => cmd.execute(&ctx),
            Command::Deps(cmd) => cmd.execute(&ctx),
            Command::Vars(cmd) => cmd.execute(&ctx),
            Command::List(cmd) => cmd.execute(&ctx),
            Command::Ops(cmd) => cmd.execute(&ctx),
            Command::Watch(cmd) => cmd.execute(&ctx),
        }
    }
}

/// Context passed to all commands
#[derive(Debug)]
pub struct CommandContext {
    pub engine: Arc<Engine>,
    pub format: OutputFormat,
    pub quiet: bool,
}

/// Parse a `key=value` assignment.
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got `{s}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("title=Hello=World").unwrap(),
            ("title".to_string(), "Hello=World".to_string())
        );
        assert_eq!(parse_assignment("empty=").unwrap(), ("empty".to_string(), String::new()));
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=x").is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "stencil", "list", "--root", "site", "-vv", "--format", "json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.root, Some(PathBuf::from("site")));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Command::List(_)));
    }

    #[test]
    fn test_render_arguments() {
        let cli = Cli::try_parse_from([
            "stencil",
            "render",
            "page.tmpl",
            "--set",
            "title=Home",
            "--set",
            "n=3",
            "-o",
            "out.html",
        ])
        .unwrap();
        match cli.command {
            Command::Render(cmd) => {
                assert_eq!(cmd.name, "page.tmpl");
                assert_eq!(cmd.set.len(), 2);
                assert_eq!(cmd.output, Some(PathBuf::from("out.html")));
            }
            other => panic!("expected render, got {other:?}"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["stencil", "-q", "-v", "list"]).is_err());
    }
}
