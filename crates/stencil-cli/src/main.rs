//! Stencil CLI
//!
//! Main entry point for the `stencil` binary.

use std::process::ExitCode;

use clap::Parser;
use stencil_cli::cli::Cli;
use stencil_cli::CliError;
use stencil_common_config::vars;
use stencil_common_log::{spans, LogConfig, LogLevel};
use tracing::error;

/// Application exit codes
#[repr(u8)]
pub enum Exit {
    Success = 0,
    GeneralError = 1,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("error: {e}");
        return Exit::GeneralError.into();
    }

    match run(cli) {
        Ok(()) => Exit::Success.into(),
        Err(e) => {
            error!("{e}");
            if let Some(hint) = e.hint() {
                eprintln!("hint: {hint}");
            }
            e.exit_code()
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let _span = spans::command_span(command_name(&cli)).entered();
    let result = cli.load_config().and_then(|config| cli.execute(config));
    if let Err(e) = &result {
        spans::record_error(e);
    }
    result
}

fn command_name(cli: &Cli) -> &'static str {
    use stencil_cli::cli::Command;
    match cli.command {
        Command::Render(_) => "render",
        Command::Deps(_) => "deps",
        Command::Vars(_) => "vars",
        Command::List(_) => "list",
        Command::Ops(_) => "ops",
        Command::Watch(_) => "watch",
    }
}

fn init_logging(cli: &Cli) -> Result<(), stencil_common_log::LogError> {
    let mut config = LogConfig::from_env();
    // Flags win over STENCIL_LOG_LEVEL; without either, only warnings show.
    if cli.verbose > 0 || cli.quiet || std::env::var_os(vars::STENCIL_LOG_LEVEL).is_none() {
        config.level = LogLevel::from_verbosity(cli.verbose, cli.quiet);
    }
    if std::env::var_os(vars::STENCIL_LOG_FORMAT).is_none() {
        config.format = stencil_common_log::LogFormat::Compact;
    }
    stencil_common_log::init(config)
}
