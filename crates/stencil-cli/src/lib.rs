//! Stencil CLI library
//!
//! Argument parsing, commands and error handling behind the `stencil`
//! binary.

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use error::CliError;
