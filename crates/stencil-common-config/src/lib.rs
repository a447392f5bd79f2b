//! Configuration types for stencil.
//!
//! This crate provides the configuration used by the template engine,
//! read from a `stencil.yaml` file and overridable through `STENCIL_*`
//! environment variables.

pub mod env;
pub mod loader;
pub mod types;

pub use env::*;
pub use loader::*;
pub use types::*;
