//! Error types for value conversion and operation dispatch.

use crate::value::Kind;
use thiserror::Error;

/// A value could not be converted to the requested type.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConversionError {
    #[error("cannot convert {from} to {to}")]
    Unsupported { from: Kind, to: &'static str },

    #[error("text {text:?} is not numeric")]
    NotNumeric { text: String },
}

/// Errors that abort an operation call instead of degrading it.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OperationError {
    /// No operation registered under this name.
    #[error("unknown operation: {name}")]
    Unknown { name: String },

    /// Wrong number of arguments.
    #[error("{operation} expects {expected} argument(s), got {actual}")]
    Arity {
        operation: String,
        expected: String,
        actual: usize,
    },

    /// A recoverable diagnostic was raised while the policy asks to halt.
    #[error("{operation}: {message}")]
    Halted { operation: String, message: String },
}

/// Result type for operation calls.
pub type Result<T> = std::result::Result<T, OperationError>;
