//! Runtime values and polymorphic operations for stencil templates.
//!
//! This crate provides the closed [`Value`] model, numeric and text
//! coercions, the shared container traversal used by every operation, and the
//! built-in [`OperationRegistry`].

pub mod coerce;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod json;
pub mod ops;
pub mod value;

pub use coerce::{loose_compatible, round_half_away, strict_compatible};
pub use diagnostics::{Diagnostic, DiagnosticPolicy, Diagnostics, Severity};
pub use dispatch::{apply, Leaf, ScalarOp};
pub use error::{ConversionError, OperationError, Result};
pub use ops::{Arity, FnOperation, Invocation, Operation, OperationRegistry};
pub use value::{Field, FloatWidth, IntWidth, Key, Kind, Mapping, Record, Sequence, Value};
