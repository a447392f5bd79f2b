//! Type-directed application of operations over arbitrary values.
//!
//! An operation only describes what it does to the kinds it handles directly
//! (usually text or numbers). [`apply`] supplies the shared traversal: it
//! unwraps dynamic slots, recurses into sequences, mappings and public record
//! fields, and rebuilds a container of the same shape around the results.

use crate::diagnostics::Diagnostics;
use crate::value::{Kind, Value};

/// A leaf transformation that [`apply`] can lift over containers.
pub trait ScalarOp {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Whether values of `kind` are handled by [`ScalarOp::apply_scalar`].
    fn handles(&self, kind: Kind) -> bool;

    /// Transform one value of a handled kind.
    fn apply_scalar(&self, value: &Value, diagnostics: &mut Diagnostics) -> Value;

    /// Fallback for leaves that are neither handled nor traversable.
    fn unsupported(&self, value: &Value, diagnostics: &mut Diagnostics) -> Value {
        diagnostics.warn(
            self.name(),
            format!("cannot apply to {} value", value.kind()),
        );
        value.clone()
    }
}

/// Apply `op` to `value`, recursing through containers.
pub fn apply(op: &dyn ScalarOp, value: &Value, diagnostics: &mut Diagnostics) -> Value {
    let value = value.resolve();
    let kind = value.kind();
    if op.handles(kind) {
        return op.apply_scalar(value, diagnostics);
    }
    match value {
        Value::Sequence(seq) => Value::Sequence(seq.map(|item| apply(op, item, diagnostics))),
        Value::Mapping(map) => Value::Mapping(
            map.iter()
                .map(|(k, v)| (k.clone(), apply(op, v, diagnostics)))
                .collect(),
        ),
        Value::Record(rec) => Value::Record(rec.map_public(|v| apply(op, v, diagnostics))),
        Value::Null | Value::Any(_) => Value::Null,
        _ => op.unsupported(value, diagnostics),
    }
}

/// A [`ScalarOp`] built from a closure.
///
/// Extra operands are captured by the closure, so they stay constant across
/// every level of the recursion.
pub struct Leaf<F> {
    name: String,
    kinds: &'static [Kind],
    f: F,
}

impl<F> Leaf<F>
where
    F: Fn(&Value, &mut Diagnostics) -> Value,
{
    /// Create a leaf operation handling `kinds`.
    pub fn new(name: impl Into<String>, kinds: &'static [Kind], f: F) -> Self {
        Self {
            name: name.into(),
            kinds,
            f,
        }
    }
}

impl<F> ScalarOp for Leaf<F>
where
    F: Fn(&Value, &mut Diagnostics) -> Value,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn handles(&self, kind: Kind) -> bool {
        self.kinds.contains(&kind)
    }

    fn apply_scalar(&self, value: &Value, diagnostics: &mut Diagnostics) -> Value {
        (self.f)(value, diagnostics)
    }
}

/// Kinds handled by numeric leaves.
pub const NUMERIC: &[Kind] = &[Kind::Int, Kind::Float];
/// Kinds handled by text leaves.
pub const TEXT: &[Kind] = &[Kind::Text];
/// Scalars with a text representation.
pub const SCALAR: &[Kind] = &[Kind::Int, Kind::Float, Kind::Bool, Kind::Text];
