//! Named operations callable from templates.
//!
//! Every operation takes its extra operands first and the target last, so
//! `{{add 5 items}}` calls `add` with `[5, items]`. Argument counts are
//! checked before the call; bad values are reported through [`Diagnostics`].

pub mod arith;
pub mod collection;
pub mod text;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::diagnostics::{DiagnosticPolicy, Diagnostics};
use crate::error::{OperationError, Result};
use crate::value::Value;

/// Accepted argument counts, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    pub max: usize,
}

impl Arity {
    pub const fn exact(n: usize) -> Self {
        Self { min: n, max: n }
    }

    pub const fn range(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn accepts(&self, n: usize) -> bool {
        (self.min..=self.max).contains(&n)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{} to {}", self.min, self.max)
        }
    }
}

/// A named operation over values.
pub trait Operation: Send + Sync {
    fn name(&self) -> &str;

    fn arity(&self) -> Arity;

    /// One-line description for listings.
    fn description(&self) -> &str {
        ""
    }

    /// Run the operation. `args` has already been checked against
    /// [`Operation::arity`].
    fn call(&self, args: &[Value], diagnostics: &mut Diagnostics) -> Value;
}

type CallFn = fn(&[Value], &mut Diagnostics) -> Value;

/// An [`Operation`] backed by a plain function.
pub struct FnOperation {
    name: &'static str,
    arity: Arity,
    description: &'static str,
    call: CallFn,
}

impl FnOperation {
    pub const fn new(
        name: &'static str,
        arity: Arity,
        description: &'static str,
        call: CallFn,
    ) -> Self {
        Self {
            name,
            arity,
            description,
            call,
        }
    }
}

impl Operation for FnOperation {
    fn name(&self) -> &str {
        self.name
    }

    fn arity(&self) -> Arity {
        self.arity
    }

    fn description(&self) -> &str {
        self.description
    }

    fn call(&self, args: &[Value], diagnostics: &mut Diagnostics) -> Value {
        (self.call)(args, diagnostics)
    }
}

/// Outcome of a successful [`OperationRegistry::invoke`].
#[derive(Debug)]
pub struct Invocation {
    pub value: Value,
    pub diagnostics: Diagnostics,
}

/// Operations addressable by name.
#[derive(Clone, Default)]
pub struct OperationRegistry {
    operations: BTreeMap<String, Arc<dyn Operation>>,
}

impl fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("operations", &self.operations.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl OperationRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in operation.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for op in BUILTINS {
            registry.register(Arc::new(FnOperation::new(
                op.name,
                op.arity,
                op.description,
                op.call,
            )));
        }
        registry
    }

    /// Add or replace an operation.
    pub fn register(&mut self, operation: Arc<dyn Operation>) {
        self.operations
            .insert(operation.name().to_string(), operation);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Operation>> {
        self.operations.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    pub fn operations(&self) -> impl Iterator<Item = &Arc<dyn Operation>> {
        self.operations.values()
    }

    /// Look up, arity-check and run an operation.
    ///
    /// Diagnostics raised by the call are returned alongside the value unless
    /// `policy` asks for one of them to halt, in which case the call fails.
    pub fn invoke(
        &self,
        name: &str,
        args: &[Value],
        policy: DiagnosticPolicy,
    ) -> Result<Invocation> {
        let operation = self.get(name).ok_or_else(|| OperationError::Unknown {
            name: name.to_string(),
        })?;
        let arity = operation.arity();
        if !arity.accepts(args.len()) {
            return Err(OperationError::Arity {
                operation: name.to_string(),
                expected: arity.to_string(),
                actual: args.len(),
            });
        }

        let mut diagnostics = Diagnostics::new(policy);
        let value = operation.call(args, &mut diagnostics);
        diagnostics.check()?;
        tracing::trace!(operation = name, args = args.len(), "operation applied");
        Ok(Invocation { value, diagnostics })
    }
}

const BUILTINS: &[FnOperation] = &[
    FnOperation::new(
        "add",
        Arity::exact(2),
        "add numbers, concatenate sequences or text, merge mappings",
        |a, d| arith::add(&a[0], &a[1], d),
    ),
    FnOperation::new(
        "subtract",
        Arity::exact(2),
        "subtract numbers, remove elements, keys or substrings",
        |a, d| arith::subtract(&a[0], &a[1], d),
    ),
    FnOperation::new(
        "multiply",
        Arity::exact(2),
        "multiply numeric leaves",
        |a, d| arith::multiply(&a[0], &a[1], d),
    ),
    FnOperation::new(
        "divide",
        Arity::exact(2),
        "divide numeric leaves",
        |a, d| arith::divide(&a[0], &a[1], d),
    ),
    FnOperation::new(
        "modulo",
        Arity::exact(2),
        "remainder of numeric leaves",
        |a, d| arith::modulo(&a[0], &a[1], d),
    ),
    FnOperation::new(
        "round",
        Arity::exact(2),
        "round float leaves to a precision",
        |a, d| arith::round(&a[0], &a[1], d),
    ),
    FnOperation::new(
        "ceil",
        Arity::exact(1),
        "round float leaves up",
        |a, d| arith::ceil(&a[0], d),
    ),
    FnOperation::new(
        "floor",
        Arity::exact(1),
        "round float leaves down",
        |a, d| arith::floor(&a[0], d),
    ),
    FnOperation::new(
        "abs",
        Arity::exact(1),
        "absolute value of numeric leaves",
        |a, d| arith::abs(&a[0], d),
    ),
    FnOperation::new(
        "upper",
        Arity::exact(1),
        "uppercase text leaves",
        |a, d| text::upper(&a[0], d),
    ),
    FnOperation::new(
        "lower",
        Arity::exact(1),
        "lowercase text leaves",
        |a, d| text::lower(&a[0], d),
    ),
    FnOperation::new(
        "title",
        Arity::exact(1),
        "capitalise words in text leaves",
        |a, d| text::title(&a[0], d),
    ),
    FnOperation::new(
        "trim",
        Arity::range(1, 2),
        "trim whitespace or a cutset from text leaves",
        |a, d| match a {
            [cutset, target] => text::trim(Some(cutset), target, d),
            _ => text::trim(None, &a[0], d),
        },
    ),
    FnOperation::new(
        "trim_prefix",
        Arity::exact(2),
        "strip a prefix from text leaves",
        |a, d| text::trim_prefix(&a[0], &a[1], d),
    ),
    FnOperation::new(
        "trim_suffix",
        Arity::exact(2),
        "strip a suffix from text leaves",
        |a, d| text::trim_suffix(&a[0], &a[1], d),
    ),
    FnOperation::new(
        "remove",
        Arity::exact(2),
        "remove a substring from text leaves",
        |a, d| text::remove(&a[0], &a[1], d),
    ),
    FnOperation::new(
        "replace",
        Arity::exact(3),
        "replace a substring in text leaves",
        |a, d| text::replace(&a[0], &a[1], &a[2], d),
    ),
    FnOperation::new(
        "has_prefix",
        Arity::exact(2),
        "test text leaves for a prefix",
        |a, d| text::has_prefix(&a[0], &a[1], d),
    ),
    FnOperation::new(
        "has_suffix",
        Arity::exact(2),
        "test text leaves for a suffix",
        |a, d| text::has_suffix(&a[0], &a[1], d),
    ),
    FnOperation::new(
        "contains",
        Arity::exact(2),
        "test text leaves for a substring",
        |a, d| text::contains(&a[0], &a[1], d),
    ),
    FnOperation::new(
        "truncate",
        Arity::exact(2),
        "limit text leaves to a number of characters",
        |a, d| text::truncate(&a[0], &a[1], d),
    ),
    FnOperation::new(
        "repeat",
        Arity::exact(2),
        "repeat text leaves",
        |a, d| text::repeat(&a[0], &a[1], d),
    ),
    FnOperation::new(
        "split",
        Arity::exact(2),
        "split text leaves into sequences",
        |a, d| text::split(&a[0], &a[1], d),
    ),
    FnOperation::new(
        "len",
        Arity::exact(1),
        "length of a collection or text",
        |a, d| collection::len(&a[0], d),
    ),
    FnOperation::new(
        "first",
        Arity::exact(1),
        "first element or character",
        |a, d| collection::first(&a[0], d),
    ),
    FnOperation::new(
        "last",
        Arity::exact(1),
        "last element or character",
        |a, d| collection::last(&a[0], d),
    ),
    FnOperation::new(
        "keys",
        Arity::exact(1),
        "mapping keys or record field names",
        |a, d| collection::keys(&a[0], d),
    ),
    FnOperation::new(
        "values",
        Arity::exact(1),
        "mapping values or record field values",
        |a, d| collection::values(&a[0], d),
    ),
    FnOperation::new(
        "join",
        Arity::exact(2),
        "join sequence elements with a separator",
        |a, d| collection::join(&a[0], &a[1], d),
    ),
    FnOperation::new(
        "default",
        Arity::exact(2),
        "fallback for zero values",
        |a, _| collection::default(&a[0], &a[1]),
    ),
    FnOperation::new(
        "to_string",
        Arity::exact(1),
        "convert scalar leaves to text",
        |a, d| collection::to_string(&a[0], d),
    ),
    FnOperation::new(
        "to_int",
        Arity::exact(1),
        "convert scalar leaves to integers",
        |a, d| collection::to_int(&a[0], d),
    ),
    FnOperation::new(
        "to_float",
        Arity::exact(1),
        "convert scalar leaves to floats",
        |a, d| collection::to_float(&a[0], d),
    ),
    FnOperation::new(
        "format_number",
        Arity::exact(2),
        "format numeric leaves with thousands separators",
        |a, d| collection::format_number(&a[0], &a[1], d),
    ),
];
