//! Recoverable diagnostics raised by operations.
//!
//! Operations never fail on a bad value. They record a [`Diagnostic`], return
//! a best-effort value and let the caller decide, through the
//! [`DiagnosticPolicy`], whether the problem is logged and whether it stops
//! the render.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::OperationError;

/// How recoverable diagnostics are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticPolicy {
    /// Emit warnings through `tracing`.
    pub log_warnings: bool,
    /// Emit errors through `tracing`.
    pub log_errors: bool,
    /// Abort the current render on a warning.
    pub halt_on_warning: bool,
    /// Abort the current render on an error.
    pub halt_on_error: bool,
}

impl Default for DiagnosticPolicy {
    fn default() -> Self {
        Self {
            log_warnings: true,
            log_errors: true,
            halt_on_warning: false,
            halt_on_error: false,
        }
    }
}

impl DiagnosticPolicy {
    /// Policy that records diagnostics without logging or halting.
    pub fn silent() -> Self {
        Self {
            log_warnings: false,
            log_errors: false,
            halt_on_warning: false,
            halt_on_error: false,
        }
    }

    fn halts(&self, severity: Severity) -> bool {
        match severity {
            Severity::Warning => self.halt_on_warning,
            Severity::Error => self.halt_on_error,
        }
    }
}

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation applied to a type it does not support.
    Warning,
    /// Operation could not produce a meaningful result (e.g. division by zero).
    Error,
}

/// A single recorded problem.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub operation: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{level}: {}: {}", self.operation, self.message)
    }
}

/// Collector for diagnostics raised during one operation call.
#[derive(Debug, Default)]
pub struct Diagnostics {
    policy: DiagnosticPolicy,
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create a collector governed by `policy`.
    pub fn new(policy: DiagnosticPolicy) -> Self {
        Self {
            policy,
            entries: Vec::new(),
        }
    }

    /// Record a warning.
    pub fn warn(&mut self, operation: &str, message: impl Into<String>) {
        self.push(Severity::Warning, operation, message.into());
    }

    /// Record an error.
    pub fn error(&mut self, operation: &str, message: impl Into<String>) {
        self.push(Severity::Error, operation, message.into());
    }

    fn push(&mut self, severity: Severity, operation: &str, message: String) {
        match severity {
            Severity::Warning if self.policy.log_warnings => {
                tracing::warn!(operation, "{message}");
            }
            Severity::Error if self.policy.log_errors => {
                tracing::error!(operation, "{message}");
            }
            _ => {}
        }
        self.entries.push(Diagnostic {
            severity,
            operation: operation.to_string(),
            message,
        });
    }

    /// All recorded diagnostics in order.
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether anything of `severity` was recorded.
    pub fn has(&self, severity: Severity) -> bool {
        self.entries.iter().any(|d| d.severity == severity)
    }

    /// The first diagnostic the policy says should stop the render.
    pub fn halting(&self) -> Option<&Diagnostic> {
        self.entries.iter().find(|d| self.policy.halts(d.severity))
    }

    /// Turn a halting diagnostic into an error, if there is one.
    pub fn check(&self) -> Result<(), OperationError> {
        match self.halting() {
            Some(d) => Err(OperationError::Halted {
                operation: d.operation.clone(),
                message: d.message.clone(),
            }),
            None => Ok(()),
        }
    }

    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}
