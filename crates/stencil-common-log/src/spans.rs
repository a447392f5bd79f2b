//! Span and timing helpers.

use tracing::{info_span, Span};

/// Span for one CLI command. Its `error` field is filled by [`record_error`].
pub fn command_span(command: &str) -> Span {
    info_span!("command", name = %command, error = tracing::field::Empty)
}

/// Span for work on one template.
pub fn template_span(operation: &str, template: &str) -> Span {
    info_span!("template", op = %operation, name = %template)
}

/// Record an error on the current span, if it declares an `error` field.
pub fn record_error(error: &dyn std::error::Error) {
    Span::current().record("error", tracing::field::display(error));
}

/// Timing utility for operations.
pub struct Timer {
    start: std::time::Instant,
    operation: &'static str,
}

impl Timer {
    /// Start a new timer.
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: std::time::Instant::now(),
            operation,
        }
    }

    /// Complete the timer and record duration.
    pub fn finish(self) -> std::time::Duration {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = %self.operation,
            duration_ms = %duration.as_millis(),
            "operation completed"
        );
        duration
    }
}

/// Time a block of code.
#[macro_export]
macro_rules! timed {
    ($name:expr, $body:expr) => {{
        let _timer = $crate::spans::Timer::start($name);
        let result = $body;
        _timer.finish();
        result
    }};
}
