//! Wraps a unit of work in a tracing span and a counter.
//!
//! The span parent is an explicit [`Span`] value rather than whatever happens to be entered on
//! the polling thread, and the body future is instrumented with the new span so every poll
//! (and therefore every suspension point) is attributed to it.
//!
//! On success the span gets a `result` field and the operation's counter is incremented by the
//! same value. On failure the span is marked `ERROR` and the counter is left alone. In every case,
//! including panics and the future being dropped before completion, the span closes exactly once
//! and `operation.duration` is recorded.

use crate::histogram;
use crate::metrics_defs::{MetricDef, OPERATION_DURATION};
use std::future::Future;
use std::time::Instant;
use tracing::{Instrument, Span, field};

/// A result that can be tagged on a span and added to a monotonic counter.
pub trait CounterValue {
    fn counter_value(&self) -> u64;
}

impl CounterValue for u64 {
    fn counter_value(&self) -> u64 {
        *self
    }
}

impl CounterValue for u32 {
    fn counter_value(&self) -> u64 {
        u64::from(*self)
    }
}

impl CounterValue for usize {
    fn counter_value(&self) -> u64 {
        *self as u64
    }
}

pub struct InstrumentedOperation {
    name: String,
    counter: MetricDef,
    parent: Span,
}

impl InstrumentedOperation {
    /// Creates an operation parented to the span current at construction time.
    pub fn new(name: impl Into<String>, counter: MetricDef) -> Self {
        InstrumentedOperation {
            name: name.into(),
            counter,
            parent: Span::current(),
        }
    }

    pub fn with_parent(mut self, parent: &Span) -> Self {
        self.parent = parent.clone();
        self
    }

    pub async fn run<F, T, E>(self, body: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        T: CounterValue,
    {
        let span = tracing::info_span!(
            parent: &self.parent,
            "operation",
            otel.name = %self.name,
            result = field::Empty,
            otel.status_code = field::Empty,
        );
        let mut guard = OperationGuard::start(span.clone(), self.name);

        let outcome = body.instrument(span).await;

        match &outcome {
            Ok(value) => {
                let value = value.counter_value();
                guard.span.record("result", value);
                guard.span.record("otel.status_code", "OK");
                crate::counter!(self.counter).increment(value);
                guard.status = "ok";
            }
            Err(_) => {
                guard.span.record("otel.status_code", "ERROR");
                guard.status = "error";
            }
        }

        outcome
    }
}

/// Owns the operation span until the operation ends, however it ends.
struct OperationGuard {
    span: Span,
    operation: String,
    started: Instant,
    status: &'static str,
}

impl OperationGuard {
    fn start(span: Span, operation: String) -> Self {
        OperationGuard {
            span,
            operation,
            started: Instant::now(),
            // Left as-is when the future is dropped or the body panics.
            status: "cancelled",
        }
    }
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        if self.status == "cancelled" {
            self.span.record("otel.status_code", "ERROR");
        }

        histogram!(
            OPERATION_DURATION,
            "operation" => std::mem::take(&mut self.operation),
            "status" => self.status,
        )
        .record(self.started.elapsed().as_secs_f64());
    }
}
