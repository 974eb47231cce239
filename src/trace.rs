//! Conditional tracing macros (zero-cost when feature disabled) and stage
//! timing.
//!
//! The macros emit tracing spans and events when the `tracing` feature is
//! enabled and compile to nothing when it is disabled. `StageTimer` measures
//! wall-clock time per pipeline stage regardless of the feature so callers can
//! report timings without a subscriber.

use std::time::{Duration, Instant};

/// Create an info-level span for a pipeline stage.
///
/// When the `tracing` feature is enabled, this creates a `tracing::info_span!`.
/// When disabled, it compiles to a no-op that returns a dummy guard.
#[cfg(feature = "tracing")]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        tracing::info_span!($name $(, $($field)*)?)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        $crate::trace::NoopSpan
    };
}

/// Emit an info-level event for key measurements.
///
/// When disabled, the values are evaluated and discarded.
#[cfg(feature = "tracing")]
macro_rules! trace_event {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::info!(name: $name, $($key = $value),+)
    };
    ($name:expr) => {
        tracing::info!(name: $name)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_event {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        let _ = ($($value,)+);
    };
    ($name:expr) => {};
}

pub(crate) use trace_event;
pub(crate) use trace_span;

/// A no-op span guard used when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Returns self, mimicking `Span::entered()`.
    #[inline]
    pub fn entered(self) -> Self {
        self
    }
}

/// Wall-clock duration of one pipeline stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageTiming {
    /// Stage name, e.g. `"zncc_lr"`.
    pub stage: &'static str,
    /// Time spent in the stage.
    pub elapsed: Duration,
}

impl StageTiming {
    /// Elapsed time in milliseconds.
    pub fn millis(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1e3
    }
}

/// Measures one stage; finishing it logs the duration.
pub(crate) struct StageTimer {
    stage: &'static str,
    start: Instant,
}

impl StageTimer {
    pub(crate) fn start(stage: &'static str) -> Self {
        Self {
            stage,
            start: Instant::now(),
        }
    }

    pub(crate) fn finish(self) -> StageTiming {
        let timing = StageTiming {
            stage: self.stage,
            elapsed: self.start.elapsed(),
        };
        trace_event!("stage_done", stage = timing.stage, elapsed_ms = timing.millis());
        timing
    }
}
