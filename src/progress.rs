//! Progress reporting for a running conversion.
//!
//! The pipeline reports `(stage, message, percent)` triples through
//! [`ConversionProgressCallback`]. Percent is monotonic from 0 to 100 and is
//! `None` only for the terminal [`Stage::Failed`] event.
//!
//! | Stage | Percent |
//! |-------|---------|
//! | [`Stage::Started`]    | 0 |
//! | [`Stage::Rendering`]  | 10 → 50, proportional to pages rendered |
//! | [`Stage::Assembling`] | 50 → 90, proportional to slides placed |
//! | [`Stage::Saving`]     | 90 |
//! | [`Stage::Done`]       | 100 |
//! | [`Stage::Failed`]     | — |
//!
//! # Example
//!
//! ```rust
//! use pdf2pptx::{ConversionProgressCallback, ProgressUpdate};
//!
//! // Any `Fn(&ProgressUpdate) + Send + Sync` is a callback.
//! let print = |u: &ProgressUpdate| match u.percent {
//!     Some(p) => eprintln!("{}: {} - {:.1}%", u.stage, u.message, p),
//!     None => eprintln!("{}: {}", u.stage, u.message),
//! };
//! print.on_progress(&ProgressUpdate::new(pdf2pptx::Stage::Started, "starting", Some(0.0)));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Pipeline states as seen by a progress observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Started,
    Rendering,
    Assembling,
    Saving,
    Done,
    Failed,
}

impl Stage {
    /// Short label suitable for a progress-bar prefix.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Started => "Starting",
            Stage::Rendering => "Rendering",
            Stage::Assembling => "Assembling",
            Stage::Saving => "Saving",
            Stage::Done => "Done",
            Stage::Failed => "Failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One progress event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: Stage,
    pub message: String,
    /// Overall progress in percent, `None` for [`Stage::Failed`].
    pub percent: Option<f32>,
}

impl ProgressUpdate {
    pub fn new(stage: Stage, message: impl Into<String>, percent: Option<f32>) -> Self {
        Self {
            stage,
            message: message.into(),
            percent,
        }
    }
}

/// Receives progress events from the conversion pipeline.
///
/// Implementations must be `Send + Sync`: the async entry point runs the
/// pipeline on a blocking worker thread and calls back from there. A UI
/// caller is expected to forward events to its own thread.
pub trait ConversionProgressCallback: Send + Sync {
    fn on_progress(&self, update: &ProgressUpdate);
}

impl<F> ConversionProgressCallback for F
where
    F: Fn(&ProgressUpdate) + Send + Sync,
{
    fn on_progress(&self, update: &ProgressUpdate) {
        self(update)
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {
    fn on_progress(&self, _update: &ProgressUpdate) {}
}

/// Shared callback handle, as accepted by the async [`crate::convert`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

/// Pipeline-side helper that maps per-stage fractions onto the overall range.
pub(crate) struct ProgressReporter<'a> {
    sink: Option<&'a dyn ConversionProgressCallback>,
}

impl<'a> ProgressReporter<'a> {
    pub(crate) const RENDER_START: f32 = 10.0;
    pub(crate) const ASSEMBLE_START: f32 = 50.0;
    pub(crate) const SAVE_START: f32 = 90.0;

    pub(crate) fn new(sink: Option<&'a dyn ConversionProgressCallback>) -> Self {
        Self { sink }
    }

    pub(crate) fn emit(&self, stage: Stage, message: impl Into<String>, percent: Option<f32>) {
        if let Some(sink) = self.sink {
            sink.on_progress(&ProgressUpdate::new(stage, message, percent));
        }
    }

    /// Report `done` of `total` within the `[start, start + 40]` sub-range.
    pub(crate) fn step(&self, stage: Stage, message: impl Into<String>, start: f32, done: usize, total: usize) {
        let fraction = if total == 0 { 1.0 } else { done as f32 / total as f32 };
        self.emit(stage, message, Some(start + fraction * 40.0));
    }
}
