//! Stage bookkeeping, progress reporting, and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Pipeline stage. Terminal states are `Done`, `Failed`, and `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Idle,
    Preprocessing,
    Thresholding,
    MorphologicalCleanup,
    RoiFiltering,
    ContourExtraction,
    Annotating,
    Done,
    Failed,
    Cancelled,
}

impl Stage {
    /// Coarse progress value reported at the entry of this stage. Values are
    /// fixed at stage boundaries and non-decreasing along the happy path.
    pub fn percent(self) -> u8 {
        match self {
            Stage::Idle => 0,
            Stage::Preprocessing => 10,
            Stage::Thresholding => 20,
            Stage::MorphologicalCleanup => 40,
            Stage::RoiFiltering => 50,
            Stage::ContourExtraction => 60,
            Stage::Annotating => 70,
            Stage::Done => 100,
            Stage::Failed | Stage::Cancelled => 100,
        }
    }

    /// Short operator-facing status line for this stage.
    pub fn status(self) -> &'static str {
        match self {
            Stage::Idle => "Idle",
            Stage::Preprocessing => "Preprocessing image...",
            Stage::Thresholding => "Thresholding...",
            Stage::MorphologicalCleanup => "Morphological operations...",
            Stage::RoiFiltering => "Applying ROI filtering...",
            Stage::ContourExtraction => "Finding contours...",
            Stage::Annotating => "Filtering and annotating...",
            Stage::Done => "Analysis complete.",
            Stage::Failed => "Analysis failed.",
            Stage::Cancelled => "Analysis cancelled.",
        }
    }

    /// Whether the pipeline stops at this stage.
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Failed | Stage::Cancelled)
    }
}

/// One progress report: coarse percentage plus a status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub percent: u8,
    pub status: String,
}

impl ProgressEvent {
    pub fn from_stage(stage: Stage) -> Self {
        Self {
            percent: stage.percent(),
            status: stage.status().to_string(),
        }
    }
}

/// Observer of stage-boundary progress reports.
pub trait ProgressSink {
    fn report(&self, event: ProgressEvent);
}

/// Closures observe progress directly.
impl<F: Fn(ProgressEvent)> ProgressSink for F {
    fn report(&self, event: ProgressEvent) {
        self(event);
    }
}

/// Channel senders forward progress to another thread; a disconnected
/// receiver drops the report silently.
impl ProgressSink for Sender<ProgressEvent> {
    fn report(&self, event: ProgressEvent) {
        let _ = self.send(event);
    }
}

/// Sink that discards every report.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report(&self, _event: ProgressEvent) {}
}

/// Cooperative cancellation flag checked between stages.
///
/// Cloning shares the flag; any clone can cancel the run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Stages already running complete; the next stage
    /// boundary stops the run.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_percents_are_monotonic_along_happy_path() {
        let path = [
            Stage::Idle,
            Stage::Preprocessing,
            Stage::Thresholding,
            Stage::MorphologicalCleanup,
            Stage::RoiFiltering,
            Stage::ContourExtraction,
            Stage::Annotating,
            Stage::Done,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].percent() <= pair[1].percent());
        }
    }

    #[test]
    fn terminal_stages_are_marked() {
        assert!(Stage::Done.is_terminal());
        assert!(Stage::Failed.is_terminal());
        assert!(Stage::Cancelled.is_terminal());
        assert!(!Stage::Thresholding.is_terminal());
    }

    #[test]
    fn cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn closure_sink_receives_events() {
        use std::cell::RefCell;
        let seen = RefCell::new(Vec::new());
        let sink = |event: ProgressEvent| seen.borrow_mut().push(event.percent);
        sink.report(ProgressEvent::from_stage(Stage::Thresholding));
        assert_eq!(*seen.borrow(), vec![20]);
    }
}
