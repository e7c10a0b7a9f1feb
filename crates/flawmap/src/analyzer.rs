//! High-level analysis API.
//!
//! [`Analyzer`] wraps an [`AnalysisConfig`] and runs the full pipeline over
//! one input snapshot, either synchronously or on a background worker with a
//! progress channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use image::{GrayImage, RgbImage};

use crate::config::AnalysisConfig;
use crate::domain::DomainSet;
use crate::error::AnalysisError;
use crate::pipeline::{self, AnalysisResult, CancelToken, ProgressEvent, ProgressSink};
use crate::roi::RoiRect;
use crate::source::Resolution;

/// One analysis snapshot: the normalized source, the display base to
/// annotate, the band configuration, and the eligible area.
///
/// The analyzer owns the snapshot exclusively for the duration of one run;
/// nothing here is shared with a concurrent run.
#[derive(Debug, Clone)]
pub struct AnalysisInput {
    /// Normalized 8-bit source image.
    pub gray: GrayImage,
    /// Display base the annotator draws on, usually the false-color preview
    /// from [`crate::lut::apply_lut`]. Must match `gray` in size.
    pub base: RgbImage,
    /// Band partition with suspect flags.
    pub domains: DomainSet,
    /// Eligible area; empty means the whole frame.
    pub rois: Vec<RoiRect>,
    /// Pixel-to-physical conversion for reported areas.
    pub resolution: Resolution,
}

/// Message stream of a background run.
#[derive(Debug)]
pub enum AnalysisEvent {
    /// Stage-boundary progress report.
    Progress(ProgressEvent),
    /// Terminal: the run completed.
    Finished(AnalysisResult),
    /// Terminal: the run failed or was cancelled; no result exists.
    Failed(AnalysisError),
}

type TerminalSlot = Arc<Mutex<Option<Result<AnalysisResult, AnalysisError>>>>;

/// Handle to a background analysis run.
pub struct AnalysisHandle {
    events: Receiver<AnalysisEvent>,
    cancel: CancelToken,
    terminal: TerminalSlot,
    worker: Option<JoinHandle<()>>,
}

impl AnalysisHandle {
    /// Event stream: zero or more `Progress` events followed by exactly one
    /// terminal `Finished` or `Failed`.
    pub fn events(&self) -> &Receiver<AnalysisEvent> {
        &self.events
    }

    /// Request cancellation at the next stage boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the worker to finish and return its outcome.
    ///
    /// The outcome is recorded independently of the event channel, so joining
    /// after streaming every event (terminal included) still reports the run
    /// truthfully. A worker that died without recording an outcome surfaces
    /// as [`AnalysisError::Panicked`], never as a cancellation.
    pub fn join(mut self) -> Result<AnalysisResult, AnalysisError> {
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        self.terminal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .unwrap_or(Err(AnalysisError::Panicked))
    }
}

/// Clears the in-flight flag when a run leaves scope, including by panic.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Primary analysis interface. Create once, analyze many snapshots.
///
/// At most one run is in flight per analyzer, synchronous or background; any
/// invocation while another run is still in flight is rejected with
/// [`AnalysisError::Busy`] rather than queued.
pub struct Analyzer {
    config: AnalysisConfig,
    in_flight: Arc<AtomicBool>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Access the current configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Mutable access for post-construction tuning.
    pub fn config_mut(&mut self) -> &mut AnalysisConfig {
        &mut self.config
    }

    /// Run the pipeline on the calling thread, reporting progress to `sink`.
    ///
    /// Shares the one-run-in-flight policy with
    /// [`Analyzer::analyze_background`]: fails with [`AnalysisError::Busy`]
    /// while a background run is still active.
    pub fn analyze(
        &self,
        input: &AnalysisInput,
        sink: &dyn ProgressSink,
    ) -> Result<AnalysisResult, AnalysisError> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            return Err(AnalysisError::Busy);
        }
        let _guard = InFlightGuard(Arc::clone(&self.in_flight));
        pipeline::run(
            &input.gray,
            &input.base,
            &input.domains,
            &input.rois,
            input.resolution,
            &self.config,
            sink,
            &CancelToken::new(),
        )
    }

    /// Run the pipeline on a background worker thread.
    ///
    /// Progress and the terminal outcome arrive on the handle's event
    /// channel, so the interactive thread never blocks. Fails immediately
    /// with [`AnalysisError::Busy`] when a previous run is still in flight.
    pub fn analyze_background(
        &self,
        input: AnalysisInput,
    ) -> Result<AnalysisHandle, AnalysisError> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            return Err(AnalysisError::Busy);
        }

        let (tx, rx) = channel();
        let cancel = CancelToken::new();
        let worker_cancel = cancel.clone();
        let config = self.config.clone();
        let terminal: TerminalSlot = Arc::new(Mutex::new(None));
        let worker_terminal = Arc::clone(&terminal);
        let in_flight = Arc::clone(&self.in_flight);

        let worker = std::thread::spawn(move || {
            let _guard = InFlightGuard(in_flight);
            let progress_tx = tx.clone();
            let sink = move |event: ProgressEvent| {
                let _ = progress_tx.send(AnalysisEvent::Progress(event));
            };
            let outcome = pipeline::run(
                &input.gray,
                &input.base,
                &input.domains,
                &input.rois,
                input.resolution,
                &config,
                &sink,
                &worker_cancel,
            );
            let event = match &outcome {
                Ok(result) => AnalysisEvent::Finished(result.clone()),
                Err(err) => AnalysisEvent::Failed(err.clone()),
            };
            *worker_terminal
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(outcome);
            let _ = tx.send(event);
        });

        Ok(AnalysisHandle {
            events: rx,
            cancel,
            terminal,
            worker: Some(worker),
        })
    }
}
