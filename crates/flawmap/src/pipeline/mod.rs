//! Analysis pipeline: stage sequencing, progress, and result types.
//!
//! Algorithmic primitives live in `crate::mask`, `crate::noise`,
//! `crate::roi`, and `crate::regions`; this layer owns call order, stage
//! boundaries, progress reporting, and cancellation. [`crate::Analyzer`] is
//! the public entry point.

mod progress;
mod result;
mod run;

pub use progress::{CancelToken, NullSink, ProgressEvent, ProgressSink, Stage};
pub use result::{AnalysisResult, DefectRecord};

pub(crate) use run::run;
