//! Error types shared across the analysis pipeline and configuration layer.

/// Errors reported by domain mutations, stage validation, and the analyzer.
///
/// Configuration errors (`InvalidBoundary`, `OrderViolation`, `DomainIndex`)
/// leave the mutated structure untouched; stage errors abort the whole
/// analysis run without publishing a partial result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    /// A smoothing or closing kernel size failed validation.
    #[error("invalid kernel size {size}: {reason}")]
    InvalidKernel { size: u32, reason: &'static str },

    /// A boundary insertion was out of range or duplicated an existing boundary.
    #[error("invalid boundary position {position}: {reason}")]
    InvalidBoundary { position: f64, reason: &'static str },

    /// A boundary move would cross a neighboring boundary.
    #[error("boundary {index} cannot move to {position}: crosses a neighboring boundary")]
    OrderViolation { index: usize, position: f64 },

    /// A domain index did not address an existing domain.
    #[error("domain index {0} out of range")]
    DomainIndex(usize),

    /// Analysis was invoked without a usable source image.
    #[error("source image is empty or missing")]
    EmptyImage,

    /// The annotation base image does not match the source dimensions.
    #[error("base image is {base_w}x{base_h} but source is {src_w}x{src_h}")]
    DimensionMismatch {
        base_w: u32,
        base_h: u32,
        src_w: u32,
        src_h: u32,
    },

    /// An analysis is already in flight on this analyzer.
    #[error("an analysis is already running")]
    Busy,

    /// The run was cancelled between stages.
    #[error("analysis cancelled")]
    Cancelled,

    /// The background worker died without recording an outcome.
    #[error("analysis worker terminated abnormally")]
    Panicked,
}
