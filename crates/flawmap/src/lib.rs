//! flawmap — intensity-band defect segmentation for NDT radiographs.
//!
//! The library flags regions of a grayscale inspection image whose intensity
//! falls inside operator-defined suspect bands and turns them into measured,
//! classified defect candidates. The pipeline stages are:
//!
//! 1. **Noise suppression** – median pre-filter on the source, morphological
//!    closing on the binary mask.
//! 2. **Band mask** – union of inclusive range thresholds over all flagged
//!    bands of the adjustable [`DomainSet`] partition.
//! 3. **ROI constraint** – intersection with the union of operator
//!    rectangles; no rectangles means the whole frame.
//! 4. **Region extraction** – 8-connected external regions with hole-filled
//!    areas, minimum-area filtering, and area-based severity.
//! 5. **Annotation** – boundary overlay and sequential ids on a copy of the
//!    false-color preview.
//!
//! The band-to-color lookup table ([`build_lookup_table`] / [`apply_lut`])
//! renders the preview from the same band configuration but never feeds the
//! mask pipeline.
//!
//! # Public API
//! [`Analyzer`] is the primary entry point: synchronous [`Analyzer::analyze`]
//! or [`Analyzer::analyze_background`] with a progress event channel and
//! cooperative cancellation. Configuration lives in [`AnalysisConfig`] and
//! the caller-owned [`DomainSet`].

mod analyzer;
mod config;
mod domain;
mod error;
mod lut;
mod mask;
mod noise;
mod pipeline;
mod regions;
mod roi;
mod source;

#[cfg(test)]
pub(crate) mod test_utils;

pub use analyzer::{AnalysisEvent, AnalysisHandle, AnalysisInput, Analyzer};
pub use config::AnalysisConfig;
pub use domain::{DomainSet, IntensityDomain};
pub use error::AnalysisError;
pub use lut::{apply_lut, build_lookup_table, grayscale_table, BandColor, LookupTable};
pub use mask::{build_band_mask, FOREGROUND};
pub use noise::{median_smooth, morph_close, morph_dilate, morph_erode};
pub use pipeline::{
    AnalysisResult, CancelToken, DefectRecord, NullSink, ProgressEvent, ProgressSink, Stage,
};
pub use regions::{
    annotate, classify, extract_regions, BoundingRect, Region, Severity, BOUNDARY_COLOR,
    LABEL_COLOR,
};
pub use roi::{apply_roi_image, apply_roi_mask, RoiRect};
pub use source::{HistogramBin, Resolution, SourceImage};
