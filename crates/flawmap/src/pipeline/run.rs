//! Stage sequencing for one analysis run.
//!
//! smooth -> band mask -> close -> ROI constraint -> extraction -> annotate.
//! Progress is reported at every stage boundary; a cancellation request or a
//! stage error stops the run without publishing a partial result.

use image::{GrayImage, RgbImage};

use super::progress::{CancelToken, ProgressEvent, ProgressSink, Stage};
use super::result::{AnalysisResult, DefectRecord};
use crate::config::AnalysisConfig;
use crate::domain::DomainSet;
use crate::error::AnalysisError;
use crate::mask::build_band_mask;
use crate::noise::{median_smooth, morph_close};
use crate::regions::{annotate, classify, extract_regions};
use crate::roi::{apply_roi_mask, RoiRect};
use crate::source::Resolution;

fn enter_stage(
    stage: Stage,
    progress: &dyn ProgressSink,
    cancel: &CancelToken,
) -> Result<(), AnalysisError> {
    if cancel.is_cancelled() {
        tracing::info!(?stage, "analysis cancelled before stage");
        progress.report(ProgressEvent::from_stage(Stage::Cancelled));
        return Err(AnalysisError::Cancelled);
    }
    tracing::debug!(?stage, percent = stage.percent(), "entering stage");
    progress.report(ProgressEvent::from_stage(stage));
    Ok(())
}

pub(crate) fn run(
    gray: &GrayImage,
    base: &RgbImage,
    domains: &DomainSet,
    rois: &[RoiRect],
    resolution: Resolution,
    config: &AnalysisConfig,
    progress: &dyn ProgressSink,
    cancel: &CancelToken,
) -> Result<AnalysisResult, AnalysisError> {
    let (w, h) = gray.dimensions();
    if w == 0 || h == 0 {
        return Err(AnalysisError::EmptyImage);
    }
    let (bw, bh) = base.dimensions();
    if (bw, bh) != (w, h) {
        return Err(AnalysisError::DimensionMismatch {
            base_w: bw,
            base_h: bh,
            src_w: w,
            src_h: h,
        });
    }
    config.validate()?;

    enter_stage(Stage::Preprocessing, progress, cancel)?;
    let smoothed = median_smooth(gray, config.smooth_kernel)?;

    enter_stage(Stage::Thresholding, progress, cancel)?;
    let mask = build_band_mask(&smoothed, domains);

    enter_stage(Stage::MorphologicalCleanup, progress, cancel)?;
    let mask = morph_close(&mask, config.close_kernel)?;

    let mask = if rois.is_empty() {
        mask
    } else {
        enter_stage(Stage::RoiFiltering, progress, cancel)?;
        apply_roi_mask(&mask, rois)
    };

    enter_stage(Stage::ContourExtraction, progress, cancel)?;
    let regions = extract_regions(&mask, config.min_area);
    tracing::info!(n_regions = regions.len(), "regions extracted");

    if cancel.is_cancelled() {
        progress.report(ProgressEvent::from_stage(Stage::Cancelled));
        return Err(AnalysisError::Cancelled);
    }
    progress.report(ProgressEvent {
        percent: Stage::Annotating.percent(),
        status: format!(
            "Found {} potential defects. Filtering and annotating...",
            regions.len()
        ),
    });

    let annotated = annotate(base, &regions);
    let pixel_area = resolution.pixel_area();
    let defects: Vec<DefectRecord> = regions
        .iter()
        .enumerate()
        .map(|(i, region)| DefectRecord {
            id: i as u32 + 1,
            area: region.area,
            area_physical: region.area as f64 * pixel_area,
            bounding_rect: region.bounding_rect,
            severity: classify(region.area, config.severity_threshold),
        })
        .collect();
    let total_area: u64 = defects.iter().map(|d| d.area).sum();
    let total_area_physical: f64 = defects.iter().map(|d| d.area_physical).sum();

    progress.report(ProgressEvent::from_stage(Stage::Done));
    tracing::info!(
        n_defects = defects.len(),
        total_area,
        "analysis complete"
    );

    Ok(AnalysisResult {
        annotated,
        defects,
        total_area,
        total_area_physical,
    })
}
