//! Analysis output types.

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::regions::{BoundingRect, Severity};

/// One measured, classified defect candidate.
///
/// Records are created only by the extraction stage, in discovery order, and
/// are read-only afterwards; persistence and display belong to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefectRecord {
    /// 1-based id in extraction order, stable within one analysis call.
    pub id: u32,
    /// Enclosed area in pixels.
    pub area: u64,
    /// Enclosed area in physical units (pixel area times resolution).
    pub area_physical: f64,
    /// Bounding box of the outer boundary.
    pub bounding_rect: BoundingRect,
    /// Area-based classification.
    pub severity: Severity,
}

/// Aggregate result of one completed analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Annotated copy of the display base; the caller's images are never
    /// mutated.
    pub annotated: RgbImage,
    /// Defect records in extraction order.
    pub defects: Vec<DefectRecord>,
    /// Sum of all defect areas in pixels.
    pub total_area: u64,
    /// Sum of all defect areas in physical units.
    pub total_area_physical: f64,
}
