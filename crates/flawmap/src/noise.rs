//! Noise suppression: median pre-filter and morphological mask cleanup.
//!
//! The median filter runs on the grayscale source before thresholding so
//! isolated hot/cold pixels do not turn into spurious mask fragments. The
//! closing runs on the binary mask afterwards to bridge small gaps inside a
//! defect and merge fragmented blobs into one region per real defect.

use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::filter::median_filter;
use imageproc::morphology::{close, dilate, erode};

use crate::error::AnalysisError;

/// Rank (median) smoothing with a square `kernel x kernel` window.
///
/// `kernel` must be a positive odd integer; a kernel of 1 is the identity.
pub fn median_smooth(image: &GrayImage, kernel: u32) -> Result<GrayImage, AnalysisError> {
    if kernel == 0 {
        return Err(AnalysisError::InvalidKernel {
            size: kernel,
            reason: "smoothing kernel must be positive",
        });
    }
    if kernel % 2 == 0 {
        return Err(AnalysisError::InvalidKernel {
            size: kernel,
            reason: "smoothing kernel must be odd",
        });
    }
    let radius = kernel / 2;
    if radius == 0 {
        return Ok(image.clone());
    }
    Ok(median_filter(image, radius, radius))
}

/// Morphological closing (dilate then erode) with a square structuring
/// element of `kernel` pixels.
///
/// `kernel` must be positive. The element spans `2 * (kernel / 2) + 1`
/// pixels, so an even kernel rounds up to the next odd size; a kernel of 1
/// is the identity.
pub fn morph_close(mask: &GrayImage, kernel: u32) -> Result<GrayImage, AnalysisError> {
    if kernel == 0 {
        return Err(AnalysisError::InvalidKernel {
            size: kernel,
            reason: "closing kernel must be positive",
        });
    }
    let radius = (kernel / 2) as u8;
    if radius == 0 {
        return Ok(mask.clone());
    }
    Ok(close(mask, Norm::LInf, radius))
}

/// Morphological dilation with a square element, exposed for callers that
/// thicken overlays before display.
pub fn morph_dilate(mask: &GrayImage, kernel: u32) -> Result<GrayImage, AnalysisError> {
    if kernel == 0 {
        return Err(AnalysisError::InvalidKernel {
            size: kernel,
            reason: "dilation kernel must be positive",
        });
    }
    let radius = (kernel / 2) as u8;
    if radius == 0 {
        return Ok(mask.clone());
    }
    Ok(dilate(mask, Norm::LInf, radius))
}

/// Morphological erosion with a square element.
pub fn morph_erode(mask: &GrayImage, kernel: u32) -> Result<GrayImage, AnalysisError> {
    if kernel == 0 {
        return Err(AnalysisError::InvalidKernel {
            size: kernel,
            reason: "erosion kernel must be positive",
        });
    }
    let radius = (kernel / 2) as u8;
    if radius == 0 {
        return Ok(mask.clone());
    }
    Ok(erode(mask, Norm::LInf, radius))
}
