//! Suspect-band thresholding: flagged bands to a binary mask.

use image::{GrayImage, Luma};

use crate::domain::DomainSet;

/// Mask foreground value.
pub const FOREGROUND: u8 = 255;

/// Select every pixel whose intensity falls in any flagged band.
///
/// Each flagged band contributes its inclusive `[start, end]` range; the
/// contributions are OR-ed together, so a pixel matching several flagged
/// bands is still a single foreground pixel. No flagged band yields an
/// all-zero mask of the same dimensions.
pub fn build_band_mask(image: &GrayImage, set: &DomainSet) -> GrayImage {
    let (w, h) = image.dimensions();
    let mut mask = GrayImage::new(w, h);
    let flagged: Vec<(f64, f64)> = set.flagged().map(|d| (d.start, d.end)).collect();
    if flagged.is_empty() {
        return mask;
    }

    for (src, dst) in image.pixels().zip(mask.pixels_mut()) {
        let v = src[0] as f64;
        if flagged.iter().any(|&(start, end)| v >= start && v <= end) {
            *dst = Luma([FOREGROUND]);
        }
    }
    mask
}
