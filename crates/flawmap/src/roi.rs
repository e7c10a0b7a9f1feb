//! Region-of-interest constraint.
//!
//! A list of rectangles defines the analyzable area as their union. ROI
//! filtering only ever restricts: with no rectangles supplied the whole
//! frame stays eligible and the input is returned unchanged.

use image::{GrayImage, Luma, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in image pixel coordinates.
///
/// Construction clamps to the frame, so a stored rectangle always has
/// positive width/height and lies fully inside `[0, width) x [0, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoiRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl RoiRect {
    /// Clamp a requested rectangle to a `frame_w x frame_h` image.
    ///
    /// Returns `None` when the clamped rectangle would be empty (degenerate
    /// size or entirely outside the frame).
    pub fn clamped(
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        frame_w: u32,
        frame_h: u32,
    ) -> Option<Self> {
        if width <= 0 || height <= 0 || frame_w == 0 || frame_h == 0 {
            return None;
        }
        let x0 = x.clamp(0, frame_w as i64);
        let y0 = y.clamp(0, frame_h as i64);
        let x1 = (x + width).clamp(0, frame_w as i64);
        let y1 = (y + height).clamp(0, frame_h as i64);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }

    /// Whether `(px, py)` lies inside this rectangle.
    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }

    /// Rectangle area in pixels.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

fn coverage(rois: &[RoiRect], w: u32, h: u32) -> GrayImage {
    let mut cover = GrayImage::new(w, h);
    for roi in rois {
        for y in roi.y..roi.y.saturating_add(roi.height).min(h) {
            for x in roi.x..roi.x.saturating_add(roi.width).min(w) {
                cover.put_pixel(x, y, Luma([255]));
            }
        }
    }
    cover
}

/// Intersect a binary mask with the union of the rectangles.
///
/// An empty `rois` list returns the mask unchanged.
pub fn apply_roi_mask(mask: &GrayImage, rois: &[RoiRect]) -> GrayImage {
    if rois.is_empty() {
        return mask.clone();
    }
    let (w, h) = mask.dimensions();
    let cover = coverage(rois, w, h);
    let mut out = mask.clone();
    for (dst, keep) in out.pixels_mut().zip(cover.pixels()) {
        dst[0] &= keep[0];
    }
    out
}

/// Black out every display pixel outside the union of the rectangles.
///
/// Pixels inside the coverage are preserved unchanged; an empty `rois` list
/// returns the image unchanged.
pub fn apply_roi_image(image: &RgbImage, rois: &[RoiRect]) -> RgbImage {
    if rois.is_empty() {
        return image.clone();
    }
    let (w, h) = image.dimensions();
    let cover = coverage(rois, w, h);
    let mut out = image.clone();
    for (dst, keep) in out.pixels_mut().zip(cover.pixels()) {
        if keep[0] == 0 {
            *dst = Rgb([0, 0, 0]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::mask_with_block;

    #[test]
    fn clamped_keeps_interior_rect() {
        let roi = RoiRect::clamped(10, 20, 30, 40, 100, 100).unwrap();
        assert_eq!(
            roi,
            RoiRect {
                x: 10,
                y: 20,
                width: 30,
                height: 40
            }
        );
    }

    #[test]
    fn clamped_trims_overhang() {
        let roi = RoiRect::clamped(-5, 90, 20, 20, 100, 100).unwrap();
        assert_eq!(roi.x, 0);
        assert_eq!(roi.width, 15);
        assert_eq!(roi.y, 90);
        assert_eq!(roi.height, 10);
    }

    #[test]
    fn clamped_rejects_degenerate_and_outside() {
        assert!(RoiRect::clamped(10, 10, 0, 5, 100, 100).is_none());
        assert!(RoiRect::clamped(10, 10, 5, -1, 100, 100).is_none());
        assert!(RoiRect::clamped(200, 200, 10, 10, 100, 100).is_none());
        assert!(RoiRect::clamped(-50, 0, 10, 10, 100, 100).is_none());
    }

    #[test]
    fn empty_roi_list_is_identity() {
        let mask = mask_with_block(32, 32, 5, 5, 8, 8);
        let out = apply_roi_mask(&mask, &[]);
        assert_eq!(out.as_raw(), mask.as_raw());
    }

    #[test]
    fn mask_outside_coverage_is_cleared() {
        // Blob on the right half, ROI covering only the left half.
        let mask = mask_with_block(40, 20, 30, 5, 6, 6);
        let roi = RoiRect::clamped(0, 0, 20, 20, 40, 20).unwrap();
        let out = apply_roi_mask(&mask, &[roi]);
        assert!(out.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn union_of_rects_preserves_both_regions() {
        let mut mask = GrayImage::new(40, 20);
        mask.put_pixel(2, 2, Luma([255]));
        mask.put_pixel(35, 15, Luma([255]));
        let rois = [
            RoiRect::clamped(0, 0, 10, 10, 40, 20).unwrap(),
            RoiRect::clamped(30, 10, 10, 10, 40, 20).unwrap(),
        ];
        let out = apply_roi_mask(&mask, &rois);
        assert_eq!(out.get_pixel(2, 2)[0], 255);
        assert_eq!(out.get_pixel(35, 15)[0], 255);
    }

    #[test]
    fn display_image_is_blacked_outside_coverage() {
        let mut img = RgbImage::new(10, 10);
        for p in img.pixels_mut() {
            *p = Rgb([50, 60, 70]);
        }
        let roi = RoiRect::clamped(0, 0, 5, 10, 10, 10).unwrap();
        let out = apply_roi_image(&img, &[roi]);
        assert_eq!(*out.get_pixel(2, 5), Rgb([50, 60, 70]));
        assert_eq!(*out.get_pixel(7, 5), Rgb([0, 0, 0]));
    }
}
