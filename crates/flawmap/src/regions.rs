//! Connected-region extraction, area classification, and annotation.
//!
//! Foreground blobs are labeled with 8-connectivity and reported in raster
//! discovery order. Only external boundaries are considered: a region's area
//! is the pixel count enclosed by its outer boundary, so holes inside a blob
//! count toward the area and internal contours are never reported
//! separately. Components below the minimum area are discarded outright.

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::region_labelling::{connected_components, Connectivity};
use serde::{Deserialize, Serialize};

/// Severity classification of an extracted region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Critical,
}

/// Classify a region by pixel area: strictly above the threshold is critical.
pub fn classify(area: u64, threshold: u64) -> Severity {
    if area > threshold {
        Severity::Critical
    } else {
        Severity::Warning
    }
}

/// Axis-aligned bounding box of a region, in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One extracted foreground region.
#[derive(Debug, Clone)]
pub struct Region {
    /// Pixels enclosed by the outer boundary (holes included).
    pub area: u64,
    /// Bounding box of the outer boundary.
    pub bounding_rect: BoundingRect,
    /// Outer boundary pixels in raster order. Pixels only adjacent to an
    /// enclosed hole are not part of the external boundary.
    pub boundary: Vec<(u32, u32)>,
}

#[derive(Clone, Copy)]
struct Accumulator {
    area: u64,
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
}

const EMPTY_ACC: Accumulator = Accumulator {
    area: 0,
    min_x: u32::MAX,
    min_y: u32::MAX,
    max_x: 0,
    max_y: 0,
};

/// Extract foreground regions from a binary mask, discarding any whose
/// enclosed area is below `min_area`.
pub fn extract_regions(mask: &GrayImage, min_area: u64) -> Vec<Region> {
    let (w, h) = mask.dimensions();
    if w == 0 || h == 0 {
        return Vec::new();
    }

    let labels = connected_components(mask, Connectivity::Eight, Luma([0u8]));

    let mut accs: Vec<Accumulator> = Vec::new();
    for (x, y, p) in labels.enumerate_pixels() {
        let label = p[0] as usize;
        if label == 0 {
            continue;
        }
        if accs.len() < label {
            accs.resize(label, EMPTY_ACC);
        }
        let acc = &mut accs[label - 1];
        acc.area += 1;
        acc.min_x = acc.min_x.min(x);
        acc.min_y = acc.min_y.min(y);
        acc.max_x = acc.max_x.max(x);
        acc.max_y = acc.max_y.max(y);
    }
    if accs.is_empty() {
        return Vec::new();
    }

    // Label the background with 4-connectivity to tell open background from
    // enclosed holes. A background component that never touches the frame
    // border is a hole; its pixels belong to the surrounding region's area.
    let mut inverted = GrayImage::new(w, h);
    for (src, dst) in mask.pixels().zip(inverted.pixels_mut()) {
        if src[0] == 0 {
            *dst = Luma([255]);
        }
    }
    let bg_labels = connected_components(&inverted, Connectivity::Four, Luma([0u8]));

    let n_bg = bg_labels.pixels().map(|p| p[0] as usize).max().unwrap_or(0);
    let mut open_background = vec![false; n_bg + 1];
    for x in 0..w {
        open_background[bg_labels.get_pixel(x, 0)[0] as usize] = true;
        open_background[bg_labels.get_pixel(x, h - 1)[0] as usize] = true;
    }
    for y in 0..h {
        open_background[bg_labels.get_pixel(0, y)[0] as usize] = true;
        open_background[bg_labels.get_pixel(w - 1, y)[0] as usize] = true;
    }

    let mut hole_area = vec![0u64; n_bg + 1];
    let mut hole_owner = vec![0usize; n_bg + 1];
    for (x, y, p) in bg_labels.enumerate_pixels() {
        let bg = p[0] as usize;
        if bg == 0 || open_background[bg] {
            continue;
        }
        hole_area[bg] += 1;
        // With 8-connected foreground and 4-connected background, a hole is
        // enclosed by exactly one foreground component, so any labeled
        // neighbor identifies the owner.
        if hole_owner[bg] == 0 {
            for (nx, ny) in neighbors4(x, y, w, h) {
                let owner = labels.get_pixel(nx, ny)[0] as usize;
                if owner != 0 {
                    hole_owner[bg] = owner;
                    break;
                }
            }
        }
    }
    for bg in 1..=n_bg {
        if hole_owner[bg] != 0 {
            accs[hole_owner[bg] - 1].area += hole_area[bg];
        }
    }

    // External boundary: a labeled pixel adjacent (4-connectivity) to open
    // background or the frame edge. Hole-adjacent pixels stay interior.
    let mut boundaries: Vec<Vec<(u32, u32)>> = vec![Vec::new(); accs.len()];
    for (x, y, p) in labels.enumerate_pixels() {
        let label = p[0] as usize;
        if label == 0 {
            continue;
        }
        let on_frame_edge = x == 0 || y == 0 || x == w - 1 || y == h - 1;
        let touches_open_bg = neighbors4(x, y, w, h).into_iter().any(|(nx, ny)| {
            let bg = bg_labels.get_pixel(nx, ny)[0] as usize;
            bg != 0 && open_background[bg]
        });
        if on_frame_edge || touches_open_bg {
            boundaries[label - 1].push((x, y));
        }
    }

    accs.iter()
        .zip(boundaries)
        .filter(|(acc, _)| acc.area >= min_area && acc.area > 0)
        .map(|(acc, boundary)| Region {
            area: acc.area,
            bounding_rect: BoundingRect {
                x: acc.min_x,
                y: acc.min_y,
                width: acc.max_x - acc.min_x + 1,
                height: acc.max_y - acc.min_y + 1,
            },
            boundary,
        })
        .collect()
}

fn neighbors4(x: u32, y: u32, w: u32, h: u32) -> Vec<(u32, u32)> {
    let mut out = Vec::with_capacity(4);
    if x > 0 {
        out.push((x - 1, y));
    }
    if y > 0 {
        out.push((x, y - 1));
    }
    if x + 1 < w {
        out.push((x + 1, y));
    }
    if y + 1 < h {
        out.push((x, y + 1));
    }
    out
}

/// Boundary overlay color (legacy display drew contours in blue).
pub const BOUNDARY_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
/// Numeric label color (legacy display wrote ids in yellow).
pub const LABEL_COLOR: Rgb<u8> = Rgb([255, 255, 0]);

/// Draw each region's outer boundary and a sequential 1-based id near its
/// bounding-box top-left corner onto an independent copy of `base`.
pub fn annotate(base: &RgbImage, regions: &[Region]) -> RgbImage {
    let mut out = base.clone();
    for (i, region) in regions.iter().enumerate() {
        for &(x, y) in &region.boundary {
            out.put_pixel(x, y, BOUNDARY_COLOR);
        }
        let rect = region.bounding_rect;
        let label_y = rect.y.saturating_sub(GLYPH_H + 1);
        draw_number(&mut out, i as u32 + 1, rect.x, label_y);
    }
    out
}

const GLYPH_W: u32 = 3;
const GLYPH_H: u32 = 5;

// 3x5 digit glyphs, one 3-bit row per entry, MSB on the left. Embedded so
// the overlay needs no font asset.
const DIGIT_GLYPHS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111], // 0
    [0b010, 0b110, 0b010, 0b010, 0b111], // 1
    [0b111, 0b001, 0b111, 0b100, 0b111], // 2
    [0b111, 0b001, 0b111, 0b001, 0b111], // 3
    [0b101, 0b101, 0b111, 0b001, 0b001], // 4
    [0b111, 0b100, 0b111, 0b001, 0b111], // 5
    [0b111, 0b100, 0b111, 0b101, 0b111], // 6
    [0b111, 0b001, 0b010, 0b010, 0b010], // 7
    [0b111, 0b101, 0b111, 0b101, 0b111], // 8
    [0b111, 0b101, 0b111, 0b001, 0b111], // 9
];

fn draw_number(image: &mut RgbImage, value: u32, x: u32, y: u32) {
    let digits: Vec<u8> = {
        let mut v = value;
        let mut out = Vec::new();
        loop {
            out.push((v % 10) as u8);
            v /= 10;
            if v == 0 {
                break;
            }
        }
        out.reverse();
        out
    };
    let (w, h) = image.dimensions();
    for (i, &digit) in digits.iter().enumerate() {
        let gx = x + i as u32 * (GLYPH_W + 1);
        for (row, bits) in DIGIT_GLYPHS[digit as usize].iter().enumerate() {
            for col in 0..GLYPH_W {
                if bits >> (GLYPH_W - 1 - col) & 1 == 1 {
                    let px = gx + col;
                    let py = y + row as u32;
                    if px < w && py < h {
                        image.put_pixel(px, py, LABEL_COLOR);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{fill_block, mask_with_block};

    #[test]
    fn empty_mask_yields_no_regions() {
        let mask = GrayImage::new(32, 32);
        assert!(extract_regions(&mask, 10).is_empty());
    }

    #[test]
    fn min_area_discards_small_blob() {
        let mut mask = GrayImage::new(40, 40);
        fill_block(&mut mask, 2, 2, 5, 1, 255); // area 5
        fill_block(&mut mask, 20, 20, 10, 5, 255); // area 50
        let regions = extract_regions(&mask, 10);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].area, 50);
        assert_eq!(
            regions[0].bounding_rect,
            BoundingRect {
                x: 20,
                y: 20,
                width: 10,
                height: 5
            }
        );
    }

    #[test]
    fn regions_come_out_in_raster_discovery_order() {
        let mut mask = GrayImage::new(60, 60);
        fill_block(&mut mask, 40, 2, 6, 6, 255); // first row-wise
        fill_block(&mut mask, 2, 30, 6, 6, 255);
        fill_block(&mut mask, 30, 50, 6, 6, 255);
        let regions = extract_regions(&mask, 1);
        assert_eq!(regions.len(), 3);
        assert_eq!(regions[0].bounding_rect.y, 2);
        assert_eq!(regions[1].bounding_rect.y, 30);
        assert_eq!(regions[2].bounding_rect.y, 50);
    }

    #[test]
    fn diagonal_pixels_form_one_region() {
        let mut mask = GrayImage::new(10, 10);
        mask.put_pixel(2, 2, Luma([255]));
        mask.put_pixel(3, 3, Luma([255]));
        mask.put_pixel(4, 4, Luma([255]));
        let regions = extract_regions(&mask, 1);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].area, 3);
    }

    #[test]
    fn donut_area_includes_enclosed_hole() {
        // 10x10 block with a 4x4 hole: filled area is still 100.
        let mut mask = GrayImage::new(30, 30);
        fill_block(&mut mask, 5, 5, 10, 10, 255);
        fill_block(&mut mask, 8, 8, 4, 4, 0);
        let regions = extract_regions(&mask, 1);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].area, 100);
        assert_eq!(regions[0].bounding_rect.width, 10);
        assert_eq!(regions[0].bounding_rect.height, 10);
    }

    #[test]
    fn donut_boundary_is_external_only() {
        let mut mask = GrayImage::new(30, 30);
        fill_block(&mut mask, 5, 5, 10, 10, 255);
        fill_block(&mut mask, 8, 8, 4, 4, 0);
        let regions = extract_regions(&mask, 1);
        let boundary = &regions[0].boundary;
        // The hole rim pixel (7, 8) touches only hole background.
        assert!(!boundary.contains(&(7, 8)));
        // Outer corner and edges are on the external boundary.
        assert!(boundary.contains(&(5, 5)));
        assert!(boundary.contains(&(14, 10)));
        assert_eq!(boundary.len(), 36, "10x10 perimeter");
    }

    #[test]
    fn region_touching_frame_edge_is_bounded() {
        let mut mask = GrayImage::new(20, 20);
        fill_block(&mut mask, 0, 0, 5, 5, 255);
        let regions = extract_regions(&mask, 1);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].area, 25);
        assert!(regions[0].boundary.contains(&(0, 0)));
    }

    #[test]
    fn severity_threshold_is_strict() {
        assert_eq!(classify(499, 500), Severity::Warning);
        assert_eq!(classify(500, 500), Severity::Warning);
        assert_eq!(classify(501, 500), Severity::Critical);
    }

    #[test]
    fn annotate_leaves_base_untouched_and_draws_overlay() {
        let mask = mask_with_block(40, 40, 10, 12, 8, 8);
        let regions = extract_regions(&mask, 1);
        let base = RgbImage::new(40, 40);
        let before = base.clone();

        let annotated = annotate(&base, &regions);
        assert_eq!(base.as_raw(), before.as_raw(), "base must not be mutated");
        assert_eq!(*annotated.get_pixel(10, 12), BOUNDARY_COLOR);
        // The id glyph sits just above the bounding box.
        let label_pixels = annotated
            .enumerate_pixels()
            .filter(|(_, _, p)| **p == LABEL_COLOR)
            .count();
        assert!(label_pixels > 0, "id label must be drawn");
    }

    #[test]
    fn annotate_clips_labels_at_frame_top() {
        // Region at the very top: the label row is clamped into the frame.
        let mask = mask_with_block(20, 20, 3, 0, 5, 5);
        let regions = extract_regions(&mask, 1);
        let base = RgbImage::new(20, 20);
        let _ = annotate(&base, &regions); // must not panic
    }

    #[test]
    fn multi_digit_ids_render() {
        let mut img = RgbImage::new(30, 10);
        draw_number(&mut img, 12, 1, 1);
        let lit = img.pixels().filter(|p| **p == LABEL_COLOR).count();
        // "1" lights 8 pixels, "2" lights 11.
        assert_eq!(lit, 19);
    }
}
