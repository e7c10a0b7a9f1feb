//! Band-to-color lookup table and false-color preview rendering.
//!
//! The table maps each of the 256 intensity levels to the display color of
//! the band it falls in. Band membership is right-inclusive and
//! left-exclusive (`start < v <= end`), except level 0 which belongs to the
//! first band. The preview produced here is purely cosmetic: it never feeds
//! the mask pipeline, but it is the base image the annotator draws on.

use image::{GrayImage, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainSet, IntensityDomain};

/// Display color assigned to a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandColor {
    Black,
    Red,
    Green,
    Gray,
    /// Arbitrary RGB triple.
    Rgb([u8; 3]),
}

impl BandColor {
    /// Concrete pixel value for this color.
    pub fn to_rgb(self) -> Rgb<u8> {
        match self {
            BandColor::Black => Rgb([0, 0, 0]),
            BandColor::Red => Rgb([255, 0, 0]),
            BandColor::Green => Rgb([0, 255, 0]),
            BandColor::Gray => Rgb([128, 128, 128]),
            BandColor::Rgb(rgb) => Rgb(rgb),
        }
    }
}

/// Precomputed intensity-level to color mapping.
pub type LookupTable = [Rgb<u8>; 256];

/// Build the level-to-color table for a domain set.
///
/// `color_of` supplies the display color per band. Levels below the global
/// minimum take the first band's color, levels above the global maximum the
/// last band's.
pub fn build_lookup_table(
    set: &DomainSet,
    color_of: impl Fn(&IntensityDomain) -> BandColor,
) -> LookupTable {
    let domains = set.domains();
    let mut table = [Rgb([0u8; 3]); 256];
    for (level, entry) in table.iter_mut().enumerate() {
        let v = level as f64;
        let domain = domains
            .iter()
            .find(|d| v > d.start && v <= d.end)
            .unwrap_or_else(|| {
                if v <= domains[0].end {
                    &domains[0]
                } else {
                    &domains[domains.len() - 1]
                }
            });
        *entry = color_of(domain).to_rgb();
    }
    table
}

/// Map a grayscale image through the table into a false-color preview.
pub fn apply_lut(gray: &GrayImage, table: &LookupTable) -> RgbImage {
    let (w, h) = gray.dimensions();
    let mut out = RgbImage::new(w, h);
    for (src, dst) in gray.pixels().zip(out.pixels_mut()) {
        *dst = table[src[0] as usize];
    }
    out
}

/// Grayscale identity table: every level maps to its own gray value.
///
/// Used as the annotation base when no band coloring is requested, matching
/// the plain normalized-gray background of the legacy display.
pub fn grayscale_table() -> LookupTable {
    let mut table = [Rgb([0u8; 3]); 256];
    for (level, entry) in table.iter_mut().enumerate() {
        let g = level as u8;
        *entry = Rgb([g, g, g]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_band_set(th_low: f64, th_high: f64) -> DomainSet {
        let mut set = DomainSet::full_byte_range();
        set.insert_boundary(th_low).unwrap();
        set.insert_boundary(th_high).unwrap();
        set
    }

    fn color_by_index(d: &IntensityDomain) -> BandColor {
        match d.index {
            1 => BandColor::Black,
            2 => BandColor::Red,
            _ => BandColor::Green,
        }
    }

    #[test]
    fn table_respects_right_inclusive_convention() {
        let set = three_band_set(50.0, 180.0);
        let table = build_lookup_table(&set, color_by_index);

        assert_eq!(table[0], BandColor::Black.to_rgb());
        assert_eq!(table[50], BandColor::Black.to_rgb());
        assert_eq!(table[51], BandColor::Red.to_rgb());
        assert_eq!(table[180], BandColor::Red.to_rgb());
        assert_eq!(table[181], BandColor::Green.to_rgb());
        assert_eq!(table[255], BandColor::Green.to_rgb());
    }

    #[test]
    fn table_matches_legacy_three_band_rule_at_every_level() {
        let (th_low, th_high) = (90.0, 200.0);
        let set = three_band_set(th_low, th_high);
        let table = build_lookup_table(&set, color_by_index);

        for level in 0..256usize {
            let expected = if level as f64 <= th_low {
                BandColor::Black
            } else if level as f64 <= th_high {
                BandColor::Red
            } else {
                BandColor::Green
            };
            assert_eq!(table[level], expected.to_rgb(), "level {}", level);
        }
    }

    #[test]
    fn single_domain_colors_everything() {
        let set = DomainSet::full_byte_range();
        let table = build_lookup_table(&set, |_| BandColor::Gray);
        assert!(table.iter().all(|&c| c == BandColor::Gray.to_rgb()));
    }

    #[test]
    fn narrow_domain_set_clamps_outside_levels() {
        // Domains cover [40, 90] only; levels outside clamp to the end bands.
        let mut set = DomainSet::new(40.0, 90.0);
        set.insert_boundary(60.0).unwrap();
        let table = build_lookup_table(&set, |d| {
            if d.index == 1 {
                BandColor::Red
            } else {
                BandColor::Green
            }
        });
        assert_eq!(table[0], BandColor::Red.to_rgb());
        assert_eq!(table[40], BandColor::Red.to_rgb());
        assert_eq!(table[61], BandColor::Green.to_rgb());
        assert_eq!(table[255], BandColor::Green.to_rgb());
    }

    #[test]
    fn apply_lut_maps_pixels_through_table() {
        let set = three_band_set(100.0, 200.0);
        let table = build_lookup_table(&set, color_by_index);

        let mut gray = GrayImage::new(3, 1);
        gray.put_pixel(0, 0, image::Luma([40]));
        gray.put_pixel(1, 0, image::Luma([150]));
        gray.put_pixel(2, 0, image::Luma([230]));

        let rgb = apply_lut(&gray, &table);
        assert_eq!(*rgb.get_pixel(0, 0), BandColor::Black.to_rgb());
        assert_eq!(*rgb.get_pixel(1, 0), BandColor::Red.to_rgb());
        assert_eq!(*rgb.get_pixel(2, 0), BandColor::Green.to_rgb());
    }

    #[test]
    fn grayscale_table_is_identity() {
        let table = grayscale_table();
        assert_eq!(table[0], Rgb([0, 0, 0]));
        assert_eq!(table[127], Rgb([127, 127, 127]));
        assert_eq!(table[255], Rgb([255, 255, 255]));
    }
}
