//! Real-valued source frames and their statistics.
//!
//! Radiograph data arrives as physical samples (dose, thickness, ...) rather
//! than display bytes; dead detector cells show up as NaN and are excluded
//! from every statistic. The pipeline itself works on an 8-bit normalized
//! view produced once per analysis; resolution metadata converts pixel areas
//! into physical units for reporting.

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Physical resolution metadata: units per pixel along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub x: f64,
    pub y: f64,
}

impl Default for Resolution {
    fn default() -> Self {
        Self { x: 1.0, y: 1.0 }
    }
}

impl Resolution {
    /// Physical area of one pixel.
    pub fn pixel_area(&self) -> f64 {
        self.x * self.y
    }
}

/// One histogram bin over the raw value range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: u64,
    /// Share of all finite samples, in percent.
    pub percent: f64,
}

/// Immutable 2D grid of real-valued samples with resolution metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    width: u32,
    height: u32,
    data: Vec<f64>,
    resolution: Resolution,
}

impl SourceImage {
    /// Wrap a row-major sample buffer. Returns `None` when the buffer length
    /// does not match `width * height` or either dimension is zero.
    pub fn new(width: u32, height: u32, data: Vec<f64>, resolution: Resolution) -> Option<Self> {
        if width == 0 || height == 0 || data.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
            resolution,
        })
    }

    /// Promote an 8-bit grayscale image to a real-valued frame.
    pub fn from_gray(image: &GrayImage, resolution: Resolution) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.pixels().map(|p| p[0] as f64).collect(),
            resolution,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Sample at `(x, y)`; NaN marks a dead cell.
    pub fn get(&self, x: u32, y: u32) -> f64 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Minimum and maximum over finite samples, or `None` when every sample
    /// is NaN.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        let mut bounds: Option<(f64, f64)> = None;
        for &v in &self.data {
            if !v.is_finite() {
                continue;
            }
            bounds = Some(match bounds {
                None => (v, v),
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
            });
        }
        bounds
    }

    /// Bin the finite samples into `bins` equal-width bins over the observed
    /// value range, with per-bin percentage weights. Empty for all-NaN frames
    /// or `bins == 0`.
    pub fn histogram_bins(&self, bins: usize) -> Vec<HistogramBin> {
        let Some((min, max)) = self.min_max() else {
            return Vec::new();
        };
        if bins == 0 {
            return Vec::new();
        }
        let span = if (max - min).abs() < 1e-9 {
            1.0
        } else {
            max - min
        };

        let mut counts = vec![0u64; bins];
        let mut total = 0u64;
        for &v in &self.data {
            if !v.is_finite() {
                continue;
            }
            let bin = (((v - min) / span) * bins as f64) as usize;
            counts[bin.min(bins - 1)] += 1;
            total += 1;
        }

        counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| {
                let width = span / bins as f64;
                HistogramBin {
                    start: min + width * i as f64,
                    end: min + width * (i + 1) as f64,
                    count,
                    percent: count as f64 / total as f64 * 100.0,
                }
            })
            .collect()
    }

    /// 256-level histogram of the normalized 8-bit view.
    pub fn histogram256(&self) -> [u64; 256] {
        let mut counts = [0u64; 256];
        if let Ok(gray) = self.to_gray() {
            for p in gray.pixels() {
                counts[p[0] as usize] += 1;
            }
        }
        counts
    }

    /// Normalize the finite value range onto `[0, 255]`; NaN cells map to 0.
    ///
    /// Fails with [`AnalysisError::EmptyImage`] when no finite sample exists.
    pub fn to_gray(&self) -> Result<GrayImage, AnalysisError> {
        let (min, max) = self.min_max().ok_or(AnalysisError::EmptyImage)?;
        let span = if (max - min).abs() < 1e-9 {
            1.0
        } else {
            max - min
        };
        let mut out = GrayImage::new(self.width, self.height);
        for (&v, dst) in self.data.iter().zip(out.pixels_mut()) {
            if v.is_finite() {
                let level = ((v - min) / span * 255.0).round().clamp(0.0, 255.0);
                dst[0] = level as u8;
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_mismatched_buffer() {
        assert!(SourceImage::new(4, 4, vec![0.0; 15], Resolution::default()).is_none());
        assert!(SourceImage::new(0, 4, vec![], Resolution::default()).is_none());
        assert!(SourceImage::new(4, 4, vec![0.0; 16], Resolution::default()).is_some());
    }

    #[test]
    fn min_max_ignores_nan() {
        let data = vec![3.0, f64::NAN, -1.5, 7.25];
        let src = SourceImage::new(2, 2, data, Resolution::default()).unwrap();
        assert_eq!(src.min_max(), Some((-1.5, 7.25)));
    }

    #[test]
    fn all_nan_frame_has_no_statistics() {
        let src = SourceImage::new(2, 2, vec![f64::NAN; 4], Resolution::default()).unwrap();
        assert_eq!(src.min_max(), None);
        assert!(src.histogram_bins(10).is_empty());
        assert!(matches!(src.to_gray(), Err(AnalysisError::EmptyImage)));
    }

    #[test]
    fn to_gray_normalizes_full_range() {
        let data = vec![10.0, 20.0, 30.0, f64::NAN];
        let src = SourceImage::new(2, 2, data, Resolution::default()).unwrap();
        let gray = src.to_gray().unwrap();
        assert_eq!(gray.get_pixel(0, 0)[0], 0);
        assert_eq!(gray.get_pixel(1, 0)[0], 128);
        assert_eq!(gray.get_pixel(0, 1)[0], 255);
        assert_eq!(gray.get_pixel(1, 1)[0], 0, "NaN maps to 0");
    }

    #[test]
    fn flat_frame_normalizes_without_dividing_by_zero() {
        let src = SourceImage::new(2, 2, vec![5.0; 4], Resolution::default()).unwrap();
        let gray = src.to_gray().unwrap();
        assert!(gray.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn histogram_bins_weight_in_percent() {
        let data = vec![0.0, 0.0, 10.0, 10.0];
        let src = SourceImage::new(2, 2, data, Resolution::default()).unwrap();
        let bins = src.histogram_bins(2);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].count, 2);
        assert_eq!(bins[1].count, 2);
        assert!((bins[0].percent - 50.0).abs() < 1e-9);
        assert_eq!((bins[0].start, bins[1].end), (0.0, 10.0));
    }

    #[test]
    fn from_gray_round_trips_dimensions() {
        let gray = GrayImage::new(7, 3);
        let src = SourceImage::from_gray(&gray, Resolution { x: 0.2, y: 0.5 });
        assert_eq!((src.width(), src.height()), (7, 3));
        assert!((src.resolution().pixel_area() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn histogram256_counts_every_pixel() {
        let data = vec![0.0, 255.0, 255.0, 128.0];
        let src = SourceImage::new(2, 2, data, Resolution::default()).unwrap();
        let counts = src.histogram256();
        assert_eq!(counts[0], 1);
        assert_eq!(counts[255], 2);
        assert_eq!(counts.iter().sum::<u64>(), 4);
    }
}
