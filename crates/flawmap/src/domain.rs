//! Adjustable intensity-band partition of the grayscale range.
//!
//! A [`DomainSet`] is an ordered list of contiguous, non-overlapping bands
//! that exhaustively covers `[global_min, global_max]`. The interior edges
//! between bands are the draggable markers of the histogram view: inserting
//! a boundary splits a band in two, moving a boundary mutates the shared
//! edge of the two adjacent bands in one step so no gap or overlap is ever
//! observable.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// One contiguous intensity band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityDomain {
    /// Lower bound. Equals the previous domain's `end`, or the global minimum
    /// for the first domain.
    pub start: f64,
    /// Upper bound. Equals the next domain's `start`, or the global maximum
    /// for the last domain.
    pub end: f64,
    /// Whether pixels in this band are treated as suspect.
    pub flagged: bool,
    /// 1-based position in the ordered sequence. Re-numbered after every
    /// structural change.
    pub index: usize,
}

impl IntensityDomain {
    /// Width of the band in intensity units.
    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    /// Whether `value` falls in the inclusive range `[start, end]`.
    ///
    /// This is the legacy range-threshold membership used by the mask
    /// builder; the lookup table uses the right-inclusive convention instead
    /// (see [`crate::lut::build_lookup_table`]).
    pub fn contains(&self, value: f64) -> bool {
        value >= self.start && value <= self.end
    }
}

/// Ordered, exhaustive band partition of `[global_min, global_max]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainSet {
    global_min: f64,
    global_max: f64,
    domains: Vec<IntensityDomain>,
}

impl DomainSet {
    /// Create a partition with exactly one unflagged domain spanning the full
    /// range. Non-finite or degenerate ranges are widened to one unit, the
    /// same guard the histogram view applies to flat images.
    pub fn new(global_min: f64, global_max: f64) -> Self {
        let (lo, hi) = normalize_range(global_min, global_max);
        Self {
            global_min: lo,
            global_max: hi,
            domains: vec![IntensityDomain {
                start: lo,
                end: hi,
                flagged: false,
                index: 1,
            }],
        }
    }

    /// Full-byte-range partition, the common case for 8-bit working images.
    pub fn full_byte_range() -> Self {
        Self::new(0.0, 255.0)
    }

    /// Global minimum of the partition.
    pub fn global_min(&self) -> f64 {
        self.global_min
    }

    /// Global maximum of the partition.
    pub fn global_max(&self) -> f64 {
        self.global_max
    }

    /// Domains in ascending order.
    pub fn domains(&self) -> &[IntensityDomain] {
        &self.domains
    }

    /// Number of domains.
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    /// A domain set always holds at least one domain.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Interior boundary positions in ascending order. Boundary `k` separates
    /// domain `k` from domain `k + 1`.
    pub fn boundaries(&self) -> Vec<f64> {
        self.domains[..self.domains.len() - 1]
            .iter()
            .map(|d| d.end)
            .collect()
    }

    /// Domains currently flagged as suspect.
    pub fn flagged(&self) -> impl Iterator<Item = &IntensityDomain> {
        self.domains.iter().filter(|d| d.flagged)
    }

    /// Split the domain containing `position` into two.
    ///
    /// Both halves come out unflagged; the caller re-flags bands afterwards.
    /// Fails with [`AnalysisError::InvalidBoundary`] when `position` is
    /// outside the open global range or coincides with an existing boundary.
    /// On failure the set is unchanged.
    pub fn insert_boundary(&mut self, position: f64) -> Result<(), AnalysisError> {
        if !position.is_finite() {
            return Err(AnalysisError::InvalidBoundary {
                position,
                reason: "position is not finite",
            });
        }
        if position <= self.global_min || position >= self.global_max {
            return Err(AnalysisError::InvalidBoundary {
                position,
                reason: "position outside the open global range",
            });
        }
        if self.boundaries().iter().any(|&b| b == position) {
            return Err(AnalysisError::InvalidBoundary {
                position,
                reason: "position coincides with an existing boundary",
            });
        }

        // The range checks above guarantee a containing domain exists.
        let split_at = self
            .domains
            .iter()
            .position(|d| position > d.start && position < d.end)
            .expect("position is strictly inside the covered range");

        let right_end = self.domains[split_at].end;
        self.domains[split_at].end = position;
        self.domains[split_at].flagged = false;
        self.domains.insert(
            split_at + 1,
            IntensityDomain {
                start: position,
                end: right_end,
                flagged: false,
                index: 0,
            },
        );
        self.renumber();
        Ok(())
    }

    /// Move interior boundary `boundary_index` to `new_position`, mutating the
    /// `end` of the domain on its left and the `start` of the domain on its
    /// right together.
    ///
    /// Fails with [`AnalysisError::OrderViolation`] when the new position
    /// would not stay strictly between the neighboring boundaries (or the
    /// global extremes). On failure the set is unchanged.
    pub fn move_boundary(
        &mut self,
        boundary_index: usize,
        new_position: f64,
    ) -> Result<(), AnalysisError> {
        if boundary_index + 1 >= self.domains.len() {
            return Err(AnalysisError::OrderViolation {
                index: boundary_index,
                position: new_position,
            });
        }
        let left_start = self.domains[boundary_index].start;
        let right_end = self.domains[boundary_index + 1].end;
        if !new_position.is_finite() || new_position <= left_start || new_position >= right_end {
            return Err(AnalysisError::OrderViolation {
                index: boundary_index,
                position: new_position,
            });
        }

        self.domains[boundary_index].end = new_position;
        self.domains[boundary_index + 1].start = new_position;
        Ok(())
    }

    /// Set the suspect flag of the domain at `domain_index` (0-based).
    pub fn set_flag(&mut self, domain_index: usize, flagged: bool) -> Result<(), AnalysisError> {
        let domain = self
            .domains
            .get_mut(domain_index)
            .ok_or(AnalysisError::DomainIndex(domain_index))?;
        domain.flagged = flagged;
        Ok(())
    }

    fn renumber(&mut self) {
        for (i, d) in self.domains.iter_mut().enumerate() {
            d.index = i + 1;
        }
    }
}

fn normalize_range(min: f64, max: f64) -> (f64, f64) {
    let mut lo = if min.is_finite() { min } else { 0.0 };
    let mut hi = if max.is_finite() { max } else { 255.0 };
    if lo > hi {
        std::mem::swap(&mut lo, &mut hi);
    }
    if (hi - lo).abs() < 1e-9 {
        hi = lo + 1.0;
    }
    (lo, hi)
}
