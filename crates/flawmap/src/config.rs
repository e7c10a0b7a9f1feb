//! Analysis configuration.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Tunable parameters of one analysis run.
///
/// Defaults reproduce the legacy processing chain: 5x5 median smoothing,
/// 11x11 closing, a 10 px minimum region area, and a 500 px severity
/// threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Median smoothing window (positive odd integer).
    pub smooth_kernel: u32,
    /// Morphological closing element size (positive integer).
    pub close_kernel: u32,
    /// Regions below this pixel area are discarded as noise.
    pub min_area: u64,
    /// Pixel area strictly above which a region is classified critical.
    pub severity_threshold: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            smooth_kernel: 5,
            close_kernel: 11,
            min_area: 10,
            severity_threshold: 500,
        }
    }
}

impl AnalysisConfig {
    /// Check kernel constraints up front so a bad configuration fails before
    /// any stage runs.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.smooth_kernel == 0 || self.smooth_kernel % 2 == 0 {
            return Err(AnalysisError::InvalidKernel {
                size: self.smooth_kernel,
                reason: "smoothing kernel must be a positive odd integer",
            });
        }
        if self.close_kernel == 0 {
            return Err(AnalysisError::InvalidKernel {
                size: self.close_kernel,
                reason: "closing kernel must be positive",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_legacy_processing_chain() {
        let cfg = AnalysisConfig::default();
        assert_eq!(cfg.smooth_kernel, 5);
        assert_eq!(cfg.close_kernel, 11);
        assert_eq!(cfg.min_area, 10);
        assert_eq!(cfg.severity_threshold, 500);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_kernels() {
        let mut cfg = AnalysisConfig {
            smooth_kernel: 4,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(AnalysisError::InvalidKernel { size: 4, .. })
        ));

        cfg.smooth_kernel = 5;
        cfg.close_kernel = 0;
        assert!(matches!(
            cfg.validate(),
            Err(AnalysisError::InvalidKernel { size: 0, .. })
        ));
    }

    #[test]
    fn config_round_trips_through_serde() {
        let cfg = AnalysisConfig {
            smooth_kernel: 3,
            close_kernel: 7,
            min_area: 25,
            severity_threshold: 800,
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: AnalysisConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: AnalysisConfig = serde_json::from_str("{\"min_area\": 4}").unwrap();
        assert_eq!(cfg.min_area, 4);
        assert_eq!(cfg.smooth_kernel, 5);
    }
}
