//! Symmetry detectors, region extraction and score aggregation.

pub mod radial;
pub mod reflective;
pub mod regions;
pub mod score;

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::models::{AxisCoordinates, AxisType, SymmetryAxis};

pub use radial::{detect_radial, RadialDetection};
pub use reflective::{detect_diagonals, detect_horizontal, detect_vertical};
pub use regions::{find_regions, RegionConfig};
pub use score::{aggregate_score, overall_score, ScoreComponent, ScoreWeights};

/// Outcome of one reflective symmetry test.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisDetection {
    pub axis_type: AxisType,
    pub detected: bool,
    /// Confidence in [0, 1]; 0.0 for degenerate splits
    pub confidence: f64,
    /// `None` when the split was degenerate
    pub coordinates: Option<AxisCoordinates>,
}

impl AxisDetection {
    pub(crate) fn degenerate(axis_type: AxisType) -> Self {
        Self {
            axis_type,
            detected: false,
            confidence: 0.0,
            coordinates: None,
        }
    }

    /// The axis record for a detected symmetry.
    pub fn to_axis(&self) -> Option<SymmetryAxis> {
        match (self.detected, self.coordinates) {
            (true, Some(coords)) => Some(SymmetryAxis::new(self.axis_type, self.confidence, coords)),
            _ => None,
        }
    }
}

/// Minimum confidence for each symmetry type to count as detected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymmetryThresholds {
    pub vertical: f64,
    pub horizontal: f64,
    pub diagonal: f64,
    pub radial: f64,
}

impl Default for SymmetryThresholds {
    fn default() -> Self {
        Self {
            vertical: 0.85,
            horizontal: 0.85,
            diagonal: 0.75,
            radial: 0.70,
        }
    }
}

/// Detector tuning shared by every backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    pub thresholds: SymmetryThresholds,
    /// Rotations sampled by the radial test, including the skipped 0 degrees
    pub radial_samples: u32,
    pub regions: RegionConfig,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            thresholds: SymmetryThresholds::default(),
            radial_samples: 8,
            regions: RegionConfig::default(),
        }
    }
}

/// Every detector's raw outcome for one raster.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetryDetections {
    pub vertical: AxisDetection,
    pub horizontal: AxisDetection,
    /// Main diagonal first, then anti-diagonal
    pub diagonals: [AxisDetection; 2],
    pub radial: RadialDetection,
}

impl SymmetryDetections {
    /// Reflective results in emission order.
    pub fn axes(&self) -> [&AxisDetection; 4] {
        [
            &self.vertical,
            &self.horizontal,
            &self.diagonals[0],
            &self.diagonals[1],
        ]
    }

    /// Axes whose detected flag is set, in emission order.
    pub fn detected_axes(&self) -> Vec<SymmetryAxis> {
        self.axes().iter().filter_map(|d| d.to_axis()).collect()
    }

    /// Weighted score over the detected components.
    pub fn score(&self, weights: &ScoreWeights) -> f64 {
        let mut components = vec![
            ScoreComponent::new(self.vertical.confidence, weights.vertical, self.vertical.detected),
            ScoreComponent::new(
                self.horizontal.confidence,
                weights.horizontal,
                self.horizontal.detected,
            ),
            ScoreComponent::new(self.radial.confidence, weights.radial, self.radial.detected),
        ];
        components.extend(
            self.diagonals
                .iter()
                .map(|d| ScoreComponent::new(d.confidence, weights.diagonal, d.detected)),
        );
        aggregate_score(&components)
    }
}

/// A strategy that scores a grayscale raster for every symmetry type.
///
/// The analyzer only depends on this trait, so another scoring backend can
/// be swapped in without changing its contract.
pub trait SymmetryBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn detect(&self, gray: &GrayImage, config: &DetectorConfig) -> SymmetryDetections;
}

/// Classical mirror-correlation and rotation-difference detectors.
#[derive(Debug, Default, Clone, Copy)]
pub struct CorrelationBackend;

impl SymmetryBackend for CorrelationBackend {
    fn name(&self) -> &'static str {
        "classical-correlation"
    }

    fn detect(&self, gray: &GrayImage, config: &DetectorConfig) -> SymmetryDetections {
        let thresholds = &config.thresholds;

        let vertical = detect_vertical(gray, thresholds.vertical);
        tracing::debug!(
            "↔️ Vertical symmetry: {:.4} (detected: {})",
            vertical.confidence,
            vertical.detected
        );

        let horizontal = detect_horizontal(gray, thresholds.horizontal);
        tracing::debug!(
            "↕️ Horizontal symmetry: {:.4} (detected: {})",
            horizontal.confidence,
            horizontal.detected
        );

        let diagonals = detect_diagonals(gray, thresholds.diagonal);
        tracing::debug!(
            "↘️ Diagonal symmetry: main {:.4}, anti {:.4}",
            diagonals[0].confidence,
            diagonals[1].confidence
        );

        let radial = detect_radial(gray, config.radial_samples, thresholds.radial);
        tracing::debug!(
            "🔄 Radial symmetry: {:.4} (detected: {})",
            radial.confidence,
            radial.detected
        );

        SymmetryDetections {
            vertical,
            horizontal,
            diagonals,
            radial,
        }
    }
}
