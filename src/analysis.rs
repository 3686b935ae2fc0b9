//! Analysis orchestration: runs every detector over one image, aggregates
//! the score, extracts regions and renders the annotated copy.
//!
//! The analyzer holds only read-only configuration, so one instance can be
//! shared across threads; each call works on its own buffers.

use std::time::Instant;

use chrono::Utc;
use image::{DynamicImage, GenericImageView, RgbImage};
use serde::{Deserialize, Serialize};

use crate::annotate::{AnnotationStyle, Annotator};
use crate::error::{ensure_non_empty, Result, SymmetryError};
use crate::models::{AnalysisResult, AxisCoordinates, AxisType, SymmetryRegion};
use crate::preprocessing::{self, PreprocessConfig};
use crate::symmetry::{
    find_regions, AxisDetection, CorrelationBackend, DetectorConfig, ScoreWeights,
    SymmetryBackend, SymmetryDetections,
};

/// Score an image needs to count as symmetric when the caller has no
/// stricter requirement.
pub const DEFAULT_MIN_SCORE: f64 = 70.0;

/// Everything the analyzer can be tuned with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub detector: DetectorConfig,
    pub weights: ScoreWeights,
    pub preprocessing: PreprocessConfig,
    pub annotation: AnnotationStyle,
    pub uploads_url_prefix: String,
    pub results_url_prefix: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            detector: DetectorConfig::default(),
            weights: ScoreWeights::default(),
            preprocessing: PreprocessConfig::default(),
            annotation: AnnotationStyle::default(),
            uploads_url_prefix: "/uploads".to_string(),
            results_url_prefix: "/results".to_string(),
        }
    }
}

impl AnalyzerConfig {
    /// Check every tunable is inside its valid range.
    pub fn validate(&self) -> Result<()> {
        let t = &self.detector.thresholds;
        for (name, value) in [
            ("vertical", t.vertical),
            ("horizontal", t.horizontal),
            ("diagonal", t.diagonal),
            ("radial", t.radial),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SymmetryError::InvalidParameter(format!(
                    "{} threshold must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        let w = &self.weights;
        for (name, value) in [
            ("vertical", w.vertical),
            ("horizontal", w.horizontal),
            ("radial", w.radial),
            ("diagonal", w.diagonal),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SymmetryError::InvalidParameter(format!(
                    "{} weight must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if self.detector.radial_samples == 0 {
            return Err(SymmetryError::InvalidParameter(
                "radial sample count must be at least 1".to_string(),
            ));
        }

        let p = &self.preprocessing;
        if p.blur_kernel == 0 || p.blur_kernel % 2 == 0 {
            return Err(SymmetryError::InvalidParameter(format!(
                "blur kernel must be odd and positive, got {}",
                p.blur_kernel
            )));
        }
        if p.canny_low < 0.0 || p.canny_low > p.canny_high {
            return Err(SymmetryError::InvalidParameter(format!(
                "Canny thresholds must satisfy 0 <= low <= high, got {}/{}",
                p.canny_low, p.canny_high
            )));
        }
        if p.model_input.0 == 0 || p.model_input.1 == 0 {
            return Err(SymmetryError::InvalidParameter(format!(
                "model input size must be non-zero, got {}x{}",
                p.model_input.0, p.model_input.1
            )));
        }
        if self.detector.regions.min_area < 0.0 {
            return Err(SymmetryError::InvalidParameter(
                "region minimum area must be non-negative".to_string(),
            ));
        }

        Ok(())
    }
}

/// Result of one analysis call plus the annotated raster for the caller to persist.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub result: AnalysisResult,
    /// Same dimensions as the input
    pub annotated: RgbImage,
}

/// Raw state of one reflective component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentResult {
    pub detected: bool,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<AxisCoordinates>,
}

impl From<&AxisDetection> for ComponentResult {
    fn from(d: &AxisDetection) -> Self {
        Self {
            detected: d.detected,
            confidence: d.confidence,
            coordinates: d.coordinates,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagonalResult {
    #[serde(rename = "type")]
    pub axis_type: AxisType,
    pub detected: bool,
    pub confidence: f64,
    pub coordinates: Option<AxisCoordinates>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialResult {
    pub detected: bool,
    pub confidence: f64,
}

/// Every component's outcome and the overall score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymmetryBreakdown {
    pub vertical: ComponentResult,
    pub horizontal: ComponentResult,
    /// Detected diagonals only
    pub diagonal: Vec<DiagonalResult>,
    pub radial: RadialResult,
    pub overall_score: f64,
}

impl SymmetryBreakdown {
    fn from_detections(detections: &SymmetryDetections, weights: &ScoreWeights) -> Self {
        Self {
            vertical: (&detections.vertical).into(),
            horizontal: (&detections.horizontal).into(),
            diagonal: detections
                .diagonals
                .iter()
                .filter(|d| d.detected)
                .map(|d| DiagonalResult {
                    axis_type: d.axis_type,
                    detected: d.detected,
                    confidence: d.confidence,
                    coordinates: d.coordinates,
                })
                .collect(),
            radial: RadialResult {
                detected: detections.radial.detected,
                confidence: detections.radial.confidence,
            },
            overall_score: detections.score(weights),
        }
    }

    /// Name of the component with the highest raw confidence.
    ///
    /// Vertical, horizontal and radial are always candidates, diagonals only
    /// when detected. Earlier candidates win ties; `None` when every
    /// confidence is zero.
    pub fn dominant_symmetry(&self) -> Option<String> {
        let mut candidates: Vec<(String, f64)> = vec![
            ("vertical".to_string(), self.vertical.confidence),
            ("horizontal".to_string(), self.horizontal.confidence),
            ("radial".to_string(), self.radial.confidence),
        ];
        candidates.extend(
            self.diagonal
                .iter()
                .map(|d| (d.axis_type.to_string(), d.confidence)),
        );

        let mut best: Option<(String, f64)> = None;
        for (name, confidence) in candidates {
            if best.as_ref().is_none_or(|(_, c)| confidence > *c) {
                best = Some((name, confidence));
            }
        }

        best.filter(|(_, c)| *c > 0.0).map(|(name, _)| name)
    }
}

/// Vertical and horizontal tests only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickCheck {
    pub has_symmetry: bool,
    pub vertical_confidence: f64,
    pub horizontal_confidence: f64,
    /// Mean of both confidences on a 0-100 scale
    pub quick_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoreSymmetric {
    First,
    Second,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymmetryComparison {
    pub first_score: f64,
    pub second_score: f64,
    pub difference: f64,
    /// Ties go to the second image
    pub more_symmetric: MoreSymmetric,
}

/// Outcome for one image of a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    pub image_index: usize,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<SymmetryBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItem {
    pub fn failed(image_index: usize, error: String) -> Self {
        Self {
            image_index,
            success: false,
            breakdown: None,
            error: Some(error),
        }
    }
}

/// Runs the detector suite over images.
#[derive(Debug, Clone)]
pub struct SymmetryAnalyzer<B: SymmetryBackend = CorrelationBackend> {
    config: AnalyzerConfig,
    backend: B,
    annotator: Annotator,
}

impl SymmetryAnalyzer<CorrelationBackend> {
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        Self::with_backend(config, CorrelationBackend)
    }
}

impl<B: SymmetryBackend> SymmetryAnalyzer<B> {
    pub fn with_backend(config: AnalyzerConfig, backend: B) -> Result<Self> {
        config.validate()?;
        let annotator = Annotator::new(config.annotation.clone());
        Ok(Self {
            config,
            backend,
            annotator,
        })
    }

    /// Replace the annotator, e.g. with one that has a label font.
    pub fn with_annotator(mut self, annotator: Annotator) -> Self {
        self.annotator = annotator;
        self
    }

    /// Raw detector outcomes for one image.
    pub fn detect(&self, image: &DynamicImage) -> Result<SymmetryDetections> {
        let gray = preprocessing::grayscale(image)?;
        Ok(self.backend.detect(&gray, &self.config.detector))
    }

    /// Every component's outcome plus the overall score.
    pub fn detect_all(&self, image: &DynamicImage) -> Result<SymmetryBreakdown> {
        let detections = self.detect(image)?;
        Ok(SymmetryBreakdown::from_detections(
            &detections,
            &self.config.weights,
        ))
    }

    /// Contour regions of the image's edge map.
    pub fn find_regions(&self, image: &DynamicImage) -> Result<Vec<SymmetryRegion>> {
        let gray = preprocessing::grayscale(image)?;
        let p = &self.config.preprocessing;
        let edges = preprocessing::edges(&gray, p.canny_low, p.canny_high)?;
        Ok(find_regions(&edges, &self.config.detector.regions))
    }

    /// Full analysis of one image.
    pub fn analyze(&self, image: &DynamicImage, analysis_id: &str) -> Result<AnalysisOutput> {
        let start_time = Instant::now();
        let (width, height) = image.dimensions();
        ensure_non_empty(width, height)?;

        tracing::debug!(
            "🔍 Analyzing {} ({}x{}) with {} backend",
            analysis_id,
            width,
            height,
            self.backend.name()
        );

        let gray = preprocessing::grayscale(image)?;
        let detections = self.backend.detect(&gray, &self.config.detector);
        let detected_axes = detections.detected_axes();

        let p = &self.config.preprocessing;
        let edges = preprocessing::edges(&gray, p.canny_low, p.canny_high)?;
        let detected_regions = find_regions(&edges, &self.config.detector.regions);

        let symmetry_score = detections.score(&self.config.weights);

        let annotated = self.annotator.annotate(&image.to_rgb8(), &detected_axes);

        let processing_time = start_time.elapsed().as_secs_f64();
        tracing::info!(
            "✅ Analysis {} complete: score {:.2}, {} axes, {} regions in {:.3}s",
            analysis_id,
            symmetry_score,
            detected_axes.len(),
            detected_regions.len(),
            processing_time
        );

        let result = AnalysisResult {
            analysis_id: analysis_id.to_string(),
            original_image_url: format!("{}/{}", self.config.uploads_url_prefix, analysis_id),
            processed_image_url: format!(
                "{}/{}_analyzed.jpg",
                self.config.results_url_prefix, analysis_id
            ),
            symmetry_score,
            detected_axes,
            detected_regions,
            has_vertical_symmetry: detections.vertical.detected,
            has_horizontal_symmetry: detections.horizontal.detected,
            has_radial_symmetry: detections.radial.detected,
            processing_time,
            timestamp: Utc::now(),
        };

        Ok(AnalysisOutput { result, annotated })
    }

    /// Vertical and horizontal tests only.
    pub fn quick_check(&self, image: &DynamicImage) -> Result<QuickCheck> {
        use crate::symmetry::{detect_horizontal, detect_vertical};

        let gray = preprocessing::grayscale(image)?;
        let t = &self.config.detector.thresholds;
        let vertical = detect_vertical(&gray, t.vertical);
        let horizontal = detect_horizontal(&gray, t.horizontal);

        Ok(QuickCheck {
            has_symmetry: vertical.detected || horizontal.detected,
            vertical_confidence: vertical.confidence,
            horizontal_confidence: horizontal.confidence,
            quick_score: (vertical.confidence + horizontal.confidence) / 2.0 * 100.0,
        })
    }

    /// Compare the overall scores of two images.
    pub fn compare(&self, first: &DynamicImage, second: &DynamicImage) -> Result<SymmetryComparison> {
        let first_score = self.detect_all(first)?.overall_score;
        let second_score = self.detect_all(second)?.overall_score;

        Ok(SymmetryComparison {
            first_score,
            second_score,
            difference: (first_score - second_score).abs(),
            more_symmetric: if first_score > second_score {
                MoreSymmetric::First
            } else {
                MoreSymmetric::Second
            },
        })
    }

    /// Whether the overall score reaches `min_score` (0-100), usually
    /// [`DEFAULT_MIN_SCORE`].
    pub fn meets_threshold(&self, image: &DynamicImage, min_score: f64) -> Result<bool> {
        Ok(self.detect_all(image)?.overall_score >= min_score)
    }

    pub fn dominant_symmetry(&self, image: &DynamicImage) -> Result<Option<String>> {
        Ok(self.detect_all(image)?.dominant_symmetry())
    }

    /// Score one image of a batch. Failures become an error entry.
    pub fn batch_item(&self, image_index: usize, image: &DynamicImage) -> BatchItem {
        match self.detect_all(image) {
            Ok(breakdown) => BatchItem {
                image_index,
                success: true,
                breakdown: Some(breakdown),
                error: None,
            },
            Err(e) => {
                tracing::warn!("❌ Batch image {} failed: {}", image_index, e);
                BatchItem::failed(image_index, e.to_string())
            }
        }
    }

    /// Analyze images one after another. A failing image yields an error
    /// entry and the batch carries on.
    pub fn analyze_batch(&self, images: &[DynamicImage]) -> Vec<BatchItem> {
        images
            .iter()
            .enumerate()
            .map(|(image_index, image)| self.batch_item(image_index, image))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb};

    fn analyzer() -> SymmetryAnalyzer {
        SymmetryAnalyzer::new(AnalyzerConfig::default()).unwrap()
    }

    fn vertical_mirror(width: u32, height: u32) -> DynamicImage {
        let rgb = RgbImage::from_fn(width, height, |x, y| {
            let xl = if x < width / 2 { x } else { width - 1 - x };
            Rgb([(xl * 7 % 256) as u8, ((xl * y) % 256) as u8, (y * 5 % 256) as u8])
        });
        DynamicImage::ImageRgb8(rgb)
    }

    #[test]
    fn test_config_validation() {
        assert!(AnalyzerConfig::default().validate().is_ok());

        let mut config = AnalyzerConfig::default();
        config.detector.thresholds.radial = 1.5;
        assert!(matches!(
            config.validate(),
            Err(SymmetryError::InvalidParameter(_))
        ));

        let mut config = AnalyzerConfig::default();
        config.preprocessing.blur_kernel = 6;
        assert!(config.validate().is_err());

        let mut config = AnalyzerConfig::default();
        config.weights.radial = -1.0;
        assert!(config.validate().is_err());

        let mut config = AnalyzerConfig::default();
        config.detector.radial_samples = 0;
        assert!(SymmetryAnalyzer::new(config).is_err());
    }

    #[test]
    fn test_analyze_vertical_mirror() {
        let image = vertical_mirror(80, 60);
        let output = analyzer().analyze(&image, "mirror").unwrap();
        let result = &output.result;

        assert!(result.has_vertical_symmetry);
        assert_eq!(result.detected_axes[0].axis_type, AxisType::Vertical);
        assert!(result.detected_axes[0].confidence >= 0.85);
        assert!(result.symmetry_score > 0.0 && result.symmetry_score <= 100.0);
        assert_eq!(output.annotated.dimensions(), (80, 60));
        assert_eq!(result.original_image_url, "/uploads/mirror");
        assert_eq!(result.processed_image_url, "/results/mirror_analyzed.jpg");
        assert!(result.processing_time >= 0.0);
    }

    #[test]
    fn test_analyze_rejects_empty_image() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(0, 10));
        assert!(matches!(
            analyzer().analyze(&image, "empty"),
            Err(SymmetryError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_single_pixel_scores_zero() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(1, 1));
        let output = analyzer().analyze(&image, "dot").unwrap();
        assert_eq!(output.result.symmetry_score, 0.0);
        assert!(output.result.detected_axes.is_empty());
        assert!(!output.result.has_radial_symmetry);
        assert!(output.result.detected_regions.is_empty());
    }

    #[test]
    fn test_quick_check() {
        let image = vertical_mirror(40, 40);
        let quick = analyzer().quick_check(&image).unwrap();
        assert!(quick.has_symmetry);
        let expected = (quick.vertical_confidence + quick.horizontal_confidence) / 2.0 * 100.0;
        assert!((quick.quick_score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_compare_prefers_symmetric_image() {
        let symmetric = DynamicImage::ImageLuma8(GrayImage::from_fn(48, 48, |x, y| {
            let xl = x.min(47 - x);
            let yl = y.min(47 - y);
            Luma([(xl * 5 + yl * 5) as u8])
        }));
        let ramp = DynamicImage::ImageLuma8(GrayImage::from_fn(48, 48, |x, y| {
            Luma([((x * 5 + y * 3) % 256) as u8])
        }));

        let comparison = analyzer().compare(&symmetric, &ramp).unwrap();
        assert_eq!(comparison.more_symmetric, MoreSymmetric::First);
        assert!(
            (comparison.difference - (comparison.first_score - comparison.second_score).abs())
                .abs()
                < 1e-12
        );

        let tie = analyzer().compare(&symmetric, &symmetric).unwrap();
        assert_eq!(tie.more_symmetric, MoreSymmetric::Second);
        assert_eq!(tie.difference, 0.0);
    }

    #[test]
    fn test_dominant_symmetry() {
        let breakdown = SymmetryBreakdown {
            vertical: ComponentResult {
                detected: true,
                confidence: 0.9,
                coordinates: None,
            },
            horizontal: ComponentResult {
                detected: false,
                confidence: 0.4,
                coordinates: None,
            },
            diagonal: vec![DiagonalResult {
                axis_type: AxisType::AntiDiagonal,
                detected: true,
                confidence: 0.95,
                coordinates: None,
            }],
            radial: RadialResult {
                detected: true,
                confidence: 0.9,
            },
            overall_score: 90.0,
        };
        assert_eq!(breakdown.dominant_symmetry(), Some("anti_diagonal".to_string()));

        let mut tied = breakdown.clone();
        tied.diagonal.clear();
        // Vertical comes before radial when confidences tie
        assert_eq!(tied.dominant_symmetry(), Some("vertical".to_string()));

        let zero = SymmetryBreakdown {
            vertical: ComponentResult {
                detected: false,
                confidence: 0.0,
                coordinates: None,
            },
            horizontal: ComponentResult {
                detected: false,
                confidence: 0.0,
                coordinates: None,
            },
            diagonal: vec![],
            radial: RadialResult {
                detected: false,
                confidence: 0.0,
            },
            overall_score: 0.0,
        };
        assert_eq!(zero.dominant_symmetry(), None);
    }

    #[test]
    fn test_meets_threshold() {
        let analyzer = analyzer();
        let image = vertical_mirror(40, 40);
        let score = analyzer.detect_all(&image).unwrap().overall_score;
        assert!(analyzer.meets_threshold(&image, score).unwrap());
        assert!(!analyzer.meets_threshold(&image, score + 0.01).unwrap());

        let ramp = DynamicImage::ImageLuma8(GrayImage::from_fn(40, 40, |x, y| {
            Luma([((x * 5 + y * 3) % 256) as u8])
        }));
        let ramp_score = analyzer.detect_all(&ramp).unwrap().overall_score;
        assert_eq!(
            analyzer.meets_threshold(&ramp, DEFAULT_MIN_SCORE).unwrap(),
            ramp_score >= DEFAULT_MIN_SCORE
        );
    }

    #[test]
    fn test_batch_reports_failures_in_place() {
        let images = vec![
            vertical_mirror(20, 20),
            DynamicImage::ImageRgb8(RgbImage::new(10, 0)),
            vertical_mirror(30, 16),
        ];
        let items = analyzer().analyze_batch(&images);

        assert_eq!(items.len(), 3);
        assert!(items[0].success && items[0].breakdown.is_some());
        assert!(!items[1].success);
        assert!(items[1].error.as_deref().unwrap_or("").contains("Invalid image"));
        assert_eq!(items[2].image_index, 2);
        assert!(items[2].success);
    }

    #[test]
    fn test_breakdown_lists_detected_diagonals_only() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_fn(40, 40, |x, _| {
            Luma([(x * 6) as u8])
        }));
        let breakdown = analyzer().detect_all(&image).unwrap();
        assert!(breakdown.diagonal.iter().all(|d| d.detected));
    }
}
