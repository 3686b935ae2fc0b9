use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::analysis::AnalyzerConfig;
use crate::annotate::AnnotationStyle;
use crate::preprocessing::PreprocessConfig;
use crate::symmetry::{DetectorConfig, RegionConfig, ScoreWeights, SymmetryThresholds};

/// Main configuration structure for Symmetry Vision
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Detection thresholds
    #[serde(default)]
    pub thresholds: ThresholdsConfig,
    /// Score aggregation weights
    #[serde(default)]
    pub weights: WeightsConfig,
    /// Rotational symmetry sampling
    #[serde(default)]
    pub radial: RadialConfig,
    /// Blur, edge and resize parameters
    #[serde(default)]
    pub preprocessing: PreprocessingConfig,
    /// Contour region extraction
    #[serde(default)]
    pub regions: RegionsConfig,
    /// Annotated image rendering
    #[serde(default)]
    pub annotation: AnnotationConfig,
    /// Result URL prefixes
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThresholdsConfig {
    /// Vertical mirror threshold (default: 0.85)
    pub vertical: Option<f64>,
    /// Horizontal mirror threshold (default: 0.85)
    pub horizontal: Option<f64>,
    /// Threshold for each diagonal (default: 0.75)
    pub diagonal: Option<f64>,
    /// Rotational similarity threshold (default: 0.70)
    pub radial: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeightsConfig {
    /// Default: 1.5
    pub vertical: Option<f64>,
    /// Default: 1.5
    pub horizontal: Option<f64>,
    /// Default: 1.2
    pub radial: Option<f64>,
    /// Applied per diagonal (default: 1.0)
    pub diagonal: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RadialConfig {
    /// Number of evenly spaced rotations, 0 degrees skipped (default: 8)
    pub samples: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreprocessingConfig {
    /// Gaussian kernel size, odd (default: 5)
    pub blur_kernel: Option<u32>,
    /// Canny low threshold (default: 50)
    pub canny_low: Option<f32>,
    /// Canny high threshold (default: 150)
    pub canny_high: Option<f32>,
    /// Model input width (default: 224)
    pub model_input_width: Option<u32>,
    /// Model input height (default: 224)
    pub model_input_height: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegionsConfig {
    /// Minimum contour area in square pixels (default: 100)
    pub min_area: Option<f64>,
    /// Maximum regions reported (default: 5)
    pub max_regions: Option<usize>,
    /// Confidence assigned to each region (default: 0.8)
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotationConfig {
    /// Axis colour as [r, g, b] (default: [255, 0, 0])
    pub color: Option<[u8; 3]>,
    /// Line thickness in pixels (default: 3)
    pub thickness: Option<u32>,
    /// Label height in pixels (default: 20)
    pub label_scale: Option<f32>,
    /// TTF/OTF font replacing the bundled label font
    pub font_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Prefix of source image URLs (default: "/uploads")
    pub uploads_url_prefix: Option<String>,
    /// Prefix of annotated image URLs (default: "/results")
    pub results_url_prefix: Option<String>,
}

impl Config {
    /// Configuration with every default written out, for `init-config`
    pub fn with_defaults() -> Self {
        Self::from_analyzer_config(&AnalyzerConfig::default())
    }

    fn from_analyzer_config(a: &AnalyzerConfig) -> Self {
        let t = &a.detector.thresholds;
        let p = &a.preprocessing;
        let r = &a.detector.regions;
        Self {
            thresholds: ThresholdsConfig {
                vertical: Some(t.vertical),
                horizontal: Some(t.horizontal),
                diagonal: Some(t.diagonal),
                radial: Some(t.radial),
            },
            weights: WeightsConfig {
                vertical: Some(a.weights.vertical),
                horizontal: Some(a.weights.horizontal),
                radial: Some(a.weights.radial),
                diagonal: Some(a.weights.diagonal),
            },
            radial: RadialConfig {
                samples: Some(a.detector.radial_samples),
            },
            preprocessing: PreprocessingConfig {
                blur_kernel: Some(p.blur_kernel),
                canny_low: Some(p.canny_low),
                canny_high: Some(p.canny_high),
                model_input_width: Some(p.model_input.0),
                model_input_height: Some(p.model_input.1),
            },
            regions: RegionsConfig {
                min_area: Some(r.min_area),
                max_regions: Some(r.max_regions),
                confidence: Some(r.confidence),
            },
            annotation: AnnotationConfig {
                color: Some(a.annotation.color),
                thickness: Some(a.annotation.thickness),
                label_scale: Some(a.annotation.label_scale),
                font_path: None,
            },
            output: OutputConfig {
                uploads_url_prefix: Some(a.uploads_url_prefix.clone()),
                results_url_prefix: Some(a.results_url_prefix.clone()),
            },
        }
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml_edit::de::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_string = toml_edit::ser::to_string_pretty(self)
            .context("Failed to serialize configuration to TOML")?;

        std::fs::write(&path, toml_string)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Merge configuration with command line arguments, prioritizing CLI values
    pub fn merge_with_cli(
        &mut self,
        vertical_threshold: Option<f64>,
        diagonal_threshold: Option<f64>,
        radial_threshold: Option<f64>,
        radial_samples: Option<u32>,
    ) {
        // The vertical flag sets both mirror axes
        if let Some(threshold) = vertical_threshold {
            self.thresholds.vertical = Some(threshold);
            self.thresholds.horizontal = Some(threshold);
        }

        if let Some(threshold) = diagonal_threshold {
            self.thresholds.diagonal = Some(threshold);
        }

        if let Some(threshold) = radial_threshold {
            self.thresholds.radial = Some(threshold);
        }

        if let Some(samples) = radial_samples {
            self.radial.samples = Some(samples);
        }
    }

    /// Get the effective detector configuration with defaults applied
    pub fn get_detector_config(&self) -> DetectorConfig {
        let defaults = DetectorConfig::default();
        let t = &self.thresholds;
        let r = &self.regions;
        DetectorConfig {
            thresholds: SymmetryThresholds {
                vertical: t.vertical.unwrap_or(defaults.thresholds.vertical),
                horizontal: t.horizontal.unwrap_or(defaults.thresholds.horizontal),
                diagonal: t.diagonal.unwrap_or(defaults.thresholds.diagonal),
                radial: t.radial.unwrap_or(defaults.thresholds.radial),
            },
            radial_samples: self.radial.samples.unwrap_or(defaults.radial_samples),
            regions: RegionConfig {
                min_area: r.min_area.unwrap_or(defaults.regions.min_area),
                max_regions: r.max_regions.unwrap_or(defaults.regions.max_regions),
                confidence: r.confidence.unwrap_or(defaults.regions.confidence),
            },
        }
    }

    pub fn get_weights(&self) -> ScoreWeights {
        let defaults = ScoreWeights::default();
        ScoreWeights {
            vertical: self.weights.vertical.unwrap_or(defaults.vertical),
            horizontal: self.weights.horizontal.unwrap_or(defaults.horizontal),
            radial: self.weights.radial.unwrap_or(defaults.radial),
            diagonal: self.weights.diagonal.unwrap_or(defaults.diagonal),
        }
    }

    pub fn get_preprocess_config(&self) -> PreprocessConfig {
        let defaults = PreprocessConfig::default();
        let p = &self.preprocessing;
        PreprocessConfig {
            blur_kernel: p.blur_kernel.unwrap_or(defaults.blur_kernel),
            canny_low: p.canny_low.unwrap_or(defaults.canny_low),
            canny_high: p.canny_high.unwrap_or(defaults.canny_high),
            model_input: (
                p.model_input_width.unwrap_or(defaults.model_input.0),
                p.model_input_height.unwrap_or(defaults.model_input.1),
            ),
        }
    }

    pub fn get_annotation_style(&self) -> AnnotationStyle {
        let defaults = AnnotationStyle::default();
        AnnotationStyle {
            color: self.annotation.color.unwrap_or(defaults.color),
            thickness: self.annotation.thickness.unwrap_or(defaults.thickness),
            label_scale: self.annotation.label_scale.unwrap_or(defaults.label_scale),
        }
    }

    pub fn get_font_path(&self) -> Option<&str> {
        self.annotation.font_path.as_deref()
    }

    /// Build the typed analyzer configuration
    pub fn to_analyzer_config(&self) -> AnalyzerConfig {
        let defaults = AnalyzerConfig::default();
        AnalyzerConfig {
            detector: self.get_detector_config(),
            weights: self.get_weights(),
            preprocessing: self.get_preprocess_config(),
            annotation: self.get_annotation_style(),
            uploads_url_prefix: self
                .output
                .uploads_url_prefix
                .clone()
                .unwrap_or(defaults.uploads_url_prefix),
            results_url_prefix: self
                .output
                .results_url_prefix
                .clone()
                .unwrap_or(defaults.results_url_prefix),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.to_analyzer_config()
            .validate()
            .context("Invalid analysis settings")?;

        if let Some(ref font_path) = self.annotation.font_path {
            let path = Path::new(font_path);
            if !path.is_file() {
                return Err(anyhow::anyhow!("Label font does not exist: {}", font_path));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        let analyzer = config.to_analyzer_config();
        assert_eq!(analyzer, AnalyzerConfig::default());
        assert_eq!(analyzer.detector.thresholds.vertical, 0.85);
        assert_eq!(analyzer.detector.thresholds.diagonal, 0.75);
        assert_eq!(analyzer.detector.thresholds.radial, 0.70);
        assert_eq!(analyzer.detector.radial_samples, 8);
        assert_eq!(analyzer.preprocessing.blur_kernel, 5);
        assert_eq!(analyzer.preprocessing.model_input, (224, 224));
        assert_eq!(config.get_font_path(), None);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::with_defaults();
        let toml_string = toml_edit::ser::to_string_pretty(&config).unwrap();

        // Should contain all major sections
        assert!(toml_string.contains("[thresholds]"));
        assert!(toml_string.contains("[weights]"));
        assert!(toml_string.contains("[radial]"));
        assert!(toml_string.contains("[preprocessing]"));
        assert!(toml_string.contains("[regions]"));

        // Parse back
        let parsed: Config = toml_edit::de::from_str(&toml_string).unwrap();
        assert_eq!(parsed.to_analyzer_config(), config.to_analyzer_config());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let parsed: Config = toml_edit::de::from_str(
            r#"
            [thresholds]
            radial = 0.6

            [preprocessing]
            canny_low = 30.0
            "#,
        )
        .unwrap();

        let analyzer = parsed.to_analyzer_config();
        assert_eq!(analyzer.detector.thresholds.radial, 0.6);
        assert_eq!(analyzer.detector.thresholds.vertical, 0.85);
        assert_eq!(analyzer.preprocessing.canny_low, 30.0);
        assert_eq!(analyzer.preprocessing.canny_high, 150.0);
        assert_eq!(analyzer.weights, ScoreWeights::default());
    }

    #[test]
    fn test_config_merge_with_cli() {
        let mut config = Config::default();

        config.merge_with_cli(Some(0.9), Some(0.6), None, Some(12));

        let detector = config.get_detector_config();
        assert_eq!(detector.thresholds.vertical, 0.9);
        assert_eq!(detector.thresholds.horizontal, 0.9);
        assert_eq!(detector.thresholds.diagonal, 0.6);
        assert_eq!(detector.thresholds.radial, 0.70);
        assert_eq!(detector.radial_samples, 12);
    }

    #[test]
    fn test_config_file_operations() {
        let mut config = Config::with_defaults();
        config.weights.radial = Some(2.0);
        let temp_file = NamedTempFile::new().unwrap();

        // Save to file
        config.to_file(temp_file.path()).unwrap();

        // Load from file
        let loaded_config = Config::from_file(temp_file.path()).unwrap();
        assert_eq!(loaded_config.get_weights().radial, 2.0);
        assert_eq!(
            loaded_config.to_analyzer_config(),
            config.to_analyzer_config()
        );
    }

    #[test]
    fn test_config_validation_rejects_even_kernel() {
        let mut config = Config::default();
        config.preprocessing.blur_kernel = Some(4);

        let result = config.validate();
        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("blur kernel"));
    }

    #[test]
    fn test_config_validation_missing_font() {
        let mut config = Config::default();
        config.annotation.font_path = Some("/nonexistent/font.ttf".to_string());

        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Label font does not exist"));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = Config::from_file("/nonexistent/symmetry.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/symmetry.toml"));
    }
}
