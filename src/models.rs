use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Orientation of a reflective symmetry axis.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisType {
    Vertical,
    Horizontal,
    MainDiagonal,
    AntiDiagonal,
}

impl AxisType {
    /// Emission order of axes in an analysis result.
    pub const ALL: [AxisType; 4] = [
        AxisType::Vertical,
        AxisType::Horizontal,
        AxisType::MainDiagonal,
        AxisType::AntiDiagonal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AxisType::Vertical => "vertical",
            AxisType::Horizontal => "horizontal",
            AxisType::MainDiagonal => "main_diagonal",
            AxisType::AntiDiagonal => "anti_diagonal",
        }
    }

    /// Angle of the axis line in degrees.
    pub fn angle_degrees(&self) -> f64 {
        match self {
            AxisType::Vertical => 90.0,
            AxisType::Horizontal => 0.0,
            AxisType::MainDiagonal => 45.0,
            AxisType::AntiDiagonal => 135.0,
        }
    }
}

impl fmt::Display for AxisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Axis endpoints in image pixel space.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisCoordinates {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl AxisCoordinates {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

/// A detected reflective symmetry axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymmetryAxis {
    #[serde(rename = "type")]
    pub axis_type: AxisType,
    #[serde(rename = "angle")]
    pub angle_degrees: f64,
    pub confidence: f64,
    pub coordinates: AxisCoordinates,
}

impl SymmetryAxis {
    pub fn new(axis_type: AxisType, confidence: f64, coordinates: AxisCoordinates) -> Self {
        Self {
            axis_type,
            angle_degrees: axis_type.angle_degrees(),
            confidence,
            coordinates,
        }
    }

    /// Annotation label, e.g. `vertical (0.97)`.
    pub fn label(&self) -> String {
        format!("{} ({:.2})", self.axis_type, self.confidence)
    }
}

/// A bounded sub-area flagged as locally symmetric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymmetryRegion {
    pub region_id: usize,
    #[serde(rename = "type")]
    pub region_type: String,
    pub center: (f64, f64),
    pub confidence: f64,
}

/// Complete result of one analysis call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis_id: String,
    pub original_image_url: String,
    pub processed_image_url: String,
    /// Overall score in [0, 100]
    pub symmetry_score: f64,
    pub detected_axes: Vec<SymmetryAxis>,
    pub detected_regions: Vec<SymmetryRegion>,
    pub has_vertical_symmetry: bool,
    pub has_horizontal_symmetry: bool,
    pub has_radial_symmetry: bool,
    /// Wall-clock seconds spent in the analysis
    pub processing_time: f64,
    pub timestamp: DateTime<Utc>,
}
