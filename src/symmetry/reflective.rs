//! Mirror-symmetry detectors.
//!
//! Each detector splits the grayscale raster into two equal halves, mirrors
//! one across the split and scores the pair with a normalized
//! cross-correlation mapped from [-1, 1] onto [0, 1].

use image::imageops::FilterType;
use image::{GrayImage, Luma};
use imageproc::geometric_transformations::{rotate, Interpolation};

use crate::models::{AxisCoordinates, AxisType};

use super::AxisDetection;

/// Guard added to the standard deviation before dividing.
const STD_EPSILON: f64 = 1e-10;

/// Normalized cross-correlation of two equally sized samples.
///
/// Both samples are z-scored independently and the mean of their
/// elementwise product is returned. Two flat samples correlate at 1.0 when
/// their levels match and at 0.0 otherwise. Returns `None` for empty or
/// mismatched input.
pub fn normalized_cross_correlation(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.is_empty() || a.len() != b.len() {
        return None;
    }

    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;
    let std_a = (a.iter().map(|v| (v - mean_a).powi(2)).sum::<f64>() / n).sqrt();
    let std_b = (b.iter().map(|v| (v - mean_b).powi(2)).sum::<f64>() / n).sqrt();

    if std_a <= STD_EPSILON && std_b <= STD_EPSILON {
        return Some(if (mean_a - mean_b).abs() <= STD_EPSILON {
            1.0
        } else {
            0.0
        });
    }

    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(va, vb)| ((va - mean_a) / (std_a + STD_EPSILON)) * ((vb - mean_b) / (std_b + STD_EPSILON)))
        .sum();

    Some(sum / n)
}

/// Map a correlation in [-1, 1] to a confidence in [0, 1].
pub fn correlation_to_confidence(correlation: f64) -> f64 {
    ((correlation + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// Left half against the mirrored right half. `None` when a half is empty.
fn left_right_correlation(gray: &GrayImage) -> Option<f64> {
    let (width, height) = gray.dimensions();
    let mid = width / 2;
    if mid == 0 || height == 0 {
        return None;
    }

    let mut left = Vec::with_capacity((mid * height) as usize);
    let mut mirrored = Vec::with_capacity((mid * height) as usize);
    for y in 0..height {
        for x in 0..mid {
            left.push(gray.get_pixel(x, y)[0] as f64);
            mirrored.push(gray.get_pixel(2 * mid - 1 - x, y)[0] as f64);
        }
    }

    normalized_cross_correlation(&left, &mirrored)
}

/// Top half against the mirrored bottom half. `None` when a half is empty.
fn top_bottom_correlation(gray: &GrayImage) -> Option<f64> {
    let (width, height) = gray.dimensions();
    let mid = height / 2;
    if mid == 0 || width == 0 {
        return None;
    }

    let mut top = Vec::with_capacity((mid * width) as usize);
    let mut mirrored = Vec::with_capacity((mid * width) as usize);
    for y in 0..mid {
        for x in 0..width {
            top.push(gray.get_pixel(x, y)[0] as f64);
            mirrored.push(gray.get_pixel(x, 2 * mid - 1 - y)[0] as f64);
        }
    }

    normalized_cross_correlation(&top, &mirrored)
}

fn from_correlation(
    axis_type: AxisType,
    correlation: Option<f64>,
    threshold: f64,
    coordinates: AxisCoordinates,
) -> AxisDetection {
    match correlation {
        Some(corr) if corr.is_finite() => {
            let confidence = correlation_to_confidence(corr);
            AxisDetection {
                axis_type,
                detected: confidence >= threshold,
                confidence,
                coordinates: Some(coordinates),
            }
        }
        _ => {
            tracing::warn!("⚠️ Degenerate {} split, reporting zero confidence", axis_type);
            AxisDetection::degenerate(axis_type)
        }
    }
}

/// Mirror symmetry about the vertical line at column `width / 2`.
pub fn detect_vertical(gray: &GrayImage, threshold: f64) -> AxisDetection {
    let (width, height) = gray.dimensions();
    let mid = (width / 2) as f64;
    from_correlation(
        AxisType::Vertical,
        left_right_correlation(gray),
        threshold,
        AxisCoordinates::new(mid, 0.0, mid, height as f64),
    )
}

/// Mirror symmetry about the horizontal line at row `height / 2`.
pub fn detect_horizontal(gray: &GrayImage, threshold: f64) -> AxisDetection {
    let (width, height) = gray.dimensions();
    let mid = (height / 2) as f64;
    from_correlation(
        AxisType::Horizontal,
        top_bottom_correlation(gray),
        threshold,
        AxisCoordinates::new(0.0, mid, width as f64, mid),
    )
}

/// Rotate a square raster clockwise about its pixel-grid centre, keeping its size.
pub(crate) fn rotate_about_center(gray: &GrayImage, degrees: f64) -> GrayImage {
    let (width, height) = gray.dimensions();
    let center = (
        (width as f32 - 1.0) / 2.0,
        (height as f32 - 1.0) / 2.0,
    );
    rotate(
        gray,
        center,
        (degrees as f32).to_radians(),
        Interpolation::Bilinear,
        Luma([0]),
    )
}

/// Mirror symmetry about both diagonals, main first.
///
/// The raster is squashed to a square of side `min(width, height)` and
/// rotated so the diagonal under test lies on the vertical split line
/// (45 degrees for the main diagonal, 135 for the anti-diagonal).
/// Coordinates are reported corner to corner in the original raster.
pub fn detect_diagonals(gray: &GrayImage, threshold: f64) -> [AxisDetection; 2] {
    let (width, height) = gray.dimensions();
    let (w, h) = (width as f64, height as f64);
    let main_coords = AxisCoordinates::new(0.0, 0.0, w, h);
    let anti_coords = AxisCoordinates::new(w, 0.0, 0.0, h);

    let size = width.min(height);
    if size < 2 {
        return [
            from_correlation(AxisType::MainDiagonal, None, threshold, main_coords),
            from_correlation(AxisType::AntiDiagonal, None, threshold, anti_coords),
        ];
    }

    let square = if width == height {
        gray.clone()
    } else {
        image::imageops::resize(gray, size, size, FilterType::Triangle)
    };

    let main = left_right_correlation(&rotate_about_center(&square, 45.0));
    let anti = left_right_correlation(&rotate_about_center(&square, 135.0));

    [
        from_correlation(AxisType::MainDiagonal, main, threshold, main_coords),
        from_correlation(AxisType::AntiDiagonal, anti, threshold, anti_coords),
    ]
}
