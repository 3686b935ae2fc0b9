use image::GrayImage;

use super::reflective::rotate_about_center;

/// Outcome of the rotational symmetry test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialDetection {
    pub detected: bool,
    /// Mean per-angle similarity in [0, 1]
    pub confidence: f64,
}

impl RadialDetection {
    fn degenerate() -> Self {
        Self {
            detected: false,
            confidence: 0.0,
        }
    }
}

fn mean_abs_diff(a: &GrayImage, b: &GrayImage) -> f64 {
    let total: u64 = a
        .as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(&pa, &pb)| pa.abs_diff(pb) as u64)
        .sum();
    total as f64 / a.as_raw().len() as f64
}

/// Rotational symmetry about the image centre.
///
/// The raster is rotated by each multiple of `360 / num_angles` degrees
/// except zero; each rotation scores `1 - mean_abs_diff / 255` against the
/// original and the scores are averaged. Rasters under 2x2 and fewer than
/// two samples report zero confidence.
pub fn detect_radial(gray: &GrayImage, num_angles: u32, threshold: f64) -> RadialDetection {
    let (width, height) = gray.dimensions();
    if width < 2 || height < 2 || num_angles < 2 {
        tracing::debug!(
            "⚠️ Radial test skipped for {}x{} raster with {} samples",
            width,
            height,
            num_angles
        );
        return RadialDetection::degenerate();
    }

    let step = 360.0 / num_angles as f64;
    let similarities: Vec<f64> = (1..num_angles)
        .map(|i| {
            let rotated = rotate_about_center(gray, i as f64 * step);
            1.0 - mean_abs_diff(gray, &rotated) / 255.0
        })
        .collect();

    let confidence = (similarities.iter().sum::<f64>() / similarities.len() as f64).clamp(0.0, 1.0);

    RadialDetection {
        detected: confidence >= threshold,
        confidence,
    }
}
