//! Pure image-to-image transforms used by the symmetry detectors.
//!
//! Every public function rejects empty rasters with
//! [`SymmetryError::InvalidImage`]; nothing here mutates its input.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage};
use imageproc::hog::{hog, HogOptions};
use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_empty, Result, SymmetryError};

/// Side of the square raster HOG features are computed on.
const FEATURE_SIDE: u32 = 128;

/// Tuning for the preprocessing stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Gaussian kernel size, odd
    pub blur_kernel: u32,
    pub canny_low: f32,
    pub canny_high: f32,
    /// Target (width, height) for model-input pipelines
    pub model_input: (u32, u32),
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            blur_kernel: 5,
            canny_low: 50.0,
            canny_high: 150.0,
            model_input: (224, 224),
        }
    }
}

/// Resized and normalized pixels ready for a model backend.
#[derive(Debug, Clone)]
pub struct ModelInput {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    /// Row-major, interleaved channels, values in [0, 1]
    pub data: Vec<f32>,
}

/// The standard set of derived rasters for one image.
#[derive(Debug, Clone)]
pub struct SymmetryMap {
    pub grayscale: GrayImage,
    pub edges: GrayImage,
    pub blurred: GrayImage,
    pub dimensions: (u32, u32),
}

/// Convert to a single-channel luma raster. Single-channel input is returned as is.
pub fn grayscale(image: &DynamicImage) -> Result<GrayImage> {
    let (width, height) = image.dimensions();
    ensure_non_empty(width, height)?;

    Ok(match image {
        DynamicImage::ImageLuma8(gray) => gray.clone(),
        other => other.to_luma8(),
    })
}

/// Gaussian sigma OpenCV derives for a kernel size when none is given.
fn sigma_for_kernel(kernel_size: u32) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Gaussian smoothing with an odd kernel size.
pub fn blur(image: &GrayImage, kernel_size: u32) -> Result<GrayImage> {
    ensure_non_empty(image.width(), image.height())?;
    if kernel_size == 0 || kernel_size % 2 == 0 {
        return Err(SymmetryError::InvalidParameter(format!(
            "Gaussian kernel size must be odd and positive, got {}",
            kernel_size
        )));
    }

    Ok(imageproc::filter::gaussian_blur_f32(
        image,
        sigma_for_kernel(kernel_size),
    ))
}

/// Canny edge map: 255 on edges, 0 elsewhere.
pub fn edges(image: &GrayImage, low: f32, high: f32) -> Result<GrayImage> {
    ensure_non_empty(image.width(), image.height())?;
    if low < 0.0 || low > high {
        return Err(SymmetryError::InvalidParameter(format!(
            "Canny thresholds must satisfy 0 <= low <= high, got {}/{}",
            low, high
        )));
    }

    Ok(imageproc::edges::canny(image, low, high))
}

/// Linear-interpolated resample to `width` x `height`.
pub fn resize(image: &DynamicImage, width: u32, height: u32) -> Result<DynamicImage> {
    let (w, h) = image.dimensions();
    ensure_non_empty(w, h)?;
    ensure_non_empty(width, height)
        .map_err(|_| SymmetryError::InvalidParameter(format!("resize target {}x{}", width, height)))?;

    Ok(image.resize_exact(width, height, FilterType::Triangle))
}

/// Scale 8-bit intensities to [0, 1]. Colour input is flattened as RGB.
pub fn normalize(image: &DynamicImage) -> Result<Vec<f32>> {
    let (width, height) = image.dimensions();
    ensure_non_empty(width, height)?;

    let bytes = if image.color().channel_count() == 1 {
        image.to_luma8().into_raw()
    } else {
        image.to_rgb8().into_raw()
    };
    Ok(bytes.into_iter().map(|v| v as f32 / 255.0).collect())
}

/// Histogram-equalise the luma channel. Colour input comes back as RGB.
pub fn enhance_contrast(image: &DynamicImage) -> Result<DynamicImage> {
    let gray = grayscale(image)?;
    let equalized = imageproc::contrast::equalize_histogram(&gray);

    if image.color().channel_count() == 1 {
        Ok(DynamicImage::ImageLuma8(equalized))
    } else {
        Ok(DynamicImage::ImageRgb8(
            DynamicImage::ImageLuma8(equalized).to_rgb8(),
        ))
    }
}

/// Resize to the model input size and normalize.
pub fn prepare_for_model(image: &DynamicImage, target: (u32, u32)) -> Result<ModelInput> {
    let resized = resize(image, target.0, target.1)?;
    let channels = if resized.color().channel_count() == 1 { 1 } else { 3 };
    let data = normalize(&resized)?;

    Ok(ModelInput {
        width: target.0,
        height: target.1,
        channels,
        data,
    })
}

/// Grayscale, edge and blurred renditions of one image.
pub fn symmetry_map(image: &DynamicImage, config: &PreprocessConfig) -> Result<SymmetryMap> {
    let grayscale = grayscale(image)?;
    let edges = edges(&grayscale, config.canny_low, config.canny_high)?;
    let blurred = blur(&grayscale, config.blur_kernel)?;

    Ok(SymmetryMap {
        dimensions: grayscale.dimensions(),
        grayscale,
        edges,
        blurred,
    })
}

/// HOG descriptor of the image at 128x128 (9 bins, 8px cells, 2x2 blocks).
pub fn extract_features(image: &DynamicImage) -> Result<Vec<f32>> {
    let gray = grayscale(image)?;
    let square = image::imageops::resize(&gray, FEATURE_SIDE, FEATURE_SIDE, FilterType::Triangle);

    let options = HogOptions::new(9, false, 8, 2, 1);
    hog(&square, options).map_err(SymmetryError::InvalidParameter)
}
