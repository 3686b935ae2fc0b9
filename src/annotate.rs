use std::fmt;

use ab_glyph::FontArc;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_line_segment_mut, draw_text_mut};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SymmetryError};
use crate::models::SymmetryAxis;

/// How detected axes are drawn onto the output raster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationStyle {
    pub color: [u8; 3],
    /// Line thickness in pixels
    pub thickness: u32,
    /// Label glyph height in pixels
    pub label_scale: f32,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            color: [255, 0, 0],
            thickness: 3,
            label_scale: 20.0,
        }
    }
}

/// DejaVu Sans, used for labels unless another font is configured.
static DEFAULT_LABEL_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

fn default_label_font() -> Option<FontArc> {
    match FontArc::try_from_slice(DEFAULT_LABEL_FONT) {
        Ok(font) => Some(font),
        Err(e) => {
            tracing::warn!("⚠️ Bundled label font unreadable, labels disabled: {}", e);
            None
        }
    }
}

/// Draws axis lines and their labels.
#[derive(Clone)]
pub struct Annotator {
    style: AnnotationStyle,
    font: Option<FontArc>,
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new(AnnotationStyle::default())
    }
}

impl fmt::Debug for Annotator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Annotator")
            .field("style", &self.style)
            .field("has_font", &self.font.is_some())
            .finish()
    }
}

impl Annotator {
    /// Annotator labelling with the bundled font.
    pub fn new(style: AnnotationStyle) -> Self {
        Self {
            style,
            font: default_label_font(),
        }
    }

    /// Label with a TrueType/OpenType font instead of the bundled one.
    pub fn with_font_bytes(style: AnnotationStyle, font_data: Vec<u8>) -> Result<Self> {
        let font = FontArc::try_from_vec(font_data)
            .map_err(|e| SymmetryError::InvalidParameter(format!("Invalid label font: {}", e)))?;
        Ok(Self {
            style,
            font: Some(font),
        })
    }

    /// Draw one axis line and its `"{type} ({confidence:.2})"` label in place.
    pub fn draw_symmetry_axis(&self, canvas: &mut RgbImage, axis: &SymmetryAxis) {
        let color = Rgb(self.style.color);
        let c = axis.coordinates;
        let (x1, y1, x2, y2) = (c.x1 as f32, c.y1 as f32, c.x2 as f32, c.y2 as f32);

        // Offset copies of the segment along its normal give the thickness
        let length = ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt();
        let (nx, ny) = if length > 0.0 {
            (-(y2 - y1) / length, (x2 - x1) / length)
        } else {
            (0.0, 0.0)
        };
        let half = (self.style.thickness.max(1) as i32 - 1) / 2;
        let extra = (self.style.thickness.max(1) as i32 - 1) % 2;
        for offset in -half..=(half + extra) {
            let (ox, oy) = (nx * offset as f32, ny * offset as f32);
            draw_line_segment_mut(canvas, (x1 + ox, y1 + oy), (x2 + ox, y2 + oy), color);
        }

        match &self.font {
            Some(font) => {
                let label = axis.label();
                draw_text_mut(
                    canvas,
                    color,
                    c.x1 as i32 + 10,
                    c.y1 as i32 + 30,
                    self.style.label_scale,
                    font,
                    &label,
                );
            }
            None => tracing::debug!("🏷️ No label font, skipping label for {}", axis.axis_type),
        }
    }

    /// Copy of `image` with every axis drawn on it.
    pub fn annotate(&self, image: &RgbImage, axes: &[SymmetryAxis]) -> RgbImage {
        let mut canvas = image.clone();
        for axis in axes {
            self.draw_symmetry_axis(&mut canvas, axis);
        }
        canvas
    }
}
