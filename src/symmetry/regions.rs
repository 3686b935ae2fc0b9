use image::GrayImage;
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::geometry::contour_area;
use serde::{Deserialize, Serialize};

use crate::models::SymmetryRegion;

/// Region type emitted for every contour-derived region.
pub const REFLECTIVE_REGION: &str = "reflective";

/// Tuning for contour-based region extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Contours enclosing less than this many square pixels are dropped
    pub min_area: f64,
    /// Regions kept, in contour-scan order
    pub max_regions: usize,
    /// Fixed confidence assigned to every region
    pub confidence: f64,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            min_area: 100.0,
            max_regions: 5,
            confidence: 0.8,
        }
    }
}

/// Outermost borders only, in scan order.
fn external_contours(edges: &GrayImage) -> Vec<Contour<i32>> {
    find_contours::<i32>(edges)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .collect()
}

/// Centre of the inclusive bounding box, truncated like integer pixel maths.
fn bounding_box_center(contour: &Contour<i32>) -> Option<(f64, f64)> {
    let min_x = contour.points.iter().map(|p| p.x).min()?;
    let max_x = contour.points.iter().map(|p| p.x).max()?;
    let min_y = contour.points.iter().map(|p| p.y).min()?;
    let max_y = contour.points.iter().map(|p| p.y).max()?;

    let w = max_x - min_x + 1;
    let h = max_y - min_y + 1;
    Some(((min_x + w / 2) as f64, (min_y + h / 2) as f64))
}

/// Regions from the external contours of an edge map.
///
/// `region_id` is the contour's index among all external contours, so ids
/// skip over contours dropped for being too small. Truncation keeps the
/// first `max_regions` in scan order; regions are never sorted.
pub fn find_regions(edges: &GrayImage, config: &RegionConfig) -> Vec<SymmetryRegion> {
    external_contours(edges)
        .iter()
        .enumerate()
        .filter(|(_, contour)| contour_area(&contour.points).abs() >= config.min_area)
        .filter_map(|(index, contour)| {
            bounding_box_center(contour).map(|center| SymmetryRegion {
                region_id: index,
                region_type: REFLECTIVE_REGION.to_string(),
                center,
                confidence: config.confidence,
            })
        })
        .take(config.max_regions)
        .collect()
}
