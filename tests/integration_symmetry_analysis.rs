use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use symmetry_vision::analysis::{AnalyzerConfig, SymmetryAnalyzer};
use symmetry_vision::models::{AnalysisResult, AxisType};
use symmetry_vision::preprocessing;
use symmetry_vision::symmetry::{find_regions, overall_score, RegionConfig, ScoreWeights};
use symmetry_vision::SymmetryError;

// ---- Test Harness ----

fn analyzer() -> SymmetryAnalyzer {
    SymmetryAnalyzer::new(AnalyzerConfig::default()).unwrap()
}

fn random_image(rng: &mut StdRng, width: u32, height: u32) -> DynamicImage {
    let rgb = RgbImage::from_fn(width, height, |_, _| {
        Rgb([rng.random::<u8>(), rng.random::<u8>(), rng.random::<u8>()])
    });
    DynamicImage::ImageRgb8(rgb)
}

/// Right half is the horizontal flip of a random left half.
fn vertically_mirrored(rng: &mut StdRng, width: u32, height: u32) -> DynamicImage {
    let half = width / 2;
    let left = GrayImage::from_fn(half, height, |_, _| Luma([rng.random::<u8>()]));
    let gray = GrayImage::from_fn(width, height, |x, y| {
        let source = if x < half { x } else { width - 1 - x };
        *left.get_pixel(source.min(half - 1), y)
    });
    DynamicImage::ImageLuma8(gray)
}

fn centered_disc(size: u32, radius: f32) -> DynamicImage {
    let c = (size as f32 - 1.0) / 2.0;
    DynamicImage::ImageLuma8(GrayImage::from_fn(size, size, |x, y| {
        let d = ((x as f32 - c).powi(2) + (y as f32 - c).powi(2)).sqrt();
        if d <= radius {
            Luma([200])
        } else {
            Luma([20])
        }
    }))
}

fn assert_in_range(result: &AnalysisResult) {
    assert!(
        (0.0..=100.0).contains(&result.symmetry_score),
        "score out of range: {}",
        result.symmetry_score
    );
    for axis in &result.detected_axes {
        assert!(
            (0.0..=1.0).contains(&axis.confidence),
            "{} confidence out of range: {}",
            axis.axis_type,
            axis.confidence
        );
    }
    for region in &result.detected_regions {
        assert!((0.0..=1.0).contains(&region.confidence));
    }
}

// ---- Tests ----

#[test]
fn test_random_images_stay_in_range() {
    let mut rng = StdRng::seed_from_u64(7);
    let analyzer = analyzer();

    for (width, height) in [(32, 32), (47, 21), (16, 64), (3, 3)] {
        let image = random_image(&mut rng, width, height);
        let output = analyzer.analyze(&image, "random").unwrap();
        assert_in_range(&output.result);

        let breakdown = analyzer.detect_all(&image).unwrap();
        for confidence in [
            breakdown.vertical.confidence,
            breakdown.horizontal.confidence,
            breakdown.radial.confidence,
        ] {
            assert!((0.0..=1.0).contains(&confidence));
        }
    }
}

#[test]
fn test_vertically_mirrored_image_is_detected() {
    let mut rng = StdRng::seed_from_u64(11);
    let image = vertically_mirrored(&mut rng, 64, 40);

    let result = analyzer().analyze(&image, "mirror").unwrap().result;
    assert!(result.has_vertical_symmetry);
    let vertical = result
        .detected_axes
        .iter()
        .find(|a| a.axis_type == AxisType::Vertical)
        .unwrap();
    assert!(vertical.confidence >= 0.85, "Got {}", vertical.confidence);
    assert_eq!(vertical.coordinates.x1, 32.0);
    assert_eq!(vertical.coordinates.y2, 40.0);
}

#[test]
fn test_uniform_image_is_fully_mirror_symmetric() {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 64, Rgb([128, 128, 128])));
    let breakdown = analyzer().detect_all(&image).unwrap();

    assert!((breakdown.vertical.confidence - 1.0).abs() < 1e-9);
    assert!((breakdown.horizontal.confidence - 1.0).abs() < 1e-9);
    assert!(breakdown.vertical.confidence.is_finite());
    // Rotated corners fill with black, so the radial score sits just under 1
    assert!(breakdown.radial.detected);
    assert!(breakdown.radial.confidence > 0.9, "Got {}", breakdown.radial.confidence);
}

#[test]
fn test_centered_disc_is_radially_symmetric() {
    let image = centered_disc(96, 30.0);
    let result = analyzer().analyze(&image, "disc").unwrap().result;

    assert!(result.has_radial_symmetry);
    assert!(result.has_vertical_symmetry);
    assert!(result.has_horizontal_symmetry);
    assert!(result.symmetry_score >= 70.0, "Got {}", result.symmetry_score);
}

#[test]
fn test_analysis_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(23);
    let image = random_image(&mut rng, 50, 38);
    let analyzer = analyzer();

    let first = analyzer.analyze(&image, "same").unwrap();
    let second = analyzer.analyze(&image, "same").unwrap();

    assert_eq!(
        first.result.symmetry_score.to_bits(),
        second.result.symmetry_score.to_bits()
    );
    assert_eq!(first.result.detected_axes, second.result.detected_axes);
    assert_eq!(first.result.detected_regions, second.result.detected_regions);
    assert_eq!(first.annotated, second.annotated);

    let a = analyzer.detect_all(&image).unwrap();
    let b = analyzer.detect_all(&image).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_weighted_aggregation_scenario() {
    let score = overall_score(&ScoreWeights::default(), 0.9, 0.8, 0.0, &[]);
    assert!((score - 85.0).abs() < 1e-9, "Got {}", score);
}

#[test]
fn test_boundary_sizes() {
    let analyzer = analyzer();

    let dot = DynamicImage::ImageLuma8(GrayImage::new(1, 1));
    let result = analyzer.analyze(&dot, "dot").unwrap().result;
    assert_eq!(result.symmetry_score, 0.0);
    assert!(result.detected_axes.is_empty());

    for (width, height) in [(1, 17), (17, 1)] {
        let image = DynamicImage::ImageLuma8(GrayImage::from_fn(width, height, |x, y| {
            Luma([((x + y) * 13 % 256) as u8])
        }));
        let output = analyzer.analyze(&image, "strip").unwrap();
        assert_in_range(&output.result);
        assert_eq!(output.annotated.dimensions(), (width, height));
        assert!(!output.result.has_radial_symmetry);
    }

    for (width, height) in [(0, 12), (12, 0)] {
        let empty = DynamicImage::ImageLuma8(GrayImage::new(width, height));
        assert!(matches!(
            analyzer.analyze(&empty, "empty"),
            Err(SymmetryError::InvalidImage(_))
        ));
    }
}

#[test]
fn test_axes_follow_emission_order() {
    let image = centered_disc(80, 28.0);
    let result = analyzer().analyze(&image, "order").unwrap().result;

    let order: Vec<usize> = result
        .detected_axes
        .iter()
        .map(|axis| {
            AxisType::ALL
                .iter()
                .position(|t| *t == axis.axis_type)
                .unwrap()
        })
        .collect();
    assert!(!order.is_empty());
    assert!(order.windows(2).all(|w| w[0] < w[1]), "Got {:?}", order);
}

#[test]
fn test_annotated_image_matches_input_dimensions() {
    let mut rng = StdRng::seed_from_u64(5);
    let image = vertically_mirrored(&mut rng, 72, 30);
    let output = analyzer().analyze(&image, "dims").unwrap();
    assert_eq!(output.annotated.dimensions(), (72, 30));
}

#[test]
fn test_regions_are_capped_at_five() {
    // Eight separated outlines, already an edge map
    let mut edges = GrayImage::new(400, 120);
    for i in 0..8 {
        let x0 = 10 + i * 48;
        draw_hollow_rect_mut(&mut edges, Rect::at(x0, 20).of_size(36, 40), Luma([255]));
    }

    let regions = find_regions(&edges, &RegionConfig::default());
    assert_eq!(regions.len(), 5);
    let ids: Vec<usize> = regions.iter().map(|r| r.region_id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    for region in &regions {
        assert_eq!(region.region_type, "reflective");
        assert_eq!(region.confidence, 0.8);
    }

    // Through the full pipeline the cap holds too
    let mut filled = GrayImage::from_pixel(400, 120, Luma([0]));
    for i in 0..8 {
        let x0 = 10 + i * 48;
        draw_filled_rect_mut(&mut filled, Rect::at(x0, 20).of_size(36, 40), Luma([255]));
    }
    let regions = analyzer()
        .find_regions(&DynamicImage::ImageLuma8(filled))
        .unwrap();
    assert!(regions.len() <= 5);
}

#[test]
fn test_result_json_shape() {
    let image = centered_disc(48, 15.0);
    let result = analyzer().analyze(&image, "json-shape").unwrap().result;
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["analysis_id"], "json-shape");
    assert_eq!(value["original_image_url"], "/uploads/json-shape");
    assert_eq!(value["processed_image_url"], "/results/json-shape_analyzed.jpg");
    assert!(value["timestamp"].is_string());
    for axis in value["detected_axes"].as_array().unwrap() {
        assert!(axis["type"].is_string());
        assert!(axis["angle"].is_number());
        assert!(axis["coordinates"]["x1"].is_number());
    }
}

#[test]
fn test_preprocessing_pipeline_on_photo_sized_input() {
    let mut rng = StdRng::seed_from_u64(99);
    let image = random_image(&mut rng, 120, 90);

    let model_input = preprocessing::prepare_for_model(&image, (224, 224)).unwrap();
    assert_eq!((model_input.width, model_input.height), (224, 224));
    assert!(model_input.data.iter().all(|v| (0.0..=1.0).contains(v)));

    let features = preprocessing::extract_features(&image).unwrap();
    assert!(!features.is_empty());
}
