use serde::{Deserialize, Serialize};

/// Weights of each symmetry component in the overall score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub vertical: f64,
    pub horizontal: f64,
    pub radial: f64,
    /// Applied to each diagonal separately
    pub diagonal: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            vertical: 1.5,
            horizontal: 1.5,
            radial: 1.2,
            diagonal: 1.0,
        }
    }
}

/// One input to the weighted mean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreComponent {
    pub confidence: f64,
    pub weight: f64,
    pub detected: bool,
}

impl ScoreComponent {
    pub fn new(confidence: f64, weight: f64, detected: bool) -> Self {
        Self {
            confidence,
            weight,
            detected,
        }
    }

    /// A component contributes only when detected with a nonzero confidence.
    /// A detected component whose confidence is exactly 0.0 is skipped, the
    /// same as an undetected one.
    fn contributes(&self) -> bool {
        self.detected && self.confidence > 0.0
    }
}

/// Weighted mean of contributing components on a 0-100 scale.
///
/// Returns 0.0 when nothing contributes; never exceeds 100.
pub fn aggregate_score(components: &[ScoreComponent]) -> f64 {
    let (weighted_sum, total_weight) = components
        .iter()
        .filter(|c| c.contributes())
        .fold((0.0, 0.0), |(sum, total), c| {
            (sum + c.confidence * c.weight, total + c.weight)
        });

    if total_weight <= 0.0 {
        return 0.0;
    }

    (weighted_sum / total_weight * 100.0).min(100.0)
}

/// Overall score from raw confidences, where 0.0 means "not detected".
///
/// Every diagonal entry is treated as its own component.
pub fn overall_score(
    weights: &ScoreWeights,
    vertical: f64,
    horizontal: f64,
    radial: f64,
    diagonals: &[f64],
) -> f64 {
    let mut components = vec![
        ScoreComponent::new(vertical, weights.vertical, vertical > 0.0),
        ScoreComponent::new(horizontal, weights.horizontal, horizontal > 0.0),
        ScoreComponent::new(radial, weights.radial, radial > 0.0),
    ];
    components.extend(
        diagonals
            .iter()
            .map(|&d| ScoreComponent::new(d, weights.diagonal, d > 0.0)),
    );
    aggregate_score(&components)
}
