use std::fmt::Write as _;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::analysis::SymmetryBreakdown;
use crate::models::{AnalysisResult, SymmetryAxis};

/// Human-oriented digest of an analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub overall_assessment: String,
    pub dominant_symmetry: String,
    pub symmetry_count: usize,
    pub confidence_level: String,
}

/// Verbal band for a 0-100 score.
pub fn assessment_text(score: f64) -> &'static str {
    if score >= 90.0 {
        "Highly symmetric"
    } else if score >= 75.0 {
        "Strongly symmetric"
    } else if score >= 60.0 {
        "Moderately symmetric"
    } else if score >= 40.0 {
        "Somewhat symmetric"
    } else {
        "Low symmetry"
    }
}

/// Verbal band for the mean confidence of the detected axes.
pub fn confidence_level(axes: &[SymmetryAxis]) -> &'static str {
    if axes.is_empty() {
        return "None";
    }

    let mean = axes.iter().map(|a| a.confidence).sum::<f64>() / axes.len() as f64;
    if mean >= 0.9 {
        "Very High"
    } else if mean >= 0.75 {
        "High"
    } else if mean >= 0.6 {
        "Moderate"
    } else {
        "Low"
    }
}

pub fn summarize(result: &AnalysisResult) -> AnalysisSummary {
    let dominant = result
        .detected_axes
        .iter()
        .fold(None::<&SymmetryAxis>, |best, axis| match best {
            Some(b) if b.confidence >= axis.confidence => Some(b),
            _ => Some(axis),
        })
        .map(|axis| axis.axis_type.to_string())
        .unwrap_or_else(|| "None".to_string());

    AnalysisSummary {
        overall_assessment: assessment_text(result.symmetry_score).to_string(),
        dominant_symmetry: dominant,
        symmetry_count: result.detected_axes.len(),
        confidence_level: confidence_level(&result.detected_axes).to_string(),
    }
}

/// `main_diagonal` -> `Main Diagonal`
fn title_case(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Boxed plain-text report of every symmetry component.
pub fn render_report(breakdown: &SymmetryBreakdown) -> String {
    let rule = "=".repeat(50);
    let mut out = String::new();

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "SYMMETRY ANALYSIS REPORT");
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out);
    let _ = writeln!(out, "Overall Symmetry Score: {:.2}/100", breakdown.overall_score);
    let _ = writeln!(out);
    let _ = writeln!(out, "Detected Symmetries:");
    let _ = writeln!(out, "{}", "-".repeat(50));

    for (name, component) in [
        ("Vertical", &breakdown.vertical),
        ("Horizontal", &breakdown.horizontal),
    ] {
        if component.detected {
            let _ = writeln!(
                out,
                "✓ {} Symmetry (Confidence: {:.1}%)",
                name,
                component.confidence * 100.0
            );
        } else {
            let _ = writeln!(out, "✗ No {} Symmetry", name);
        }
    }

    if breakdown.diagonal.is_empty() {
        let _ = writeln!(out, "✗ No Diagonal Symmetry");
    } else {
        for diagonal in &breakdown.diagonal {
            let _ = writeln!(
                out,
                "✓ {} (Confidence: {:.1}%)",
                title_case(diagonal.axis_type.as_str()),
                diagonal.confidence * 100.0
            );
        }
    }

    if breakdown.radial.detected {
        let _ = writeln!(
            out,
            "✓ Radial Symmetry (Confidence: {:.1}%)",
            breakdown.radial.confidence * 100.0
        );
    } else {
        let _ = writeln!(out, "✗ No Radial Symmetry");
    }

    let _ = write!(out, "{}", rule);
    out
}

/// Short text block for a finished analysis.
pub fn render_result(result: &AnalysisResult) -> String {
    let summary = summarize(result);
    let elapsed = Duration::from_millis((result.processing_time * 1000.0).round() as u64);
    let mut out = String::new();

    let _ = writeln!(out, "Analysis {}", result.analysis_id);
    let _ = writeln!(
        out,
        "  Score: {:.2}/100 ({})",
        result.symmetry_score, summary.overall_assessment
    );
    let _ = writeln!(
        out,
        "  Axes: {} (dominant: {}, confidence: {})",
        summary.symmetry_count, summary.dominant_symmetry, summary.confidence_level
    );
    for axis in &result.detected_axes {
        let c = axis.coordinates;
        let _ = writeln!(
            out,
            "    - {} at ({:.0},{:.0})-({:.0},{:.0})",
            axis.label(),
            c.x1,
            c.y1,
            c.x2,
            c.y2
        );
    }
    let _ = writeln!(
        out,
        "  Radial: {}",
        if result.has_radial_symmetry { "yes" } else { "no" }
    );
    let _ = writeln!(out, "  Regions: {}", result.detected_regions.len());
    let _ = write!(out, "  Processed in {}", humantime::format_duration(elapsed));
    out
}
