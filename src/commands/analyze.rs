use anyhow::{Context, Result};
use std::path::PathBuf;

use super::{check_format, load_image};
use crate::analysis::SymmetryAnalyzer;
use crate::report::{render_report, render_result};

pub fn analyze_image(
    analyzer: &SymmetryAnalyzer,
    image_path: &str,
    analysis_id: Option<String>,
    output: Option<String>,
    format: &str,
) -> Result<()> {
    check_format(format)?;
    let image = load_image(image_path)?;
    let analysis_id = analysis_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    tracing::info!(
        "🖼️ Analyzing {} ({}x{}) as {}",
        image_path,
        image.width(),
        image.height(),
        analysis_id
    );

    let output_data = analyzer
        .analyze(&image, &analysis_id)
        .with_context(|| format!("Analysis failed for {}", image_path))?;

    let output_path = output.map(PathBuf::from);
    if let Some(path) = &output_path {
        output_data
            .annotated
            .save(path)
            .with_context(|| format!("Failed to save annotated image: {}", path.display()))?;
        tracing::info!("💾 Annotated image saved to {}", path.display());
    }

    match format {
        "json" => {
            let json = serde_json::to_string_pretty(&output_data.result)?;
            println!("{}", json);
        }
        _ => {
            println!("{}", render_result(&output_data.result));
            if let Some(path) = &output_path {
                println!("  Annotated: {}", path.display());
            }
        }
    }

    Ok(())
}

pub fn report_image(analyzer: &SymmetryAnalyzer, image_path: &str, format: &str) -> Result<()> {
    check_format(format)?;
    let image = load_image(image_path)?;
    let breakdown = analyzer
        .detect_all(&image)
        .with_context(|| format!("Symmetry detection failed for {}", image_path))?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&breakdown)?),
        _ => println!("{}", render_report(&breakdown)),
    }

    Ok(())
}

pub fn quick_check_image(analyzer: &SymmetryAnalyzer, image_path: &str) -> Result<()> {
    let image = load_image(image_path)?;
    let quick = analyzer
        .quick_check(&image)
        .with_context(|| format!("Quick check failed for {}", image_path))?;

    println!("{}", serde_json::to_string_pretty(&quick)?);
    Ok(())
}
