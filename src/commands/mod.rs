pub mod analyze;
pub mod compare;

pub use analyze::{analyze_image, quick_check_image, report_image};
pub use compare::{batch_images, compare_images};

use anyhow::{Context, Result};
use image::DynamicImage;
use std::path::Path;

use crate::analysis::SymmetryAnalyzer;
use crate::annotate::Annotator;
use crate::config::Config;
use crate::error::SymmetryError;

/// Decode an image file, reporting decode failures as invalid images.
pub fn load_image(path: &str) -> Result<DynamicImage> {
    if !Path::new(path).exists() {
        return Err(anyhow::anyhow!("Image file not found: {}", path));
    }

    image::open(path)
        .map_err(|e| SymmetryError::InvalidImage(format!("{}: {}", path, e)))
        .with_context(|| format!("Failed to load image: {}", path))
}

/// Build an analyzer from the effective configuration. A configured label
/// font replaces the bundled one.
pub fn build_analyzer(config: &Config) -> Result<SymmetryAnalyzer> {
    let analyzer_config = config.to_analyzer_config();
    let style = analyzer_config.annotation.clone();
    let analyzer = SymmetryAnalyzer::new(analyzer_config)?;

    match config.get_font_path() {
        Some(font_path) => {
            let font_data = std::fs::read(font_path)
                .with_context(|| format!("Failed to read label font: {}", font_path))?;
            let annotator = Annotator::with_font_bytes(style, font_data)?;
            tracing::debug!("🔤 Loaded label font from {}", font_path);
            Ok(analyzer.with_annotator(annotator))
        }
        None => Ok(analyzer),
    }
}

/// Write a configuration file with every default filled in.
pub fn init_config(path: &str, force: bool) -> Result<()> {
    if Path::new(path).exists() && !force {
        return Err(anyhow::anyhow!(
            "Config file already exists: {} (use --force to overwrite)",
            path
        ));
    }

    Config::with_defaults().to_file(path)?;
    println!("Wrote default configuration to {}", path);
    Ok(())
}

fn check_format(format: &str) -> Result<()> {
    match format {
        "json" | "text" => Ok(()),
        other => Err(anyhow::anyhow!(
            "Unknown output format '{}' (expected json or text)",
            other
        )),
    }
}
