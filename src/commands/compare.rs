use anyhow::{Context, Result};

use super::{check_format, load_image};
use crate::analysis::{BatchItem, MoreSymmetric, SymmetryAnalyzer};
use crate::report::assessment_text;

pub fn compare_images(analyzer: &SymmetryAnalyzer, first: &str, second: &str) -> Result<()> {
    let first_image = load_image(first)?;
    let second_image = load_image(second)?;

    let comparison = analyzer
        .compare(&first_image, &second_image)
        .with_context(|| format!("Failed to compare {} and {}", first, second))?;

    let winner = match comparison.more_symmetric {
        MoreSymmetric::First => first,
        MoreSymmetric::Second => second,
    };
    tracing::info!(
        "⚖️ {} is more symmetric (difference {:.2})",
        winner,
        comparison.difference
    );

    println!("{}", serde_json::to_string_pretty(&comparison)?);
    Ok(())
}

/// Load and score each file in turn, keeping one decoded image in memory.
/// Unreadable files are reported like analysis failures.
fn score_paths(analyzer: &SymmetryAnalyzer, paths: &[String]) -> Vec<BatchItem> {
    paths
        .iter()
        .enumerate()
        .map(|(image_index, path)| match load_image(path) {
            Ok(image) => analyzer.batch_item(image_index, &image),
            Err(e) => {
                tracing::warn!("❌ Skipping {}: {:#}", path, e);
                BatchItem::failed(image_index, format!("{:#}", e))
            }
        })
        .collect()
}

/// Score every image; a failing file never aborts the batch.
pub fn batch_images(analyzer: &SymmetryAnalyzer, paths: &[String], format: &str) -> Result<()> {
    check_format(format)?;

    let items = score_paths(analyzer, paths);

    let succeeded = items.iter().filter(|item| item.success).count();
    tracing::info!("📊 Batch complete: {}/{} images scored", succeeded, items.len());

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&items)?),
        _ => {
            for (path, item) in paths.iter().zip(&items) {
                match (&item.breakdown, &item.error) {
                    (Some(breakdown), _) => println!(
                        "{:>3}  {:>6.2}  {:<22}  {}",
                        item.image_index,
                        breakdown.overall_score,
                        assessment_text(breakdown.overall_score),
                        path
                    ),
                    (None, error) => println!(
                        "{:>3}  {:>6}  {:<22}  {} ({})",
                        item.image_index,
                        "-",
                        "failed",
                        path,
                        error.as_deref().unwrap_or("unknown error")
                    ),
                }
            }
        }
    }

    Ok(())
}
