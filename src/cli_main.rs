use anyhow::{Context, Result};
use clap::Parser;

use crate::analysis::SymmetryAnalyzer;
use crate::cli::{Cli, Commands, ThresholdOptions};
use crate::commands::{
    analyze_image, batch_images, build_analyzer, compare_images, init_config, quick_check_image,
    report_image,
};
use crate::config::Config;

fn init_tracing(verbose: bool) {
    // RUST_LOG takes precedence; --verbose raises the default to debug
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::filter::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .init();
}

/// Effective configuration: file (or defaults), then CLI overrides, validated.
fn load_analyzer(config_path: Option<&str>, thresholds: &ThresholdOptions) -> Result<SymmetryAnalyzer> {
    // Load configuration from file or use defaults
    let mut app_config = if let Some(config_path) = config_path {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config file: {}", config_path))?
    } else {
        Config::default()
    };

    // Override config with command line arguments
    app_config.merge_with_cli(
        thresholds.vertical_threshold,
        thresholds.diagonal_threshold,
        thresholds.radial_threshold,
        thresholds.radial_samples,
    );

    app_config
        .validate()
        .context("Configuration validation failed")?;

    build_analyzer(&app_config)
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Analyze {
            image,
            id,
            output,
            format,
        } => {
            let analyzer = load_analyzer(config_path, &cli.thresholds)?;
            analyze_image(&analyzer, &image, id, output, &format)?;
        }
        Commands::Report { image, format } => {
            let analyzer = load_analyzer(config_path, &cli.thresholds)?;
            report_image(&analyzer, &image, &format)?;
        }
        Commands::Quick { image } => {
            let analyzer = load_analyzer(config_path, &cli.thresholds)?;
            quick_check_image(&analyzer, &image)?;
        }
        Commands::Compare { first, second } => {
            let analyzer = load_analyzer(config_path, &cli.thresholds)?;
            compare_images(&analyzer, &first, &second)?;
        }
        Commands::Batch { images, format } => {
            let analyzer = load_analyzer(config_path, &cli.thresholds)?;
            batch_images(&analyzer, &images, &format)?;
        }
        Commands::InitConfig { path, force } => {
            init_config(&path, force)?;
        }
    }

    Ok(())
}
