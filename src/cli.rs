use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "symmetry-vision")]
#[command(about = "Score images for mirror, diagonal and rotational symmetry", long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Show detector-level debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub thresholds: ThresholdOptions,

    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides for the configured detection thresholds
#[derive(Args, Debug, Clone, Default)]
pub struct ThresholdOptions {
    /// Mirror threshold for both vertical and horizontal axes (0-1)
    #[arg(long, global = true)]
    pub vertical_threshold: Option<f64>,

    /// Threshold for each diagonal (0-1)
    #[arg(long, global = true)]
    pub diagonal_threshold: Option<f64>,

    /// Rotational similarity threshold (0-1)
    #[arg(long, global = true)]
    pub radial_threshold: Option<f64>,

    /// Number of rotations sampled by the radial test
    #[arg(long, global = true)]
    pub radial_samples: Option<u32>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full analysis on one image
    Analyze {
        /// Image to analyze
        image: String,

        /// Analysis identifier (random UUID if omitted)
        #[arg(long)]
        id: Option<String>,

        /// Where to write the annotated image (not saved when omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Output format (json, text)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Print a per-component symmetry report
    Report {
        /// Image to report on
        image: String,

        /// Output format (json, text)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Vertical and horizontal tests only
    Quick {
        /// Image to check
        image: String,
    },
    /// Compare the overall symmetry of two images
    Compare {
        /// First image
        first: String,

        /// Second image
        second: String,
    },
    /// Score several images, continuing past failures
    Batch {
        /// Images to score
        #[arg(required = true)]
        images: Vec<String>,

        /// Output format (json, text)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Write a configuration file with every default filled in
    InitConfig {
        /// Destination path
        #[arg(default_value = "symmetry.toml")]
        path: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
