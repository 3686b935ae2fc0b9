pub mod analysis;
pub mod annotate;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod preprocessing;
pub mod report;
pub mod symmetry;

// Main entry point
pub mod cli_main;

// Re-export commonly used items
pub use analysis::{AnalysisOutput, AnalyzerConfig, SymmetryAnalyzer, SymmetryBreakdown};
pub use error::{Result, SymmetryError};
pub use models::{AnalysisResult, AxisType, SymmetryAxis, SymmetryRegion};
pub use symmetry::{CorrelationBackend, SymmetryBackend};
