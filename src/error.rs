use std::fmt;

/// Errors surfaced by the symmetry analysis core.
///
/// Detectors never produce these: a degenerate split or an empty rotation
/// degrades to a zero confidence instead.
#[derive(Debug, Clone, PartialEq)]
pub enum SymmetryError {
    /// The raster is empty or could not be decoded
    InvalidImage(String),
    /// A tuning parameter is outside its valid range
    InvalidParameter(String),
}

impl fmt::Display for SymmetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymmetryError::InvalidImage(msg) => write!(f, "Invalid image: {}", msg),
            SymmetryError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
        }
    }
}

impl std::error::Error for SymmetryError {}

pub type Result<T> = std::result::Result<T, SymmetryError>;

/// Reject rasters with a zero dimension.
pub fn ensure_non_empty(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(SymmetryError::InvalidImage(format!(
            "image has zero dimension ({}x{})",
            width, height
        )));
    }
    Ok(())
}
