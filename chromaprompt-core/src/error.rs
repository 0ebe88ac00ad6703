//! Error types for image analysis.

use thiserror::Error;

/// Failure of a single `analyze` call. Both kinds are terminal for the input.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// The bytes could not be parsed as a raster image.
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// The image decoded but no pixel data could be extracted from it.
    #[error("Failed to render image: {0}")]
    Render(String),
}

impl From<image::ImageError> for AnalyzeError {
    fn from(err: image::ImageError) -> Self {
        AnalyzeError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalyzeError>;

/// Invalid `#RRGGBB` color string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseColorError {
    #[error("Invalid hex color '{0}': expected 6 hex digits")]
    Length(String),

    #[error("Invalid hex color '{0}'")]
    Digit(String),
}
