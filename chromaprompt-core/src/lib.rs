//! Client-side image analysis: dominant palette, tonal buckets and
//! composition derived from raw pixel values.

pub mod analyzer;
pub mod composition;
pub mod config;
pub mod error;
pub mod exif_orientation;
pub mod palette;
pub mod raster;
pub mod tone;

pub use analyzer::{analyze, AnalysisResult, ImageAnalyzer};
pub use composition::{Composition, ImageStats};
pub use config::AnalyzerConfig;
pub use error::{AnalyzeError, Result};
pub use palette::{ColorAnalysis, HexColor, PaletteType};
pub use raster::{ImageRasterizer, PixelBuffer, Raster, Rasterizer};
pub use tone::Level;
