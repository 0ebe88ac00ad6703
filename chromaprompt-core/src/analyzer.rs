//! Full analysis pipeline:
//! decode -> downsample to working buffer -> color / brightness / saturation /
//! contrast passes -> composition from original size -> AnalysisResult

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::composition::{Composition, ImageStats};
use crate::config::AnalyzerConfig;
use crate::error::{AnalyzeError, Result};
use crate::palette::{self, ColorAnalysis};
use crate::raster::{ImageRasterizer, PixelBuffer, Raster, Rasterizer};
use crate::tone::{self, Level};

/// Visual descriptors of one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub colors: ColorAnalysis,
    pub brightness: Level,
    pub saturation: Level,
    pub contrast: Level,
    pub composition: Composition,
    pub stats: ImageStats,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// Stateless analyzer; one instance can serve any number of concurrent calls.
#[derive(Debug, Clone)]
pub struct ImageAnalyzer<R = ImageRasterizer> {
    config: AnalyzerConfig,
    rasterizer: R,
}

impl ImageAnalyzer<ImageRasterizer> {
    pub fn new(config: AnalyzerConfig) -> Self {
        let rasterizer = ImageRasterizer {
            apply_exif_orientation: config.apply_exif_orientation,
            ..ImageRasterizer::default()
        };
        Self { config, rasterizer }
    }

    /// Process-wide analyzer with the default configuration, built on first use.
    pub fn shared() -> &'static ImageAnalyzer {
        static SHARED: OnceLock<ImageAnalyzer> = OnceLock::new();
        SHARED.get_or_init(ImageAnalyzer::default)
    }
}

impl Default for ImageAnalyzer<ImageRasterizer> {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

impl<R> ImageAnalyzer<R> {
    pub fn with_rasterizer(config: AnalyzerConfig, rasterizer: R) -> Self {
        Self { config, rasterizer }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze an already rasterized RGBA buffer.
    ///
    /// `original_width` / `original_height` are the dimensions before any
    /// downsampling; they drive `stats` and `composition`.
    pub fn analyze_pixels(
        &self,
        pixels: &PixelBuffer,
        original_width: u32,
        original_height: u32,
    ) -> Result<AnalysisResult> {
        if original_width == 0 || original_height == 0 {
            return Err(AnalyzeError::Render(format!(
                "invalid original dimensions {}x{}",
                original_width, original_height
            )));
        }

        let (colors, brightness, saturation, contrast) = self.run_passes(pixels);

        Ok(AnalysisResult {
            colors,
            brightness,
            saturation,
            contrast,
            composition: Composition::from_dimensions(original_width, original_height),
            stats: ImageStats::new(original_width, original_height),
            timestamp: Utc::now(),
        })
    }

    pub fn analyze_raster(&self, raster: &Raster) -> Result<AnalysisResult> {
        self.analyze_pixels(&raster.pixels, raster.original_width, raster.original_height)
    }

    fn run_passes(&self, pixels: &PixelBuffer) -> (ColorAnalysis, Level, Level, Level) {
        let cfg = &self.config;
        let colors = || {
            palette::analyze_colors(pixels, cfg.palette_sample_target, cfg.palette_size)
        };
        let brightness = || tone::brightness(pixels, cfg.tone_sample_target);
        let saturation = || tone::saturation(pixels, cfg.tone_sample_target);
        let contrast = || tone::contrast(pixels, cfg.tone_sample_target);

        #[cfg(feature = "parallel")]
        {
            let ((c, b), (s, k)) = rayon::join(
                || rayon::join(colors, brightness),
                || rayon::join(saturation, contrast),
            );
            (c, b, s, k)
        }

        #[cfg(not(feature = "parallel"))]
        {
            (colors(), brightness(), saturation(), contrast())
        }
    }
}

impl<R: Rasterizer> ImageAnalyzer<R> {
    /// Decode `bytes` and analyze them.
    #[tracing::instrument(level = "debug", skip_all, fields(bytes = bytes.len()))]
    pub fn analyze(&self, bytes: &[u8]) -> Result<AnalysisResult> {
        let raster = self.rasterizer.rasterize(bytes, self.config.max_dimension)?;
        self.analyze_raster(&raster)
    }
}

/// Analyze with the shared default analyzer.
pub fn analyze(bytes: &[u8]) -> Result<AnalysisResult> {
    ImageAnalyzer::shared().analyze(bytes)
}
