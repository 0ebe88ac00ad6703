use serde::{Deserialize, Serialize};

/// Tuning knobs for [`ImageAnalyzer`](crate::analyzer::ImageAnalyzer).
///
/// The defaults reproduce the reference browser behavior; changing them
/// changes the results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzerConfig {
    /// Longest side of the working buffer, in pixels.
    pub max_dimension: u32,
    /// Approximate number of pixels read by the palette pass.
    pub palette_sample_target: usize,
    /// Approximate number of RGBA bytes read by the tonal passes.
    pub tone_sample_target: usize,
    /// Number of dominant colors reported.
    pub palette_size: usize,
    pub apply_exif_orientation: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_dimension: 400,
            palette_sample_target: 10_000,
            tone_sample_target: 40_000,
            palette_size: 5,
            apply_exif_orientation: true,
        }
    }
}

impl AnalyzerConfig {
    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension.max(1);
        self
    }

    pub fn with_palette_sample_target(mut self, target: usize) -> Self {
        self.palette_sample_target = target.max(1);
        self
    }

    pub fn with_tone_sample_target(mut self, target: usize) -> Self {
        self.tone_sample_target = target.max(1);
        self
    }

    pub fn with_palette_size(mut self, size: usize) -> Self {
        self.palette_size = size;
        self
    }

    pub fn with_exif_orientation(mut self, apply: bool) -> Self {
        self.apply_exif_orientation = apply;
        self
    }
}
