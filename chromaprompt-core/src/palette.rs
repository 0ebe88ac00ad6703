//! Dominant color extraction and palette temperature classification.
//!
//! Sampled pixels are quantized per channel to a 32-unit grid:
//!
//! - bucket = floor(channel / 32) * 32
//! - buckets are ranked by frequency, ties keep first-seen order
//! - the top buckets decide the palette type (warm, cool, vibrant, dark, balanced)

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ParseColorError;
use crate::raster::PixelBuffer;

/// Width of one quantization bucket per channel.
pub const BUCKET_SIZE: u8 = 32;

/// An RGB color rendered as `#RRGGBB` (uppercase).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Snap each channel down to the nearest multiple of [`BUCKET_SIZE`].
    pub const fn quantized(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r / BUCKET_SIZE * BUCKET_SIZE,
            g: g / BUCKET_SIZE * BUCKET_SIZE,
            b: b / BUCKET_SIZE * BUCKET_SIZE,
        }
    }

    /// `(max - min) / max` over the three channels, 0 for black.
    pub fn saturation(&self) -> f64 {
        channel_saturation(self.r, self.g, self.b)
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for HexColor {
    type Err = ParseColorError;

    /// Parse a hex color string like "#FF20AB" or "FF20AB".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(ParseColorError::Length(s.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| ParseColorError::Digit(s.to_string()))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

impl TryFrom<String> for HexColor {
    type Error = ParseColorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Overall temperature / character of the dominant colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteType {
    Warm,
    Cool,
    Vibrant,
    Dark,
    Balanced,
}

impl PaletteType {
    pub fn as_str(self) -> &'static str {
        match self {
            PaletteType::Warm => "warm",
            PaletteType::Cool => "cool",
            PaletteType::Vibrant => "vibrant",
            PaletteType::Dark => "dark",
            PaletteType::Balanced => "balanced",
        }
    }

    /// Classify from dominant colors, most frequent first.
    pub fn classify(colors: &[HexColor]) -> Self {
        let mut warm = 0usize;
        let mut cool = 0usize;
        let mut saturated = 0usize;

        for c in colors {
            if c.r > c.g && c.r > c.b {
                warm += 1;
            }
            if c.b > c.r && c.b > c.g {
                cool += 1;
            }
            if c.saturation() > 0.5 {
                saturated += 1;
            }
        }

        if warm > cool && warm > 2 {
            PaletteType::Warm
        } else if cool > warm && cool > 2 {
            PaletteType::Cool
        } else if saturated > 2 {
            PaletteType::Vibrant
        } else if colors.first().is_some_and(|top| top.to_string().starts_with("#0")) {
            // Leading hex digit of the red channel, not a luminance threshold.
            PaletteType::Dark
        } else {
            PaletteType::Balanced
        }
    }
}

impl fmt::Display for PaletteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorAnalysis {
    pub dominant_colors: Vec<HexColor>,
    pub palette_type: PaletteType,
}

/// Pixel stride that keeps the palette pass near `target` samples.
pub fn palette_stride(pixel_count: usize, target: usize) -> usize {
    (pixel_count / target.max(1)).max(1)
}

/// Count quantized buckets over every `stride`-th pixel, in first-seen order.
pub fn bucket_histogram(buffer: &PixelBuffer, stride: usize) -> IndexMap<HexColor, u32> {
    let mut counts: IndexMap<HexColor, u32> = IndexMap::new();
    for [r, g, b, _] in buffer.sampled_pixels(stride) {
        *counts.entry(HexColor::quantized(r, g, b)).or_insert(0) += 1;
    }
    counts
}

/// Most frequent buckets, descending. The sort is stable so ties keep first-seen order.
pub fn dominant_colors(counts: &IndexMap<HexColor, u32>, limit: usize) -> Vec<HexColor> {
    let mut ranked: Vec<(HexColor, u32)> = counts.iter().map(|(c, n)| (*c, *n)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(limit).map(|(c, _)| c).collect()
}

pub fn analyze_colors(
    buffer: &PixelBuffer,
    sample_target: usize,
    palette_size: usize,
) -> ColorAnalysis {
    let stride = palette_stride(buffer.pixel_count(), sample_target);
    let counts = bucket_histogram(buffer, stride);
    let dominant_colors = dominant_colors(&counts, palette_size);
    let palette_type = PaletteType::classify(&dominant_colors);

    tracing::debug!(
        stride,
        buckets = counts.len(),
        palette = %palette_type,
        "color pass complete"
    );

    ColorAnalysis {
        dominant_colors,
        palette_type,
    }
}

pub(crate) fn channel_saturation(r: u8, g: u8, b: u8) -> f64 {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    if max == 0 {
        0.0
    } else {
        (max - min) as f64 / max as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> PixelBuffer {
        let data = (0..width * height)
            .flat_map(|_| [rgb[0], rgb[1], rgb[2], 255])
            .collect();
        PixelBuffer::new(width, height, data).unwrap()
    }

    fn from_pixels(pixels: &[[u8; 3]]) -> PixelBuffer {
        let data = pixels.iter().flat_map(|p| [p[0], p[1], p[2], 255]).collect();
        PixelBuffer::new(pixels.len() as u32, 1, data).unwrap()
    }

    #[test]
    fn test_quantize_to_grid() {
        assert_eq!(HexColor::quantized(255, 0, 31), HexColor::new(224, 0, 0));
        assert_eq!(HexColor::quantized(32, 63, 64), HexColor::new(32, 32, 64));
    }

    #[test]
    fn test_hex_format_is_uppercase() {
        assert_eq!(HexColor::new(224, 0, 160).to_string(), "#E000A0");
        assert_eq!(HexColor::new(0, 0, 0).to_string(), "#000000");
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!("#720546".parse::<HexColor>().unwrap(), HexColor::new(114, 5, 70));
        assert_eq!("580437".parse::<HexColor>().unwrap(), HexColor::new(88, 4, 55));
        assert!(matches!(
            "ZZZ".parse::<HexColor>(),
            Err(ParseColorError::Length(_))
        ));
        assert!(matches!(
            "#GG0000".parse::<HexColor>(),
            Err(ParseColorError::Digit(_))
        ));
    }

    #[test]
    fn test_solid_red_single_bucket() {
        let buffer = solid(40, 20, [255, 0, 0]);
        let colors = analyze_colors(&buffer, 10_000, 5);
        assert_eq!(colors.dominant_colors, vec![HexColor::new(224, 0, 0)]);
        // One warm bucket never clears the "> 2" threshold.
        assert_eq!(colors.palette_type, PaletteType::Balanced);
    }

    #[test]
    fn test_ranking_and_first_seen_ties() {
        let buffer = from_pixels(&[
            [0, 0, 200],
            [100, 100, 100],
            [100, 100, 100],
            [0, 0, 200],
            [250, 250, 250],
        ]);
        let counts = bucket_histogram(&buffer, 1);
        let top = dominant_colors(&counts, 5);
        assert_eq!(
            top,
            vec![
                HexColor::new(0, 0, 192),
                HexColor::new(96, 96, 96),
                HexColor::new(224, 224, 224),
            ]
        );
    }

    #[test]
    fn test_palette_never_exceeds_limit() {
        let pixels: Vec<[u8; 3]> = (0..8u8).map(|i| [i * 32, 0, 0]).collect();
        let buffer = from_pixels(&pixels);
        let colors = analyze_colors(&buffer, 10_000, 5);
        assert_eq!(colors.dominant_colors.len(), 5);
    }

    #[test]
    fn test_stride_sampling() {
        assert_eq!(palette_stride(100, 10_000), 1);
        assert_eq!(palette_stride(400 * 300, 10_000), 12);
        assert_eq!(palette_stride(19_999, 10_000), 1);

        // Stride 2 only sees pixels 0, 2, 4.
        let black = [0, 0, 0];
        let white = [255, 255, 255];
        let buffer = from_pixels(&[black, white, black, white, black]);
        let counts = bucket_histogram(&buffer, 2);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[&HexColor::new(0, 0, 0)], 3);
    }

    #[test]
    fn test_classify_warm() {
        let colors = [
            HexColor::new(224, 64, 0),
            HexColor::new(192, 96, 32),
            HexColor::new(160, 32, 32),
            HexColor::new(0, 0, 224),
        ];
        assert_eq!(PaletteType::classify(&colors), PaletteType::Warm);
    }

    #[test]
    fn test_classify_cool() {
        let colors = [
            HexColor::new(32, 64, 224),
            HexColor::new(0, 96, 128),
            HexColor::new(64, 64, 96),
        ];
        assert_eq!(PaletteType::classify(&colors), PaletteType::Cool);
    }

    #[test]
    fn test_classify_vibrant() {
        // Two warm, one cool, all saturated: no temperature wins.
        let colors = [
            HexColor::new(224, 0, 0),
            HexColor::new(192, 32, 0),
            HexColor::new(0, 0, 224),
        ];
        assert_eq!(PaletteType::classify(&colors), PaletteType::Vibrant);
    }

    #[test]
    fn test_classify_dark_keys_off_leading_digit() {
        let near_black = [HexColor::new(0, 0, 0), HexColor::new(96, 96, 96)];
        assert_eq!(PaletteType::classify(&near_black), PaletteType::Dark);

        // Dim but red channel 0x20: not "dark" under the literal rule.
        let dim = [HexColor::new(32, 32, 32)];
        assert_eq!(PaletteType::classify(&dim), PaletteType::Balanced);

        assert_eq!(PaletteType::classify(&[]), PaletteType::Balanced);
    }

    #[test]
    fn test_black_has_zero_saturation() {
        assert_eq!(HexColor::new(0, 0, 0).saturation(), 0.0);
        assert_eq!(HexColor::new(224, 0, 0).saturation(), 1.0);
    }

    #[test]
    fn test_serde_shape() {
        let analysis = ColorAnalysis {
            dominant_colors: vec![HexColor::new(224, 0, 0)],
            palette_type: PaletteType::Balanced,
        };
        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "dominantColors": ["#E00000"], "paletteType": "balanced" })
        );
        let back: ColorAnalysis = serde_json::from_value(json).unwrap();
        assert_eq!(back, analysis);
    }
}
