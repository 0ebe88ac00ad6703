//! Shape classification from the original image dimensions.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Composition {
    Landscape,
    Portrait,
    Square,
    Standard,
}

impl Composition {
    /// Bucket a width/height ratio. Ratios in (0.7, 0.9) and (1.1, 1.5] are `Standard`.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > 1.5 {
            Composition::Landscape
        } else if ratio < 0.7 {
            Composition::Portrait
        } else if (0.9..=1.1).contains(&ratio) {
            Composition::Square
        } else {
            Composition::Standard
        }
    }

    pub fn from_dimensions(width: u32, height: u32) -> Self {
        Self::from_ratio(width as f64 / height as f64)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Composition::Landscape => "landscape",
            Composition::Portrait => "portrait",
            Composition::Square => "square",
            Composition::Standard => "standard",
        }
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Original pixel dimensions of the analyzed image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageStats {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: String,
}

impl ImageStats {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            aspect_ratio: format_aspect_ratio(width, height),
        }
    }
}

/// `width / height` with exactly two decimals.
///
/// Rounds the exact value of the `f64` quotient to nearest, with exact
/// halfway cases going up (so 9/8 = 1.125 gives "1.13", while 201/200,
/// stored just below 1.005, gives "1.00").
pub fn format_aspect_ratio(width: u32, height: u32) -> String {
    let ratio = width as f64 / height as f64;
    if is_hundredths_tie(ratio) {
        let hundredths = (ratio * 100.0).ceil() as u64;
        format!("{}.{:02}", hundredths / 100, hundredths % 100)
    } else {
        format!("{:.2}", ratio)
    }
}

/// A finite `f64` lies exactly halfway between two hundredths only when it
/// is an odd multiple of 1/8.
fn is_hundredths_tie(value: f64) -> bool {
    let eighths = value * 8.0;
    eighths.fract() == 0.0 && eighths % 2.0 == 1.0
}
