//! Brightness, saturation and contrast passes.
//!
//! All three sample the same pixels: every `stride`-th pixel where
//! `stride = max(1, floor(byte_len / tone_sample_target))`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::palette::channel_saturation;
use crate::raster::PixelBuffer;

/// Three-way bucket for a normalized statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    High,
    Medium,
    Low,
}

impl Level {
    /// `value > high -> High`, `value > medium -> Medium`, else `Low`.
    pub fn bucket(value: f64, high: f64, medium: f64) -> Self {
        if value > high {
            Level::High
        } else if value > medium {
            Level::Medium
        } else {
            Level::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::High => "high",
            Level::Medium => "medium",
            Level::Low => "low",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// BT.601 luma weights, in [0, 255].
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
    0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64
}

pub fn tone_stride(byte_len: usize, target: usize) -> usize {
    (byte_len / target.max(1)).max(1)
}

pub fn mean_brightness(buffer: &PixelBuffer, stride: usize) -> f64 {
    let mut total = 0.0;
    let mut samples = 0usize;
    for [r, g, b, _] in buffer.sampled_pixels(stride) {
        total += luminance(r, g, b);
        samples += 1;
    }
    let avg = if samples > 0 { total / samples as f64 } else { 0.0 };
    avg / 255.0
}

pub fn mean_saturation(buffer: &PixelBuffer, stride: usize) -> f64 {
    let mut total = 0.0;
    let mut samples = 0usize;
    for [r, g, b, _] in buffer.sampled_pixels(stride) {
        total += channel_saturation(r, g, b);
        samples += 1;
    }
    if samples > 0 {
        total / samples as f64
    } else {
        0.0
    }
}

/// Luminance range over the samples, as a fraction of 255.
pub fn contrast_ratio(buffer: &PixelBuffer, stride: usize) -> f64 {
    let mut min = 255.0_f64;
    let mut max = 0.0_f64;
    for [r, g, b, _] in buffer.sampled_pixels(stride) {
        let lum = luminance(r, g, b);
        min = min.min(lum);
        max = max.max(lum);
    }
    (max - min) / 255.0
}

pub fn brightness(buffer: &PixelBuffer, sample_target: usize) -> Level {
    let stride = tone_stride(buffer.as_bytes().len(), sample_target);
    let value = mean_brightness(buffer, stride);
    tracing::debug!(stride, value, "brightness pass complete");
    Level::bucket(value, 0.7, 0.4)
}

pub fn saturation(buffer: &PixelBuffer, sample_target: usize) -> Level {
    let stride = tone_stride(buffer.as_bytes().len(), sample_target);
    let value = mean_saturation(buffer, stride);
    tracing::debug!(stride, value, "saturation pass complete");
    Level::bucket(value, 0.6, 0.3)
}

pub fn contrast(buffer: &PixelBuffer, sample_target: usize) -> Level {
    let stride = tone_stride(buffer.as_bytes().len(), sample_target);
    let value = contrast_ratio(buffer, stride);
    tracing::debug!(stride, value, "contrast pass complete");
    Level::bucket(value, 0.7, 0.4)
}
