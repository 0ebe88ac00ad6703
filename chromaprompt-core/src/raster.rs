//! Decode and downsample: image bytes -> RGBA working buffer.
//!
//! The working buffer is bounded so its longer side is at most
//! `max_dimension` pixels; the original dimensions are kept alongside it
//! for reporting.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, RgbaImage};

use crate::error::{AnalyzeError, Result};
use crate::exif_orientation::apply_exif_orientation_from_bytes;

/// An RGBA8 pixel grid, row-major, 4 bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw RGBA bytes. Fails with `Render` if the grid is empty or the
    /// byte length does not match `width * height * 4`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(AnalyzeError::Render(format!(
                "empty pixel grid {}x{}",
                width, height
            )));
        }
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(AnalyzeError::Render(format!(
                "expected {} RGBA bytes for {}x{}, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Every `stride`-th pixel starting at the first one.
    pub fn sampled_pixels(&self, stride: usize) -> impl Iterator<Item = [u8; 4]> + '_ {
        self.data
            .chunks_exact(4)
            .step_by(stride.max(1))
            .map(|p| [p[0], p[1], p[2], p[3]])
    }
}

/// Decoded image ready for analysis.
#[derive(Debug, Clone)]
pub struct Raster {
    pub original_width: u32,
    pub original_height: u32,
    pub pixels: PixelBuffer,
}

/// Capability to turn encoded bytes into a bounded RGBA buffer.
pub trait Rasterizer {
    fn rasterize(&self, bytes: &[u8], max_dimension: u32) -> Result<Raster>;
}

/// Working size with the longer side clamped to `max_dimension`, aspect preserved.
pub fn working_size(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let max = max_dimension as f64;
    if width > height && width > max_dimension {
        let h = (height as f64 * max / width as f64).round() as u32;
        (max_dimension, h)
    } else if height > max_dimension {
        let w = (width as f64 * max / height as f64).round() as u32;
        (w, max_dimension)
    } else {
        (width, height)
    }
}

/// Rasterizer backed by the `image` crate codecs.
#[derive(Debug, Clone)]
pub struct ImageRasterizer {
    pub apply_exif_orientation: bool,
    pub filter: FilterType,
}

impl Default for ImageRasterizer {
    fn default() -> Self {
        Self {
            apply_exif_orientation: true,
            filter: FilterType::Triangle,
        }
    }
}

impl ImageRasterizer {
    pub fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
        let img = image::load_from_memory(bytes)?;
        if self.apply_exif_orientation {
            Ok(apply_exif_orientation_from_bytes(img, bytes))
        } else {
            Ok(img)
        }
    }

    /// Draw a decoded image into an RGBA buffer of at most `max_dimension` per side.
    pub fn render(&self, img: &DynamicImage, max_dimension: u32) -> Result<Raster> {
        let (original_width, original_height) = img.dimensions();
        let (width, height) = working_size(original_width, original_height, max_dimension);
        if width == 0 || height == 0 {
            return Err(AnalyzeError::Render(format!(
                "{}x{} image collapses to {}x{} at max dimension {}",
                original_width, original_height, width, height, max_dimension
            )));
        }

        let mut rgba = img.to_rgba8();
        if (width, height) != (original_width, original_height) {
            // Filter in premultiplied space so hidden RGB under alpha 0 stays hidden.
            premultiply(&mut rgba);
            rgba = imageops::resize(&rgba, width, height, self.filter);
            unpremultiply(&mut rgba);
        }

        let mut data = rgba.into_raw();
        clear_transparent(&mut data);

        tracing::debug!(
            original_width,
            original_height,
            width,
            height,
            "rendered working buffer"
        );

        Ok(Raster {
            original_width,
            original_height,
            pixels: PixelBuffer::new(width, height, data)?,
        })
    }
}

impl Rasterizer for ImageRasterizer {
    fn rasterize(&self, bytes: &[u8], max_dimension: u32) -> Result<Raster> {
        let img = self.decode(bytes)?;
        self.render(&img, max_dimension)
    }
}

fn premultiply(img: &mut RgbaImage) {
    for px in img.pixels_mut() {
        let a = px[3] as u16;
        for c in &mut px.0[..3] {
            *c = ((*c as u16 * a + 127) / 255) as u8;
        }
    }
}

fn unpremultiply(img: &mut RgbaImage) {
    for px in img.pixels_mut() {
        let a = px[3] as u16;
        for c in &mut px.0[..3] {
            *c = match a {
                0 => 0,
                _ => ((*c as u16 * 255 + a / 2) / a).min(255) as u8,
            };
        }
    }
}

/// Fully transparent pixels read back as (0, 0, 0, 0), as from a 2D canvas.
fn clear_transparent(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        if px[3] == 0 {
            px[..3].fill(0);
        }
    }
}
