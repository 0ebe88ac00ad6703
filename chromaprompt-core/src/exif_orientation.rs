//! EXIF orientation correction, so reported dimensions match what a browser
//! displays for the same file.
//!
//! EXIF orientation values:
//! 1 = Normal
//! 2 = Flipped horizontally
//! 3 = Rotated 180°
//! 4 = Flipped vertically
//! 5 = Transposed (flip horizontal + rotate 270° CW)
//! 6 = Rotated 90° CW
//! 7 = Transverse (flip horizontal + rotate 90° CW)
//! 8 = Rotated 270° CW

use image::DynamicImage;
use std::io::Cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Normal,
    FlipH,
    Rotate180,
    FlipV,
    Transpose,
    Rotate90,
    Transverse,
    Rotate270,
}

impl Orientation {
    pub fn from_exif(value: u32) -> Option<Self> {
        match value {
            1 => Some(Orientation::Normal),
            2 => Some(Orientation::FlipH),
            3 => Some(Orientation::Rotate180),
            4 => Some(Orientation::FlipV),
            5 => Some(Orientation::Transpose),
            6 => Some(Orientation::Rotate90),
            7 => Some(Orientation::Transverse),
            8 => Some(Orientation::Rotate270),
            _ => None,
        }
    }

    /// True when the transform exchanges width and height.
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Orientation::Transpose
                | Orientation::Rotate90
                | Orientation::Transverse
                | Orientation::Rotate270
        )
    }

    pub fn apply(self, img: DynamicImage) -> DynamicImage {
        match self {
            Orientation::Normal => img,
            Orientation::FlipH => img.fliph(),
            Orientation::Rotate180 => img.rotate180(),
            Orientation::FlipV => img.flipv(),
            Orientation::Transpose => img.rotate270().fliph(),
            Orientation::Rotate90 => img.rotate90(),
            Orientation::Transverse => img.rotate90().fliph(),
            Orientation::Rotate270 => img.rotate270(),
        }
    }
}

/// Read EXIF orientation from an encoded image. None if unreadable or missing.
pub fn read_orientation(bytes: &[u8]) -> Option<Orientation> {
    let mut cursor = Cursor::new(bytes);
    let exif = exif::Reader::new().read_from_container(&mut cursor).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    Orientation::from_exif(field.value.get_uint(0)?)
}

/// Apply the orientation recorded in `bytes` to the decoded image.
/// Returns the image unchanged if there is none.
pub fn apply_exif_orientation_from_bytes(img: DynamicImage, bytes: &[u8]) -> DynamicImage {
    match read_orientation(bytes) {
        Some(orientation) => {
            tracing::debug!(?orientation, "applying exif orientation");
            orientation.apply(img)
        }
        None => img,
    }
}

/// Encode a `width`x`height` JPEG carrying an APP1 Exif segment whose only
/// entry is the given Orientation tag.
#[cfg(test)]
pub(crate) fn jpeg_with_orientation(width: u32, height: u32, orientation: u16) -> Vec<u8> {
    let mut jpeg = Vec::new();
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([90, 140, 200]));
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)
        .unwrap();

    // Big-endian TIFF header, one IFD entry (0x0112 SHORT x1), no next IFD.
    let mut tiff = vec![b'M', b'M', 0x00, 0x2A, 0, 0, 0, 8, 0x00, 0x01];
    tiff.extend_from_slice(&[0x01, 0x12, 0x00, 0x03, 0, 0, 0, 1]);
    tiff.extend_from_slice(&orientation.to_be_bytes());
    tiff.extend_from_slice(&[0, 0, 0, 0, 0, 0]);

    let mut app1 = b"Exif\0\0".to_vec();
    app1.extend_from_slice(&tiff);
    let len = (app1.len() + 2) as u16;

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(&app1);
    out.extend_from_slice(&jpeg[2..]);
    out
}
