use anyhow::{Context, Result};
use exif::{In, Reader, Tag, Value};
use image::{imageops, RgbaImage};
use std::path::Path;

/// EXIF orientation values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExifOrientation {
    /// No orientation specified or undefined
    Undefined = 0,
    /// Normal orientation (0 degrees)
    TopLeft = 1,
    /// Horizontally flipped
    TopRight = 2,
    /// Rotated 180 degrees
    BottomRight = 3,
    /// Vertically flipped
    BottomLeft = 4,
    /// Transposed (mirrored along the top-left to bottom-right diagonal)
    LeftTop = 5,
    /// Needs a 90 degree clockwise rotation
    RightTop = 6,
    /// Transversed (mirrored along the top-right to bottom-left diagonal)
    RightBottom = 7,
    /// Needs a 90 degree counter-clockwise rotation
    LeftBottom = 8,
}

impl From<u32> for ExifOrientation {
    fn from(value: u32) -> Self {
        match value {
            1 => ExifOrientation::TopLeft,
            2 => ExifOrientation::TopRight,
            3 => ExifOrientation::BottomRight,
            4 => ExifOrientation::BottomLeft,
            5 => ExifOrientation::LeftTop,
            6 => ExifOrientation::RightTop,
            7 => ExifOrientation::RightBottom,
            8 => ExifOrientation::LeftBottom,
            _ => ExifOrientation::Undefined,
        }
    }
}

#[cfg(test)]
impl ExifOrientation {
    /// Whether applying this orientation swaps width and height
    pub fn swaps_dimensions(&self) -> bool {
        matches!(
            self,
            ExifOrientation::LeftTop
                | ExifOrientation::RightTop
                | ExifOrientation::RightBottom
                | ExifOrientation::LeftBottom
        )
    }
}

/// Read EXIF orientation tag from an image file.
///
/// Files without EXIF data (most PNG/BMP sources) report `Undefined`.
pub fn read_exif_orientation(image_path: &Path) -> ExifOrientation {
    read_orientation_tag(image_path).unwrap_or(ExifOrientation::Undefined)
}

fn read_orientation_tag(image_path: &Path) -> Result<ExifOrientation> {
    let file = std::fs::File::open(image_path).with_context(|| {
        format!(
            "Failed to open image for EXIF reading: {}",
            image_path.display()
        )
    })?;

    let mut buf_reader = std::io::BufReader::new(file);
    let exif = Reader::new()
        .read_from_container(&mut buf_reader)
        .context("Failed to read EXIF data")?;

    if let Some(field) = exif.get_field(Tag::Orientation, In::PRIMARY) {
        if let Value::Short(values) = &field.value {
            if let Some(&orientation_value) = values.first() {
                return Ok(ExifOrientation::from(orientation_value as u32));
            }
        }
    }

    Ok(ExifOrientation::Undefined)
}

/// Bake an EXIF orientation into the pixel data
pub fn apply_orientation(img: RgbaImage, orientation: ExifOrientation) -> RgbaImage {
    match orientation {
        ExifOrientation::Undefined | ExifOrientation::TopLeft => img,
        ExifOrientation::TopRight => imageops::flip_horizontal(&img),
        ExifOrientation::BottomRight => imageops::rotate180(&img),
        ExifOrientation::BottomLeft => imageops::flip_vertical(&img),
        ExifOrientation::LeftTop => {
            let rotated = imageops::rotate90(&img);
            imageops::flip_horizontal(&rotated)
        }
        ExifOrientation::RightTop => imageops::rotate90(&img),
        ExifOrientation::RightBottom => {
            let rotated = imageops::rotate270(&img);
            imageops::flip_horizontal(&rotated)
        }
        ExifOrientation::LeftBottom => imageops::rotate270(&img),
    }
}
