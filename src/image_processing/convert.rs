use anyhow::{Context, Result};
use image::{ImageReader, Rgb, RgbImage, RgbaImage};
use std::path::{Path, PathBuf};

use super::orientation::{apply_orientation, read_exif_orientation};
use super::resize::resize_exact;
use super::Dimensions;
use crate::cli::OutputFormat;
use crate::error::ExportError;
use crate::utils::{verbose_println, warn_println};

/// NeuQuant sampling speed for GIF palettes (1 = best, 30 = fastest)
const GIF_QUANTIZE_SPEED: i32 = 10;

/// One decoded and normalized animation frame
pub enum Frame {
    /// Indexed pixels with a local color table, fully opaque
    Palette(gif::Frame<'static>),
    /// 8-bit RGBA pixels
    Rgba(RgbaImage),
}

impl Frame {
    pub fn dimensions(&self) -> Dimensions {
        match self {
            Frame::Palette(frame) => Dimensions::new(frame.width as u32, frame.height as u32),
            Frame::Rgba(img) => Dimensions::new(img.width(), img.height()),
        }
    }
}

/// Per-run settings applied to every frame
#[derive(Debug, Clone, Copy)]
pub struct FrameSettings {
    pub format: OutputFormat,
    pub resize: Option<Dimensions>,
}

#[derive(Debug, Clone)]
pub struct FrameFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Frames that loaded, plus the files that did not
pub struct FrameLoadReport {
    pub frames: Vec<Frame>,
    pub failures: Vec<FrameFailure>,
}

/// Composite RGBA over an opaque white background
pub fn flatten_onto_white(img: &RgbaImage) -> RgbImage {
    let (width, height) = img.dimensions();
    let mut output = RgbImage::new(width, height);

    for (x, y, pixel) in img.enumerate_pixels() {
        let alpha = pixel[3] as u32;
        let blend = |channel: u8| -> u8 {
            ((channel as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8
        };
        output.put_pixel(x, y, Rgb([blend(pixel[0]), blend(pixel[1]), blend(pixel[2])]));
    }

    output
}

/// Flatten transparency and quantize to an adaptive palette
pub fn convert_for_gif(img: &RgbaImage) -> Result<Frame> {
    quantize(img).map(Frame::Palette)
}

/// White-flattened NeuQuant palette frame, no transparent index
pub(crate) fn quantize(img: &RgbaImage) -> Result<gif::Frame<'static>> {
    let (width, height) = img.dimensions();
    let (w16, h16) = match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(anyhow::anyhow!(
                "{}x{} exceeds the GIF limit of {}x{}",
                width,
                height,
                u16::MAX,
                u16::MAX
            ))
        }
    };

    let flattened = flatten_onto_white(img);
    Ok(gif::Frame::from_rgb_speed(
        w16,
        h16,
        flattened.as_raw(),
        GIF_QUANTIZE_SPEED,
    ))
}

/// WebP frames are always carried as RGBA8
pub fn convert_for_webp(img: RgbaImage) -> Frame {
    Frame::Rgba(img)
}

/// Decode one file and run it through orientation, resize and color normalization
pub fn load_frame(path: &Path, settings: &FrameSettings) -> Result<Frame> {
    // The reader owns the file handle; it is closed once decode() returns
    let decoded = ImageReader::open(path)
        .with_context(|| format!("Failed to open image: {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("Failed to detect image format: {}", path.display()))?
        .decode()
        .with_context(|| format!("Failed to decode image: {}", path.display()))?;

    // into_rgba8 also promotes opaque, grayscale and 16-bit/float sources
    let rgba = decoded.into_rgba8();
    let oriented = apply_orientation(rgba, read_exif_orientation(path));

    let sized = match settings.resize {
        Some(target) => resize_exact(&oriented, target)?,
        None => oriented,
    };

    match settings.format {
        OutputFormat::Gif => convert_for_gif(&sized),
        OutputFormat::Webp => Ok(convert_for_webp(sized)),
    }
}

/// Load every path in order. Failures are reported and skipped.
///
/// Returns `NoValidFrames` when nothing could be loaded.
pub fn load_frames<F>(
    paths: &[PathBuf],
    settings: &FrameSettings,
    verbose: bool,
    mut on_progress: F,
) -> Result<FrameLoadReport, ExportError>
where
    F: FnMut(usize, &Path),
{
    let mut frames = Vec::with_capacity(paths.len());
    let mut failures = Vec::new();

    for (index, path) in paths.iter().enumerate() {
        match load_frame(path, settings) {
            Ok(frame) => {
                verbose_println(
                    verbose,
                    &format!("Loaded frame {}/{}: {}", index + 1, paths.len(), path.display()),
                );
                frames.push(frame);
            }
            Err(e) => {
                warn_println(&format!("Failed to load {}: {:#}", path.display(), e));
                failures.push(FrameFailure {
                    path: path.clone(),
                    error: format!("{:#}", e),
                });
            }
        }
        on_progress(index + 1, path);
    }

    if frames.is_empty() {
        return Err(ExportError::NoValidFrames {
            failed: failures.len(),
        });
    }

    if !failures.is_empty() {
        warn_println(&format!(
            "Successfully loaded {} frames, failed to load {} images",
            frames.len(),
            failures.len()
        ));
    }

    Ok(FrameLoadReport { frames, failures })
}
