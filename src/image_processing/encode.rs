use anyhow::{anyhow, Context, Result};
use gif::{DisposalMethod, Encoder, Repeat};
use image::{imageops, Rgba, RgbaImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use webp::{AnimEncoder, AnimFrame, WebPConfig};

use super::convert::{quantize, Frame};
use super::Dimensions;
use crate::cli::OutputFormat;
use crate::error::ExportError;

/// libwebp effort level, 0 (fast) to 6 (slowest, smallest)
const WEBP_METHOD: i32 = 6;

/// Name used when the output directory has no usable file name (e.g. `/`)
const FALLBACK_OUTPUT_NAME: &str = "animation";

/// Encoder settings shared by both formats
#[derive(Debug, Clone, Copy)]
pub struct AnimationSettings {
    pub format: OutputFormat,
    pub fps: u32,
    /// WebP only
    pub quality: u8,
}

/// Per-frame display time in milliseconds
pub fn frame_duration_ms(fps: u32) -> u32 {
    (1000 / fps.max(1)).max(1)
}

/// GIF delays are in centiseconds: rounded to nearest, never zero
pub fn gif_delay_centis(duration_ms: u32) -> u16 {
    let centis = (duration_ms + 5) / 10;
    centis.clamp(1, u16::MAX as u32) as u16
}

/// Smallest canvas that holds every frame
pub fn canvas_size(frames: &[Frame]) -> Dimensions {
    frames.iter().fold(Dimensions::new(0, 0), |acc, frame| {
        let d = frame.dimensions();
        Dimensions::new(acc.width.max(d.width), acc.height.max(d.height))
    })
}

fn centered_offset(canvas: Dimensions, frame: Dimensions) -> (u32, u32) {
    (
        canvas.width.saturating_sub(frame.width) / 2,
        canvas.height.saturating_sub(frame.height) / 2,
    )
}

/// Write an infinitely looping GIF. Smaller frames are centered on the logical screen.
pub fn encode_gif<W: Write>(frames: &[Frame], duration_ms: u32, writer: W) -> Result<W> {
    let canvas = canvas_size(frames);
    let screen_width = u16::try_from(canvas.width).context("Canvas too wide for GIF")?;
    let screen_height = u16::try_from(canvas.height).context("Canvas too tall for GIF")?;

    let mut encoder = Encoder::new(writer, screen_width, screen_height, &[])
        .context("Failed to write GIF header")?;
    encoder
        .set_repeat(Repeat::Infinite)
        .context("Failed to write GIF loop extension")?;

    let delay = gif_delay_centis(duration_ms);

    for (index, frame) in frames.iter().enumerate() {
        let mut gif_frame = match frame {
            Frame::Palette(palette_frame) => palette_frame.clone(),
            Frame::Rgba(img) => quantize(img)?,
        };

        let (left, top) = centered_offset(canvas, frame.dimensions());
        gif_frame.left = left as u16;
        gif_frame.top = top as u16;
        gif_frame.delay = delay;
        gif_frame.dispose = DisposalMethod::Background;

        encoder
            .write_frame(&gif_frame)
            .with_context(|| format!("Failed to write GIF frame {}", index + 1))?;
    }

    // into_inner writes the trailer
    encoder.into_inner().context("Failed to finish GIF stream")
}

/// Expand an indexed frame back to RGBA
fn palette_to_rgba(frame: &gif::Frame<'static>) -> Result<RgbaImage> {
    let palette = frame
        .palette
        .as_deref()
        .ok_or_else(|| anyhow!("Palette frame has no local color table"))?;

    let mut pixels = Vec::with_capacity(frame.buffer.len() * 4);
    for &index in frame.buffer.iter() {
        let offset = index as usize * 3;
        let rgb = palette
            .get(offset..offset + 3)
            .ok_or_else(|| anyhow!("Palette index {} out of range", index))?;
        let alpha = if frame.transparent == Some(index) { 0 } else { 255 };
        pixels.extend_from_slice(&[rgb[0], rgb[1], rgb[2], alpha]);
    }

    RgbaImage::from_raw(frame.width as u32, frame.height as u32, pixels)
        .ok_or_else(|| anyhow!("Palette frame buffer does not match its size"))
}

/// Place a frame on a transparent canvas of the given size
fn to_canvas(frame: &Frame, canvas: Dimensions) -> Result<RgbaImage> {
    let img = match frame {
        Frame::Rgba(img) => img.clone(),
        Frame::Palette(palette_frame) => palette_to_rgba(palette_frame)?,
    };

    if img.dimensions() == (canvas.width, canvas.height) {
        return Ok(img);
    }

    let (left, top) = centered_offset(canvas, frame.dimensions());
    let mut background = RgbaImage::from_pixel(canvas.width, canvas.height, Rgba([0, 0, 0, 0]));
    imageops::overlay(&mut background, &img, left as i64, top as i64);
    Ok(background)
}

/// Encode an infinitely looping animated WebP and return the file bytes
pub fn encode_webp(frames: &[Frame], duration_ms: u32, quality: u8) -> Result<Vec<u8>> {
    let canvas = canvas_size(frames);

    let mut config =
        WebPConfig::new().map_err(|_| anyhow!("Failed to initialize WebP encoder config"))?;
    config.quality = quality as f32;
    config.method = WEBP_METHOD;

    // Canvases must outlive the encoder, which borrows their pixels
    let canvases = frames
        .iter()
        .map(|frame| to_canvas(frame, canvas))
        .collect::<Result<Vec<_>>>()?;

    let mut encoder = AnimEncoder::new(canvas.width, canvas.height, &config);
    encoder.set_loop_count(0);

    for (index, img) in canvases.iter().enumerate() {
        let timestamp = i32::try_from(index as u64 * duration_ms as u64)
            .context("Animation too long for WebP timestamps")?;
        encoder.add_frame(AnimFrame::from_rgba(
            img.as_raw(),
            canvas.width,
            canvas.height,
            timestamp,
        ));
    }

    let webp = encoder
        .try_encode()
        .map_err(|e| anyhow!("WebP animation encoding failed: {:?}", e))?;
    Ok(webp.to_vec())
}

/// Encode `frames` and write them to `path`. Returns the written size in bytes.
pub fn save_animation(
    frames: &[Frame],
    path: &Path,
    settings: &AnimationSettings,
) -> Result<u64, ExportError> {
    if frames.is_empty() {
        return Err(ExportError::NoValidFrames { failed: 0 });
    }

    let duration_ms = frame_duration_ms(settings.fps);

    let written = match settings.format {
        OutputFormat::Gif => write_gif(frames, duration_ms, path),
        OutputFormat::Webp => encode_webp(frames, duration_ms, settings.quality).and_then(|bytes| {
            std::fs::write(path, &bytes)
                .with_context(|| format!("Failed to write {}", path.display()))
        }),
    };
    written.map_err(|e| ExportError::encode(path, e))?;

    let size = std::fs::metadata(path)
        .with_context(|| format!("Failed to stat {}", path.display()))
        .map_err(|e| ExportError::encode(path, e))?
        .len();
    Ok(size)
}

fn write_gif(frames: &[Frame], duration_ms: u32, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = encode_gif(frames, duration_ms, BufWriter::new(file))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))
}

/// `<dir-name>.<ext>` inside `dir`, or the first free `<dir-name>_N.<ext>`.
///
/// `dir` should be canonical so `.` resolves to a real folder name.
pub fn unique_output_path(dir: &Path, extension: &str, overwrite: bool) -> PathBuf {
    let base_name = dir
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .unwrap_or(FALLBACK_OUTPUT_NAME);

    let candidate = dir.join(format!("{}.{}", base_name, extension));
    if overwrite || !candidate.exists() {
        return candidate;
    }

    let mut counter = 1u32;
    loop {
        let candidate = dir.join(format!("{}_{}.{}", base_name, counter, extension));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}
