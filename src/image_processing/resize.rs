use anyhow::{Context, Result};
use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::RgbaImage;

use super::Dimensions;

/// Resample an RGBA image to exactly `target`, ignoring aspect ratio.
///
/// Uses a Lanczos3 convolution. Color is premultiplied by alpha during the
/// resample so transparent pixels do not bleed into their neighbours.
pub fn resize_exact(img: &RgbaImage, target: Dimensions) -> Result<RgbaImage> {
    let (src_width, src_height) = img.dimensions();

    if src_width == target.width && src_height == target.height {
        return Ok(img.clone());
    }
    if target.width == 0 || target.height == 0 {
        return Err(anyhow::anyhow!("Target size {} has a zero side", target));
    }

    let src_image = Image::from_vec_u8(src_width, src_height, img.as_raw().clone(), PixelType::U8x4)
        .context("Failed to prepare source image for resizing")?;

    let mut dst_image = Image::new(target.width, target.height, PixelType::U8x4);

    let options = ResizeOptions::new()
        .resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3))
        .use_alpha(true);

    let mut resizer = Resizer::new();
    resizer
        .resize(&src_image, &mut dst_image, &options)
        .with_context(|| format!("Failed to resize {}x{} to {}", src_width, src_height, target))?;

    RgbaImage::from_raw(target.width, target.height, dst_image.buffer().to_vec())
        .ok_or_else(|| anyhow::anyhow!("Resized buffer does not match {}", target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    fn create_test_image(width: u32, height: u32) -> RgbaImage {
        ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
        })
    }

    #[test]
    fn test_resize_to_exact_dimensions_any_aspect() {
        let img = create_test_image(100, 40);
        for (w, h) in [(50, 50), (10, 300), (333, 17), (1, 1), (100, 40)] {
            let resized = resize_exact(&img, Dimensions::new(w, h)).unwrap();
            assert_eq!(resized.dimensions(), (w, h));
        }
    }

    #[test]
    fn test_resize_upscale() {
        let img = create_test_image(3, 5);
        let resized = resize_exact(&img, Dimensions::new(64, 48)).unwrap();
        assert_eq!(resized.dimensions(), (64, 48));
    }

    #[test]
    fn test_resize_keeps_uniform_color() {
        let img = RgbaImage::from_pixel(40, 40, Rgba([200, 100, 50, 255]));
        let resized = resize_exact(&img, Dimensions::new(13, 29)).unwrap();
        for pixel in resized.pixels() {
            assert!((pixel[0] as i32 - 200).abs() <= 1);
            assert!((pixel[1] as i32 - 100).abs() <= 1);
            assert!((pixel[2] as i32 - 50).abs() <= 1);
            assert_eq!(pixel[3], 255);
        }
    }

    #[test]
    fn test_resize_fully_transparent_stays_transparent() {
        let img = RgbaImage::from_pixel(20, 20, Rgba([255, 0, 0, 0]));
        let resized = resize_exact(&img, Dimensions::new(7, 9)).unwrap();
        assert!(resized.pixels().all(|p| p[3] == 0));
    }
}
