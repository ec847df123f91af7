pub mod convert;
pub mod encode;
pub mod grouping;
pub mod ordering;
pub mod orientation;
pub mod resize;

use anyhow::{Context, Result};
use image::{ImageDecoder, ImageReader};
use std::cell::OnceCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use walkdir::WalkDir;

use crate::utils::{get_file_extension, has_valid_extension, verbose_println, warn_println};

/// Extensions picked up by discovery (compared lowercase)
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff", "webp"];

/// Pixel size of an image, a resize target or a group key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Dimensions {
    type Err = String;

    /// Parse `WIDTHxHEIGHT`, case-insensitive, whitespace around the parts allowed
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let (w, h) = lowered
            .split_once('x')
            .ok_or_else(|| "Expected format WIDTHxHEIGHT, e.g., 1080x1080".to_string())?;

        let width = w
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("Invalid width: '{}'", w.trim()))?;
        let height = h
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("Invalid height: '{}'", h.trim()))?;

        if width == 0 || height == 0 {
            return Err("Width and height must be greater than 0".to_string());
        }

        Ok(Dimensions { width, height })
    }
}

/// A candidate source image found during discovery.
///
/// Dimensions and alpha presence are read from the file header on first use
/// and cached for the rest of the run.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub path: PathBuf,
    pub extension: String,
    pub size_bytes: u64,
    dimensions: OnceCell<Result<Dimensions, String>>,
    has_alpha: OnceCell<bool>,
}

impl ImageFile {
    pub fn new(path: impl Into<PathBuf>, size_bytes: u64) -> Self {
        let path = path.into();
        let extension = get_file_extension(&path).unwrap_or_default();
        Self {
            path,
            extension,
            size_bytes,
            dimensions: OnceCell::new(),
            has_alpha: OnceCell::new(),
        }
    }

    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("unknown")
    }

    /// Pixel dimensions as stored in the file (before EXIF orientation)
    pub fn dimensions(&self) -> Result<Dimensions> {
        self.dimensions
            .get_or_init(|| read_dimensions(&self.path).map_err(|e| format!("{:#}", e)))
            .clone()
            .map_err(anyhow::Error::msg)
    }

    /// Whether the decoded color type carries an alpha channel
    pub fn has_alpha(&self) -> bool {
        *self
            .has_alpha
            .get_or_init(|| read_has_alpha(&self.path).unwrap_or(false))
    }
}

/// Read dimensions from the image header without decoding pixel data
pub fn read_dimensions(path: &Path) -> Result<Dimensions> {
    let (width, height) = ImageReader::open(path)
        .with_context(|| format!("Failed to open image: {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("Failed to detect image format: {}", path.display()))?
        .into_dimensions()
        .with_context(|| format!("Could not read image {}", path.display()))?;
    Ok(Dimensions::new(width, height))
}

fn read_has_alpha(path: &Path) -> Result<bool> {
    let decoder = ImageReader::open(path)?
        .with_guessed_format()?
        .into_decoder()?;
    Ok(decoder.color_type().has_alpha())
}

/// List supported images directly inside `dir` (no recursion), sorted by file name.
///
/// Unreadable directory entries are reported and skipped.
pub fn discover_images(dir: &Path, verbose: bool) -> Vec<ImageFile> {
    verbose_println(verbose, &format!("Scanning directory: {}", dir.display()));

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    let mut image_files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn_println(&format!("Skipping unreadable entry: {}", e));
                continue;
            }
        };

        let path = entry.path();
        if entry.file_type().is_file() && has_valid_extension(path, SUPPORTED_EXTENSIONS) {
            let size_bytes = entry.metadata().map(|m| m.len()).unwrap_or(0);
            image_files.push(ImageFile::new(path, size_bytes));
        }
    }

    verbose_println(verbose, &format!("Found {} image files", image_files.len()));
    image_files
}

#[cfg(test)]
pub(crate) mod test_support {
    use image::{Rgba, RgbaImage};
    use std::path::{Path, PathBuf};

    /// Write a PNG filled with one color and return its path
    pub fn write_png(dir: &Path, name: &str, width: u32, height: u32, color: [u8; 4]) -> PathBuf {
        let path = dir.join(name);
        let img = RgbaImage::from_pixel(width, height, Rgba(color));
        if color[3] == 255 {
            image::DynamicImage::ImageRgba8(img)
                .to_rgb8()
                .save(&path)
                .unwrap();
        } else {
            img.save(&path).unwrap();
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::write_png;
    use super::*;

    #[test]
    fn test_parse_dimensions() {
        assert_eq!("800x480".parse::<Dimensions>().unwrap(), Dimensions::new(800, 480));
        assert_eq!(" 1920 X 1080 ".parse::<Dimensions>().unwrap(), Dimensions::new(1920, 1080));
    }

    #[test]
    fn test_parse_dimensions_invalid() {
        assert!("invalid".parse::<Dimensions>().is_err());
        assert!("800".parse::<Dimensions>().is_err());
        assert!("0x480".parse::<Dimensions>().is_err());
        assert!("800x-1".parse::<Dimensions>().is_err());
        assert!("axb".parse::<Dimensions>().is_err());
    }

    #[test]
    fn test_dimensions_display() {
        assert_eq!(Dimensions::new(100, 50).to_string(), "100x50");
        assert_eq!(Dimensions::new(100, 50).area(), 5000);
    }

    #[test]
    fn test_discover_images_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "b.png", 4, 4, [0, 0, 0, 255]);
        write_png(dir.path(), "A.PNG", 4, 4, [0, 0, 0, 255]);
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        std::fs::write(dir.path().join("noext"), "hello").unwrap();
        std::fs::create_dir(dir.path().join("nested.png")).unwrap();
        write_png(&dir.path().join("nested.png"), "deep.png", 4, 4, [0, 0, 0, 255]);

        let found = discover_images(dir.path(), false);
        let names: Vec<&str> = found.iter().map(|f| f.file_name()).collect();
        assert_eq!(names, vec!["A.PNG", "b.png"]);
        assert_eq!(found[0].extension, "png");
        assert!(found[0].size_bytes > 0);
    }

    #[test]
    fn test_discover_images_only_non_images() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("readme.md"), "# hi").unwrap();
        std::fs::write(dir.path().join("style.css"), "body{}").unwrap();
        assert!(discover_images(dir.path(), false).is_empty());
    }

    #[test]
    fn test_image_file_lazy_probe() {
        let dir = tempfile::tempdir().unwrap();
        let opaque = write_png(dir.path(), "opaque.png", 12, 7, [10, 20, 30, 255]);
        let alpha = write_png(dir.path(), "alpha.png", 3, 3, [10, 20, 30, 0]);
        let broken = dir.path().join("broken.jpg");
        std::fs::write(&broken, b"not a jpeg").unwrap();

        let opaque = ImageFile::new(opaque, 0);
        assert_eq!(opaque.dimensions().unwrap(), Dimensions::new(12, 7));
        assert!(!opaque.has_alpha());

        let alpha = ImageFile::new(alpha, 0);
        assert!(alpha.has_alpha());

        let broken = ImageFile::new(broken, 0);
        assert!(broken.dimensions().is_err());
        assert!(!broken.has_alpha());
    }
}
