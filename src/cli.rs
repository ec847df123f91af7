use clap::{Parser, ValueEnum};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ExportError;
use crate::image_processing::Dimensions;

pub const DEFAULT_FPS: u32 = 8;
pub const MAX_FPS: u32 = 60;
pub const DEFAULT_QUALITY: u8 = 80;

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Animated GIF: universally supported, 256-color palette, no alpha
    #[value(name = "gif")]
    Gif,
    /// Animated WebP: full color with alpha channel
    #[value(name = "webp")]
    Webp,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Gif => "gif",
            OutputFormat::Webp => "webp",
        }
    }

    /// GIF has no continuous alpha channel
    pub fn is_palette_based(&self) -> bool {
        matches!(self, OutputFormat::Gif)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.extension().to_uppercase())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gif" => Ok(OutputFormat::Gif),
            "webp" => Ok(OutputFormat::Webp),
            other => Err(format!(
                "Invalid output format '{}'. Valid formats: gif, webp",
                other
            )),
        }
    }
}

/// How the frames of the animation are chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupSelector {
    /// Build the frame list by hand (selector `0`)
    Manual,
    /// 1-based position in the group table (largest area first)
    Index(usize),
    /// Literal group key
    Dimensions(Dimensions),
}

impl FromStr for GroupSelector {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == "0" {
            return Ok(GroupSelector::Manual);
        }
        if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
            return trimmed
                .parse::<usize>()
                .map(GroupSelector::Index)
                .map_err(|_| ExportError::InvalidGroup(s.to_string()));
        }
        trimmed
            .parse::<Dimensions>()
            .map(GroupSelector::Dimensions)
            .map_err(|_| ExportError::InvalidGroup(s.to_string()))
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "folder2anim",
    version,
    about = "Group the images of a folder by dimensions and export them as an animation",
    long_about = "
folder2anim - image-to-animation exporter

Scans one folder (non-recursive) for jpg, jpeg, png, bmp, tif, tiff and webp
images, groups them by pixel dimensions and exports one group, or a hand-built
frame sequence, as an infinitely looping GIF or WebP animation. The output is
written into the scanned folder and named after it.

Exit codes:
  0  success (also dry-run and user cancel)
  1  no images found, or none could be opened
  2  invalid user input or configuration
  3  frames could not be loaded or the animation could not be saved

Example Usage:
  # Fully interactive
  folder2anim

  # Manual frame selection and ordering
  folder2anim --group 0

  # Manual mode without prompts
  folder2anim --group 0 --sequence 3,1,2 --format gif --non-interactive

  # Largest group as WebP at 12 fps
  folder2anim --group 1 --format webp --fps 12

  # Pick a group by size and resize every frame
  folder2anim --group 1920x1080 --resize 1080x1080

  # Newest first, preview the plan only
  folder2anim --reverse --format gif --fps 6 --dry-run"
)]
pub struct Args {
    /// Folder to scan; the animation is written here as <folder-name>.<ext>
    #[arg(short = 'd', long = "dir", default_value = ".", value_name = "DIR")]
    pub dir: PathBuf,

    /// Output animation format (prompted when omitted)
    #[arg(short = 'f', long = "format", value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Frames per second
    #[arg(
        long = "fps",
        default_value_t = DEFAULT_FPS,
        value_parser = clap::value_parser!(u32).range(1..=MAX_FPS as i64),
        value_name = "FPS"
    )]
    pub fps: u32,

    /// Resize all frames to WIDTHxHEIGHT (e.g., 1080x1080)
    #[arg(long = "resize", value_name = "WIDTHxHEIGHT")]
    pub resize: Option<String>,

    /// Group by index (e.g. '1'), by dimensions (e.g. '1920x1080'), or '0' for manual selection
    #[arg(short = 'g', long = "group", value_name = "SELECTOR")]
    pub group: Option<String>,

    /// Comma-separated image numbers for manual mode (e.g. "3,1,2")
    #[arg(long = "sequence", value_name = "LIST")]
    pub sequence: Option<String>,

    /// Reverse chronological order (newest first)
    #[arg(long = "reverse")]
    pub reverse: bool,

    /// Overwrite an existing output file instead of picking a numbered name
    #[arg(long = "overwrite")]
    pub overwrite: bool,

    /// WebP quality (ignored for GIF)
    #[arg(
        short = 'q',
        long = "quality",
        default_value_t = DEFAULT_QUALITY,
        value_parser = clap::value_parser!(u8).range(1..=100),
        value_name = "1-100"
    )]
    pub quality: u8,

    /// Never prompt; use defaults or fail when a required value is missing
    #[arg(long = "non-interactive")]
    pub non_interactive: bool,

    /// Print the export plan without writing any file
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Enable verbose output with detailed progress information
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// JSON file with default settings (command-line flags take precedence)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,
}

impl Args {
    /// Parse the --resize value, if any
    pub fn resize_target(&self) -> Result<Option<Dimensions>, ExportError> {
        match self.resize.as_deref() {
            None => Ok(None),
            Some(raw) => raw
                .parse::<Dimensions>()
                .map(Some)
                .map_err(|e| ExportError::InvalidDimensions(format!("Invalid --resize value: {}", e))),
        }
    }

    /// Manual-mode commands pre-supplied through --sequence
    pub fn sequence_commands(&self) -> Option<Vec<String>> {
        self.sequence.as_ref().map(|list| {
            list.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["folder2anim"];
        argv.extend_from_slice(args);
        Args::parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.dir, PathBuf::from("."));
        assert_eq!(args.fps, DEFAULT_FPS);
        assert_eq!(args.quality, DEFAULT_QUALITY);
        assert!(args.format.is_none());
        assert!(!args.non_interactive);
    }

    #[test]
    fn test_fps_out_of_range_rejected() {
        let result = Args::try_parse_from(["folder2anim", "--fps", "0"]);
        assert!(result.is_err());
        let result = Args::try_parse_from(["folder2anim", "--fps", "61"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_quality_out_of_range_rejected() {
        assert!(Args::try_parse_from(["folder2anim", "--quality", "101"]).is_err());
        assert!(Args::try_parse_from(["folder2anim", "-q", "100"]).is_ok());
    }

    #[test]
    fn test_group_selector_parsing() {
        assert_eq!("0".parse::<GroupSelector>().unwrap(), GroupSelector::Manual);
        assert_eq!("2".parse::<GroupSelector>().unwrap(), GroupSelector::Index(2));
        assert_eq!(
            "1920x1080".parse::<GroupSelector>().unwrap(),
            GroupSelector::Dimensions(Dimensions::new(1920, 1080))
        );
        assert!(matches!(
            "banana".parse::<GroupSelector>(),
            Err(ExportError::InvalidGroup(_))
        ));
        assert!("0x10".parse::<GroupSelector>().is_err());
    }

    #[test]
    fn test_resize_target() {
        let args = parse(&["--resize", "640X480"]);
        assert_eq!(args.resize_target().unwrap(), Some(Dimensions::new(640, 480)));

        let args = parse(&["--resize", "640"]);
        let err = args.resize_target().unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_sequence_commands() {
        let args = parse(&["--sequence", "3, 1,,2"]);
        assert_eq!(
            args.sequence_commands().unwrap(),
            vec!["3".to_string(), "1".to_string(), "2".to_string()]
        );
        assert!(parse(&[]).sequence_commands().is_none());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(" WebP ".parse::<OutputFormat>().unwrap(), OutputFormat::Webp);
        assert_eq!("gif".parse::<OutputFormat>().unwrap(), OutputFormat::Gif);
        assert!("png".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Webp.to_string(), "WEBP");
    }
}
