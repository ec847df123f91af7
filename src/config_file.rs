use crate::cli::{Args, OutputFormat, DEFAULT_FPS, DEFAULT_QUALITY, MAX_FPS};
use crate::error::ExportError;
use crate::utils::verbose_println;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Defaults file passed with `--config`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigFile {
    pub dir: Option<String>,
    pub format: Option<String>,
    pub fps: Option<u32>,
    pub quality: Option<u8>,
    pub resize: Option<String>,
    pub group: Option<String>,
    pub reverse: Option<bool>,
    pub overwrite: Option<bool>,
    pub non_interactive: Option<bool>,
    pub verbose: Option<bool>,
}

impl Args {
    /// Load configuration from a JSON file and merge with command-line arguments
    /// Command-line arguments take precedence over config file values
    pub fn load_and_merge_config(&mut self) -> Result<(), ExportError> {
        if let Some(config_path) = self.config_file.clone() {
            let contents = fs::read_to_string(&config_path).map_err(|e| {
                ExportError::Config(format!(
                    "failed to read config file {}: {}",
                    config_path.display(),
                    e
                ))
            })?;

            let config: ConfigFile = serde_json::from_str(&contents).map_err(|e| {
                ExportError::Config(format!(
                    "failed to parse config file {}: {}",
                    config_path.display(),
                    e
                ))
            })?;

            self.merge_from_config(config)?;

            verbose_println(
                self.verbose,
                &format!("Loaded configuration from: {}", config_path.display()),
            );
        }
        Ok(())
    }

    /// A value is taken from the file only where the field still holds its
    /// command-line default
    pub fn merge_from_config(&mut self, config: ConfigFile) -> Result<(), ExportError> {
        if self.dir == PathBuf::from(".") {
            if let Some(dir) = config.dir {
                self.dir = PathBuf::from(dir);
            }
        }

        if self.format.is_none() {
            if let Some(format) = config.format {
                self.format = Some(
                    format
                        .parse::<OutputFormat>()
                        .map_err(ExportError::Config)?,
                );
            }
        }

        if self.fps == DEFAULT_FPS {
            if let Some(fps) = config.fps {
                if !(1..=MAX_FPS).contains(&fps) {
                    return Err(ExportError::Config(format!(
                        "fps must be between 1 and {}, got {}",
                        MAX_FPS, fps
                    )));
                }
                self.fps = fps;
            }
        }

        if self.quality == DEFAULT_QUALITY {
            if let Some(quality) = config.quality {
                if !(1..=100).contains(&quality) {
                    return Err(ExportError::Config(format!(
                        "quality must be between 1 and 100, got {}",
                        quality
                    )));
                }
                self.quality = quality;
            }
        }

        // Validated later by resize_target(), like the flag
        if self.resize.is_none() {
            self.resize = config.resize;
        }

        if self.group.is_none() {
            self.group = config.group;
        }

        // Boolean flags - only apply if currently false (default)
        if !self.reverse {
            self.reverse = config.reverse.unwrap_or(false);
        }

        if !self.overwrite {
            self.overwrite = config.overwrite.unwrap_or(false);
        }

        if !self.non_interactive {
            self.non_interactive = config.non_interactive.unwrap_or(false);
        }

        if !self.verbose {
            self.verbose = config.verbose.unwrap_or(false);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["folder2anim"];
        argv.extend_from_slice(args);
        Args::parse_from(argv)
    }

    fn write_config(dir: &tempfile::TempDir, json: &str) -> PathBuf {
        let path = dir.path().join("folder2anim.json");
        fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"{ "format": "webp", "fps": 12, "quality": 90, "resize": "640x640",
                 "reverse": true, "nonInteractive": true }"#,
        );
        let mut args = parse(&["--config", path.to_str().unwrap()]);
        args.load_and_merge_config().unwrap();

        assert_eq!(args.format, Some(OutputFormat::Webp));
        assert_eq!(args.fps, 12);
        assert_eq!(args.quality, 90);
        assert_eq!(args.resize.as_deref(), Some("640x640"));
        assert!(args.reverse);
        assert!(args.non_interactive);
        assert!(!args.overwrite);
    }

    #[test]
    fn test_cli_flags_win() {
        let mut args = parse(&["--format", "gif", "--fps", "24", "--resize", "10x10"]);
        let config = ConfigFile {
            format: Some("webp".to_string()),
            fps: Some(12),
            resize: Some("640x640".to_string()),
            ..Default::default()
        };
        args.merge_from_config(config).unwrap();

        assert_eq!(args.format, Some(OutputFormat::Gif));
        assert_eq!(args.fps, 24);
        assert_eq!(args.resize.as_deref(), Some("10x10"));
    }

    #[test]
    fn test_invalid_config_values() {
        let mut args = parse(&[]);
        let config = ConfigFile {
            fps: Some(200),
            ..Default::default()
        };
        assert!(matches!(args.merge_from_config(config), Err(ExportError::Config(_))));

        let config = ConfigFile {
            format: Some("png".to_string()),
            ..Default::default()
        };
        assert!(matches!(args.merge_from_config(config), Err(ExportError::Config(_))));
    }

    #[test]
    fn test_unreadable_or_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let mut args = parse(&["-c", missing.to_str().unwrap()]);
        let err = args.load_and_merge_config().unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let path = write_config(&dir, "{ fps: ");
        let mut args = parse(&["-c", path.to_str().unwrap()]);
        assert!(matches!(args.load_and_merge_config(), Err(ExportError::Config(_))));

        let path = write_config(&dir, r#"{ "speed": 3 }"#);
        let mut args = parse(&["-c", path.to_str().unwrap()]);
        assert!(matches!(args.load_and_merge_config(), Err(ExportError::Config(_))));
    }

    #[test]
    fn test_no_config_is_noop() {
        let mut args = parse(&[]);
        args.load_and_merge_config().unwrap();
        assert_eq!(args.fps, DEFAULT_FPS);
        assert!(args.format.is_none());
    }
}
