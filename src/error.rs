use std::path::PathBuf;
use thiserror::Error;

/// Pipeline-level failures. Each variant belongs to one exit-code category.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no supported images were found in {}", .0.display())]
    NoImages(PathBuf),

    #[error("none of the {0} discovered images could be opened")]
    NoDecodableImages(usize),

    #[error("invalid group selector '{0}': use '0' for manual mode, an index like '1', or WIDTHxHEIGHT")]
    InvalidGroup(String),

    #[error("{0}")]
    InvalidDimensions(String),

    #[error("a value for {0} is required in non-interactive mode")]
    MissingInput(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to read answer from terminal: {0}")]
    Prompt(#[from] std::io::Error),

    #[error("no valid frames could be loaded ({failed} images failed)")]
    NoValidFrames { failed: usize },

    #[error("failed to write animation {}: {message}", path.display())]
    Encode { path: PathBuf, message: String },
}

impl ExportError {
    /// Process exit code for this error.
    ///
    /// 1: nothing to work with, 2: bad input or configuration,
    /// 3: frames could not be loaded or the output could not be written.
    pub fn exit_code(&self) -> u8 {
        match self {
            ExportError::NoImages(_) | ExportError::NoDecodableImages(_) => 1,
            ExportError::InvalidGroup(_)
            | ExportError::InvalidDimensions(_)
            | ExportError::MissingInput(_)
            | ExportError::Config(_)
            | ExportError::Prompt(_) => 2,
            ExportError::NoValidFrames { .. } | ExportError::Encode { .. } => 3,
        }
    }

    pub fn encode(path: impl Into<PathBuf>, err: anyhow::Error) -> Self {
        ExportError::Encode {
            path: path.into(),
            message: format!("{:#}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExportError::NoImages(PathBuf::from(".")).exit_code(), 1);
        assert_eq!(ExportError::NoDecodableImages(3).exit_code(), 1);
        assert_eq!(ExportError::InvalidGroup("99".into()).exit_code(), 2);
        assert_eq!(ExportError::MissingInput("--group".into()).exit_code(), 2);
        assert_eq!(ExportError::NoValidFrames { failed: 2 }.exit_code(), 3);
        assert_eq!(
            ExportError::encode("out.gif", anyhow::anyhow!("disk full")).exit_code(),
            3
        );
    }

    #[test]
    fn test_encode_message_keeps_context() {
        let err = anyhow::anyhow!("disk full").context("Failed to write frame 2");
        let export_err = ExportError::encode("out.gif", err);
        let message = export_err.to_string();
        assert!(message.contains("out.gif"));
        assert!(message.contains("Failed to write frame 2"));
        assert!(message.contains("disk full"));
    }
}
