// Library exports for the folder2anim binary and integration tests
pub mod cli;
pub mod config_file;
pub mod error;
pub mod image_processing;
pub mod pipeline;
pub mod prompt;
pub mod report;
pub mod session;
pub mod utils;

// Re-export commonly used types
pub use cli::{Args, GroupSelector, OutputFormat};
pub use error::ExportError;
pub use image_processing::{Dimensions, ImageFile};
pub use pipeline::{run, ExportSummary, RunOutcome};
pub use prompt::{Prompter, ScriptedPrompter, TerminalPrompter};
