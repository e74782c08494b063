// Library exports for reuse by the GUI and other applications
pub mod cli;
pub mod image_processing;
pub mod json_output;
pub mod selection;
pub mod utils;

// Re-export commonly used types
pub use cli::OutputFormat;
pub use image_processing::{BatchReport, ConversionEngine, ConversionOptions, FileOutcome};
pub use json_output::JsonMessage;
pub use selection::Selection;
