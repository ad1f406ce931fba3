// Error types for the collaborators around the simulation core: track import and programs

use thiserror::Error;

/// Track surface errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TrackError {
    #[error("Track surface must be at least 1x1, got {width}x{height}")]
    EmptySurface { width: u32, height: u32 },
    #[error("Pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
    #[error("Replacement is {actual_width}x{actual_height}, surface is {width}x{height}")]
    SizeMismatch {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },
    #[error("Failed to decode track image: {0}")]
    Decode(String),
}

/// Program editor errors
#[derive(Error, Debug)]
pub enum ProgramError {
    #[error("Built-in template '{0}' is missing from the embedded assets")]
    MissingTemplate(String),
    #[error("Template '{0}' is not valid UTF-8")]
    InvalidEncoding(String),
    #[error("Failed to read program {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Program is missing `{0}`")]
    MissingEntryPoint(&'static str),
}
