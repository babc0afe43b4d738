//! Error types for map tiler operations.

use thiserror::Error;

/// Result type alias using TilerError.
pub type TilerResult<T> = Result<T, TilerError>;

/// Primary error type for map tiler operations.
#[derive(Debug, Error)]
pub enum TilerError {
    // === Configuration Errors ===
    #[error("Minimum zoom level ({min}) must be less than or equal to maximum zoom level ({max})")]
    InvalidZoomRange { min: u32, max: u32 },

    #[error("Zoom level {zoom} is outside the supported range 0..={max}")]
    ZoomOutOfRange { zoom: u32, max: u32 },

    #[error("Input file not found: {0}")]
    InputNotFound(String),

    #[error("Column '{0}' not found in input")]
    MissingColumn(String),

    #[error("Unsupported coordinate system: {0}")]
    UnsupportedCrs(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Unknown colormap: {0}")]
    UnknownColormap(String),

    #[error("Dataset contains no projectable points")]
    EmptyDataset,

    #[error("Invalid extent: {0}")]
    InvalidExtent(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // === Stage Errors ===
    #[error("Pipeline stage '{stage}' failed: {message}")]
    Stage {
        stage: &'static str,
        message: String,
    },

    #[error("Failed to read input: {0}")]
    Read(String),

    #[error("Image is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}")]
    ImageSize {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("Failed to encode tile: {0}")]
    Encode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Broad category of an error, used to decide how it is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Detected before rendering starts.
    Configuration,
    /// Raised while a render session is running.
    Stage,
}

impl TilerError {
    /// Wrap any displayable failure as a stage error.
    pub fn stage(stage: &'static str, err: impl std::fmt::Display) -> Self {
        TilerError::Stage {
            stage,
            message: err.to_string(),
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            TilerError::InvalidZoomRange { .. }
            | TilerError::ZoomOutOfRange { .. }
            | TilerError::InputNotFound(_)
            | TilerError::MissingColumn(_)
            | TilerError::UnsupportedCrs(_)
            | TilerError::UnsupportedFormat(_)
            | TilerError::UnknownColormap(_)
            | TilerError::EmptyDataset
            | TilerError::InvalidExtent(_)
            | TilerError::InvalidArgument(_) => ErrorClass::Configuration,

            TilerError::Stage { .. }
            | TilerError::Read(_)
            | TilerError::ImageSize { .. }
            | TilerError::Encode(_)
            | TilerError::Io(_) => ErrorClass::Stage,
        }
    }
}
