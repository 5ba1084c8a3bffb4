use thiserror::Error;

use voyager_core::{ArithmeticError, ConfigError, CoreError};

/// Errors originating from the sampling and output pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid image dimensions: {width}×{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A sample failed while iterating; the render is abandoned.
    #[error("sample ({x}, {y}) failed: {source}")]
    Sample {
        x: u32,
        y: u32,
        source: ArithmeticError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("PNG encoding failed: {0}")]
    Encoding(#[from] png::EncodingError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<ConfigError> for RenderError {
    fn from(e: ConfigError) -> Self {
        Self::Core(e.into())
    }
}
