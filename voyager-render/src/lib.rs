pub mod error;
pub mod export;
pub mod iteration_buffer;
pub mod sampler;
pub mod tile;

pub use error::RenderError;
pub use export::{export_png, grayscale, ExportMetadata};
pub use iteration_buffer::IterationBuffer;
pub use sampler::{RenderResult, Sampler};
pub use tile::TILE_SIZE;

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;
