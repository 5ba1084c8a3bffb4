//! PNG export with embedded metadata (tEXt chunks).

use std::io::BufWriter;
use std::path::Path;

use tracing::debug;

use crate::error::RenderError;
use crate::iteration_buffer::IterationBuffer;

/// Parameters of a render, embedded in the exported PNG as tEXt chunks.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportMetadata {
    /// Which loop produced the counts, e.g. `mandelbrot (arbitrary)`.
    pub kind: String,
    /// Human-readable recurrence.
    pub formula: String,
    pub center_re: String,
    pub center_im: String,
    pub spacing: String,
    pub max_iterations: u32,
    pub precision_digits: u32,
    pub escape_radius: f64,
}

/// Map iteration counts to 8-bit gray levels.
///
/// Stable samples are black. Escaped samples brighten with their count on a
/// square-root curve and never reach zero.
pub fn grayscale(buffer: &IterationBuffer) -> Vec<u8> {
    let max = buffer.max_iterations.max(1) as f64;
    buffer
        .data
        .iter()
        .map(|&n| {
            if buffer.is_stable(n) {
                0
            } else {
                let level = ((n as f64 + 1.0) / max).sqrt() * 255.0;
                level.round().clamp(1.0, 255.0) as u8
            }
        })
        .collect()
}

/// Write the buffer as a grayscale PNG with the render's parameters embedded.
pub fn export_png(
    buffer: &IterationBuffer,
    path: &Path,
    metadata: &ExportMetadata,
) -> Result<(), RenderError> {
    let (width, height) = (buffer.width, buffer.height);
    if width == 0 || height == 0 || buffer.data.len() != width as usize * height as usize {
        return Err(RenderError::InvalidDimensions { width, height });
    }

    let file = std::fs::File::create(path)?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, width, height);
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Default);

    encoder.add_text_chunk("Software".to_string(), "Fractal Voyager".to_string())?;
    encoder.add_text_chunk("Description".to_string(), build_description(metadata))?;
    for (key, value) in build_metadata_pairs(metadata, width, height) {
        encoder.add_text_chunk(key, value)?;
    }

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(&grayscale(buffer))?;
    png_writer.finish()?;

    debug!("Exported PNG {}x{} to {}", width, height, path.display());
    Ok(())
}

fn build_description(meta: &ExportMetadata) -> String {
    format!(
        "{} - Center: {} {}i, Spacing: {}, Iterations: {}",
        meta.formula, meta.center_re, meta.center_im, meta.spacing, meta.max_iterations,
    )
}

fn build_metadata_pairs(meta: &ExportMetadata, width: u32, height: u32) -> Vec<(String, String)> {
    vec![
        ("FractalVoyager.Kind".into(), meta.kind.clone()),
        ("FractalVoyager.Formula".into(), meta.formula.clone()),
        ("FractalVoyager.CenterRe".into(), meta.center_re.clone()),
        ("FractalVoyager.CenterIm".into(), meta.center_im.clone()),
        ("FractalVoyager.Spacing".into(), meta.spacing.clone()),
        ("FractalVoyager.MaxIterations".into(), meta.max_iterations.to_string()),
        ("FractalVoyager.Precision".into(), meta.precision_digits.to_string()),
        ("FractalVoyager.EscapeRadius".into(), meta.escape_radius.to_string()),
        ("FractalVoyager.Resolution".into(), format!("{width}x{height}")),
    ]
}
