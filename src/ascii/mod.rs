//! Frame-to-glyph rendering pipeline.
//!
//! A color frame flows strictly downward: center square crop and
//! area-average resize ([`geometry`]), grayscale + local contrast
//! equalization + edge-preserving smoothing + normalization
//! ([`enhance`]), then quantization to an ordered glyph palette
//! ([`glyph`]). Every stage is a pure function; failures are typed and
//! recovered only by the session controller.

pub mod enhance;
pub mod geometry;
pub mod glyph;

use thiserror::Error;

use crate::camera::Frame;

/// Working width of the glyph grid in characters.
pub const TARGET_WIDTH: u32 = 70;

/// Errors produced by the rendering pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The input frame is malformed (zero-sized or short pixel buffer)
    #[error("invalid frame: {0}")]
    InvalidFrame(&'static str),
}

/// A single-channel intensity grid, values in [0, 255], row-major.
#[derive(Debug, Clone)]
pub struct Gray {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Run the full pipeline: crop/resize, enhance, quantize.
///
/// Returns the printable glyph block, one `\n`-terminated row per grid
/// row, or a typed failure on malformed input.
pub fn render_frame(frame: &Frame, target_width: u32) -> Result<String, RenderError> {
    let working = geometry::square_crop_and_resize(frame, target_width)?;
    let enhanced = enhance::enhance(&working)?;
    Ok(glyph::to_glyphs(&enhanced, glyph::PALETTE))
}
