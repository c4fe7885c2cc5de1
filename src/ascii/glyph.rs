//! Glyph quantizer: intensity samples to palette characters.

use super::Gray;

/// Glyph palette ordered dark to light.
///
/// Index 0 is the darkest symbol, the last index the lightest; the
/// ordering is part of the rendering contract and fixed for the process
/// lifetime.
pub const PALETTE: &[char] = &['@', '#', '%', '?', '*', '+', ':', ',', '.', ' '];

/// Map one intensity sample to a palette index.
///
/// `floor(v * (N-1) / 255)`: monotonic by construction, 0 maps to the
/// darkest glyph and 255 to the lightest.
pub fn glyph_index(v: u8, palette_len: usize) -> usize {
    v as usize * (palette_len - 1) / 255
}

/// Render an intensity grid as a printable glyph block.
///
/// Rows are assembled left to right, top to bottom, each terminated by
/// a line break. Total and side-effect-free; same input always yields
/// the same text.
pub fn to_glyphs(gray: &Gray, palette: &[char]) -> String {
    let width = gray.width as usize;
    let mut text = String::with_capacity(gray.data.len() + gray.height as usize);

    for row in gray.data.chunks_exact(width) {
        for &v in row {
            text.push(palette[glyph_index(v, palette.len())]);
        }
        text.push('\n');
    }

    text
}
