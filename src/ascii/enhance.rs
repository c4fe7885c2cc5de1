//! Contrast pipeline: grayscale, local equalization, edge-preserving
//! smoothing, and value normalization.
//!
//! Stage order is fixed: equalize before smoothing so the filter works
//! on contrast-boosted detail rather than raw sensor noise, normalize
//! last so quantization always sees the full dynamic range.

use crate::camera::Frame;

use super::{Gray, RenderError};

/// Tile grid used for local histogram equalization (8x8 tiles).
const EQ_TILES: usize = 8;
/// Contrast clip limit for the tiled equalization.
const EQ_CLIP_LIMIT: f32 = 2.0;
/// Bilateral filter neighborhood radius (diameter 5).
const SMOOTH_RADIUS: i32 = 2;
/// Bilateral filter range sigma.
const SIGMA_COLOR: f32 = 50.0;
/// Bilateral filter spatial sigma.
const SIGMA_SPACE: f32 = 50.0;

/// Run the full contrast pipeline on a working RGB image.
///
/// Pure: no side effects, total on well-formed input.
///
/// # Errors
/// * `RenderError::InvalidFrame` - zero-sized image or short buffer
pub fn enhance(frame: &Frame) -> Result<Gray, RenderError> {
    if frame.width == 0 || frame.height == 0 {
        return Err(RenderError::InvalidFrame("zero-sized frame"));
    }
    if frame.data.len() < frame.expected_len() {
        return Err(RenderError::InvalidFrame("short pixel buffer"));
    }

    let gray = to_grayscale(frame);
    let equalized = equalize_local(&gray);
    let mut smoothed = smooth_bilateral(&equalized);
    normalize(&mut smoothed);
    Ok(smoothed)
}

/// Convert an RGB frame to grayscale using ITU-R BT.601 luminance.
///
/// Integer math in the hot path; coefficients scaled by 1000
/// (299 + 587 + 114 = 1000).
pub fn to_grayscale(frame: &Frame) -> Gray {
    let pixel_count = (frame.width * frame.height) as usize;
    let mut data = Vec::with_capacity(pixel_count);

    for rgb in frame.data.chunks_exact(3) {
        let r = rgb[0] as u32;
        let g = rgb[1] as u32;
        let b = rgb[2] as u32;
        let luminance = (299 * r + 587 * g + 114 * b) / 1000;
        data.push(luminance as u8);
    }

    Gray {
        data,
        width: frame.width,
        height: frame.height,
    }
}

/// Contrast-limited tiled histogram equalization.
///
/// The image is divided into an 8x8 grid of equal-size tiles (edge
/// pixels replicated so the grid covers the image exactly). Each tile
/// gets a clipped-histogram CDF lookup table; every pixel is then
/// remapped by bilinear interpolation between the four surrounding tile
/// tables, which avoids visible tile seams.
pub fn equalize_local(src: &Gray) -> Gray {
    let w = src.width as usize;
    let h = src.height as usize;
    let tile_w = w.div_ceil(EQ_TILES);
    let tile_h = h.div_ceil(EQ_TILES);
    let tile_pixels = (tile_w * tile_h) as u32;

    // One 256-entry lookup table per tile.
    let mut luts = vec![[0u8; 256]; EQ_TILES * EQ_TILES];
    for ty in 0..EQ_TILES {
        for tx in 0..EQ_TILES {
            let mut hist = [0u32; 256];
            for dy in 0..tile_h {
                let y = (ty * tile_h + dy).min(h - 1);
                for dx in 0..tile_w {
                    let x = (tx * tile_w + dx).min(w - 1);
                    hist[src.data[y * w + x] as usize] += 1;
                }
            }
            clip_histogram(&mut hist, tile_pixels);

            let lut = &mut luts[ty * EQ_TILES + tx];
            let mut cdf = 0u32;
            for (v, slot) in lut.iter_mut().enumerate() {
                cdf += hist[v];
                *slot = ((cdf * 255) / tile_pixels).min(255) as u8;
            }
        }
    }

    let mut out = vec![0u8; w * h];
    for y in 0..h {
        let gy = (y as f32 + 0.5) / tile_h as f32 - 0.5;
        let (ty0, ty1, fy) = tile_span(gy);
        for x in 0..w {
            let gx = (x as f32 + 0.5) / tile_w as f32 - 0.5;
            let (tx0, tx1, fx) = tile_span(gx);

            let v = src.data[y * w + x] as usize;
            let top = luts[ty0 * EQ_TILES + tx0][v] as f32 * (1.0 - fx)
                + luts[ty0 * EQ_TILES + tx1][v] as f32 * fx;
            let bottom = luts[ty1 * EQ_TILES + tx0][v] as f32 * (1.0 - fx)
                + luts[ty1 * EQ_TILES + tx1][v] as f32 * fx;
            out[y * w + x] = (top * (1.0 - fy) + bottom * fy).round() as u8;
        }
    }

    Gray {
        data: out,
        width: src.width,
        height: src.height,
    }
}

/// Clip a tile histogram at the contrast limit and redistribute the
/// excess uniformly, keeping the total count intact.
fn clip_histogram(hist: &mut [u32; 256], tile_pixels: u32) {
    let limit = ((EQ_CLIP_LIMIT * tile_pixels as f32 / 256.0) as u32).max(1);

    let mut excess = 0u32;
    for bucket in hist.iter_mut() {
        if *bucket > limit {
            excess += *bucket - limit;
            *bucket = limit;
        }
    }

    let per_bin = excess / 256;
    let remainder = (excess % 256) as usize;
    for (i, bucket) in hist.iter_mut().enumerate() {
        *bucket += per_bin + u32::from(i < remainder);
    }
}

/// Map a fractional tile coordinate to the two neighboring tile indices
/// and the interpolation weight toward the second one. Border pixels
/// collapse to the nearest tile with weight 0.
fn tile_span(g: f32) -> (usize, usize, f32) {
    if g <= 0.0 {
        (0, 0, 0.0)
    } else if g >= (EQ_TILES - 1) as f32 {
        (EQ_TILES - 1, EQ_TILES - 1, 0.0)
    } else {
        let t0 = g.floor() as usize;
        (t0, t0 + 1, g - g.floor())
    }
}

/// Edge-preserving bilateral smoothing over a 5x5 neighborhood.
///
/// Each output sample is a weighted average of its neighbors where the
/// weight falls off with both spatial distance and intensity difference,
/// so flat regions are denoised without blurring across strong edges.
/// Borders are handled by clamping coordinates (edge replication).
pub fn smooth_bilateral(src: &Gray) -> Gray {
    let w = src.width as i32;
    let h = src.height as i32;
    let window = (2 * SMOOTH_RADIUS + 1) as usize;

    let mut spatial = vec![0f32; window * window];
    for dy in -SMOOTH_RADIUS..=SMOOTH_RADIUS {
        for dx in -SMOOTH_RADIUS..=SMOOTH_RADIUS {
            let d2 = (dx * dx + dy * dy) as f32;
            spatial[((dy + SMOOTH_RADIUS) as usize) * window + (dx + SMOOTH_RADIUS) as usize] =
                (-d2 / (2.0 * SIGMA_SPACE * SIGMA_SPACE)).exp();
        }
    }

    let mut range = [0f32; 256];
    for (d, slot) in range.iter_mut().enumerate() {
        *slot = (-((d * d) as f32) / (2.0 * SIGMA_COLOR * SIGMA_COLOR)).exp();
    }

    let mut out = vec![0u8; src.data.len()];
    for y in 0..h {
        for x in 0..w {
            let center = src.data[(y * w + x) as usize] as i32;
            let mut acc = 0f32;
            let mut norm = 0f32;

            for dy in -SMOOTH_RADIUS..=SMOOTH_RADIUS {
                let ny = (y + dy).clamp(0, h - 1);
                for dx in -SMOOTH_RADIUS..=SMOOTH_RADIUS {
                    let nx = (x + dx).clamp(0, w - 1);
                    let v = src.data[(ny * w + nx) as usize] as i32;
                    let weight = spatial
                        [((dy + SMOOTH_RADIUS) as usize) * window + (dx + SMOOTH_RADIUS) as usize]
                        * range[(v - center).unsigned_abs() as usize];
                    acc += weight * v as f32;
                    norm += weight;
                }
            }

            out[(y * w + x) as usize] = (acc / norm).round().clamp(0.0, 255.0) as u8;
        }
    }

    Gray {
        data: out,
        width: src.width,
        height: src.height,
    }
}

/// Linearly rescale the value range to span [0, 255].
///
/// A constant image has no range to stretch and is left unchanged, so a
/// uniformly bright frame stays bright instead of collapsing to black.
pub fn normalize(gray: &mut Gray) {
    let Some(&min) = gray.data.iter().min() else {
        return;
    };
    let max = *gray.data.iter().max().unwrap();
    if max == min {
        return;
    }

    let span = (max - min) as u32;
    for v in &mut gray.data {
        *v = ((*v - min) as u32 * 255 / span) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_gray(v: u8, width: u32, height: u32) -> Gray {
        Gray {
            data: vec![v; (width * height) as usize],
            width,
            height,
        }
    }

    #[test]
    fn test_grayscale_pure_red() {
        // Luminance = 299 * 255 / 1000 = 76
        let frame = Frame {
            data: vec![255, 0, 0],
            width: 1,
            height: 1,
        };
        assert_eq!(to_grayscale(&frame).data, vec![76]);
    }

    #[test]
    fn test_grayscale_luminance_order() {
        // Green brightest, then red, then blue, matching perception
        let lum = |rgb: [u8; 3]| {
            to_grayscale(&Frame {
                data: rgb.to_vec(),
                width: 1,
                height: 1,
            })
            .data[0]
        };
        let (r, g, b) = (lum([255, 0, 0]), lum([0, 255, 0]), lum([0, 0, 255]));
        assert!(g > r && r > b);
    }

    #[test]
    fn test_equalize_constant_image_stays_constant() {
        // Equal-size tiles give identical lookup tables on a flat image,
        // so no tile seams can appear.
        let eq = equalize_local(&solid_gray(30, 70, 38));
        let first = eq.data[0];
        assert!(eq.data.iter().all(|&v| v == first));
    }

    #[test]
    fn test_equalize_spreads_midtones() {
        // A flat-ish two-level image should come out with more spread
        // than it went in with.
        let mut src = solid_gray(100, 32, 32);
        for (i, v) in src.data.iter_mut().enumerate() {
            if i % 2 == 0 {
                *v = 110;
            }
        }
        let eq = equalize_local(&src);
        let min = *eq.data.iter().min().unwrap();
        let max = *eq.data.iter().max().unwrap();
        assert!(max - min >= 10);
    }

    #[test]
    fn test_bilateral_constant_image_unchanged() {
        let smoothed = smooth_bilateral(&solid_gray(77, 10, 10));
        assert!(smoothed.data.iter().all(|&v| v == 77));
    }

    #[test]
    fn test_bilateral_preserves_strong_edge() {
        // Hard black/white boundary: the range weight should keep both
        // sides close to their original values.
        let mut src = solid_gray(0, 10, 10);
        for y in 0..10 {
            for x in 5..10 {
                src.data[y * 10 + x] = 255;
            }
        }
        let smoothed = smooth_bilateral(&src);
        assert!(smoothed.data[0] < 30);
        assert!(smoothed.data[9] > 225);
    }

    #[test]
    fn test_normalize_stretches_range() {
        let mut gray = Gray {
            data: vec![50, 100, 150],
            width: 3,
            height: 1,
        };
        normalize(&mut gray);
        assert_eq!(gray.data, vec![0, 127, 255]);
    }

    #[test]
    fn test_normalize_constant_is_identity() {
        let mut gray = solid_gray(42, 4, 4);
        normalize(&mut gray);
        assert!(gray.data.iter().all(|&v| v == 42));
    }
}
