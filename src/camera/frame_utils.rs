//! Frame conversion and per-frame pre-filters.

use nokhwa::pixel_format::RgbFormat;

use super::types::Frame;

/// Convert a nokhwa buffer to our RGB Frame format.
///
/// Handles various camera formats (MJPEG, YUYV, NV12, etc.) by using
/// nokhwa's built-in decode_image which converts from the camera's
/// native format to RGB.
///
/// Returns `None` if the conversion fails (unsupported format or corrupt data).
pub fn convert_to_rgb(buffer: &nokhwa::Buffer) -> Option<Frame> {
    let decoded = buffer.decode_image::<RgbFormat>().ok()?;
    let resolution = buffer.resolution();

    Some(Frame {
        data: decoded.into_raw(),
        width: resolution.width(),
        height: resolution.height(),
    })
}

/// Mirror a frame horizontally (flip left-right) for selfie view.
///
/// A frame whose buffer is shorter than its dimensions claim is left
/// untouched; the rendering pipeline rejects it with a typed failure.
pub fn mirror_horizontal(frame: &mut Frame) {
    if frame.data.len() < frame.expected_len() {
        return;
    }

    let width = frame.width as usize;
    let height = frame.height as usize;
    let bpp = Frame::BYTES_PER_PIXEL;

    for y in 0..height {
        let row_start = y * width * bpp;
        let row = &mut frame.data[row_start..row_start + width * bpp];

        for x in 0..width / 2 {
            let left = x * bpp;
            let right = (width - 1 - x) * bpp;
            for i in 0..bpp {
                row.swap(left + i, right + i);
            }
        }
    }
}

/// Apply the linear contrast pre-filter driven by the session's bias.
///
/// Each channel value becomes `clamp(v * (1 + (bias - 50) / 100))`, so
/// bias 50 is the identity, 100 is a 1.5x gain and 0 a 0.5x attenuation.
/// Runs on the raw color frame before the automatic enhancement stage.
pub fn apply_contrast(frame: &mut Frame, bias: u8) {
    let alpha = 1.0 + (bias as f32 - 50.0) / 100.0;
    if (alpha - 1.0).abs() < f32::EPSILON {
        return;
    }
    for v in &mut frame.data {
        *v = (*v as f32 * alpha).round().clamp(0.0, 255.0) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_horizontal_2x1() {
        // Pixel A (1,2,3) and pixel B (4,5,6) swap places
        let mut frame = Frame {
            data: vec![1, 2, 3, 4, 5, 6],
            width: 2,
            height: 1,
        };
        mirror_horizontal(&mut frame);
        assert_eq!(frame.data, vec![4, 5, 6, 1, 2, 3]);
    }

    #[test]
    fn test_mirror_horizontal_3x2() {
        // Row 0: [A, B, C], Row 1: [D, E, F]
        let mut frame = Frame {
            data: vec![
                1, 1, 1, 2, 2, 2, 3, 3, 3, // Row 0
                4, 4, 4, 5, 5, 5, 6, 6, 6, // Row 1
            ],
            width: 3,
            height: 2,
        };
        mirror_horizontal(&mut frame);
        assert_eq!(
            frame.data,
            vec![
                3, 3, 3, 2, 2, 2, 1, 1, 1, // Row 0 reversed
                6, 6, 6, 5, 5, 5, 4, 4, 4, // Row 1 reversed
            ]
        );
    }

    #[test]
    fn test_mirror_short_buffer_is_left_untouched() {
        // Dimensions claim 10x10 but the buffer holds one pixel
        let mut frame = Frame {
            data: vec![1, 2, 3],
            width: 10,
            height: 10,
        };
        mirror_horizontal(&mut frame);
        assert_eq!(frame.data, vec![1, 2, 3]);
    }

    #[test]
    fn test_contrast_identity_at_default_bias() {
        let mut frame = Frame {
            data: vec![0, 100, 255],
            width: 1,
            height: 1,
        };
        apply_contrast(&mut frame, 50);
        assert_eq!(frame.data, vec![0, 100, 255]);
    }

    #[test]
    fn test_contrast_max_bias_clamps() {
        // bias 100 -> 1.5x gain, clamped at 255
        let mut frame = Frame {
            data: vec![100, 200, 255],
            width: 1,
            height: 1,
        };
        apply_contrast(&mut frame, 100);
        assert_eq!(frame.data, vec![150, 255, 255]);
    }

    #[test]
    fn test_contrast_min_bias_halves() {
        let mut frame = Frame {
            data: vec![100, 200, 0],
            width: 1,
            height: 1,
        };
        apply_contrast(&mut frame, 0);
        assert_eq!(frame.data, vec![50, 100, 0]);
    }
}
