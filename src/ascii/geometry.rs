//! Geometry transform: center square crop and area-average resize.

use crate::camera::Frame;

use super::RenderError;

/// Factor compensating for the non-square aspect of a terminal cell.
const CHAR_ASPECT: f32 = 0.55;

/// Output height in rows for a given working width.
pub fn target_height(target_width: u32) -> u32 {
    ((target_width as f32 * CHAR_ASPECT).round() as u32).max(1)
}

/// Crop a frame to a centered square and rescale it to the working size.
///
/// The crop side is `min(width, height)` with truncating centered
/// offsets; the resize averages each destination cell over the source
/// pixels it covers (a box filter), which anti-aliases on the way down
/// instead of point-sampling.
///
/// # Errors
/// * `RenderError::InvalidFrame` - zero-sized frame, zero target width,
///   or a pixel buffer shorter than the dimensions claim
pub fn square_crop_and_resize(frame: &Frame, target_width: u32) -> Result<Frame, RenderError> {
    if frame.width == 0 || frame.height == 0 {
        return Err(RenderError::InvalidFrame("zero-sized frame"));
    }
    if target_width == 0 {
        return Err(RenderError::InvalidFrame("zero target width"));
    }
    if frame.data.len() < frame.expected_len() {
        return Err(RenderError::InvalidFrame("short pixel buffer"));
    }

    let size = frame.width.min(frame.height);
    let y_off = (frame.height - size) / 2;
    let x_off = (frame.width - size) / 2;

    let out_w = target_width;
    let out_h = target_height(target_width);
    let bpp = Frame::BYTES_PER_PIXEL;

    // Source cell covered by each destination pixel, within the crop.
    let cell_w = size as f32 / out_w as f32;
    let cell_h = size as f32 / out_h as f32;

    let mut data = Vec::with_capacity(out_w as usize * out_h as usize * bpp);

    for cy in 0..out_h {
        let y0 = ((cy as f32 * cell_h) as u32).min(size - 1);
        let y1 = (((cy + 1) as f32 * cell_h).ceil() as u32).clamp(y0 + 1, size);

        for cx in 0..out_w {
            let x0 = ((cx as f32 * cell_w) as u32).min(size - 1);
            let x1 = (((cx + 1) as f32 * cell_w).ceil() as u32).clamp(x0 + 1, size);

            let mut sum = [0u32; 3];
            let mut count = 0u32;

            for py in y0..y1 {
                let src_y = y_off + py;
                for px in x0..x1 {
                    let src_x = x_off + px;
                    let idx = (src_y as usize * frame.width as usize + src_x as usize) * bpp;
                    sum[0] += frame.data[idx] as u32;
                    sum[1] += frame.data[idx + 1] as u32;
                    sum[2] += frame.data[idx + 2] as u32;
                    count += 1;
                }
            }

            for channel in sum {
                data.push((channel / count) as u8);
            }
        }
    }

    Ok(Frame {
        data,
        width: out_w,
        height: out_h,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(v: u8, width: u32, height: u32) -> Frame {
        Frame {
            data: vec![v; (width * height * 3) as usize],
            width,
            height,
        }
    }

    #[test]
    fn test_output_is_working_size_for_wide_frame() {
        let frame = solid_frame(128, 640, 480);
        let out = square_crop_and_resize(&frame, 70).unwrap();
        assert_eq!(out.width, 70);
        assert_eq!(out.height, target_height(70));
    }

    #[test]
    fn test_output_is_working_size_for_tall_frame() {
        let frame = solid_frame(128, 480, 640);
        let out = square_crop_and_resize(&frame, 40).unwrap();
        assert_eq!(out.width, 40);
        assert_eq!(out.height, target_height(40));
    }

    #[test]
    fn test_upscale_from_tiny_crop_has_no_holes() {
        // 4x4 crop blown up to 16 columns: every cell must still sample
        // at least one source pixel.
        let frame = solid_frame(200, 4, 4);
        let out = square_crop_and_resize(&frame, 16).unwrap();
        assert!(out.data.iter().all(|&v| v == 200));
    }

    #[test]
    fn test_crop_is_centered() {
        // 4x2 frame, left half black and right half white; the centered
        // 2x2 crop straddles the boundary, so the single output pixel
        // averages to mid-gray.
        let mut data = Vec::new();
        for _y in 0..2 {
            data.extend_from_slice(&[0, 0, 0, 0, 0, 0, 255, 255, 255, 255, 255, 255]);
        }
        let frame = Frame {
            data,
            width: 4,
            height: 2,
        };
        let out = square_crop_and_resize(&frame, 1).unwrap();
        assert_eq!(out.width, 1);
        assert_eq!(out.height, 1);
        assert_eq!(out.data[0], 127);
    }

    #[test]
    fn test_zero_sized_frame_is_rejected() {
        let frame = Frame {
            data: Vec::new(),
            width: 0,
            height: 0,
        };
        assert!(matches!(
            square_crop_and_resize(&frame, 70),
            Err(RenderError::InvalidFrame(_))
        ));
    }

    #[test]
    fn test_short_buffer_is_rejected() {
        let frame = Frame {
            data: vec![0; 5],
            width: 10,
            height: 10,
        };
        assert!(matches!(
            square_crop_and_resize(&frame, 70),
            Err(RenderError::InvalidFrame(_))
        ));
    }
}
