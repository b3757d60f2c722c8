use super::frame::Frame;

// BT.601 weights in 14-bit fixed point; they sum to 1 << 14.
const BLUE_WEIGHT: u32 = 1868;
const GREEN_WEIGHT: u32 = 9617;
const RED_WEIGHT: u32 = 4899;
const WEIGHT_SHIFT: u32 = 14;

/// Per-pixel 8-bit luminance in row-major order.
pub fn extract_luma(frame: &Frame) -> Vec<u8> {
    frame
        .as_bgr()
        .chunks_exact(3)
        .map(|px| {
            let sum = u32::from(px[0]) * BLUE_WEIGHT
                + u32::from(px[1]) * GREEN_WEIGHT
                + u32::from(px[2]) * RED_WEIGHT;
            ((sum + (1 << (WEIGHT_SHIFT - 1))) >> WEIGHT_SHIFT) as u8
        })
        .collect()
}

/// Histogram equalization over the whole buffer.
///
/// The lookup table comes from the cumulative histogram of every sample, so
/// changing any one input can move the output of all others. The darkest
/// occupied level always maps to 0. A buffer holding a single level is left
/// at that level.
pub fn equalize_histogram(values: &mut [u8]) {
    if values.is_empty() {
        return;
    }

    let mut histogram = [0u32; 256];
    for &value in values.iter() {
        histogram[value as usize] += 1;
    }

    let total = values.len() as u32;
    let Some(first) = histogram.iter().position(|&count| count > 0) else {
        return;
    };
    if histogram[first] == total {
        return;
    }

    let scale = 255.0 / (total - histogram[first]) as f32;
    let mut lut = [0u8; 256];
    let mut sum = 0u32;
    for level in first + 1..256 {
        sum += histogram[level];
        lut[level] = (sum as f32 * scale).round().clamp(0.0, 255.0) as u8;
    }

    for value in values {
        *value = lut[*value as usize];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luma_weights_green_heaviest() {
        let frame = Frame::from_bgr(4, 1, vec![
            255, 255, 255, //
            0, 0, 0, //
            0, 255, 0, //
            255, 0, 0,
        ])
        .unwrap();

        assert_eq!(extract_luma(&frame), vec![255, 0, 150, 29]);
    }

    #[test]
    fn flat_buffers_are_untouched() {
        let mut zeros = vec![0u8; 16];
        equalize_histogram(&mut zeros);
        assert!(zeros.iter().all(|&v| v == 0));

        let mut gray = vec![90u8; 16];
        equalize_histogram(&mut gray);
        assert!(gray.iter().all(|&v| v == 90));
    }

    #[test]
    fn two_levels_stretch_to_full_range() {
        let mut values = vec![100, 100, 101, 101];
        equalize_histogram(&mut values);
        assert_eq!(values, vec![0, 0, 255, 255]);
    }

    #[test]
    fn equalization_is_globally_coupled() {
        // Same sample value, different neighbours, different output.
        let mut sparse = vec![10, 50, 200, 200];
        let mut dense = vec![10, 10, 50, 60];
        equalize_histogram(&mut sparse);
        equalize_histogram(&mut dense);

        assert_eq!(sparse[1], 85);
        assert_eq!(dense[2], 128);
        assert_eq!(sparse[0], 0);
        assert_eq!(dense[0], 0);
    }

    #[test]
    fn equalization_preserves_order() {
        let mut values: Vec<u8> = (0..=255).rev().step_by(3).collect();
        let original = values.clone();
        equalize_histogram(&mut values);

        for i in 0..values.len() {
            for j in 0..values.len() {
                if original[i] < original[j] {
                    assert!(values[i] <= values[j]);
                }
            }
        }
    }
}
