use crate::error::OcrError;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::median_filter;

/// Deviations from the local median at or below this fraction of full scale are noise
const NOISE_LEVEL: f32 = 0.02;
/// Fraction of larger deviations (edges, strokes) kept after smoothing
const SHARPNESS: f32 = 0.4;

/// Flatten low-amplitude noise while keeping part of real detail
pub fn apply(image: &DynamicImage) -> Result<DynamicImage, OcrError> {
    let gray = image.to_luma8();
    // 3x3 median (radius 1) as the noise-free reference
    let smoothed = median_filter(&gray, 1, 1);
    let threshold = NOISE_LEVEL * 255.0;

    let denoised = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let original = gray.get_pixel(x, y).0[0] as f32;
        let reference = smoothed.get_pixel(x, y).0[0] as f32;
        let detail = original - reference;
        let value = if detail.abs() <= threshold {
            reference
        } else {
            reference + SHARPNESS * detail
        };
        Luma([value.round().clamp(0.0, 255.0) as u8])
    });

    Ok(DynamicImage::ImageLuma8(denoised))
}
