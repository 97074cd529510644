use crate::error::OcrError;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::gaussian_blur_f32;

/// Unsharp mask blur radius (Gaussian sigma)
const RADIUS: f32 = 2.5;
/// Share of the high-frequency difference added back
const INTENSITY: f32 = 0.5;

/// Unsharp mask: original + intensity * (original - blurred)
pub fn apply(image: &DynamicImage) -> Result<DynamicImage, OcrError> {
    let gray = image.to_luma8();
    if gray.width() == 0 || gray.height() == 0 {
        return Err(OcrError::step("sharpen_text", "image has no pixels"));
    }

    let blurred = gaussian_blur_f32(&gray, RADIUS);
    let sharpened = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let original = gray.get_pixel(x, y).0[0] as f32;
        let soft = blurred.get_pixel(x, y).0[0] as f32;
        let value = original + INTENSITY * (original - soft);
        Luma([value.round().clamp(0.0, 255.0) as u8])
    });

    Ok(DynamicImage::ImageLuma8(sharpened))
}
