use crate::error::OcrError;
use image::{DynamicImage, GrayImage, Luma};

/// Brightness offset on the 0..1 scale
const BRIGHTNESS: f32 = 0.1;
/// Contrast multiplier around mid-gray
const CONTRAST: f32 = 1.2;

/// Desaturate, lift brightness, then stretch contrast around mid-gray
pub fn apply(image: &DynamicImage) -> Result<DynamicImage, OcrError> {
    let gray = image.to_luma8();
    let adjusted = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        Luma([adjust(gray.get_pixel(x, y).0[0])])
    });
    Ok(DynamicImage::ImageLuma8(adjusted))
}

fn adjust(value: u8) -> u8 {
    let v = value as f32 / 255.0 + BRIGHTNESS;
    let v = (v - 0.5) * CONTRAST + 0.5;
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
