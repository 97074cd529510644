use crate::error::OcrError;
use image::{imageops, DynamicImage};

/// Average brightness below this is treated as underexposed
const DARK_THRESHOLD: u8 = 128;
/// Average brightness above this is treated as overexposed
const BRIGHT_THRESHOLD: u8 = 200;
const BOOST_EV: f32 = 0.5;
const REDUCE_EV: f32 = -0.3;

/// Correct exposure based on the image's average brightness
pub fn apply(image: &DynamicImage) -> Result<DynamicImage, OcrError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(OcrError::step("enhance_contrast", "image has no pixels"));
    }

    let brightness = average_brightness(image);
    let ev = exposure_for(brightness);
    tracing::debug!(brightness, ev, "Exposure adjustment");

    if ev == 0.0 {
        return Ok(image.clone());
    }
    Ok(adjust_exposure(image, ev))
}

/// Area-average the whole image down to a single pixel
pub fn average_brightness(image: &DynamicImage) -> u8 {
    let gray = image.to_luma8();
    imageops::thumbnail(&gray, 1, 1).get_pixel(0, 0).0[0]
}

pub fn exposure_for(brightness: u8) -> f32 {
    if brightness < DARK_THRESHOLD {
        BOOST_EV
    } else if brightness > BRIGHT_THRESHOLD {
        REDUCE_EV
    } else {
        0.0
    }
}

fn adjust_exposure(image: &DynamicImage, ev: f32) -> DynamicImage {
    let gain = 2f32.powf(ev);
    let scale = |v: u8| ((v as f32) * gain).round().clamp(0.0, 255.0) as u8;

    match image {
        DynamicImage::ImageLuma8(gray) => {
            let mut out = gray.clone();
            for p in out.pixels_mut() {
                p.0[0] = scale(p.0[0]);
            }
            DynamicImage::ImageLuma8(out)
        }
        other => {
            let mut out = other.to_rgba8();
            for p in out.pixels_mut() {
                // alpha untouched
                for c in p.0.iter_mut().take(3) {
                    *c = scale(*c);
                }
            }
            DynamicImage::ImageRgba8(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn uniform(value: u8) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 8, Luma([value])))
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(exposure_for(127), 0.5);
        assert_eq!(exposure_for(128), 0.0);
        assert_eq!(exposure_for(200), 0.0);
        assert_eq!(exposure_for(201), -0.3);
    }

    #[test]
    fn test_dark_image_is_brightened() {
        let result = apply(&uniform(60)).unwrap();
        assert!(result.to_luma8().get_pixel(0, 0).0[0] > 60);
    }

    #[test]
    fn test_bright_image_is_dimmed() {
        let result = apply(&uniform(230)).unwrap();
        assert!(result.to_luma8().get_pixel(0, 0).0[0] < 230);
    }

    #[test]
    fn test_balanced_image_is_unchanged() {
        let img = uniform(160);
        let result = apply(&img).unwrap();
        assert_eq!(result.to_luma8(), img.to_luma8());
    }

    #[test]
    fn test_average_of_half_black_half_white() {
        let img = GrayImage::from_fn(10, 10, |x, _| if x < 5 { Luma([0]) } else { Luma([255]) });
        let avg = average_brightness(&DynamicImage::ImageLuma8(img));
        assert!((120..=135).contains(&avg), "got {}", avg);
    }
}
