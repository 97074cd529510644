use crate::error::OcrError;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::otsu_level;
use imageproc::distance_transform::Norm;
use imageproc::morphology::dilate;
use imageproc::region_labelling::{connected_components, Connectivity};
use std::collections::HashMap;

/// Axis-aligned text region in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl TextRegion {
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f32 / self.height as f32
    }
}

/// Locates text regions in an image, in raster order (top to bottom, left to right)
pub trait TextRegionDetector: Send + Sync {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<TextRegion>, OcrError>;
}

/// Finds dark blobs: Otsu binarization, dilation to merge glyphs into words,
/// then connected component labelling.
#[derive(Debug, Clone)]
pub struct BlobRegionDetector {
    /// Dilation radius in pixels
    pub dilation: u8,
    /// Regions with a smaller bounding-box area are dropped as specks
    pub min_area: u32,
}

impl Default for BlobRegionDetector {
    fn default() -> Self {
        Self {
            dilation: 2,
            min_area: 24,
        }
    }
}

impl TextRegionDetector for BlobRegionDetector {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<TextRegion>, OcrError> {
        let gray = image.to_luma8();
        let (width, height) = gray.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::step("detect_regions", "image has no pixels"));
        }

        let (min, max) = gray
            .pixels()
            .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p.0[0]), hi.max(p.0[0])));
        if min == max {
            return Ok(Vec::new());
        }

        // Text is assumed dark on a light background
        let level = otsu_level(&gray);
        let foreground = GrayImage::from_fn(width, height, |x, y| {
            if gray.get_pixel(x, y).0[0] <= level {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        });

        let merged = dilate(&foreground, Norm::LInf, self.dilation);
        let labels = connected_components(&merged, Connectivity::Eight, Luma([0u8]));

        let mut order: HashMap<u32, usize> = HashMap::new();
        let mut extents: Vec<(u32, u32, u32, u32)> = Vec::new();
        for (x, y, label) in labels.enumerate_pixels() {
            let label = label.0[0];
            if label == 0 {
                continue;
            }
            match order.get(&label) {
                Some(&idx) => {
                    let e = &mut extents[idx];
                    e.0 = e.0.min(x);
                    e.1 = e.1.min(y);
                    e.2 = e.2.max(x);
                    e.3 = e.3.max(y);
                }
                None => {
                    order.insert(label, extents.len());
                    extents.push((x, y, x, y));
                }
            }
        }

        let regions = extents
            .into_iter()
            .map(|(x0, y0, x1, y1)| TextRegion {
                x: x0,
                y: y0,
                width: x1 - x0 + 1,
                height: y1 - y0 + 1,
            })
            .filter(|r| r.width * r.height >= self.min_area)
            .collect::<Vec<_>>();

        tracing::debug!(regions = regions.len(), "Detected text regions");
        Ok(regions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with_bars(vertical: bool) -> DynamicImage {
        let mut img = GrayImage::from_pixel(120, 120, Luma([240]));
        for i in 0..4u32 {
            for a in 10..70u32 {
                for b in 0..4u32 {
                    let (x, y) = if vertical {
                        (10 + i * 25 + b, a)
                    } else {
                        (a, 10 + i * 25 + b)
                    };
                    img.put_pixel(x, y, Luma([20]));
                }
            }
        }
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn test_horizontal_lines_are_wide_regions() {
        let regions = BlobRegionDetector::default()
            .detect(&page_with_bars(false))
            .unwrap();
        assert_eq!(regions.len(), 4);
        assert!(regions.iter().all(|r| r.aspect_ratio() > 2.0));
        // raster order
        assert!(regions.windows(2).all(|w| w[0].y < w[1].y));
    }

    #[test]
    fn test_vertical_lines_are_tall_regions() {
        let regions = BlobRegionDetector::default()
            .detect(&page_with_bars(true))
            .unwrap();
        assert_eq!(regions.len(), 4);
        assert!(regions.iter().all(|r| r.aspect_ratio() < 0.5));
    }

    #[test]
    fn test_blank_page_has_no_regions() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(40, 40, Luma([255])));
        assert!(BlobRegionDetector::default().detect(&img).unwrap().is_empty());
    }

    #[test]
    fn test_empty_image_is_an_error() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        assert!(BlobRegionDetector::default().detect(&img).is_err());
    }
}
