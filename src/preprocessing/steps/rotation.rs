use crate::error::OcrError;
use crate::preprocessing::regions::{TextRegion, TextRegionDetector};
use image::DynamicImage;

/// Only the first regions in detection order take part in the vote
pub const MAX_VOTING_REGIONS: usize = 10;
/// Regions narrower than this ratio vote for a quarter turn
const PORTRAIT_RATIO: f32 = 0.5;
/// Regions wider than this ratio vote for upright text
const LANDSCAPE_RATIO: f32 = 2.0;

/// Detect whether text runs vertically and, if so, turn the image a quarter
/// counter-clockwise. Returns a new image; the input is never touched.
pub fn apply(
    image: &DynamicImage,
    detector: &dyn TextRegionDetector,
) -> Result<DynamicImage, OcrError> {
    let regions = detector.detect(image)?;
    let angle = vote_rotation(&regions);
    tracing::debug!(angle, regions = regions.len(), "Rotation vote");

    match angle {
        90 => Ok(image.rotate270()),
        _ => Ok(image.clone()),
    }
}

/// Bucket region aspect ratios into 0 or 90 degrees and take the majority.
/// Ties and regions between the thresholds leave the image upright.
pub fn vote_rotation(regions: &[TextRegion]) -> u32 {
    let (mut upright, mut turned) = (0usize, 0usize);
    for region in regions.iter().take(MAX_VOTING_REGIONS) {
        let ratio = region.aspect_ratio();
        if ratio < PORTRAIT_RATIO {
            turned += 1;
        } else if ratio > LANDSCAPE_RATIO {
            upright += 1;
        }
    }

    if turned > upright {
        90
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn region(width: u32, height: u32) -> TextRegion {
        TextRegion {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    struct FixedRegions(Vec<TextRegion>);

    impl TextRegionDetector for FixedRegions {
        fn detect(&self, _image: &DynamicImage) -> Result<Vec<TextRegion>, OcrError> {
            Ok(self.0.clone())
        }
    }

    struct FailingDetector;

    impl TextRegionDetector for FailingDetector {
        fn detect(&self, _image: &DynamicImage) -> Result<Vec<TextRegion>, OcrError> {
            Err(OcrError::step("detect_regions", "detector unavailable"))
        }
    }

    #[test]
    fn test_majority_tall_regions_vote_quarter_turn() {
        let regions = vec![region(10, 40), region(10, 50), region(80, 10)];
        assert_eq!(vote_rotation(&regions), 90);
    }

    #[test]
    fn test_wide_regions_vote_upright() {
        let regions = vec![region(80, 10), region(90, 10), region(10, 40)];
        assert_eq!(vote_rotation(&regions), 0);
    }

    #[test]
    fn test_ambiguous_regions_do_not_vote() {
        assert_eq!(vote_rotation(&[region(10, 10), region(15, 10)]), 0);
        assert_eq!(vote_rotation(&[]), 0);
    }

    #[test]
    fn test_only_first_ten_regions_count() {
        let mut regions = vec![region(80, 10); 10];
        regions.extend(vec![region(10, 80); 20]);
        assert_eq!(vote_rotation(&regions), 0);
    }

    #[test]
    fn test_quarter_turn_swaps_dimensions() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(100, 40, Luma([255])));
        let detector = FixedRegions(vec![region(5, 30), region(6, 30)]);
        let result = apply(&img, &detector).unwrap();
        assert_eq!((result.width(), result.height()), (40, 100));
    }

    #[test]
    fn test_detector_failure_propagates() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(10, 10));
        assert!(apply(&img, &FailingDetector).is_err());
    }
}
