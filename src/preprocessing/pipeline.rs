use crate::completion;
use crate::error::OcrError;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use super::regions::{BlobRegionDetector, TextRegionDetector};
use super::steps;

/// Which conditioning filters to run. Disabled filters are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagePreprocessingOptions {
    pub enhance_contrast: bool,
    pub correct_rotation: bool,
    pub denoise_image: bool,
    pub sharpen_text: bool,
    pub normalize_colors: bool,
}

impl ImagePreprocessingOptions {
    pub const ALL: Self = Self {
        enhance_contrast: true,
        correct_rotation: true,
        denoise_image: true,
        sharpen_text: true,
        normalize_colors: true,
    };

    /// True when no filter is enabled
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Preprocessing preset names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Skip all preprocessing
    #[default]
    Default,
    /// Steps: contrast enhancement only
    Minimal,
    /// Steps: contrast enhancement, rotation correction
    Receipt,
    /// Every step
    BusinessCard,
}

impl Preset {
    /// Parse from query parameter string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "default" | "none" => Some(Self::Default),
            "minimal" => Some(Self::Minimal),
            "receipt" => Some(Self::Receipt),
            "business_card" | "businesscard" => Some(Self::BusinessCard),
            _ => None,
        }
    }

    /// Get the preset name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Minimal => "minimal",
            Self::Receipt => "receipt",
            Self::BusinessCard => "business_card",
        }
    }

    pub fn options(&self) -> ImagePreprocessingOptions {
        match self {
            Self::Default => ImagePreprocessingOptions::default(),
            Self::Minimal => ImagePreprocessingOptions {
                enhance_contrast: true,
                ..Default::default()
            },
            Self::Receipt => ImagePreprocessingOptions {
                enhance_contrast: true,
                correct_rotation: true,
                ..Default::default()
            },
            Self::BusinessCard => ImagePreprocessingOptions::ALL,
        }
    }
}

impl From<Preset> for ImagePreprocessingOptions {
    fn from(preset: Preset) -> Self {
        preset.options()
    }
}

/// Timing information for a single preprocessing step
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// Result of preprocessing including timing stats
#[derive(Debug, Clone, Serialize)]
pub struct PreprocessingResult {
    /// Preprocessed image (not serialized)
    #[serde(skip)]
    pub image: DynamicImage,
    /// Total preprocessing time in milliseconds
    pub total_time_ms: u64,
    /// Steps that ran to completion
    pub steps: Vec<StepTiming>,
    /// Steps that failed and left the image as it was
    pub skipped: Vec<String>,
}

impl PreprocessingResult {
    fn unchanged(image: DynamicImage) -> Self {
        Self {
            image,
            total_time_ms: 0,
            steps: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Applies the enabled conditioning filters in a fixed order:
/// rotation, color normalization, exposure, denoise, sharpen.
///
/// Every step produces a new image. A failing step is logged and skipped;
/// the remaining steps still run.
#[derive(Clone)]
pub struct ImagePreprocessor {
    detector: Arc<dyn TextRegionDetector>,
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new(Arc::new(BlobRegionDetector::default()))
    }
}

impl ImagePreprocessor {
    pub fn new(detector: Arc<dyn TextRegionDetector>) -> Self {
        Self { detector }
    }

    /// Condition the image on the blocking worker pool.
    ///
    /// Should the worker die, the caller gets the input back untouched.
    pub async fn preprocess(
        &self,
        image: &DynamicImage,
        options: ImagePreprocessingOptions,
    ) -> PreprocessingResult {
        if options.is_noop() {
            return PreprocessingResult::unchanged(image.clone());
        }

        let this = self.clone();
        let input = image.clone();
        let fallback = PreprocessingResult::unchanged(image.clone());
        completion::run_blocking(fallback, move || this.process(&input, &options)).await
    }

    /// Condition the image on the current thread
    pub fn process(
        &self,
        image: &DynamicImage,
        options: &ImagePreprocessingOptions,
    ) -> PreprocessingResult {
        if options.is_noop() {
            return PreprocessingResult::unchanged(image.clone());
        }

        let start = Instant::now();
        let mut result = PreprocessingResult::unchanged(image.clone());
        let detector = self.detector.as_ref();

        if options.correct_rotation {
            self.run_step(&mut result, "correct_rotation", |img| {
                steps::rotation::apply(img, detector)
            });
        }
        if options.normalize_colors {
            self.run_step(&mut result, "normalize_colors", steps::color::apply);
        }
        if options.enhance_contrast {
            self.run_step(&mut result, "enhance_contrast", steps::exposure::apply);
        }
        if options.denoise_image {
            self.run_step(&mut result, "denoise_image", steps::denoise::apply);
        }
        if options.sharpen_text {
            self.run_step(&mut result, "sharpen_text", steps::sharpen::apply);
        }

        result.total_time_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(
            steps = result.steps.len(),
            skipped = result.skipped.len(),
            time_ms = result.total_time_ms,
            "Preprocessing finished"
        );
        result
    }

    fn run_step<F>(&self, result: &mut PreprocessingResult, name: &'static str, step_fn: F)
    where
        F: FnOnce(&DynamicImage) -> Result<DynamicImage, OcrError>,
    {
        let step_start = Instant::now();
        match step_fn(&result.image) {
            Ok(image) => {
                result.image = image;
                result.steps.push(StepTiming {
                    name: name.to_string(),
                    time_ms: step_start.elapsed().as_millis() as u64,
                });
            }
            Err(e) => {
                tracing::warn!(step = name, error = %e, "Preprocessing step failed, keeping image");
                result.skipped.push(name.to_string());
            }
        }
    }
}
