use crate::error::OcrError;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Rectangle in normalized image coordinates (0.0 to 1.0, origin top-left)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a normalized box from pixel coordinates.
    pub fn from_pixels(left: f32, top: f32, width: f32, height: f32, image: (u32, u32)) -> Self {
        let (iw, ih) = (image.0.max(1) as f32, image.1.max(1) as f32);
        Self {
            x: (left / iw).clamp(0.0, 1.0),
            y: (top / ih).clamp(0.0, 1.0),
            width: (width / iw).clamp(0.0, 1.0),
            height: (height / ih).clamp(0.0, 1.0),
        }
    }

    /// Width divided by height; zero-height boxes report 0.0
    pub fn aspect_ratio(&self) -> f32 {
        if self.height <= 0.0 {
            0.0
        } else {
            self.width / self.height
        }
    }
}

/// One recognized span of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: String,
    pub bounding_box: BoundingBox,
    /// Engine-reported certainty in [0, 1]
    pub confidence: f32,
}

impl TextBlock {
    pub fn new(text: impl Into<String>, bounding_box: BoundingBox, confidence: f32) -> Self {
        Self {
            text: text.into(),
            bounding_box,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionLevel {
    Fast,
    Accurate,
}

/// Settings passed to the recognition engine for a single call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecognitionConfig {
    pub level: RecognitionLevel,
    pub automatic_language_detection: bool,
    pub language_correction: bool,
    /// Smallest text height to detect, as a fraction of image height
    pub minimum_text_height: f32,
    pub languages: Vec<String>,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            level: RecognitionLevel::Accurate,
            automatic_language_detection: true,
            language_correction: true,
            minimum_text_height: 0.01,
            languages: vec!["en-US".to_string()],
        }
    }
}

/// Trait that all text recognition engines must implement
///
/// Implementations run on a blocking worker; the pipeline never calls them
/// from an async task directly.
pub trait TextRecognitionEngine: Send + Sync {
    /// Returns the engine identifier (e.g., "ocrs")
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of the engine
    fn description(&self) -> &'static str;

    /// Recognize text blocks in reading order. An empty list means nothing was found.
    fn recognize(
        &self,
        image: &DynamicImage,
        config: &RecognitionConfig,
    ) -> Result<Vec<TextBlock>, OcrError>;

    /// Get supported languages
    fn supported_languages(&self) -> Vec<String>;
}
