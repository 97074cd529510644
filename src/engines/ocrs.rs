//! Recognition backed by the pure-Rust `ocrs` library
//!
//! Detection and recognition models are fetched once into the user cache
//! directory and loaded at startup. `ocrs` reports no confidence, so each line
//! gets a score derived from how plausible its text looks.

use crate::config::Config;
use crate::engine::{BoundingBox, RecognitionConfig, TextBlock, TextRecognitionEngine};
use crate::error::OcrError;
use image::DynamicImage;
use ocrs::{DecodeMethod, ImageSource, OcrEngine, OcrEngineParams, TextItem};
use rten::Model;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

const DETECTION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-detection.rten";
const RECOGNITION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-recognition.rten";

const CACHE_DIR_NAME: &str = "docscan-ocr";

pub struct OcrsEngine {
    engine: OcrEngine,
}

impl OcrsEngine {
    /// Load models, downloading them first if they are not cached yet
    pub fn new(config: &Config) -> Result<Self, OcrError> {
        let detection_path = ensure_model_downloaded(DETECTION_MODEL_URL, "text-detection.rten")?;
        let recognition_path =
            ensure_model_downloaded(RECOGNITION_MODEL_URL, "text-recognition.rten")?;

        let detection_model = Model::load_file(&detection_path).map_err(|e| {
            OcrError::InitializationError(format!("Failed to load detection model: {}", e))
        })?;
        let recognition_model = Model::load_file(&recognition_path).map_err(|e| {
            OcrError::InitializationError(format!("Failed to load recognition model: {}", e))
        })?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            decode_method: DecodeMethod::Greedy,
            ..Default::default()
        })
        .map_err(|e| OcrError::InitializationError(format!("Failed to create OCR engine: {}", e)))?;

        tracing::info!(languages = ?config.languages, "ocrs engine ready");
        Ok(Self { engine })
    }
}

impl TextRecognitionEngine for OcrsEngine {
    fn name(&self) -> &'static str {
        "ocrs"
    }

    fn description(&self) -> &'static str {
        "Pure Rust OCR engine - fast, no system dependencies required"
    }

    fn recognize(
        &self,
        image: &DynamicImage,
        config: &RecognitionConfig,
    ) -> Result<Vec<TextBlock>, OcrError> {
        let rgb = image.to_rgb8();
        let dimensions = rgb.dimensions();
        if dimensions.0 == 0 || dimensions.1 == 0 {
            return Err(OcrError::ImageConversion("image has no pixels".to_string()));
        }

        let source = ImageSource::from_bytes(rgb.as_raw(), dimensions)
            .map_err(|e| OcrError::ImageConversion(e.to_string()))?;
        let input = self
            .engine
            .prepare_input(source)
            .map_err(|e| OcrError::ImageConversion(format!("Failed to prepare input: {}", e)))?;

        let words = self
            .engine
            .detect_words(&input)
            .map_err(|e| OcrError::Recognition(format!("Failed to detect words: {}", e)))?;
        let line_rects = self.engine.find_text_lines(&input, &words);
        let lines = self
            .engine
            .recognize_text(&input, &line_rects)
            .map_err(|e| OcrError::Recognition(format!("Failed to recognize text: {}", e)))?;

        let min_height = config.minimum_text_height * dimensions.1 as f32;
        let blocks: Vec<TextBlock> = lines
            .iter()
            .flatten()
            .filter_map(|line| {
                let text = line
                    .words()
                    .map(|w| w.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                if text.trim().is_empty() {
                    return None;
                }
                let rect = line.bounding_rect();
                if (rect.height() as f32) < min_height {
                    return None;
                }
                let bbox = BoundingBox::from_pixels(
                    rect.left() as f32,
                    rect.top() as f32,
                    rect.width() as f32,
                    rect.height() as f32,
                    dimensions,
                );
                let confidence = line_confidence(&text);
                Some(TextBlock::new(text, bbox, confidence))
            })
            .collect();

        tracing::debug!(lines = blocks.len(), "ocrs recognized lines");
        Ok(blocks)
    }

    fn supported_languages(&self) -> Vec<String> {
        // Latin alphabet models only
        vec!["en-US".to_string()]
    }
}

/// Plausibility of recognized text in [0, 1]
///
/// Weighted blend of character mix, word lengths, whitespace density and
/// runs of repeated characters. Very short lines cannot be judged and get 0.5.
fn line_confidence(text: &str) -> f32 {
    if text.is_empty() {
        return 0.0;
    }
    if text.len() < 5 {
        return 0.5;
    }

    let score = 0.40 * char_mix_score(text)
        + 0.30 * word_length_score(text)
        + 0.15 * whitespace_score(text)
        + 0.15 * repetition_score(text);
    score.clamp(0.0, 1.0)
}

/// Garbled output carries symbols outside ASCII punctuation and few letters
fn char_mix_score(text: &str) -> f32 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }

    let (letters, symbols) = text.chars().fold((0usize, 0usize), |(l, s), c| {
        if c.is_alphabetic() {
            (l + 1, s)
        } else if !c.is_alphanumeric() && !c.is_whitespace() && !c.is_ascii_punctuation() {
            (l, s + 1)
        } else {
            (l, s)
        }
    });

    let symbol_penalty = 1.0 - (symbols as f32 / total as f32 * 10.0).min(1.0);
    let letter_score = (letters as f32 / total as f32 * 1.5).min(1.0);
    symbol_penalty * 0.6 + letter_score * 0.4
}

fn word_length_score(text: &str) -> f32 {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return 0.5;
    }

    let mean_len = words.iter().map(|w| w.len()).sum::<usize>() / words.len();
    let base = match mean_len {
        0..=1 => 0.3,
        2..=3 => 0.7,
        4..=8 => 1.0,
        9..=12 => 0.8,
        _ => 0.4,
    };

    let singles = words.iter().filter(|w| w.len() == 1).count() as f32 / words.len() as f32;
    base * (1.0 - (singles * 1.5).min(0.5))
}

/// Prose sits between roughly 10 and 25 percent whitespace
fn whitespace_score(text: &str) -> f32 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }

    let percent = text.chars().filter(|c| c.is_whitespace()).count() * 100 / total;
    match percent {
        0..=5 => 0.5,
        6..=10 => 0.8,
        11..=25 => 1.0,
        26..=40 => 0.7,
        _ => 0.3,
    }
}

/// Long runs like "aaaa" or "####" usually mean the recognizer got confused
fn repetition_score(text: &str) -> f32 {
    let mut longest = 1;
    let mut run = 1;
    let mut prev = None;

    for c in text.chars() {
        if Some(c) == prev && !c.is_whitespace() {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 1;
        }
        prev = Some(c);
    }

    match longest {
        1..=3 => 1.0,
        4..=5 => 0.8,
        6..=10 => 0.5,
        _ => 0.2,
    }
}

fn ensure_model_downloaded(url: &str, filename: &str) -> Result<PathBuf, OcrError> {
    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(CACHE_DIR_NAME);

    std::fs::create_dir_all(&cache_dir).map_err(|e| {
        OcrError::InitializationError(format!("Failed to create cache directory: {}", e))
    })?;

    let model_path = cache_dir.join(filename);
    if model_path.exists() {
        tracing::info!(path = ?model_path, "Using cached model");
    } else {
        tracing::info!(model = filename, "Downloading model (this may take a moment)");
        download_file(url, &model_path)?;
        tracing::info!(path = ?model_path, "Model downloaded");
    }

    Ok(model_path)
}

fn download_file(url: &str, path: &Path) -> Result<(), OcrError> {
    let response = ureq::get(url)
        .call()
        .map_err(|e| OcrError::InitializationError(format!("Failed to download model: {}", e)))?;

    let buffer = response.into_body().read_to_vec().map_err(|e| {
        OcrError::InitializationError(format!("Failed to read response body: {}", e))
    })?;

    let mut file = File::create(path).map_err(|e| {
        OcrError::InitializationError(format!("Failed to create model file: {}", e))
    })?;
    file.write_all(&buffer)
        .map_err(|e| OcrError::InitializationError(format!("Failed to write model file: {}", e)))?;

    Ok(())
}
