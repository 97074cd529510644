//! Full recognition pass over one image
//!
//! [`OcrPipeline::perform_ocr`] conditions the image, runs the recognition
//! engine on a blocking worker, then hands the recognized blocks to the table
//! detector and the structured-text extractor. It never fails: any stage that
//! cannot produce output degrades the result to empty.

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::collaborators::{
    HeuristicTextExtractor, NoTableDetector, StructuredData, StructuredTextExtractor, TableDetector,
};
use crate::completion;
use crate::engine::{BoundingBox, RecognitionConfig, TextBlock, TextRecognitionEngine};
use crate::error::OcrError;
use crate::mode::DocumentMode;
use crate::preprocessing::{ImagePreprocessingOptions, ImagePreprocessor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    #[default]
    Generic,
    BusinessCard,
    Receipt,
    Invoice,
    PrintedDocument,
    Whiteboard,
    Handwritten,
    Screenshot,
    Photo,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub title: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub bounding_box: BoundingBox,
    pub confidence: f32,
}

impl TableData {
    pub fn is_valid(&self) -> bool {
        !self.headers.is_empty() && !self.rows.is_empty() && self.confidence > 0.3
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OcrResult {
    /// Block texts in engine order, joined by newlines
    pub raw_text: String,
    pub detected_tables: Vec<TableData>,
    /// Mean block confidence, 0.0 when nothing was recognized
    pub confidence: f32,
    pub document_type: DocumentType,
    pub structured_data: Option<StructuredData>,
}

impl OcrResult {
    pub fn empty() -> Self {
        Self {
            raw_text: String::new(),
            detected_tables: Vec::new(),
            confidence: 0.0,
            document_type: DocumentType::Generic,
            structured_data: None,
        }
    }
}

/// Advisory checkpoints. Delivery order and count are not guaranteed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcrProgress {
    Preprocessing,
    Recognized { blocks: usize },
    Completed,
}

impl OcrProgress {
    pub fn fraction(&self) -> f32 {
        match self {
            Self::Preprocessing => 0.1,
            Self::Recognized { .. } => 0.7,
            Self::Completed => 1.0,
        }
    }
}

pub type ProgressCallback = Arc<dyn Fn(OcrProgress) + Send + Sync>;

#[derive(Clone)]
pub struct OcrPipeline {
    preprocessor: ImagePreprocessor,
    engine: Arc<dyn TextRecognitionEngine>,
    tables: Arc<dyn TableDetector>,
    extractor: Arc<dyn StructuredTextExtractor>,
    recognition: RecognitionConfig,
    progress: Option<ProgressCallback>,
}

impl OcrPipeline {
    /// Pipeline with the default preprocessor, no table detection, and the
    /// heuristic structured-text extractor.
    pub fn new(engine: Arc<dyn TextRecognitionEngine>, recognition: RecognitionConfig) -> Self {
        Self {
            preprocessor: ImagePreprocessor::default(),
            engine,
            tables: Arc::new(NoTableDetector),
            extractor: Arc::new(HeuristicTextExtractor::default()),
            recognition,
            progress: None,
        }
    }

    pub fn with_preprocessor(mut self, preprocessor: ImagePreprocessor) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    pub fn with_table_detector(mut self, tables: Arc<dyn TableDetector>) -> Self {
        self.tables = tables;
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn StructuredTextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    pub fn recognition_config(&self) -> &RecognitionConfig {
        &self.recognition
    }

    pub async fn perform_ocr(
        &self,
        image: &DynamicImage,
        options: ImagePreprocessingOptions,
        mode: DocumentMode,
    ) -> OcrResult {
        let start = Instant::now();
        let profile = mode.profile();
        let effective = profile.effective_options(options);

        self.report(OcrProgress::Preprocessing);
        let conditioned = self.preprocessor.preprocess(image, effective).await;
        let image = Arc::new(conditioned.image);
        let size = (image.width(), image.height());
        if size.0 == 0 || size.1 == 0 {
            tracing::warn!(mode = mode.as_str(), "Conditioned image has no pixels, skipping recognition");
            return OcrResult::empty();
        }

        let blocks = match self.recognize(image.clone()).await {
            Ok(blocks) => blocks,
            Err(e) => {
                tracing::warn!(engine = self.engine.name(), error = %e, "Recognition failed, returning empty result");
                return OcrResult::empty();
            }
        };
        self.report(OcrProgress::Recognized {
            blocks: blocks.len(),
        });

        let raw_text = blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let confidence = mean_confidence(&blocks);
        let detected_tables = self.tables.detect_tables(&blocks, size);

        let extractor = self.extractor.clone();
        let extraction = profile.extraction;
        let text = raw_text.clone();
        let structured = completion::run_blocking(
            StructuredData::empty(extraction.document_type),
            move || extractor.extract(&text, &blocks, &image, &extraction),
        )
        .await;

        let result = OcrResult {
            raw_text,
            detected_tables,
            confidence,
            document_type: structured.document_type,
            structured_data: Some(structured),
        };

        self.report(OcrProgress::Completed);
        tracing::info!(
            mode = mode.as_str(),
            document_type = ?result.document_type,
            confidence = result.confidence,
            chars = result.raw_text.len(),
            time_ms = start.elapsed().as_millis() as u64,
            "OCR completed"
        );
        result
    }

    /// Engine call on a blocking worker; a dead worker reads as a failure
    async fn recognize(&self, image: Arc<DynamicImage>) -> Result<Vec<TextBlock>, OcrError> {
        let engine = self.engine.clone();
        let config = self.recognition.clone();
        completion::run_blocking(
            Err(OcrError::Recognition("recognition worker stopped".to_string())),
            move || engine.recognize(&image, &config),
        )
        .await
    }

    fn report(&self, progress: OcrProgress) {
        if let Some(callback) = &self.progress {
            callback(progress);
        }
    }
}

fn mean_confidence(blocks: &[TextBlock]) -> f32 {
    if blocks.is_empty() {
        return 0.0;
    }
    let sum: f32 = blocks.iter().map(|b| b.confidence).sum();
    (sum / blocks.len() as f32).clamp(0.0, 1.0)
}
