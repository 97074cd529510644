//! Document scanning OCR: image conditioning, text recognition, structured
//! extraction, and business card parsing with CRM export.

pub mod card;
pub mod collaborators;
pub mod completion;
pub mod config;
pub mod contact;
pub mod engine;
pub mod engines;
pub mod error;
pub mod mode;
pub mod ocr;
pub mod preprocessing;
pub mod server;

pub use card::{BusinessCardData, BusinessCardProcessor};
pub use error::OcrError;
pub use mode::DocumentMode;
pub use ocr::{OcrPipeline, OcrResult};
pub use preprocessing::{ImagePreprocessingOptions, ImagePreprocessor, Preset};
