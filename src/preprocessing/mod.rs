//! Image conditioning ahead of text recognition
//!
//! Provides an ordered, optional set of filters and named presets.

pub mod pipeline;
pub mod regions;
pub mod steps;

pub use pipeline::{
    ImagePreprocessingOptions, ImagePreprocessor, PreprocessingResult, Preset, StepTiming,
};
pub use regions::{BlobRegionDetector, TextRegion, TextRegionDetector};
