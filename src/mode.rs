//! Document modes and the single table mapping each mode to its preprocessing
//! and extraction settings. Every call site resolves modes through here.

use serde::{Deserialize, Serialize};

use crate::error::OcrError;
use crate::ocr::DocumentType;
use crate::preprocessing::{ImagePreprocessingOptions, Preset};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentMode {
    #[default]
    Generic,
    BusinessCard,
    Receipt,
}

impl DocumentMode {
    /// Parse from a request parameter. Unknown names are caller errors.
    pub fn from_str(s: &str) -> Result<Self, OcrError> {
        match s.trim().to_lowercase().as_str() {
            "generic" => Ok(Self::Generic),
            "business_card" | "businesscard" => Ok(Self::BusinessCard),
            "receipt" => Ok(Self::Receipt),
            other => Err(OcrError::InvalidMode(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::BusinessCard => "business_card",
            Self::Receipt => "receipt",
        }
    }

    /// OCR mode for a category reported by an upstream document classifier
    pub fn for_document_type(document_type: DocumentType) -> Self {
        match document_type {
            DocumentType::BusinessCard => Self::BusinessCard,
            DocumentType::Receipt | DocumentType::Invoice => Self::Receipt,
            _ => Self::Generic,
        }
    }

    pub fn profile(&self) -> ModeProfile {
        match self {
            Self::Generic => ModeProfile {
                forced_preset: None,
                extraction: ExtractionOptions::comprehensive(),
            },
            Self::BusinessCard => ModeProfile {
                forced_preset: Some(Preset::BusinessCard),
                extraction: ExtractionOptions::business_card(),
            },
            // receipts tolerate minimal preprocessing, caller options stand
            Self::Receipt => ModeProfile {
                forced_preset: None,
                extraction: ExtractionOptions::minimal(),
            },
        }
    }
}

/// What the structured-text extractor should look for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionOptions {
    /// Type reported when nothing more specific is detected
    pub document_type: DocumentType,
    pub extract_fields: bool,
    pub extract_contacts: bool,
    pub detect_business_card: bool,
}

impl ExtractionOptions {
    pub const fn comprehensive() -> Self {
        Self {
            document_type: DocumentType::Generic,
            extract_fields: true,
            extract_contacts: true,
            detect_business_card: false,
        }
    }

    pub const fn minimal() -> Self {
        Self {
            document_type: DocumentType::Receipt,
            extract_fields: false,
            extract_contacts: false,
            detect_business_card: false,
        }
    }

    pub const fn business_card() -> Self {
        Self {
            document_type: DocumentType::Generic,
            extract_fields: false,
            extract_contacts: true,
            detect_business_card: true,
        }
    }
}

/// Per-mode settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeProfile {
    /// Preset that replaces the caller's options, if any
    pub forced_preset: Option<Preset>,
    pub extraction: ExtractionOptions,
}

impl ModeProfile {
    pub fn effective_options(&self, requested: ImagePreprocessingOptions) -> ImagePreprocessingOptions {
        match self.forced_preset {
            Some(preset) => preset.options(),
            None => requested,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_card_forces_every_step() {
        let requested = ImagePreprocessingOptions {
            denoise_image: true,
            ..Default::default()
        };
        let effective = DocumentMode::BusinessCard.profile().effective_options(requested);
        assert_eq!(effective, ImagePreprocessingOptions::ALL);
        assert_eq!(
            DocumentMode::BusinessCard
                .profile()
                .effective_options(ImagePreprocessingOptions::default()),
            ImagePreprocessingOptions::ALL
        );
    }

    #[test]
    fn test_receipt_and_generic_keep_caller_options() {
        let requested = ImagePreprocessingOptions {
            sharpen_text: true,
            ..Default::default()
        };
        assert_eq!(DocumentMode::Receipt.profile().effective_options(requested), requested);
        assert_eq!(DocumentMode::Generic.profile().effective_options(requested), requested);
    }

    #[test]
    fn test_extraction_profiles() {
        assert_eq!(DocumentMode::Generic.profile().extraction, ExtractionOptions::comprehensive());
        assert_eq!(DocumentMode::Receipt.profile().extraction, ExtractionOptions::minimal());
        assert_eq!(
            DocumentMode::BusinessCard.profile().extraction,
            ExtractionOptions::business_card()
        );
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(DocumentMode::from_str("Business_Card").unwrap(), DocumentMode::BusinessCard);
        assert_eq!(DocumentMode::from_str(" receipt ").unwrap(), DocumentMode::Receipt);
        assert!(matches!(
            DocumentMode::from_str("whiteboard"),
            Err(OcrError::InvalidMode(_))
        ));
    }

    #[test]
    fn test_classifier_categories_map_to_modes() {
        assert_eq!(DocumentMode::for_document_type(DocumentType::Invoice), DocumentMode::Receipt);
        assert_eq!(
            DocumentMode::for_document_type(DocumentType::BusinessCard),
            DocumentMode::BusinessCard
        );
        assert_eq!(DocumentMode::for_document_type(DocumentType::Whiteboard), DocumentMode::Generic);
    }
}
