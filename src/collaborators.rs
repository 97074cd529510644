//! Contracts for the collaborators the OCR pipeline and the business card
//! processor delegate to, with the default implementations the server wires in.

use image::DynamicImage;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::card::{BusinessCardData, BusinessCardProcessor};
use crate::contact::{ContactInfo, ContactInfoExtractor, RegexContactExtractor};
use crate::engine::TextBlock;
use crate::mode::ExtractionOptions;
use crate::ocr::{DocumentType, TableData};

static KEY_VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9 #/&.()-]{0,40}?)\s*:\s*(\S.*)$").expect("static key/value regex")
});

/// Marks which tokens of a text are personal names
pub trait LinguisticTagger: Send + Sync {
    /// Tokens in text order, each flagged when it is part of a personal name
    fn tag_personal_names(&self, text: &str) -> Vec<(String, bool)>;
}

/// Tagger that recognizes nothing; name extraction falls through to line heuristics
#[derive(Debug, Clone, Default)]
pub struct NoopTagger;

impl LinguisticTagger for NoopTagger {
    fn tag_personal_names(&self, text: &str) -> Vec<(String, bool)> {
        text.split_whitespace().map(|t| (t.to_string(), false)).collect()
    }
}

pub trait TableDetector: Send + Sync {
    fn detect_tables(&self, blocks: &[TextBlock], image_size: (u32, u32)) -> Vec<TableData>;
}

/// Detector used when no table backend is configured
#[derive(Debug, Clone, Default)]
pub struct NoTableDetector;

impl TableDetector for NoTableDetector {
    fn detect_tables(&self, _blocks: &[TextBlock], _image_size: (u32, u32)) -> Vec<TableData> {
        Vec::new()
    }
}

/// Document-type specific fields found beyond the raw text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredData {
    pub document_type: DocumentType,
    /// `Label: value` pairs, first occurrence of each label wins
    pub fields: BTreeMap<String, String>,
    pub contact_info: Option<ContactInfo>,
    pub business_card: Option<BusinessCardData>,
}

impl StructuredData {
    pub fn empty(document_type: DocumentType) -> Self {
        Self {
            document_type,
            fields: BTreeMap::new(),
            contact_info: None,
            business_card: None,
        }
    }
}

pub trait StructuredTextExtractor: Send + Sync {
    fn extract(
        &self,
        raw_text: &str,
        blocks: &[TextBlock],
        image: &DynamicImage,
        options: &ExtractionOptions,
    ) -> StructuredData;
}

/// Line-pattern extractor that also runs business card detection when asked
#[derive(Clone)]
pub struct HeuristicTextExtractor {
    contacts: Arc<dyn ContactInfoExtractor>,
    cards: BusinessCardProcessor,
}

impl Default for HeuristicTextExtractor {
    fn default() -> Self {
        Self::new(Arc::new(RegexContactExtractor), BusinessCardProcessor::default())
    }
}

impl HeuristicTextExtractor {
    pub fn new(contacts: Arc<dyn ContactInfoExtractor>, cards: BusinessCardProcessor) -> Self {
        Self { contacts, cards }
    }
}

impl StructuredTextExtractor for HeuristicTextExtractor {
    fn extract(
        &self,
        raw_text: &str,
        _blocks: &[TextBlock],
        image: &DynamicImage,
        options: &ExtractionOptions,
    ) -> StructuredData {
        let mut data = StructuredData::empty(options.document_type);

        if options.extract_fields {
            data.fields = key_values(raw_text);
        }
        if options.extract_contacts {
            data.contact_info = Some(self.contacts.extract(raw_text));
        }
        if options.detect_business_card {
            data.business_card = self.cards.detect_business_card(raw_text, Some(image));
            if data.business_card.is_some() {
                data.document_type = DocumentType::BusinessCard;
            }
        }

        data
    }
}

fn key_values(text: &str) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();
    for line in text.lines() {
        let Some(caps) = KEY_VALUE_RE.captures(line.trim()) else {
            continue;
        };
        let key = caps[1].trim().to_lowercase();
        // "https://..." is not a label
        if key == "http" || key == "https" {
            continue;
        }
        fields
            .entry(key)
            .or_insert_with(|| caps[2].trim().to_string());
    }
    fields
}
