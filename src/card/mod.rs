//! Business card detection and contact extraction
//!
//! [`BusinessCardProcessor`] decides whether recognized text is a business card
//! and, if so, builds a [`BusinessCardData`] record with a confidence score.
//! All methods are pure functions of their input plus the injected, stateless
//! collaborators, so one processor can be shared across threads freely.

pub mod crm;
pub mod fields;
pub mod keywords;
pub mod names;
pub mod social;
pub mod text;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::collaborators::{LinguisticTagger, NoopTagger};
use crate::contact::{ContactInfo, ContactInfoExtractor, RegexContactExtractor};
use keywords::{has_company_suffix, has_title_keyword};
use text::CardText;

pub use crm::{generate_crm_data, generate_crm_data_at, CRM_SOURCE};

/// Score a text must reach to count as a business card
pub const ACCEPTANCE_THRESHOLD: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersonName {
    pub full_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialPlatform {
    #[serde(rename = "linkedin")]
    LinkedIn,
    Twitter,
    Facebook,
    Instagram,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialMediaInfo {
    pub platform: SocialPlatform,
    pub handle: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessCardData {
    pub name: Option<PersonName>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub contact_info: ContactInfo,
    pub social_media: Vec<SocialMediaInfo>,
    /// Heuristic certainty in [0, 1]
    pub confidence: f32,
}

/// Breakdown of the acceptance decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CardScore {
    pub score: u32,
    pub accepted: bool,
}

#[derive(Clone)]
pub struct BusinessCardProcessor {
    contacts: Arc<dyn ContactInfoExtractor>,
    tagger: Arc<dyn LinguisticTagger>,
}

impl Default for BusinessCardProcessor {
    fn default() -> Self {
        Self::new(Arc::new(RegexContactExtractor), Arc::new(NoopTagger))
    }
}

impl BusinessCardProcessor {
    pub fn new(contacts: Arc<dyn ContactInfoExtractor>, tagger: Arc<dyn LinguisticTagger>) -> Self {
        Self { contacts, tagger }
    }

    /// Returns the extracted card, or `None` when the text does not look like one.
    ///
    /// The image is accepted for interface parity; extraction is text-only.
    pub fn detect_business_card(
        &self,
        text: &str,
        _image: Option<&DynamicImage>,
    ) -> Option<BusinessCardData> {
        let contact_info = self.contacts.extract(text);
        let card_text = CardText::new(text);

        let verdict = self.score_with(&card_text, &contact_info)?;
        if !verdict.accepted {
            tracing::debug!(score = verdict.score, "Text rejected as business card");
            return None;
        }

        let name = names::extract_name(&card_text, self.tagger.as_ref());
        let title = fields::extract_title(&card_text, name.as_ref());
        let company = fields::extract_company(&card_text, name.as_ref(), title.as_deref());
        let social_media = social::extract_social_media(&card_text.normalized);

        let mut card = BusinessCardData {
            name,
            title,
            company,
            contact_info,
            social_media,
            confidence: 0.0,
        };
        card.confidence = calculate_confidence(&card);

        tracing::info!(
            score = verdict.score,
            confidence = card.confidence,
            has_name = card.name.is_some(),
            has_company = card.company.is_some(),
            "Business card detected"
        );
        Some(card)
    }

    pub fn is_likely_business_card(&self, text: &str) -> bool {
        self.score(text).accepted
    }

    /// Acceptance score for `text`. A text with neither phone nor email scores 0.
    pub fn score(&self, text: &str) -> CardScore {
        let contact_info = self.contacts.extract(text);
        self.score_with(&CardText::new(text), &contact_info)
            .unwrap_or(CardScore {
                score: 0,
                accepted: false,
            })
    }

    /// `None` when the hard gate (phone or email required) rejects the text
    fn score_with(&self, text: &CardText, contact: &ContactInfo) -> Option<CardScore> {
        if contact.phone_numbers.is_empty() && contact.email_addresses.is_empty() {
            return None;
        }

        let mut score = 0;
        if !contact.phone_numbers.is_empty() {
            score += 2;
        }
        if !contact.email_addresses.is_empty() {
            score += 2;
        }
        if !contact.addresses.is_empty() {
            score += 1;
        }
        if !contact.urls.is_empty() {
            score += 1;
        }
        if has_title_keyword(&text.raw) {
            score += 1;
        }
        if has_company_suffix(&text.raw) {
            score += 1;
        }
        if names::extract_name(text, self.tagger.as_ref()).is_some() {
            score += 2;
        }
        if (10..=100).contains(&text.word_count()) {
            score += 1;
        }

        Some(CardScore {
            score,
            accepted: score >= ACCEPTANCE_THRESHOLD,
        })
    }

    pub fn generate_crm_data(&self, card: &BusinessCardData) -> serde_json::Map<String, serde_json::Value> {
        crm::generate_crm_data(card)
    }
}

/// Additive confidence over the fields present, capped at 1.0
pub fn calculate_confidence(card: &BusinessCardData) -> f32 {
    let mut confidence = 0.0f32;

    if let Some(name) = &card.name {
        confidence += 0.3;
        if name.first_name.is_some() && name.last_name.is_some() {
            confidence += 0.1;
        }
    }
    if card.title.is_some() {
        confidence += 0.2;
    }
    if card.company.is_some() {
        confidence += 0.2;
    }

    let contact = &card.contact_info;
    if !contact.phone_numbers.is_empty() {
        confidence += 0.1 + 0.05 * contact.phone_numbers.len() as f32;
    }
    if !contact.email_addresses.is_empty() {
        confidence += 0.1 + 0.05 * contact.email_addresses.len() as f32;
    }
    if !contact.addresses.is_empty() {
        confidence += 0.1;
    }

    confidence.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::{EmailAddress, EmailKind, PhoneKind, PhoneNumber, PostalAddress, WebUrl};

    /// Extractor that ignores the text and returns fixed contact details
    struct FixedContacts(ContactInfo);

    impl ContactInfoExtractor for FixedContacts {
        fn extract(&self, _text: &str) -> ContactInfo {
            self.0.clone()
        }
    }

    fn phone() -> PhoneNumber {
        PhoneNumber {
            number: "555-0100".to_string(),
            kind: PhoneKind::Work,
            confidence: 0.9,
        }
    }

    fn email() -> EmailAddress {
        EmailAddress {
            address: "someone@acme.io".to_string(),
            kind: EmailKind::Work,
            confidence: 0.95,
        }
    }

    fn address() -> PostalAddress {
        PostalAddress {
            full: "1 Main Street".to_string(),
            ..Default::default()
        }
    }

    fn url() -> WebUrl {
        WebUrl {
            url: "acme.io".to_string(),
            confidence: 0.85,
        }
    }

    fn score_of(contacts: ContactInfo, text: &str) -> CardScore {
        BusinessCardProcessor::new(Arc::new(FixedContacts(contacts)), Arc::new(NoopTagger))
            .score(text)
    }

    /// Lowercase filler with no keywords and no name shape
    fn filler(words: usize) -> String {
        vec!["word"; words].join(" ")
    }

    fn phone_only() -> ContactInfo {
        ContactInfo {
            phone_numbers: vec![phone()],
            ..Default::default()
        }
    }

    const SAMPLE: &str =
        "TechCorp Solutions Inc\nJohn Smith\nSenior Director\nPhone: 555-0123\nEmail: john@techcorp.com";

    #[test]
    fn test_sample_card_is_accepted() {
        let processor = BusinessCardProcessor::default();
        let verdict = processor.score(SAMPLE);
        // phone 2, email 2, title keyword 1, company suffix 1, name 2, 11 words 1
        assert_eq!(verdict.score, 9);
        assert!(verdict.accepted);

        let card = processor.detect_business_card(SAMPLE, None).unwrap();
        assert_eq!(card.contact_info.phone_numbers.len(), 1);
        assert_eq!(card.contact_info.email_addresses.len(), 1);
        assert_eq!(card.company.as_deref(), Some("TechCorp Solutions Inc"));
    }

    #[test]
    fn test_gate_requires_phone_or_email() {
        let processor = BusinessCardProcessor::default();
        let text = "Acme Technologies Inc\nJane Doe\nChief Executive Officer\nwww.acme.com\n100 Main Street\nSpringfield, IL 62701";
        assert_eq!(processor.score(text).score, 0);
        assert!(!processor.is_likely_business_card(text));
        assert_eq!(processor.detect_business_card(text, None), None);
    }

    #[test]
    fn test_low_score_is_rejected() {
        let processor = BusinessCardProcessor::default();
        // email 2 only: lowercase words, no keywords, under ten words
        let verdict = processor.score("write to me at hello@example.org");
        assert_eq!(verdict.score, 2);
        assert!(!verdict.accepted);
    }

    #[test]
    fn test_contact_points() {
        let text = filler(3);
        assert_eq!(score_of(phone_only(), &text).score, 2);

        let phone_and_email = ContactInfo {
            phone_numbers: vec![phone()],
            email_addresses: vec![email()],
            ..Default::default()
        };
        let verdict = score_of(phone_and_email.clone(), &text);
        assert_eq!(verdict.score, 4);
        assert!(!verdict.accepted);

        let with_address = ContactInfo {
            addresses: vec![address()],
            ..phone_and_email.clone()
        };
        let verdict = score_of(with_address, &text);
        assert_eq!(verdict.score, ACCEPTANCE_THRESHOLD);
        assert!(verdict.accepted);

        let with_url = ContactInfo {
            urls: vec![url()],
            ..phone_and_email
        };
        let verdict = score_of(with_url, &text);
        assert_eq!(verdict.score, ACCEPTANCE_THRESHOLD);
        assert!(verdict.accepted);
    }

    #[test]
    fn test_address_and_url_alone_do_not_pass_gate() {
        let contacts = ContactInfo {
            addresses: vec![address()],
            urls: vec![url()],
            ..Default::default()
        };
        let verdict = score_of(contacts, &filler(20));
        assert_eq!(verdict.score, 0);
        assert!(!verdict.accepted);
    }

    #[test]
    fn test_word_count_window() {
        assert_eq!(score_of(phone_only(), &filler(9)).score, 2);
        assert_eq!(score_of(phone_only(), &filler(10)).score, 3);
        assert_eq!(score_of(phone_only(), &filler(100)).score, 3);
        assert_eq!(score_of(phone_only(), &filler(101)).score, 2);
    }

    #[test]
    fn test_keyword_and_name_points() {
        assert_eq!(score_of(phone_only(), "word word engineer").score, 3);
        assert_eq!(score_of(phone_only(), "word word llc").score, 3);
        assert_eq!(score_of(phone_only(), "Jane Doe").score, 4);
    }

    #[test]
    fn test_company_fallback_takes_longest_unlabelled_line() {
        // no line left after the name carries a suffix, and the bare phone
        // number outgrows "Acme" in the longest-line fallback
        let text = "Acme\nVincent Lee\nvincent@acme.io\n555-123-4567";
        let processor = BusinessCardProcessor::default();
        let verdict = processor.score(text);
        assert_eq!(verdict.score, 7);
        assert!(verdict.accepted);

        let card = processor.detect_business_card(text, None).unwrap();
        assert_eq!(card.name.as_ref().unwrap().full_name, "Vincent Lee");
        assert_eq!(card.title, None);
        assert_eq!(card.company.as_deref(), Some("555-123-4567"));
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let processor = BusinessCardProcessor::default();
        assert_eq!(processor.score(SAMPLE), processor.score(SAMPLE));
        assert_eq!(
            processor.detect_business_card(SAMPLE, None),
            processor.detect_business_card(SAMPLE, None)
        );
    }

    #[test]
    fn test_confidence_formula() {
        let processor = BusinessCardProcessor::default();
        let card = processor.detect_business_card(SAMPLE, None).unwrap();
        // name 0.3 + both parts 0.1 + company 0.2 + phone 0.15 + email 0.15
        assert!((card.confidence - 0.9).abs() < 1e-5, "got {}", card.confidence);
    }

    #[test]
    fn test_confidence_is_monotonic_and_capped() {
        let processor = BusinessCardProcessor::default();
        let mut card = processor.detect_business_card(SAMPLE, None).unwrap();
        let mut previous = calculate_confidence(&card);
        for i in 0..6 {
            card.contact_info.email_addresses.push(EmailAddress {
                address: format!("extra{}@techcorp.com", i),
                kind: EmailKind::Work,
                confidence: 0.9,
            });
            let next = calculate_confidence(&card);
            assert!(next >= previous);
            assert!(next <= 1.0);
            previous = next;
        }
        assert_eq!(previous, 1.0);
    }

    #[test]
    fn test_full_card_extraction() {
        let text = "Dr. Maria Garcia\nHead of Research\nNorthwind Labs LLC\n\
                    100 Market Street\nSan Francisco, CA 94105\n\
                    Mobile: (415) 555-2671\nmaria@northwind.io\n\
                    linkedin.com/in/mgarcia";
        let card = BusinessCardProcessor::default()
            .detect_business_card(text, None)
            .unwrap();
        let name = card.name.as_ref().unwrap();
        assert_eq!(name.prefix.as_deref(), Some("Dr."));
        assert_eq!(name.first_name.as_deref(), Some("Maria"));
        assert_eq!(name.last_name.as_deref(), Some("Garcia"));
        assert_eq!(card.title.as_deref(), Some("Head of Research"));
        assert_eq!(card.company.as_deref(), Some("Northwind Labs LLC"));
        assert_eq!(card.social_media.len(), 1);
        assert_eq!(card.social_media[0].handle, "mgarcia");
        assert_eq!(card.contact_info.addresses.len(), 1);
        assert_eq!(card.confidence, 1.0);
    }
}
