//! Contact details found in free text: phones, emails, postal addresses, URLs.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b").expect("static email regex")
});

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+\d{1,3}[\s.-]?)?(?:\(?\d{3}\)?[\s.-]?)?\d{3}[\s.-]\d{4}\b")
        .expect("static phone regex")
});

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:https?://)?(?:www\.)?[a-z0-9-]+(?:\.[a-z0-9-]+)*\.(?:com|org|net|io|co|biz|info|dev|ai|us|uk|de|ca)\b(?:/[^\s]*)?",
    )
    .expect("static url regex")
});

static STREET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\d+\s+[a-z0-9 .'-]*?\b(?:street|st|avenue|ave|road|rd|boulevard|blvd|drive|dr|lane|ln|way|court|ct|place|pl|parkway|pkwy|suite|ste)\b\.?",
    )
    .expect("static street regex")
});

static CITY_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z .'-]+),\s*([A-Z]{2})\s+(\d{5}(?:-\d{4})?)(?:\s*,?\s*(USA|US|United States))?$")
        .expect("static city line regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhoneKind {
    Mobile,
    Work,
    Home,
    Fax,
    Other,
}

impl PhoneKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Work => "work",
            Self::Home => "home",
            Self::Fax => "fax",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailKind {
    Work,
    Personal,
}

impl EmailKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Personal => "personal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneNumber {
    pub number: String,
    pub kind: PhoneKind,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailAddress {
    pub address: String,
    pub kind: EmailKind,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PostalAddress {
    /// Address as it appeared, lines joined with ", "
    pub full: String,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebUrl {
    pub url: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    pub phone_numbers: Vec<PhoneNumber>,
    pub email_addresses: Vec<EmailAddress>,
    pub addresses: Vec<PostalAddress>,
    pub urls: Vec<WebUrl>,
}

impl ContactInfo {
    pub fn is_empty(&self) -> bool {
        self.phone_numbers.is_empty()
            && self.email_addresses.is_empty()
            && self.addresses.is_empty()
            && self.urls.is_empty()
    }
}

/// Pulls contact fields out of recognized text
pub trait ContactInfoExtractor: Send + Sync {
    fn extract(&self, text: &str) -> ContactInfo;
}

/// Pattern-based extractor for North American style contact details
#[derive(Debug, Clone, Default)]
pub struct RegexContactExtractor;

const FREE_MAIL_DOMAINS: [&str; 6] = [
    "gmail.com",
    "yahoo.com",
    "hotmail.com",
    "outlook.com",
    "icloud.com",
    "aol.com",
];

impl ContactInfoExtractor for RegexContactExtractor {
    fn extract(&self, text: &str) -> ContactInfo {
        let mut info = ContactInfo::default();

        for line in text.lines() {
            let lower = line.to_lowercase();
            let labelled = ["phone", "tel", "mobile", "cell", "fax", "office", "direct", "home"]
                .iter()
                .any(|l| lower.contains(l));
            // emails first so their digits and domains are not reused
            let without_emails = EMAIL_RE.replace_all(line, " ");

            for m in PHONE_RE.find_iter(&without_emails) {
                let number = m.as_str().trim().to_string();
                if info.phone_numbers.iter().any(|p| p.number == number) {
                    continue;
                }
                info.phone_numbers.push(PhoneNumber {
                    number,
                    kind: phone_kind(&lower),
                    confidence: if labelled { 0.9 } else { 0.8 },
                });
            }

            let without_phones = PHONE_RE.replace_all(&without_emails, " ");
            for m in URL_RE.find_iter(&without_phones) {
                let url = m.as_str().trim_end_matches(['.', ',', ';', ')']).to_string();
                if info.urls.iter().any(|u| u.url == url) {
                    continue;
                }
                info.urls.push(WebUrl {
                    url,
                    confidence: 0.85,
                });
            }
        }

        for m in EMAIL_RE.find_iter(text) {
            let address = m.as_str().to_string();
            if info.email_addresses.iter().any(|e| e.address == address) {
                continue;
            }
            let domain = address.rsplit('@').next().unwrap_or_default().to_lowercase();
            let kind = if FREE_MAIL_DOMAINS.contains(&domain.as_str()) {
                EmailKind::Personal
            } else {
                EmailKind::Work
            };
            info.email_addresses.push(EmailAddress {
                address,
                kind,
                confidence: 0.95,
            });
        }

        info.addresses = extract_addresses(text);
        info
    }
}

fn phone_kind(line: &str) -> PhoneKind {
    if line.contains("mobile") || line.contains("cell") {
        PhoneKind::Mobile
    } else if line.contains("fax") {
        PhoneKind::Fax
    } else if line.contains("home") {
        PhoneKind::Home
    } else if ["office", "work", "direct", "tel", "phone"]
        .iter()
        .any(|l| line.contains(l))
    {
        PhoneKind::Work
    } else {
        PhoneKind::Other
    }
}

fn extract_addresses(text: &str) -> Vec<PostalAddress> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut addresses = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if STREET_RE.is_match(line) {
            let mut address = PostalAddress {
                full: line.to_string(),
                street: Some(line.to_string()),
                confidence: 0.6,
                ..Default::default()
            };
            if let Some(next) = lines.get(i + 1) {
                if let Some(caps) = CITY_LINE_RE.captures(next) {
                    fill_city_line(&mut address, &caps);
                    address.full = format!("{}, {}", line, next);
                    address.confidence = 0.85;
                    i += 1;
                }
            }
            addresses.push(address);
        } else if let Some(caps) = CITY_LINE_RE.captures(line) {
            let mut address = PostalAddress {
                full: line.to_string(),
                confidence: 0.7,
                ..Default::default()
            };
            fill_city_line(&mut address, &caps);
            addresses.push(address);
        }
        i += 1;
    }
    addresses
}

fn fill_city_line(address: &mut PostalAddress, caps: &regex::Captures<'_>) {
    address.city = caps.get(1).map(|m| m.as_str().trim().to_string());
    address.state = caps.get(2).map(|m| m.as_str().to_string());
    address.postal_code = caps.get(3).map(|m| m.as_str().to_string());
    address.country = caps.get(4).map(|m| m.as_str().to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_phone_and_email() {
        let info = RegexContactExtractor.extract("Phone: 555-0123\nEmail: john@techcorp.com");
        assert_eq!(info.phone_numbers.len(), 1);
        assert_eq!(info.phone_numbers[0].number, "555-0123");
        assert_eq!(info.phone_numbers[0].kind, PhoneKind::Work);
        assert_eq!(info.email_addresses.len(), 1);
        assert_eq!(info.email_addresses[0].kind, EmailKind::Work);
        // the email domain is not a website
        assert!(info.urls.is_empty());
    }

    #[test]
    fn test_phone_formats_and_kinds() {
        let text = "Mobile: (415) 555-2671\nFax +1 212.555.0199\n800 555 1212";
        let info = RegexContactExtractor.extract(text);
        let kinds: Vec<_> = info.phone_numbers.iter().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![PhoneKind::Mobile, PhoneKind::Fax, PhoneKind::Other]);
        assert_eq!(info.phone_numbers[0].number, "(415) 555-2671");
    }

    #[test]
    fn test_personal_email_kind() {
        let info = RegexContactExtractor.extract("jane.doe@gmail.com");
        assert_eq!(info.email_addresses[0].kind, EmailKind::Personal);
    }

    #[test]
    fn test_urls() {
        let info = RegexContactExtractor.extract("www.acme.io\nhttps://linkedin.com/in/jdoe,");
        let urls: Vec<_> = info.urls.iter().map(|u| u.url.as_str()).collect();
        assert_eq!(urls, vec!["www.acme.io", "https://linkedin.com/in/jdoe"]);
    }

    #[test]
    fn test_street_and_city_lines_form_one_address() {
        let info = RegexContactExtractor.extract("Jane Doe\n100 Main Street\nSpringfield, IL 62701");
        assert_eq!(info.addresses.len(), 1);
        let address = &info.addresses[0];
        assert_eq!(address.street.as_deref(), Some("100 Main Street"));
        assert_eq!(address.city.as_deref(), Some("Springfield"));
        assert_eq!(address.state.as_deref(), Some("IL"));
        assert_eq!(address.postal_code.as_deref(), Some("62701"));
        assert_eq!(address.full, "100 Main Street, Springfield, IL 62701");
    }

    #[test]
    fn test_plain_text_has_no_contacts() {
        assert!(RegexContactExtractor
            .extract("Chief Executive Officer\nAcme Corporation")
            .is_empty());
    }
}
