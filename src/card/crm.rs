use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};

use super::{BusinessCardData, SocialPlatform};

pub const CRM_SOURCE: &str = "business_card_scan";

/// Flatten a card into a CRM import record stamped with the current time
pub fn generate_crm_data(card: &BusinessCardData) -> Map<String, Value> {
    generate_crm_data_at(card, Utc::now())
}

/// Flatten a card into a CRM import record stamped with `created_at`
pub fn generate_crm_data_at(card: &BusinessCardData, created_at: DateTime<Utc>) -> Map<String, Value> {
    let mut crm = Map::new();
    let mut put = |key: &str, value: Value| {
        crm.insert(key.to_string(), value);
    };

    if let Some(name) = &card.name {
        put("full_name", json!(name.full_name));
        if let Some(first) = &name.first_name {
            put("first_name", json!(first));
        }
        if let Some(last) = &name.last_name {
            put("last_name", json!(last));
        }
        if let Some(prefix) = &name.prefix {
            put("name_prefix", json!(prefix));
        }
        if let Some(suffix) = &name.suffix {
            put("name_suffix", json!(suffix));
        }
    }

    if let Some(title) = &card.title {
        put("title", json!(title));
    }
    if let Some(company) = &card.company {
        put("company", json!(company));
    }

    let contact = &card.contact_info;
    if let Some(phone) = contact.phone_numbers.first() {
        put("phone", json!(phone.number));
        let phones: Vec<Value> = contact
            .phone_numbers
            .iter()
            .map(|p| json!({ "number": p.number, "type": p.kind.as_str(), "confidence": p.confidence }))
            .collect();
        put("phones", Value::Array(phones));
    }

    if let Some(email) = contact.email_addresses.first() {
        put("email", json!(email.address));
        let emails: Vec<Value> = contact
            .email_addresses
            .iter()
            .map(|e| json!({ "address": e.address, "type": e.kind.as_str(), "confidence": e.confidence }))
            .collect();
        put("emails", Value::Array(emails));
    }

    if let Some(address) = contact.addresses.first() {
        put("address", json!(address.full));
        let components = [
            ("street", &address.street),
            ("city", &address.city),
            ("state", &address.state),
            ("postal_code", &address.postal_code),
            ("country", &address.country),
        ];
        for (key, value) in components {
            if let Some(value) = value {
                put(key, json!(value));
            }
        }
    }

    if let Some(url) = contact.urls.first() {
        put("website", json!(url.url));
    }

    for social in &card.social_media {
        let key = match social.platform {
            SocialPlatform::LinkedIn => "linkedin",
            SocialPlatform::Twitter => "twitter",
            SocialPlatform::Facebook => "facebook",
            SocialPlatform::Instagram => "instagram",
            SocialPlatform::Other => "social_other",
        };
        if crm.contains_key(key) {
            continue;
        }
        let link = social.url.clone().unwrap_or_else(|| social.handle.clone());
        crm.insert(key.to_string(), json!(link));
    }

    crm.insert("source".to_string(), json!(CRM_SOURCE));
    crm.insert("confidence".to_string(), json!(card.confidence));
    crm.insert(
        "created_at".to_string(),
        json!(created_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
    );
    crm
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{PersonName, SocialMediaInfo};
    use crate::contact::{ContactInfo, EmailAddress, EmailKind, PhoneKind, PhoneNumber};
    use chrono::TimeZone;

    fn card() -> BusinessCardData {
        BusinessCardData {
            name: Some(PersonName {
                full_name: "Jane Doe".into(),
                first_name: Some("Jane".into()),
                last_name: Some("Doe".into()),
                prefix: None,
                suffix: None,
            }),
            title: Some("CTO".into()),
            company: Some("Acme Inc".into()),
            contact_info: ContactInfo {
                phone_numbers: vec![
                    PhoneNumber {
                        number: "555-0100".into(),
                        kind: PhoneKind::Work,
                        confidence: 0.9,
                    },
                    PhoneNumber {
                        number: "555-0199".into(),
                        kind: PhoneKind::Mobile,
                        confidence: 0.9,
                    },
                ],
                email_addresses: vec![EmailAddress {
                    address: "jane@acme.com".into(),
                    kind: EmailKind::Work,
                    confidence: 0.95,
                }],
                ..Default::default()
            },
            social_media: vec![
                SocialMediaInfo {
                    platform: SocialPlatform::LinkedIn,
                    handle: "janedoe".into(),
                    url: Some("https://linkedin.com/in/janedoe".into()),
                },
                SocialMediaInfo {
                    platform: SocialPlatform::LinkedIn,
                    handle: "other".into(),
                    url: None,
                },
            ],
            confidence: 0.85,
        }
    }

    #[test]
    fn test_flattened_fields() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let crm = generate_crm_data_at(&card(), at);

        assert_eq!(crm["first_name"], "Jane");
        assert_eq!(crm["last_name"], "Doe");
        assert_eq!(crm["title"], "CTO");
        assert_eq!(crm["company"], "Acme Inc");
        assert_eq!(crm["phone"], "555-0100");
        assert_eq!(crm["phones"].as_array().unwrap().len(), 2);
        assert_eq!(crm["phones"][1]["type"], "mobile");
        assert_eq!(crm["email"], "jane@acme.com");
        assert_eq!(crm["emails"][0]["type"], "work");
        assert_eq!(crm["linkedin"], "https://linkedin.com/in/janedoe");
        assert_eq!(crm["source"], CRM_SOURCE);
        assert_eq!(crm["created_at"], "2024-03-01T12:30:00Z");
        assert!((crm["confidence"].as_f64().unwrap() - 0.85).abs() < 1e-6);
        assert!(!crm.contains_key("address"));
        assert!(!crm.contains_key("name_prefix"));
    }

    #[test]
    fn test_same_input_same_output() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(generate_crm_data_at(&card(), at), generate_crm_data_at(&card(), at));
    }
}
