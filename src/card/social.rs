use once_cell::sync::Lazy;
use regex::Regex;

use super::{SocialMediaInfo, SocialPlatform};

static PLATFORM_PATTERNS: Lazy<Vec<(SocialPlatform, Regex)>> = Lazy::new(|| {
    [
        (SocialPlatform::LinkedIn, "linkedin"),
        (SocialPlatform::Twitter, "twitter"),
        (SocialPlatform::Facebook, "facebook"),
        (SocialPlatform::Instagram, "instagram"),
    ]
    .into_iter()
    .map(|(platform, domain)| {
        let re = Regex::new(&format!(r"(?i)\S*{}\.com\S*", domain))
            .unwrap_or_else(|e| panic!("Failed to compile social regex: {e}"));
        (platform, re)
    })
    .collect()
});

/// Profile links for the known platforms, in platform order then text order.
/// Bare domains without a profile path are ignored.
pub fn extract_social_media(text: &str) -> Vec<SocialMediaInfo> {
    let mut found = Vec::new();
    for (platform, re) in PLATFORM_PATTERNS.iter() {
        for m in re.find_iter(text) {
            let matched = m.as_str().trim_end_matches(['.', ',', ';', ')']);
            let Some(handle) = handle_for(*platform, matched) else {
                continue;
            };
            found.push(SocialMediaInfo {
                platform: *platform,
                handle,
                url: Some(with_scheme(matched)),
            });
        }
    }
    found
}

/// Derive the account handle from a profile link
pub fn handle_for(platform: SocialPlatform, link: &str) -> Option<String> {
    let path = strip_scheme(link);
    let path = path.split(['?', '#']).next().unwrap_or_default();
    // first segment is the host
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).skip(1).collect();

    let handle = match platform {
        SocialPlatform::LinkedIn => {
            match segments.iter().position(|s| s.eq_ignore_ascii_case("in")) {
                Some(i) => segments.get(i + 1).copied(),
                None => segments.last().copied(),
            }
        }
        SocialPlatform::Twitter => segments.last().map(|s| s.trim_start_matches('@')),
        SocialPlatform::Facebook | SocialPlatform::Instagram | SocialPlatform::Other => {
            segments.last().copied()
        }
    }?;

    if handle.is_empty() {
        None
    } else {
        Some(handle.to_string())
    }
}

fn strip_scheme(link: &str) -> &str {
    let lower = link.to_ascii_lowercase();
    if lower.starts_with("https://") {
        &link[8..]
    } else if lower.starts_with("http://") {
        &link[7..]
    } else {
        link
    }
}

fn with_scheme(link: &str) -> String {
    let lower = link.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        link.to_string()
    } else {
        format!("https://{}", link)
    }
}
