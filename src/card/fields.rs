use once_cell::sync::Lazy;
use regex::Regex;

use super::keywords::{contains_any, has_company_suffix, has_title_keyword, CONTACT_MARKERS};
use super::text::{fold, CardText};
use super::PersonName;

static SENIORITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:senior|lead|head|chief|principal)\s+\w+").expect("static title regex")
});
static ROLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b\w+\s+(?:manager|director|officer|specialist)\b")
        .expect("static title regex")
});

/// Lines with these markers never name the company
const COMPANY_EXCLUDED: [&str; 4] = ["@", "phone", "mobile", "cell"];
/// Lines with these markers are not eligible for the longest-line fallback
const FALLBACK_EXCLUDED: [&str; 3] = ["@", "phone", "www"];

pub fn is_title_shaped(line: &str) -> bool {
    if contains_any(line, &CONTACT_MARKERS) {
        return false;
    }
    has_title_keyword(line) || SENIORITY_RE.is_match(line) || ROLE_RE.is_match(line)
}

/// Every part of the name appears in the line, ignoring case and spacing
pub fn mentions_name(line: &str, name: &PersonName) -> bool {
    let folded = fold(line);
    fold(&name.full_name)
        .split(' ')
        .filter(|part| !part.is_empty())
        .all(|part| folded.contains(part))
}

/// With a name, look at most two lines below each line mentioning it.
/// Without one, take the first title-shaped line anywhere.
pub fn extract_title(text: &CardText, name: Option<&PersonName>) -> Option<String> {
    let lines = &text.lines;
    match name {
        Some(name) => lines
            .iter()
            .enumerate()
            .filter(|(_, line)| mentions_name(line, name))
            .find_map(|(i, _)| {
                lines
                    .iter()
                    .skip(i + 1)
                    .take(2)
                    .find(|line| is_title_shaped(line))
                    .cloned()
            }),
        None => lines.iter().find(|line| is_title_shaped(line)).cloned(),
    }
}

/// First line carrying a company suffix, else the longest plausible line.
/// The name's line and the title line are never considered.
pub fn extract_company(
    text: &CardText,
    name: Option<&PersonName>,
    title: Option<&str>,
) -> Option<String> {
    let candidates: Vec<&String> = text
        .lines
        .iter()
        .filter(|line| !contains_any(line, &COMPANY_EXCLUDED))
        .filter(|line| name.map_or(true, |n| !mentions_name(line, n)))
        .filter(|line| title.map_or(true, |t| line.as_str() != t))
        .collect();

    if let Some(line) = candidates.iter().find(|line| has_company_suffix(line)) {
        return Some(line.to_string());
    }

    let mut longest: Option<&String> = None;
    for line in candidates {
        if contains_any(line, &FALLBACK_EXCLUDED) || line.chars().count() <= 3 {
            continue;
        }
        if longest.map_or(true, |l| line.chars().count() > l.chars().count()) {
            longest = Some(line);
        }
    }
    longest.cloned()
}
