//! Person-name extraction: a tagger pass followed by an ordered chain of
//! independent line heuristics. The first rule that yields a name wins.

use once_cell::sync::Lazy;
use regex::Regex;

use super::keywords::{
    contains_any, has_company_suffix, CONTACT_MARKERS, NAME_PATTERN_STOPWORDS, NAME_PREFIXES,
    NAME_SUFFIXES,
};
use super::text::CardText;
use super::PersonName;
use crate::collaborators::LinguisticTagger;

/// A heuristic over normalized card text
pub type NameRule = fn(&CardText) -> Option<PersonName>;

/// Heuristics tried, in order, after the tagger pass
pub const NAME_RULES: [(&str, NameRule); 4] = [
    ("trailing_lines", from_trailing_lines),
    ("leading_lines", from_leading_lines),
    ("loose_lines", from_loose_lines),
    ("name_patterns", from_name_patterns),
];

static FIRST_LAST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z][a-z]+ [A-Z][a-z]+\b").expect("static name regex"));
static FIRST_INITIAL_LAST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Z][a-z]+ [A-Z]\. [A-Z][a-z]+\b").expect("static name regex")
});
static LAST_COMMA_FIRST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Z][a-z]+), ?([A-Z][a-z]+)\b").expect("static name regex")
});
static ALL_CAPS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z]{2,} [A-Z]{2,}\b").expect("static name regex"));
static FIRST_MIDDLE_LAST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Z][a-z]+ [A-Z][a-z]+ [A-Z][a-z]+\b").expect("static name regex")
});

/// Run the whole cascade
pub fn extract_name(text: &CardText, tagger: &dyn LinguisticTagger) -> Option<PersonName> {
    if let Some(name) = from_tagger(text, tagger) {
        tracing::debug!(rule = "tagger", name = %name.full_name, "Name found");
        return Some(name);
    }

    NAME_RULES.iter().find_map(|(rule, apply)| {
        let name = apply(text)?;
        tracing::debug!(rule, name = %name.full_name, "Name found");
        Some(name)
    })
}

/// Every token the tagger marks as a personal name, in text order, joined
/// with single spaces
pub fn from_tagger(text: &CardText, tagger: &dyn LinguisticTagger) -> Option<PersonName> {
    let tokens: Vec<String> = tagger
        .tag_personal_names(&text.normalized)
        .into_iter()
        .filter_map(|(token, is_name)| is_name.then_some(token))
        .collect();

    if tokens.is_empty() {
        return None;
    }
    parse_full_name(&tokens.join(" "))
}

/// Last three lines, bottom up
pub fn from_trailing_lines(text: &CardText) -> Option<PersonName> {
    text.lines
        .iter()
        .rev()
        .take(3)
        .find(|line| is_name_shaped(line))
        .and_then(|line| parse_full_name(line))
}

/// First five lines, top down
pub fn from_leading_lines(text: &CardText) -> Option<PersonName> {
    text.lines
        .iter()
        .take(5)
        .find(|line| is_name_shaped(line))
        .and_then(|line| parse_full_name(line))
}

/// Any line passing the looser word-shape test
pub fn from_loose_lines(text: &CardText) -> Option<PersonName> {
    text.lines
        .iter()
        .find(|line| is_loose_name(line))
        .and_then(|line| parse_full_name(line))
}

/// Common name layouts matched anywhere in the text
pub fn from_name_patterns(text: &CardText) -> Option<PersonName> {
    let acceptable = |candidate: &str| !contains_any(candidate, &NAME_PATTERN_STOPWORDS);

    let simple = |re: &Regex| {
        re.find_iter(&text.normalized)
            .map(|m| m.as_str())
            .find(|m| acceptable(*m))
            .map(str::to_string)
    };

    simple(&*FIRST_LAST_RE)
        .or_else(|| simple(&*FIRST_INITIAL_LAST_RE))
        .or_else(|| {
            LAST_COMMA_FIRST_RE
                .captures_iter(&text.normalized)
                .find(|caps| acceptable(&caps[0]))
                .map(|caps| format!("{} {}", &caps[2], &caps[1]))
        })
        .or_else(|| simple(&*ALL_CAPS_RE))
        .or_else(|| simple(&*FIRST_MIDDLE_LAST_RE))
        .and_then(|full| parse_full_name(&full))
}

/// Strict test: no contact markers or company words, 2 to 4 tokens,
/// at least two of them capitalized
pub fn is_name_shaped(line: &str) -> bool {
    if contains_any(line, &CONTACT_MARKERS) || has_company_suffix(line) {
        return false;
    }
    let tokens: Vec<&str> = line.split_whitespace().collect();
    (2..=4).contains(&tokens.len()) && tokens.iter().filter(|t| starts_upper(t)).count() >= 2
}

/// Loose test: 2 to 4 words made of letters, `.` and `'`, each 2 to 20
/// characters, with at most one word not capitalized
pub fn is_loose_name(line: &str) -> bool {
    let words: Vec<&str> = line.split_whitespace().collect();
    if !(2..=4).contains(&words.len()) {
        return false;
    }

    let well_formed = words.iter().all(|w| {
        let len = w.chars().count();
        (2..=20).contains(&len) && w.chars().all(|c| c.is_alphabetic() || c == '.' || c == '\'')
    });
    let capitalized = words.iter().filter(|w| starts_upper(w)).count();

    well_formed && capitalized + 1 >= words.len()
}

/// Split a full name into prefix, first, last and suffix parts
pub fn parse_full_name(full: &str) -> Option<PersonName> {
    let full = full.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut tokens: Vec<&str> = full.split(' ').filter(|t| !t.is_empty()).collect();
    if tokens.is_empty() {
        return None;
    }

    let mut prefix = None;
    if tokens.len() > 1 && NAME_PREFIXES.contains(&tokens[0].to_lowercase().as_str()) {
        prefix = Some(tokens.remove(0).to_string());
    }

    let mut suffix = None;
    if let Some(last) = tokens.last() {
        let bare = last.trim_end_matches(',').to_lowercase();
        if tokens.len() > 1 && NAME_SUFFIXES.contains(&bare.as_str()) {
            suffix = tokens.pop().map(str::to_string);
        }
    }

    let first_name = tokens.first().map(|t| t.trim_end_matches(',').to_string());
    let last_name = if tokens.len() > 1 {
        Some(tokens[1..].join(" ").trim_end_matches(',').to_string())
    } else {
        None
    };

    Some(PersonName {
        full_name: full.clone(),
        first_name,
        last_name,
        prefix,
        suffix,
    })
}

fn starts_upper(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}
