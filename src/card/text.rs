use once_cell::sync::Lazy;
use regex::Regex;

static INLINE_SPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t\u{00A0}]+").expect("static whitespace regex"));

/// Recognized text split into trimmed, non-empty lines with collapsed whitespace
#[derive(Debug, Clone, PartialEq)]
pub struct CardText {
    /// Input as given
    pub raw: String,
    /// Line breaks unified to `\n`, runs of spaces collapsed, empty lines dropped
    pub normalized: String,
    pub lines: Vec<String>,
}

impl CardText {
    pub fn new(text: &str) -> Self {
        let unified = text.replace("\r\n", "\n").replace('\r', "\n");
        let lines: Vec<String> = unified
            .split('\n')
            .map(|line| INLINE_SPACE_RE.replace_all(line, " ").trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();

        Self {
            raw: text.to_string(),
            normalized: lines.join("\n"),
            lines,
        }
    }

    pub fn word_count(&self) -> usize {
        self.raw.split_whitespace().count()
    }
}

/// Lowercase and collapse whitespace for loose comparisons
pub fn fold(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
