//! Fixed vocabularies for business card heuristics. Matching is case-insensitive
//! substring matching against the lowercased text.

pub const TITLE_KEYWORDS: [&str; 22] = [
    "ceo",
    "president",
    "director",
    "manager",
    "vp",
    "vice president",
    "senior",
    "lead",
    "head",
    "chief",
    "founder",
    "partner",
    "consultant",
    "specialist",
    "analyst",
    "engineer",
    "developer",
    "designer",
    "architect",
    "coordinator",
    "supervisor",
    "executive",
];

pub const COMPANY_SUFFIXES: [&str; 17] = [
    "inc",
    "llc",
    "corp",
    "corporation",
    "company",
    "co.",
    "ltd",
    "limited",
    "group",
    "associates",
    "partners",
    "solutions",
    "services",
    "systems",
    "technologies",
    "tech",
    "consulting",
];

pub const NAME_PREFIXES: [&str; 8] = ["dr", "dr.", "mr", "mr.", "mrs", "mrs.", "ms", "ms."];

pub const NAME_SUFFIXES: [&str; 9] = ["jr", "jr.", "sr", "sr.", "ii", "iii", "phd", "md", "esq"];

/// Markers of contact lines that can never be a name or a title
pub const CONTACT_MARKERS: [&str; 4] = ["@", "www", ".com", "phone"];

/// Words that disqualify a pattern-matched name
pub const NAME_PATTERN_STOPWORDS: [&str; 11] = [
    "phone",
    "tel",
    "email",
    "www",
    ".com",
    "@",
    "solutions",
    "service",
    "company",
    "inc",
    "llc",
];

pub fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    let lower = haystack.to_lowercase();
    needles.iter().any(|n| lower.contains(n))
}

pub fn has_title_keyword(text: &str) -> bool {
    contains_any(text, &TITLE_KEYWORDS)
}

pub fn has_company_suffix(text: &str) -> bool {
    contains_any(text, &COMPANY_SUFFIXES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_ignores_case() {
        assert!(has_title_keyword("Senior DIRECTOR"));
        assert!(has_company_suffix("Acme INC"));
        assert!(!has_company_suffix("John Smith"));
    }

    #[test]
    fn test_substring_semantics() {
        // "TechCorp" carries both "tech" and "corp"
        assert!(has_company_suffix("TechCorp"));
        assert!(has_title_keyword("VP of Sales"));
    }
}
