//! Answer matching.

/// Characters ignored when comparing text answers.
pub const PUNCTUATION: &[char] = &['.', '?', '!', ',', ';', ':', '\'', '"', '(', ')', '/', '-'];

/// How a submission is compared with the expected answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Exact comparison after trimming surrounding whitespace.
    Exact,
    /// Case-, punctuation- and whitespace-insensitive comparison.
    Text,
}

/// Remove every [`PUNCTUATION`] character from `s`.
pub fn strip_punctuation(s: &str) -> String {
    s.chars().filter(|c| !PUNCTUATION.contains(c)).collect()
}

/// Lowercase, drop punctuation and collapse whitespace runs to one space.
pub fn normalize_text(s: &str) -> String {
    strip_punctuation(&s.to_lowercase())
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn answers_match(mode: MatchMode, submitted: &str, expected: &str) -> bool {
    match mode {
        MatchMode::Exact => submitted.trim() == expected.trim(),
        MatchMode::Text => normalize_text(submitted) == normalize_text(expected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_trims_only() {
        assert!(answers_match(MatchMode::Exact, " 12 34 ", "12 34"));
        assert!(!answers_match(MatchMode::Exact, "12  34", "12 34"));
        assert!(!answers_match(MatchMode::Exact, "1234", "12 34"));
    }

    #[test]
    fn text_ignores_case_punctuation_and_spacing() {
        assert!(answers_match(
            MatchMode::Text,
            "To be,  or NOT to be",
            "to be or not to be"
        ));
        assert!(answers_match(MatchMode::Text, "don't\nstop", "dont stop"));
        assert!(!answers_match(MatchMode::Text, "to be", "not to be"));
    }

    #[test]
    fn normalize_examples() {
        assert_eq!(normalize_text("  Hello,   (World)! "), "hello world");
        assert_eq!(normalize_text("well-known"), "wellknown");
        assert_eq!(normalize_text("..."), "");
    }
}
