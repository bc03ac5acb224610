//! Styled text produced by generators and consumed by front-ends.
//!
//! Generators never emit terminal escape codes; they tag spans with a
//! [`Tone`] and the presentation layer decides how each tone looks.

/// Glyph that replaces every character of masked content.
pub const MASK: char = '-';

/// Presentation hint for a span of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Plain,
    /// A prime number.
    Prime,
    /// Content hidden from the user.
    Masked,
    /// A truncated (approximate) answer.
    Approximate,
    /// Author attribution of a quote.
    Attribution,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub tone: Tone,
}

/// A sequence of toned spans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledText {
    spans: Vec<Span>,
}

impl StyledText {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single plain span.
    pub fn plain(text: impl Into<String>) -> Self {
        let mut t = Self::new();
        t.push(text, Tone::Plain);
        t
    }

    /// Append a span, merging it into the previous one when the tone matches.
    pub fn push(&mut self, text: impl Into<String>, tone: Tone) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        match self.spans.last_mut() {
            Some(last) if last.tone == tone => last.text.push_str(&text),
            _ => self.spans.push(Span { text, tone }),
        }
    }

    pub fn append(&mut self, other: StyledText) {
        for span in other.spans {
            self.push(span.text, span.tone);
        }
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// The text with all styling removed.
    pub fn to_plain(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Replace every character of `s` with [`MASK`].
pub fn mask(s: &str) -> String {
    s.chars().map(|_| MASK).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_merges_same_tone() {
        let mut t = StyledText::new();
        t.push("12", Tone::Plain);
        t.push(" ", Tone::Plain);
        t.push("7", Tone::Prime);
        t.push("", Tone::Masked);
        assert_eq!(t.spans().len(), 2);
        assert_eq!(t.to_plain(), "12 7");
    }

    #[test]
    fn mask_keeps_length() {
        assert_eq!(mask("12 345"), "------");
        assert_eq!(mask(""), "");
    }
}
