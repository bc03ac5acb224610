//! Challenge generators.
//!
//! One struct per challenge kind, all driven through [`ChallengeGenerator`].
//! Generators own the challenge content; the session owns the state machine.

mod arithmetic;
mod numbers;
mod quotes;
mod timed;

pub use arithmetic::ArithmeticGenerator;
pub use numbers::StaticNumbersGenerator;
pub use quotes::{split_author, word_count, QuotesGenerator};
pub use timed::TimedNumbersGenerator;

use std::path::PathBuf;

use rand::{Rng, RngCore};

use crate::display::{mask, StyledText, Tone};
use crate::error::ChallengeError;
use crate::matcher::MatchMode;
use crate::model::{is_prime, ChallengeKind, ChallengeSettings};
use crate::quote_bank::QuoteBank;
use crate::settings::DIGITS_LIMIT;

/// What the session should do after a countdown tick was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEffect {
    None,
    /// The visible item was blanked; end the blink after the configured delay.
    Blink,
}

/// Capability interface shared by every challenge kind.
pub trait ChallengeGenerator: Send {
    fn kind(&self) -> ChallengeKind;

    /// Populate a new challenge. With `regenerate == false` the previous
    /// content is kept verbatim.
    fn new_challenge(
        &mut self,
        settings: &mut ChallengeSettings,
        rng: &mut dyn RngCore,
        regenerate: bool,
    ) -> Result<(), ChallengeError>;

    /// The generated tokens.
    fn items(&self) -> &[String];

    /// Indices of `items` the user must recall, sorted ascending.
    fn hidden_positions(&self) -> &[usize] {
        &[]
    }

    /// Render the challenge, either literally or masked.
    fn format_challenge_for_display(&self, settings: &ChallengeSettings, reveal: bool)
        -> StyledText;

    /// The raw answer computed from `items`.
    fn generate_answer(&self) -> Result<String, ChallengeError>;

    /// Canonical answer used for matching.
    fn format_plain_answer(&self, _settings: &ChallengeSettings) -> Result<String, ChallengeError> {
        self.generate_answer()
    }

    /// Rendering shown once the challenge is solved or revealed.
    fn format_answer_for_display(
        &self,
        settings: &ChallengeSettings,
    ) -> Result<StyledText, ChallengeError> {
        let mut text = self.format_challenge_for_display(settings, true);
        let answer = self.format_plain_answer(settings)?;
        if text.to_plain() != answer {
            text.push(format!("\n= {answer}"), Tone::Plain);
        }
        Ok(text)
    }

    fn match_mode(&self) -> MatchMode {
        MatchMode::Exact
    }

    /// Whether the challenge starts with a visible memorize phase.
    fn has_memorize_phase(&self) -> bool {
        true
    }

    /// Whether answer keys are ignored while the content is being shown.
    fn blocks_keys_while_showing(&self) -> bool {
        false
    }

    /// Called for every countdown tick with the seconds left before it.
    fn on_countdown_tick(&mut self, _remaining: u32, _settings: &ChallengeSettings) -> TickEffect {
        TickEffect::None
    }

    /// End a blink started by [`TickEffect::Blink`].
    fn end_blink(&mut self) {}

    /// Drop cached external data so it is reloaded on the next challenge.
    fn reload(&mut self) {}

    /// The view is being rebuilt; content it remembers may be shown again.
    fn reopen(&mut self, _settings: &ChallengeSettings) {}
}

/// Create the generator for `kind`.
///
/// `quotes_path` is the fallback quote source used when the quotes challenge
/// has no path of its own.
pub fn generator_for(
    kind: ChallengeKind,
    settings: &ChallengeSettings,
    quotes_path: Option<PathBuf>,
) -> Box<dyn ChallengeGenerator> {
    match kind {
        ChallengeKind::StaticNumbers => Box::new(StaticNumbersGenerator::default()),
        ChallengeKind::TimedNumbers => Box::new(TimedNumbersGenerator::default()),
        ChallengeKind::MathArithmetic => Box::new(ArithmeticGenerator::default()),
        ChallengeKind::Quotes => Box::new(QuotesGenerator::new(
            QuoteBank::new(quotes_path.clone()),
            quotes_path,
            Some(settings.last_quote_idx),
        )),
    }
}

// ---------------------------------------------------------------------------
// Shared number helpers
// ---------------------------------------------------------------------------

/// Inclusive draw range `[10^(digits_min-1) - 1, 10^digits_max - 1]`.
pub(crate) fn number_range(settings: &ChallengeSettings) -> (u64, u64) {
    let min_digits = settings.digits_min.clamp(1, DIGITS_LIMIT);
    let max_digits = settings.digits_max.clamp(1, DIGITS_LIMIT);
    let from = 10u64.pow(min_digits - 1) - 1;
    let to = 10u64.pow(max_digits) - 1;
    if from <= to {
        (from, to)
    } else {
        (to, from)
    }
}

/// Draw a number and format it, zero-padding to `digits_max` if enabled.
pub(crate) fn draw_number(settings: &ChallengeSettings, rng: &mut dyn RngCore) -> String {
    let (from, to) = number_range(settings);
    let n = rng.gen_range(from..=to);
    if settings.zero_padded {
        format!("{n:0width$}", width = settings.digits_max as usize)
    } else {
        n.to_string()
    }
}

/// Whether a token should be highlighted as prime.
pub(crate) fn is_prime_token(token: &str, settings: &ChallengeSettings) -> bool {
    settings.primes_are_red
        && !token.is_empty()
        && token.chars().all(|c| c.is_ascii_digit())
        && token.parse::<u64>().map(is_prime).unwrap_or(false)
}

/// Space-joined tokens with primes highlighted.
pub(crate) fn highlight_tokens(items: &[String], settings: &ChallengeSettings) -> StyledText {
    let mut text = StyledText::new();
    for (idx, item) in items.iter().enumerate() {
        if idx != 0 {
            text.push(" ", Tone::Plain);
        }
        let tone = if is_prime_token(item, settings) {
            Tone::Prime
        } else {
            Tone::Plain
        };
        text.push(item.as_str(), tone);
    }
    text
}

/// Space-joined tokens with every character masked.
pub(crate) fn masked_tokens(items: &[String]) -> StyledText {
    let mut text = StyledText::new();
    text.push(mask(&items.join(" ")), Tone::Masked);
    text
}


#[cfg(test)]
mod tests {
    use super::*;

    fn settings(min: u32, max: u32) -> ChallengeSettings {
        let mut s = ChallengeSettings::defaults_for(ChallengeKind::StaticNumbers);
        s.digits_min = min;
        s.digits_max = max;
        s
    }

    #[test]
    fn range_follows_digit_counts() {
        assert_eq!(number_range(&settings(1, 2)), (0, 99));
        assert_eq!(number_range(&settings(2, 3)), (9, 999));
        assert_eq!(number_range(&settings(3, 1)), (9, 99));
        assert_eq!(
            number_range(&settings(18, 18)),
            (99_999_999_999_999_999, 999_999_999_999_999_999)
        );
    }

    #[test]
    fn zero_padding() {
        let mut s = settings(1, 3);
        s.zero_padded = true;
        let mut rng = test_support::rng(3);
        for _ in 0..50 {
            assert_eq!(draw_number(&s, &mut rng).len(), 3);
        }
    }

    #[test]
    fn primes_are_highlighted_only_when_enabled() {
        let items: Vec<String> = ["4", "7", "-7", "07"].iter().map(|s| s.to_string()).collect();
        let mut s = settings(1, 2);
        let text = highlight_tokens(&items, &s);
        let primes: Vec<&str> = text
            .spans()
            .iter()
            .filter(|sp| sp.tone == Tone::Prime)
            .map(|sp| sp.text.as_str())
            .collect();
        assert_eq!(primes, vec!["7", "07"]);

        s.primes_are_red = false;
        assert!(highlight_tokens(&items, &s)
            .spans()
            .iter()
            .all(|sp| sp.tone == Tone::Plain));
    }

    #[test]
    fn masking_covers_separators() {
        let items = vec!["12".to_string(), "3".to_string()];
        assert_eq!(masked_tokens(&items).to_plain(), "----");
    }
}
