use rand::RngCore;
use tracing::debug;

use super::{
    draw_number, highlight_tokens, is_prime_token, masked_tokens, ChallengeGenerator, TickEffect,
};
use crate::display::{StyledText, Tone};
use crate::error::ChallengeError;
use crate::model::{ChallengeKind, ChallengeSettings};

/// Numbers shown one at a time, advancing every `seconds_per_level` ticks.
#[derive(Debug, Default)]
pub struct TimedNumbersGenerator {
    items: Vec<String>,
    current: usize,
    blanked: bool,
}

impl TimedNumbersGenerator {
    /// Index of the item currently on screen.
    pub fn current_item(&self) -> usize {
        self.current
    }

    pub fn is_blanked(&self) -> bool {
        self.blanked
    }
}

impl ChallengeGenerator for TimedNumbersGenerator {
    fn kind(&self) -> ChallengeKind {
        ChallengeKind::TimedNumbers
    }

    fn new_challenge(
        &mut self,
        settings: &mut ChallengeSettings,
        rng: &mut dyn RngCore,
        regenerate: bool,
    ) -> Result<(), ChallengeError> {
        if regenerate || self.items.is_empty() {
            self.items = (0..settings.level).map(|_| draw_number(settings, rng)).collect();
            debug!(target: "mmm::generator", level = settings.level, items = ?self.items, "timed sequence");
        }
        self.current = 0;
        self.blanked = false;
        Ok(())
    }

    fn items(&self) -> &[String] {
        &self.items
    }

    fn format_challenge_for_display(
        &self,
        settings: &ChallengeSettings,
        reveal: bool,
    ) -> StyledText {
        if !reveal {
            return masked_tokens(&self.items);
        }
        let mut text = StyledText::new();
        if self.blanked {
            return text;
        }
        if let Some(item) = self.items.get(self.current) {
            let tone = if is_prime_token(item, settings) {
                Tone::Prime
            } else {
                Tone::Plain
            };
            text.push(item.as_str(), tone);
        }
        text
    }

    fn generate_answer(&self) -> Result<String, ChallengeError> {
        Ok(self.items.join(" "))
    }

    fn format_answer_for_display(
        &self,
        settings: &ChallengeSettings,
    ) -> Result<StyledText, ChallengeError> {
        Ok(highlight_tokens(&self.items, settings))
    }

    fn blocks_keys_while_showing(&self) -> bool {
        true
    }

    fn on_countdown_tick(&mut self, remaining: u32, settings: &ChallengeSettings) -> TickEffect {
        let secs = settings.seconds_per_level;
        if secs == 0 || remaining == 0 || (remaining - 1) % secs != 0 {
            return TickEffect::None;
        }
        if self.current + 1 < self.items.len() {
            self.current += 1;
        }
        self.blanked = true;
        TickEffect::Blink
    }

    fn end_blink(&mut self) {
        self.blanked = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::test_support::rng;

    fn setup(level: u32, secs: u32) -> (TimedNumbersGenerator, ChallengeSettings) {
        let mut s = ChallengeSettings::defaults_for(ChallengeKind::TimedNumbers);
        s.level = level;
        s.seconds_per_level = secs;
        s.primes_are_red = false;
        let mut g = TimedNumbersGenerator::default();
        g.new_challenge(&mut s, &mut rng(5), true).unwrap();
        (g, s)
    }

    #[test]
    fn shows_one_item_at_a_time() {
        let (g, s) = setup(3, 2);
        let shown = g.format_challenge_for_display(&s, true).to_plain();
        assert_eq!(shown, g.items()[0]);
        let answer = g.format_answer_for_display(&s).unwrap().to_plain();
        assert_eq!(answer, g.items().join(" "));
    }

    #[test]
    fn advances_every_seconds_per_level() {
        let (mut g, s) = setup(3, 2);
        // Countdown of 6 fires ticks with remaining 6..=1; item k shows from second 2k.
        let mut shown = Vec::new();
        for remaining in (1..=6).rev() {
            let effect = g.on_countdown_tick(remaining, &s);
            if effect == TickEffect::Blink {
                assert!(g.format_challenge_for_display(&s, true).is_empty());
                g.end_blink();
            }
            shown.push(g.current_item());
        }
        assert_eq!(shown, vec![0, 1, 1, 2, 2, 2]);
    }

    #[test]
    fn never_advances_past_last_item() {
        let (mut g, s) = setup(1, 1);
        for remaining in (1..=5).rev() {
            g.on_countdown_tick(remaining, &s);
        }
        assert_eq!(g.current_item(), 0);
    }

    #[test]
    fn repeat_rewinds_to_first_item() {
        let (mut g, mut s) = setup(3, 1);
        let items = g.items().to_vec();
        g.on_countdown_tick(3, &s);
        g.on_countdown_tick(2, &s);
        assert!(g.current_item() > 0);
        g.new_challenge(&mut s, &mut rng(99), false).unwrap();
        assert_eq!(g.items(), items.as_slice());
        assert_eq!(g.current_item(), 0);
        assert!(!g.is_blanked());
    }
}
