use rand::RngCore;
use tracing::debug;

use super::{draw_number, highlight_tokens, masked_tokens, ChallengeGenerator};
use crate::display::StyledText;
use crate::error::ChallengeError;
use crate::model::{ChallengeKind, ChallengeSettings};

/// `level` numbers shown all at once, then masked.
#[derive(Debug, Default)]
pub struct StaticNumbersGenerator {
    items: Vec<String>,
}

impl ChallengeGenerator for StaticNumbersGenerator {
    fn kind(&self) -> ChallengeKind {
        ChallengeKind::StaticNumbers
    }

    fn new_challenge(
        &mut self,
        settings: &mut ChallengeSettings,
        rng: &mut dyn RngCore,
        regenerate: bool,
    ) -> Result<(), ChallengeError> {
        if !regenerate && !self.items.is_empty() {
            return Ok(());
        }
        self.items = (0..settings.level).map(|_| draw_number(settings, rng)).collect();
        debug!(target: "mmm::generator", level = settings.level, items = ?self.items, "static sequence");
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
        if reveal {
            highlight_tokens(&self.items, settings)
        } else {
            masked_tokens(&self.items)
        }
    }

    fn generate_answer(&self) -> Result<String, ChallengeError> {
        Ok(self.items.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::test_support::rng;
    use crate::matcher::{answers_match, MatchMode};

    #[test]
    fn draws_one_number_per_level() {
        let mut s = ChallengeSettings::defaults_for(ChallengeKind::StaticNumbers);
        s.level = 6;
        let mut g = StaticNumbersGenerator::default();
        g.new_challenge(&mut s, &mut rng(1), true).unwrap();
        assert_eq!(g.items().len(), 6);
        assert!(g.items().iter().all(|i| i.parse::<u64>().unwrap() <= 99));
    }

    #[test]
    fn repeat_keeps_items() {
        let mut s = ChallengeSettings::defaults_for(ChallengeKind::StaticNumbers);
        s.level = 5;
        let mut g = StaticNumbersGenerator::default();
        let mut r = rng(2);
        g.new_challenge(&mut s, &mut r, true).unwrap();
        let first = g.items().to_vec();
        g.new_challenge(&mut s, &mut r, false).unwrap();
        assert_eq!(g.items(), first.as_slice());
        g.new_challenge(&mut s, &mut r, false).unwrap();
        assert_eq!(g.items(), first.as_slice());
    }

    #[test]
    fn answer_matches_itself() {
        let mut r = rng(9);
        for level in 1..20 {
            let mut s = ChallengeSettings::defaults_for(ChallengeKind::StaticNumbers);
            s.level = level;
            s.digits_max = 4;
            let mut g = StaticNumbersGenerator::default();
            g.new_challenge(&mut s, &mut r, true).unwrap();
            let answer = g.generate_answer().unwrap();
            assert!(answers_match(MatchMode::Exact, &answer, &answer));
        }
    }

    #[test]
    fn display_masking_does_not_touch_items() {
        let mut s = ChallengeSettings::defaults_for(ChallengeKind::StaticNumbers);
        s.level = 3;
        let mut g = StaticNumbersGenerator::default();
        g.new_challenge(&mut s, &mut rng(4), true).unwrap();
        let items = g.items().to_vec();

        let shown = g.format_challenge_for_display(&s, true).to_plain();
        let hidden = g.format_challenge_for_display(&s, false).to_plain();
        assert_eq!(shown, items.join(" "));
        assert_eq!(hidden.len(), shown.len());
        assert!(hidden.chars().all(|c| c == '-'));
        assert_eq!(g.items(), items.as_slice());
    }
}
