use rand::{Rng, RngCore};
use tracing::debug;

use super::{highlight_tokens, masked_tokens, number_range, ChallengeGenerator};
use crate::display::{StyledText, Tone};
use crate::error::ChallengeError;
use crate::expr::{evaluate, truncate_answer};
use crate::model::{ChallengeKind, ChallengeSettings};

/// An expression of `level` operands to be solved mentally.
#[derive(Debug, Default)]
pub struct ArithmeticGenerator {
    items: Vec<String>,
}

impl ArithmeticGenerator {
    fn draw_operand(settings: &ChallengeSettings, rng: &mut dyn RngCore) -> String {
        let (from, to) = number_range(settings);
        let n = rng.gen_range(from.max(1)..=to.max(1));
        if settings.negatives && rng.gen_bool(0.5) {
            format!("-{n}")
        } else {
            n.to_string()
        }
    }

    /// Answer as displayed, with `~` marking a truncated fraction.
    pub fn approximate_answer(
        &self,
        settings: &ChallengeSettings,
    ) -> Result<(String, bool), ChallengeError> {
        let raw = self.generate_answer()?;
        Ok(truncate_answer(&raw, settings.solve_frac_dec))
    }
}

impl ChallengeGenerator for ArithmeticGenerator {
    fn kind(&self) -> ChallengeKind {
        ChallengeKind::MathArithmetic
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

        let operators: Vec<&str> = if settings.operations.is_empty() {
            vec!["+"]
        } else {
            settings.operations.iter().map(String::as_str).collect()
        };

        let mut items = Vec::with_capacity(2 * settings.level as usize);
        for _ in 0..settings.level.max(1) {
            items.push(Self::draw_operand(settings, rng));
            items.push(operators[rng.gen_range(0..operators.len())].to_string());
        }
        if settings.level <= 1 {
            items.push("1".to_string());
        } else {
            items.pop();
        }

        debug!(target: "mmm::generator", expression = %items.join(" "), "arithmetic");
        self.items = items;
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
        if self.items.is_empty() {
            return Ok(String::new());
        }
        Ok(evaluate(&self.items.join(" "))?.to_string())
    }

    fn format_plain_answer(&self, settings: &ChallengeSettings) -> Result<String, ChallengeError> {
        Ok(self.approximate_answer(settings)?.0)
    }

    fn format_answer_for_display(
        &self,
        settings: &ChallengeSettings,
    ) -> Result<StyledText, ChallengeError> {
        let mut text = self.format_challenge_for_display(settings, true);
        let (answer, truncated) = self.approximate_answer(settings)?;
        text.push("\n= ", Tone::Plain);
        if truncated {
            text.push(format!("~{answer}"), Tone::Approximate);
        } else {
            text.push(answer, Tone::Plain);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::test_support::rng;

    fn settings(level: u32, ops: &[&str]) -> ChallengeSettings {
        let mut s = ChallengeSettings::defaults_for(ChallengeKind::MathArithmetic);
        s.level = level;
        s.digits_min = 1;
        s.digits_max = 1;
        s.operations = ops.iter().map(|o| o.to_string()).collect();
        s
    }

    #[test]
    fn two_single_digit_operands_are_summed() {
        let mut r = rng(11);
        for _ in 0..100 {
            let mut s = settings(2, &["+"]);
            let mut g = ArithmeticGenerator::default();
            g.new_challenge(&mut s, &mut r, true).unwrap();
            let items = g.items();
            assert_eq!(items.len(), 3);
            assert_eq!(items[1], "+");
            let d1: i64 = items[0].parse().unwrap();
            let d2: i64 = items[2].parse().unwrap();
            assert!((1..=9).contains(&d1) && (1..=9).contains(&d2));
            assert_eq!(g.generate_answer().unwrap(), (d1 + d2).to_string());
        }
    }

    #[test]
    fn level_one_appends_literal_one() {
        let mut s = settings(1, &["*"]);
        let mut g = ArithmeticGenerator::default();
        g.new_challenge(&mut s, &mut rng(3), true).unwrap();
        assert_eq!(g.items().len(), 3);
        assert_eq!(g.items()[1], "*");
        assert_eq!(g.items()[2], "1");
    }

    #[test]
    fn expression_alternates_operands_and_operators() {
        let mut s = settings(6, &["+", "-", "*", "/"]);
        s.negatives = true;
        let mut g = ArithmeticGenerator::default();
        g.new_challenge(&mut s, &mut rng(21), true).unwrap();
        assert_eq!(g.items().len(), 11);
        for (idx, item) in g.items().iter().enumerate() {
            if idx % 2 == 0 {
                assert!(item.parse::<i64>().is_ok(), "operand {item}");
            } else {
                assert!(["+", "-", "*", "/"].contains(&item.as_str()));
            }
        }
        assert!(g.generate_answer().is_ok());
    }

    #[test]
    fn negatives_flip_some_operands() {
        let mut s = settings(30, &["+"]);
        s.negatives = true;
        let mut g = ArithmeticGenerator::default();
        g.new_challenge(&mut s, &mut rng(8), true).unwrap();
        let negative = g.items().iter().filter(|i| i.starts_with('-') && i.len() > 1).count();
        assert!(negative > 0 && negative < 30);
    }

    #[test]
    fn truncated_answer_is_marked_approximate() {
        let s = settings(2, &["/"]);
        let g = ArithmeticGenerator {
            items: vec!["1".into(), "/".into(), "3".into()],
        };
        assert_eq!(g.format_plain_answer(&s).unwrap(), "0.3");
        let shown = g.format_answer_for_display(&s).unwrap();
        assert_eq!(shown.to_plain(), "1 / 3\n= ~0.3");
        assert!(shown.spans().iter().any(|sp| sp.tone == Tone::Approximate));
    }

    #[test]
    fn whole_division_drops_trailing_zero() {
        let s = settings(2, &["/"]);
        let g = ArithmeticGenerator {
            items: vec!["8".into(), "/".into(), "4".into()],
        };
        assert_eq!(g.generate_answer().unwrap(), "2.0");
        assert_eq!(g.format_plain_answer(&s).unwrap(), "2");
        assert_eq!(g.format_answer_for_display(&s).unwrap().to_plain(), "8 / 4\n= 2");
    }

    #[test]
    fn repeat_keeps_expression() {
        let mut s = settings(4, &["+", "-"]);
        let mut g = ArithmeticGenerator::default();
        let mut r = rng(12);
        g.new_challenge(&mut s, &mut r, true).unwrap();
        let first = g.items().to_vec();
        g.new_challenge(&mut s, &mut r, false).unwrap();
        assert_eq!(g.items(), first.as_slice());
    }
}
