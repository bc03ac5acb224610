//! Core data model types for memory-master-mind.
//!
//! Challenge kinds, the per-kind settings record persisted in the settings
//! store, application settings, and the stats record emitted on each solve.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ChallengeError;

/// Settings-store key of the application-wide settings record.
pub const APP_ID: &str = "Memory Master Mind";

/// View identifier of the home screen (stored in `AppSettings::last_challenge`).
pub const HOME_ID: &str = "Home";

/// The four kinds of challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChallengeKind {
    #[serde(rename = "Static Number Sequence")]
    StaticNumbers,
    #[serde(rename = "Timed Number Sequence")]
    TimedNumbers,
    #[serde(rename = "Math (Arithmetic)")]
    MathArithmetic,
    #[serde(rename = "Quotes and Verses")]
    Quotes,
}

impl ChallengeKind {
    pub const ALL: [ChallengeKind; 4] = [
        ChallengeKind::StaticNumbers,
        ChallengeKind::TimedNumbers,
        ChallengeKind::MathArithmetic,
        ChallengeKind::Quotes,
    ];

    /// Identifier used as the settings-store key and in stats logs.
    pub fn id(&self) -> &'static str {
        match self {
            ChallengeKind::StaticNumbers => "Static Number Sequence",
            ChallengeKind::TimedNumbers => "Timed Number Sequence",
            ChallengeKind::MathArithmetic => "Math (Arithmetic)",
            ChallengeKind::Quotes => "Quotes and Verses",
        }
    }

    /// Short command-line name.
    pub fn slug(&self) -> &'static str {
        match self {
            ChallengeKind::StaticNumbers => "static",
            ChallengeKind::TimedNumbers => "timed",
            ChallengeKind::MathArithmetic => "math",
            ChallengeKind::Quotes => "quotes",
        }
    }

    /// One-line instruction shown above the answer box.
    pub fn instruction(&self) -> &'static str {
        match self {
            ChallengeKind::StaticNumbers => "Memorize the numbers, then type them.",
            ChallengeKind::TimedNumbers => {
                "The numbers will appear one by one. Memorize, then type them."
            }
            ChallengeKind::MathArithmetic => "Calculate the expression, then type the result.",
            ChallengeKind::Quotes => {
                "Type the hidden words. Caps, punctuation, linebreaks are optional."
            }
        }
    }

    /// Whether answers are judged as free text rather than exact numbers.
    pub fn is_text(&self) -> bool {
        matches!(self, ChallengeKind::Quotes)
    }
}

impl fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ChallengeKind {
    type Err = ChallengeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        ChallengeKind::ALL
            .into_iter()
            .find(|k| k.id().eq_ignore_ascii_case(needle) || k.slug().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ChallengeError::UnknownChallenge(needle.to_string()))
    }
}

/// Phase of the active challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    ShowChallenge,
    StartedAnswer,
    Correct,
    Wrong,
    ShowAnswer,
}

/// How wrong submissions within one attempt chain cost levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyPolicy {
    /// Only the first failure (wrong answer, reveal or abandon) costs a level.
    #[default]
    FirstWrong,
    /// Every wrong submission costs a level.
    EveryWrong,
}

impl FromStr for PenaltyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "first_wrong" | "first" => Ok(PenaltyPolicy::FirstWrong),
            "every_wrong" | "every" => Ok(PenaltyPolicy::EveryWrong),
            other => Err(format!("unknown penalty policy: {other}")),
        }
    }
}

/// Per-kind challenge settings, persisted as a JSON blob keyed by challenge id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeSettings {
    pub digits_min: u32,
    pub digits_max: u32,
    pub ch_per_level: u32,
    /// 0 disables the countdown.
    pub seconds_per_level: u32,
    pub level: u32,
    pub level_max: u32,
    pub zero_padded: bool,
    pub operations: Vec<String>,
    pub negatives: bool,
    pub solve_frac_dec: u32,
    pub words_max: u32,
    pub quotes_path: String,
    pub last_quote_idx: usize,
    pub show_first_letter: bool,
    pub primes_are_red: bool,
}

impl ChallengeSettings {
    /// Default record for a challenge kind.
    pub fn defaults_for(kind: ChallengeKind) -> Self {
        let mut d = Self {
            digits_min: 1,
            digits_max: 2,
            ch_per_level: 2,
            seconds_per_level: 5,
            level: 2,
            level_max: 999,
            zero_padded: false,
            operations: vec!["+".into(), "-".into()],
            negatives: false,
            solve_frac_dec: 1,
            words_max: 999,
            quotes_path: String::new(),
            last_quote_idx: 0,
            show_first_letter: true,
            primes_are_red: true,
        };

        if kind == ChallengeKind::Quotes {
            d.ch_per_level = 1;
            d.level_max = 10;
        }

        d
    }

    /// Countdown length for a challenge started at `level`, if enabled.
    pub fn countdown_secs(&self, level: u32) -> Option<u32> {
        (self.seconds_per_level != 0).then(|| self.seconds_per_level.saturating_mul(level))
    }
}

/// Application-wide settings stored under [`APP_ID`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    pub last_challenge: String,
    pub save_stats: bool,
    pub stats_include_settings: bool,
    pub stats_path: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            last_challenge: HOME_ID.to_string(),
            save_stats: false,
            stats_include_settings: false,
            stats_path: String::new(),
        }
    }
}

/// One solved challenge, appended to the stats log.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsRecord {
    pub timestamp: chrono::NaiveDateTime,
    pub challenge: ChallengeKind,
    pub level: u32,
    pub seconds_elapsed: f64,
    pub first_try: bool,
    pub settings: ChallengeSettings,
}

/// Trial-division primality test used for highlighting.
pub fn is_prime(n: u64) -> bool {
    if n <= 1 {
        return false;
    }
    let mut i = 2u64;
    while i.saturating_mul(i) <= n {
        if n % i == 0 {
            return false;
        }
        i += 1;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_display_and_parse() {
        assert_eq!(ChallengeKind::Quotes.to_string(), "Quotes and Verses");
        assert_eq!(
            "math".parse::<ChallengeKind>().unwrap(),
            ChallengeKind::MathArithmetic
        );
        assert_eq!(
            "Timed Number Sequence".parse::<ChallengeKind>().unwrap(),
            ChallengeKind::TimedNumbers
        );
        assert!("sudoku".parse::<ChallengeKind>().is_err());
    }

    #[test]
    fn quote_defaults_differ() {
        let q = ChallengeSettings::defaults_for(ChallengeKind::Quotes);
        assert_eq!(q.ch_per_level, 1);
        assert_eq!(q.level_max, 10);
        let s = ChallengeSettings::defaults_for(ChallengeKind::StaticNumbers);
        assert_eq!(s.ch_per_level, 2);
        assert_eq!(s.level_max, 999);
    }

    #[test]
    fn countdown_disabled_at_zero() {
        let mut s = ChallengeSettings::defaults_for(ChallengeKind::StaticNumbers);
        assert_eq!(s.countdown_secs(3), Some(15));
        s.seconds_per_level = 0;
        assert_eq!(s.countdown_secs(3), None);
    }

    #[test]
    fn countdown_saturates_instead_of_overflowing() {
        let mut s = ChallengeSettings::defaults_for(ChallengeKind::StaticNumbers);
        s.seconds_per_level = 3_000_000_000;
        assert_eq!(s.countdown_secs(2), Some(u32::MAX));
        assert_eq!(s.countdown_secs(1), Some(3_000_000_000));
    }

    #[test]
    fn primes() {
        let primes: Vec<u64> = (0..20).filter(|n| is_prime(*n)).collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19]);
    }

    #[test]
    fn kind_serializes_as_id() {
        let json = serde_json::to_string(&ChallengeKind::MathArithmetic).unwrap();
        assert_eq!(json, "\"Math (Arithmetic)\"");
    }
}
