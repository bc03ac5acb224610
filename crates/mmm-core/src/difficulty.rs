//! Difficulty controller.
//!
//! Level progression is a pure function of the previous progress, the outcome
//! of a challenge and the limits in the challenge settings. The session
//! persists the result.

use crate::model::ChallengeSettings;

/// Outcome of a challenge as seen by the difficulty controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelEvent {
    /// Solved without any wrong submission.
    FirstTryCorrect,
    /// Solved after at least one wrong submission.
    RetryCorrect,
    /// Wrong submission, revealed answer, or abandoned challenge.
    WrongOrRevealed,
}

/// Current level and the first-try solves accumulated toward the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelProgress {
    pub level: u32,
    pub attempts_at_level: u32,
}

impl LevelProgress {
    /// Progress starting at `level`, clamped into `[1, level_max]`.
    pub fn new(level: u32, settings: &ChallengeSettings) -> Self {
        Self {
            level: clamp_level(level, settings),
            attempts_at_level: 0,
        }
    }

    /// Apply one outcome.
    pub fn apply(self, event: LevelEvent, settings: &ChallengeSettings) -> Self {
        match event {
            LevelEvent::FirstTryCorrect => {
                let attempts = self.attempts_at_level + 1;
                if attempts >= settings.ch_per_level && self.level < settings.level_max {
                    Self {
                        level: self.level + 1,
                        attempts_at_level: 0,
                    }
                } else {
                    Self {
                        level: self.level,
                        attempts_at_level: attempts,
                    }
                }
            }
            LevelEvent::RetryCorrect => Self {
                level: self.level,
                attempts_at_level: 0,
            },
            LevelEvent::WrongOrRevealed => Self {
                level: self.level.saturating_sub(1).max(1),
                attempts_at_level: 0,
            },
        }
    }
}

/// Clamp a level into `[1, level_max]`.
pub fn clamp_level(level: u32, settings: &ChallengeSettings) -> u32 {
    level.clamp(1, settings.level_max.max(1))
}
