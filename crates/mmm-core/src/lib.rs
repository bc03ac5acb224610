//! mmm-core: challenge state machine, generators, and difficulty logic.
//!
//! This crate defines the data model, capability traits, and the pure logic
//! that the memory-master-mind front-ends build on. Time and randomness are
//! always injected so every transition can be driven from tests.

pub mod difficulty;
pub mod display;
pub mod error;
pub mod expr;
pub mod generators;
pub mod matcher;
pub mod model;
pub mod quote_bank;
pub mod session;
pub mod settings;
pub mod timer;
pub mod traits;

pub use error::{ChallengeError, SettingsError};
pub use model::{AppSettings, ChallengeKind, ChallengeSettings, PenaltyPolicy, State};
pub use session::{
    ChallengeSession, Command, InputMode, Navigation, SessionOptions, SessionView, Step,
};
