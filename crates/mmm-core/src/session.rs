//! Challenge state machine.
//!
//! A [`ChallengeSession`] owns one challenge view: the generator, the runtime
//! state, the countdown and the typed answer. Every transition returns a
//! [`SessionView`] snapshot for the front-end to render. Time is passed in by
//! the caller so tests can drive the countdown deterministically.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::difficulty::{clamp_level, LevelEvent, LevelProgress};
use crate::display::StyledText;
use crate::generators::{generator_for, ChallengeGenerator, TickEffect};
use crate::matcher::{answers_match, MatchMode};
use crate::model::{ChallengeKind, ChallengeSettings, PenaltyPolicy, State, StatsRecord};
use crate::settings::{
    load_app_settings, load_challenge_settings, save_app_settings, save_challenge_settings,
};
use crate::timer::{Countdown, TimerEvent};
use crate::traits::{SettingsStore, StatsSink};

/// Input delivered to a session, independent of any keyboard framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Confirm,
    Backspace,
    Char(char),
    RequestNew,
    RequestRepeat,
    RevealAnswer,
    NavigateHome,
    NavigateBack,
    OpenPreferences,
    ToggleInputMode,
}

/// Whether letter keys act as menu shortcuts or are typed into the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Menu,
    Text,
}

/// Where the front-end should go after a navigation command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Home,
    Back,
    Preferences,
}

/// Result of handling a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    View(SessionView),
    Navigate(Navigation),
}

/// Tunables that do not live in the per-challenge settings.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub penalty: PenaltyPolicy,
    /// How long a timed item stays blank between items. `None` disables blinking.
    pub blink: Option<Duration>,
    /// Countdown tick period.
    pub tick: Duration,
    /// Quote source used when the quotes challenge has no path of its own.
    pub quotes_path: Option<PathBuf>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            penalty: PenaltyPolicy::default(),
            blink: Some(Duration::from_millis(500)),
            tick: Duration::from_secs(1),
            quotes_path: None,
        }
    }
}

/// Mutable state of the challenge currently on screen.
#[derive(Debug, Clone)]
pub struct RuntimeState {
    pub state: State,
    /// Settings level when the challenge started.
    pub current_level: u32,
    pub attempts_at_level: u32,
    pub first_try: bool,
    /// Whether this attempt chain already cost a level.
    pub penalized: bool,
    pub content_visible: bool,
    pub time_started: Instant,
    pub time_elapsed: Option<Duration>,
}

/// Render snapshot of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub kind: ChallengeKind,
    pub state: State,
    pub display: StyledText,
    pub input: String,
    pub title: String,
    pub level: u32,
    pub attempts_at_level: u32,
    pub ch_per_level: u32,
    pub first_try: bool,
    pub can_reveal: bool,
    pub input_mode: InputMode,
    pub seconds_remaining: Option<u32>,
    pub elapsed: Option<Duration>,
    pub items: Vec<String>,
    pub hidden_positions: Vec<usize>,
}

impl SessionView {
    /// Footer label, e.g. `Level 3 (2/4)`.
    pub fn level_label(&self) -> String {
        if self.ch_per_level > 1 {
            format!(
                "Level {} ({}/{})",
                self.level,
                self.attempts_at_level + 1,
                self.ch_per_level
            )
        } else {
            format!("Level {}", self.level)
        }
    }
}

/// One open challenge view.
pub struct ChallengeSession {
    kind: ChallengeKind,
    generator: Box<dyn ChallengeGenerator>,
    store: Arc<dyn SettingsStore>,
    stats: Option<Arc<dyn StatsSink>>,
    rng: StdRng,
    options: SessionOptions,
    settings: ChallengeSettings,
    runtime: RuntimeState,
    countdown: Countdown,
    input: String,
    input_mode: InputMode,
    closed: bool,
}

impl ChallengeSession {
    /// Open a challenge view and start its first challenge.
    pub fn new(
        kind: ChallengeKind,
        store: Arc<dyn SettingsStore>,
        stats: Option<Arc<dyn StatsSink>>,
        options: SessionOptions,
        now: Instant,
    ) -> anyhow::Result<Self> {
        Self::with_rng(kind, store, stats, options, StdRng::from_entropy(), now)
    }

    /// Like [`ChallengeSession::new`] with an explicit random source.
    pub fn with_rng(
        kind: ChallengeKind,
        store: Arc<dyn SettingsStore>,
        stats: Option<Arc<dyn StatsSink>>,
        options: SessionOptions,
        rng: StdRng,
        now: Instant,
    ) -> anyhow::Result<Self> {
        let settings = load_challenge_settings(store.as_ref(), kind)?;
        let generator = generator_for(kind, &settings, options.quotes_path.clone());

        let mut session = Self {
            kind,
            generator,
            store,
            stats,
            rng,
            countdown: Countdown::new(options.tick),
            options,
            runtime: RuntimeState {
                state: State::ShowChallenge,
                current_level: settings.level,
                attempts_at_level: 0,
                first_try: true,
                penalized: false,
                content_visible: true,
                time_started: now,
                time_elapsed: None,
            },
            settings,
            input: String::new(),
            input_mode: InputMode::Menu,
            closed: false,
        };
        session.start_challenge(true, now)?;

        let mut app = load_app_settings(session.store.as_ref())?;
        if app.last_challenge != kind.id() {
            app.last_challenge = kind.id().to_string();
            save_app_settings(session.store.as_ref(), &app)?;
        }
        Ok(session)
    }

    pub fn kind(&self) -> ChallengeKind {
        self.kind
    }

    pub fn settings(&self) -> &ChallengeSettings {
        &self.settings
    }

    pub fn runtime(&self) -> &RuntimeState {
        &self.runtime
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Apply one command.
    pub fn handle(&mut self, command: Command, now: Instant) -> anyhow::Result<Step> {
        match command {
            Command::NavigateHome => {
                self.close();
                return Ok(Step::Navigate(Navigation::Home));
            }
            Command::NavigateBack => {
                self.close();
                return Ok(Step::Navigate(Navigation::Back));
            }
            Command::OpenPreferences => {
                self.countdown.stop();
                return Ok(Step::Navigate(Navigation::Preferences));
            }
            Command::ToggleInputMode => {
                if self.kind.is_text() {
                    self.input_mode = match self.input_mode {
                        InputMode::Menu => InputMode::Text,
                        InputMode::Text => InputMode::Menu,
                    };
                }
            }
            Command::RequestNew => self.abandon_and_start(true, now)?,
            Command::RequestRepeat => self.abandon_and_start(false, now)?,
            Command::RevealAnswer => {
                if self.can_reveal() {
                    self.countdown.stop();
                    self.generator.end_blink();
                    self.penalize()?;
                    self.runtime.content_visible = true;
                    self.runtime.state = State::ShowAnswer;
                    self.input_mode = InputMode::Menu;
                }
            }
            Command::Confirm | Command::Backspace | Command::Char(_) => self.key(command, now)?,
        }
        Ok(Step::View(self.view()?))
    }

    /// Fire due countdown events. Returns a fresh view when anything changed.
    pub fn on_timer(&mut self, now: Instant) -> anyhow::Result<Option<SessionView>> {
        if self.closed {
            return Ok(None);
        }
        let fired = self.countdown.poll(now);
        if fired.is_empty() {
            return Ok(None);
        }

        for event in fired {
            match event {
                TimerEvent::Tick { remaining } => {
                    if self.generator.on_countdown_tick(remaining, &self.settings)
                        == TickEffect::Blink
                    {
                        match self.options.blink.filter(|d| !d.is_zero()) {
                            Some(length) => self.countdown.schedule_blink(now, length),
                            None => self.generator.end_blink(),
                        }
                    }
                }
                TimerEvent::Expired => {
                    if self.runtime.state == State::ShowChallenge {
                        debug!(target: "mmm::session", "countdown expired");
                        self.begin_answer();
                    }
                }
                TimerEvent::BlinkEnd => self.generator.end_blink(),
            }
        }
        Ok(Some(self.view()?))
    }

    /// When [`ChallengeSession::on_timer`] should be called next.
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.closed {
            None
        } else {
            self.countdown.next_deadline()
        }
    }

    /// Reload settings and external data, then reopen the view.
    pub fn restart(&mut self, now: Instant) -> anyhow::Result<SessionView> {
        self.closed = false;
        self.generator.reload();
        let stored = load_challenge_settings(self.store.as_ref(), self.kind)?;
        self.generator.reopen(&stored);
        self.start_challenge(true, now)?;
        self.view()
    }

    /// Tear the session down. No timer event is delivered afterwards.
    pub fn close(&mut self) {
        self.countdown.stop();
        self.closed = true;
    }

    /// Current render snapshot.
    pub fn view(&self) -> anyhow::Result<SessionView> {
        let display = match self.runtime.state {
            State::Correct | State::ShowAnswer => {
                self.generator.format_answer_for_display(&self.settings)?
            }
            _ => self
                .generator
                .format_challenge_for_display(&self.settings, self.runtime.content_visible),
        };

        let title = match (self.runtime.state, self.runtime.time_elapsed) {
            (State::Correct, Some(elapsed)) => {
                format!("Correct! Solved in {:.1}s", elapsed.as_secs_f64())
            }
            (State::ShowAnswer, _) => "Press any key for a new challenge".to_string(),
            _ => self.kind.instruction().to_string(),
        };

        Ok(SessionView {
            kind: self.kind,
            state: self.runtime.state,
            display,
            input: self.input.clone(),
            title,
            level: self.runtime.current_level,
            attempts_at_level: self.runtime.attempts_at_level,
            ch_per_level: self.settings.ch_per_level,
            first_try: self.runtime.first_try,
            can_reveal: self.can_reveal(),
            input_mode: self.input_mode,
            seconds_remaining: self
                .countdown
                .is_running()
                .then(|| self.countdown.remaining()),
            elapsed: self.runtime.time_elapsed,
            items: self.generator.items().to_vec(),
            hidden_positions: self.generator.hidden_positions().to_vec(),
        })
    }

    fn can_reveal(&self) -> bool {
        matches!(self.runtime.state, State::StartedAnswer | State::Wrong)
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    fn start_challenge(&mut self, regenerate: bool, now: Instant) -> anyhow::Result<()> {
        let stored = load_challenge_settings(self.store.as_ref(), self.kind)?;
        let mut settings = stored.clone();
        settings.level = clamp_level(settings.level, &settings);

        self.countdown.stop();
        self.generator
            .new_challenge(&mut settings, &mut self.rng, regenerate)?;
        if settings != stored {
            save_challenge_settings(self.store.as_ref(), self.kind, &settings)?;
        }
        self.settings = settings;

        self.runtime.current_level = self.settings.level;
        self.runtime.first_try = true;
        self.runtime.penalized = false;
        self.runtime.time_started = now;
        self.runtime.time_elapsed = None;
        self.input.clear();

        if self.generator.has_memorize_phase() {
            self.runtime.state = State::ShowChallenge;
            self.runtime.content_visible = true;
            self.input_mode = InputMode::Menu;
            if let Some(secs) = self.settings.countdown_secs(self.runtime.current_level) {
                self.countdown.start(secs, now);
            }
        } else {
            self.runtime.state = State::StartedAnswer;
            self.runtime.content_visible = false;
            self.input_mode = InputMode::Text;
        }

        debug!(
            target: "mmm::session",
            challenge = %self.kind,
            level = self.runtime.current_level,
            regenerate,
            "new challenge"
        );
        Ok(())
    }

    fn abandon_and_start(&mut self, regenerate: bool, now: Instant) -> anyhow::Result<()> {
        if self.runtime.state == State::StartedAnswer {
            self.penalize()?;
        }
        self.start_challenge(regenerate, now)
    }

    fn begin_answer(&mut self) {
        self.countdown.stop();
        self.generator.end_blink();
        self.runtime.content_visible = false;
        self.runtime.state = State::StartedAnswer;
    }

    fn key(&mut self, command: Command, now: Instant) -> anyhow::Result<()> {
        match self.runtime.state {
            State::ShowAnswer => return self.start_challenge(true, now),
            State::Correct => {
                if command == Command::Confirm {
                    self.start_challenge(true, now)?;
                }
                return Ok(());
            }
            State::ShowChallenge => {
                if self.generator.blocks_keys_while_showing() && self.countdown.is_running() {
                    return Ok(());
                }
                self.begin_answer();
                if command == Command::Confirm {
                    return Ok(());
                }
            }
            State::Wrong => {
                if command != Command::Confirm {
                    self.runtime.state = State::StartedAnswer;
                }
            }
            State::StartedAnswer => {}
        }

        match command {
            Command::Confirm => self.submit(now)?,
            Command::Backspace => {
                self.input.pop();
            }
            Command::Char(c) => {
                if self.accepts(c) {
                    self.input.push(c);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn accepts(&self, c: char) -> bool {
        match self.generator.match_mode() {
            MatchMode::Exact => c.is_ascii_digit() || matches!(c, '.' | '-' | ' '),
            MatchMode::Text => !c.is_control() || c == '\n',
        }
    }

    fn submit(&mut self, now: Instant) -> anyhow::Result<()> {
        let expected = self.generator.format_plain_answer(&self.settings)?;
        if answers_match(self.generator.match_mode(), &self.input, &expected) {
            self.on_correct(now)
        } else {
            self.on_wrong()
        }
    }

    fn on_correct(&mut self, now: Instant) -> anyhow::Result<()> {
        let elapsed = now.saturating_duration_since(self.runtime.time_started);
        let event = if self.runtime.first_try {
            LevelEvent::FirstTryCorrect
        } else {
            LevelEvent::RetryCorrect
        };
        self.apply_level(event)?;

        self.runtime.time_elapsed = Some(elapsed);
        self.runtime.content_visible = true;
        self.runtime.state = State::Correct;
        self.input_mode = InputMode::Menu;

        self.record_stats(elapsed);
        Ok(())
    }

    fn on_wrong(&mut self) -> anyhow::Result<()> {
        self.runtime.state = State::Wrong;
        self.runtime.first_try = false;
        if self.kind.is_text() {
            self.input_mode = InputMode::Text;
        }
        self.penalize()
    }

    /// Charge a level for a failure, honouring the penalty policy.
    fn penalize(&mut self) -> anyhow::Result<()> {
        if self.options.penalty == PenaltyPolicy::FirstWrong && self.runtime.penalized {
            return Ok(());
        }
        self.runtime.penalized = true;
        self.apply_level(LevelEvent::WrongOrRevealed)
    }

    fn apply_level(&mut self, event: LevelEvent) -> anyhow::Result<()> {
        let before = LevelProgress {
            level: self.settings.level,
            attempts_at_level: self.runtime.attempts_at_level,
        };
        let after = before.apply(event, &self.settings);
        if after.level != before.level {
            info!(
                target: "mmm::session",
                challenge = %self.kind,
                from = before.level,
                to = after.level,
                "level changed"
            );
        }
        self.runtime.attempts_at_level = after.attempts_at_level;
        self.settings.level = after.level;
        save_challenge_settings(self.store.as_ref(), self.kind, &self.settings)
    }

    fn record_stats(&self, elapsed: Duration) {
        let Some(sink) = &self.stats else {
            return;
        };
        let record = StatsRecord {
            timestamp: chrono::Local::now().naive_local(),
            challenge: self.kind,
            level: self.runtime.current_level,
            seconds_elapsed: elapsed.as_secs_f64(),
            first_try: self.runtime.first_try,
            settings: self.settings.clone(),
        };
        if let Err(e) = sink.record(&record) {
            warn!(target: "mmm::session", error = %e, "failed to record stats");
        }
    }
}

impl Drop for ChallengeSession {
    fn drop(&mut self) {
        self.close();
    }
}
