//! Screen state of the terminal UI.
//!
//! `App` routes key presses to the home menu, the open challenge session, the
//! preferences form or the help page. It never touches the terminal itself,
//! so it can be driven from tests.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use tracing::debug;

use mmm_core::model::{APP_ID, HOME_ID};
use mmm_core::settings::{
    app_fields, challenge_fields, load_app_settings, load_challenge_settings, save_app_settings,
    save_challenge_settings, FieldSpec,
};
use mmm_core::traits::{SettingsStore, StatsSink};
use mmm_core::{
    ChallengeKind, ChallengeSession, Command, InputMode, Navigation, SessionOptions, SessionView,
    Step,
};
use mmm_stats::CsvStatsLog;

use super::events::{challenge_action, is_interrupt, Action};

/// Entries of the home menu after the challenges.
pub const HOME_HELP_ENTRY: &str = "Help";

/// Number of selectable home entries.
pub const HOME_ENTRIES: usize = ChallengeKind::ALL.len() + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Challenge,
    Preferences,
    Help,
}

/// Record edited by the preferences form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefTarget {
    App,
    Challenge(ChallengeKind),
}

impl PrefTarget {
    pub fn id(&self) -> &'static str {
        match self {
            PrefTarget::App => APP_ID,
            PrefTarget::Challenge(kind) => kind.id(),
        }
    }
}

/// Editable copy of a settings record.
#[derive(Debug, Clone)]
pub struct PreferencesForm {
    pub target: PrefTarget,
    pub fields: &'static [FieldSpec],
    pub values: Vec<String>,
    pub selected: usize,
    pub error: Option<String>,
}

impl PreferencesForm {
    fn open(target: PrefTarget, store: &dyn SettingsStore) -> Result<Self> {
        let (fields, values) = match target {
            PrefTarget::App => {
                let app = load_app_settings(store)?;
                let fields = app_fields();
                let values = fields
                    .iter()
                    .map(|f| app.field_value(f.key).unwrap_or_default())
                    .collect();
                (fields, values)
            }
            PrefTarget::Challenge(kind) => {
                let settings = load_challenge_settings(store, kind)?;
                let fields = challenge_fields(kind);
                let values = fields
                    .iter()
                    .map(|f| settings.field_value(f.key).unwrap_or_default())
                    .collect();
                (fields, values)
            }
        };
        Ok(Self {
            target,
            fields,
            values,
            selected: 0,
            error: None,
        })
    }

    pub fn title(&self) -> String {
        format!("Preferences: {}", self.target.id())
    }

    fn select_next(&mut self) {
        self.selected = (self.selected + 1) % self.fields.len().max(1);
    }

    fn select_prev(&mut self) {
        let len = self.fields.len().max(1);
        self.selected = (self.selected + len - 1) % len;
    }

    fn type_char(&mut self, c: char) {
        let Some(spec) = self.fields.get(self.selected) else {
            return;
        };
        if spec.kind.accepts(c) {
            if let Some(value) = self.values.get_mut(self.selected) {
                value.push(c);
            }
        }
    }

    fn backspace(&mut self) {
        if let Some(value) = self.values.get_mut(self.selected) {
            value.pop();
        }
    }

    /// Validate and save. Returns `false` when a value was rejected.
    fn submit(&mut self, store: &dyn SettingsStore) -> Result<bool> {
        let edits: Vec<(&str, &str)> = self
            .fields
            .iter()
            .zip(&self.values)
            .map(|(f, v)| (f.key, v.as_str()))
            .collect();

        let applied = match self.target {
            PrefTarget::App => {
                let mut app = load_app_settings(store)?;
                match app.apply_fields(edits) {
                    Ok(()) => Some(save_app_settings(store, &app)),
                    Err(e) => {
                        self.error = Some(e.to_string());
                        None
                    }
                }
            }
            PrefTarget::Challenge(kind) => {
                let mut settings = load_challenge_settings(store, kind)?;
                match settings.apply_fields(edits) {
                    Ok(()) => Some(save_challenge_settings(store, kind, &settings)),
                    Err(e) => {
                        self.error = Some(e.to_string());
                        None
                    }
                }
            }
        };

        match applied {
            Some(saved) => {
                saved?;
                debug!(target: "mmm::cli", record = self.target.id(), "preferences saved");
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

pub struct App {
    store: Arc<dyn SettingsStore>,
    options: SessionOptions,
    pub screen: Screen,
    /// Screen to return to when help closes.
    help_return: Screen,
    pub home_selected: usize,
    pub session: Option<ChallengeSession>,
    pub view: Option<SessionView>,
    pub prefs: Option<PreferencesForm>,
    pub should_quit: bool,
}

impl App {
    /// Open `kind`, or the view recorded as last used.
    pub fn new(
        store: Arc<dyn SettingsStore>,
        options: SessionOptions,
        kind: Option<ChallengeKind>,
        now: Instant,
    ) -> Result<Self> {
        let mut app = Self {
            store,
            options,
            screen: Screen::Home,
            help_return: Screen::Home,
            home_selected: 0,
            session: None,
            view: None,
            prefs: None,
            should_quit: false,
        };

        let start = match kind {
            Some(kind) => Some(kind),
            None => {
                let last = load_app_settings(app.store.as_ref())?.last_challenge;
                last.parse::<ChallengeKind>().ok()
            }
        };
        if let Some(kind) = start {
            app.open_challenge(kind, now)?;
        }
        Ok(app)
    }

    /// The challenge kind of the open session, if any.
    pub fn current_kind(&self) -> Option<ChallengeKind> {
        self.session.as_ref().map(|s| s.kind())
    }

    pub fn help_kind(&self) -> Option<ChallengeKind> {
        match self.help_return {
            Screen::Challenge => self.current_kind(),
            _ => None,
        }
    }

    /// When the countdown next needs servicing.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.session.as_ref().and_then(|s| s.next_deadline())
    }

    pub fn on_timer(&mut self, now: Instant) -> Result<()> {
        if let Some(session) = self.session.as_mut() {
            if let Some(view) = session.on_timer(now)? {
                self.view = Some(view);
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        if is_interrupt(&key) {
            self.should_quit = true;
            return Ok(());
        }

        match self.screen {
            Screen::Home => self.home_key(key, now),
            Screen::Challenge => self.challenge_key(key, now),
            Screen::Preferences => self.preferences_key(key, now),
            Screen::Help => {
                self.screen = self.help_return;
                Ok(())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Screens
    // -----------------------------------------------------------------------

    fn home_key(&mut self, key: KeyEvent, now: Instant) -> Result<()> {
        match key.code {
            KeyCode::Down | KeyCode::Tab | KeyCode::Char('j') => {
                self.home_selected = (self.home_selected + 1) % HOME_ENTRIES;
            }
            KeyCode::Up | KeyCode::BackTab | KeyCode::Char('k') => {
                self.home_selected = (self.home_selected + HOME_ENTRIES - 1) % HOME_ENTRIES;
            }
            KeyCode::Enter => match ChallengeKind::ALL.get(self.home_selected) {
                Some(kind) => self.open_challenge(*kind, now)?,
                None => self.open_help(),
            },
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                self.home_selected = idx;
                self.open_challenge(ChallengeKind::ALL[idx], now)?;
            }
            KeyCode::Char('p') => self.open_preferences(PrefTarget::App)?,
            KeyCode::Char('?') => self.open_help(),
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
        Ok(())
    }

    fn challenge_key(&mut self, key: KeyEvent, now: Instant) -> Result<()> {
        let mode = self
            .view
            .as_ref()
            .map(|v| v.input_mode)
            .unwrap_or(InputMode::Menu);

        match challenge_action(&key, mode) {
            Some(Action::Session(command)) => self.dispatch(command, now),
            Some(Action::Help) => {
                self.open_help();
                Ok(())
            }
            Some(Action::Quit) => {
                self.should_quit = true;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn preferences_key(&mut self, key: KeyEvent, now: Instant) -> Result<()> {
        let Some(form) = self.prefs.as_mut() else {
            return self.leave_preferences(now);
        };

        match key.code {
            KeyCode::Esc => return self.leave_preferences(now),
            KeyCode::Enter => {
                if form.submit(self.store.as_ref())? {
                    return self.leave_preferences(now);
                }
            }
            KeyCode::Down | KeyCode::Tab => form.select_next(),
            KeyCode::Up | KeyCode::BackTab => form.select_prev(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) => form.type_char(c),
            _ => {}
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    fn dispatch(&mut self, command: Command, now: Instant) -> Result<()> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };

        match session.handle(command, now)? {
            Step::View(view) => self.view = Some(view),
            Step::Navigate(Navigation::Home) => self.go_home()?,
            Step::Navigate(Navigation::Back) => self.view = Some(session.restart(now)?),
            Step::Navigate(Navigation::Preferences) => {
                let kind = session.kind();
                self.open_preferences(PrefTarget::Challenge(kind))?;
            }
        }
        Ok(())
    }

    fn stats_sink(&self) -> Result<Option<Arc<dyn StatsSink>>> {
        let app = load_app_settings(self.store.as_ref())?;
        Ok(CsvStatsLog::from_app_settings(&app).map(|log| Arc::new(log) as Arc<dyn StatsSink>))
    }

    fn open_challenge(&mut self, kind: ChallengeKind, now: Instant) -> Result<()> {
        let stats = self.stats_sink()?;
        let session = ChallengeSession::new(
            kind,
            Arc::clone(&self.store),
            stats,
            self.options.clone(),
            now,
        )?;
        self.view = Some(session.view()?);
        self.session = Some(session);
        self.screen = Screen::Challenge;
        Ok(())
    }

    fn go_home(&mut self) -> Result<()> {
        self.session = None;
        self.view = None;
        self.screen = Screen::Home;

        let mut app = load_app_settings(self.store.as_ref())?;
        if app.last_challenge != HOME_ID {
            app.last_challenge = HOME_ID.to_string();
            save_app_settings(self.store.as_ref(), &app)?;
        }
        Ok(())
    }

    fn open_preferences(&mut self, target: PrefTarget) -> Result<()> {
        self.prefs = Some(PreferencesForm::open(target, self.store.as_ref())?);
        self.screen = Screen::Preferences;
        Ok(())
    }

    /// Close the form and restart the challenge it was opened from.
    fn leave_preferences(&mut self, now: Instant) -> Result<()> {
        self.prefs = None;
        match self.session.as_mut() {
            Some(session) => {
                self.view = Some(session.restart(now)?);
                self.screen = Screen::Challenge;
            }
            None => self.screen = Screen::Home,
        }
        Ok(())
    }

    fn open_help(&mut self) {
        self.help_return = self.screen;
        self.screen = Screen::Help;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use mmm_core::traits::MemoryStore;
    use mmm_core::State;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app(kind: Option<ChallengeKind>) -> (App, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let app = App::new(store.clone(), SessionOptions::default(), kind, Instant::now()).unwrap();
        (app, store)
    }

    #[test]
    fn starts_on_home_by_default() {
        let (app, _) = app(None);
        assert_eq!(app.screen, Screen::Home);
        assert!(app.session.is_none());
    }

    #[test]
    fn resumes_last_challenge() {
        let store = Arc::new(MemoryStore::new());
        let mut settings = load_app_settings(store.as_ref()).unwrap();
        settings.last_challenge = ChallengeKind::MathArithmetic.id().to_string();
        save_app_settings(store.as_ref(), &settings).unwrap();

        let app = App::new(store, SessionOptions::default(), None, Instant::now()).unwrap();
        assert_eq!(app.screen, Screen::Challenge);
        assert_eq!(app.current_kind(), Some(ChallengeKind::MathArithmetic));
    }

    #[test]
    fn home_menu_opens_challenge_and_h_returns() {
        let (mut app, store) = app(None);
        let now = Instant::now();
        app.handle_key(key(KeyCode::Down), now).unwrap();
        app.handle_key(key(KeyCode::Enter), now).unwrap();
        assert_eq!(app.screen, Screen::Challenge);
        assert_eq!(app.current_kind(), Some(ChallengeKind::TimedNumbers));
        assert_eq!(
            load_app_settings(store.as_ref()).unwrap().last_challenge,
            ChallengeKind::TimedNumbers.id()
        );

        app.handle_key(key(KeyCode::Char('h')), now).unwrap();
        assert_eq!(app.screen, Screen::Home);
        assert!(app.session.is_none());
        assert_eq!(
            load_app_settings(store.as_ref()).unwrap().last_challenge,
            HOME_ID
        );
    }

    #[test]
    fn home_selection_wraps() {
        let (mut app, _) = app(None);
        let now = Instant::now();
        app.handle_key(key(KeyCode::Up), now).unwrap();
        assert_eq!(app.home_selected, HOME_ENTRIES - 1);
        app.handle_key(key(KeyCode::Enter), now).unwrap();
        assert_eq!(app.screen, Screen::Help);
        app.handle_key(key(KeyCode::Esc), now).unwrap();
        assert_eq!(app.screen, Screen::Home);
    }

    #[test]
    fn typed_answer_reaches_session() {
        let (mut app, _) = app(Some(ChallengeKind::StaticNumbers));
        let now = Instant::now();
        app.handle_key(key(KeyCode::Enter), now).unwrap();
        assert_eq!(app.view.as_ref().unwrap().state, State::StartedAnswer);
        app.handle_key(key(KeyCode::Char('4')), now).unwrap();
        app.handle_key(key(KeyCode::Char('x')), now).unwrap();
        assert_eq!(app.view.as_ref().unwrap().input, "4");
    }

    #[test]
    fn preferences_reject_invalid_then_save() {
        let (mut app, store) = app(Some(ChallengeKind::StaticNumbers));
        let now = Instant::now();
        app.handle_key(key(KeyCode::Char('p')), now).unwrap();
        assert_eq!(app.screen, Screen::Preferences);
        let form = app.prefs.as_ref().unwrap();
        assert_eq!(form.fields[0].key, "digits_min");
        assert_eq!(form.values[0], "1");

        // digits_min above digits_max is rejected
        app.handle_key(key(KeyCode::Backspace), now).unwrap();
        app.handle_key(key(KeyCode::Char('5')), now).unwrap();
        app.handle_key(key(KeyCode::Enter), now).unwrap();
        assert_eq!(app.screen, Screen::Preferences);
        assert!(app.prefs.as_ref().unwrap().error.is_some());

        app.handle_key(key(KeyCode::Backspace), now).unwrap();
        app.handle_key(key(KeyCode::Char('2')), now).unwrap();
        app.handle_key(key(KeyCode::Enter), now).unwrap();
        assert_eq!(app.screen, Screen::Challenge);
        let saved = load_challenge_settings(store.as_ref(), ChallengeKind::StaticNumbers).unwrap();
        assert_eq!(saved.digits_min, 2);
    }

    #[test]
    fn app_preferences_from_home() {
        let (mut app, store) = app(None);
        let now = Instant::now();
        app.handle_key(key(KeyCode::Char('p')), now).unwrap();
        assert_eq!(app.prefs.as_ref().unwrap().target, PrefTarget::App);
        assert_eq!(app.prefs.as_ref().unwrap().values[0], "False");

        for _ in 0..5 {
            app.handle_key(key(KeyCode::Backspace), now).unwrap();
        }
        for c in "True".chars() {
            app.handle_key(key(KeyCode::Char(c)), now).unwrap();
        }
        app.handle_key(key(KeyCode::Enter), now).unwrap();
        assert_eq!(app.screen, Screen::Home);
        assert!(load_app_settings(store.as_ref()).unwrap().save_stats);
    }

    #[test]
    fn quit_keys() {
        let (mut app, _) = app(Some(ChallengeKind::Quotes));
        let now = Instant::now();
        // quotes start in text mode, so q is typed
        app.handle_key(key(KeyCode::Char('q')), now).unwrap();
        assert!(!app.should_quit);
        app.handle_key(key(KeyCode::Tab), now).unwrap();
        app.handle_key(key(KeyCode::Char('q')), now).unwrap();
        assert!(app.should_quit);
    }
}
