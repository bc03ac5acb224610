//! Keyboard mapping and timer waits for the terminal UI.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use mmm_core::{Command, InputMode};

/// What a key press on the challenge screen asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Session(Command),
    Help,
    Quit,
}

/// Whether the key is the universal quit chord.
pub fn is_interrupt(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

/// Map a key on the challenge screen to an action.
///
/// In text mode letters are typed into the answer and Enter inserts a line
/// break; Tab or Esc return to menu mode.
pub fn challenge_action(key: &KeyEvent, mode: InputMode) -> Option<Action> {
    let command = match (mode, key.code) {
        (_, KeyCode::Tab) => Command::ToggleInputMode,
        (_, KeyCode::Backspace) => Command::Backspace,
        (InputMode::Text, KeyCode::Esc) => Command::ToggleInputMode,
        (InputMode::Text, KeyCode::Enter) => Command::Char('\n'),
        (InputMode::Text, KeyCode::Char(c)) => Command::Char(c),
        (InputMode::Menu, KeyCode::Esc) => Command::NavigateBack,
        (InputMode::Menu, KeyCode::Enter) => Command::Confirm,
        (InputMode::Menu, KeyCode::Char(c)) => match c {
            'q' => return Some(Action::Quit),
            '?' => return Some(Action::Help),
            'n' => Command::RequestNew,
            'r' => Command::RequestRepeat,
            's' => Command::RevealAnswer,
            'h' => Command::NavigateHome,
            'p' => Command::OpenPreferences,
            c => Command::Char(c),
        },
        _ => return None,
    };
    Some(Action::Session(command))
}

/// Wait until `deadline`, or forever when there is none.
pub async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
        None => std::future::pending::<()>().await,
    }
}
