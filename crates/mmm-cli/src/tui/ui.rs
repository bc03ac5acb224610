//! Rendering of every screen with ratatui.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

use mmm_core::display::{StyledText, Tone};
use mmm_core::{ChallengeKind, InputMode, SessionView, State};

use super::app::{App, Screen, HOME_ENTRIES, HOME_HELP_ENTRY};
use super::help::help_text;

const ACCENT: Color = Color::Cyan;
const MUTED: Color = Color::DarkGray;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(5),    // Body
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    let header = match (app.screen, app.current_kind()) {
        (Screen::Preferences, _) => app
            .prefs
            .as_ref()
            .map(|p| p.title())
            .unwrap_or_default(),
        (Screen::Challenge, Some(kind)) => kind.id().to_string(),
        _ => "Memory Master Mind".to_string(),
    };
    frame.render_widget(
        Paragraph::new(Span::styled(
            header,
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        chunks[0],
    );

    match app.screen {
        Screen::Home => render_home(frame, app, chunks[1]),
        Screen::Challenge => {
            if let Some(view) = &app.view {
                render_challenge(frame, view, chunks[1]);
            }
        }
        Screen::Preferences => render_preferences(frame, app, chunks[1]),
        Screen::Help => render_help(frame, app, chunks[1]),
    }

    render_footer(frame, app, chunks[2]);
}

/// Style of a display span.
pub fn tone_style(tone: Tone) -> Style {
    match tone {
        Tone::Plain => Style::default(),
        Tone::Prime => Style::default().fg(Color::Red),
        Tone::Masked => Style::default().fg(MUTED),
        Tone::Approximate => Style::default().fg(Color::Yellow),
        Tone::Attribution => Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC),
    }
}

/// Split styled text into lines, keeping each span's style.
pub fn styled_lines(text: &StyledText) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();

    for span in text.spans() {
        let style = tone_style(span.tone);
        let mut parts = span.text.split('\n').peekable();
        while let Some(part) = parts.next() {
            if !part.is_empty() {
                current.push(Span::styled(part.to_string(), style));
            }
            if parts.peek().is_some() {
                lines.push(Line::from(std::mem::take(&mut current)));
            }
        }
    }
    lines.push(Line::from(current));
    lines
}

fn bordered(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(MUTED))
        .title(title)
}

fn render_home(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![Line::from(""), Line::from("Choose a challenge:"), Line::from("")];
    for idx in 0..HOME_ENTRIES {
        let label = ChallengeKind::ALL
            .get(idx)
            .map(|k| k.id())
            .unwrap_or(HOME_HELP_ENTRY);
        let line = if idx == app.home_selected {
            Line::from(Span::styled(
                format!("> {label} <"),
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            ))
        } else {
            Line::from(format!("  {label}  "))
        };
        lines.push(line);
    }

    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(bordered("Home")),
        area,
    );
}

fn render_challenge(frame: &mut Frame, view: &SessionView, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Min(3),    // Challenge
            Constraint::Length(5), // Answer
        ])
        .split(area);

    let title_style = match view.state {
        State::Correct => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        State::Wrong => Style::default().fg(Color::Red),
        _ => Style::default(),
    };
    let title = if view.state == State::Wrong {
        "Wrong answer, try again.".to_string()
    } else {
        view.title.clone()
    };
    frame.render_widget(
        Paragraph::new(Span::styled(title, title_style)).alignment(Alignment::Center),
        chunks[0],
    );

    frame.render_widget(
        Paragraph::new(Text::from(styled_lines(&view.display)))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .block(bordered("")),
        chunks[1],
    );

    let answer_title = match view.input_mode {
        InputMode::Text => "Answer (text mode)",
        InputMode::Menu => "Answer",
    };
    let answer: Vec<Line> = view.input.split('\n').map(|l| Line::from(l.to_string())).collect();
    frame.render_widget(
        Paragraph::new(answer)
            .wrap(Wrap { trim: false })
            .block(bordered(answer_title)),
        chunks[2],
    );
}

fn render_preferences(frame: &mut Frame, app: &App, area: Rect) {
    let Some(form) = &app.prefs else {
        return;
    };

    let mut lines = vec![Line::from("")];
    for (idx, (spec, value)) in form.fields.iter().zip(&form.values).enumerate() {
        let selected = idx == form.selected;
        let value_style = if selected {
            Style::default().fg(ACCENT).add_modifier(Modifier::UNDERLINED)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::raw(format!("{:>30} ", spec.label)),
            Span::styled(value.clone(), value_style),
            Span::raw(if selected { "_" } else { "" }),
        ]));
    }
    if let Some(error) = &form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    frame.render_widget(Paragraph::new(lines).block(bordered("Preferences")), area);
}

fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    frame.render_widget(
        Paragraph::new(help_text(app.help_kind()))
            .wrap(Wrap { trim: false })
            .block(bordered("Help")),
        area,
    );
}

fn footer_keys(app: &App) -> String {
    match app.screen {
        Screen::Home => "[Enter] Open  [j/k] Move  [p] Preferences  [?] Help  [q] Quit".to_string(),
        Screen::Preferences => "[Enter] Save  [Esc] Cancel  [Tab] Next field".to_string(),
        Screen::Help => "Press any key to go back".to_string(),
        Screen::Challenge => {
            let Some(view) = &app.view else {
                return String::new();
            };
            if view.input_mode == InputMode::Text {
                return "[Tab] Menu mode  [Enter] New line".to_string();
            }
            let mut keys = vec!["[n] New", "[r] Repeat"];
            if view.can_reveal {
                keys.push("[s] Show answer");
            }
            keys.extend(["[p] Preferences", "[h] Home", "[?] Help", "[q] Quit"]);
            if view.kind.is_text() {
                keys.push("[Tab] Text mode");
            }
            keys.join("  ")
        }
    }
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(footer_keys(app), Style::default().fg(MUTED))];

    if let (Screen::Challenge, Some(view)) = (app.screen, &app.view) {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            view.level_label(),
            Style::default().fg(ACCENT),
        ));
        if let Some(secs) = view.seconds_remaining {
            spans.push(Span::raw(format!("  {secs}s")));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
