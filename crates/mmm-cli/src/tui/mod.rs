//! Interactive terminal front-end.

mod app;
mod events;
mod help;
mod ui;

pub use app::App;

use std::io::{self, Stdout};
use std::time::Instant;

use anyhow::Result;
use crossterm::event::{Event, EventStream};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;

/// Run the UI until the user quits, restoring the terminal afterwards.
pub async fn run(mut app: App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!(target: "mmm::cli", "session ended");
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
) -> Result<()> {
    let mut stream = EventStream::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::draw(frame, app))?;

        let deadline = app.next_deadline();
        tokio::select! {
            event = stream.next() => match event {
                Some(Ok(Event::Key(key))) => app.handle_key(key, Instant::now())?,
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            _ = events::sleep_until(deadline) => app.on_timer(Instant::now())?,
        }
    }
    Ok(())
}
