//! Runtime: terminal lifecycle and the blocking event loop of the form view.
//!
//! The loop renders the view, blocks on `crossterm::event::read()` and hands
//! key presses to [`FormView::handle_key`] until the view reports
//! [`Outcome::Exit`]. Monitor calls are synchronous, so there's nothing to
//! poll in between.

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::Backend, prelude::CrosstermBackend};
use tracing::{debug, info};

use crate::ui::components::form_view::{FormView, Outcome};
use crate::ui::theme::{self, Theme};

/// Run `view` in the alternate screen until it asks to exit.
pub fn run_form(view: &mut FormView) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let theme = theme::load();
    view.open();
    info!("form view started");

    let result = event_loop(&mut terminal, view, theme.as_ref());
    cleanup_terminal(&mut terminal)?;
    result
}

/// Render/read loop over any backend.
pub fn event_loop<B: Backend>(terminal: &mut Terminal<B>, view: &mut FormView, theme: &dyn Theme) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|frame| view.render(frame, frame.area(), theme))?;
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if view.handle_key(key) == Outcome::Exit {
                    return Ok(());
                }
            }
            Event::Resize(width, height) => debug!(width, height, "terminal resized"),
            _ => {}
        }
    }
}

/// Enable raw mode and enter the alternate screen.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal settings and leave the alternate screen.
fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}
