//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard and resize events and ratatui for rendering.
//!
//! ratatui rebuilds the whole frame on each draw and writes only the cells
//! that differ from the previous one, so a transcript-only redraw is a full
//! draw whose output is limited to the transcript panel.

use std::io::{self, Stdout, stdout};

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use parley_app::{App, AppEvent, Driver, KeyInput};
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;

use crate::ui;

/// Size reported when the terminal cannot be queried.
const FALLBACK_SIZE: (u16, u16) = (80, 24);

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Owns raw mode and the alternate screen; both are released on
/// [`Driver::stop`] or drop.
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    active: bool,
}

impl TerminalDriver {
    /// Enter raw mode and the alternate screen.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be switched over.
    pub fn new() -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;
        let event_stream = EventStream::new();

        Ok(Self { terminal, event_stream, active: true })
    }
}

/// Convert a crossterm key event to `KeyInput`.
pub(crate) fn convert_key(event: KeyEvent) -> Option<KeyInput> {
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    match event.code {
        KeyCode::Char(c) if ctrl => Some(KeyInput::Ctrl(c.to_ascii_lowercase())),
        KeyCode::Char(c) => Some(KeyInput::Char(c)),
        KeyCode::F(n) => Some(KeyInput::F(n)),
        KeyCode::Enter => Some(KeyInput::Enter),
        KeyCode::Backspace => Some(KeyInput::Backspace),
        KeyCode::Esc => Some(KeyInput::Esc),
        KeyCode::Left => Some(KeyInput::Left),
        KeyCode::Right => Some(KeyInput::Right),
        KeyCode::Up => Some(KeyInput::Up),
        KeyCode::Down => Some(KeyInput::Down),
        _ => None,
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;

    async fn next_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        loop {
            match self.event_stream.next().await {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    if let Some(key) = convert_key(key) {
                        return Ok(Some(AppEvent::Key(key)));
                    }
                },
                Some(Ok(Event::Resize(cols, rows))) => {
                    return Ok(Some(AppEvent::Resize(cols, rows)));
                },
                Some(Ok(_)) => {},
                Some(Err(e)) => return Err(TerminalError::Io(e)),
                None => return Ok(None),
            }
        }
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.terminal.draw(|frame| ui::render(frame, app))?;
        Ok(())
    }

    fn render_transcript(&mut self, app: &App) -> Result<(), Self::Error> {
        self.render(app)
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.terminal.clear()?;
        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        crossterm::terminal::size().unwrap_or(FALLBACK_SIZE)
    }

    fn stop(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;

        if let Err(e) = disable_raw_mode() {
            tracing::warn!("failed to leave raw mode: {e}");
        }
        if let Err(e) = stdout().execute(LeaveAlternateScreen) {
            tracing::warn!("failed to leave alternate screen: {e}");
        }
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn ctrl_chords_become_ctrl_input() {
        assert_eq!(
            convert_key(key(KeyCode::Char('s'), KeyModifiers::CONTROL)),
            Some(KeyInput::Ctrl('s'))
        );
        assert_eq!(
            convert_key(key(KeyCode::Char('J'), KeyModifiers::CONTROL | KeyModifiers::SHIFT)),
            Some(KeyInput::Ctrl('j'))
        );
    }

    #[test]
    fn shifted_characters_stay_printable() {
        assert_eq!(
            convert_key(key(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            Some(KeyInput::Char('A'))
        );
    }

    #[test]
    fn function_and_navigation_keys() {
        assert_eq!(convert_key(key(KeyCode::F(1), KeyModifiers::NONE)), Some(KeyInput::F(1)));
        assert_eq!(convert_key(key(KeyCode::Left, KeyModifiers::NONE)), Some(KeyInput::Left));
        assert_eq!(convert_key(key(KeyCode::Esc, KeyModifiers::NONE)), Some(KeyInput::Esc));
        assert_eq!(convert_key(key(KeyCode::Tab, KeyModifiers::NONE)), None);
    }
}
