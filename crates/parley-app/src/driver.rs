//! Driver trait for abstracting the render surface.
//!
//! The [`Driver`] trait decouples the application runtime from a specific
//! terminal library. Each frontend implements the trait to provide input
//! events and drawing, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::future::Future;

use crate::{App, AppEvent};

/// Abstracts the render surface for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same orchestration code runs in the terminal and in simulation.
///
/// # Implementations
///
/// - **TUI**: crossterm event stream and a ratatui terminal
/// - **Simulation**: injected events and an in-memory frame log
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Wait for the next input event (keyboard or resize).
    ///
    /// Returns `Ok(None)` when the input stream has ended.
    fn next_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Draw every panel.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Draw the transcript panel only.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render_transcript(&mut self, app: &App) -> Result<(), Self::Error> {
        self.render(app)
    }

    /// Clear the surface before the next full redraw.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be cleared.
    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Surface dimensions (columns, rows).
    fn size(&self) -> (u16, u16);

    /// Release the surface and restore the terminal.
    fn stop(&mut self);
}
