//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O), taking state and
//! returning widget trees.
//!
//! Panel areas come from the App's [`parley_app::PanelGeometry`], clipped to
//! the frame so a stale size never draws outside the buffer.

mod header;
mod input;
mod peers;
mod transcript;

use parley_app::{App, Area};
use ratatui::{Frame, layout::Rect};

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    let geometry = app.geometry();
    let bounds = frame.area();
    let clip = |area: Area| Rect::new(area.x, area.y, area.width, area.height).intersection(bounds);

    peers::render_tabs(frame, app, clip(geometry.tabs));
    peers::render_list(frame, app, clip(geometry.list));
    header::render(frame, app, clip(geometry.header));
    transcript::render(frame, app, clip(geometry.transcript));
    input::render(frame, app, clip(geometry.input));
}
