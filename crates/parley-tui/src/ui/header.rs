//! Header line
//!
//! Shows the local user with the key help, or the status message when one is
//! set.

use parley_app::{App, KEY_HELP};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

const MIN_BORDERED_HEIGHT: u16 = 3;

/// Render the header.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let user = app.local_user().map_or("connecting", |user| user.display_name.as_str());

    let detail = match app.status_message() {
        Some(status) => Span::styled(status.to_string(), Style::default().fg(Color::Yellow)),
        None => Span::styled(KEY_HELP, Style::default().fg(Color::DarkGray)),
    };

    let name_style = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);
    let line = Line::from(vec![
        Span::styled(user.to_string(), name_style),
        Span::raw(" | "),
        detail,
    ]);

    let mut paragraph = Paragraph::new(line);
    if area.height >= MIN_BORDERED_HEIGHT {
        paragraph = paragraph.block(Block::default().borders(Borders::ALL));
    }

    frame.render_widget(paragraph, area);
}
