//! Input box
//!
//! Displays the input buffer with cursor.

use parley_app::App;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Wrap},
};

const PROMPT: &str = "> ";
const PROMPT_WIDTH: u16 = 3; // border + "> "
const INPUT_LINE_OFFSET_Y: u16 = 1; // inside top border
const RIGHT_PADDING: u16 = 1; // inside right border

/// Render the input box.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let title = if app.in_flight().is_some() { " Sending... " } else { " Message " };
    let block = Block::default().borders(Borders::ALL).title(title);

    let paragraph = Paragraph::new(format!("{PROMPT}{}", app.input()))
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: false })
        .block(block);

    frame.render_widget(paragraph, area);

    let typed = u16::try_from(app.input().chars().count()).unwrap_or(u16::MAX);
    let available_width = area.width.saturating_sub(PROMPT_WIDTH + RIGHT_PADDING);
    let cursor_offset = typed.min(available_width);

    let cursor_x = area.x.saturating_add(PROMPT_WIDTH).saturating_add(cursor_offset);
    let cursor_y = area.y.saturating_add(INPUT_LINE_OFFSET_Y);
    let max_x = area.x.saturating_add(area.width).saturating_sub(RIGHT_PADDING);

    frame.set_cursor_position((cursor_x.min(max_x), cursor_y));
}
