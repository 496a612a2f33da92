//! Transcript
//!
//! Displays the open conversation. The highlighted line is the scroll
//! position; ratatui keeps it inside the visible window.

use parley_app::App;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};

/// Render the transcript.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let transcript = app.transcript();

    let title = if app.current_peer().is_some() {
        format!(" {} ", transcript.title())
    } else {
        " No conversation ".to_string()
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    let items: Vec<ListItem> = if app.current_peer().is_none() {
        vec![ListItem::new(Line::from(Span::styled(
            "Select a peer and press F1 to open a conversation",
            Style::default().fg(Color::DarkGray),
        )))]
    } else {
        transcript.lines().iter().map(|line| ListItem::new(line.as_str())).collect()
    };

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));

    let mut state = ListState::default();
    if !transcript.lines().is_empty() {
        state.select(Some(transcript.selected()));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

#[cfg(test)]
mod tests {
    use parley_app::{AppEvent, KeyInput, ReceivedLine};

    use crate::ui::tests::{draw, sample_app};

    #[test]
    fn placeholder_without_conversation() {
        let screen = draw(&sample_app()).join("\n");

        assert!(screen.contains("No conversation"));
        assert!(screen.contains("press F1"));
    }

    #[test]
    fn long_transcript_shows_newest_line() {
        let mut app = sample_app();
        for i in 0..40 {
            let _ = app.handle(AppEvent::LineReceived(ReceivedLine {
                session_key: "@bob".into(),
                line: format!("Bob said: message {i:02}"),
            }));
        }
        let _ = app.handle(AppEvent::Key(KeyInput::F(1)));

        let screen = draw(&app).join("\n");

        assert!(screen.contains(" Bob "));
        assert!(screen.contains("message 39"));
        assert!(!screen.contains("message 00"));
    }
}
