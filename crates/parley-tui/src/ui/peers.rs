//! Tab bar and peer list
//!
//! Displays the three tabs and the active tab's rows. Chat rows with pending
//! lines carry the unread marker.

use parley_app::{App, Tab, UNREAD_MARKER};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Tabs},
};

/// Bordered widgets need a row above and below their content.
const MIN_BORDERED_HEIGHT: u16 = 3;
const HIGHLIGHT_SYMBOL: &str = "> ";

/// Render the tab bar.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles = Tab::ALL.iter().map(|tab| tab.label());
    let mut tabs = Tabs::new(titles)
        .select(app.active_tab().index())
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    if area.height >= MIN_BORDERED_HEIGHT {
        tabs = tabs.block(Block::default().borders(Borders::ALL));
    }

    frame.render_widget(tabs, area);
}

/// Render the active tab's list.
pub fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let tab = app.active_tab();
    let panel = app.panel(tab);

    let items: Vec<ListItem> = app
        .display_rows(tab)
        .into_iter()
        .map(|row| {
            let style = if row.starts_with(UNREAD_MARKER) {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            };
            ListItem::new(row).style(style)
        })
        .collect();

    let block = Block::default().borders(Borders::ALL).title(format!(" {} ", tab.label()));
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol(HIGHLIGHT_SYMBOL);

    let mut state = ListState::default().with_offset(panel.offset());
    if !panel.rows().is_empty() {
        state.select(Some(panel.selected()));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

#[cfg(test)]
mod tests {
    use parley_app::{AppEvent, KeyInput, ReceivedLine};

    use crate::ui::tests::{draw, sample_app};

    /// Rows inside the list border, right-trimmed.
    fn list_rows(screen: &[String], count: usize) -> Vec<String> {
        screen
            .iter()
            .skip(3)
            .take(count)
            .map(|row| row.chars().skip(1).take(28).collect::<String>().trim_end().to_string())
            .collect()
    }

    #[test]
    fn unread_rows_are_marked() {
        let mut app = sample_app();
        let _ = app.handle(AppEvent::LineReceived(ReceivedLine {
            session_key: "@alice".into(),
            line: "Alice said: ping".into(),
        }));

        let screen = draw(&app);

        insta::assert_snapshot!(list_rows(&screen, 2).join("\n"), @r"
> Bob
  *Alice
");
    }

    #[test]
    fn contacts_tab_lists_members() {
        let mut app = sample_app();
        let _ = app.handle(AppEvent::Key(KeyInput::Right));
        let _ = app.handle(AppEvent::Key(KeyInput::Down));

        let screen = draw(&app);

        insta::assert_snapshot!(list_rows(&screen, 2).join("\n"), @r"
  Alice
> Bob
");
    }
}
