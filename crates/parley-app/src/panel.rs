//! Tab focus and list selection.
//!
//! The left column shows one of three panels at a time. Each [`ListPanel`]
//! keeps its own selection and scroll offset, so switching tabs and back
//! returns to the same row.

/// The three switchable left-column panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    /// Conversations with recent traffic.
    #[default]
    Chat,
    /// Individual contacts.
    Contacts,
    /// Groups.
    Groups,
}

impl Tab {
    /// Tabs in display order.
    pub const ALL: [Tab; 3] = [Tab::Chat, Tab::Contacts, Tab::Groups];

    /// Position in [`Tab::ALL`].
    pub fn index(self) -> usize {
        match self {
            Tab::Chat => 0,
            Tab::Contacts => 1,
            Tab::Groups => 2,
        }
    }

    /// Next tab to the right, wrapping to the first.
    pub fn next(self) -> Self {
        match self {
            Tab::Chat => Tab::Contacts,
            Tab::Contacts => Tab::Groups,
            Tab::Groups => Tab::Chat,
        }
    }

    /// Next tab to the left, wrapping to the last.
    pub fn previous(self) -> Self {
        match self {
            Tab::Chat => Tab::Groups,
            Tab::Contacts => Tab::Chat,
            Tab::Groups => Tab::Contacts,
        }
    }

    /// Tab bar label.
    pub fn label(self) -> &'static str {
        match self {
            Tab::Chat => "Chats",
            Tab::Contacts => "Contacts",
            Tab::Groups => "Groups",
        }
    }
}

/// Selectable list of titles with a scroll window.
///
/// # Invariants
///
/// - `selected` and `offset` are in `[0, rows.len() - 1]`, or `0` when empty.
/// - `selected` lies inside `[offset, offset + viewport)` whenever the
///   viewport is non-zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPanel {
    rows: Vec<String>,
    selected: usize,
    offset: usize,
    viewport: usize,
}

impl ListPanel {
    /// Create a panel with the given rows, first row selected.
    pub fn new(rows: Vec<String>) -> Self {
        Self { rows, ..Self::default() }
    }

    /// Replace the rows, keeping the selection where it still fits.
    pub fn set_rows(&mut self, rows: Vec<String>) {
        self.rows = rows;
        self.clamp();
    }

    /// Append a row.
    pub fn push(&mut self, row: String) {
        self.rows.push(row);
    }

    /// Number of rows that fit on screen. Zero disables offset tracking.
    pub fn set_viewport(&mut self, rows: usize) {
        self.viewport = rows;
        self.clamp();
    }

    /// Move the selection one row up, stopping at the first row.
    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
        self.clamp();
    }

    /// Move the selection one row down, stopping at the last row.
    pub fn move_down(&mut self) {
        self.selected = self.selected.saturating_add(1);
        self.clamp();
    }

    /// Highlighted title. `None` if the panel is empty.
    pub fn selected_title(&self) -> Option<&str> {
        self.rows.get(self.selected).map(String::as_str)
    }

    /// All rows.
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Selected row index.
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// First visible row index.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Rows that fit on screen.
    pub fn viewport(&self) -> usize {
        self.viewport
    }

    fn clamp(&mut self) {
        let last = self.rows.len().saturating_sub(1);
        self.selected = self.selected.min(last);

        if self.viewport > 0 {
            if self.selected < self.offset {
                self.offset = self.selected;
            } else if self.selected >= self.offset + self.viewport {
                self.offset = self.selected + 1 - self.viewport;
            }
        }
        self.offset = self.offset.min(last);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(rows: &[&str]) -> ListPanel {
        ListPanel::new(rows.iter().map(ToString::to_string).collect())
    }

    #[test]
    fn tabs_wrap_right() {
        assert_eq!(Tab::Contacts.next(), Tab::Groups);
        assert_eq!(Tab::Groups.next(), Tab::Chat);
    }

    #[test]
    fn tabs_wrap_left() {
        assert_eq!(Tab::Chat.previous(), Tab::Groups);
        assert_eq!(Tab::Groups.previous(), Tab::Contacts);
    }

    #[test]
    fn tab_index_matches_order() {
        for (i, tab) in Tab::ALL.iter().enumerate() {
            assert_eq!(tab.index(), i);
        }
    }

    #[test]
    fn selection_clamped_at_both_ends() {
        let mut p = panel(&["a", "b"]);

        p.move_up();
        assert_eq!(p.selected(), 0);

        p.move_down();
        p.move_down();
        p.move_down();
        assert_eq!(p.selected(), 1);
        assert_eq!(p.selected_title(), Some("b"));
    }

    #[test]
    fn empty_panel_stays_at_zero() {
        let mut p = ListPanel::default();
        p.move_down();
        p.move_up();

        assert_eq!(p.selected(), 0);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.selected_title(), None);
    }

    #[test]
    fn offset_follows_selection() {
        let mut p = panel(&["a", "b", "c", "d", "e"]);
        p.set_viewport(2);

        p.move_down();
        assert_eq!(p.offset(), 0);
        p.move_down();
        assert_eq!(p.offset(), 1);
        p.move_down();
        p.move_down();
        assert_eq!((p.selected(), p.offset()), (4, 3));

        p.move_up();
        p.move_up();
        p.move_up();
        assert_eq!((p.selected(), p.offset()), (1, 1));
    }

    #[test]
    fn shrinking_rows_reclamps_selection() {
        let mut p = panel(&["a", "b", "c"]);
        p.move_down();
        p.move_down();

        p.set_rows(vec!["x".into()]);

        assert_eq!(p.selected(), 0);
        assert_eq!(p.selected_title(), Some("x"));
    }
}
