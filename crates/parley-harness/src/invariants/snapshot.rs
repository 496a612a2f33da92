//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture the observable state of the system at a point in time.
//! Invariants operate on snapshots rather than live state to ensure
//! consistent, atomic checks.

use std::collections::HashMap;

use parley_app::{App, ListPanel, PeerId, Tab};

/// Snapshot of the entire system state.
///
/// Contains observable state from one or more sessions for invariant checking.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    /// Per-session state snapshots.
    pub sessions: Vec<SessionSnapshot>,
}

impl SystemSnapshot {
    /// Create an empty snapshot (no sessions).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a snapshot with a single session.
    pub fn single(session: SessionSnapshot) -> Self {
        Self { sessions: vec![session] }
    }

    /// Snapshot a single App.
    pub fn from_app(app: &App) -> Self {
        Self::single(SessionSnapshot::from_app(app))
    }

    /// Add a session snapshot.
    pub fn add_session(&mut self, session: SessionSnapshot) {
        self.sessions.push(session);
    }
}

/// Snapshot of one session controller.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    /// Session identifier, for reports.
    pub id: u64,
    /// Chat-peer list in display order.
    pub chat_peers: Vec<PeerId>,
    /// Titles of the chat-peer list, same order as `chat_peers`.
    pub chat_titles: Vec<String>,
    /// Open conversation.
    pub current_peer: Option<PeerId>,
    /// Every list panel, keyed by tab.
    pub panels: HashMap<Tab, PanelSnapshot>,
    /// Transcript line count and selected line.
    pub transcript: (usize, usize),
}

impl SessionSnapshot {
    /// Create an empty session snapshot.
    pub fn new(id: u64) -> Self {
        Self { id, ..Default::default() }
    }

    /// Capture the observable state of `app`.
    pub fn from_app(app: &App) -> Self {
        let panels = Tab::ALL.into_iter().map(|tab| (tab, PanelSnapshot::from(app.panel(tab))));

        Self {
            id: 0,
            chat_peers: app.chat_peers().iter().map(|chat| chat.peer.clone()).collect(),
            chat_titles: app.chat_peers().iter().map(|chat| chat.title.clone()).collect(),
            current_peer: app.current_peer().cloned(),
            panels: panels.collect(),
            transcript: (app.transcript().lines().len(), app.transcript().selected()),
        }
    }

    /// Set the current peer.
    #[must_use]
    pub fn with_current_peer(mut self, peer: Option<PeerId>) -> Self {
        self.current_peer = peer;
        self
    }

    /// Add a chat peer with its title.
    #[must_use]
    pub fn with_chat_peer(mut self, peer: impl Into<PeerId>, title: impl Into<String>) -> Self {
        self.chat_peers.push(peer.into());
        self.chat_titles.push(title.into());
        self
    }

    /// Set the snapshot of one panel.
    #[must_use]
    pub fn with_panel(mut self, tab: Tab, panel: PanelSnapshot) -> Self {
        self.panels.insert(tab, panel);
        self
    }
}

/// Snapshot of a list panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelSnapshot {
    /// Row titles.
    pub rows: Vec<String>,
    /// Selected row index.
    pub selected: usize,
    /// First visible row index.
    pub offset: usize,
    /// Visible row count.
    pub viewport: usize,
}

impl From<&ListPanel> for PanelSnapshot {
    fn from(panel: &ListPanel) -> Self {
        Self {
            rows: panel.rows().to_vec(),
            selected: panel.selected(),
            offset: panel.offset(),
            viewport: panel.viewport(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot() {
        let snapshot = SystemSnapshot::empty();
        assert!(snapshot.sessions.is_empty());
    }

    #[test]
    fn session_snapshot_builder() {
        let panel = PanelSnapshot { rows: vec!["Bob".into()], ..Default::default() };
        let session = SessionSnapshot::new(7)
            .with_chat_peer("@bob", "Bob")
            .with_current_peer(Some("@bob".into()))
            .with_panel(Tab::Chat, panel);

        assert_eq!(session.id, 7);
        assert_eq!(session.chat_peers, [PeerId::from("@bob")]);
        assert_eq!(session.chat_titles, ["Bob"]);
        assert_eq!(session.panels[&Tab::Chat].rows, ["Bob"]);
    }

    #[test]
    fn fresh_app_has_three_empty_panels() {
        let session = SessionSnapshot::from_app(&App::new());

        assert_eq!(session.panels.len(), 3);
        assert!(session.panels.values().all(|panel| panel.rows.is_empty()));
        assert!(session.current_peer.is_none());
    }
}
