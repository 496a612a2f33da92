//! Application state machine.
//!
//! This module defines the [`App`] state machine, which owns every piece of
//! session state the controller shows: tab focus, the three list panels, the
//! chat-peer list, the current conversation, the input buffer, and the
//! per-peer [`MessageStore`].
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//! Each user command has a named transition method so behaviour can be tested
//! without a terminal or a backend.
//!
//! # Responsibilities
//!
//! - Resolves list titles through the [`ContactDirectory`] nickname index.
//! - Files inbound lines as pending and merges them for the open conversation.
//! - Builds outbound messages and applies their send outcome.
//! - Tracks terminal geometry so list offsets follow the visible rows.

use std::sync::Arc;

use crate::{
    AppAction, AppEvent, Command, ContactDirectory, KeyInput, LocalId, LookupError, MessageStore,
    OutboundMessage, PanelGeometry, Peer, PeerId, ReceivedLine, SELF_DISPLAY_NAME, SendOutcome,
    format_line,
    panel::{ListPanel, Tab},
};

/// Transcripts longer than this open scrolled to the newest line.
const SCROLL_TO_BOTTOM_THRESHOLD: usize = 10;

/// Prefix marking chat-list rows with unread lines.
pub const UNREAD_MARKER: &str = "*";

/// Entry in the chat-peer list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPeer {
    /// Truncated display title.
    pub title: String,
    /// Peer the entry opens.
    pub peer: PeerId,
}

/// Chat-peer entry with its render-time unread flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatPeerRow<'a> {
    /// Truncated display title.
    pub title: &'a str,
    /// Peer the entry opens.
    pub peer: &'a PeerId,
    /// Whether the peer has pending lines.
    pub unread: bool,
}

/// Lines of the open conversation and the transcript scroll position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptView {
    title: String,
    lines: Vec<String>,
    selected: usize,
}

impl TranscriptView {
    /// Panel title: peer name, with the member count for groups.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Visible lines, oldest first.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Highlighted line. The surface scrolls to keep it visible.
    pub fn selected(&self) -> usize {
        self.selected
    }

    fn reset(&mut self, title: String) {
        self.title = title;
        self.lines.clear();
        self.selected = 0;
    }

    fn show(&mut self, lines: &[String]) {
        self.lines = lines.to_vec();
        if self.lines.len() > SCROLL_TO_BOTTOM_THRESHOLD {
            self.selected = self.lines.len() - 1;
        }
        self.clamp();
    }

    fn scroll_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn scroll_down(&mut self) {
        self.selected = self.selected.saturating_add(1);
        self.clamp();
    }

    fn clamp(&mut self) {
        self.selected = self.selected.min(self.lines.len().saturating_sub(1));
    }
}

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone)]
pub struct App {
    /// Local account. `None` until the backend snapshot is loaded.
    local_user: Option<Peer>,
    /// Current directory snapshot, swapped whole on refresh.
    directory: Arc<ContactDirectory>,
    /// Pending and history buffers per peer.
    store: MessageStore,
    /// Focused left-column tab.
    active_tab: Tab,
    /// Chat, contacts and groups panels, indexed by [`Tab::index`].
    panels: [ListPanel; 3],
    /// Conversations shown on the chat tab, unique by peer.
    chat_peers: Vec<ChatPeer>,
    /// Open conversation. `None` until the user opens one.
    current_peer: Option<PeerId>,
    /// Text typed so far.
    input: String,
    /// Open conversation as displayed.
    transcript: TranscriptView,
    /// Panel areas for the current terminal size.
    geometry: PanelGeometry,
    /// Terminal dimensions (columns, rows).
    terminal_size: (u16, u16),
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
    /// Message awaiting its send outcome.
    in_flight: Option<OutboundMessage>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Create an App with no peers, sized for an 80x24 terminal.
    pub fn new() -> Self {
        let mut app = Self {
            local_user: None,
            directory: Arc::new(ContactDirectory::default()),
            store: MessageStore::new(),
            active_tab: Tab::default(),
            panels: Default::default(),
            chat_peers: Vec::new(),
            current_peer: None,
            input: String::new(),
            transcript: TranscriptView::default(),
            geometry: PanelGeometry::default(),
            terminal_size: (0, 0),
            status_message: None,
            in_flight: None,
        };
        app.resize(80, 24);
        app
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Resize(cols, rows) => {
                self.resize(cols, rows);
                vec![AppAction::Clear, AppAction::Render]
            },
            AppEvent::Loaded { local_user, directory, chat_peers } => {
                tracing::debug!(user = %local_user.id, peers = directory.len(), "session loaded");
                self.local_user = Some(local_user);
                self.panels[Tab::Contacts.index()].set_rows(directory.member_titles());
                self.panels[Tab::Groups.index()].set_rows(directory.group_titles());
                self.directory = directory;
                self.replace_chat_peers(chat_peers);
                vec![AppAction::Render]
            },
            AppEvent::RefreshDue => vec![AppAction::Refresh],
            AppEvent::Refreshed { directory, chat_peers } => {
                self.directory = directory;
                self.replace_chat_peers(chat_peers);
                vec![AppAction::Render]
            },
            AppEvent::LineReceived(line) => self.file_line(line),
            AppEvent::SendFinished { local_id, outcome } => self.finish_send(local_id, outcome),
            AppEvent::BackendClosed { reason } => {
                tracing::warn!(%reason, "backend closed");
                self.status_message = Some(format!("Backend closed: {reason}"));
                vec![AppAction::Render, AppAction::Quit]
            },
        }
    }

    /// Handle keyboard input through the default key bindings.
    fn handle_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        Command::from_key(key).map_or_else(Vec::new, |command| self.handle_command(command))
    }

    /// Apply a user command.
    pub fn handle_command(&mut self, command: Command) -> Vec<AppAction> {
        match command {
            Command::MoveFocusLeft => self.move_focus_left(),
            Command::MoveFocusRight => self.move_focus_right(),
            Command::MoveSelectionUp => self.move_selection_up(),
            Command::MoveSelectionDown => self.move_selection_down(),
            Command::ConfirmSelection => self.confirm_selection(),
            Command::SendInput => self.send_input(),
            Command::ScrollTranscriptUp => self.scroll_transcript_up(),
            Command::ScrollTranscriptDown => self.scroll_transcript_down(),
            Command::DeleteLastCharacter => self.delete_last_character(),
            Command::Quit => self.quit(),
            Command::Insert(c) => self.insert_char(c),
        }
    }

    /// Activate the tab to the left, wrapping around.
    pub fn move_focus_left(&mut self) -> Vec<AppAction> {
        self.active_tab = self.active_tab.previous();
        vec![AppAction::Render]
    }

    /// Activate the tab to the right, wrapping around.
    pub fn move_focus_right(&mut self) -> Vec<AppAction> {
        self.active_tab = self.active_tab.next();
        vec![AppAction::Render]
    }

    /// Move the active panel's selection up.
    pub fn move_selection_up(&mut self) -> Vec<AppAction> {
        self.active_panel_mut().move_up();
        vec![AppAction::Render]
    }

    /// Move the active panel's selection down.
    pub fn move_selection_down(&mut self) -> Vec<AppAction> {
        self.active_panel_mut().move_down();
        vec![AppAction::Render]
    }

    /// Open the conversation for the highlighted row of the active panel.
    ///
    /// Titles the nickname index cannot resolve leave every field except the
    /// status line untouched.
    pub fn confirm_selection(&mut self) -> Vec<AppAction> {
        let Some(title) = self.active_panel().selected_title().map(str::to_string) else {
            return vec![];
        };

        match self.directory.resolve(&title) {
            Ok(peer) => {
                let peer = peer.clone();
                self.open_conversation(peer, title)
            },
            Err(e) => {
                tracing::debug!(%title, "selection not in directory");
                self.status_message = Some(e.to_string());
                vec![AppAction::Render]
            },
        }
    }

    /// Submit the trimmed input to the current peer.
    ///
    /// Whitespace-only input never produces a message. The input is kept until
    /// the send outcome arrives.
    pub fn send_input(&mut self) -> Vec<AppAction> {
        if self.in_flight.is_some() {
            return vec![];
        }

        let content = self.input.trim();
        if content.is_empty() {
            return vec![];
        }

        let Some(to) = self.current_peer.clone() else {
            self.status_message = Some("Open a conversation before sending".into());
            return vec![AppAction::Render];
        };

        let message =
            OutboundMessage { to, content: content.to_string(), local_id: LocalId::now() };
        self.in_flight = Some(message.clone());
        vec![AppAction::Render, AppAction::Send(message)]
    }

    /// Scroll the transcript towards older lines.
    pub fn scroll_transcript_up(&mut self) -> Vec<AppAction> {
        self.transcript.scroll_up();
        vec![AppAction::RenderTranscript]
    }

    /// Scroll the transcript towards newer lines.
    pub fn scroll_transcript_down(&mut self) -> Vec<AppAction> {
        self.transcript.scroll_down();
        vec![AppAction::RenderTranscript]
    }

    /// Remove the last character (code point) of the input.
    pub fn delete_last_character(&mut self) -> Vec<AppAction> {
        if self.input.pop().is_some() { vec![AppAction::Render] } else { vec![] }
    }

    /// Append a character to the input.
    pub fn insert_char(&mut self, c: char) -> Vec<AppAction> {
        self.input.push(c);
        vec![AppAction::Render]
    }

    /// Quit the application.
    pub fn quit(&self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    /// Set a status message to display to the user.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    fn open_conversation(&mut self, peer: PeerId, title: String) -> Vec<AppAction> {
        let heading = match self.directory.peer(&peer).and_then(Peer::member_count) {
            Some(count) => format!("{title}({count})"),
            None => title.clone(),
        };

        if !self.chat_peers.iter().any(|c| c.peer == peer) {
            self.chat_peers.push(ChatPeer { title, peer: peer.clone() });
            self.sync_chat_panel();
        }

        self.current_peer = Some(peer.clone());
        self.status_message = None;
        self.transcript.reset(heading);

        match self.store.merge(&peer, &self.directory) {
            Ok(history) => self.transcript.show(history),
            Err(e) => self.status_message = Some(e.to_string()),
        }

        vec![AppAction::Render]
    }

    fn file_line(&mut self, received: ReceivedLine) -> Vec<AppAction> {
        let ReceivedLine { session_key, line } = received;
        self.store.push_pending(&session_key, line);

        if self.current_peer.as_ref() == Some(&session_key) {
            return match self.store.merge(&session_key, &self.directory) {
                Ok(history) => {
                    self.transcript.show(history);
                    vec![AppAction::RenderTranscript]
                },
                Err(e) => {
                    tracing::warn!(peer = %session_key, "cannot merge inbound line: {e}");
                    self.status_message = Some(e.to_string());
                    vec![AppAction::Render]
                },
            };
        }

        // Unread markers only show while the chat tab is active.
        if self.active_tab == Tab::Chat { vec![AppAction::Render] } else { vec![] }
    }

    fn finish_send(&mut self, local_id: LocalId, outcome: SendOutcome) -> Vec<AppAction> {
        let Some(message) = self.in_flight.take_if(|m| m.local_id == local_id) else {
            tracing::warn!(%local_id, "send outcome for unknown message");
            return vec![];
        };

        // Any response echoes; only a missing one keeps the text for a retry.
        if outcome == SendOutcome::TimedOut {
            self.status_message = Some("Send failed: no response from backend".into());
            return vec![AppAction::Render];
        }

        let echo = format_line(SELF_DISPLAY_NAME, &message.content);
        self.store.append_history(&message.to, echo);
        if self.current_peer.as_ref() == Some(&message.to) {
            self.transcript.show(self.store.history(&message.to));
        }
        self.input.clear();
        self.status_message = match outcome {
            SendOutcome::Rejected => Some("Send failed: message rejected by backend".into()),
            SendOutcome::Delivered | SendOutcome::TimedOut => None,
        };

        vec![AppAction::Render]
    }

    /// Replace the chat-peer list wholesale.
    ///
    /// Conversations opened locally but missing from the snapshot are dropped;
    /// the current peer is kept so it always has an entry.
    fn replace_chat_peers(&mut self, peers: Vec<Peer>) {
        let mut chat_peers: Vec<ChatPeer> = Vec::with_capacity(peers.len());
        for peer in peers {
            if !chat_peers.iter().any(|c| c.peer == peer.id) {
                chat_peers.push(ChatPeer { title: peer.title(), peer: peer.id });
            }
        }

        if let Some(current) = &self.current_peer
            && !chat_peers.iter().any(|c| &c.peer == current)
            && let Some(kept) = self.chat_peers.iter().find(|c| &c.peer == current)
        {
            chat_peers.push(kept.clone());
        }

        self.chat_peers = chat_peers;
        self.sync_chat_panel();
    }

    fn sync_chat_panel(&mut self) {
        let titles = self.chat_peers.iter().map(|c| c.title.clone()).collect();
        self.panels[Tab::Chat.index()].set_rows(titles);
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        self.terminal_size = (cols, rows);
        self.geometry = PanelGeometry::compute(cols, rows);

        let visible = usize::from(self.geometry.list.inner_rows());
        for panel in &mut self.panels {
            panel.set_viewport(visible);
        }
    }

    fn active_panel(&self) -> &ListPanel {
        &self.panels[self.active_tab.index()]
    }

    fn active_panel_mut(&mut self) -> &mut ListPanel {
        &mut self.panels[self.active_tab.index()]
    }

    /// Resolve a title through the current directory.
    pub fn resolve(&self, title: &str) -> Result<&PeerId, LookupError> {
        self.directory.resolve(title)
    }

    /// Rows of `tab` as displayed, with unread markers applied.
    ///
    /// Only the chat panel carries markers, and only while it is active.
    pub fn display_rows(&self, tab: Tab) -> Vec<String> {
        if tab == Tab::Chat && self.active_tab == Tab::Chat {
            return self
                .chat_peer_rows()
                .map(|row| {
                    if row.unread {
                        format!("{UNREAD_MARKER}{}", row.title)
                    } else {
                        row.title.to_string()
                    }
                })
                .collect();
        }
        self.panels[tab.index()].rows().to_vec()
    }

    /// Chat-peer entries with their unread state.
    pub fn chat_peer_rows(&self) -> impl Iterator<Item = ChatPeerRow<'_>> {
        self.chat_peers.iter().map(|c| ChatPeerRow {
            title: &c.title,
            peer: &c.peer,
            unread: self.store.has_pending(&c.peer),
        })
    }

    /// Local account. `None` before the session is loaded.
    pub fn local_user(&self) -> Option<&Peer> {
        self.local_user.as_ref()
    }

    /// Current directory snapshot.
    pub fn directory(&self) -> &Arc<ContactDirectory> {
        &self.directory
    }

    /// Message buffers.
    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    /// Focused tab.
    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    /// Panel state for `tab`.
    pub fn panel(&self, tab: Tab) -> &ListPanel {
        &self.panels[tab.index()]
    }

    /// Conversations on the chat tab.
    pub fn chat_peers(&self) -> &[ChatPeer] {
        &self.chat_peers
    }

    /// Open conversation. `None` if none was opened.
    pub fn current_peer(&self) -> Option<&PeerId> {
        self.current_peer.as_ref()
    }

    /// Input buffer.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Open conversation as displayed.
    pub fn transcript(&self) -> &TranscriptView {
        &self.transcript
    }

    /// Panel areas for the current terminal size.
    pub fn geometry(&self) -> &PanelGeometry {
        &self.geometry
    }

    /// Terminal dimensions (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Message awaiting its send outcome.
    pub fn in_flight(&self) -> Option<&OutboundMessage> {
        self.in_flight.as_ref()
    }
}
