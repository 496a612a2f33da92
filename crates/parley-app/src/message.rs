//! Wire-level message types exchanged with the backend.

use std::{
    fmt,
    time::{SystemTime, UNIX_EPOCH},
};

use crate::PeerId;

/// Sender name used for lines the local user wrote.
pub const SELF_DISPLAY_NAME: &str = "me";

/// Message delivered by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Sender identifier. Carries the group marker for group traffic.
    pub from: PeerId,
    /// Destination identifier.
    pub to: PeerId,
    /// Sender nickname. Empty if unknown.
    pub from_display_name: String,
    /// Nickname of the member who spoke in a group. Empty otherwise.
    pub sub_sender_display_name: String,
    /// Rendered message text.
    pub content: String,
    /// Whether the message belongs to a group conversation. A group marker on
    /// `from` counts as group traffic even when this is unset.
    pub is_group: bool,
}

/// Client-side message identifier.
///
/// Derived from the wall clock in whole seconds, so two sends within the same
/// second share an id. Uniqueness is best-effort only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalId(u64);

impl LocalId {
    /// Id for a message sent at `time`.
    pub fn from_time(time: SystemTime) -> Self {
        Self(time.duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs()))
    }

    /// Id for a message sent now.
    pub fn now() -> Self {
        Self::from_time(SystemTime::now())
    }

    /// Raw value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for LocalId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message submitted to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Destination peer.
    pub to: PeerId,
    /// Trimmed text.
    pub content: String,
    /// Correlation id for the response.
    pub local_id: LocalId,
}

/// Backend acknowledgment for one outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendResponse {
    /// Id of the message being acknowledged.
    pub local_id: LocalId,
    /// Whether the backend accepted the message.
    pub success: bool,
}

/// Formatted inbound line, filed under its session key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedLine {
    /// Peer whose conversation the line belongs to.
    pub session_key: PeerId,
    /// Display text.
    pub line: String,
}

impl ReceivedLine {
    /// Classify and format an inbound message.
    ///
    /// Returns `None` for messages without content. Messages the local user
    /// sent from another device are filed under their destination and
    /// attributed to [`SELF_DISPLAY_NAME`].
    pub fn from_inbound(message: &InboundMessage, local_user: &PeerId) -> Option<Self> {
        if message.content.is_empty() {
            return None;
        }

        let (session_key, sender) = if &message.from == local_user {
            (message.to.clone(), SELF_DISPLAY_NAME)
        } else {
            (message.from.clone(), message.from_display_name.as_str())
        };

        let group = message.is_group || message.from.is_group();
        let speaker = if group && !message.sub_sender_display_name.is_empty() {
            message.sub_sender_display_name.as_str()
        } else {
            sender
        };

        Some(Self { session_key, line: format_line(speaker, &message.content) })
    }
}

/// Render a transcript line: `"<sender> said: <content>"`, or the bare
/// content when the sender name is empty.
pub fn format_line(sender: &str, content: &str) -> String {
    if sender.is_empty() { content.to_string() } else { format!("{sender} said: {content}") }
}
