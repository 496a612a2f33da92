//! Peer identities.
//!
//! A peer is anything the controller can open a conversation with: an
//! individual contact or a group. Groups are recognised by the
//! [`GROUP_MARKER`] prefix on their identifier.

use std::{fmt, sync::Arc};

/// Prefix carried by every group identifier.
pub const GROUP_MARKER: &str = "@@";

/// Maximum number of code points of a display name shown in a list.
pub const DISPLAY_NAME_LIMIT: usize = 40;

/// Opaque, unique peer identifier assigned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(Arc<str>);

impl PeerId {
    /// Create an identifier from its backend representation.
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this identifier names a group.
    pub fn is_group(&self) -> bool {
        self.0.starts_with(GROUP_MARKER)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PeerId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// Individual contact or group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerKind {
    /// One-on-one contact.
    Individual,
    /// Group conversation.
    Group {
        /// Number of members in the group.
        member_count: u32,
    },
}

/// A contact or group known to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    /// Unique identifier.
    pub id: PeerId,
    /// Human-readable nickname, untruncated.
    pub display_name: String,
    /// Individual or group.
    pub kind: PeerKind,
}

impl Peer {
    /// Create an individual contact.
    pub fn individual(id: impl Into<PeerId>, display_name: impl Into<String>) -> Self {
        Self { id: id.into(), display_name: display_name.into(), kind: PeerKind::Individual }
    }

    /// Create a group with the given member count.
    pub fn group(
        id: impl Into<PeerId>,
        display_name: impl Into<String>,
        member_count: u32,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            kind: PeerKind::Group { member_count },
        }
    }

    /// Display name as shown in lists and used as the nickname index key.
    pub fn title(&self) -> String {
        truncate_display_name(&self.display_name)
    }

    /// Member count for groups, `None` for individuals.
    pub fn member_count(&self) -> Option<u32> {
        match self.kind {
            PeerKind::Individual => None,
            PeerKind::Group { member_count } => Some(member_count),
        }
    }
}

/// Members and groups as returned by the backend at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactList {
    /// Individual contacts.
    pub members: Vec<Peer>,
    /// Groups the local user belongs to.
    pub groups: Vec<Peer>,
}

/// Truncate a display name to its first [`DISPLAY_NAME_LIMIT`] code points.
///
/// Operates on `char`s so multi-byte names are never split mid-character.
pub fn truncate_display_name(name: &str) -> String {
    match name.char_indices().nth(DISPLAY_NAME_LIMIT) {
        Some((byte_idx, _)) => name[..byte_idx].to_string(),
        None => name.to_string(),
    }
}
