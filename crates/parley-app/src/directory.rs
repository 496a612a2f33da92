//! Contact directory snapshot.
//!
//! The [`ContactDirectory`] is built once per refresh from backend data and
//! then never mutated. The runtime swaps the whole snapshot behind an
//! [`Arc`](std::sync::Arc) when the periodic refresh fires.
//!
//! # Nickname index
//!
//! List panels show truncated display names, and selecting a row resolves
//! that title back to a [`PeerId`]. The index is keyed by the same truncated
//! form the panels show, so lookups agree with what is on screen. Two names
//! that truncate to the same title collide: the later peer wins.

use std::collections::HashMap;

use crate::{ContactList, LookupError, Peer, PeerId, truncate_display_name};

/// Immutable snapshot of every peer the controller knows about.
#[derive(Debug, Clone, Default)]
pub struct ContactDirectory {
    contacts: ContactList,
    peers: HashMap<PeerId, Peer>,
    nicknames: HashMap<String, PeerId>,
}

impl ContactDirectory {
    /// Build a directory from the contact list and the backend's peer
    /// metadata.
    ///
    /// Metadata is indexed first, then contacts and groups, so entries from
    /// the contact list take precedence on identifier or title collisions.
    pub fn build(contacts: ContactList, metadata: impl IntoIterator<Item = Peer>) -> Self {
        let mut peers = HashMap::new();
        let mut nicknames = HashMap::new();

        let listed = contacts.members.iter().chain(contacts.groups.iter()).cloned();
        for peer in metadata.into_iter().chain(listed) {
            nicknames.insert(truncate_display_name(&peer.display_name), peer.id.clone());
            peers.insert(peer.id.clone(), peer);
        }

        Self { contacts, peers, nicknames }
    }

    /// Contact list this directory was built from.
    pub fn contacts(&self) -> &ContactList {
        &self.contacts
    }

    /// Resolve a list title to a peer identifier.
    pub fn resolve(&self, title: &str) -> Result<&PeerId, LookupError> {
        self.nicknames.get(title).ok_or_else(|| LookupError::UnknownTitle(title.to_string()))
    }

    /// Metadata for a peer identifier.
    pub fn peer(&self, id: &PeerId) -> Option<&Peer> {
        self.peers.get(id)
    }

    /// Whether the identifier has an entry in the directory.
    pub fn contains(&self, id: &PeerId) -> bool {
        self.peers.contains_key(id)
    }

    /// Titles of individual contacts, in backend order.
    pub fn member_titles(&self) -> Vec<String> {
        self.contacts.members.iter().map(Peer::title).collect()
    }

    /// Titles of groups, in backend order.
    pub fn group_titles(&self) -> Vec<String> {
        self.contacts.groups.iter().map(Peer::title).collect()
    }

    /// Number of peers with metadata.
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// Whether the directory has no peers.
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DISPLAY_NAME_LIMIT;

    fn contacts() -> ContactList {
        ContactList {
            members: vec![Peer::individual("@alice", "Alice"), Peer::individual("@bob", "Bob")],
            groups: vec![Peer::group("@@team", "Team", 3)],
        }
    }

    #[test]
    fn resolves_titles() {
        let directory = ContactDirectory::build(contacts(), []);

        assert_eq!(directory.resolve("Alice").map(PeerId::as_str), Ok("@alice"));
        assert_eq!(directory.resolve("Team").map(PeerId::as_str), Ok("@@team"));
        assert!(matches!(directory.resolve("Carol"), Err(LookupError::UnknownTitle(_))));
    }

    #[test]
    fn long_names_indexed_by_truncated_title() {
        let long_name: String = "x".repeat(50);
        let metadata = vec![Peer::individual("@long", long_name.clone())];
        let directory = ContactDirectory::build(ContactList::default(), metadata);

        let title = truncate_display_name(&long_name);
        assert_eq!(title.chars().count(), DISPLAY_NAME_LIMIT);
        assert_eq!(directory.resolve(&title).map(PeerId::as_str), Ok("@long"));
        assert!(directory.resolve(&long_name).is_err());
    }

    #[test]
    fn truncation_collision_is_last_write_wins() {
        let prefix = "y".repeat(DISPLAY_NAME_LIMIT);
        let metadata = vec![
            Peer::individual("@first", format!("{prefix}-one")),
            Peer::individual("@second", format!("{prefix}-two")),
        ];
        let directory = ContactDirectory::build(ContactList::default(), metadata);

        assert_eq!(directory.resolve(&prefix).map(PeerId::as_str), Ok("@second"));
        assert_eq!(directory.len(), 2);
    }

    #[test]
    fn titles_follow_backend_order() {
        let directory = ContactDirectory::build(contacts(), []);

        assert_eq!(directory.member_titles(), vec!["Alice", "Bob"]);
        assert_eq!(directory.group_titles(), vec!["Team"]);
    }
}
