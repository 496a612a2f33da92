//! Per-peer message buffers.
//!
//! Every peer with traffic gets a [`ChatSession`] holding two buffers: lines
//! that arrived but have not been shown (`pending`) and lines already part of
//! the transcript (`history`). Opening a conversation, or receiving a line for
//! the open one, merges pending into history.
//!
//! The store is owned by the dispatch loop. The receiver task never touches
//! it; it posts lines that the loop files here, so a merge can never observe a
//! half-written buffer.

use std::collections::HashMap;

use crate::{ContactDirectory, LookupError, PeerId};

/// Message buffers for one peer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatSession {
    /// Lines already merged into the transcript, in arrival order.
    pub history: Vec<String>,
    /// Lines received but not yet merged, in arrival order.
    pub pending: Vec<String>,
}

/// Pending and history buffers for every peer.
#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    sessions: HashMap<PeerId, ChatSession>,
}

impl MessageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// File an inbound line as pending for `peer`.
    pub fn push_pending(&mut self, peer: &PeerId, line: String) {
        self.session_mut(peer).pending.push(line);
    }

    /// Append a line straight to history (local echo of a sent message).
    pub fn append_history(&mut self, peer: &PeerId, line: String) {
        self.session_mut(peer).history.push(line);
    }

    /// Move every pending line for `peer` to the end of its history.
    ///
    /// Fails if `peer` has no entry in `directory`, independently of any check
    /// the caller made. Merging with nothing pending leaves history unchanged.
    pub fn merge(
        &mut self,
        peer: &PeerId,
        directory: &ContactDirectory,
    ) -> Result<&[String], LookupError> {
        if !directory.contains(peer) {
            return Err(LookupError::UnknownPeer(peer.clone()));
        }

        let session = self.session_mut(peer);
        let pending = std::mem::take(&mut session.pending);
        session.history.extend(pending);
        Ok(&session.history)
    }

    /// Merged lines for `peer`. Empty if the peer has no session.
    pub fn history(&self, peer: &PeerId) -> &[String] {
        self.sessions.get(peer).map_or(&[], |s| s.history.as_slice())
    }

    /// Unmerged lines for `peer`. Empty if the peer has no session.
    pub fn pending(&self, peer: &PeerId) -> &[String] {
        self.sessions.get(peer).map_or(&[], |s| s.pending.as_slice())
    }

    /// Whether `peer` has lines waiting to be merged.
    pub fn has_pending(&self, peer: &PeerId) -> bool {
        self.sessions.get(peer).is_some_and(|s| !s.pending.is_empty())
    }

    /// Session for `peer`, if one was created.
    pub fn session(&self, peer: &PeerId) -> Option<&ChatSession> {
        self.sessions.get(peer)
    }

    /// Number of peers with a session.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session exists yet.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn session_mut(&mut self, peer: &PeerId) -> &mut ChatSession {
        self.sessions.entry(peer.clone()).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ContactList, Peer};

    fn directory() -> ContactDirectory {
        ContactDirectory::build(ContactList::default(), [
            Peer::individual("bob", "Bob"),
            Peer::individual("carol", "Carol"),
        ])
    }

    #[test]
    fn merge_appends_pending_to_history() {
        let bob = PeerId::from("bob");
        let mut store = MessageStore::new();
        store.append_history(&bob, "hi bob".into());
        store.push_pending(&bob, "hello".into());

        let history = store.merge(&bob, &directory()).map(<[String]>::to_vec);

        assert_eq!(history, Ok(vec!["hi bob".to_string(), "hello".to_string()]));
        assert!(store.pending(&bob).is_empty());
    }

    #[test]
    fn merge_is_idempotent() {
        let bob = PeerId::from("bob");
        let mut store = MessageStore::new();
        store.push_pending(&bob, "one".into());
        store.push_pending(&bob, "two".into());

        let dir = directory();
        let first = store.merge(&bob, &dir).map(<[String]>::to_vec);
        let second = store.merge(&bob, &dir).map(<[String]>::to_vec);

        assert_eq!(first, second);
        assert_eq!(store.history(&bob), ["one", "two"]);
    }

    #[test]
    fn merge_rejects_unknown_peer() {
        let stranger = PeerId::from("stranger");
        let mut store = MessageStore::new();
        store.push_pending(&stranger, "psst".into());

        let result = store.merge(&stranger, &directory());

        assert_eq!(result, Err(LookupError::UnknownPeer(stranger.clone())));
        assert_eq!(store.pending(&stranger), ["psst"]);
        assert!(store.history(&stranger).is_empty());
    }

    #[test]
    fn sessions_are_independent() {
        let bob = PeerId::from("bob");
        let carol = PeerId::from("carol");
        let mut store = MessageStore::new();
        store.push_pending(&bob, "for bob".into());
        store.push_pending(&carol, "for carol".into());

        let _ = store.merge(&bob, &directory());

        assert!(!store.has_pending(&bob));
        assert!(store.has_pending(&carol));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn unknown_session_reads_empty() {
        let store = MessageStore::new();
        let nobody = PeerId::from("nobody");

        assert!(store.history(&nobody).is_empty());
        assert!(!store.has_pending(&nobody));
        assert!(store.session(&nobody).is_none());
    }
}
