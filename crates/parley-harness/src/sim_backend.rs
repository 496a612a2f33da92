//! Scripted messaging backend implementing the MessagingBackend trait.
//!
//! `SimBackend` serves a fixed roster and hands the runtime ordinary tokio
//! channels. The test side of those channels lives in a [`SimControl`]
//! handle: tests deliver inbound messages, read what the runtime submitted,
//! answer (or withhold) send responses, and fire the closure signal.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use parley_app::{
    BackendChannels, ContactList, InboundMessage, LocalId, MessagingBackend, OutboundMessage,
    Peer, SendResponse, TransportError,
};
use tokio::sync::{mpsc, oneshot};

/// Outbound queue depth.
pub const OUTBOUND_CAPACITY: usize = 16;

/// Error type for the simulated backend.
#[derive(Debug, Clone)]
pub struct SimBackendError(pub String);

impl std::fmt::Display for SimBackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimBackendError: {}", self.0)
    }
}

impl std::error::Error for SimBackendError {}

/// Mutable backend state visible to both sides.
#[derive(Debug, Default)]
struct SharedState {
    chat_peers: Vec<Peer>,
    metadata: Vec<Peer>,
    fail_snapshots: bool,
    snapshot_calls: usize,
    stopped: bool,
    closed: Option<oneshot::Sender<TransportError>>,
}

/// Simulated backend for deterministic testing.
pub struct SimBackend {
    contacts: ContactList,
    local_user: Peer,
    channels: Option<BackendChannels>,
    state: Arc<Mutex<SharedState>>,
}

/// Test-side handle for a [`SimBackend`].
#[derive(Debug)]
pub struct SimControl {
    inbound: mpsc::UnboundedSender<InboundMessage>,
    outbound: mpsc::Receiver<OutboundMessage>,
    responses: mpsc::Sender<SendResponse>,
    local_user: Peer,
    state: Arc<Mutex<SharedState>>,
}

impl SimBackend {
    /// Create a backend serving `contacts` to `local_user`, with `chat_peers`
    /// as the initial chat list.
    pub fn new(
        contacts: ContactList,
        local_user: Peer,
        chat_peers: Vec<Peer>,
    ) -> (Self, SimControl) {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_CAPACITY);
        let (responses_tx, responses_rx) = mpsc::channel(OUTBOUND_CAPACITY);
        let (closed_tx, closed_rx) = oneshot::channel();

        let state = Arc::new(Mutex::new(SharedState {
            chat_peers,
            closed: Some(closed_tx),
            ..SharedState::default()
        }));

        let channels = BackendChannels {
            inbound: inbound_rx,
            outbound: outbound_tx,
            responses: responses_rx,
            closed: closed_rx,
        };
        let backend = Self {
            contacts,
            local_user: local_user.clone(),
            channels: Some(channels),
            state: Arc::clone(&state),
        };
        let control = SimControl {
            inbound: inbound_tx,
            outbound: outbound_rx,
            responses: responses_tx,
            local_user,
            state,
        };
        (backend, control)
    }

    fn snapshot<T>(&self, read: impl FnOnce(&SharedState) -> T) -> Result<T, SimBackendError> {
        let mut state = lock(&self.state);
        if state.fail_snapshots {
            return Err(SimBackendError("snapshot unavailable".into()));
        }
        state.snapshot_calls += 1;
        Ok(read(&state))
    }
}

impl MessagingBackend for SimBackend {
    type Error = SimBackendError;

    async fn contact_list(&mut self) -> Result<ContactList, Self::Error> {
        Ok(self.contacts.clone())
    }

    async fn local_user(&mut self) -> Result<Peer, Self::Error> {
        Ok(self.local_user.clone())
    }

    async fn chat_peers(&mut self) -> Result<Vec<Peer>, Self::Error> {
        self.snapshot(|state| state.chat_peers.clone())
    }

    async fn peer_metadata(&mut self) -> Result<Vec<Peer>, Self::Error> {
        let metadata = lock(&self.state).metadata.clone();
        Ok(metadata)
    }

    fn take_channels(&mut self) -> Option<BackendChannels> {
        self.channels.take()
    }

    fn stop(&mut self) {
        let mut state = lock(&self.state);
        if !state.stopped {
            tracing::debug!("sim backend stopped");
        }
        state.stopped = true;
    }
}

impl SimControl {
    /// Deliver a message from `from` to the local user.
    ///
    /// Returns `false` once the receiver has stopped reading.
    pub fn deliver(&self, from: &Peer, content: &str) -> bool {
        self.deliver_message(InboundMessage {
            from: from.id.clone(),
            to: self.local_user.id.clone(),
            from_display_name: from.display_name.clone(),
            sub_sender_display_name: String::new(),
            content: content.to_string(),
            is_group: false,
        })
    }

    /// Deliver a group message posted by `sub_sender`.
    pub fn deliver_group(&self, group: &Peer, sub_sender: &str, content: &str) -> bool {
        self.deliver_message(InboundMessage {
            from: group.id.clone(),
            to: self.local_user.id.clone(),
            from_display_name: group.display_name.clone(),
            sub_sender_display_name: sub_sender.to_string(),
            content: content.to_string(),
            is_group: true,
        })
    }

    /// Deliver an arbitrary inbound message.
    pub fn deliver_message(&self, message: InboundMessage) -> bool {
        self.inbound.send(message).is_ok()
    }

    /// Wait for the next message the runtime submits.
    ///
    /// Returns `None` once the runtime has dropped its outbound sink.
    pub async fn next_outbound(&mut self) -> Option<OutboundMessage> {
        self.outbound.recv().await
    }

    /// Answer the send identified by `local_id`.
    ///
    /// Returns `false` if the runtime no longer reads responses.
    pub async fn respond(&self, local_id: LocalId, success: bool) -> bool {
        self.responses.send(SendResponse { local_id, success }).await.is_ok()
    }

    /// Fire the closure signal. Only the first call has any effect.
    pub fn close(&self, reason: &str) {
        let closed = lock(&self.state).closed.take();
        if let Some(closed) = closed {
            // The runtime may already have exited.
            let _ = closed.send(TransportError::Closed { reason: reason.to_string() });
        }
    }

    /// Replace the chat list served by later snapshots.
    pub fn set_chat_peers(&self, peers: Vec<Peer>) {
        lock(&self.state).chat_peers = peers;
    }

    /// Replace the peer metadata served by later snapshots.
    pub fn set_metadata(&self, peers: Vec<Peer>) {
        lock(&self.state).metadata = peers;
    }

    /// Make chat-list snapshots fail until reset.
    pub fn fail_snapshots(&self, fail: bool) {
        lock(&self.state).fail_snapshots = fail;
    }

    /// Number of successful chat-list snapshots served.
    pub fn snapshot_calls(&self) -> usize {
        lock(&self.state).snapshot_calls
    }

    /// Whether the runtime stopped the backend.
    pub fn is_stopped(&self) -> bool {
        lock(&self.state).stopped
    }
}

fn lock(state: &Mutex<SharedState>) -> MutexGuard<'_, SharedState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> (SimBackend, SimControl) {
        let contacts =
            ContactList { members: vec![Peer::individual("@bob", "Bob")], groups: vec![] };
        SimBackend::new(contacts, Peer::individual("@me", "Me"), vec![])
    }

    #[test]
    fn channels_taken_once() {
        let (mut backend, _control) = backend();

        assert!(backend.take_channels().is_some());
        assert!(backend.take_channels().is_none());
    }

    #[tokio::test]
    async fn snapshots_follow_control() {
        let (mut backend, control) = backend();
        control.set_chat_peers(vec![Peer::individual("@bob", "Bob")]);

        let peers = backend.chat_peers().await.unwrap();
        assert_eq!(peers.len(), 1);
        assert_eq!(control.snapshot_calls(), 1);

        control.fail_snapshots(true);
        assert!(backend.chat_peers().await.is_err());
        assert_eq!(control.snapshot_calls(), 1);
    }

    #[tokio::test]
    async fn close_fires_once() {
        let (mut backend, control) = backend();
        let channels = backend.take_channels().unwrap();

        control.close("gone");
        control.close("again");

        let reason = channels.closed.await.unwrap();
        assert_eq!(reason, TransportError::Closed { reason: "gone".into() });
    }

    #[tokio::test]
    async fn delivered_messages_reach_inbound() {
        let (mut backend, control) = backend();
        let mut channels = backend.take_channels().unwrap();

        assert!(control.deliver(&Peer::individual("@bob", "Bob"), "hi"));

        let message = channels.inbound.recv().await.unwrap();
        assert_eq!(message.content, "hi");
        assert_eq!(message.to.as_str(), "@me");
    }
}
