//! Messaging backend abstraction.
//!
//! The [`MessagingBackend`] trait is the session's only view of the chat
//! service. Request/response calls return snapshots; everything asynchronous
//! (inbound messages, send responses, closure) travels over the channels in
//! [`BackendChannels`], which the runtime takes exactly once at startup.

use std::future::Future;

use tokio::sync::{mpsc, oneshot};

use crate::{ContactList, InboundMessage, OutboundMessage, Peer, SendResponse, TransportError};

/// Channel endpoints handed over by a backend.
#[derive(Debug)]
pub struct BackendChannels {
    /// Inbound messages, consumed by the [`crate::MessageReceiver`].
    pub inbound: mpsc::UnboundedReceiver<InboundMessage>,
    /// Outbound messages to submit.
    pub outbound: mpsc::Sender<OutboundMessage>,
    /// Responses to submitted messages, tagged with their `local_id`.
    pub responses: mpsc::Receiver<SendResponse>,
    /// Fires once if the backend terminates on its own.
    pub closed: oneshot::Receiver<TransportError>,
}

/// Chat service the session talks to.
///
/// # Implementations
///
/// - **TUI**: an in-process loopback backend with a fixed roster
/// - **Simulation**: a scripted backend the tests feed directly
pub trait MessagingBackend: Send {
    /// Backend-specific error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Members and groups, fetched once at startup.
    fn contact_list(&mut self) -> impl Future<Output = Result<ContactList, Self::Error>> + Send;

    /// Local account identity.
    fn local_user(&mut self) -> impl Future<Output = Result<Peer, Self::Error>> + Send;

    /// Current chat-peer list, most recent first.
    fn chat_peers(&mut self) -> impl Future<Output = Result<Vec<Peer>, Self::Error>> + Send;

    /// Metadata for every peer the backend knows about.
    fn peer_metadata(&mut self) -> impl Future<Output = Result<Vec<Peer>, Self::Error>> + Send;

    /// Take the channel endpoints. Returns `None` once they have been taken.
    fn take_channels(&mut self) -> Option<BackendChannels>;

    /// Request shutdown. Safe to call more than once.
    fn stop(&mut self);
}
