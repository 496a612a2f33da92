//! Error types for the session controller.

use thiserror::Error;

use crate::PeerId;

/// A selection or merge targeted a peer the directory does not know.
///
/// Always recovered locally: the controller reports it on the status line and
/// leaves its state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// No nickname index entry for a list title.
    #[error("no contact named \"{0}\"")]
    UnknownTitle(String),

    /// No directory entry for a peer identifier.
    #[error("peer {0} is not in the contact directory")]
    UnknownPeer(PeerId),
}

/// Backend transport failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The backend signalled that it terminated. Fatal to the session.
    #[error("backend closed: {reason}")]
    Closed {
        /// Reason reported by the backend.
        reason: String,
    },

    /// The outbound sink is gone.
    #[error("outbound channel closed")]
    OutboundClosed,
}

/// Runtime errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Render surface failure (terminal I/O, drawing).
    #[error("driver error: {0}")]
    Driver(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// One-shot backend call failed.
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Backend channels were already taken by another runtime.
    #[error("backend channels unavailable")]
    ChannelsUnavailable,
}

impl RuntimeError {
    pub(crate) fn driver(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Driver(Box::new(err))
    }

    pub(crate) fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }
}
