//! Application input events.
//!
//! This module defines [`AppEvent`], the complete set of inputs that drive
//! the [`crate::App`] state machine.
//!
//! Events originate from three sources:
//! - User interactions (keyboard, resize) from the render surface.
//! - Lines filed by the [`crate::MessageReceiver`].
//! - Backend results the runtime collects (snapshots, send outcomes,
//!   closure).

use std::sync::Arc;

use crate::{ContactDirectory, KeyInput, LocalId, Peer, ReceivedLine};

/// How an outbound send finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Backend acknowledged the message.
    Delivered,
    /// Backend answered with a failure.
    Rejected,
    /// No correlated response within the send timeout.
    TimedOut,
}

/// Events processed by the App state machine.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// Startup data loaded from the backend.
    Loaded {
        /// Local account identity.
        local_user: Peer,
        /// Directory snapshot.
        directory: Arc<ContactDirectory>,
        /// Chat-peer list in backend order.
        chat_peers: Vec<Peer>,
    },

    /// Periodic refresh timer fired.
    RefreshDue,

    /// Refreshed directory and chat-peer snapshot.
    Refreshed {
        /// New directory snapshot, replacing the old one.
        directory: Arc<ContactDirectory>,
        /// Chat-peer list in backend order.
        chat_peers: Vec<Peer>,
    },

    /// Formatted inbound line from the receiver.
    LineReceived(ReceivedLine),

    /// Outbound send finished.
    SendFinished {
        /// Id of the message that was sent.
        local_id: LocalId,
        /// Result of the send.
        outcome: SendOutcome,
    },

    /// Backend terminated unexpectedly.
    BackendClosed {
        /// Reason reported by the backend.
        reason: String,
    },
}
