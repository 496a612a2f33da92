//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

use crate::OutboundMessage;

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Redraw every panel.
    Render,

    /// Redraw the transcript panel only.
    RenderTranscript,

    /// Clear the surface before the next full redraw.
    Clear,

    /// Re-fetch the chat-peer snapshot and directory from the backend.
    Refresh,

    /// Submit a message and wait for its response.
    Send(OutboundMessage),

    /// Stop the backend and leave the dispatch loop.
    Quit,
}
