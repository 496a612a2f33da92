//! Application layer for Parley
//!
//! Pure state machines and a generic runtime for the chat session controller.
//! Nothing in this crate touches a terminal or a network: the render surface
//! and the messaging transport are reached through the [`Driver`] and
//! [`MessagingBackend`] traits, so the same dispatch loop runs in the
//! terminal client and in deterministic tests.
//!
//! # Components
//!
//! - [`App`]: UI state machine (tabs, list selection, input, transcript)
//! - [`MessageStore`]: per-peer pending/history buffers and the merge rule
//! - [`ContactDirectory`]: immutable peer snapshot with the nickname index
//! - [`MessageReceiver`]: background task turning inbound messages into lines
//! - [`Runtime`]: dispatch loop wiring App, Driver, Backend and Receiver

#![forbid(unsafe_code)]

mod action;
mod app;
mod backend;
mod directory;
mod driver;
mod error;
mod event;
mod geometry;
mod input;
mod message;
mod panel;
mod peer;
mod receiver;
mod runtime;
mod store;

pub use action::AppAction;
pub use app::{App, ChatPeer, ChatPeerRow, TranscriptView, UNREAD_MARKER};
pub use backend::{BackendChannels, MessagingBackend};
pub use directory::ContactDirectory;
pub use driver::Driver;
pub use error::{LookupError, RuntimeError, TransportError};
pub use event::{AppEvent, SendOutcome};
pub use geometry::{Area, PanelGeometry};
pub use input::{Command, KEY_HELP, KeyInput};
pub use message::{
    InboundMessage, LocalId, OutboundMessage, ReceivedLine, SELF_DISPLAY_NAME, SendResponse,
    format_line,
};
pub use panel::{ListPanel, Tab};
pub use peer::{
    ContactList, DISPLAY_NAME_LIMIT, GROUP_MARKER, Peer, PeerId, PeerKind, truncate_display_name,
};
pub use receiver::{MessageReceiver, ReceiverHandle};
pub use runtime::{Runtime, RuntimeConfig};
pub use store::{ChatSession, MessageStore};
