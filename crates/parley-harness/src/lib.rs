//! Deterministic simulation harness for Parley session testing.
//!
//! Scripted implementations of the [`parley_app::Driver`] and
//! [`parley_app::MessagingBackend`] traits, so the production
//! [`parley_app::Runtime`] can be driven end to end under tokio's paused
//! clock.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for the session
//! controller invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod sim_backend;
pub mod sim_driver;

pub use invariants::{
    ChatPanelMirrorsPeers, CurrentPeerListed, Invariant, InvariantRegistry, InvariantResult,
    PanelSnapshot, SelectionInBounds, SessionSnapshot, SystemSnapshot, UniqueChatPeers, Violation,
};
pub use sim_backend::{OUTBOUND_CAPACITY, SimBackend, SimBackendError, SimControl};
pub use sim_driver::{Frame, FrameKind, SimDriver, SimDriverError, SimInput};
