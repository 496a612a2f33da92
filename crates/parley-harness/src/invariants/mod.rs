//! Session invariants.
//!
//! An invariant is a property of the controller's observable state that no
//! sequence of keys, inbound lines, refreshes or send outcomes may break.
//! Checks run against a [`SystemSnapshot`] taken from the [`App`], never
//! against live state, so one check sees one consistent moment.
//!
//! The [`crate::SimDriver`] runs the registry on every draw when built with
//! [`crate::SimDriver::with_invariants`]; property tests call
//! [`InvariantRegistry::check_app`] after every generated step.
//!
//! ```ignore
//! let registry = InvariantRegistry::standard();
//! registry.check_app(&app)?;
//! ```

mod checks;
mod snapshot;

use std::fmt;

use parley_app::App;

pub use checks::{ChatPanelMirrorsPeers, CurrentPeerListed, SelectionInBounds, UniqueChatPeers};
pub use snapshot::{PanelSnapshot, SessionSnapshot, SystemSnapshot};

/// Outcome of one invariant check.
pub type InvariantResult = Result<(), Violation>;

/// A broken invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Which invariant failed.
    pub invariant: &'static str,
    /// The offending state.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// A property checked against snapshots.
pub trait Invariant: Send + Sync {
    /// Stable name used in violation reports.
    fn name(&self) -> &'static str;

    /// Inspect `state`, returning the first [`Violation`] found.
    fn check(&self, state: &SystemSnapshot) -> InvariantResult;
}

/// Ordered set of invariants run together.
#[derive(Default)]
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl InvariantRegistry {
    /// Registry with no checks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every session invariant:
    /// [`UniqueChatPeers`], [`CurrentPeerListed`], [`ChatPanelMirrorsPeers`]
    /// and [`SelectionInBounds`].
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(UniqueChatPeers);
        registry.add(CurrentPeerListed);
        registry.add(ChatPanelMirrorsPeers);
        registry.add(SelectionInBounds);
        registry
    }

    /// Register another check.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Run every check, collecting all violations.
    pub fn check_all(&self, state: &SystemSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|invariant| invariant.check(state).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Snapshot `app` and run every check.
    pub fn check_app(&self, app: &App) -> Result<(), Vec<Violation>> {
        self.check_all(&SystemSnapshot::from_app(app))
    }

    /// Run every check and panic listing all violations.
    ///
    /// `context` names the moment of the check in the panic message.
    #[allow(clippy::panic, reason = "test assertion helper")]
    pub fn assert_all(&self, state: &SystemSnapshot, context: &str) {
        if let Err(violations) = self.check_all(state) {
            let report: Vec<_> = violations.iter().map(ToString::to_string).collect();
            panic!("invariants broken {context}:\n  {}", report.join("\n  "));
        }
    }

    /// Number of registered checks.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Whether no checks are registered.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registers_every_check() {
        let registry = InvariantRegistry::standard();
        assert_eq!(registry.len(), 4);
        assert!(InvariantRegistry::new().is_empty());
    }

    #[test]
    fn nothing_to_check_passes() {
        assert!(InvariantRegistry::standard().check_all(&SystemSnapshot::empty()).is_ok());
    }

    #[test]
    fn fresh_app_passes() {
        assert!(InvariantRegistry::standard().check_app(&App::new()).is_ok());
    }

    #[test]
    fn every_violation_is_reported() {
        let session = SessionSnapshot::new(3)
            .with_chat_peer("@bob", "Bob")
            .with_chat_peer("@bob", "Bob")
            .with_current_peer(Some("@carol".into()));

        let violations =
            InvariantRegistry::standard().check_all(&SystemSnapshot::single(session)).unwrap_err();

        let names: Vec<_> = violations.iter().map(|v| v.invariant).collect();
        assert_eq!(names, ["unique_chat_peers", "current_peer_listed"]);
    }

    #[test]
    #[should_panic(expected = "current_peer_listed")]
    fn assert_all_panics_with_names() {
        let session = SessionSnapshot::new(1).with_current_peer(Some("@bob".into()));
        InvariantRegistry::standard().assert_all(&SystemSnapshot::single(session), "in test");
    }
}
