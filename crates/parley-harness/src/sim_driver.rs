//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as `TerminalDriver` but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`parley_app::Runtime`] orchestration code runs in both production and
//! simulation.
//!
//! Input is scripted through a [`SimInput`] handle. Every draw is recorded as
//! a [`Frame`] so tests can assert on what the user would have seen.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use parley_app::{App, AppEvent, Driver, KeyInput, Tab};
use tokio::sync::mpsc;

use crate::invariants::{InvariantRegistry, SystemSnapshot};

/// Error type for simulation driver.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// Which part of the surface a draw covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Every panel.
    Full,
    /// Transcript panel only.
    Transcript,
}

/// Observable App state at one draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Which part of the surface was drawn.
    pub kind: FrameKind,
    /// Chat tab rows including unread markers.
    pub chat_rows: Vec<String>,
    /// Transcript heading.
    pub title: String,
    /// Transcript lines.
    pub transcript: Vec<String>,
    /// Input buffer.
    pub input: String,
    /// Status line.
    pub status: Option<String>,
    /// Whether a send was awaiting its response.
    pub sending: bool,
}

impl Frame {
    fn capture(kind: FrameKind, app: &App) -> Self {
        Self {
            kind,
            chat_rows: app.display_rows(Tab::Chat),
            title: app.transcript().title().to_string(),
            transcript: app.transcript().lines().to_vec(),
            input: app.input().to_string(),
            status: app.status_message().map(str::to_string),
            sending: app.in_flight().is_some(),
        }
    }
}

/// State shared between the driver and its input handles.
#[derive(Debug)]
struct SharedState {
    frames: Vec<Frame>,
    clears: usize,
    size: (u16, u16),
    stopped: bool,
}

/// Simulation driver for deterministic testing.
///
/// Implements [`Driver`] trait so the same [`parley_app::Runtime`]
/// orchestration code runs in both production TUI and simulation tests.
pub struct SimDriver {
    events: mpsc::UnboundedReceiver<AppEvent>,
    state: Arc<Mutex<SharedState>>,
    invariants: Option<InvariantRegistry>,
}

/// Scripting handle for a [`SimDriver`].
///
/// The driver's input stream ends once every clone of the handle is dropped.
#[derive(Debug, Clone)]
pub struct SimInput {
    events: mpsc::UnboundedSender<AppEvent>,
    state: Arc<Mutex<SharedState>>,
}

impl SimDriver {
    /// Create a driver reporting an 80x24 surface.
    pub fn new() -> (Self, SimInput) {
        Self::with_size(80, 24)
    }

    /// Create a driver reporting a `cols` x `rows` surface.
    pub fn with_size(cols: u16, rows: u16) -> (Self, SimInput) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let state = Arc::new(Mutex::new(SharedState {
            frames: Vec::new(),
            clears: 0,
            size: (cols, rows),
            stopped: false,
        }));

        let driver = Self { events: events_rx, state: Arc::clone(&state), invariants: None };
        (driver, SimInput { events: events_tx, state })
    }

    /// Enable invariant checking on every draw.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(registry);
        self
    }

    /// Check invariants against App state.
    pub fn check_invariants(&self, app: &App, context: &str) {
        if let Some(ref registry) = self.invariants {
            registry.assert_all(&SystemSnapshot::from_app(app), context);
        }
    }

    fn record(&self, kind: FrameKind, app: &App) {
        self.check_invariants(app, &format!("on {kind:?} draw"));
        lock(&self.state).frames.push(Frame::capture(kind, app));
    }
}

impl SimInput {
    /// Inject an `AppEvent` for processing.
    ///
    /// Returns `false` if the driver is gone.
    pub fn inject_event(&self, event: AppEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// Inject a key press.
    pub fn press(&self, key: KeyInput) -> bool {
        self.inject_event(AppEvent::Key(key))
    }

    /// Inject one key press per character.
    pub fn type_text(&self, text: &str) -> bool {
        text.chars().all(|c| self.press(KeyInput::Char(c)))
    }

    /// Change the reported size and inject the matching resize event.
    pub fn resize(&self, cols: u16, rows: u16) -> bool {
        lock(&self.state).size = (cols, rows);
        self.inject_event(AppEvent::Resize(cols, rows))
    }

    /// Every frame drawn so far.
    pub fn frames(&self) -> Vec<Frame> {
        lock(&self.state).frames.clone()
    }

    /// Most recent frame.
    pub fn last_frame(&self) -> Option<Frame> {
        lock(&self.state).frames.last().cloned()
    }

    /// Number of frames drawn so far.
    pub fn frame_count(&self) -> usize {
        lock(&self.state).frames.len()
    }

    /// Number of times the surface was cleared.
    pub fn clear_count(&self) -> usize {
        lock(&self.state).clears
    }

    /// Whether the runtime released the surface.
    pub fn is_stopped(&self) -> bool {
        lock(&self.state).stopped
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn next_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        Ok(self.events.recv().await)
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        if lock(&self.state).stopped {
            return Err(SimDriverError("render after stop".into()));
        }
        self.record(FrameKind::Full, app);
        Ok(())
    }

    fn render_transcript(&mut self, app: &App) -> Result<(), Self::Error> {
        if lock(&self.state).stopped {
            return Err(SimDriverError("render after stop".into()));
        }
        self.record(FrameKind::Transcript, app);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        lock(&self.state).clears += 1;
        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        lock(&self.state).size
    }

    fn stop(&mut self) {
        lock(&self.state).stopped = true;
    }
}

fn lock(state: &Mutex<SharedState>) -> MutexGuard<'_, SharedState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
