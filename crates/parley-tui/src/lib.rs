//! Terminal UI for Parley
//!
//! A thin shell over [`parley_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`parley_app::Runtime`].
//!
//! This crate handles terminal rendering, configuration, and the in-process
//! loopback backend the binary talks to.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod loopback;
pub mod terminal;
pub mod ui;

pub use config::{Args, ConfigError, Settings};
pub use loopback::{LoopbackBackend, LoopbackConfig};
pub use parley_app::{App, AppAction, AppEvent, Driver, KeyInput, Runtime, RuntimeConfig};
pub use terminal::{TerminalDriver, TerminalError};
