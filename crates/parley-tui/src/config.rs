//! Configuration
//!
//! Settings resolve in this order, later layers winning:
//! defaults, then the TOML config file, then CLI flags.
//!
//! The config file lives at `<config dir>/parley/config.toml` unless
//! `--config` names another path. A missing default file is not an error; a
//! missing explicit file is.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use clap::Parser;
use parley_app::RuntimeConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::loopback::LoopbackConfig;

/// Default log file, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "parley.log";

/// Default tracing filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Timers below this are raised to it.
const MIN_INTERVAL: Duration = Duration::from_millis(100);

/// Parley terminal chat client
#[derive(Parser, Debug, Default)]
#[command(name = "parley")]
#[command(about = "Terminal chat session controller")]
#[command(version)]
pub struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log file (the terminal belongs to the UI)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log level or filter directive (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Seconds between chat-list refreshes
    #[arg(long)]
    pub refresh_secs: Option<u64>,

    /// Seconds a send waits for its response
    #[arg(long)]
    pub send_timeout_secs: Option<u64>,
}

/// Config file contents. Every field is optional.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSection,
    /// Dispatch loop timers.
    #[serde(default)]
    pub session: SessionSection,
    /// Loopback backend behaviour.
    #[serde(default)]
    pub loopback: LoopbackSection,
}

/// `[logging]` table.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Log file path.
    pub file: Option<PathBuf>,
    /// Tracing filter.
    pub level: Option<String>,
}

/// `[session]` table.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SessionSection {
    /// Seconds between chat-list refreshes.
    pub refresh_secs: Option<u64>,
    /// Seconds a send waits for its response.
    pub send_timeout_secs: Option<u64>,
}

/// `[loopback]` table.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoopbackSection {
    /// Milliseconds before a peer answers.
    pub reply_delay_ms: Option<u64>,
    /// Seconds between group chatter messages.
    pub chatter_secs: Option<u64>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Log file path.
    pub log_file: PathBuf,
    /// Tracing filter.
    pub log_level: String,
    /// Dispatch loop timers.
    pub runtime: RuntimeConfig,
    /// Loopback backend behaviour.
    pub loopback: LoopbackConfig,
}

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid config TOML.
    #[error("cannot parse config {}: {source}", path.display())]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: toml::de::Error,
    },
}

/// Default config file location.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("parley").join("config.toml"))
}

/// Load the config file.
///
/// With `explicit` set the file must exist. Otherwise the default location is
/// tried and a missing file yields the defaults.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load(explicit: Option<&Path>) -> Result<FileConfig, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(FileConfig::default()),
        },
    };

    let contents = fs::read_to_string(&path)
        .map_err(|source| ConfigError::Io { path: path.clone(), source })?;
    parse(&contents).map_err(|source| ConfigError::Parse { path, source })
}

/// Parse config TOML.
///
/// # Errors
///
/// Returns the TOML error for malformed input or unknown keys.
pub fn parse(contents: &str) -> Result<FileConfig, toml::de::Error> {
    toml::from_str(contents)
}

impl Settings {
    /// Layer CLI flags over the file config and the defaults.
    pub fn resolve(args: &Args, file: FileConfig) -> Self {
        let runtime_defaults = RuntimeConfig::default();
        let loopback_defaults = LoopbackConfig::default();

        let refresh_interval = args
            .refresh_secs
            .or(file.session.refresh_secs)
            .map_or(runtime_defaults.refresh_interval, Duration::from_secs);
        let send_timeout = args
            .send_timeout_secs
            .or(file.session.send_timeout_secs)
            .map_or(runtime_defaults.send_timeout, Duration::from_secs);

        let reply_delay = file
            .loopback
            .reply_delay_ms
            .map_or(loopback_defaults.reply_delay, Duration::from_millis);
        let chatter_interval = file
            .loopback
            .chatter_secs
            .map_or(loopback_defaults.chatter_interval, Duration::from_secs);

        Self {
            log_file: args
                .log_file
                .clone()
                .or(file.logging.file)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
            log_level: args
                .log_level
                .clone()
                .or(file.logging.level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            runtime: RuntimeConfig {
                refresh_interval: refresh_interval.max(MIN_INTERVAL),
                send_timeout: send_timeout.max(MIN_INTERVAL),
            },
            loopback: LoopbackConfig {
                reply_delay,
                chatter_interval: chatter_interval.max(MIN_INTERVAL),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file_or_flags() {
        let settings = Settings::resolve(&Args::default(), FileConfig::default());

        assert_eq!(settings.log_file, PathBuf::from("parley.log"));
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.runtime.refresh_interval, Duration::from_secs(20));
        assert_eq!(settings.runtime.send_timeout, Duration::from_secs(10));
    }

    #[test]
    fn file_overrides_defaults() {
        let file = parse(
            r#"
            [logging]
            level = "debug"

            [session]
            refresh_secs = 5

            [loopback]
            reply_delay_ms = 250
            "#,
        )
        .unwrap();

        let settings = Settings::resolve(&Args::default(), file);

        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.runtime.refresh_interval, Duration::from_secs(5));
        assert_eq!(settings.runtime.send_timeout, Duration::from_secs(10));
        assert_eq!(settings.loopback.reply_delay, Duration::from_millis(250));
    }

    #[test]
    fn flags_override_file() {
        let file = parse("[session]\nrefresh_secs = 5\nsend_timeout_secs = 3\n").unwrap();
        let args = Args {
            refresh_secs: Some(60),
            log_file: Some(PathBuf::from("/tmp/p.log")),
            ..Args::default()
        };

        let settings = Settings::resolve(&args, file);

        assert_eq!(settings.runtime.refresh_interval, Duration::from_secs(60));
        assert_eq!(settings.runtime.send_timeout, Duration::from_secs(3));
        assert_eq!(settings.log_file, PathBuf::from("/tmp/p.log"));
    }

    #[test]
    fn zero_intervals_are_raised() {
        let args = Args { refresh_secs: Some(0), send_timeout_secs: Some(0), ..Args::default() };

        let settings = Settings::resolve(&args, FileConfig::default());

        assert_eq!(settings.runtime.refresh_interval, MIN_INTERVAL);
        assert_eq!(settings.runtime.send_timeout, MIN_INTERVAL);
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(parse("[session]\nrefresh = 5\n").is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load(Some(Path::new("/nonexistent/parley/config.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn cli_flags_parse() {
        let argv = ["parley", "--refresh-secs", "30", "--log-level", "debug"];
        let args = Args::try_parse_from(argv).unwrap();

        assert_eq!(args.refresh_secs, Some(30));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }
}
