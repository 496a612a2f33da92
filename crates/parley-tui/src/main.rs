//! Parley terminal client entry point.
//!
//! # Usage
//!
//! ```bash
//! # Defaults, logging to ./parley.log
//! parley
//!
//! # Faster refresh, verbose logs elsewhere
//! parley --refresh-secs 5 --log-level debug --log-file /tmp/parley.log
//! ```

use std::path::Path;

use clap::Parser;
use parley_tui::{Args, LoopbackBackend, Runtime, Settings, TerminalDriver, config};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let file = config::load(args.config.as_deref())?;
    let settings = Settings::resolve(&args, file);

    let _log_guard = init_logging(&settings);

    tracing::info!("Parley starting");
    tracing::debug!(?settings, "resolved settings");

    let backend = LoopbackBackend::spawn(settings.loopback);
    let driver = TerminalDriver::new()?;
    let mut runtime = Runtime::new(driver, backend, settings.runtime);

    let result = runtime.run().await;
    drop(runtime);

    if let Err(e) = &result {
        tracing::error!("session ended with error: {e}");
    }
    tracing::info!("Parley stopped");
    Ok(result?)
}

/// Install the file subscriber. The terminal belongs to the UI, so nothing is
/// written to stdout or stderr.
fn init_logging(settings: &Settings) -> WorkerGuard {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

    let path = settings.log_file.as_path();
    let directory = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let file_name = path.file_name().unwrap_or(path.as_os_str());

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    guard
}
