//! Tracing setup
//!
//! `RUST_LOG`, when set, wins over the configured level. Events go to stderr
//! so command output on stdout stays clean, or to the configured file.

use crate::config::LoggingConfig;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter for the configured level, unless `RUST_LOG` says otherwise
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("timesheet={}", config.level)))
}

/// Install the global subscriber
pub fn init(config: &LoggingConfig) -> std::io::Result<()> {
    let filter = env_filter(config);
    let json = config.format.eq_ignore_ascii_case("json");

    let registry = tracing_subscriber::registry().with(filter);

    let result = match &config.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let writer = Mutex::new(file);
            if json {
                registry
                    .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
                    .try_init()
            } else {
                registry
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_ansi(false)
                            .with_writer(writer),
                    )
                    .try_init()
            }
        }
        None if json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        None => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("Logging already initialised: {}", e);
    }
    Ok(())
}
