//! Shared components for CLI commands
//!
//! Logging setup and configuration loading used by both subcommands.

use crate::config::SepomexConfig;
use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// Set up structured logging on stderr, optionally mirrored to a file
pub fn setup_logging(log_level: &str, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sepomex_sql={}", log_level)));

    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);

    if quiet {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
            .context("Failed to initialize logging")?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .context("Failed to initialize logging")?;
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load the configuration file, or the defaults when none is given
pub fn load_configuration(config_file: Option<&Path>) -> Result<SepomexConfig> {
    match config_file {
        Some(path) => {
            info!("Using config file: {}", path.display());
            SepomexConfig::from_toml_file(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))
        }
        None => {
            info!("No config file given, using defaults");
            Ok(SepomexConfig::default())
        }
    }
}

/// Render a percentage with one decimal
pub fn format_rate(rate: f64) -> String {
    format!("{:.1}%", rate)
}
