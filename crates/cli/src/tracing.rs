//! Tracing setup for the mavenkit CLI.
//!
//! Logs go to stderr so stdout stays reserved for command output.

use std::io;
pub use tracing::Level;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Tracing output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TracingFormat {
    /// Pretty-printed human-readable format
    Pretty,
    /// Compact single-line format
    Compact,
    /// Structured JSON format
    Json,
}

/// Tracing configuration
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Output format
    pub format: TracingFormat,
    /// Level for the mavenkit crates when `RUST_LOG` is unset
    pub level: Level,
    /// Explicit filter directive, overriding `RUST_LOG` and `level`
    pub filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            format: TracingFormat::Compact,
            level: Level::WARN,
            filter: None,
        }
    }
}

impl TracingConfig {
    /// `warn` by default, `debug` for `-v`, `trace` for `-vv` and more.
    #[must_use]
    pub fn from_verbosity(verbose: u8, format: TracingFormat) -> Self {
        let level = match verbose {
            0 => Level::WARN,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            format,
            level,
            filter: None,
        }
    }

    fn directive(&self) -> String {
        let level = match self.level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        format!(
            "warn,mavenkit={level},mavenkit_core={level},mavenkit_invoker={level},\
             mavenkit_metadata={level},mavenkit_resolver={level}"
        )
    }
}

/// Initialize tracing with the given configuration
pub fn init_tracing(config: &TracingConfig) -> miette::Result<()> {
    let env_filter = if let Some(filter) = &config.filter {
        EnvFilter::try_new(filter)
    } else if config.level == Level::WARN {
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(config.directive()))
    } else {
        EnvFilter::try_new(config.directive())
    }
    .map_err(|e| miette::miette!("Failed to create tracing filter: {e}"))?;

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match config.format {
        TracingFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(io::stderr)
                    .with_target(true),
            )
            .try_init(),
        TracingFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(io::stderr)
                    .with_target(false),
            )
            .try_init(),
        TracingFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(io::stderr)
                    .with_current_span(true),
            )
            .try_init(),
    };
    result.map_err(|e| miette::miette!("Failed to install tracing subscriber: {e}"))?;

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        format = ?config.format,
        "Tracing initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(TracingConfig::from_verbosity(0, TracingFormat::Compact).level, Level::WARN);
        assert_eq!(TracingConfig::from_verbosity(1, TracingFormat::Compact).level, Level::DEBUG);
        assert_eq!(TracingConfig::from_verbosity(3, TracingFormat::Json).level, Level::TRACE);
    }

    #[test]
    fn test_directive_names_every_crate() {
        let directive = TracingConfig::from_verbosity(1, TracingFormat::Compact).directive();
        assert!(directive.contains("mavenkit_resolver=debug"));
        assert!(EnvFilter::try_new(directive).is_ok());
    }
}
