//! Process-wide `tracing` subscriber for the server.
//!
//! Lane workers, the watchdog, and the listener each run on a named thread,
//! so thread names are part of every event. Output goes to stderr as JSON or
//! compact lines depending on [`LogFormat`].

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::Subscriber;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::{self, time::UtcTime};

use framelane_config::{Config, LogFormat};

static INSTALLED: OnceCell<TelemetryHandle> = OnceCell::new();

/// Describes the subscriber installed for this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryHandle {
    format: LogFormat,
}

impl TelemetryHandle {
    /// Output format chosen by the first successful initialisation.
    #[must_use]
    pub const fn format(&self) -> LogFormat {
        self.format
    }
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured filter expression does not parse.
    #[error("invalid log filter `{filter}`: {source}")]
    Filter {
        /// Rejected expression.
        filter: String,
        /// Parser error.
        #[source]
        source: ParseError,
    },
    /// Another global subscriber was installed outside this module.
    #[error("failed to install telemetry subscriber: {source}")]
    Install {
        /// Error reported by `tracing`.
        #[source]
        source: SetGlobalDefaultError,
    },
}

/// Installs the global subscriber the first time it is called.
///
/// Later calls return the handle of the subscriber already installed, even
/// when `config` asks for a different format.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter does not parse or a foreign
/// subscriber is already installed.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    INSTALLED
        .get_or_try_init(|| install(config))
        .copied()
}

fn install(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    let filter = parse_filter(config.log_filter())?;
    let format = config.log_format();
    let subscriber = build_subscriber(filter, format);
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|source| TelemetryError::Install { source })?;
    Ok(TelemetryHandle { format })
}

fn parse_filter(filter: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(filter).map_err(|source| TelemetryError::Filter {
        filter: filter.to_owned(),
        source,
    })
}

fn build_subscriber(filter: EnvFilter, format: LogFormat) -> Box<dyn Subscriber + Send + Sync> {
    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(UtcTime::rfc_3339());
    match format {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::level("info")]
    #[case::directives("framelaned::pool=debug,warn")]
    fn accepts_filter_expressions(#[case] filter: &str) {
        assert!(parse_filter(filter).is_ok());
    }

    #[test]
    fn rejects_malformed_filter() {
        let error = parse_filter("framelaned=loud").expect_err("malformed filter");
        assert!(matches!(
            error,
            TelemetryError::Filter { ref filter, .. } if filter == "framelaned=loud"
        ));
    }

    #[test]
    fn repeated_initialisation_returns_installed_handle() {
        let config = Config {
            log_filter: String::from("warn"),
            ..Config::default()
        };
        let first = initialise(&config).expect("first initialisation");
        let second = initialise(&Config {
            log_format: LogFormat::Compact,
            ..config
        })
        .expect("second initialisation");
        assert_eq!(first, second);
    }
}
