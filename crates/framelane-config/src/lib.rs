//! Shared configuration for the framelane server and its client.
//!
//! Configuration is layered by `ortho_config`: compiled defaults, an optional
//! TOML file selected with `--config-path`, `FRAMELANE_*` environment
//! variables, and finally command-line flags. The server consumes the loaded
//! [`Config`] as plain parameters; nothing in the computation core reads the
//! environment directly.

mod defaults;
mod logging;

use std::ffi::OsString;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use framelane_protocol::HeaderLimits;
use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::{
    DEFAULT_DEADLINE_SECS, DEFAULT_LISTEN_HOST, DEFAULT_LISTEN_PORT, DEFAULT_LOG_FILTER,
    DEFAULT_MAX_CLIENTS, DEFAULT_MAX_FILE_SIZE, default_listen_host, default_log_filter,
    default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved server configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, OrthoConfig)]
#[ortho_config(prefix = "FRAMELANE")]
pub struct Config {
    /// Address the listener binds to.
    #[ortho_config(default = default_listen_host())]
    pub listen_host: String,
    /// TCP port the listener binds to.
    #[ortho_config(default = DEFAULT_LISTEN_PORT)]
    pub listen_port: u16,
    /// Time budget for one exchange, in seconds.
    #[ortho_config(default = DEFAULT_DEADLINE_SECS)]
    pub deadline_secs: u64,
    /// Largest `total_size` accepted in a request header.
    #[ortho_config(default = DEFAULT_MAX_FILE_SIZE)]
    pub max_file_size: u32,
    /// Number of clients served at once; only `1` is supported.
    #[ortho_config(default = DEFAULT_MAX_CLIENTS)]
    pub max_clients: usize,
    /// `tracing` filter expression.
    #[ortho_config(default = default_log_filter())]
    pub log_filter: String,
    /// Log output format.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_host: default_listen_host(),
            listen_port: DEFAULT_LISTEN_PORT,
            deadline_secs: DEFAULT_DEADLINE_SECS,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_clients: DEFAULT_MAX_CLIENTS,
            log_filter: default_log_filter(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Loads configuration from the process arguments, environment, and any
    /// configuration file.
    ///
    /// # Errors
    ///
    /// Returns the `ortho_config` error when a layer fails to parse.
    pub fn load() -> Result<Self, Arc<OrthoError>> {
        <Self as OrthoConfig>::load()
    }

    /// Loads configuration using `args` in place of the process arguments.
    ///
    /// # Errors
    ///
    /// Returns the `ortho_config` error when a layer fails to parse.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, Arc<OrthoError>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as OrthoConfig>::load_from_iter(args)
    }

    /// Endpoint the listener binds to.
    #[must_use]
    pub fn listen_endpoint(&self) -> ListenEndpoint {
        ListenEndpoint::new(self.listen_host.clone(), self.listen_port)
    }

    /// Per-exchange deadline.
    #[must_use]
    pub const fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }

    /// Header validation limits derived from the configured maximum size.
    #[must_use]
    pub const fn header_limits(&self) -> HeaderLimits {
        HeaderLimits::new(self.max_file_size)
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Checks the values the computation core cannot operate with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] describing the first rejected field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.deadline_secs == 0 {
            return Err(ConfigError::ZeroDeadline);
        }
        if self.max_file_size == 0 {
            return Err(ConfigError::ZeroMaxFileSize);
        }
        if self.max_clients != DEFAULT_MAX_CLIENTS {
            return Err(ConfigError::UnsupportedClientCount {
                requested: self.max_clients,
            });
        }
        Ok(())
    }
}

/// Host and port pair the server listens on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenEndpoint {
    host: String,
    port: u16,
}

impl ListenEndpoint {
    /// Builds an endpoint from its parts.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Host name or address literal.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port; `0` asks the OS for an ephemeral port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for ListenEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "tcp://{}:{}", self.host, self.port)
    }
}

/// Configuration values the server refuses to start with.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The exchange deadline was zero seconds.
    #[error("deadline_secs must be greater than zero")]
    ZeroDeadline,
    /// The maximum accepted payload size was zero.
    #[error("max_file_size must be greater than zero")]
    ZeroMaxFileSize,
    /// More than one simultaneous client was requested.
    #[error("max_clients must be {DEFAULT_MAX_CLIENTS}, got {requested}")]
    UnsupportedClientCount {
        /// Requested client count.
        requested: usize,
    },
}
