/// Address the server binds to when none is configured.
pub const DEFAULT_LISTEN_HOST: &str = "127.0.0.1";

/// TCP port the server binds to when none is configured.
pub const DEFAULT_LISTEN_PORT: u16 = 5000;

/// Time budget for one exchange, in seconds.
pub const DEFAULT_DEADLINE_SECS: u64 = 35;

/// Largest payload accepted from a client (80 MB).
pub const DEFAULT_MAX_FILE_SIZE: u32 = 80 * 1000 * 1000;

/// Number of simultaneous clients served. The server supports exactly one.
pub const DEFAULT_MAX_CLIENTS: usize = 1;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Owned listen host used where allocation is required.
pub fn default_listen_host() -> String {
    DEFAULT_LISTEN_HOST.to_owned()
}

/// Owned log filter value used where allocation is required.
pub fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
pub fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Json
}

