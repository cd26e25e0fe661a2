//! Failure taxonomy for one exchange.

use std::io;

use framelane_protocol::ProtocolError;
use thiserror::Error;

use crate::pool::PoolError;
use crate::watchdog::WatchdogError;

/// Reasons an exchange is aborted. None of them stop the server.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The request header was rejected.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    /// Reading the request or writing the response failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    /// Work for a lane could not be queued.
    #[error("failed to queue work for lane {lane}: {source}")]
    Resource {
        /// Lane the task was meant for.
        lane: usize,
        /// Pool rejection.
        #[source]
        source: PoolError,
    },
    /// The deadline passed before every indicator finished.
    #[error("deadline exceeded after {received} of {expected} payload bytes")]
    Timeout {
        /// Payload bytes received before the abort.
        received: usize,
        /// Payload bytes declared by the header.
        expected: usize,
    },
    /// The server's own machinery misbehaved.
    #[error("internal error: {0}")]
    Internal(#[from] InternalError),
}

impl ExchangeError {
    /// Short category name used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Protocol(_) => "protocol",
            Self::Transport(_) => "transport",
            Self::Resource { .. } => "resource",
            Self::Timeout { .. } => "timeout",
            Self::Internal(_) => "internal",
        }
    }
}

/// Connection-level failures.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request header could not be read in full.
    #[error("failed to read request header: {source}")]
    Header {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The client closed the connection before sending the whole payload.
    #[error("connection closed after {received} of {expected} payload bytes")]
    Closed {
        /// Payload bytes received.
        received: usize,
        /// Payload bytes declared by the header.
        expected: usize,
    },
    /// Reading the payload failed.
    #[error("failed to read payload: {source}")]
    Read {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Writing the response failed.
    #[error("failed to write response: {source}")]
    Write {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The connection handle could not be duplicated for the watchdog.
    #[error("failed to duplicate connection handle: {source}")]
    Handle {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Faults in the pool or watchdog plumbing.
#[derive(Debug, Error)]
pub enum InternalError {
    /// The pool rejected a task for a reason other than capacity.
    #[error("worker pool fault: {0}")]
    Pool(#[source] PoolError),
    /// The watchdog could not be armed.
    #[error("watchdog fault: {0}")]
    Watchdog(#[from] WatchdogError),
    /// Encoding the response failed.
    #[error("response encoding failed: {0}")]
    Encode(#[source] ProtocolError),
}
