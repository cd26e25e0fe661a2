//! Error types for the client runtime.

use std::io;

use framelane_protocol::ProtocolError;
use thiserror::Error;

/// Failures surfaced by the client; each maps to a non-zero exit code.
#[derive(Debug, Error)]
pub enum CliError {
    /// Arguments did not parse.
    #[error("{0}")]
    Usage(#[from] clap::Error),
    /// The payload does not fit in memory on this platform.
    #[error("payload of {size} bytes cannot be allocated")]
    PayloadTooLarge {
        /// Requested payload size.
        size: u32,
    },
    /// Writing to stdout failed.
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
    /// Reading the response from stdin failed.
    #[error("failed to read response: {0}")]
    Input(#[source] io::Error),
    /// The response was malformed.
    #[error("invalid response: {0}")]
    Response(#[from] ProtocolError),
    /// The server could not be reached.
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        /// `host:port` that was dialled.
        endpoint: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Streaming the request failed.
    #[error("failed to send request: {0}")]
    Send(#[source] io::Error),
    /// Reading the server's answer failed.
    #[error("failed to receive response: {0}")]
    Receive(#[source] io::Error),
    /// The server closed the connection without answering.
    #[error("server closed the connection without a response")]
    NoResponse,
}
