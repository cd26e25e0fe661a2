//! Command-line interface definitions for the `framelane` client.

use clap::{Args, Parser, Subcommand};

/// Payload size used when `--size` is omitted.
pub const DEFAULT_SIZE: u32 = 512;

/// Frame size used when `--frame-size` is omitted.
pub const DEFAULT_FRAME_SIZE: u32 = 32;

/// Test client for the framelane computation server.
#[derive(Parser, Debug)]
#[command(name = "framelane", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Client operations.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Writes a request (header plus random payload) to stdout.
    Generate(RequestArgs),
    /// Reads a response from stdin and prints its indicator values.
    Read,
    /// Streams a request to a server and prints the values it returns.
    Send {
        /// Server host name or address.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Server TCP port.
        #[arg(long, default_value_t = 5000)]
        port: u16,
        #[command(flatten)]
        request: RequestArgs,
    },
}

/// Shape of the generated request.
#[derive(Args, Debug, Clone, Copy)]
pub(crate) struct RequestArgs {
    /// Payload size in bytes.
    #[arg(short, long, default_value_t = DEFAULT_SIZE)]
    pub(crate) size: u32,
    /// Frame size in bytes.
    #[arg(short, long, default_value_t = DEFAULT_FRAME_SIZE)]
    pub(crate) frame_size: u32,
    /// Seeds the payload generator for reproducible requests.
    #[arg(long)]
    pub(crate) seed: Option<u64>,
}
