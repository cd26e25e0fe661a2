//! Test client for the framelane computation server.
//!
//! `framelane generate` writes a request to stdout, `framelane read` decodes
//! a response from stdin, and `framelane send` performs a whole exchange
//! over TCP. Values are printed in registry order, separated by spaces.

mod cli;
mod errors;
mod request;

use std::ffi::OsString;
use std::io::{self, ErrorKind, Read, Write};
use std::net::TcpStream;
use std::process::ExitCode;

use clap::Parser;
use framelane_protocol::decode_response;

pub use cli::{DEFAULT_FRAME_SIZE, DEFAULT_SIZE};
pub use errors::CliError;

use cli::{Cli, CliCommand};
use request::build_request;

/// Runs the client with explicit streams and returns the process exit code.
pub fn run<I, R, W, E>(args: I, stdin: &mut R, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: Read,
    W: Write,
    E: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) if !error.use_stderr() => {
            return match write!(stdout, "{error}") {
                Ok(()) => ExitCode::SUCCESS,
                Err(_) => ExitCode::FAILURE,
            };
        }
        Err(error) => return report(stderr, &CliError::from(error)),
    };
    match execute(cli.command, stdin, stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => report(stderr, &error),
    }
}

fn report<E: Write>(stderr: &mut E, error: &CliError) -> ExitCode {
    writeln!(stderr, "framelane: {error}").ok();
    ExitCode::FAILURE
}

fn execute<R, W>(command: CliCommand, stdin: &mut R, stdout: &mut W) -> Result<(), CliError>
where
    R: Read,
    W: Write,
{
    match command {
        CliCommand::Generate(request) => {
            let bytes = build_request(request)?;
            stdout.write_all(&bytes).map_err(CliError::Output)?;
            stdout.flush().map_err(CliError::Output)
        }
        CliCommand::Read => {
            let mut bytes = Vec::new();
            stdin.read_to_end(&mut bytes).map_err(CliError::Input)?;
            print_values(stdout, &decode_response(&bytes)?)
        }
        CliCommand::Send {
            host,
            port,
            request,
        } => {
            let bytes = build_request(request)?;
            let values = exchange(&host, port, &bytes)?;
            print_values(stdout, &values)
        }
    }
}

/// Streams `request` to the server and decodes what it sends back.
///
/// # Errors
///
/// Returns [`CliError::NoResponse`] when the server hangs up without
/// answering, which is how it signals an aborted exchange. A reset that
/// arrives while the request is still being written counts the same way.
pub fn exchange(host: &str, port: u16, request: &[u8]) -> Result<Vec<u64>, CliError> {
    let mut stream = TcpStream::connect((host, port)).map_err(|source| CliError::Connect {
        endpoint: format!("{host}:{port}"),
        source,
    })?;
    stream.write_all(request).map_err(|source| hangup_or(source, CliError::Send))?;
    stream.flush().map_err(|source| hangup_or(source, CliError::Send))?;
    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .map_err(|source| hangup_or(source, CliError::Receive))?;
    if response.is_empty() {
        return Err(CliError::NoResponse);
    }
    Ok(decode_response(&response)?)
}

fn hangup_or(source: io::Error, wrap: fn(io::Error) -> CliError) -> CliError {
    match source.kind() {
        ErrorKind::BrokenPipe | ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted => {
            CliError::NoResponse
        }
        _ => wrap(source),
    }
}

fn print_values<W: Write>(stdout: &mut W, values: &[u64]) -> Result<(), CliError> {
    let line = values
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(stdout, "{line}").map_err(CliError::Output)
}
