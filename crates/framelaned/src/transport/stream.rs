//! Accepted connections and the handler seam the listener drives.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::ops::ControlFlow;

use tracing::warn;

use super::LISTENER_TARGET;

/// A client connection in blocking mode.
#[derive(Debug)]
pub struct ConnectionStream {
    stream: TcpStream,
    peer: Option<SocketAddr>,
}

impl ConnectionStream {
    pub(crate) fn new(stream: TcpStream) -> Self {
        let peer = stream.peer_addr().ok();
        Self { stream, peer }
    }

    /// Remote address, when the OS still reports it.
    #[must_use]
    pub const fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Returns a handle able to close this connection from another thread.
    ///
    /// # Errors
    ///
    /// Returns the OS error raised while duplicating the socket.
    pub fn closer(&self) -> io::Result<ConnectionCloser> {
        Ok(ConnectionCloser {
            stream: self.stream.try_clone()?,
        })
    }
}

impl Read for ConnectionStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for ConnectionStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

/// Duplicate socket handle that shuts the connection down in both
/// directions, unblocking any read pending on the original stream.
#[derive(Debug)]
pub struct ConnectionCloser {
    stream: TcpStream,
}

impl ConnectionCloser {
    /// Shuts the connection down. Errors other than "not connected" are
    /// logged.
    pub fn close(&self) {
        if let Err(error) = self.stream.shutdown(Shutdown::Both)
            && error.kind() != io::ErrorKind::NotConnected
        {
            warn!(
                target: LISTENER_TARGET,
                error = %error,
                "failed to close connection"
            );
        }
    }
}

/// Handles accepted connections one at a time on the listener thread.
pub(crate) trait ConnectionHandler: Send + Sync + 'static {
    /// Serves a single connection. Returning [`ControlFlow::Break`] stops the
    /// listener.
    fn handle(&self, stream: ConnectionStream) -> ControlFlow<()>;
}
