//! TCP transport for the computation server.
//!
//! The listener accepts connections on a background thread and hands each
//! one to a [`ConnectionHandler`] before accepting the next, so at most one
//! exchange is in flight.

mod errors;
mod listener;
mod stream;

pub use self::errors::ListenerError;
pub(crate) use self::listener::{ListenerHandle, SocketListener};
pub(crate) use self::stream::ConnectionHandler;
pub use self::stream::{ConnectionCloser, ConnectionStream};

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
