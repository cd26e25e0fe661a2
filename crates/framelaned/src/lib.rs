//! Single-client streamed computation server.
//!
//! A client sends one framed file per connection. The server validates the
//! header, streams the payload, and hands every completed run of frames to
//! each registered indicator on its own worker lane while the rest of the
//! file is still arriving. When the whole file has been processed, one
//! big-endian `u64` per indicator is written back. A watchdog bounds every
//! exchange: if the deadline passes first the connection is closed without a
//! response and the lanes are drained before the next client is accepted.
//!
//! All long-lived state lives in one [`Server`] value built by
//! [`bootstrap_with`]; nothing is held in globals apart from the telemetry
//! subscriber.
//!
//! ## Lifecycle
//!
//! 1. [`bootstrap_with`] loads and validates configuration, initialises
//!    telemetry, allocates one context per indicator, starts one lane per
//!    indicator plus the watchdog thread, and binds the listener.
//! 2. [`Server::start`] accepts connections on a background thread, one at a
//!    time, until the [`ShutdownFlag`] is raised.
//! 3. [`RunningServer::join`] waits for the listener and stops the workers.
//!
//! Health hooks on [`HealthReporter`] fire at every step so operators can
//! follow exchanges in the structured logs.

mod bootstrap;
mod completion;
mod exchange;
mod health;
mod pool;
mod process;
mod server;
pub mod telemetry;
mod transport;
mod watchdog;

pub use bootstrap::{
    BootstrapError, ConfigLoader, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use completion::{CancellationToken, CompletionCounter, WaitOutcome};
pub use exchange::{ExchangeError, ExchangeSummary, InternalError, TransportError};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use pool::{Job, LaneConfig, PoolError, WorkerPool};
pub use process::{
    LaunchError, ShutdownError, ShutdownFlag, default_registry, run_server,
};
pub use server::{RunningServer, Server};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::{ConnectionCloser, ConnectionStream, ListenerError};
pub use watchdog::{Disarmed, Tripwire, Watchdog, WatchdogError};

#[cfg(test)]
mod tests;
