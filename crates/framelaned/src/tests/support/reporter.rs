//! Test double for [`HealthReporter`] that records structured events for assertions.

use std::net::SocketAddr;
use std::sync::Mutex;

use framelane_config::Config;

use crate::bootstrap::BootstrapError;
use crate::exchange::{ExchangeError, ExchangeSummary};
use crate::health::HealthReporter;

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    /// Bootstrap started.
    ServerStarting,
    /// The listener is accepting connections.
    ServerReady,
    /// Bootstrap failed with an error description.
    ServerFailed(String),
    /// A connection was accepted.
    ExchangeStarted,
    /// A response carrying these values was written.
    ExchangeSucceeded(Vec<u64>),
    /// An exchange was aborted with an error of this kind.
    ExchangeAborted(&'static str),
    /// The server stopped.
    ServerStopped,
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn server_starting(&self) {
        self.record(HealthEvent::ServerStarting);
    }

    fn server_ready(&self, _config: &Config, _addr: SocketAddr) {
        self.record(HealthEvent::ServerReady);
    }

    fn server_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::ServerFailed(error.to_string()));
    }

    fn exchange_started(&self, _peer: Option<SocketAddr>) {
        self.record(HealthEvent::ExchangeStarted);
    }

    fn exchange_succeeded(&self, summary: &ExchangeSummary) {
        self.record(HealthEvent::ExchangeSucceeded(summary.values.clone()));
    }

    fn exchange_aborted(&self, error: &ExchangeError) {
        self.record(HealthEvent::ExchangeAborted(error.kind()));
    }

    fn server_stopped(&self) {
        self.record(HealthEvent::ServerStopped);
    }
}
