//! Structured health reporting for server lifecycle and exchange events.

use std::net::SocketAddr;
use std::sync::Arc;

use framelane_config::Config;

use crate::bootstrap::BootstrapError;
use crate::exchange::{ExchangeError, ExchangeSummary};

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn server_starting(&self);

    /// Invoked once the listener accepts connections.
    fn server_ready(&self, config: &Config, addr: SocketAddr);

    /// Invoked when bootstrap fails.
    fn server_failed(&self, error: &BootstrapError);

    /// Invoked when a client connection is accepted.
    fn exchange_started(&self, peer: Option<SocketAddr>);

    /// Invoked after a response has been written.
    fn exchange_succeeded(&self, summary: &ExchangeSummary);

    /// Invoked when an exchange is aborted without a response.
    fn exchange_aborted(&self, error: &ExchangeError);

    /// Invoked after the listener and workers have stopped.
    fn server_stopped(&self);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn server_starting(&self) {
        (**self).server_starting();
    }

    fn server_ready(&self, config: &Config, addr: SocketAddr) {
        (**self).server_ready(config, addr);
    }

    fn server_failed(&self, error: &BootstrapError) {
        (**self).server_failed(error);
    }

    fn exchange_started(&self, peer: Option<SocketAddr>) {
        (**self).exchange_started(peer);
    }

    fn exchange_succeeded(&self, summary: &ExchangeSummary) {
        (**self).exchange_succeeded(summary);
    }

    fn exchange_aborted(&self, error: &ExchangeError) {
        (**self).exchange_aborted(error);
    }

    fn server_stopped(&self) {
        (**self).server_stopped();
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn server_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "server_starting",
            "starting server bootstrap"
        );
    }

    fn server_ready(&self, config: &Config, addr: SocketAddr) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "server_ready",
            addr = %addr,
            deadline_secs = config.deadline_secs,
            max_file_size = config.max_file_size,
            log_format = ?config.log_format(),
            "server accepting connections"
        );
    }

    fn server_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "server_failed",
            error = %error,
            "server bootstrap failed"
        );
    }

    fn exchange_started(&self, peer: Option<SocketAddr>) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "exchange_started",
            peer = ?peer,
            "processing incoming data from client"
        );
    }

    fn exchange_succeeded(&self, summary: &ExchangeSummary) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "exchange_succeeded",
            total_size = summary.total_size,
            frame_size = summary.frame_size,
            values = ?summary.values,
            dropped_tasks = summary.dropped_tasks,
            "exchange completed"
        );
    }

    fn exchange_aborted(&self, error: &ExchangeError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "exchange_aborted",
            kind = error.kind(),
            error = %error,
            "exchange aborted"
        );
    }

    fn server_stopped(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "server_stopped",
            "server stopped"
        );
    }
}
