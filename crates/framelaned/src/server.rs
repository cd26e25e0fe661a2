//! The server context and its per-connection exchange service.

use std::fmt;
use std::net::SocketAddr;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use framelane_config::Config;
use framelane_indicators::IndicatorSlot;
use framelane_protocol::HeaderLimits;
use tracing::{debug, error};

use crate::completion::{CancellationToken, CompletionCounter};
use crate::exchange::{
    Exchange, ExchangeError, ExchangeSummary, InternalError, LaneTask, TransportError,
    write_response,
};
use crate::health::HealthReporter;
use crate::pool::WorkerPool;
use crate::process::ShutdownFlag;
use crate::telemetry::TelemetryHandle;
use crate::transport::{
    ConnectionCloser, ConnectionHandler, ConnectionStream, ListenerError, ListenerHandle,
    SocketListener,
};
use crate::watchdog::{Disarmed, Tripwire, Watchdog};

const SERVER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::server");

/// Aborts the exchange in flight: cancels the ingest loop, releases the
/// completion wait, and closes the connection to unblock a pending read.
struct ExchangeTripwire {
    counter: Arc<CompletionCounter>,
    token: CancellationToken,
    closer: ConnectionCloser,
}

impl Tripwire for ExchangeTripwire {
    fn trip(&self) {
        self.token.cancel();
        self.counter.cancel();
        self.closer.close();
    }
}

/// State shared by every exchange for the lifetime of the server.
pub(crate) struct ExchangeService {
    pub(crate) slots: Vec<Arc<IndicatorSlot>>,
    pub(crate) pool: WorkerPool<LaneTask>,
    pub(crate) watchdog: Watchdog,
    pub(crate) counter: Arc<CompletionCounter>,
    pub(crate) reporter: Arc<dyn HealthReporter>,
    pub(crate) limits: HeaderLimits,
    pub(crate) deadline: Duration,
}

impl ExchangeService {
    fn serve(&self, mut stream: ConnectionStream) -> Result<ExchangeSummary, ExchangeError> {
        let closer = stream
            .closer()
            .map_err(|source| TransportError::Handle { source })?;
        let token = CancellationToken::new();
        self.watchdog
            .arm(
                self.deadline,
                Box::new(ExchangeTripwire {
                    counter: Arc::clone(&self.counter),
                    token: token.clone(),
                    closer,
                }),
            )
            .map_err(InternalError::from)?;

        let computed = Exchange::new(
            &self.slots,
            &self.pool,
            &self.counter,
            &token,
            self.limits,
        )
        .compute(&mut stream);
        let disarmed = self.watchdog.disarm();
        let summary = computed?;
        if disarmed == Disarmed::Fired {
            let size = usize::try_from(summary.total_size).unwrap_or(usize::MAX);
            return Err(ExchangeError::Timeout {
                received: size,
                expected: size,
            });
        }
        write_response(&mut stream, &summary.values)?;
        Ok(summary)
    }

    /// Discards whatever the aborted exchange left on the lanes.
    fn recover(&self) -> ControlFlow<()> {
        match self.pool.drain_and_restart() {
            Ok(discarded) => {
                debug!(
                    target: SERVER_TARGET,
                    discarded,
                    "lanes drained after aborted exchange"
                );
                ControlFlow::Continue(())
            }
            Err(error) => {
                error!(
                    target: SERVER_TARGET,
                    error = %error,
                    "failed to restart worker pool; stopping"
                );
                ControlFlow::Break(())
            }
        }
    }

    fn stop(&self) {
        self.watchdog.stop();
        self.pool.shutdown();
    }
}

impl ConnectionHandler for ExchangeService {
    fn handle(&self, stream: ConnectionStream) -> ControlFlow<()> {
        self.reporter.exchange_started(stream.peer());
        let flow = match self.serve(stream) {
            Ok(summary) => {
                self.reporter.exchange_succeeded(&summary);
                ControlFlow::Continue(())
            }
            Err(error) => {
                self.reporter.exchange_aborted(&error);
                self.recover()
            }
        };
        let leftover = self.counter.reset();
        if leftover > 0 {
            debug!(
                target: SERVER_TARGET,
                leftover,
                "cleared completion signals"
            );
        }
        flow
    }
}

/// The bootstrapped server: configuration, indicator contexts, worker pool,
/// watchdog, completion counter, and bound listener.
pub struct Server {
    config: Config,
    listener: SocketListener,
    service: Arc<ExchangeService>,
    telemetry: TelemetryHandle,
}

impl fmt::Debug for Server {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Server")
            .field("endpoint", &self.config.listen_endpoint())
            .field("indicators", &self.indicator_names())
            .field("telemetry", &self.telemetry)
            .finish_non_exhaustive()
    }
}

impl Server {
    pub(crate) fn new(
        config: Config,
        listener: SocketListener,
        service: ExchangeService,
        telemetry: TelemetryHandle,
    ) -> Self {
        Self {
            config,
            listener,
            service: Arc::new(service),
            telemetry,
        }
    }

    /// Accessor for the resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub const fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Names of the indicators served, in response order.
    #[must_use]
    pub fn indicator_names(&self) -> Vec<&str> {
        self.service.slots.iter().map(|slot| slot.name()).collect()
    }

    /// Address the listener is bound to.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::LocalAddr`] when the OS cannot report it.
    pub fn local_addr(&self) -> Result<SocketAddr, ListenerError> {
        self.listener.local_addr()
    }

    /// Starts accepting connections on a background thread until `shutdown`
    /// is raised.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError`] when the accept thread cannot be started.
    pub fn start(self, shutdown: ShutdownFlag) -> Result<RunningServer, ListenerError> {
        let addr = self.listener.local_addr()?;
        let handler: Arc<dyn ConnectionHandler> = self.service.clone();
        let listener = self.listener.start(handler, shutdown)?;
        self.service.reporter.server_ready(&self.config, addr);
        Ok(RunningServer {
            addr,
            listener,
            service: self.service,
        })
    }
}

/// A server whose listener thread is running.
pub struct RunningServer {
    addr: SocketAddr,
    listener: ListenerHandle,
    service: Arc<ExchangeService>,
}

impl RunningServer {
    /// Address the listener is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Tasks queued or running on the lanes.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.service.pool.pending_tasks()
    }

    /// Asks the listener to stop after the current exchange.
    pub fn shutdown(&self) {
        self.listener.shutdown();
    }

    /// Waits for the listener to stop, then stops the watchdog and workers.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::ThreadPanic`] when the accept thread panicked.
    pub fn join(self) -> Result<(), ListenerError> {
        let joined = self.listener.join();
        self.service.stop();
        self.service.reporter.server_stopped();
        joined
    }
}
