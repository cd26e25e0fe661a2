//! Scenario world shared across BDD steps.

use std::cell::RefCell;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use framelane_config::Config;

use crate::bootstrap::{BootstrapError, ConfigLoader, StaticConfigLoader, bootstrap_with};
use crate::process::ShutdownFlag;
use crate::server::{RunningServer, Server};

use super::config_loader::{FailingConfigLoader, test_config};
use super::indicators::{CallLog, recording_registry, throttled_registry};
use super::reporter::RecordingHealthReporter;

/// Scenario world shared across BDD steps.
pub struct TestWorld {
    loader: Box<dyn ConfigLoader>,
    pub reporter: Arc<RecordingHealthReporter>,
    indicators: usize,
    throttle: Option<u64>,
    logs: Vec<CallLog>,
    server: Option<Server>,
    running: Option<RunningServer>,
    bootstrap_error: Option<BootstrapError>,
    responses: Vec<Option<Vec<u64>>>,
}

impl TestWorld {
    /// Builds a world with a healthy loopback configuration.
    pub fn new() -> Self {
        Self {
            loader: Box::new(StaticConfigLoader::new(test_config(5))),
            reporter: Arc::new(RecordingHealthReporter::default()),
            indicators: 1,
            throttle: None,
            logs: Vec::new(),
            server: None,
            running: None,
            bootstrap_error: None,
            responses: Vec::new(),
        }
    }

    /// Installs a loader that always fails.
    pub fn use_failing_loader(&mut self) {
        self.loader = Box::new(FailingConfigLoader);
    }

    /// Installs a loader returning `config`.
    pub fn use_config(&mut self, config: Config) {
        self.loader = Box::new(StaticConfigLoader::new(config));
    }

    /// Sets the number of recording indicators registered at bootstrap.
    pub fn use_indicators(&mut self, count: usize) {
        self.indicators = count;
    }

    /// Limits every recording indicator to `bytes_per_sec`.
    pub fn use_throttle(&mut self, bytes_per_sec: u64) {
        self.throttle = Some(bytes_per_sec);
    }

    /// Runs the bootstrap sequence once.
    pub fn bootstrap(&mut self) {
        if self.server.is_some() || self.bootstrap_error.is_some() {
            return;
        }
        let (registry, logs) = match self.throttle {
            Some(rate) => throttled_registry(self.indicators, rate),
            None => recording_registry(self.indicators),
        };
        self.logs = logs;
        match bootstrap_with(&*self.loader, self.reporter.clone(), &registry) {
            Ok(server) => self.server = Some(server),
            Err(error) => self.bootstrap_error = Some(error),
        }
    }

    /// Bootstraps and starts the listener.
    pub fn start(&mut self) {
        self.bootstrap();
        let server = self.server.take().expect("bootstrap should succeed");
        let running = server
            .start(ShutdownFlag::new())
            .expect("listener should start");
        self.running = Some(running);
    }

    /// Returns the bootstrap error, if any.
    pub fn bootstrap_error(&self) -> Option<&BootstrapError> {
        self.bootstrap_error.as_ref()
    }

    /// Returns true when a server was built.
    #[must_use]
    pub fn server_built(&self) -> bool {
        self.server.is_some() || self.running.is_some()
    }

    /// Address of the running server.
    pub fn addr(&self) -> SocketAddr {
        self.running
            .as_ref()
            .expect("server should be running")
            .local_addr()
    }

    /// Tasks still queued or running on the lanes.
    pub fn pending_tasks(&self) -> usize {
        self.running
            .as_ref()
            .expect("server should be running")
            .pending_tasks()
    }

    /// Stores the outcome of one client exchange.
    pub fn record_response(&mut self, response: Option<Vec<u64>>) {
        self.responses.push(response);
    }

    /// Responses in the order the exchanges ran.
    pub fn responses(&self) -> &[Option<Vec<u64>>] {
        &self.responses
    }

    /// Chunks seen by recorder `index`.
    pub fn calls(&self, index: usize) -> Vec<Vec<u8>> {
        self.logs
            .get(index)
            .expect("recorder index")
            .lock()
            .expect("call log")
            .clone()
    }

    /// Number of recorders registered.
    pub fn recorder_count(&self) -> usize {
        self.logs.len()
    }
}

impl Drop for TestWorld {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.shutdown();
            let _joined = running.join();
        }
    }
}

/// Default test world fixture.
#[must_use]
pub fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::new())
}

/// Polls `check` for up to five seconds.
pub fn eventually(mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}
