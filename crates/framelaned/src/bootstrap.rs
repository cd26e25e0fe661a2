//! Server bootstrap orchestration.

use std::sync::Arc;

use ortho_config::OrthoError;
use thiserror::Error;

use framelane_config::{Config, ConfigError};
use framelane_indicators::{IndicatorRegistry, RegistryError};

use crate::completion::CompletionCounter;
use crate::health::HealthReporter;
use crate::pool::{LaneConfig, PoolError, WorkerPool};
use crate::server::{ExchangeService, Server};
use crate::telemetry::{self, TelemetryError};
use crate::transport::{ListenerError, SocketListener};
use crate::watchdog::{Watchdog, WatchdogError};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the server configuration.
    ///
    /// # Errors
    ///
    /// Returns the loader's error when no configuration can be produced.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader returning a configuration resolved elsewhere.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps an already-resolved configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap. Anything started before the failure is
/// stopped again before the error is returned.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Configuration loaded but holds unusable values.
    #[error("invalid configuration: {source}")]
    InvalidConfiguration {
        /// Rejected field.
        #[source]
        source: ConfigError,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// Indicator contexts could not be allocated.
    #[error("failed to prepare indicators: {source}")]
    Indicators {
        /// Registry error.
        #[source]
        source: RegistryError,
    },
    /// The worker pool could not be started.
    #[error("failed to start worker pool: {source}")]
    Pool {
        /// Pool error.
        #[source]
        source: PoolError,
    },
    /// The watchdog could not be started.
    #[error("failed to start watchdog: {source}")]
    Watchdog {
        /// Watchdog error.
        #[source]
        source: WatchdogError,
    },
    /// The listening socket could not be bound.
    #[error("failed to bind listener: {source}")]
    Listener {
        /// Listener error.
        #[source]
        source: ListenerError,
    },
}

/// Bootstraps the server using the supplied collaborators.
///
/// Builds the single [`Server`] context: one indicator context per registry
/// entry, one lane per indicator, the watchdog, the completion counter, and
/// the bound listener.
///
/// # Errors
///
/// Returns [`BootstrapError`] for the first step that fails; the reporter is
/// told about it before returning.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    registry: &IndicatorRegistry,
) -> Result<Server, BootstrapError> {
    reporter.server_starting();
    match assemble(loader, Arc::clone(&reporter), registry) {
        Ok(server) => Ok(server),
        Err(error) => {
            reporter.server_failed(&error);
            Err(error)
        }
    }
}

fn assemble(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    registry: &IndicatorRegistry,
) -> Result<Server, BootstrapError> {
    let config = loader
        .load()
        .map_err(|source| BootstrapError::Configuration { source })?;
    config
        .validate()
        .map_err(|source| BootstrapError::InvalidConfiguration { source })?;
    let telemetry =
        telemetry::initialise(&config).map_err(|source| BootstrapError::Telemetry { source })?;
    let slots = registry
        .allocate_slots()
        .map_err(|source| BootstrapError::Indicators { source })?;
    let lanes = vec![LaneConfig::new(config.max_clients); slots.len()];
    let pool = WorkerPool::new(&lanes).map_err(|source| BootstrapError::Pool { source })?;
    let watchdog = Watchdog::start().map_err(|source| BootstrapError::Watchdog { source })?;
    let listener = SocketListener::bind(&config.listen_endpoint())
        .map_err(|source| BootstrapError::Listener { source })?;

    let service = ExchangeService {
        slots,
        pool,
        watchdog,
        counter: Arc::new(CompletionCounter::new()),
        reporter,
        limits: config.header_limits(),
        deadline: config.deadline(),
    };
    Ok(Server::new(config, listener, service, telemetry))
}
