//! Supervises server launch sequencing and runtime orchestration.

use std::sync::Arc;

use framelane_indicators::{ByteCount, ByteSum, IndicatorRegistry, RegistryError, Throttled};
use tracing::info;

use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::health::{HealthReporter, StructuredHealthReporter};

use super::errors::LaunchError;
use super::shutdown::ShutdownFlag;
use super::PROCESS_TARGET;

/// Processing rate of the simulated workload indicator, in bytes per second.
const SIMULATED_RATE: u64 = 5_000_000;

/// Indicators served by the `framelaned` binary, in response order.
///
/// # Errors
///
/// Returns [`RegistryError`] if two built-ins share a name.
pub fn default_registry() -> Result<IndicatorRegistry, RegistryError> {
    let mut registry = IndicatorRegistry::new();
    registry.register(ByteCount)?;
    registry.register(ByteSum)?;
    registry.register(Throttled::new(ByteCount, SIMULATED_RATE))?;
    Ok(registry)
}

/// Runs the server using the production collaborators until a termination
/// signal arrives.
///
/// # Errors
///
/// Returns [`LaunchError`] when setup fails or the listener stops abnormally.
pub fn run_server() -> Result<(), LaunchError> {
    let shutdown = ShutdownFlag::new();
    shutdown.register_signals()?;
    let registry = default_registry()?;
    run_server_with(
        &SystemConfigLoader,
        Arc::new(StructuredHealthReporter::new()),
        &registry,
        shutdown,
    )
}

pub(crate) fn run_server_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    registry: &IndicatorRegistry,
    shutdown: ShutdownFlag,
) -> Result<(), LaunchError> {
    let server = bootstrap_with(loader, reporter, registry)?;
    info!(
        target: PROCESS_TARGET,
        indicators = ?server.indicator_names(),
        "starting server runtime"
    );
    let running = server.start(shutdown)?;
    running.join()?;
    info!(target: PROCESS_TARGET, "shutdown sequence completed");
    Ok(())
}
