//! Defines the error surface for launching and supervising the server.

use thiserror::Error;

use framelane_indicators::RegistryError;

use crate::bootstrap::BootstrapError;
use crate::transport::ListenerError;

use super::shutdown::ShutdownError;

/// Errors surfaced while launching or supervising the server process.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The built-in indicators could not be registered.
    #[error("failed to register indicators: {0}")]
    Registry(#[from] RegistryError),
    /// Installing signal handlers failed.
    #[error(transparent)]
    Shutdown(#[from] ShutdownError),
    /// Bootstrap failed.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    /// The listener failed to start or stopped abnormally.
    #[error("listener failure: {0}")]
    Listener(#[from] ListenerError),
}
