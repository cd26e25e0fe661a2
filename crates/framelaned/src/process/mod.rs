//! Process-level wiring: signal handling and the production launch path.

mod errors;
mod launch;
mod shutdown;

pub use self::errors::LaunchError;
pub use self::launch::{default_registry, run_server};
pub(crate) use self::launch::run_server_with;
pub use self::shutdown::{ShutdownError, ShutdownFlag};

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
