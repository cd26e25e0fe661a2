//! Shared harness for the server test suites.

mod client;
mod config_loader;
mod indicators;
mod reporter;
mod world;

pub use self::client::{declare_only, send_partial, send_request};
pub use self::config_loader::{FailingConfigLoader, test_config};
pub use self::indicators::{recording_registry, throttled_registry};
pub use self::reporter::{HealthEvent, RecordingHealthReporter};
pub use self::world::{TestWorld, eventually, world};
