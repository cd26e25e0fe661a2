//! Test configuration loaders for scenarios covering success and failure paths.

use std::ffi::OsString;
use std::sync::Arc;

use framelane_config::Config;
use ortho_config::OrthoError;

use crate::bootstrap::ConfigLoader;

/// Loopback configuration on an ephemeral port with a small size limit.
#[must_use]
pub fn test_config(deadline_secs: u64) -> Config {
    Config {
        listen_port: 0,
        deadline_secs,
        max_file_size: 4096,
        log_filter: String::from("warn"),
        ..Config::default()
    }
}

/// Loader that intentionally fails by passing an invalid port.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("framelaned"),
            OsString::from("--listen-port"),
            OsString::from("not-a-port"),
        ];
        Config::load_from_iter(args)
    }
}
