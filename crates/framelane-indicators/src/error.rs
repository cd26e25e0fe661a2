//! Errors raised while registering indicators.

use thiserror::Error;

/// Failures building the indicator registry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The indicator reported an empty name.
    #[error("indicator at position {position} has an empty name")]
    EmptyName {
        /// Registry position the indicator would have taken.
        position: usize,
    },
    /// Another indicator with the same name is already registered.
    #[error("indicator '{name}' is already registered")]
    Duplicate {
        /// Conflicting name.
        name: String,
    },
    /// Contexts were requested from a registry with no indicators.
    #[error("no indicators are registered")]
    Empty,
}
