//! Ordered registry of indicators.
//!
//! Registration order is significant: an indicator's position is its
//! [`IndicatorId`], the lane that runs it, and the slot its value occupies in
//! the response.

use std::fmt;
use std::sync::Arc;

use crate::error::RegistryError;
use crate::indicator::Indicator;
use crate::slot::{IndicatorSlot, SlotFactory};

/// Position of an indicator in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndicatorId(usize);

impl IndicatorId {
    /// Wraps a registry position.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Registry position as an index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for IndicatorId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "#{}", self.0)
    }
}

/// Fixed, ordered list of indicators supplied at startup.
#[derive(Default)]
pub struct IndicatorRegistry {
    entries: Vec<Box<dyn SlotFactory>>,
}

impl IndicatorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends an indicator and returns its position.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EmptyName`] for a blank name and
    /// [`RegistryError::Duplicate`] when the name is already taken.
    pub fn register<I: Indicator>(&mut self, indicator: I) -> Result<IndicatorId, RegistryError> {
        let id = IndicatorId::new(self.entries.len());
        let name = indicator.name().trim();
        if name.is_empty() {
            return Err(RegistryError::EmptyName {
                position: id.index(),
            });
        }
        if self.entries.iter().any(|entry| entry.name() == name) {
            return Err(RegistryError::Duplicate {
                name: name.to_owned(),
            });
        }
        self.entries.push(Box::new(Arc::new(indicator)));
        Ok(id)
    }

    /// Number of registered indicators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Indicator names in registry order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name()).collect()
    }

    /// Allocates one context per indicator, in registry order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Empty`] when no indicator is registered.
    pub fn allocate_slots(&self) -> Result<Vec<Arc<IndicatorSlot>>, RegistryError> {
        if self.entries.is_empty() {
            return Err(RegistryError::Empty);
        }
        Ok(self
            .entries
            .iter()
            .enumerate()
            .map(|(index, entry)| Arc::new(entry.allocate(IndicatorId::new(index))))
            .collect())
    }
}

impl fmt::Debug for IndicatorRegistry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("IndicatorRegistry")
            .field("indicators", &self.names())
            .finish()
    }
}
