//! Indicator plugin interface for the framelane computation server.
//!
//! An indicator consumes a streamed payload incrementally and produces one
//! `u64` summary. Implementations provide the [`Indicator`] trait; the server
//! registers them, in order, in an [`IndicatorRegistry`] at startup. The
//! registry position of an indicator is its lane number and its slot in the
//! response.
//!
//! # Lifecycle
//!
//! Each registered indicator gets exactly one context, allocated once when
//! the server starts and wrapped in an [`IndicatorSlot`]:
//!
//! 1. `init` resets the context at the start of every exchange.
//! 2. `process` folds frame-aligned chunks in file order. Calls for one
//!    indicator never overlap; calls for different indicators may run in
//!    parallel.
//! 3. `extract` reads the value once all `process` calls have returned.
//! 4. `free` releases the context when the server shuts down.
//!
//! # Example
//!
//! ```rust
//! use framelane_indicators::{ByteCount, IndicatorRegistry};
//!
//! let mut registry = IndicatorRegistry::new();
//! registry.register(ByteCount).expect("registration succeeds");
//! let slots = registry.allocate_slots().expect("one slot per indicator");
//!
//! let slot = &slots[0];
//! slot.init();
//! slot.process(&[0; 32]);
//! slot.process(&[0; 32]);
//! assert_eq!(slot.extract(), 64);
//! ```

mod builtin;
mod error;
mod indicator;
pub mod registry;
mod slot;

pub use self::builtin::{ByteCount, ByteSum, Throttled};
pub use self::error::RegistryError;
pub use self::indicator::Indicator;
pub use self::registry::{IndicatorId, IndicatorRegistry};
pub use self::slot::IndicatorSlot;

const INDICATORS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::slot");
