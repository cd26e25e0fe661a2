//! Type-erased binding of one indicator to its long-lived context.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::warn;

use crate::{INDICATORS_TARGET, Indicator, IndicatorId};

/// Object-safe view of an indicator bound to its context.
trait BoundContext: Send {
    fn init(&mut self);
    fn process(&mut self, data: &[u8]);
    fn extract(&self) -> u64;
}

struct Bound<I: Indicator> {
    indicator: Arc<I>,
    ctx: Option<I::Context>,
}

impl<I: Indicator> BoundContext for Bound<I> {
    fn init(&mut self) {
        if let Some(ctx) = self.ctx.as_mut() {
            self.indicator.init(ctx);
        }
    }

    fn process(&mut self, data: &[u8]) {
        if let Some(ctx) = self.ctx.as_mut() {
            self.indicator.process(ctx, data);
        }
    }

    fn extract(&self) -> u64 {
        self.ctx
            .as_ref()
            .map_or(0, |ctx| self.indicator.extract(ctx))
    }
}

impl<I: Indicator> Drop for Bound<I> {
    fn drop(&mut self) {
        if let Some(ctx) = self.ctx.take() {
            self.indicator.free(ctx);
        }
    }
}

/// Registry entry able to allocate the slot for its indicator.
pub(crate) trait SlotFactory: Send + Sync {
    fn name(&self) -> &str;
    fn allocate(&self, id: IndicatorId) -> IndicatorSlot;
}

impl<I: Indicator> SlotFactory for Arc<I> {
    fn name(&self) -> &str {
        self.as_ref().name().trim()
    }

    fn allocate(&self, id: IndicatorId) -> IndicatorSlot {
        let ctx = self.as_ref().allocate();
        IndicatorSlot {
            id,
            name: SlotFactory::name(self).to_owned(),
            context: Mutex::new(Box::new(Bound {
                indicator: Arc::clone(self),
                ctx: Some(ctx),
            })),
        }
    }
}

/// One indicator's context, allocated at startup and reused across
/// exchanges.
///
/// Every method takes `&self` so a slot can be shared between the ingest
/// thread (`init`, `extract`) and its lane worker (`process`). The internal
/// lock is uncontended while each lane has a single worker. The context is
/// freed when the last reference to the slot is dropped.
pub struct IndicatorSlot {
    id: IndicatorId,
    name: String,
    context: Mutex<Box<dyn BoundContext>>,
}

impl IndicatorSlot {
    /// Registry position of the indicator.
    #[must_use]
    pub const fn id(&self) -> IndicatorId {
        self.id
    }

    /// Indicator name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resets the context for a new exchange.
    pub fn init(&self) {
        self.lock().init();
    }

    /// Folds one chunk of whole frames into the context.
    pub fn process(&self, data: &[u8]) {
        self.lock().process(data);
    }

    /// Folds `data` one frame at a time, holding the context for the whole
    /// run. A `frame_len` of zero is treated as one.
    pub fn process_frames(&self, data: &[u8], frame_len: usize) {
        let mut bound = self.lock();
        for frame in data.chunks(frame_len.max(1)) {
            bound.process(frame);
        }
    }

    /// Reads the indicator value.
    #[must_use]
    pub fn extract(&self) -> u64 {
        self.lock().extract()
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn BoundContext>> {
        self.context.lock().unwrap_or_else(|poisoned| {
            warn!(
                target: INDICATORS_TARGET,
                indicator = %self.name,
                "recovering context after a panicked call"
            );
            PoisonError::into_inner(poisoned)
        })
    }
}

impl fmt::Debug for IndicatorSlot {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("IndicatorSlot")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
