//! Indicators shipped with the server.

use std::thread;
use std::time::Duration;

use crate::Indicator;

/// Counts payload bytes. The value always equals the request's `total_size`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteCount;

impl Indicator for ByteCount {
    type Context = u64;

    fn name(&self) -> &str {
        "byte_count"
    }

    fn allocate(&self) -> Self::Context {
        0
    }

    fn init(&self, ctx: &mut Self::Context) {
        *ctx = 0;
    }

    fn process(&self, ctx: &mut Self::Context, data: &[u8]) {
        let len = u64::try_from(data.len()).unwrap_or(u64::MAX);
        *ctx = ctx.saturating_add(len);
    }

    fn extract(&self, ctx: &Self::Context) -> u64 {
        *ctx
    }
}

/// Wrapping sum of every payload byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteSum;

impl Indicator for ByteSum {
    type Context = u64;

    fn name(&self) -> &str {
        "byte_sum"
    }

    fn allocate(&self) -> Self::Context {
        0
    }

    fn init(&self, ctx: &mut Self::Context) {
        *ctx = 0;
    }

    fn process(&self, ctx: &mut Self::Context, data: &[u8]) {
        *ctx = data
            .iter()
            .fold(*ctx, |sum, byte| sum.wrapping_add(u64::from(*byte)));
    }

    fn extract(&self, ctx: &Self::Context) -> u64 {
        *ctx
    }
}

/// Wraps an indicator and limits it to `bytes_per_sec` of processing.
///
/// Used to simulate slow computations when exercising the deadline.
#[derive(Debug, Clone)]
pub struct Throttled<I> {
    inner: I,
    bytes_per_sec: u64,
    name: String,
}

impl<I: Indicator> Throttled<I> {
    /// Wraps `inner`, sleeping in `process` so it handles at most
    /// `bytes_per_sec` bytes per second. A rate of zero disables the delay.
    pub fn new(inner: I, bytes_per_sec: u64) -> Self {
        let name = format!("throttled_{}", inner.name());
        Self {
            inner,
            bytes_per_sec,
            name,
        }
    }

    /// Delay applied to a chunk of `len` bytes.
    #[must_use]
    pub fn delay_for(&self, len: usize) -> Duration {
        let nanos = u128::try_from(len)
            .unwrap_or(u128::MAX)
            .saturating_mul(1_000_000_000)
            .checked_div(u128::from(self.bytes_per_sec))
            .unwrap_or(0);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}

impl<I: Indicator> Indicator for Throttled<I> {
    type Context = I::Context;

    fn name(&self) -> &str {
        &self.name
    }

    fn allocate(&self) -> Self::Context {
        self.inner.allocate()
    }

    fn init(&self, ctx: &mut Self::Context) {
        self.inner.init(ctx);
    }

    fn process(&self, ctx: &mut Self::Context, data: &[u8]) {
        let delay = self.delay_for(data.len());
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        self.inner.process(ctx, data);
    }

    fn extract(&self, ctx: &Self::Context) -> u64 {
        self.inner.extract(ctx)
    }

    fn free(&self, ctx: Self::Context) {
        self.inner.free(ctx);
    }
}
