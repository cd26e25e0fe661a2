//! The capability contract every indicator implements.

/// A pluggable computation over a streamed payload.
///
/// The five capabilities are all required: `allocate`, `init`, `process`,
/// `extract`, and `free` (which defaults to dropping the context).
///
/// `process` sees the payload in frame-aligned chunks and must not assume it
/// receives the whole file at once. The server guarantees that calls against
/// one context are totally ordered, so implementations need no internal
/// locking.
pub trait Indicator: Send + Sync + 'static {
    /// Accumulator state for one exchange.
    type Context: Send + 'static;

    /// Stable name used in logs and for duplicate detection.
    fn name(&self) -> &str;

    /// Allocates a fresh context. Called once per server lifetime.
    fn allocate(&self) -> Self::Context;

    /// Resets `ctx` to its default state before an exchange.
    fn init(&self, ctx: &mut Self::Context);

    /// Folds one chunk of whole frames into `ctx`.
    fn process(&self, ctx: &mut Self::Context, data: &[u8]);

    /// Reads the final value after every `process` call has returned.
    fn extract(&self, ctx: &Self::Context) -> u64;

    /// Releases `ctx` at server shutdown.
    fn free(&self, ctx: Self::Context) {
        drop(ctx);
    }
}
