//! Completion synchronizer shared by lane workers, the ingest loop, and the
//! watchdog.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// Result of waiting for the lanes of one exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Every lane signalled completion.
    Completed,
    /// The exchange was cancelled before every lane finished.
    TimedOut,
}

#[derive(Debug, Default)]
struct CounterState {
    completed: usize,
    cancelled: bool,
}

/// Counts finished lanes and carries the cancellation raised by the
/// watchdog.
///
/// Cancellation takes precedence: once [`CompletionCounter::cancel`] has been
/// called, [`CompletionCounter::wait`] reports [`WaitOutcome::TimedOut`] even
/// if every lane has also signalled.
#[derive(Debug, Default)]
pub struct CompletionCounter {
    state: Mutex<CounterState>,
    changed: Condvar,
}

impl CompletionCounter {
    /// Creates a counter with no signals recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one finished lane.
    pub fn signal(&self) {
        let mut state = self.lock();
        state.completed = state.completed.saturating_add(1);
        drop(state);
        self.changed.notify_all();
    }

    /// Cancels the current exchange and wakes the waiter.
    pub fn cancel(&self) {
        self.lock().cancelled = true;
        self.changed.notify_all();
    }

    /// Blocks until `expected` lanes have signalled or the exchange is
    /// cancelled.
    pub fn wait(&self, expected: usize) -> WaitOutcome {
        let state = self
            .changed
            .wait_while(self.lock(), |state| {
                !state.cancelled && state.completed < expected
            })
            .unwrap_or_else(PoisonError::into_inner);
        if state.cancelled {
            WaitOutcome::TimedOut
        } else {
            WaitOutcome::Completed
        }
    }

    /// Clears signals left over from the previous exchange. Returns the
    /// number of completion signals discarded.
    pub fn reset(&self) -> usize {
        let mut state = self.lock();
        let leftover = state.completed;
        *state = CounterState::default();
        leftover
    }

    fn lock(&self) -> MutexGuard<'_, CounterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cooperative cancellation flag checked by the ingest loop between reads.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the token as cancelled.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once [`CancellationToken::cancel`] has been called on
    /// any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
