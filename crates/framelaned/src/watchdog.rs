//! Deadline watchdog bounding each exchange.
//!
//! A single timer thread lives for the whole server lifetime. Arming it
//! installs a [`Tripwire`] and a deadline; if the deadline passes before
//! [`Watchdog::disarm`] is called, the tripwire is triggered exactly once.

use std::fmt;
use std::io;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, error, warn};

const WATCHDOG_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::watchdog");

/// Action taken when an exchange overruns its deadline.
///
/// Implementations run on the timer thread while the watchdog lock is held,
/// so they must only flag, signal, and close handles.
pub trait Tripwire: Send {
    /// Aborts the exchange the tripwire was armed for.
    fn trip(&self);
}

/// Errors raised by the watchdog.
#[derive(Debug, Error)]
pub enum WatchdogError {
    /// The timer thread could not be started.
    #[error("failed to spawn watchdog thread: {source}")]
    Spawn {
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
    /// The watchdog was armed after it had been stopped.
    #[error("watchdog is stopped")]
    Stopped,
    /// The deadline cannot be represented as an instant.
    #[error("deadline of {duration:?} is out of range")]
    DeadlineOutOfRange {
        /// Requested deadline.
        duration: Duration,
    },
}

/// State observed when disarming the watchdog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disarmed {
    /// The timer was cancelled before its deadline.
    Cancelled,
    /// The deadline passed and the tripwire was triggered.
    Fired,
    /// Nothing was armed.
    Idle,
}

struct Armed {
    deadline: Instant,
    tripwire: Box<dyn Tripwire>,
}

#[derive(Default)]
struct TimerState {
    armed: Option<Armed>,
    fired: bool,
    stopped: bool,
}

#[derive(Default)]
struct Shared {
    state: Mutex<TimerState>,
    changed: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, TimerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One-shot deadline timer reused across exchanges.
pub struct Watchdog {
    shared: Arc<Shared>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl Watchdog {
    /// Starts the timer thread.
    ///
    /// # Errors
    ///
    /// Returns [`WatchdogError::Spawn`] when the thread cannot be created.
    pub fn start() -> Result<Self, WatchdogError> {
        let shared = Arc::new(Shared::default());
        let worker = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name(String::from("framelane-watchdog"))
            .spawn(move || run_timer(&worker))
            .map_err(|source| WatchdogError::Spawn { source })?;
        Ok(Self {
            shared,
            thread: Mutex::new(Some(handle)),
        })
    }

    /// Arms the timer to trigger `tripwire` after `duration`, replacing any
    /// previous arming.
    ///
    /// # Errors
    ///
    /// Returns [`WatchdogError::Stopped`] after [`Watchdog::stop`] and
    /// [`WatchdogError::DeadlineOutOfRange`] for an unrepresentable deadline.
    pub fn arm(&self, duration: Duration, tripwire: Box<dyn Tripwire>) -> Result<(), WatchdogError> {
        let deadline = Instant::now()
            .checked_add(duration)
            .ok_or(WatchdogError::DeadlineOutOfRange { duration })?;
        let mut state = self.shared.lock();
        if state.stopped {
            return Err(WatchdogError::Stopped);
        }
        state.armed = Some(Armed { deadline, tripwire });
        state.fired = false;
        drop(state);
        self.shared.changed.notify_all();
        debug!(
            target: WATCHDOG_TARGET,
            deadline_ms = duration.as_millis(),
            "watchdog armed"
        );
        Ok(())
    }

    /// Cancels the pending deadline. Once this returns the tripwire of the
    /// previous arming will not be triggered.
    pub fn disarm(&self) -> Disarmed {
        let mut state = self.shared.lock();
        let outcome = if state.armed.take().is_some() {
            Disarmed::Cancelled
        } else if state.fired {
            Disarmed::Fired
        } else {
            Disarmed::Idle
        };
        state.fired = false;
        drop(state);
        self.shared.changed.notify_all();
        outcome
    }

    /// Stops the timer thread, discarding any pending deadline.
    pub fn stop(&self) {
        {
            let mut state = self.shared.lock();
            state.stopped = true;
            state.armed = None;
        }
        self.shared.changed.notify_all();
        let handle = self
            .thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle
            && handle.join().is_err()
        {
            error!(target: WATCHDOG_TARGET, "watchdog thread panicked");
        }
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for Watchdog {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.lock();
        formatter
            .debug_struct("Watchdog")
            .field("armed", &state.armed.is_some())
            .field("stopped", &state.stopped)
            .finish()
    }
}

fn run_timer(shared: &Shared) {
    let mut state = shared.lock();
    while !state.stopped {
        let Some(deadline) = state.armed.as_ref().map(|armed| armed.deadline) else {
            state = shared
                .changed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
            continue;
        };
        let now = Instant::now();
        if now >= deadline {
            if let Some(armed) = state.armed.take() {
                warn!(target: WATCHDOG_TARGET, "exchange deadline exceeded");
                armed.tripwire.trip();
                state.fired = true;
            }
            continue;
        }
        state = shared
            .changed
            .wait_timeout(state, deadline.saturating_duration_since(now))
            .unwrap_or_else(PoisonError::into_inner)
            .0;
    }
}
