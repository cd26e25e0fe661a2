//! Errors raised by the worker-lane pool.

use std::io;

use thiserror::Error;

/// Failures creating the pool or submitting work to it.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The pool was shut down and accepts no further work.
    #[error("worker pool is shut down")]
    ShutDown,
    /// A task named a lane the pool does not have.
    #[error("lane {lane} is out of range for a pool of {lanes} lanes")]
    LaneOutOfRange {
        /// Requested lane.
        lane: usize,
        /// Number of lanes in the pool.
        lanes: usize,
    },
    /// A lane was configured without workers.
    #[error("lane {lane} must have at least one worker")]
    NoWorkers {
        /// Offending lane.
        lane: usize,
    },
    /// A worker thread could not be started.
    #[error("failed to spawn worker for lane {lane}: {source}")]
    Spawn {
        /// Lane the worker was meant to serve.
        lane: usize,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
}
