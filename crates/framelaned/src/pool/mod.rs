//! Worker-lane pool.
//!
//! The pool owns a fixed set of lanes. Each lane is a FIFO queue served by
//! its own worker threads; with one worker per lane, tasks on a lane run
//! strictly in submission order while separate lanes progress in parallel.
//!
//! Tasks are owned values implementing [`Job`]. Submitting a task moves it
//! into the lane's queue; the worker consumes it by running it, and draining
//! the pool drops queued tasks without running them.
//!
//! Workers are tagged with a generation number. [`WorkerPool::drain_and_restart`]
//! bumps the generation so the current workers exit once their in-flight task
//! returns, joins them, and starts a fresh set.

mod errors;

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info, warn};

pub use self::errors::PoolError;

const POOL_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::pool");

/// A unit of work executed on a lane.
pub trait Job: Send + 'static {
    /// Runs the job on `lane`, consuming it.
    fn run(self, lane: usize);
}

/// Sizing for one lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneConfig {
    workers: usize,
}

impl LaneConfig {
    /// A lane served by `workers` threads. Ordering within the lane is only
    /// guaranteed for a single worker.
    #[must_use]
    pub const fn new(workers: usize) -> Self {
        Self { workers }
    }

    /// Number of worker threads serving the lane.
    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers
    }
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self::new(1)
    }
}

struct Lane<J> {
    queue: VecDeque<J>,
    running: usize,
}

struct PoolState<J> {
    accepting: bool,
    generation: u64,
    lanes: Vec<Lane<J>>,
}

impl<J> PoolState<J> {
    fn take_queued(&mut self) -> Vec<J> {
        self.lanes
            .iter_mut()
            .flat_map(|lane| lane.queue.drain(..))
            .collect()
    }
}

struct Shared<J> {
    state: Mutex<PoolState<J>>,
    wake: Vec<Condvar>,
}

impl<J> Shared<J> {
    fn lock(&self) -> MutexGuard<'_, PoolState<J>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wake_all(&self) {
        for condvar in &self.wake {
            condvar.notify_all();
        }
    }
}

/// Fixed set of lanes with dedicated worker threads.
pub struct WorkerPool<J: Job> {
    shared: Arc<Shared<J>>,
    configs: Vec<LaneConfig>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl<J: Job> WorkerPool<J> {
    /// Creates one lane per entry in `lanes` and starts every worker.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::NoWorkers`] for a lane sized zero and
    /// [`PoolError::Spawn`] when a thread cannot be started; workers that did
    /// start are stopped before returning.
    pub fn new(lanes: &[LaneConfig]) -> Result<Self, PoolError> {
        if let Some(lane) = lanes.iter().position(|config| config.workers() == 0) {
            return Err(PoolError::NoWorkers { lane });
        }
        let shared = Arc::new(Shared {
            state: Mutex::new(PoolState {
                accepting: true,
                generation: 0,
                lanes: lanes
                    .iter()
                    .map(|_| Lane {
                        queue: VecDeque::new(),
                        running: 0,
                    })
                    .collect(),
            }),
            wake: lanes.iter().map(|_| Condvar::new()).collect(),
        });
        let pool = Self {
            shared,
            configs: lanes.to_vec(),
            workers: Mutex::new(Vec::new()),
        };
        let workers = pool.spawn_workers(0)?;
        *pool.lock_workers() = workers;
        info!(
            target: POOL_TARGET,
            lanes = pool.configs.len(),
            "worker pool started"
        );
        Ok(pool)
    }

    /// Number of lanes.
    #[must_use]
    pub fn lanes(&self) -> usize {
        self.configs.len()
    }

    /// Queues `job` on `lane` and wakes the lane's workers.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ShutDown`] after [`WorkerPool::shutdown`] and
    /// [`PoolError::LaneOutOfRange`] for an unknown lane. The job is dropped
    /// in both cases.
    pub fn submit(&self, lane: usize, job: J) -> Result<(), PoolError> {
        let lanes = self.configs.len();
        let mut state = self.shared.lock();
        if !state.accepting {
            return Err(PoolError::ShutDown);
        }
        let Some(entry) = state.lanes.get_mut(lane) else {
            return Err(PoolError::LaneOutOfRange { lane, lanes });
        };
        entry.queue.push_back(job);
        drop(state);
        if let Some(condvar) = self.shared.wake.get(lane) {
            condvar.notify_one();
        }
        Ok(())
    }

    /// Tasks queued or running across all lanes.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.shared
            .lock()
            .lanes
            .iter()
            .map(|lane| lane.queue.len().saturating_add(lane.running))
            .sum()
    }

    /// Discards every queued task, waits for running tasks to return, and
    /// replaces the workers. Returns the number of discarded tasks.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ShutDown`] when the pool is already shut down and
    /// [`PoolError::Spawn`] when a replacement worker cannot be started, in
    /// which case the pool shuts itself down.
    pub fn drain_and_restart(&self) -> Result<usize, PoolError> {
        let mut workers = self.lock_workers();
        let (discarded, generation) = {
            let mut state = self.shared.lock();
            if !state.accepting {
                return Err(PoolError::ShutDown);
            }
            state.generation = state.generation.wrapping_add(1);
            (state.take_queued(), state.generation)
        };
        self.shared.wake_all();
        let count = discarded.len();
        drop(discarded);
        join_workers(workers.drain(..));

        match self.spawn_workers(generation) {
            Ok(fresh) => {
                *workers = fresh;
                debug!(
                    target: POOL_TARGET,
                    discarded = count,
                    generation,
                    "worker pool drained and restarted"
                );
                Ok(count)
            }
            Err(error) => {
                drop(workers);
                self.shutdown();
                Err(error)
            }
        }
    }

    /// Discards queued tasks and stops every worker permanently.
    pub fn shutdown(&self) {
        let mut workers = self.lock_workers();
        let discarded = {
            let mut state = self.shared.lock();
            if !state.accepting && workers.is_empty() {
                return;
            }
            state.accepting = false;
            state.generation = state.generation.wrapping_add(1);
            state.take_queued()
        };
        self.shared.wake_all();
        let count = discarded.len();
        drop(discarded);
        join_workers(workers.drain(..));
        info!(
            target: POOL_TARGET,
            discarded = count,
            "worker pool shut down"
        );
    }

    fn spawn_workers(&self, generation: u64) -> Result<Vec<JoinHandle<()>>, PoolError> {
        let mut handles = Vec::new();
        for (lane, config) in self.configs.iter().enumerate() {
            for worker in 0..config.workers() {
                let shared = Arc::clone(&self.shared);
                let spawned = thread::Builder::new()
                    .name(format!("framelane-lane-{lane}-{worker}"))
                    .spawn(move || run_worker(&shared, lane, generation));
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(source) => {
                        self.stop_generation(generation);
                        join_workers(handles.drain(..));
                        return Err(PoolError::Spawn { lane, source });
                    }
                }
            }
        }
        Ok(handles)
    }

    fn stop_generation(&self, generation: u64) {
        let mut state = self.shared.lock();
        if state.generation == generation {
            state.generation = state.generation.wrapping_add(1);
        }
        drop(state);
        self.shared.wake_all();
    }

    fn lock_workers(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<J: Job> Drop for WorkerPool<J> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn join_workers(handles: impl Iterator<Item = JoinHandle<()>>) {
    for handle in handles {
        if handle.join().is_err() {
            error!(target: POOL_TARGET, "worker thread panicked outside a job");
        }
    }
}

fn run_worker<J: Job>(shared: &Shared<J>, lane: usize, generation: u64) {
    while let Some(job) = next_job(shared, lane, generation) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| job.run(lane)));
        if let Some(entry) = shared.lock().lanes.get_mut(lane) {
            entry.running = entry.running.saturating_sub(1);
        }
        if outcome.is_err() {
            warn!(
                target: POOL_TARGET,
                lane,
                "job panicked; lane continues with the next task"
            );
        }
    }
}

fn next_job<J>(shared: &Shared<J>, lane: usize, generation: u64) -> Option<J> {
    let condvar = shared.wake.get(lane)?;
    let mut state = shared.lock();
    loop {
        if state.generation != generation {
            return None;
        }
        let entry = state.lanes.get_mut(lane)?;
        if let Some(job) = entry.queue.pop_front() {
            entry.running = entry.running.saturating_add(1);
            return Some(job);
        }
        state = condvar.wait(state).unwrap_or_else(PoisonError::into_inner);
    }
}
