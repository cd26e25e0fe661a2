//! Streaming ingest loop.
//!
//! One [`Exchange`] reads a request header, resets every indicator, and
//! streams the payload into a buffer sized from the header. Whenever the
//! bytes received cross one or more frame boundaries, the newly completed
//! frames are handed to every lane as a shared [`bytes::Bytes`] chunk. Once
//! the declared size has arrived a finalize task is queued behind each
//! lane's work and the loop blocks on the [`CompletionCounter`].
//!
//! The watchdog is not driven from here: it cancels the exchange from
//! outside through the [`CancellationToken`] and the counter.

mod codec;
mod errors;
mod tasks;

use std::io::{self, Read};
use std::sync::Arc;

use bytes::BytesMut;
use framelane_indicators::IndicatorSlot;
use framelane_protocol::{FrameLayout, HeaderLimits};
use tracing::{debug, error, info};

use crate::completion::{CancellationToken, CompletionCounter, WaitOutcome};
use crate::pool::{PoolError, WorkerPool};

pub(crate) use self::codec::write_response;
pub use self::errors::{ExchangeError, InternalError, TransportError};
pub(crate) use self::tasks::LaneTask;
use self::tasks::Chunk;

const EXCHANGE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::exchange");

/// Outcome of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeSummary {
    /// Payload size declared by the request.
    pub total_size: u32,
    /// Frame size declared by the request.
    pub frame_size: u32,
    /// Indicator values in registry order.
    pub values: Vec<u64>,
    /// Lane tasks dropped because the pool refused them.
    pub dropped_tasks: usize,
}

/// Borrowed view of the server state needed to run one exchange.
pub(crate) struct Exchange<'a> {
    slots: &'a [Arc<IndicatorSlot>],
    pool: &'a WorkerPool<LaneTask>,
    counter: &'a Arc<CompletionCounter>,
    token: &'a CancellationToken,
    limits: HeaderLimits,
}

impl<'a> Exchange<'a> {
    pub(crate) const fn new(
        slots: &'a [Arc<IndicatorSlot>],
        pool: &'a WorkerPool<LaneTask>,
        counter: &'a Arc<CompletionCounter>,
        token: &'a CancellationToken,
        limits: HeaderLimits,
    ) -> Self {
        Self {
            slots,
            pool,
            counter,
            token,
            limits,
        }
    }

    /// Reads one request from `stream` and computes every indicator.
    ///
    /// The lanes must be idle and the counter reset before this is called.
    pub(crate) fn compute<S: Read>(&self, stream: &mut S) -> Result<ExchangeSummary, ExchangeError> {
        let layout = codec::read_header(stream, self.limits)
            .map_err(|error| self.cancelled_or(error, 0, 0))?;
        info!(
            target: EXCHANGE_TARGET,
            total_size = layout.total_size(),
            frame_size = layout.frame_size(),
            frames = layout.frame_count(),
            "request header accepted"
        );
        for slot in self.slots {
            slot.init();
        }
        let dropped_tasks = self.stream_frames(stream, &layout)?;
        self.finalize(layout.total_len())?;
        let values = self.slots.iter().map(|slot| slot.extract()).collect();
        Ok(ExchangeSummary {
            total_size: layout.total_size(),
            frame_size: layout.frame_size(),
            values,
            dropped_tasks,
        })
    }

    fn stream_frames<S: Read>(
        &self,
        stream: &mut S,
        layout: &FrameLayout,
    ) -> Result<usize, ExchangeError> {
        let expected = layout.total_len();
        let frame_len = layout.frame_len();
        let mut pending = BytesMut::zeroed(expected);
        let mut buffered = 0_usize;
        let mut offset = 0_usize;
        let mut dropped = 0_usize;

        while !pending.is_empty() {
            let received = offset.saturating_add(buffered);
            if self.token.is_cancelled() {
                return Err(ExchangeError::Timeout { received, expected });
            }
            let target = pending.get_mut(buffered..).unwrap_or_default();
            let read = match stream.read(target) {
                Ok(0) => {
                    let closed = TransportError::Closed { received, expected };
                    return Err(self.cancelled_or(closed.into(), received, expected));
                }
                Ok(read) => read,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    let failed = TransportError::Read { source };
                    return Err(self.cancelled_or(failed.into(), received, expected));
                }
            };
            buffered = buffered.saturating_add(read);

            let partial = buffered.checked_rem(frame_len).unwrap_or(buffered);
            let whole = buffered.saturating_sub(partial);
            if whole > 0 {
                let chunk = Chunk::new(offset, frame_len, pending.split_to(whole).freeze());
                dropped = dropped.saturating_add(self.dispatch(&chunk)?);
                debug!(
                    target: EXCHANGE_TARGET,
                    offset,
                    len = whole,
                    "frames dispatched"
                );
                offset = offset.saturating_add(whole);
                buffered = partial;
            }
        }
        Ok(dropped)
    }

    fn dispatch(&self, chunk: &Chunk) -> Result<usize, ExchangeError> {
        let mut dropped = 0_usize;
        for slot in self.slots {
            let lane = slot.id().index();
            let task = LaneTask::Process {
                slot: Arc::clone(slot),
                chunk: chunk.clone(),
            };
            match self.pool.submit(lane, task) {
                Ok(()) => {}
                Err(source @ PoolError::LaneOutOfRange { .. }) => {
                    return Err(InternalError::Pool(source).into());
                }
                Err(source) => {
                    let error = ExchangeError::Resource { lane, source };
                    error!(
                        target: EXCHANGE_TARGET,
                        indicator = slot.name(),
                        error = %error,
                        "dropping lane task; indicator input is incomplete"
                    );
                    dropped = dropped.saturating_add(1);
                }
            }
        }
        Ok(dropped)
    }

    fn finalize(&self, expected: usize) -> Result<(), ExchangeError> {
        for slot in self.slots {
            let lane = slot.id().index();
            let task = LaneTask::Finalize {
                counter: Arc::clone(self.counter),
            };
            self.pool
                .submit(lane, task)
                .map_err(|source| match source {
                    PoolError::LaneOutOfRange { .. } => InternalError::Pool(source).into(),
                    other => ExchangeError::Resource {
                        lane,
                        source: other,
                    },
                })?;
        }
        debug!(target: EXCHANGE_TARGET, "waiting for indicators to finish");
        match self.counter.wait(self.slots.len()) {
            WaitOutcome::Completed => Ok(()),
            WaitOutcome::TimedOut => Err(ExchangeError::Timeout {
                received: expected,
                expected,
            }),
        }
    }

    /// Reports a transport failure caused by the watchdog closing the
    /// connection as a timeout.
    fn cancelled_or(&self, error: ExchangeError, received: usize, expected: usize) -> ExchangeError {
        if self.token.is_cancelled() {
            ExchangeError::Timeout { received, expected }
        } else {
            error
        }
    }
}

#[cfg(test)]
mod tests;
