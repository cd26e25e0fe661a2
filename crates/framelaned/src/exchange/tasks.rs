//! Tasks queued on indicator lanes.

use std::sync::Arc;

use bytes::Bytes;
use framelane_indicators::IndicatorSlot;
use tracing::debug;

use crate::completion::CompletionCounter;
use crate::pool::Job;

use super::EXCHANGE_TARGET;

/// A contiguous run of whole frames, shared by every lane.
#[derive(Debug, Clone)]
pub(crate) struct Chunk {
    offset: usize,
    frame_len: usize,
    data: Bytes,
}

impl Chunk {
    pub(crate) const fn new(offset: usize, frame_len: usize, data: Bytes) -> Self {
        Self {
            offset,
            frame_len,
            data,
        }
    }
}

/// Work for one indicator lane.
#[derive(Debug)]
pub(crate) enum LaneTask {
    /// Fold a chunk into the lane's indicator.
    Process {
        slot: Arc<IndicatorSlot>,
        chunk: Chunk,
    },
    /// Report that every earlier task on the lane has run.
    Finalize { counter: Arc<CompletionCounter> },
}

impl Job for LaneTask {
    fn run(self, lane: usize) {
        match self {
            Self::Process { slot, chunk } => {
                debug!(
                    target: EXCHANGE_TARGET,
                    lane,
                    indicator = slot.name(),
                    offset = chunk.offset,
                    len = chunk.data.len(),
                    "processing chunk"
                );
                slot.process_frames(&chunk.data, chunk.frame_len);
            }
            Self::Finalize { counter } => counter.signal(),
        }
    }
}
