//! Unit tests for the streaming ingest loop over in-memory streams.

use std::io::{self, Cursor, Read};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use framelane_indicators::{ByteSum, Indicator, IndicatorRegistry, IndicatorSlot};
use framelane_protocol::{HEADER_LEN, HeaderLimits, MessageHeader, ProtocolError, decode_response};
use rstest::{fixture, rstest};

use super::*;
use crate::pool::LaneConfig;

type CallLog = Arc<Mutex<Vec<Vec<u8>>>>;

/// Sums chunk sizes and records every chunk it is handed.
struct Recorder {
    name: &'static str,
    calls: CallLog,
}

impl Indicator for Recorder {
    type Context = u64;

    fn name(&self) -> &str {
        self.name
    }

    fn allocate(&self) -> Self::Context {
        0
    }

    fn init(&self, ctx: &mut Self::Context) {
        *ctx = 0;
    }

    fn process(&self, ctx: &mut Self::Context, data: &[u8]) {
        self.calls.lock().expect("call log").push(data.to_vec());
        *ctx += data.len() as u64;
    }

    fn extract(&self, ctx: &Self::Context) -> u64 {
        *ctx
    }
}

/// Yields at most `step` bytes per read.
struct Trickle {
    inner: Cursor<Vec<u8>>,
    step: usize,
}

impl Read for Trickle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len().min(self.step);
        self.inner.read(&mut buf[..len])
    }
}

struct Harness {
    slots: Vec<Arc<IndicatorSlot>>,
    pool: WorkerPool<LaneTask>,
    counter: Arc<CompletionCounter>,
    token: CancellationToken,
    logs: Vec<CallLog>,
}

impl Harness {
    fn new(recorders: usize) -> Self {
        let mut registry = IndicatorRegistry::new();
        let mut logs = Vec::new();
        for name in ["first", "second", "third"].into_iter().take(recorders) {
            let calls = CallLog::default();
            logs.push(Arc::clone(&calls));
            registry
                .register(Recorder { name, calls })
                .expect("register recorder");
        }
        registry.register(ByteSum).expect("register byte_sum");
        let slots = registry.allocate_slots().expect("allocate slots");
        let pool = WorkerPool::new(&vec![LaneConfig::default(); slots.len()]).expect("pool");
        Self {
            slots,
            pool,
            counter: Arc::new(CompletionCounter::new()),
            token: CancellationToken::new(),
            logs,
        }
    }

    fn exchange(&self) -> Exchange<'_> {
        Exchange::new(
            &self.slots,
            &self.pool,
            &self.counter,
            &self.token,
            HeaderLimits::new(1024),
        )
    }

    fn run<S: Read>(&self, stream: &mut S) -> Result<ExchangeSummary, ExchangeError> {
        self.counter.reset();
        self.exchange().compute(stream)
    }

    fn calls(&self, recorder: usize) -> Vec<Vec<u8>> {
        self.logs[recorder].lock().expect("call log").clone()
    }
}

#[fixture]
fn harness() -> Harness {
    Harness::new(2)
}

fn request(total_size: u32, frame_size: u32) -> Vec<u8> {
    let mut bytes = MessageHeader::request(total_size, frame_size).to_bytes().to_vec();
    bytes.extend((0..total_size).map(|index| (index % 251) as u8));
    bytes
}

#[rstest]
fn two_frames_yield_two_ordered_calls(harness: Harness) {
    let summary = harness
        .run(&mut Cursor::new(request(64, 32)))
        .expect("exchange succeeds");

    let calls = harness.calls(0);
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|call| call.len() == 32));
    assert_eq!(calls[0].first(), Some(&0));
    assert_eq!(calls[1].first(), Some(&32));
    assert_eq!(summary.values[0], 64);
    assert_eq!(summary.dropped_tasks, 0);
}

#[rstest]
#[case::whole_reads(usize::MAX)]
#[case::byte_reads(1)]
#[case::straddling_reads(7)]
fn every_indicator_sees_the_same_frames(harness: Harness, #[case] step: usize) {
    let mut stream = Trickle {
        inner: Cursor::new(request(96, 8)),
        step,
    };
    harness.run(&mut stream).expect("exchange succeeds");

    let first = harness.calls(0);
    assert_eq!(first.len(), 12);
    assert_eq!(first.concat(), request(96, 8)[HEADER_LEN..].to_vec());
    assert_eq!(harness.calls(1), first);
}

#[rstest]
fn values_are_reported_in_registry_order(harness: Harness) {
    let payload = request(16, 4);
    let expected_sum: u64 = payload[HEADER_LEN..].iter().map(|byte| u64::from(*byte)).sum();
    let summary = harness
        .run(&mut Cursor::new(payload))
        .expect("exchange succeeds");
    assert_eq!(summary.values, vec![16, 16, expected_sum]);
}

#[rstest]
fn oversize_header_is_rejected_before_payload(harness: Harness) {
    let mut stream = Cursor::new(request(2048, 32));
    let error = harness.run(&mut stream).expect_err("too large");
    assert!(matches!(
        error,
        ExchangeError::Protocol(ProtocolError::PayloadTooLarge { size: 2048, max: 1024 })
    ));
    assert_eq!(stream.position(), HEADER_LEN as u64);
    assert!(harness.calls(0).is_empty());
}

#[rstest]
fn short_payload_aborts_with_transport_error(harness: Harness) {
    let mut bytes = request(64, 16);
    bytes.truncate(HEADER_LEN + 40);
    let error = harness
        .run(&mut Cursor::new(bytes))
        .expect_err("payload is short");
    assert!(matches!(
        error,
        ExchangeError::Transport(TransportError::Closed {
            received: 40,
            expected: 64
        })
    ));
    assert_eq!(error.kind(), "transport");
}

#[rstest]
fn cancelled_token_reports_timeout(harness: Harness) {
    harness.token.cancel();
    let mut bytes = request(64, 16);
    bytes.truncate(HEADER_LEN);
    let error = harness
        .run(&mut Cursor::new(bytes))
        .expect_err("exchange was cancelled");
    assert!(matches!(error, ExchangeError::Timeout { received: 0, .. }));
}

#[rstest]
fn consecutive_exchanges_do_not_leak_state(harness: Harness) {
    let first = harness
        .run(&mut Cursor::new(request(128, 16)))
        .expect("first exchange");
    let second = harness
        .run(&mut Cursor::new(request(128, 16)))
        .expect("second exchange");
    assert_eq!(first, second);
}

#[rstest]
fn response_round_trips_values(harness: Harness) {
    let summary = harness
        .run(&mut Cursor::new(request(32, 32)))
        .expect("exchange succeeds");
    let mut written = Vec::new();
    write_response(&mut written, &summary.values).expect("write response");
    assert_eq!(decode_response(&written), Ok(summary.values));
}

#[rstest]
fn refused_tasks_are_dropped_and_counted(harness: Harness) {
    harness.pool.shutdown();
    let chunk = Chunk::new(0, 8, Bytes::from(vec![1_u8; 16]));

    let dropped = harness
        .exchange()
        .dispatch(&chunk)
        .expect("refused process tasks are only logged");

    assert_eq!(dropped, harness.slots.len());
    assert!(harness.calls(0).is_empty());
}

#[rstest]
fn refused_finalize_aborts_with_resource_error(harness: Harness) {
    harness.pool.shutdown();

    let error = harness
        .run(&mut Cursor::new(request(16, 8)))
        .expect_err("finalize cannot be queued");

    assert!(matches!(
        error,
        ExchangeError::Resource {
            lane: 0,
            source: PoolError::ShutDown
        }
    ));
    assert_eq!(error.kind(), "resource");
    assert!(harness.calls(0).is_empty());
    assert!(harness.calls(1).is_empty());
}
