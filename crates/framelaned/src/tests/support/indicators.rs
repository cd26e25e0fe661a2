//! Indicators that record what the lanes hand them.

use std::sync::{Arc, Mutex};

use framelane_indicators::{Indicator, IndicatorRegistry, Throttled};

/// Chunks observed by one indicator, in call order.
pub type CallLog = Arc<Mutex<Vec<Vec<u8>>>>;

/// Sums chunk sizes and records every chunk.
pub struct Recorder {
    name: String,
    calls: CallLog,
}

impl Recorder {
    /// Builds a recorder writing into `calls`.
    pub fn new(name: impl Into<String>, calls: CallLog) -> Self {
        Self {
            name: name.into(),
            calls,
        }
    }
}

impl Indicator for Recorder {
    type Context = u64;

    fn name(&self) -> &str {
        &self.name
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

/// Registry of `count` recorders plus the logs they write to.
#[must_use]
pub fn recording_registry(count: usize) -> (IndicatorRegistry, Vec<CallLog>) {
    registry_of(count, |recorder| recorder)
}

/// Registry of `count` recorders, each limited to `bytes_per_sec`.
#[must_use]
pub fn throttled_registry(count: usize, bytes_per_sec: u64) -> (IndicatorRegistry, Vec<CallLog>) {
    registry_of(count, |recorder| Throttled::new(recorder, bytes_per_sec))
}

fn registry_of<I: Indicator>(
    count: usize,
    wrap: impl Fn(Recorder) -> I,
) -> (IndicatorRegistry, Vec<CallLog>) {
    let mut registry = IndicatorRegistry::new();
    let mut logs = Vec::new();
    for index in 0..count {
        let calls = CallLog::default();
        logs.push(Arc::clone(&calls));
        registry
            .register(wrap(Recorder::new(format!("recorder-{index}"), calls)))
            .expect("register recorder");
    }
    (registry, logs)
}
