//! Test utilities for multi-node twin tests

use launchpad_core::{Engine, EventLog, Ingest, LogEvent, MemoryLog, TwinHandle};
use std::future::Future;
use std::sync::Arc;
use tokio::time::{timeout, Duration};

/// Upper bound on how long a live twin may take to catch up.
pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Install a test-writer subscriber once per process.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("launchpad_core=debug,launchpad_domain=debug")
        .with_test_writer()
        .try_init();
}

/// One participant with its own log replica.
pub struct TestNode {
    pub log: Arc<MemoryLog>,
    pub engine: Engine<MemoryLog>,
}

impl TestNode {
    pub fn new(stream_id: &str) -> Self {
        let log = Arc::new(MemoryLog::new(stream_id));
        let engine = Engine::new(Arc::clone(&log));
        Self { log, engine }
    }

    /// Every event this node holds, in log order.
    pub fn events(&self) -> Vec<LogEvent> {
        self.log.export().unwrap()
    }

    /// Deliver `events` to this node in the given order.
    pub fn deliver(&self, events: impl IntoIterator<Item = LogEvent>) -> Vec<Ingest> {
        events
            .into_iter()
            .map(|event| self.log.ingest(event).unwrap())
            .collect()
    }

    /// Copy everything `other` holds into this node.
    pub fn pull_from(&self, other: &TestNode) -> Vec<Ingest> {
        self.deliver(other.events())
    }
}

/// Exchange events in both directions until both replicas hold the same log.
pub fn sync(a: &TestNode, b: &TestNode) {
    a.pull_from(b);
    b.pull_from(a);
}

/// Wait until `handle` publishes a state matching `pred`, failing the test
/// after [`SETTLE_TIMEOUT`].
pub async fn settle<S: Clone>(handle: &mut TwinHandle<S>, pred: impl FnMut(&S) -> bool) -> S {
    within(handle.wait_for(pred)).await.unwrap()
}

pub async fn within<T>(fut: impl Future<Output = T>) -> T {
    timeout(SETTLE_TIMEOUT, fut)
        .await
        .expect("twin did not settle in time")
}
