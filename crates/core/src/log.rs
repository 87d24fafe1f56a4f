//! Event log interface and in-process reference log.
//!
//! The replicated log itself (transport, storage, gossip) lives outside this
//! crate. [`EventLog`] is the surface the twin engine needs from it:
//!
//! - `append` for local emission
//! - `ingest` for events replicated from other nodes, in any order and
//!   possibly more than once
//! - `snapshot` for an ordered, tag-filtered read
//! - `watch` for change notification
//!
//! [`MemoryLog`] implements the interface in memory. It keeps events sorted
//! by [`EventKey`], so a late-arriving event with an earlier key is inserted
//! at its log position rather than at the end. Subscribers learn about that
//! through the change feed and refold.

use crate::error::LogError;
use crate::event::{current_timestamp, EventKey, LogEvent};
use crate::tag::{TagExpr, TagSet};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

/// Default capacity of the change feed.
pub const DEFAULT_CHANGE_BUFFER: usize = 1024;

/// Outcome of ingesting a replicated event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingest {
    /// Event landed after every event already in the log
    Appended,
    /// Event landed before the current head of the log
    Inserted,
    /// Event was already present
    Duplicate,
}

/// Ordered, tag-filtered read of the log.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Log version this snapshot reflects
    pub version: u64,
    /// Matching events in log order
    pub events: Vec<LogEvent>,
}

/// One accepted insertion, as seen on the change feed.
#[derive(Debug, Clone)]
pub struct LogChange {
    /// Log version after the insertion
    pub version: u64,
    /// Inserted event
    pub event: Arc<LogEvent>,
}

/// Interface to the replicated event log.
pub trait EventLog: Send + Sync + 'static {
    /// Identifier of the local stream.
    fn stream_id(&self) -> &str;

    /// Append a locally emitted event.
    fn append(&self, tags: TagSet, payload: serde_json::Value) -> Result<EventKey, LogError>;

    /// Accept an event replicated from another node.
    fn ingest(&self, event: LogEvent) -> Result<Ingest, LogError>;

    /// All events matching `selector`, in log order.
    fn snapshot(&self, selector: &TagExpr) -> Result<Snapshot, LogError>;

    /// Subscribe to accepted insertions.
    fn watch(&self) -> broadcast::Receiver<LogChange>;
}

#[derive(Debug, Default)]
struct LogInner {
    events: BTreeMap<EventKey, Arc<LogEvent>>,
    lamport: u64,
    next_offset: u64,
    version: u64,
}

/// In-memory event log for a single node.
#[derive(Debug)]
pub struct MemoryLog {
    stream_id: String,
    inner: RwLock<LogInner>,
    changes: broadcast::Sender<LogChange>,
}

impl MemoryLog {
    /// Create an empty log for the given local stream.
    pub fn new(stream_id: impl Into<String>) -> Self {
        Self::with_capacity(stream_id, DEFAULT_CHANGE_BUFFER)
    }

    /// Create an empty log with a custom change feed capacity.
    pub fn with_capacity(stream_id: impl Into<String>, change_buffer: usize) -> Self {
        let (changes, _) = broadcast::channel(change_buffer.max(1));
        Self {
            stream_id: stream_id.into(),
            inner: RwLock::new(LogInner::default()),
            changes,
        }
    }

    /// Number of events in the log.
    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.events.len()).unwrap_or(0)
    }

    /// Whether the log holds no events.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current log version (number of accepted insertions).
    pub fn version(&self) -> u64 {
        self.inner.read().map(|inner| inner.version).unwrap_or(0)
    }

    /// Every event in log order, for replication to a peer.
    pub fn export(&self) -> Result<Vec<LogEvent>, LogError> {
        let inner = self.inner.read().map_err(|_| LogError::Poisoned)?;
        Ok(inner.events.values().map(|e| e.as_ref().clone()).collect())
    }

    fn publish(&self, version: u64, event: Arc<LogEvent>) {
        // No receivers is fine: nothing is subscribed yet.
        let _ = self.changes.send(LogChange { version, event });
    }
}

impl EventLog for MemoryLog {
    fn stream_id(&self) -> &str {
        &self.stream_id
    }

    fn append(&self, tags: TagSet, payload: serde_json::Value) -> Result<EventKey, LogError> {
        if tags.is_empty() {
            return Err(LogError::EmptyTagSet);
        }

        let mut inner = self.inner.write().map_err(|_| LogError::Poisoned)?;
        let (lamport, next_offset) = match (inner.lamport.checked_add(1), inner.next_offset.checked_add(1)) {
            (Some(lamport), Some(next_offset)) => (lamport, next_offset),
            _ => {
                warn!(lamport = inner.lamport, offset = inner.next_offset, "Local clock exhausted");
                return Err(LogError::ClockOverflow(format!(
                    "{}@{}/{}",
                    inner.lamport, self.stream_id, inner.next_offset
                )));
            }
        };
        let key = EventKey::new(lamport, self.stream_id.clone(), inner.next_offset);
        inner.lamport = lamport;
        inner.next_offset = next_offset;
        inner.version += 1;

        let event = Arc::new(LogEvent::new(key.clone(), current_timestamp(), tags, payload));
        inner.events.insert(key.clone(), Arc::clone(&event));
        trace!(key = %key, event_type = ?event.event_type(), "Appended event");

        // Published under the write lock so the feed carries versions in order.
        self.publish(inner.version, event);
        Ok(key)
    }

    fn ingest(&self, event: LogEvent) -> Result<Ingest, LogError> {
        if event.meta.tags.is_empty() {
            return Err(LogError::EmptyTagSet);
        }

        // A key at the end of the clock would leave no room for local appends.
        let key = &event.meta.key;
        if key.lamport == u64::MAX || (key.stream == self.stream_id && key.offset == u64::MAX) {
            warn!(key = %key, "Rejected replicated event at clock limit");
            return Err(LogError::ClockOverflow(key.to_string()));
        }

        let mut inner = self.inner.write().map_err(|_| LogError::Poisoned)?;
        if inner.events.contains_key(&event.meta.key) {
            trace!(key = %event.meta.key, "Dropped duplicate delivery");
            return Ok(Ingest::Duplicate);
        }

        let behind_head = inner
            .events
            .keys()
            .next_back()
            .map(|head| event.meta.key < *head)
            .unwrap_or(false);

        inner.lamport = inner.lamport.max(event.meta.key.lamport);
        if event.meta.key.stream == self.stream_id {
            inner.next_offset = inner.next_offset.max(event.meta.key.offset + 1);
        }
        inner.version += 1;

        let event = Arc::new(event);
        inner
            .events
            .insert(event.meta.key.clone(), Arc::clone(&event));

        let outcome = if behind_head {
            Ingest::Inserted
        } else {
            Ingest::Appended
        };
        debug!(key = %event.meta.key, outcome = ?outcome, "Ingested replicated event");

        self.publish(inner.version, event);
        Ok(outcome)
    }

    fn snapshot(&self, selector: &TagExpr) -> Result<Snapshot, LogError> {
        let inner = self.inner.read().map_err(|_| LogError::Poisoned)?;
        let events = inner
            .events
            .values()
            .filter(|event| selector.matches(&event.meta.tags))
            .map(|event| event.as_ref().clone())
            .collect();
        Ok(Snapshot {
            version: inner.version,
            events,
        })
    }

    fn watch(&self) -> broadcast::Receiver<LogChange> {
        self.changes.subscribe()
    }
}
