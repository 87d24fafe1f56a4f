//! Event model for the replicated, append-only log.
//!
//! Events are immutable. Their position in the log is given by an
//! [`EventKey`], which orders events from all nodes into one total order:
//! first by Lamport time, then by originating stream, then by offset within
//! that stream. Folds always see events in this order, never in arrival
//! order.

use crate::tag::TagSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of an event in the total log order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventKey {
    /// Lamport clock value at emission
    pub lamport: u64,
    /// Identifier of the emitting node's stream
    pub stream: String,
    /// Offset within the emitting stream
    pub offset: u64,
}

impl EventKey {
    /// Create a new event key.
    pub fn new(lamport: u64, stream: impl Into<String>, offset: u64) -> Self {
        Self {
            lamport,
            stream: stream.into(),
            offset,
        }
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.lamport, self.stream, self.offset)
    }
}

/// Metadata attached to every logged event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Log position
    pub key: EventKey,
    /// Emission time (Unix epoch milliseconds), for record keeping only
    pub timestamp: u64,
    /// Tags the event was emitted with
    pub tags: TagSet,
}

/// An event as stored in the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Position, time and tags
    pub meta: Metadata,
    /// Event payload, a serde-tagged record `{ "eventType": ..., ... }`
    pub payload: serde_json::Value,
}

impl LogEvent {
    /// Build an event from its parts.
    pub fn new(key: EventKey, timestamp: u64, tags: TagSet, payload: serde_json::Value) -> Self {
        Self {
            meta: Metadata {
                key,
                timestamp,
                tags,
            },
            payload,
        }
    }

    /// Log position of this event.
    pub fn key(&self) -> &EventKey {
        &self.meta.key
    }

    /// The `eventType` discriminant of the payload, if present.
    pub fn event_type(&self) -> Option<&str> {
        self.payload.get("eventType").and_then(|v| v.as_str())
    }

    /// Decode the payload into a typed event family.
    pub fn decode<E: serde::de::DeserializeOwned>(&self) -> Result<E, serde_json::Error> {
        E::deserialize(&self.payload)
    }
}

/// Get current timestamp in milliseconds.
pub fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
