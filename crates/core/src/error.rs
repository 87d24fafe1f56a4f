//! Core error types

use thiserror::Error;

/// Errors raised by an event log backend.
#[derive(Debug, Error)]
pub enum LogError {
    /// Events must carry at least one tag
    #[error("Cannot emit an event without tags")]
    EmptyTagSet,

    /// Payload could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Lamport clock or stream offset cannot advance any further
    #[error("Clock overflow at event {0}")]
    ClockOverflow(String),

    /// Internal lock poisoned by a panicking writer
    #[error("Event log lock poisoned")]
    Poisoned,

    /// Backend cannot accept or serve events right now
    #[error("Event log unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by the twin engine.
///
/// Folding itself never fails; these only come from emitting or from the
/// log backing a read.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Log operation failed
    #[error("Log error: {0}")]
    Log(#[from] LogError),

    /// Subscription task ended before it could be cancelled cleanly
    #[error("Twin {twin} terminated unexpectedly")]
    TwinTerminated {
        /// Twin name and id
        twin: String,
    },
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[cfg(feature = "toml")]
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Semantically invalid configuration
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Core result type
pub type Result<T> = std::result::Result<T, EngineError>;
