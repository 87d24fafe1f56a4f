//! Core functionality for the launchpad coordination system.
//!
//! Entity state is never stored directly. It is derived on every node by
//! folding an append-only, tag-indexed event log. This crate provides the
//! pieces of that derivation that know nothing about drones or missions:
//! the tag algebra, the event and log model, the [`Fold`] trait and the
//! twin [`Engine`] that keeps folds live as the log changes, alone or
//! composed into views over several twins.

pub mod config;
pub mod derived;
pub mod engine;
pub mod error;
pub mod event;
pub mod fold;
pub mod log;
pub mod logging;
pub mod tag;

pub use config::{Config, EngineConfig, LogConfig, NodeConfig};
pub use engine::{Engine, TwinHandle};
pub use error::{ConfigError, EngineError, LogError, Result};
pub use event::{EventKey, LogEvent, Metadata};
pub use fold::{fold_events, Fold};
pub use log::{EventLog, Ingest, LogChange, MemoryLog, Snapshot};
pub use tag::{Tag, TagExpr, TagSet};
