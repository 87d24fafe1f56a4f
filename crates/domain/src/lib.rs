//! Launchpad domain twins.
//!
//! This crate contains the pure state machines folded from the launchpad
//! event log, with no I/O of their own:
//! - Drone, launchpad and mission twins
//! - Existence registries used to enumerate entities
//! - The per-launchpad mission log merging launches and completions
//!
//! Every twin is a [`launchpad_core::Fold`]; emitters append the matching
//! tagged events through a [`launchpad_core::Engine`].

pub mod drone;
pub mod launchpad;
pub mod mission;
pub mod mission_log;
pub mod registry;

#[cfg(test)]
mod properties;

pub use drone::{DroneEvent, DroneTwin, DroneTwinState, Position};
pub use launchpad::{LaunchPadEvent, LaunchPadState, LaunchPadTwin};
pub use mission::{Mission, MissionEvent, MissionId, MissionTwin, MissionTwinState, Waypoint};
pub use mission_log::{CompletedMission, CurrentMission, MissionLogEvent, MissionLogState, MissionLogTwin};
pub use registry::{
    read_registry, resolve_registry, resolve_relation, DroneRegistry, LaunchPadRegistry,
    MissionRegistry, Registry, VisibleMissionRegistry,
};
