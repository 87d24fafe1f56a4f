//! Existence registries.
//!
//! A registry folds a milestone tag stream into the set of entity ids that
//! reached it, so callers can enumerate drones, launchpads and missions
//! without knowing their ids up front.

use crate::drone::{DroneEvent, DRONE_DEFINED, DRONE_READY};
use crate::launchpad::{LaunchPadEvent, LAUNCHPAD_REGISTERED};
use crate::mission::{MissionEvent, MISSION};
use launchpad_core::{Engine, EventLog, Fold, Metadata, Result, TagExpr, TwinHandle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Ordered set of entity ids.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry(BTreeSet<String>);

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(mut self, id: impl Into<String>) -> Self {
        self.0.insert(id.into());
        self
    }

    pub fn remove(mut self, id: &str) -> Self {
        self.0.remove(id);
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Registry {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Registry(iter.into_iter().map(Into::into).collect())
    }
}

/// All drones that were ever defined or reported ready.
#[derive(Clone, Debug, Default)]
pub struct DroneRegistry;

impl Fold for DroneRegistry {
    type State = Registry;
    type Event = DroneEvent;

    fn name(&self) -> &str {
        "drone.registry"
    }

    fn id(&self) -> &str {
        "all"
    }

    fn selector(&self) -> TagExpr {
        TagExpr::tag(DRONE_READY).or(TagExpr::tag(DRONE_DEFINED))
    }

    fn initial(&self) -> Registry {
        Registry::new()
    }

    fn apply(&self, state: Registry, event: DroneEvent, _: &Metadata) -> Registry {
        match event {
            DroneEvent::DroneDefined(e) => state.insert(e.id),
            DroneEvent::DroneReady(e) => state.insert(e.id),
            other => {
                debug!(event = other.event_type(), "Drone registry ignores event");
                state
            }
        }
    }
}

/// All registered launchpads.
#[derive(Clone, Debug, Default)]
pub struct LaunchPadRegistry;

impl Fold for LaunchPadRegistry {
    type State = Registry;
    type Event = LaunchPadEvent;

    fn name(&self) -> &str {
        "launchpad.registry"
    }

    fn id(&self) -> &str {
        "all"
    }

    fn selector(&self) -> TagExpr {
        TagExpr::tag(LAUNCHPAD_REGISTERED)
    }

    fn initial(&self) -> Registry {
        Registry::new()
    }

    fn apply(&self, state: Registry, event: LaunchPadEvent, _: &Metadata) -> Registry {
        match event {
            LaunchPadEvent::LaunchPadRegistered(e) => state.insert(e.id),
            other => {
                debug!(event = other.event_type(), "Launchpad registry ignores event");
                state
            }
        }
    }
}

/// Every mission any event was emitted for.
#[derive(Clone, Debug, Default)]
pub struct MissionRegistry;

impl Fold for MissionRegistry {
    type State = Registry;
    type Event = MissionEvent;

    fn name(&self) -> &str {
        "mission.registry"
    }

    fn id(&self) -> &str {
        "all"
    }

    fn selector(&self) -> TagExpr {
        TagExpr::tag(MISSION)
    }

    fn initial(&self) -> Registry {
        Registry::new()
    }

    fn apply(&self, state: Registry, event: MissionEvent, _: &Metadata) -> Registry {
        state.insert(event.id())
    }
}

/// Missions currently shown in the planner. Hiding a mission removes it.
#[derive(Clone, Debug, Default)]
pub struct VisibleMissionRegistry;

impl Fold for VisibleMissionRegistry {
    type State = Registry;
    type Event = MissionEvent;

    fn name(&self) -> &str {
        "mission.registry"
    }

    fn id(&self) -> &str {
        "visible"
    }

    fn selector(&self) -> TagExpr {
        TagExpr::tag(MISSION)
    }

    fn initial(&self) -> Registry {
        Registry::new()
    }

    fn apply(&self, state: Registry, event: MissionEvent, _: &Metadata) -> Registry {
        match event {
            MissionEvent::ShowMission(e) if !e.visible => state.remove(&e.id),
            other => state.insert(other.id()),
        }
    }
}

/// Read a registry once, then read every entity it names.
///
/// Entities come back in id order. Both reads are point-in-time folds, an
/// event appended in between may or may not be reflected.
pub fn read_registry<L, R, E, M>(engine: &Engine<L>, registry: &R, to_entity: M) -> Result<Vec<E::State>>
where
    L: EventLog,
    R: Fold<State = Registry>,
    E: Fold,
    M: Fn(&str) -> E,
{
    let ids = engine.current_state(registry)?;
    debug!(registry = registry.name(), count = ids.len(), "Reading registry");
    ids.iter()
        .map(|id| engine.current_state(&to_entity(id)))
        .collect()
}

/// Keep the states of every entity a registry names, in id order.
///
/// Entities joining the registry are subscribed as they appear; entities
/// leaving it (hidden missions) are cancelled.
pub fn resolve_registry<L, R, E, M>(engine: &Engine<L>, registry: R, to_entity: M) -> Result<TwinHandle<Vec<E::State>>>
where
    L: EventLog,
    R: Fold<State = Registry>,
    E: Fold,
    M: Fn(&str) -> E + Send + 'static,
{
    engine.follow(
        registry,
        move |ids: &Registry| ids.iter().map(|id| to_entity(id)).collect::<Vec<E>>(),
        |states: Vec<E::State>| states,
    )
}

/// Follow the entity a source twin currently points at.
///
/// `relation` is re-evaluated on every source change. When it names another
/// entity the old one is dropped; `None` yields `None`.
pub fn resolve_relation<L, S, E, M>(engine: &Engine<L>, source: S, relation: M) -> Result<TwinHandle<Option<E::State>>>
where
    L: EventLog,
    S: Fold,
    E: Fold,
    M: Fn(&S::State) -> Option<E> + Send + 'static,
{
    engine.follow(
        source,
        move |state: &S::State| relation(state).into_iter().collect::<Vec<E>>(),
        |states: Vec<E::State>| states.into_iter().next(),
    )
}
