//! Mission twin: a named flight plan and its visibility in the planner.
//!
//! Visibility and definition are emitted independently and may arrive in
//! either order, so `showMission` on an undefined mission creates a
//! placeholder definition that a later `defineMission` fills in.

use launchpad_core::{Engine, EventKey, EventLog, Fold, Metadata, Result, Tag, TagExpr, TagSet};
use serde::{Deserialize, Serialize};

pub mod events;
pub mod types;

pub use events::{DefineMissionEvent, MissionEvent, ShowMissionEvent};
pub use types::{DelayWaypoint, GoToWaypoint, MissionId, TurnWaypoint, Waypoint};

pub const MISSION: &str = "mission";

pub fn tag_mission_id(id: &str) -> TagSet {
    Tag::new(MISSION).with_id(id)
}

/// A defined mission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub id: String,
    pub name: String,
    pub visible: bool,
    pub waypoints: Vec<Waypoint>,
}

impl Mission {
    /// Planned flight time of the whole plan in milliseconds.
    pub fn total_duration_ms(&self) -> f64 {
        self.waypoints.iter().map(Waypoint::duration_ms).sum()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum MissionTwinState {
    Undefined { id: String },
    Defined(Mission),
}

impl MissionTwinState {
    pub fn id(&self) -> &str {
        match self {
            MissionTwinState::Undefined { id } => id,
            MissionTwinState::Defined(m) => &m.id,
        }
    }

    pub fn mission(&self) -> Option<&Mission> {
        match self {
            MissionTwinState::Defined(m) => Some(m),
            MissionTwinState::Undefined { .. } => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct MissionTwin {
    pub id: String,
}

impl MissionTwin {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn emit_define_mission<L: EventLog>(
        engine: &Engine<L>,
        id: String,
        name: String,
        waypoints: Vec<Waypoint>,
    ) -> Result<EventKey> {
        engine.emit(
            tag_mission_id(&id),
            &MissionEvent::DefineMission(DefineMissionEvent {
                id,
                name,
                waypoints,
            }),
        )
    }

    pub fn emit_show_mission<L: EventLog>(
        engine: &Engine<L>,
        id: String,
        visible: bool,
    ) -> Result<EventKey> {
        engine.emit(
            tag_mission_id(&id),
            &MissionEvent::ShowMission(ShowMissionEvent { id, visible }),
        )
    }
}

impl Fold for MissionTwin {
    type State = MissionTwinState;
    type Event = MissionEvent;

    fn name(&self) -> &str {
        "mission"
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn selector(&self) -> TagExpr {
        tag_mission_id(&self.id).into()
    }

    fn initial(&self) -> MissionTwinState {
        MissionTwinState::Undefined {
            id: self.id.clone(),
        }
    }

    fn apply(&self, state: MissionTwinState, event: MissionEvent, _: &Metadata) -> MissionTwinState {
        match (state, event) {
            (state, MissionEvent::DefineMission(e)) => MissionTwinState::Defined(Mission {
                id: self.id.clone(),
                name: e.name,
                visible: state.mission().map_or(true, |m| m.visible),
                waypoints: e.waypoints,
            }),
            (MissionTwinState::Defined(m), MissionEvent::ShowMission(e)) => {
                MissionTwinState::Defined(Mission {
                    visible: e.visible,
                    ..m
                })
            }
            (MissionTwinState::Undefined { .. }, MissionEvent::ShowMission(e)) => {
                MissionTwinState::Defined(Mission {
                    id: self.id.clone(),
                    name: self.id.clone(),
                    visible: e.visible,
                    waypoints: Vec::new(),
                })
            }
        }
    }
}
