//! Per-launchpad mission log.
//!
//! Merges three streams in global log order: missions queued for the pad,
//! launches from the pad and drone mission completions. Completions are
//! not scoped to a launchpad, so every log sees all of them.

use crate::drone::events::DroneMissionCompletedEvent;
use crate::drone::DRONE_MISSION_COMPLETED;
use crate::launchpad::events::{DroneStartedEvent, MissionQueuedEvent};
use crate::launchpad::{tag_launchpad_launch, tag_mission_queued};
use launchpad_core::{Fold, Metadata, TagExpr};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentMission {
    pub id: String,
    pub assigned_drone: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedMission {
    /// Metadata timestamp of the completion event, milliseconds since epoch
    pub ts: u64,
    pub mission_id: String,
    pub drone: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionLogState {
    /// Queued, not yet started, in queue order
    pub next_missions: Vec<String>,
    pub current_mission: Option<CurrentMission>,
    pub completed_missions: Vec<CompletedMission>,
}

impl MissionLogState {
    fn is_known(&self, mission_id: &str) -> bool {
        self.next_missions.iter().any(|m| m == mission_id)
            || self
                .current_mission
                .as_ref()
                .is_some_and(|c| c.id == mission_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "eventType")]
#[serde(rename_all = "camelCase")]
pub enum MissionLogEvent {
    MissionQueued(MissionQueuedEvent),
    DroneStarted(DroneStartedEvent),
    DroneMissionCompleted(DroneMissionCompletedEvent),
}

#[derive(Clone, Debug)]
pub struct MissionLogTwin {
    pub launchpad_id: String,
}

impl MissionLogTwin {
    pub fn new(launchpad_id: impl Into<String>) -> Self {
        Self {
            launchpad_id: launchpad_id.into(),
        }
    }
}

impl Fold for MissionLogTwin {
    type State = MissionLogState;
    type Event = MissionLogEvent;

    fn name(&self) -> &str {
        "mission.log"
    }

    fn id(&self) -> &str {
        &self.launchpad_id
    }

    fn selector(&self) -> TagExpr {
        TagExpr::from(tag_mission_queued(&self.launchpad_id))
            .or(tag_launchpad_launch(&self.launchpad_id))
            .or(TagExpr::tag(DRONE_MISSION_COMPLETED))
    }

    fn initial(&self) -> MissionLogState {
        MissionLogState::default()
    }

    fn apply(&self, mut state: MissionLogState, event: MissionLogEvent, meta: &Metadata) -> MissionLogState {
        match event {
            MissionLogEvent::MissionQueued(e) => {
                if e.launchpad_id != self.launchpad_id {
                    return state;
                }
                if state.is_known(&e.mission_id) {
                    debug!(launchpad = %self.launchpad_id, mission = %e.mission_id, "Mission already queued");
                    return state;
                }
                state.next_missions.push(e.mission_id);
            }
            MissionLogEvent::DroneStarted(e) => {
                if e.id != self.launchpad_id {
                    return state;
                }
                let queued = state.next_missions.len();
                state.next_missions.retain(|m| *m != e.mission_id);
                if state.next_missions.len() == queued {
                    warn!(
                        launchpad = %self.launchpad_id,
                        mission = %e.mission_id,
                        "Started a mission that was never queued"
                    );
                }
                state.current_mission = Some(CurrentMission {
                    id: e.mission_id,
                    assigned_drone: e.drone,
                });
            }
            MissionLogEvent::DroneMissionCompleted(e) => {
                state.next_missions.retain(|m| *m != e.mission_id);
                if state
                    .current_mission
                    .as_ref()
                    .is_some_and(|c| c.id == e.mission_id)
                {
                    state.current_mission = None;
                }
                state.completed_missions.push(CompletedMission {
                    ts: meta.timestamp,
                    mission_id: e.mission_id,
                    drone: e.id,
                });
            }
        }
        state
    }
}
