use super::types::Waypoint;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefineMissionEvent {
    pub id: String,
    pub name: String,
    pub waypoints: Vec<Waypoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowMissionEvent {
    pub id: String,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "eventType")]
#[serde(rename_all = "camelCase")]
pub enum MissionEvent {
    DefineMission(DefineMissionEvent),
    ShowMission(ShowMissionEvent),
}

impl MissionEvent {
    /// Id of the mission the event is about.
    pub fn id(&self) -> &str {
        match self {
            MissionEvent::DefineMission(e) => &e.id,
            MissionEvent::ShowMission(e) => &e.id,
        }
    }
}
