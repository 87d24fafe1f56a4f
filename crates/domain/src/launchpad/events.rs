use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchPadRegisteredEvent {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroneMountedEvent {
    pub id: String,
    pub drone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroneActivatedEvent {
    pub id: String,
    pub drone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivateDroneTimeoutEvent {
    pub id: String,
    pub drone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroneStartedEvent {
    pub id: String,
    pub drone: String,
    pub mission_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionQueuedEvent {
    pub mission_id: String,
    pub launchpad_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "eventType")]
#[serde(rename_all = "camelCase")]
pub enum LaunchPadEvent {
    LaunchPadRegistered(LaunchPadRegisteredEvent),
    DroneMounted(DroneMountedEvent),
    DroneActivated(DroneActivatedEvent),
    ActivateDroneTimeout(ActivateDroneTimeoutEvent),
    DroneStarted(DroneStartedEvent),
    MissionQueued(MissionQueuedEvent),
}

impl LaunchPadEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            LaunchPadEvent::LaunchPadRegistered(_) => "launchPadRegistered",
            LaunchPadEvent::DroneMounted(_) => "droneMounted",
            LaunchPadEvent::DroneActivated(_) => "droneActivated",
            LaunchPadEvent::ActivateDroneTimeout(_) => "activateDroneTimeout",
            LaunchPadEvent::DroneStarted(_) => "droneStarted",
            LaunchPadEvent::MissionQueued(_) => "missionQueued",
        }
    }
}
