//! Drone event family.

use serde::{Deserialize, Serialize};

/// Landing position reported by the drone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroneDefinedEvent {
    pub id: String,
    pub ip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroneReadyEvent {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroneConnectedEvent {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroneDisconnectedEvent {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroneStatsUpdatedEvent {
    pub id: String,
    pub battery: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroneLaunchedEvent {
    pub id: String,
    pub mission_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroneStartedToNextWaypointEvent {
    pub id: String,
    pub mission_id: String,
    pub waypoint_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroneArrivedAtWaypointEvent {
    pub id: String,
    pub mission_id: String,
    pub waypoint_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroneMissionCompletedEvent {
    pub id: String,
    pub mission_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroneLandedEvent {
    pub id: String,
    pub at: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "eventType")]
#[serde(rename_all = "camelCase")]
pub enum DroneEvent {
    DroneDefined(DroneDefinedEvent),
    DroneReady(DroneReadyEvent),
    DroneConnected(DroneConnectedEvent),
    DroneDisconnected(DroneDisconnectedEvent),
    DroneStatsUpdated(DroneStatsUpdatedEvent),
    DroneLaunched(DroneLaunchedEvent),
    DroneStartedToNextWaypoint(DroneStartedToNextWaypointEvent),
    DroneArrivedAtWaypoint(DroneArrivedAtWaypointEvent),
    DroneMissionCompleted(DroneMissionCompletedEvent),
    DroneLanded(DroneLandedEvent),
}

impl DroneEvent {
    /// The `eventType` discriminant.
    pub fn event_type(&self) -> &'static str {
        match self {
            DroneEvent::DroneDefined(_) => "droneDefined",
            DroneEvent::DroneReady(_) => "droneReady",
            DroneEvent::DroneConnected(_) => "droneConnected",
            DroneEvent::DroneDisconnected(_) => "droneDisconnected",
            DroneEvent::DroneStatsUpdated(_) => "droneStatsUpdated",
            DroneEvent::DroneLaunched(_) => "droneLaunched",
            DroneEvent::DroneStartedToNextWaypoint(_) => "droneStartedToNextWaypoint",
            DroneEvent::DroneArrivedAtWaypoint(_) => "droneArrivedAtWaypoint",
            DroneEvent::DroneMissionCompleted(_) => "droneMissionCompleted",
            DroneEvent::DroneLanded(_) => "droneLanded",
        }
    }
}
