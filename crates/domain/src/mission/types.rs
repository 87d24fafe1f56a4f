//! Flight plan building blocks.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Globally unique mission identifier, generated by the planner before the
/// mission's first event is emitted.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MissionId(String);

impl MissionId {
    pub fn generate() -> Self {
        MissionId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for MissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for MissionId {
    fn from(id: String) -> Self {
        MissionId(id)
    }
}

impl From<&str> for MissionId {
    fn from(id: &str) -> Self {
        MissionId(id.to_string())
    }
}

/// Fly to a point on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoToWaypoint {
    pub map_x: f64,
    pub map_y: f64,
    /// Centimeters above ground
    pub height: f64,
    /// Heading change in degrees
    pub angle: f64,
    /// Meters
    pub distance: f64,
    /// Milliseconds
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnWaypoint {
    pub deg: f64,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayWaypoint {
    pub duration: f64,
}

/// One instruction of a flight plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Waypoint {
    #[serde(rename = "goto")]
    GoTo(GoToWaypoint),
    Turn(TurnWaypoint),
    Delay(DelayWaypoint),
}

impl Waypoint {
    pub fn duration_ms(&self) -> f64 {
        match self {
            Waypoint::GoTo(w) => w.duration,
            Waypoint::Turn(w) => w.duration,
            Waypoint::Delay(w) => w.duration,
        }
    }
}
