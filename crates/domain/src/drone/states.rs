use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UndefinedState {
    pub id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReadyState {
    pub id: String,
    pub ip: String,
    pub ssid: Option<String>,
    pub battery: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConnectedState {
    pub id: String,
    pub ip: String,
    pub ssid: Option<String>,
    pub battery: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaunchedState {
    pub id: String,
    pub ip: String,
    pub ssid: Option<String>,
    pub mission_id: String,
    pub at_waypoint_id: u32,
    pub target_waypoint_id: Option<u32>,
    /// Flight plan exhausted, drone should land
    pub completed: bool,
    pub battery: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UsedState {
    pub id: String,
    pub ip: String,
    pub ssid: Option<String>,
    pub last_mission_id: String,
    pub battery: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum DroneTwinState {
    Undefined(UndefinedState),
    Ready(ReadyState),
    Connected(ConnectedState),
    Launched(LaunchedState),
    Used(UsedState),
}

impl DroneTwinState {
    /// State of a drone no event has been folded for yet.
    pub fn undefined(id: impl Into<String>) -> Self {
        DroneTwinState::Undefined(UndefinedState { id: id.into() })
    }

    pub fn id(&self) -> &str {
        match self {
            DroneTwinState::Undefined(s) => &s.id,
            DroneTwinState::Ready(s) => &s.id,
            DroneTwinState::Connected(s) => &s.id,
            DroneTwinState::Launched(s) => &s.id,
            DroneTwinState::Used(s) => &s.id,
        }
    }

    /// Battery level, unknown while undefined.
    pub fn battery(&self) -> Option<u8> {
        match self {
            DroneTwinState::Undefined(_) => None,
            DroneTwinState::Ready(s) => Some(s.battery),
            DroneTwinState::Connected(s) => Some(s.battery),
            DroneTwinState::Launched(s) => Some(s.battery),
            DroneTwinState::Used(s) => Some(s.battery),
        }
    }

    /// Same state with a new battery level. Undefined drones are unchanged.
    pub fn with_battery(self, battery: u8) -> Self {
        match self {
            DroneTwinState::Undefined(s) => DroneTwinState::Undefined(s),
            DroneTwinState::Ready(s) => DroneTwinState::Ready(ReadyState { battery, ..s }),
            DroneTwinState::Connected(s) => {
                DroneTwinState::Connected(ConnectedState { battery, ..s })
            }
            DroneTwinState::Launched(s) => DroneTwinState::Launched(LaunchedState { battery, ..s }),
            DroneTwinState::Used(s) => DroneTwinState::Used(UsedState { battery, ..s }),
        }
    }

    /// State name, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            DroneTwinState::Undefined(_) => "undefined",
            DroneTwinState::Ready(_) => "ready",
            DroneTwinState::Connected(_) => "connected",
            DroneTwinState::Launched(_) => "launched",
            DroneTwinState::Used(_) => "used",
        }
    }
}
