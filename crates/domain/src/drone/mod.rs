//! Drone twin.
//!
//! ```text
//! Undefined --ready/defined--> Ready --connected--> Connected --launched--> Launched --landed--> Used
//!                                ^  <--disconnected--'                         |                  |
//!                                '-----------------------ready-----------------'------ready-------'
//! ```
//!
//! `droneStatsUpdated` changes the battery level in every state but
//! `Undefined` and is applied before any state-specific handling.

use self::events as ev;
use self::states::{ConnectedState, LaunchedState, ReadyState, UsedState};
use launchpad_core::{Engine, EventKey, EventLog, Fold, Metadata, Result, Tag, TagExpr, TagSet};
use tracing::warn;

pub mod events;
pub mod states;

pub use events::{DroneEvent, Position};
pub use states::DroneTwinState;

pub const DRONE: &str = "drone";
pub const DRONE_DEFINED: &str = "drone.defined";
pub const DRONE_READY: &str = "drone.ready";
pub const DRONE_MISSION_STARTED: &str = "drone.mission.started";
pub const DRONE_MISSION_COMPLETED: &str = "drone.mission.completed";

pub fn tag_drone_id(id: &str) -> TagSet {
    Tag::new(DRONE).with_id(id)
}

pub fn tag_drone_defined(id: &str) -> TagSet {
    tag_drone_id(id) + Tag::new(DRONE_DEFINED)
}

pub fn tag_drone_ready(id: &str) -> TagSet {
    tag_drone_id(id) + Tag::new(DRONE_READY)
}

pub fn tag_drone_mission_started(id: &str) -> TagSet {
    tag_drone_id(id) + Tag::new(DRONE_MISSION_STARTED)
}

pub fn tag_drone_mission_completed(id: &str) -> TagSet {
    tag_drone_id(id) + Tag::new(DRONE_MISSION_COMPLETED)
}

#[derive(Clone, Debug)]
pub struct DroneTwin {
    pub id: String,
}

impl DroneTwin {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    fn unexpected(&self, state: DroneTwinState, event: &DroneEvent) -> DroneTwinState {
        warn!(
            drone = %self.id,
            state = state.kind(),
            event = event.event_type(),
            "Ignoring event not applicable in current drone state"
        );
        state
    }
}

impl Fold for DroneTwin {
    type State = DroneTwinState;
    type Event = DroneEvent;

    fn name(&self) -> &str {
        "drone"
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn selector(&self) -> TagExpr {
        tag_drone_id(&self.id).into()
    }

    fn initial(&self) -> DroneTwinState {
        DroneTwinState::undefined(self.id.clone())
    }

    fn apply(&self, state: DroneTwinState, event: DroneEvent, _: &Metadata) -> DroneTwinState {
        if let DroneEvent::DroneStatsUpdated(e) = &event {
            return state.with_battery(e.battery);
        }

        use DroneTwinState as S;
        match (state, event) {
            (S::Undefined(_), DroneEvent::DroneDefined(e)) => S::Ready(ReadyState {
                id: self.id.clone(),
                ip: e.ip,
                ssid: e.ssid,
                battery: 0,
            }),
            (S::Undefined(_), DroneEvent::DroneReady(e)) => S::Ready(ReadyState {
                id: self.id.clone(),
                ip: e.ip.unwrap_or_default(),
                ssid: None,
                battery: 0,
            }),

            // Redefinition updates the drone's address.
            (S::Ready(s), DroneEvent::DroneDefined(e)) => S::Ready(ReadyState {
                ip: e.ip,
                ssid: e.ssid.or(s.ssid),
                ..s
            }),
            (S::Ready(s), DroneEvent::DroneReady(e)) => S::Ready(ReadyState {
                ip: e.ip.unwrap_or(s.ip),
                ..s
            }),
            (S::Ready(s), DroneEvent::DroneConnected(_)) => S::Connected(ConnectedState {
                id: s.id,
                ip: s.ip,
                ssid: s.ssid,
                battery: s.battery,
            }),

            (S::Connected(s), DroneEvent::DroneLaunched(e)) => S::Launched(LaunchedState {
                id: s.id,
                ip: s.ip,
                ssid: s.ssid,
                mission_id: e.mission_id,
                at_waypoint_id: 0,
                target_waypoint_id: None,
                completed: false,
                battery: s.battery,
            }),
            (S::Connected(s), DroneEvent::DroneDisconnected(_)) => S::Ready(ReadyState {
                id: s.id,
                ip: s.ip,
                ssid: s.ssid,
                battery: s.battery,
            }),

            (S::Launched(s), DroneEvent::DroneStartedToNextWaypoint(e)) => {
                S::Launched(LaunchedState {
                    target_waypoint_id: Some(e.waypoint_id),
                    ..s
                })
            }
            (S::Launched(s), DroneEvent::DroneArrivedAtWaypoint(e)) => S::Launched(LaunchedState {
                at_waypoint_id: e.waypoint_id,
                target_waypoint_id: None,
                ..s
            }),
            (S::Launched(s), DroneEvent::DroneMissionCompleted(e)) if e.mission_id == s.mission_id => {
                S::Launched(LaunchedState {
                    completed: true,
                    target_waypoint_id: None,
                    ..s
                })
            }
            (S::Launched(s), DroneEvent::DroneLanded(_)) => S::Used(UsedState {
                id: s.id,
                ip: s.ip,
                ssid: s.ssid,
                last_mission_id: s.mission_id,
                battery: s.battery,
            }),
            (S::Launched(s), DroneEvent::DroneReady(_)) => S::Ready(ReadyState {
                id: s.id,
                ip: s.ip,
                ssid: s.ssid,
                battery: s.battery,
            }),

            (S::Used(s), DroneEvent::DroneReady(_)) => S::Ready(ReadyState {
                id: s.id,
                ip: s.ip,
                ssid: s.ssid,
                battery: s.battery,
            }),
            (S::Used(s), DroneEvent::DroneDefined(e)) => S::Ready(ReadyState {
                id: s.id,
                ip: e.ip,
                ssid: e.ssid.or(s.ssid),
                battery: s.battery,
            }),

            (state, event) => self.unexpected(state, &event),
        }
    }
}

impl DroneTwin {
    pub fn emit_drone_defined<L: EventLog>(
        engine: &Engine<L>,
        id: String,
        ip: String,
        ssid: Option<String>,
    ) -> Result<EventKey> {
        engine.emit(
            tag_drone_defined(&id),
            &DroneEvent::DroneDefined(ev::DroneDefinedEvent { id, ip, ssid }),
        )
    }

    pub fn emit_drone_ready<L: EventLog>(
        engine: &Engine<L>,
        id: String,
        ip: Option<String>,
    ) -> Result<EventKey> {
        engine.emit(
            tag_drone_ready(&id),
            &DroneEvent::DroneReady(ev::DroneReadyEvent { id, ip }),
        )
    }

    pub fn emit_drone_connected<L: EventLog>(engine: &Engine<L>, id: String) -> Result<EventKey> {
        engine.emit(
            tag_drone_id(&id),
            &DroneEvent::DroneConnected(ev::DroneConnectedEvent { id }),
        )
    }

    pub fn emit_drone_disconnected<L: EventLog>(
        engine: &Engine<L>,
        id: String,
    ) -> Result<EventKey> {
        engine.emit(
            tag_drone_id(&id),
            &DroneEvent::DroneDisconnected(ev::DroneDisconnectedEvent { id }),
        )
    }

    pub fn emit_drone_stats_updated<L: EventLog>(
        engine: &Engine<L>,
        id: String,
        battery: u8,
    ) -> Result<EventKey> {
        engine.emit(
            tag_drone_id(&id),
            &DroneEvent::DroneStatsUpdated(ev::DroneStatsUpdatedEvent { id, battery }),
        )
    }

    pub fn emit_drone_launched<L: EventLog>(
        engine: &Engine<L>,
        id: String,
        mission_id: String,
    ) -> Result<EventKey> {
        engine.emit(
            tag_drone_mission_started(&id),
            &DroneEvent::DroneLaunched(ev::DroneLaunchedEvent { id, mission_id }),
        )
    }

    pub fn emit_drone_started_to_next_waypoint<L: EventLog>(
        engine: &Engine<L>,
        id: String,
        mission_id: String,
        waypoint_id: u32,
    ) -> Result<EventKey> {
        engine.emit(
            tag_drone_id(&id),
            &DroneEvent::DroneStartedToNextWaypoint(ev::DroneStartedToNextWaypointEvent {
                id,
                mission_id,
                waypoint_id,
            }),
        )
    }

    pub fn emit_drone_arrived_at_waypoint<L: EventLog>(
        engine: &Engine<L>,
        id: String,
        mission_id: String,
        waypoint_id: u32,
    ) -> Result<EventKey> {
        engine.emit(
            tag_drone_id(&id),
            &DroneEvent::DroneArrivedAtWaypoint(ev::DroneArrivedAtWaypointEvent {
                id,
                mission_id,
                waypoint_id,
            }),
        )
    }

    pub fn emit_drone_mission_completed<L: EventLog>(
        engine: &Engine<L>,
        id: String,
        mission_id: String,
    ) -> Result<EventKey> {
        engine.emit(
            tag_drone_mission_completed(&id),
            &DroneEvent::DroneMissionCompleted(ev::DroneMissionCompletedEvent { id, mission_id }),
        )
    }

    pub fn emit_drone_landed<L: EventLog>(
        engine: &Engine<L>,
        id: String,
        at: Position,
    ) -> Result<EventKey> {
        engine.emit(
            tag_drone_id(&id),
            &DroneEvent::DroneLanded(ev::DroneLandedEvent { id, at }),
        )
    }
}
