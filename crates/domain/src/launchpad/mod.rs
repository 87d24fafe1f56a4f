//! LaunchPad twin.
//!
//! A launchpad holds at most one drone. Mounting makes it ready, activation
//! powers the mounted drone, and starting the drone commits the pad to a
//! mission. `Used` is only left by mounting a new drone.

use self::events::{
    ActivateDroneTimeoutEvent, DroneActivatedEvent, DroneMountedEvent, DroneStartedEvent,
    LaunchPadRegisteredEvent, MissionQueuedEvent,
};
use launchpad_core::{Engine, EventKey, EventLog, Fold, Metadata, Result, Tag, TagExpr, TagSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

pub mod events;

pub use events::LaunchPadEvent;

pub const LAUNCHPAD: &str = "launchpad";
pub const LAUNCHPAD_REGISTERED: &str = "launchpad.registered";
pub const LAUNCHPAD_LAUNCH: &str = "launchpad.launch";
pub const MISSION_QUEUED: &str = "mission.queued";

pub fn tag_launchpad_id(id: &str) -> TagSet {
    Tag::new(LAUNCHPAD).with_id(id)
}

pub fn tag_launchpad_registered(id: &str) -> TagSet {
    tag_launchpad_id(id) + Tag::new(LAUNCHPAD_REGISTERED)
}

pub fn tag_launchpad_launch(id: &str) -> TagSet {
    tag_launchpad_id(id) + Tag::new(LAUNCHPAD_LAUNCH)
}

pub fn tag_mission_queued(launchpad_id: &str) -> TagSet {
    tag_launchpad_id(launchpad_id) + Tag::new(MISSION_QUEUED)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum LaunchPadState {
    Undefined {
        id: String,
    },
    Ready {
        id: String,
        drone: String,
    },
    Activated {
        id: String,
        drone: String,
    },
    #[serde(rename_all = "camelCase")]
    Used {
        id: String,
        mission_id: String,
    },
}

impl LaunchPadState {
    pub fn id(&self) -> &str {
        match self {
            LaunchPadState::Undefined { id }
            | LaunchPadState::Ready { id, .. }
            | LaunchPadState::Activated { id, .. }
            | LaunchPadState::Used { id, .. } => id,
        }
    }

    /// Drone currently mounted on the pad, if any.
    pub fn drone(&self) -> Option<&str> {
        match self {
            LaunchPadState::Ready { drone, .. } | LaunchPadState::Activated { drone, .. } => {
                Some(drone)
            }
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct LaunchPadTwin {
    pub id: String,
}

impl LaunchPadTwin {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Fold for LaunchPadTwin {
    type State = LaunchPadState;
    type Event = LaunchPadEvent;

    fn name(&self) -> &str {
        "launchpad"
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn selector(&self) -> TagExpr {
        tag_launchpad_id(&self.id).into()
    }

    fn initial(&self) -> LaunchPadState {
        LaunchPadState::Undefined {
            id: self.id.clone(),
        }
    }

    fn apply(&self, state: LaunchPadState, event: LaunchPadEvent, _: &Metadata) -> LaunchPadState {
        let id = self.id.clone();
        match event {
            LaunchPadEvent::DroneMounted(e) => LaunchPadState::Ready { id, drone: e.drone },
            LaunchPadEvent::DroneActivated(e) => LaunchPadState::Activated { id, drone: e.drone },
            LaunchPadEvent::DroneStarted(e) => LaunchPadState::Used {
                id,
                mission_id: e.mission_id,
            },
            LaunchPadEvent::ActivateDroneTimeout(e) => match state {
                LaunchPadState::Used { .. } => {
                    debug!(launchpad = %self.id, drone = %e.drone, "Ignoring activation timeout on used launchpad");
                    state
                }
                _ => LaunchPadState::Ready { id, drone: e.drone },
            },
            // Registry and mission log input, no effect on the pad itself.
            LaunchPadEvent::LaunchPadRegistered(_) | LaunchPadEvent::MissionQueued(_) => {
                trace!(launchpad = %self.id, event = event.event_type(), "No state change");
                state
            }
        }
    }
}

impl LaunchPadTwin {
    pub fn emit_launchpad_registered<L: EventLog>(engine: &Engine<L>, id: String) -> Result<EventKey> {
        engine.emit(
            tag_launchpad_registered(&id),
            &LaunchPadEvent::LaunchPadRegistered(LaunchPadRegisteredEvent { id }),
        )
    }

    pub fn emit_drone_mounted<L: EventLog>(
        engine: &Engine<L>,
        id: String,
        drone: String,
    ) -> Result<EventKey> {
        engine.emit(
            tag_launchpad_id(&id),
            &LaunchPadEvent::DroneMounted(DroneMountedEvent { id, drone }),
        )
    }

    pub fn emit_drone_activated<L: EventLog>(
        engine: &Engine<L>,
        id: String,
        drone: String,
    ) -> Result<EventKey> {
        engine.emit(
            tag_launchpad_id(&id),
            &LaunchPadEvent::DroneActivated(DroneActivatedEvent { id, drone }),
        )
    }

    pub fn emit_activate_drone_timeout<L: EventLog>(
        engine: &Engine<L>,
        id: String,
        drone: String,
    ) -> Result<EventKey> {
        engine.emit(
            tag_launchpad_id(&id),
            &LaunchPadEvent::ActivateDroneTimeout(ActivateDroneTimeoutEvent { id, drone }),
        )
    }

    pub fn emit_drone_started<L: EventLog>(
        engine: &Engine<L>,
        id: String,
        drone: String,
        mission_id: String,
    ) -> Result<EventKey> {
        engine.emit(
            tag_launchpad_launch(&id),
            &LaunchPadEvent::DroneStarted(DroneStartedEvent {
                id,
                drone,
                mission_id,
            }),
        )
    }

    /// Queue `mission_id` for launch from `launchpad_id`.
    pub fn emit_mission_queued<L: EventLog>(
        engine: &Engine<L>,
        launchpad_id: String,
        mission_id: String,
    ) -> Result<EventKey> {
        engine.emit(
            tag_mission_queued(&launchpad_id),
            &LaunchPadEvent::MissionQueued(MissionQueuedEvent {
                mission_id,
                launchpad_id,
            }),
        )
    }
}
