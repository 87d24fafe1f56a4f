use crate::drone::events::*;
use crate::drone::{tag_drone_id, DroneTwin};
use crate::mission::{MissionTwin, MissionTwinState};
use crate::registry::VisibleMissionRegistry;
use launchpad_core::{Engine, EventKey, Fold, MemoryLog, Metadata};
use proptest::collection::vec;
use proptest::prelude::*;
use std::sync::Arc;

fn drone_event(id: &'static str) -> impl Strategy<Value = DroneEvent> {
    prop_oneof![
        "10\\.0\\.0\\.[0-9]{1,3}".prop_map(move |ip| DroneEvent::DroneDefined(DroneDefinedEvent {
            id: id.into(),
            ip,
            ssid: None,
        })),
        Just(DroneEvent::DroneReady(DroneReadyEvent {
            id: id.into(),
            ip: None
        })),
        Just(DroneEvent::DroneConnected(DroneConnectedEvent { id: id.into() })),
        Just(DroneEvent::DroneDisconnected(DroneDisconnectedEvent { id: id.into() })),
        any::<u8>().prop_map(move |battery| DroneEvent::DroneStatsUpdated(DroneStatsUpdatedEvent {
            id: id.into(),
            battery,
        })),
        "m[0-9]".prop_map(move |mission_id| DroneEvent::DroneLaunched(DroneLaunchedEvent {
            id: id.into(),
            mission_id,
        })),
        (0u32..8).prop_map(move |waypoint_id| {
            DroneEvent::DroneArrivedAtWaypoint(DroneArrivedAtWaypointEvent {
                id: id.into(),
                mission_id: "m1".into(),
                waypoint_id,
            })
        }),
        Just(DroneEvent::DroneLanded(DroneLandedEvent {
            id: id.into(),
            at: Position {
                x: 0.0,
                y: 0.0,
                z: 0.0
            },
        })),
    ]
}

fn engine() -> Engine<MemoryLog> {
    Engine::new(Arc::new(MemoryLog::new("node-a")))
}

fn emit_all(engine: &Engine<MemoryLog>, events: &[DroneEvent]) {
    for event in events {
        let id = match event {
            DroneEvent::DroneDefined(e) => &e.id,
            DroneEvent::DroneReady(e) => &e.id,
            DroneEvent::DroneConnected(e) => &e.id,
            DroneEvent::DroneDisconnected(e) => &e.id,
            DroneEvent::DroneStatsUpdated(e) => &e.id,
            DroneEvent::DroneLaunched(e) => &e.id,
            DroneEvent::DroneStartedToNextWaypoint(e) => &e.id,
            DroneEvent::DroneArrivedAtWaypoint(e) => &e.id,
            DroneEvent::DroneMissionCompleted(e) => &e.id,
            DroneEvent::DroneLanded(e) => &e.id,
        };
        engine.emit(tag_drone_id(id), event).unwrap();
    }
}

proptest! {
    #[test]
    fn drone_fold_is_deterministic(events in vec(drone_event("d1"), 0..40)) {
        let engine = engine();
        emit_all(&engine, &events);
        let twin = DroneTwin::new("d1");

        let first = engine.current_state(&twin).unwrap();
        let second = engine.current_state(&twin).unwrap();
        prop_assert_eq!(&first, &second);

        let meta = Metadata {
            key: EventKey::new(0, "node-a", 0),
            timestamp: 0,
            tags: tag_drone_id("d1"),
        };
        let direct = events
            .into_iter()
            .fold(twin.initial(), |s, e| twin.apply(s, e, &meta));
        prop_assert_eq!(first, direct);
    }

    #[test]
    fn interleaving_unrelated_drones_does_not_change_either(
        a in vec(drone_event("d1"), 0..20),
        b in vec(drone_event("d2"), 0..20),
        picks in vec(any::<bool>(), 40),
    ) {
        let mut merged = Vec::with_capacity(a.len() + b.len());
        let (mut ia, mut ib) = (a.iter(), b.iter());
        for pick in picks {
            let next = if pick { ia.next().or_else(|| ib.next()) } else { ib.next().or_else(|| ia.next()) };
            if let Some(event) = next {
                merged.push(event.clone());
            }
        }
        merged.extend(ia.cloned());
        merged.extend(ib.cloned());

        let interleaved = engine();
        emit_all(&interleaved, &merged);
        let sequential = engine();
        emit_all(&sequential, &a);
        emit_all(&sequential, &b);

        for id in ["d1", "d2"] {
            let twin = DroneTwin::new(id);
            prop_assert_eq!(
                interleaved.current_state(&twin).unwrap(),
                sequential.current_state(&twin).unwrap()
            );
        }
    }

    #[test]
    fn hidden_flag_survives_definition_order(show_first in any::<bool>()) {
        let engine = engine();
        let define = |e: &Engine<MemoryLog>| {
            MissionTwin::emit_define_mission(e, "m1".into(), "Survey".into(), vec![]).unwrap()
        };
        let hide = |e: &Engine<MemoryLog>| MissionTwin::emit_show_mission(e, "m1".into(), false).unwrap();

        if show_first {
            hide(&engine);
            define(&engine);
        } else {
            define(&engine);
            hide(&engine);
        }

        let state = engine.current_state(&MissionTwin::new("m1")).unwrap();
        prop_assert!(matches!(state, MissionTwinState::Defined(ref m) if !m.visible));

        // The registry only tracks the last event seen, so a late definition
        // lists the mission again.
        let listed = engine.current_state(&VisibleMissionRegistry).unwrap().contains("m1");
        prop_assert_eq!(listed, show_first);
    }
}
