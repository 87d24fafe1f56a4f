//! End-to-end mission flow on a single node.
//!
//! A launchpad, a drone and a mission are driven through one complete
//! flight while live twins follow along.

use crate::test_utils::*;
use launchpad_domain::drone::Position;
use launchpad_domain::mission::{DelayWaypoint, GoToWaypoint, TurnWaypoint};
use launchpad_domain::{
    DroneTwin, DroneTwinState, LaunchPadState, LaunchPadTwin, MissionId, MissionLogTwin,
    MissionTwin, MissionTwinState, Waypoint,
};

fn survey_plan() -> Vec<Waypoint> {
    vec![
        Waypoint::GoTo(GoToWaypoint {
            map_x: 12.0,
            map_y: 8.5,
            height: 120.0,
            angle: 0.0,
            distance: 4.2,
            duration: 4000.0,
        }),
        Waypoint::Turn(TurnWaypoint {
            deg: 180.0,
            duration: 2000.0,
        }),
        Waypoint::Delay(DelayWaypoint { duration: 1000.0 }),
    ]
}

#[tokio::test]
async fn test_complete_mission_flow() {
    init_tracing();
    let node = TestNode::new("node-a");
    let engine = &node.engine;
    let mission_id = MissionId::generate().into_inner();

    let mut launchpad = engine.subscribe(LaunchPadTwin::new("Launchpad-01")).unwrap();
    let mut drone = engine.subscribe(DroneTwin::new("tello-1")).unwrap();
    let mut mission_log = engine.subscribe(MissionLogTwin::new("Launchpad-01")).unwrap();

    LaunchPadTwin::emit_launchpad_registered(engine, "Launchpad-01".into()).unwrap();
    DroneTwin::emit_drone_defined(
        engine,
        "tello-1".into(),
        "192.168.10.1".into(),
        Some("TELLO-A1B2C3".into()),
    )
    .unwrap();
    MissionTwin::emit_define_mission(engine, mission_id.clone(), "Survey".into(), survey_plan())
        .unwrap();

    LaunchPadTwin::emit_mission_queued(engine, "Launchpad-01".into(), mission_id.clone()).unwrap();
    let log = settle(&mut mission_log, |s| !s.next_missions.is_empty()).await;
    assert_eq!(log.next_missions, vec![mission_id.clone()]);

    LaunchPadTwin::emit_drone_mounted(engine, "Launchpad-01".into(), "tello-1".into()).unwrap();
    LaunchPadTwin::emit_drone_activated(engine, "Launchpad-01".into(), "tello-1".into()).unwrap();
    DroneTwin::emit_drone_connected(engine, "tello-1".into()).unwrap();
    DroneTwin::emit_drone_stats_updated(engine, "tello-1".into(), 87).unwrap();
    settle(&mut launchpad, |s| matches!(s, LaunchPadState::Activated { .. })).await;

    LaunchPadTwin::emit_drone_started(
        engine,
        "Launchpad-01".into(),
        "tello-1".into(),
        mission_id.clone(),
    )
    .unwrap();
    DroneTwin::emit_drone_launched(engine, "tello-1".into(), mission_id.clone()).unwrap();

    let log = settle(&mut mission_log, |s| s.current_mission.is_some()).await;
    assert!(log.next_missions.is_empty());
    assert_eq!(log.current_mission.as_ref().unwrap().assigned_drone, "tello-1");

    for waypoint_id in 1..=3 {
        DroneTwin::emit_drone_started_to_next_waypoint(
            engine,
            "tello-1".into(),
            mission_id.clone(),
            waypoint_id,
        )
        .unwrap();
        DroneTwin::emit_drone_arrived_at_waypoint(
            engine,
            "tello-1".into(),
            mission_id.clone(),
            waypoint_id,
        )
        .unwrap();
    }
    let state = settle(&mut drone, |s| {
        matches!(s, DroneTwinState::Launched(l) if l.at_waypoint_id == 3)
    })
    .await;
    assert_eq!(state.battery(), Some(87));

    DroneTwin::emit_drone_mission_completed(engine, "tello-1".into(), mission_id.clone()).unwrap();
    DroneTwin::emit_drone_landed(
        engine,
        "tello-1".into(),
        Position {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        },
    )
    .unwrap();

    let log = settle(&mut mission_log, |s| !s.completed_missions.is_empty()).await;
    assert_eq!(log.current_mission, None);
    assert_eq!(log.completed_missions.len(), 1);
    assert_eq!(log.completed_missions[0].mission_id, mission_id);
    assert_eq!(log.completed_missions[0].drone, "tello-1");

    let state = settle(&mut drone, |s| matches!(s, DroneTwinState::Used(_))).await;
    match state {
        DroneTwinState::Used(used) => {
            assert_eq!(used.last_mission_id, mission_id);
            assert_eq!(used.ssid.as_deref(), Some("TELLO-A1B2C3"));
        }
        other => panic!("expected used drone, got {:?}", other),
    }
    assert_eq!(
        settle(&mut launchpad, |s| matches!(s, LaunchPadState::Used { .. })).await,
        LaunchPadState::Used {
            id: "Launchpad-01".into(),
            mission_id: mission_id.clone()
        }
    );

    // The one-shot read agrees with the live twins.
    let mission = engine.current_state(&MissionTwin::new(mission_id.clone())).unwrap();
    match mission {
        MissionTwinState::Defined(m) => assert_eq!(m.total_duration_ms(), 7000.0),
        other => panic!("expected defined mission, got {:?}", other),
    }
    assert_eq!(
        engine.current_state(&MissionLogTwin::new("Launchpad-01")).unwrap(),
        mission_log.state()
    );

    launchpad.cancel().await.unwrap();
    drone.cancel().await.unwrap();
    mission_log.cancel().await.unwrap();
}

#[tokio::test]
async fn test_drone_returns_to_ready_after_flight() {
    init_tracing();
    let node = TestNode::new("node-a");
    let engine = &node.engine;
    let twin = DroneTwin::new("tello-2");

    DroneTwin::emit_drone_ready(engine, "tello-2".into(), Some("10.0.0.2".into())).unwrap();
    DroneTwin::emit_drone_connected(engine, "tello-2".into()).unwrap();
    DroneTwin::emit_drone_launched(engine, "tello-2".into(), "m1".into()).unwrap();
    DroneTwin::emit_drone_landed(
        engine,
        "tello-2".into(),
        Position {
            x: 1.0,
            y: 1.0,
            z: 0.0,
        },
    )
    .unwrap();
    DroneTwin::emit_drone_ready(engine, "tello-2".into(), None).unwrap();

    // Subscribing after the fact catches up from the log.
    let drone = engine.subscribe(twin.clone()).unwrap();
    match drone.state() {
        DroneTwinState::Ready(ready) => assert_eq!(ready.ip, "10.0.0.2"),
        other => panic!("expected ready drone, got {:?}", other),
    }
    assert_eq!(drone.state(), engine.current_state(&twin).unwrap());
    assert_eq!(drone.twin(), "drone:tello-2");
    drone.cancel().await.unwrap();
}

#[tokio::test]
async fn test_timeout_after_launch_is_ignored() {
    init_tracing();
    let node = TestNode::new("node-a");
    let engine = &node.engine;

    LaunchPadTwin::emit_drone_mounted(engine, "Launchpad-02".into(), "tello-3".into()).unwrap();
    LaunchPadTwin::emit_drone_activated(engine, "Launchpad-02".into(), "tello-3".into()).unwrap();
    LaunchPadTwin::emit_drone_started(
        engine,
        "Launchpad-02".into(),
        "tello-3".into(),
        "m9".into(),
    )
    .unwrap();
    LaunchPadTwin::emit_activate_drone_timeout(engine, "Launchpad-02".into(), "tello-3".into())
        .unwrap();

    let state = engine.current_state(&LaunchPadTwin::new("Launchpad-02")).unwrap();
    assert_eq!(
        state,
        LaunchPadState::Used {
            id: "Launchpad-02".into(),
            mission_id: "m9".into()
        }
    );
}
