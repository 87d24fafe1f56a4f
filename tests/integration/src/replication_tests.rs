//! Twins across replicas.
//!
//! Each node appends to its own stream and receives the other's events late
//! and in arbitrary order. Twins must refold when an event lands behind the
//! events they already folded, and all replicas must converge.

use crate::test_utils::*;
use launchpad_core::{EventLog, Ingest};
use launchpad_domain::{
    DroneTwin, DroneTwinState, LaunchPadTwin, MissionLogTwin, MissionTwin, MissionTwinState,
    VisibleMissionRegistry,
};

#[tokio::test]
async fn test_late_event_triggers_refold() {
    init_tracing();
    let pilot = TestNode::new("node-pilot");
    let tower = TestNode::new("node-tower");

    DroneTwin::emit_drone_ready(&pilot.engine, "tello-1".into(), Some("10.0.0.7".into())).unwrap();
    DroneTwin::emit_drone_connected(&pilot.engine, "tello-1".into()).unwrap();
    DroneTwin::emit_drone_launched(&pilot.engine, "tello-1".into(), "m1".into()).unwrap();
    let events = pilot.events();
    assert_eq!(events.len(), 3);

    let mut drone = tower.engine.subscribe(DroneTwin::new("tello-1")).unwrap();

    // Ready, then the launch, then the connect that belongs in between.
    let outcomes = tower.deliver([events[0].clone(), events[2].clone()]);
    assert_eq!(outcomes, vec![Ingest::Appended, Ingest::Appended]);
    let outcomes = tower.deliver([events[1].clone()]);
    assert_eq!(outcomes, vec![Ingest::Inserted]);

    let state = settle(&mut drone, |s| matches!(s, DroneTwinState::Launched(_))).await;
    match state {
        DroneTwinState::Launched(launched) => {
            assert_eq!(launched.mission_id, "m1");
            assert_eq!(launched.ip, "10.0.0.7");
        }
        other => panic!("expected launched drone, got {:?}", other),
    }
    assert_eq!(
        drone.state(),
        pilot.engine.current_state(&DroneTwin::new("tello-1")).unwrap()
    );
    drone.cancel().await.unwrap();
}

#[tokio::test]
async fn test_duplicate_delivery_is_harmless() {
    init_tracing();
    let a = TestNode::new("node-a");
    let b = TestNode::new("node-b");

    LaunchPadTwin::emit_mission_queued(&a.engine, "Launchpad-01".into(), "x".into()).unwrap();
    b.pull_from(&a);
    let outcomes = b.pull_from(&a);
    assert_eq!(outcomes, vec![Ingest::Duplicate]);

    let log = b
        .engine
        .current_state(&MissionLogTwin::new("Launchpad-01"))
        .unwrap();
    assert_eq!(log.next_missions, vec!["x"]);
}

#[tokio::test]
async fn test_mission_visibility_converges() {
    init_tracing();
    let planner = TestNode::new("node-planner");
    let operator = TestNode::new("node-operator");

    // The operator hides the mission before the definition reached them.
    MissionTwin::emit_show_mission(&operator.engine, "m1".into(), false).unwrap();
    let placeholder = operator
        .engine
        .current_state(&MissionTwin::new("m1"))
        .unwrap();
    match placeholder {
        MissionTwinState::Defined(m) => {
            assert_eq!(m.name, "m1");
            assert!(!m.visible);
            assert!(m.waypoints.is_empty());
        }
        other => panic!("expected placeholder mission, got {:?}", other),
    }

    MissionTwin::emit_define_mission(&planner.engine, "m1".into(), "Survey".into(), vec![])
        .unwrap();
    sync(&planner, &operator);

    let on_planner = planner.engine.current_state(&MissionTwin::new("m1")).unwrap();
    let on_operator = operator.engine.current_state(&MissionTwin::new("m1")).unwrap();
    assert_eq!(on_planner, on_operator);
    match on_planner {
        MissionTwinState::Defined(m) => {
            assert_eq!(m.name, "Survey");
            assert!(!m.visible);
        }
        other => panic!("expected defined mission, got {:?}", other),
    }
    assert_eq!(
        planner.engine.current_state(&VisibleMissionRegistry).unwrap(),
        operator.engine.current_state(&VisibleMissionRegistry).unwrap()
    );
}

#[tokio::test]
async fn test_mission_log_merges_streams_from_several_nodes() {
    init_tracing();
    let launchpad = TestNode::new("node-launchpad");
    let drone = TestNode::new("node-drone");

    let mut mission_log = launchpad
        .engine
        .subscribe(MissionLogTwin::new("Launchpad-01"))
        .unwrap();

    LaunchPadTwin::emit_mission_queued(&launchpad.engine, "Launchpad-01".into(), "x".into())
        .unwrap();
    LaunchPadTwin::emit_drone_started(
        &launchpad.engine,
        "Launchpad-01".into(),
        "tello-1".into(),
        "x".into(),
    )
    .unwrap();
    let log = settle(&mut mission_log, |s| s.current_mission.is_some()).await;
    assert!(log.next_missions.is_empty());

    // The drone node learns of the launch, flies, and reports back.
    drone.pull_from(&launchpad);
    DroneTwin::emit_drone_mission_completed(&drone.engine, "tello-1".into(), "x".into()).unwrap();
    launchpad.pull_from(&drone);

    let log = settle(&mut mission_log, |s| !s.completed_missions.is_empty()).await;
    assert_eq!(log.current_mission, None);
    assert_eq!(log.completed_missions[0].drone, "tello-1");
    assert_eq!(log.completed_missions[0].mission_id, "x");

    sync(&launchpad, &drone);
    assert_eq!(launchpad.events(), drone.events());
    assert_eq!(
        drone
            .engine
            .current_state(&MissionLogTwin::new("Launchpad-01"))
            .unwrap(),
        log
    );
    assert_eq!(launchpad.log.stream_id(), "node-launchpad");
    mission_log.cancel().await.unwrap();
}
