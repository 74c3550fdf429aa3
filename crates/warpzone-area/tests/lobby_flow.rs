//! Integration tests for the lobby using a scripted world.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use warpzone_area::{
    Area, AreaError, Containment, CountdownPhase, Lobby, LobbyConfig, Outbound, PartySizePolicy,
    Presence,
};
use warpzone_protocol::{AreaId, Notification, PlayerId, Recipient, Vec3};

// =========================================================================
// Scripted world: avatars stand in named areas and can be moved out.
// =========================================================================

#[derive(Default)]
struct ScriptedWorld {
    inside: HashSet<(PlayerId, AreaId)>,
    alive: HashSet<PlayerId>,
    positions: HashMap<PlayerId, Vec3>,
}

impl ScriptedWorld {
    fn walk_in(&mut self, id: u64, area: &str) {
        self.alive.insert(PlayerId(id));
        self.inside.insert((PlayerId(id), area.into()));
    }

    /// Avatar is gone but its last known spot still counts as inside.
    fn detach(&mut self, id: u64) {
        self.alive.remove(&PlayerId(id));
    }

    fn despawn(&mut self, id: u64) {
        self.alive.remove(&PlayerId(id));
        self.inside.retain(|(p, _)| *p != PlayerId(id));
    }
}

impl Containment for ScriptedWorld {
    fn is_inside(&self, player: PlayerId, area: &Area) -> bool {
        self.inside.contains(&(player, area.id.clone()))
    }
}

impl Presence for ScriptedWorld {
    fn move_to(&mut self, player: PlayerId, to: Vec3) -> bool {
        if !self.alive.contains(&player) {
            return false;
        }
        self.inside.retain(|(p, _)| *p != player);
        self.positions.insert(player, to);
        true
    }
}

type TestLobby = Lobby<ScriptedWorld, Vec<Outbound>>;

const DEST: Vec3 = Vec3::new(120.0, 10.0, -40.0);

fn alpha() -> AreaId {
    AreaId::new("Alpha")
}

fn lobby_with(config: LobbyConfig) -> TestLobby {
    let mut lobby = Lobby::new(config, ScriptedWorld::default(), Vec::new());
    lobby.register_area("Alpha", None);
    lobby.set_destination("Alpha", DEST);
    lobby
}

fn lobby() -> TestLobby {
    lobby_with(LobbyConfig::default())
}

/// Connects participants and puts them inside `area`, then runs one tick.
fn gather(lobby: &mut TestLobby, area: &str, ids: &[u64]) {
    for &id in ids {
        lobby.connect(PlayerId(id)).unwrap();
        lobby.world_mut().walk_in(id, area);
    }
    lobby.tick();
}

fn run_ticks(lobby: &mut TestLobby, n: usize) {
    for _ in 0..n {
        lobby.tick();
    }
}

fn to_player(lobby: &TestLobby, id: u64) -> Vec<Notification> {
    lobby
        .sink()
        .iter()
        .filter(|(to, _)| *to == Recipient::Player(PlayerId(id)))
        .map(|(_, n)| n.clone())
        .collect()
}

fn to_area(lobby: &TestLobby, area: &AreaId) -> Vec<Notification> {
    lobby
        .sink()
        .iter()
        .filter(|(to, _)| *to == Recipient::Area(area.clone()))
        .map(|(_, n)| n.clone())
        .collect()
}

// =========================================================================
// Tests
// =========================================================================

#[test]
fn test_full_countdown_relocates_the_group() {
    let mut lobby = lobby();
    gather(&mut lobby, "Alpha", &[1, 2, 3]);

    assert_eq!(
        to_player(&lobby, 1),
        vec![Notification::ShowJoinUi { area: alpha() }]
    );

    assert_eq!(lobby.request_start(&alpha(), 3).unwrap(), 3);
    lobby.sink_mut().clear();

    // A fourth arrival does not fit the captured party of three.
    gather(&mut lobby, "Alpha", &[4]);
    assert_eq!(lobby.area_info(&alpha()).unwrap().members.len(), 3);

    // 15 s at 250 ms per tick, counting the one above.
    run_ticks(&mut lobby, 59);

    let landed = Vec3::new(120.0, 13.0, -40.0);
    for id in 1..=3 {
        assert_eq!(lobby.world().positions[&PlayerId(id)], landed);
        assert_eq!(
            to_player(&lobby, id),
            vec![
                Notification::HideLeaveOption,
                Notification::ArrivalEffect {
                    player: PlayerId(id)
                },
            ]
        );
    }

    let area_msgs = to_area(&lobby, &alpha());
    let pulses: Vec<u32> = area_msgs
        .iter()
        .filter_map(|n| match n {
            Notification::TickPulse { remaining_secs, .. } => Some(*remaining_secs),
            _ => None,
        })
        .collect();
    assert_eq!(pulses, vec![5, 4, 3, 2, 1, 0]);

    let pre_teleports = area_msgs
        .iter()
        .filter(|n| matches!(n, Notification::PreTeleportEffect { .. }))
        .count();
    assert_eq!(pre_teleports, 1);

    assert_eq!(lobby.area_info(&alpha()).unwrap().phase, CountdownPhase::Idle);
}

#[test]
fn test_display_counts_down_against_captured_size() {
    let mut lobby = lobby();
    gather(&mut lobby, "Alpha", &[1, 2]);
    lobby.request_start(&alpha(), 3).unwrap();
    lobby.sink_mut().clear();

    lobby.tick();

    assert_eq!(
        to_area(&lobby, &alpha()),
        vec![Notification::DisplayUpdate {
            area: alpha(),
            remaining_secs: Some(15),
            count: 2,
            capacity: 3,
        }]
    );
}

#[test]
fn test_second_start_rejected_without_touching_first() {
    let mut lobby = lobby();
    gather(&mut lobby, "Alpha", &[1, 2]);
    lobby.request_start(&alpha(), 2).unwrap();
    lobby.tick();

    let err = lobby.request_start(&alpha(), 4).unwrap_err();
    assert!(matches!(err, AreaError::CountdownAlreadyRunning(_)));

    let info = lobby.area_info(&alpha()).unwrap();
    assert_eq!(
        info.phase,
        CountdownPhase::Running {
            remaining: Duration::from_millis(14_750),
            captured_size: 2,
        }
    );
}

#[test]
fn test_only_first_four_of_five_are_members() {
    let mut lobby = lobby();
    gather(&mut lobby, "Alpha", &[1, 2, 3, 4, 5]);

    let info = lobby.area_info(&alpha()).unwrap();
    assert_eq!(
        info.members,
        vec![PlayerId(1), PlayerId(2), PlayerId(3), PlayerId(4)]
    );
    assert_eq!(lobby.roster().area_of(&PlayerId(5)), None);
}

#[test]
fn test_captured_size_locks_out_newcomers_until_expiry() {
    let mut lobby = lobby();
    gather(&mut lobby, "Alpha", &[1, 2]);
    lobby.request_start(&alpha(), 2).unwrap();

    gather(&mut lobby, "Alpha", &[3]);
    assert_eq!(lobby.area_info(&alpha()).unwrap().members.len(), 2);
    assert_eq!(lobby.capacity_of(&alpha()), Some(2));

    run_ticks(&mut lobby, 60);
    // The relocated pair is gone; the newcomer takes a slot.
    lobby.tick();
    assert_eq!(lobby.area_info(&alpha()).unwrap().members, vec![PlayerId(3)]);
    assert_eq!(lobby.capacity_of(&alpha()), Some(4));
}

#[test]
fn test_missing_destination_still_frees_the_area() {
    let mut lobby = Lobby::new(LobbyConfig::default(), ScriptedWorld::default(), Vec::new());
    lobby.register_area("Alpha", None);
    gather(&mut lobby, "Alpha", &[1]);
    lobby.request_start(&alpha(), 1).unwrap();

    let mut expired = Vec::new();
    for _ in 0..60 {
        expired.extend(lobby.tick().expired);
    }

    assert_eq!(expired.len(), 1);
    assert!(matches!(
        expired[0].1,
        Err(AreaError::DestinationUnresolved(_))
    ));
    assert!(lobby.world().positions.is_empty());
    assert!(!lobby.area_info(&alpha()).unwrap().relocating);
    assert!(lobby.request_start(&alpha(), 1).is_ok());
}

#[test]
fn test_vanished_member_skipped_at_relocation() {
    let mut lobby = lobby();
    gather(&mut lobby, "Alpha", &[1, 2]);
    lobby.request_start(&alpha(), 2).unwrap();
    run_ticks(&mut lobby, 59);

    // Still counted inside, so P-2 is captured, but the move finds no avatar.
    lobby.world_mut().detach(2);
    let report = lobby.tick();

    let (_, result) = &report.expired[0];
    let relocation = result.as_ref().unwrap();
    assert_eq!(relocation.relocated, vec![PlayerId(1)]);
    assert_eq!(relocation.skipped, vec![PlayerId(2)]);
    assert!(!lobby.world().positions.contains_key(&PlayerId(2)));
    assert!(!to_player(&lobby, 2).contains(&Notification::ArrivalEffect {
        player: PlayerId(2)
    }));
}

#[test]
fn test_member_despawned_before_expiry_is_not_captured() {
    let mut lobby = lobby();
    gather(&mut lobby, "Alpha", &[1, 2]);
    lobby.request_start(&alpha(), 2).unwrap();
    run_ticks(&mut lobby, 59);

    // Gone from the world entirely: the refresh drops P-2 before the
    // countdown advances.
    lobby.world_mut().despawn(2);
    let report = lobby.tick();

    let (_, result) = &report.expired[0];
    let relocation = result.as_ref().unwrap();
    assert_eq!(relocation.relocated, vec![PlayerId(1)]);
    assert!(relocation.skipped.is_empty());
}

#[test]
fn test_leave_moves_to_fallback_and_refresh_drops_member() {
    let mut lobby = lobby_with(LobbyConfig {
        fallback_location: Vec3::new(0.0, 1.0, 0.0),
        ..LobbyConfig::default()
    });
    gather(&mut lobby, "Alpha", &[1, 2]);
    lobby.request_start(&alpha(), 2).unwrap();

    assert!(lobby.request_leave(PlayerId(1)));
    assert_eq!(
        lobby.world().positions[&PlayerId(1)],
        Vec3::new(0.0, 1.0, 0.0)
    );

    lobby.tick();
    let info = lobby.area_info(&alpha()).unwrap();
    assert_eq!(info.members, vec![PlayerId(2)]);
    assert!(matches!(info.phase, CountdownPhase::Running { .. }));
    assert_eq!(
        to_player(&lobby, 1).last(),
        Some(&Notification::HideLeaveOption)
    );
}

#[test]
fn test_leave_twice_is_idempotent() {
    let mut lobby = lobby();
    gather(&mut lobby, "Alpha", &[1]);

    assert!(lobby.request_leave(PlayerId(1)));
    assert!(lobby.request_leave(PlayerId(1)));
    lobby.tick();
    lobby.tick();
    assert!(lobby.area_info(&alpha()).unwrap().members.is_empty());
}

#[test]
fn test_party_size_clamped_by_default() {
    let mut lobby = lobby();
    gather(&mut lobby, "Alpha", &[1, 2]);

    assert_eq!(lobby.request_start(&alpha(), 10).unwrap(), 4);
}

#[test]
fn test_party_size_rejected_under_strict_policy() {
    let mut lobby = lobby_with(LobbyConfig {
        party_size_policy: PartySizePolicy::Reject,
        ..LobbyConfig::default()
    });
    gather(&mut lobby, "Alpha", &[1, 2]);

    let err = lobby.request_start(&alpha(), 1).unwrap_err();
    assert!(matches!(
        err,
        AreaError::InvalidPartySize {
            requested: 1,
            min: 2,
            max: 4,
            ..
        }
    ));
    assert_eq!(lobby.area_info(&alpha()).unwrap().phase, CountdownPhase::Idle);
}

#[test]
fn test_areas_count_down_independently() {
    let mut lobby = lobby();
    lobby.register_area("Beta", Some(2));
    lobby.set_destination("Beta", Vec3::new(-5.0, 0.0, 0.0));
    gather(&mut lobby, "Alpha", &[1]);
    gather(&mut lobby, "Beta", &[2]);

    lobby.request_start(&alpha(), 1).unwrap();
    run_ticks(&mut lobby, 20);
    lobby.request_start(&"Beta".into(), 1).unwrap();
    run_ticks(&mut lobby, 40);

    assert!(lobby.world().positions.contains_key(&PlayerId(1)));
    assert!(!lobby.world().positions.contains_key(&PlayerId(2)));

    run_ticks(&mut lobby, 20);
    assert_eq!(
        lobby.world().positions[&PlayerId(2)],
        Vec3::new(-5.0, 3.0, 0.0)
    );
}

#[test]
fn test_config_from_json_drives_the_lobby() {
    let config = LobbyConfig::from_json(
        r#"{ "default_capacity": 2, "party_size_policy": "Reject" }"#,
    )
    .unwrap();
    let mut lobby = lobby_with(config);
    gather(&mut lobby, "Alpha", &[1, 2, 3]);

    assert_eq!(lobby.area_info(&alpha()).unwrap().members.len(), 2);
    assert!(lobby.request_start(&alpha(), 3).is_err());
}
