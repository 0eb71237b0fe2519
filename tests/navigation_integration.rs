//! Route traversal and obstacle avoidance, end to end through the world loop

use glam::Vec3;
use proptest::prelude::*;

use iron_arena::agent::{AgentStats, Archetype};
use iron_arena::core::config::EngineConfig;
use iron_arena::core::types::DecisionEvent;
use iron_arena::route::Route;
use iron_arena::sim::{Circle, SimWorld};

fn open_world() -> SimWorld {
    SimWorld::new(EngineConfig::default(), 0.1, Vec::new())
}

#[test]
fn test_loop_patrol_revisits_both_ends() {
    let mut world = open_world();
    let near_end = Vec3::new(0.0, 0.0, 6.0);
    let far_end = Vec3::new(0.0, 0.0, -6.0);
    let guard = world.arena.spawn_npc(
        Archetype::Guard,
        Vec3::ZERO,
        Vec3::Z,
        AgentStats::default(),
        Some(Route::patrol_loop(vec![near_end, far_end])),
    );

    let mut near_visits = 0;
    let mut far_visits = 0;
    for _ in 0..600 {
        world.run_tick();
        let pos = world.arena.get(guard).unwrap().body.position;
        if pos.distance(near_end) < 1.5 {
            near_visits += 1;
        }
        if pos.distance(far_end) < 1.5 {
            far_visits += 1;
        }
    }
    assert!(
        near_visits > 0 && far_visits > 0,
        "a looping patrol must walk both legs of its circuit"
    );
}

#[test]
fn test_stop_route_halts_forever() {
    let mut world = open_world();
    let terminus = Vec3::new(0.0, 0.0, 9.0);
    let guard = world.arena.spawn_npc(
        Archetype::Guard,
        Vec3::ZERO,
        Vec3::Z,
        AgentStats::default(),
        Some(Route::one_way(vec![Vec3::new(0.0, 0.0, 4.0), terminus])),
    );

    for _ in 0..200 {
        world.run_tick();
    }
    let parked = world.arena.get(guard).unwrap();
    assert!(parked.route.as_ref().unwrap().is_stopped());
    assert!(parked.body.position.distance(terminus) < 1.5);
    let parked_pos = parked.body.position;
    let parked_fwd = parked.body.forward;

    // The terminus is final: no further motion, no further rotation
    for _ in 0..100 {
        world.run_tick();
    }
    let later = world.arena.get(guard).unwrap();
    assert_eq!(later.body.position, parked_pos);
    assert_eq!(later.body.forward, parked_fwd);
}

#[test]
fn test_new_waypoint_levels_to_agent_elevation() {
    let mut world = open_world();
    // Waypoints authored five units in the air; the agent walks at ground level
    let guard = world.arena.spawn_npc(
        Archetype::Guard,
        Vec3::ZERO,
        Vec3::Z,
        AgentStats::default(),
        Some(Route::patrol_loop(vec![
            Vec3::new(0.0, 5.0, 3.0),
            Vec3::new(0.0, 5.0, -3.0),
        ])),
    );

    for _ in 0..60 {
        world.run_tick();
    }
    let agent = world.arena.get(guard).unwrap();
    assert_eq!(agent.body.position.y, 0.0);
    let current = agent.route.as_ref().unwrap().current().unwrap();
    assert_eq!(
        current.y, 0.0,
        "waypoints entered after an index change level to the agent"
    );
}

#[test]
fn test_caravan_sheds_value_each_circuit() {
    let mut world = open_world();
    let here = Vec3::ZERO;
    let there = Vec3::new(0.0, 0.0, 4.0);
    let caravan = world.arena.spawn_npc(
        Archetype::Caravan,
        here,
        Vec3::Z,
        AgentStats::default(),
        Some(Route::ping_pong(vec![here, there])),
    );

    let mut circuit_values = Vec::new();
    for _ in 0..400 {
        for event in world.run_tick() {
            if let DecisionEvent::CircuitCompleted { agent, point_value } = event {
                assert_eq!(agent, caravan);
                circuit_values.push(point_value);
            }
        }
    }
    assert!(
        circuit_values.len() >= 2,
        "expected repeated circuits, saw {}",
        circuit_values.len()
    );
    // 100 points decaying by 10 per circuit
    assert_eq!(circuit_values[0], 90);
    assert_eq!(circuit_values[1], 80);
    assert_eq!(
        world.arena.get(caravan).unwrap().stats.point_value,
        *circuit_values.last().unwrap()
    );
}

#[test]
fn test_empty_route_disables_the_agent() {
    let mut world = open_world();
    let caravan = world.arena.spawn_npc(
        Archetype::Caravan,
        Vec3::ZERO,
        Vec3::Z,
        AgentStats::default(),
        None,
    );

    let startup = world.startup_events();
    assert_eq!(startup, vec![DecisionEvent::AgentDisabled { agent: caravan }]);

    let before = world.arena.get(caravan).unwrap().body.position;
    for _ in 0..50 {
        world.run_tick();
    }
    assert_eq!(world.arena.get(caravan).unwrap().body.position, before);
}

#[test]
fn test_avoidance_detours_around_blocking_terrain() {
    // A rock dead center between the guard and its one-way terminus
    let mut world = SimWorld::new(
        EngineConfig::default(),
        0.1,
        vec![Circle::new(0.0, 10.0, 3.0)],
    );
    let terminus = Vec3::new(0.0, 0.0, 30.0);
    let guard = world.arena.spawn_npc(
        Archetype::Guard,
        Vec3::ZERO,
        Vec3::Z,
        AgentStats::default(),
        Some(Route::one_way(vec![terminus])),
    );

    let mut engaged_avoidance = false;
    for _ in 0..600 {
        world.run_tick();
        engaged_avoidance |= world.arena.get(guard).unwrap().avoidance.is_active();
    }
    assert!(
        engaged_avoidance,
        "the rock must trigger at least one avoidance cycle"
    );
    let final_pos = world.arena.get(guard).unwrap().body.position;
    assert!(
        final_pos.distance(terminus) < 1.5,
        "guard should still reach the terminus, ended at {final_pos}"
    );
}

proptest! {
    #[test]
    fn ping_pong_index_always_moves(len in 2usize..6, advances in 1usize..40) {
        let points: Vec<Vec3> = (0..len).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect();
        let mut route = Route::ping_pong(points);
        let mut previous = route.index();
        for _ in 0..advances {
            let step = route.advance(0.0);
            prop_assert!(step.index_changed);
            prop_assert_ne!(route.index(), previous);
            prop_assert!(route.index() < len);
            previous = route.index();
        }
    }

    #[test]
    fn stop_route_is_a_fixed_point(len in 1usize..6) {
        let points: Vec<Vec3> = (0..len).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect();
        let mut route = Route::one_way(points);
        for _ in 0..len {
            route.advance(0.0);
        }
        prop_assert!(route.is_stopped());
        let parked = route.index();
        let step = route.advance(0.0);
        prop_assert!(!step.index_changed);
        prop_assert_eq!(route.index(), parked);
    }
}
