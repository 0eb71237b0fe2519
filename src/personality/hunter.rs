//! Hunter: relentless pursuit with a self-preservation loop
//!
//! Hunters chase their assigned target, open fire once it enters the
//! engagement radius, and break off through a flee/rest cycle when their
//! health drops to the flee threshold.

use glam::Vec3;
use tracing::debug;

use crate::agent::{Agent, RepairKind};
use crate::avoidance;
use crate::core::types::{DecisionEvent, FireOrder, Intent, Motion};
use crate::perception;
use crate::personality::{flee_motion, DecisionContext, Step};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HunterState {
    /// Close the distance to the assigned target
    Chase,
    /// Keep closing while firing whenever lock-on holds
    ChaseAndFire,
    /// Decision point between fleeing and resting
    CheckForFlee,
    /// Run from the target until the flee window expires
    Flee { started_at: f32 },
    /// Sit still and repair
    Rest { next_pulse: f32 },
}

impl HunterState {
    pub fn label(&self) -> &'static str {
        match self {
            HunterState::Chase => "hunter/chase",
            HunterState::ChaseAndFire => "hunter/chase_and_fire",
            HunterState::CheckForFlee => "hunter/check_for_flee",
            HunterState::Flee { .. } => "hunter/flee",
            HunterState::Rest { .. } => "hunter/rest",
        }
    }
}

pub(crate) fn tick(
    state: &mut HunterState,
    agent: &mut Agent,
    ctx: &DecisionContext,
    _events: &mut Vec<DecisionEvent>,
) -> Step {
    // The health gate outranks engagement: a hunter that crosses its flee
    // threshold mid-chase reconsiders before it fires another shot
    if matches!(*state, HunterState::Chase | HunterState::ChaseAndFire)
        && agent.stats.needs_to_flee()
    {
        debug!(agent = %agent.id, health = agent.stats.health, "health low, breaking off");
        *state = HunterState::CheckForFlee;
        return Step::Act(Intent::hold());
    }

    match state {
        HunterState::Chase => {
            let Some(target) = ctx.target_of(agent) else {
                return Step::Act(Intent::hold());
            };
            let point = target.body.position;
            let engaged = ctx.within_sense(agent, target);
            let motion = pursue(agent, ctx, point);
            if engaged {
                *state = HunterState::ChaseAndFire;
            }
            Step::Act(Intent::moving(motion))
        }
        HunterState::ChaseAndFire => {
            let Some(target) = ctx.target_of(agent) else {
                return Step::Act(Intent::hold());
            };
            let point = target.body.position;
            let engaged = ctx.within_sense(agent, target);
            let locked = perception::can_lock_on(agent, Some(target), ctx.probe);
            let mut intent = Intent::moving(pursue(agent, ctx, point));
            if locked {
                intent = intent.with_fire(FireOrder::standard(agent.stats.projectile_speed));
            }
            if !engaged {
                *state = HunterState::Chase;
            }
            Step::Act(intent)
        }
        HunterState::CheckForFlee => {
            // TODO: decide a real policy here; flee-vs-rest currently reduces
            // to target proximity, ignoring health margin and terrain
            let next = match ctx.target_of(agent) {
                Some(target) if ctx.within_sense(agent, target) => {
                    agent.avoidance.reset();
                    HunterState::Flee {
                        started_at: ctx.now,
                    }
                }
                _ => HunterState::Rest {
                    next_pulse: ctx.now + ctx.cfg.repair_tick_length,
                },
            };
            *state = next;
            Step::Act(Intent::hold())
        }
        HunterState::Flee { started_at } => {
            let started = *started_at;
            if ctx.now - started >= ctx.cfg.flee_before_checking {
                *state = HunterState::CheckForFlee;
                return Step::Act(Intent::hold());
            }
            let Some(threat) = ctx.target_of(agent).map(|t| t.body.position) else {
                // Nothing left to run from
                *state = HunterState::CheckForFlee;
                return Step::Act(Intent::hold());
            };
            let with_avoidance = ctx.now - started >= ctx.cfg.flee_before_avoiding;
            Step::Act(Intent::moving(flee_motion(agent, ctx, threat, with_avoidance)))
        }
        HunterState::Rest { next_pulse } => {
            match agent.stats.repair_kind {
                RepairKind::PerSecond => {
                    let amount = agent.stats.heal_rate * ctx.dt;
                    agent.stats.repair(amount);
                }
                RepairKind::PerTick => {
                    if ctx.now >= *next_pulse {
                        let amount = agent.stats.heal_rate;
                        agent.stats.repair(amount);
                        *next_pulse = ctx.now + ctx.cfg.repair_tick_length;
                    }
                }
            }
            if agent.stats.at_full_health() {
                debug!(agent = %agent.id, "repairs complete, resuming hunt");
                *state = HunterState::Chase;
            } else if let Some(target) = ctx.target_of(agent) {
                if ctx.within_sense(agent, target) {
                    agent.avoidance.reset();
                    *state = HunterState::Flee {
                        started_at: ctx.now,
                    };
                }
            }
            Step::Act(Intent::hold())
        }
    }
}

/// Drive toward a point, holding at face-off range instead of ramming it
fn pursue(agent: &mut Agent, ctx: &DecisionContext, point: Vec3) -> Motion {
    if let Some(motion) = avoidance::step(agent, ctx.probe, ctx.cfg, ctx.dt) {
        return motion;
    }
    let close = ctx.cfg.chase_close_enough;
    if agent.body.flat_distance_squared(point) <= close * close {
        return Motion::Face { point, haste: 1.0 };
    }
    if avoidance::forward_clear(agent, ctx.probe, ctx.cfg) {
        Motion::Rush {
            point,
            speed: agent.stats.move_speed,
        }
    } else {
        Motion::Turn {
            degrees_per_sec: agent.avoidance.turn_direction.sign() * agent.stats.turn_speed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentArena, AgentStats, Archetype};
    use crate::core::config::EngineConfig;
    use crate::core::types::AgentId;
    use crate::perception::{HitTarget, ObstacleProbe, ProbeHit};
    use crate::personality::Personality;

    struct OpenField;

    impl ObstacleProbe for OpenField {
        fn cast(&self, _o: Vec3, _d: Vec3, _m: f32) -> Option<ProbeHit> {
            None
        }
    }

    /// Confirms line of sight to one specific player body
    struct ConfirmPlayer(AgentId);

    impl ObstacleProbe for ConfirmPlayer {
        fn cast(&self, _o: Vec3, _d: Vec3, max: f32) -> Option<ProbeHit> {
            Some(ProbeHit {
                distance: max * 0.5,
                target: HitTarget::PlayerUnit(self.0),
            })
        }
    }

    fn setup(health: f32, target_offset: Vec3) -> (AgentArena, AgentId, AgentId) {
        let mut arena = AgentArena::new();
        let mut stats = AgentStats::default();
        stats.health = health;
        let hunter = arena.spawn_npc(Archetype::Hunter, Vec3::ZERO, Vec3::Z, stats, None);
        let player = arena.spawn_player(target_offset, Vec3::Z, AgentStats::default());
        arena.get_mut(hunter).unwrap().target = Some(player);
        (arena, hunter, player)
    }

    fn run_tick(
        arena: &mut AgentArena,
        id: AgentId,
        probe: &dyn ObstacleProbe,
        now: f32,
    ) -> Intent {
        let cfg = EngineConfig::default();
        let (agent, others) = arena.split_view(id).unwrap();
        let ctx = DecisionContext {
            others,
            probe,
            cfg: &cfg,
            tick: 0,
            now,
            dt: 1.0,
        };
        let mut personality = agent.personality.take().unwrap();
        let mut events = Vec::new();
        let intent = personality.tick(agent, &ctx, &mut events);
        agent.personality = Some(personality);
        intent
    }

    fn hunter_state(arena: &AgentArena, id: AgentId) -> HunterState {
        match &arena.get(id).unwrap().personality {
            Some(Personality::Hunter(state)) => *state,
            other => panic!("expected hunter personality, got {other:?}"),
        }
    }

    #[test]
    fn test_low_health_outranks_engagement() {
        // 40% health against a 50% threshold, target well inside sense range
        let (mut arena, hunter, player) = setup(40.0, Vec3::new(0.0, 0.0, 5.0));
        let intent = run_tick(&mut arena, hunter, &ConfirmPlayer(player), 0.0);
        assert_eq!(hunter_state(&arena, hunter), HunterState::CheckForFlee);
        assert!(intent.fire.is_none());
    }

    #[test]
    fn test_healthy_hunter_engages_in_sense_range() {
        let (mut arena, hunter, _) = setup(100.0, Vec3::new(0.0, 0.0, 5.0));
        let intent = run_tick(&mut arena, hunter, &OpenField, 0.0);
        assert_eq!(hunter_state(&arena, hunter), HunterState::ChaseAndFire);
        // The engagement tick itself still only chases
        assert!(intent.fire.is_none());
        assert!(matches!(intent.motion, Motion::Rush { .. }));
    }

    #[test]
    fn test_chase_and_fire_fires_when_locked() {
        let (mut arena, hunter, player) = setup(100.0, Vec3::new(0.0, 0.0, 5.0));
        run_tick(&mut arena, hunter, &ConfirmPlayer(player), 0.0);
        let intent = run_tick(&mut arena, hunter, &ConfirmPlayer(player), 1.0);
        assert!(intent.fire.is_some());
        assert_eq!(hunter_state(&arena, hunter), HunterState::ChaseAndFire);
    }

    #[test]
    fn test_blocked_sight_withholds_fire() {
        let (mut arena, hunter, player) = setup(100.0, Vec3::new(0.0, 0.0, 5.0));
        run_tick(&mut arena, hunter, &ConfirmPlayer(player), 0.0);
        // Probe no longer reports the target first: no lock, no shot
        let intent = run_tick(&mut arena, hunter, &OpenField, 1.0);
        assert!(intent.fire.is_none());
    }

    #[test]
    fn test_disengages_when_target_leaves_sense_range() {
        let (mut arena, hunter, player) = setup(100.0, Vec3::new(0.0, 0.0, 5.0));
        run_tick(&mut arena, hunter, &ConfirmPlayer(player), 0.0);
        arena.get_mut(player).unwrap().body.position = Vec3::new(0.0, 0.0, 50.0);
        run_tick(&mut arena, hunter, &OpenField, 1.0);
        assert_eq!(hunter_state(&arena, hunter), HunterState::Chase);
    }

    #[test]
    fn test_check_for_flee_branches_on_proximity() {
        // Threat nearby: flee
        let (mut arena, hunter, _) = setup(40.0, Vec3::new(0.0, 0.0, 5.0));
        arena.get_mut(hunter).unwrap().personality =
            Some(Personality::Hunter(HunterState::CheckForFlee));
        run_tick(&mut arena, hunter, &OpenField, 0.0);
        assert!(matches!(
            hunter_state(&arena, hunter),
            HunterState::Flee { .. }
        ));

        // Threat far away: rest
        let (mut arena, hunter, _) = setup(40.0, Vec3::new(0.0, 0.0, 50.0));
        arena.get_mut(hunter).unwrap().personality =
            Some(Personality::Hunter(HunterState::CheckForFlee));
        run_tick(&mut arena, hunter, &OpenField, 0.0);
        assert!(matches!(
            hunter_state(&arena, hunter),
            HunterState::Rest { .. }
        ));
    }

    #[test]
    fn test_flee_moves_away_from_target() {
        let (mut arena, hunter, _) = setup(40.0, Vec3::new(0.0, 0.0, 5.0));
        arena.get_mut(hunter).unwrap().personality =
            Some(Personality::Hunter(HunterState::Flee { started_at: 0.0 }));
        let intent = run_tick(&mut arena, hunter, &OpenField, 1.0);
        match intent.motion {
            Motion::Rush { point, .. } => assert!(point.z < 0.0),
            other => panic!("expected a rush away, got {other:?}"),
        }
    }

    #[test]
    fn test_flee_window_expiry_reconsiders() {
        let (mut arena, hunter, _) = setup(40.0, Vec3::new(0.0, 0.0, 5.0));
        arena.get_mut(hunter).unwrap().personality =
            Some(Personality::Hunter(HunterState::Flee { started_at: 0.0 }));
        let cfg = EngineConfig::default();
        run_tick(&mut arena, hunter, &OpenField, cfg.flee_before_checking);
        assert_eq!(hunter_state(&arena, hunter), HunterState::CheckForFlee);
    }

    #[test]
    fn test_rest_heals_per_second_and_resumes() {
        let (mut arena, hunter, _) = setup(98.0, Vec3::new(0.0, 0.0, 50.0));
        arena.get_mut(hunter).unwrap().personality =
            Some(Personality::Hunter(HunterState::Rest { next_pulse: 1.0 }));
        run_tick(&mut arena, hunter, &OpenField, 0.0);
        // 98 + 5 clamps to max and the hunt resumes
        assert_eq!(arena.get(hunter).unwrap().stats.health, 100.0);
        assert_eq!(hunter_state(&arena, hunter), HunterState::Chase);
    }

    #[test]
    fn test_rest_pulse_heals_once_per_interval() {
        let (mut arena, hunter, _) = setup(40.0, Vec3::new(0.0, 0.0, 50.0));
        {
            let agent = arena.get_mut(hunter).unwrap();
            agent.stats.repair_kind = RepairKind::PerTick;
            agent.personality = Some(Personality::Hunter(HunterState::Rest { next_pulse: 1.0 }));
        }
        run_tick(&mut arena, hunter, &OpenField, 0.5);
        assert_eq!(arena.get(hunter).unwrap().stats.health, 40.0);
        run_tick(&mut arena, hunter, &OpenField, 1.0);
        assert_eq!(arena.get(hunter).unwrap().stats.health, 45.0);
        // Same instant again: the pulse has already advanced
        run_tick(&mut arena, hunter, &OpenField, 1.0);
        assert_eq!(arena.get(hunter).unwrap().stats.health, 45.0);
    }

    #[test]
    fn test_rest_interrupted_by_nearby_target() {
        let (mut arena, hunter, _) = setup(40.0, Vec3::new(0.0, 0.0, 5.0));
        arena.get_mut(hunter).unwrap().personality =
            Some(Personality::Hunter(HunterState::Rest { next_pulse: 1.0 }));
        run_tick(&mut arena, hunter, &OpenField, 0.0);
        assert!(matches!(
            hunter_state(&arena, hunter),
            HunterState::Flee { .. }
        ));
    }
}
