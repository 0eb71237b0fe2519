//! Read-only world snapshot handed to a state machine for one tick

use ordered_float::OrderedFloat;

use crate::agent::{Agent, AgentsView};
use crate::core::config::EngineConfig;
use crate::core::types::Tick;
use crate::perception::{self, ObstacleProbe};

/// Everything a personality may consult while deciding. The deciding agent
/// itself is passed separately and mutably; this context covers the rest of
/// the world.
pub struct DecisionContext<'a> {
    pub others: AgentsView<'a>,
    pub probe: &'a dyn ObstacleProbe,
    pub cfg: &'a EngineConfig,
    pub tick: Tick,
    /// Seconds since the battle started
    pub now: f32,
    /// Seconds covered by this tick
    pub dt: f32,
}

impl<'a> DecisionContext<'a> {
    /// The agent's assigned target, if it is still alive
    pub fn target_of(&self, agent: &Agent) -> Option<&Agent> {
        agent.target.and_then(|id| self.others.get(id))
    }

    /// The most recently heard agent, if it is still alive
    pub fn heard_by(&self, agent: &Agent) -> Option<&Agent> {
        agent.last_heard.and_then(|id| self.others.get(id))
    }

    /// Whether `other` sits inside this agent's engagement radius
    pub fn within_sense(&self, agent: &Agent, other: &Agent) -> bool {
        let radius = agent.stats.sense_radius;
        agent.body.position.distance_squared(other.body.position) <= radius * radius
    }

    /// The latched sound source, provided it is a player still within
    /// hearing range; stale latches resolve to `None`
    pub fn audible_player(&self, agent: &Agent) -> Option<&Agent> {
        self.heard_by(agent)
            .filter(|other| other.player_controlled && perception::can_hear(agent, Some(*other)))
    }

    /// Closest player the agent can currently hear, latch or no latch
    pub fn nearest_audible_player(&self, agent: &Agent) -> Option<&Agent> {
        self.others
            .iter_alive()
            .filter(|other| other.player_controlled && perception::can_hear(agent, Some(*other)))
            .min_by_key(|other| {
                OrderedFloat(agent.body.position.distance_squared(other.body.position))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentArena, AgentStats, Archetype};
    use crate::core::types::AgentId;
    use crate::perception::ProbeHit;
    use glam::Vec3;

    struct OpenField;

    impl ObstacleProbe for OpenField {
        fn cast(&self, _o: Vec3, _d: Vec3, _m: f32) -> Option<ProbeHit> {
            None
        }
    }

    fn hunter_arena() -> (AgentArena, AgentId) {
        let mut arena = AgentArena::new();
        let hunter = arena.spawn_npc(
            Archetype::Hunter,
            Vec3::ZERO,
            Vec3::Z,
            AgentStats::default(),
            None,
        );
        (arena, hunter)
    }

    #[test]
    fn test_nearest_audible_player_prefers_closest_and_skips_npcs() {
        let (mut arena, hunter) = hunter_arena();
        // A fellow agent parked closer than any player never wins the scan
        arena.spawn_npc(
            Archetype::Assassin,
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::Z,
            AgentStats::default(),
            None,
        );
        let near = arena.spawn_player(Vec3::new(0.0, 0.0, 5.0), Vec3::Z, AgentStats::default());
        arena.spawn_player(Vec3::new(0.0, 0.0, 15.0), Vec3::Z, AgentStats::default());

        let cfg = EngineConfig::default();
        let (agent, others) = arena.split_view(hunter).unwrap();
        let ctx = DecisionContext {
            others,
            probe: &OpenField,
            cfg: &cfg,
            tick: 0,
            now: 0.0,
            dt: 1.0,
        };
        assert_eq!(ctx.nearest_audible_player(agent).unwrap().id, near);
    }

    #[test]
    fn test_audible_player_drops_stale_latch() {
        let (mut arena, hunter) = hunter_arena();
        // Default hearing radius is 25; the latched source starts beyond it
        let player = arena.spawn_player(Vec3::new(0.0, 0.0, 40.0), Vec3::Z, AgentStats::default());
        arena.get_mut(hunter).unwrap().last_heard = Some(player);

        let cfg = EngineConfig::default();
        {
            let (agent, others) = arena.split_view(hunter).unwrap();
            let ctx = DecisionContext {
                others,
                probe: &OpenField,
                cfg: &cfg,
                tick: 0,
                now: 0.0,
                dt: 1.0,
            };
            assert!(ctx.audible_player(agent).is_none());
        }

        arena.get_mut(player).unwrap().body.position = Vec3::new(0.0, 0.0, 10.0);
        let (agent, others) = arena.split_view(hunter).unwrap();
        let ctx = DecisionContext {
            others,
            probe: &OpenField,
            cfg: &cfg,
            tick: 0,
            now: 0.0,
            dt: 1.0,
        };
        assert_eq!(ctx.audible_player(agent).unwrap().id, player);
    }

    #[test]
    fn test_target_of_resolves_only_living_agents() {
        let (mut arena, hunter) = hunter_arena();
        let player = arena.spawn_player(Vec3::new(0.0, 0.0, 5.0), Vec3::Z, AgentStats::default());
        arena.get_mut(hunter).unwrap().target = Some(player);
        arena.apply_damage(player, 1000.0).unwrap();

        let cfg = EngineConfig::default();
        let (agent, others) = arena.split_view(hunter).unwrap();
        let ctx = DecisionContext {
            others,
            probe: &OpenField,
            cfg: &cfg,
            tick: 0,
            now: 0.0,
            dt: 1.0,
        };
        assert!(ctx.target_of(agent).is_none());
    }
}
