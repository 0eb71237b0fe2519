//! Stateless perception queries: hearing, sight, and lock-on
//!
//! Nothing here caches anything between ticks. Every query recomputes from
//! current positions, so perception can never go stale; it can only be
//! wrong for the one tick in which the world changed under it.

use glam::Vec3;

use crate::agent::{Agent, AgentArena};
use crate::core::types::{signed_yaw_to, AgentId};

/// What a probe ray struck first
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitTarget {
    /// A player-controlled body
    PlayerUnit(AgentId),
    /// An NPC body
    NpcUnit(AgentId),
    /// Terrain or other static geometry
    Terrain,
}

impl HitTarget {
    pub fn is_player(&self) -> bool {
        matches!(self, HitTarget::PlayerUnit(_))
    }

    pub fn agent_id(&self) -> Option<AgentId> {
        match self {
            HitTarget::PlayerUnit(id) | HitTarget::NpcUnit(id) => Some(*id),
            HitTarget::Terrain => None,
        }
    }
}

/// First intersection along a probe ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeHit {
    pub distance: f32,
    pub target: HitTarget,
}

/// Line-of-sight and obstacle queries against the host world.
///
/// `direction` need not be normalized. A `None` result means the ray hit
/// nothing within `max_distance`; callers treat that as a clear path.
pub trait ObstacleProbe {
    fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<ProbeHit>;
}

/// Whether `other` is within this agent's hearing radius. Uses squared
/// distance against the squared radius; no occlusion check.
pub fn can_hear(agent: &Agent, other: Option<&Agent>) -> bool {
    let Some(other) = other else {
        return false;
    };
    if !other.alive {
        return false;
    }
    let radius = agent.stats.hearing_radius;
    agent.body.position.distance_squared(other.body.position) <= radius * radius
}

/// Whether `other` falls inside the sight cone and is the first thing a
/// sight-range probe toward it strikes
pub fn can_see(agent: &Agent, other: Option<&Agent>, probe: &dyn ObstacleProbe) -> bool {
    sees_within(agent, other, probe, agent.stats.sight_angle)
}

/// Same as [`can_see`] but against the tighter lock-on cone; firing
/// decisions gate on this
pub fn can_lock_on(agent: &Agent, other: Option<&Agent>, probe: &dyn ObstacleProbe) -> bool {
    sees_within(agent, other, probe, agent.stats.lock_on_angle)
}

fn sees_within(
    agent: &Agent,
    other: Option<&Agent>,
    probe: &dyn ObstacleProbe,
    angle_limit: f32,
) -> bool {
    let Some(other) = other else {
        return false;
    };
    if !other.alive {
        return false;
    }
    let to_other = other.body.position - agent.body.position;
    if signed_yaw_to(agent.body.forward, to_other).abs() > angle_limit {
        return false;
    }
    match probe.cast(agent.body.position, to_other, agent.stats.sight_range) {
        Some(hit) => hit.target.agent_id() == Some(other.id),
        None => false,
    }
}

/// Propagate a noise event: every living NPC whose own hearing radius
/// covers the emitter latches it as the most recent sound source
pub fn register_noise(arena: &mut AgentArena, emitter: AgentId) {
    let Some(position) = arena.get(emitter).filter(|a| a.alive).map(|a| a.body.position)
    else {
        return;
    };
    for id in arena.ids().collect::<Vec<_>>() {
        if id == emitter {
            continue;
        }
        let Some(agent) = arena.get_mut(id) else {
            continue;
        };
        if !agent.alive || !agent.is_npc() {
            continue;
        }
        let radius = agent.stats.hearing_radius;
        if agent.body.position.distance_squared(position) <= radius * radius {
            agent.last_heard = Some(emitter);
        }
    }
}
