//! Contiguous agent storage with split borrows for decision ticks

use glam::Vec3;
use tracing::{debug, error};

use crate::agent::{Agent, AgentStats, Archetype, Body};
use crate::avoidance::AvoidanceState;
use crate::core::error::{ArenaError, Result};
use crate::core::types::AgentId;
use crate::personality::Personality;
use crate::route::Route;

/// All agents in the battle, indexed by `AgentId`. Slots are never removed;
/// dead agents stay in place with `alive` cleared so ids remain stable.
#[derive(Debug, Default)]
pub struct AgentArena {
    agents: Vec<Agent>,
}

impl AgentArena {
    pub fn new() -> Self {
        Self { agents: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Ids in ascending spawn order; the controller iterates in this order
    /// every tick so decision sequencing is deterministic
    pub fn ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        (0..self.agents.len() as u32).map(AgentId)
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.index())
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id.index())
    }

    pub fn is_alive(&self, id: AgentId) -> bool {
        self.get(id).map(|a| a.alive).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    /// Spawn a player-controlled body. It has stats and geometry so NPCs can
    /// perceive and hit it, but never takes a decision tick.
    pub fn spawn_player(&mut self, position: Vec3, forward: Vec3, stats: AgentStats) -> AgentId {
        let id = AgentId::new(self.agents.len() as u32);
        self.agents.push(Agent {
            id,
            body: Body::new(position, forward),
            stats,
            alive: true,
            ai_enabled: false,
            player_controlled: true,
            personality: None,
            avoidance: AvoidanceState::default(),
            route: None,
            target: None,
            last_heard: None,
            ward: None,
            escort: None,
        });
        debug!(agent = %id, "spawned player body");
        id
    }

    /// Spawn an NPC with the given archetype. Route validation happens here:
    /// a guard or caravan without waypoints is a configuration error, so the
    /// agent spawns with its AI disabled rather than ticking a broken route.
    pub fn spawn_npc(
        &mut self,
        archetype: Archetype,
        position: Vec3,
        forward: Vec3,
        stats: AgentStats,
        route: Option<Route>,
    ) -> AgentId {
        let id = AgentId::new(self.agents.len() as u32);
        let route_missing = route.as_ref().map(|r| r.is_empty()).unwrap_or(true);
        let mut ai_enabled = true;
        if archetype.requires_route() && route_missing {
            let err = ArenaError::EmptyRoute {
                agent: id,
                archetype: archetype.name(),
            };
            error!(agent = %id, "{err}; agent AI disabled");
            ai_enabled = false;
        }
        self.agents.push(Agent {
            id,
            body: Body::new(position, forward),
            personality: Some(Personality::initial(archetype)),
            stats,
            alive: true,
            ai_enabled,
            player_controlled: false,
            avoidance: AvoidanceState::default(),
            route,
            target: None,
            last_heard: None,
            ward: None,
            escort: None,
        });
        debug!(agent = %id, archetype = archetype.name(), ai_enabled, "spawned npc");
        id
    }

    /// Link a guard to the caravan it protects. Both sides hold the link so
    /// either can react when the other dies.
    pub fn pair_escort(&mut self, guard: AgentId, caravan: AgentId) -> Result<()> {
        if self.get(guard).is_none() {
            return Err(ArenaError::AgentNotFound(guard));
        }
        if self.get(caravan).is_none() {
            return Err(ArenaError::AgentNotFound(caravan));
        }
        if let Some(g) = self.get_mut(guard) {
            g.ward = Some(caravan);
        }
        if let Some(c) = self.get_mut(caravan) {
            c.escort = Some(guard);
        }
        Ok(())
    }

    /// Apply damage, returning whether the hit was lethal
    pub fn apply_damage(&mut self, id: AgentId, amount: f32) -> Result<bool> {
        let agent = self
            .agents
            .get_mut(id.index())
            .ok_or(ArenaError::AgentNotFound(id))?;
        if !agent.alive {
            return Ok(false);
        }
        agent.stats.health -= amount;
        if agent.stats.health <= 0.0 {
            agent.stats.health = 0.0;
            agent.alive = false;
            debug!(agent = %id, "agent destroyed");
            return Ok(true);
        }
        Ok(false)
    }

    /// Borrow one agent mutably alongside a read view of everyone else.
    /// This is the shape of every decision tick: the deciding agent mutates,
    /// the rest of the world is observed.
    pub fn split_view(&mut self, id: AgentId) -> Option<(&mut Agent, AgentsView<'_>)> {
        let pivot = id.index();
        if pivot >= self.agents.len() {
            return None;
        }
        let (left, rest) = self.agents.split_at_mut(pivot);
        let (agent, right) = rest.split_first_mut()?;
        Some((
            agent,
            AgentsView {
                left,
                right,
                pivot,
            },
        ))
    }
}

/// Read-only view of every agent except the one currently deciding
#[derive(Debug)]
pub struct AgentsView<'a> {
    left: &'a [Agent],
    right: &'a [Agent],
    pivot: usize,
}

impl<'a> AgentsView<'a> {
    /// Look up an agent by id; dead agents and the pivot resolve to `None`
    /// so perception checks against them fail closed
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        let i = id.index();
        let agent = if i < self.pivot {
            self.left.get(i)
        } else if i == self.pivot {
            None
        } else {
            self.right.get(i - self.pivot - 1)
        };
        agent.filter(|a| a.alive)
    }

    pub fn is_alive(&self, id: AgentId) -> bool {
        self.get(id).is_some()
    }

    pub fn position(&self, id: AgentId) -> Option<Vec3> {
        self.get(id).map(|a| a.body.position)
    }

    pub fn iter_alive(&self) -> impl Iterator<Item = &Agent> {
        self.left
            .iter()
            .chain(self.right.iter())
            .filter(|a| a.alive)
    }
}
