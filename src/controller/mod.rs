//! Per-agent orchestration: perception context, machine tick, actuation
//!
//! The controller owns the actuator seams (motor, cannon, probe) and walks
//! the arena in ascending id order every tick. Each agent gets exactly one
//! decision, and that decision is applied before the next agent decides,
//! so a pass is deterministic for a given arena and registry state.

use glam::Vec3;
use tracing::debug;

use crate::agent::{Agent, AgentArena, Body};
use crate::core::config::EngineConfig;
use crate::core::types::{AgentId, DecisionEvent, FireOrder, Intent, Motion, Tick};
use crate::perception::ObstacleProbe;
use crate::personality::{DecisionContext, Personality};

/// Locomotion seam. Implementations own the timestep; the controller only
/// states what the agent wants.
pub trait Motor {
    /// Drive the body straight along its forward vector
    fn move_forward(&mut self, body: &mut Body, speed: f32);

    /// Turn in place; the sign of the rate picks the direction
    fn turn(&mut self, body: &mut Body, degrees_per_sec: f32);

    /// Rotate toward a point at the given rate. Returns true while the body
    /// is still rotating, false if it already faced the point when called.
    fn rotate_towards(&mut self, body: &mut Body, point: Vec3, degrees_per_sec: f32) -> bool;
}

/// Weapon seam. The cannon enforces its own per-agent cooldown; a request
/// during cooldown is dropped, and the return value reports what happened.
pub trait Cannon {
    fn fire(&mut self, shooter: &Agent, order: FireOrder) -> bool;
}

/// Source of assignable player targets, in a stable caller-defined order
pub trait TargetRegistry {
    fn players(&self) -> &[AgentId];
}

/// Round-robin dealer of player targets. One shared instance serves every
/// agent, and the cursor advances exactly once per assignment, so M agents
/// spread across K players at either ceil(M/K) or floor(M/K) apiece.
#[derive(Debug, Default)]
pub struct TargetAssigner {
    cursor: usize,
}

impl TargetAssigner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, registry: &dyn TargetRegistry) -> Option<AgentId> {
        let players = registry.players();
        if players.is_empty() {
            return None;
        }
        let pick = players[self.cursor % players.len()];
        self.cursor = (self.cursor + 1) % players.len();
        Some(pick)
    }
}

/// One event per NPC that failed startup validation and had its AI shut
/// off. Emitted once, by whoever assembles the battle.
pub fn startup_report(arena: &AgentArena) -> Vec<DecisionEvent> {
    arena
        .iter()
        .filter(|agent| agent.is_npc() && !agent.ai_enabled)
        .map(|agent| DecisionEvent::AgentDisabled { agent: agent.id })
        .collect()
}

/// The decision engine for one battle. Actuators are wired in at
/// construction and never swapped.
pub struct DecisionController<M, C, P> {
    motor: M,
    cannon: C,
    probe: P,
    assigner: TargetAssigner,
}

impl<M: Motor, C: Cannon, P: ObstacleProbe> DecisionController<M, C, P> {
    pub fn new(motor: M, cannon: C, probe: P) -> Self {
        Self {
            motor,
            cannon,
            probe,
            assigner: TargetAssigner::new(),
        }
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    pub fn probe_mut(&mut self) -> &mut P {
        &mut self.probe
    }

    pub fn cannon(&self) -> &C {
        &self.cannon
    }

    pub fn cannon_mut(&mut self) -> &mut C {
        &mut self.cannon
    }

    pub fn motor_mut(&mut self) -> &mut M {
        &mut self.motor
    }

    /// Run one decision pass over every live NPC, in ascending id order
    pub fn run_pass(
        &mut self,
        arena: &mut AgentArena,
        registry: &dyn TargetRegistry,
        cfg: &EngineConfig,
        tick: Tick,
        now: f32,
        dt: f32,
    ) -> Vec<DecisionEvent> {
        let mut events = Vec::new();
        let ids: Vec<AgentId> = arena.ids().collect();
        for id in ids {
            if !arena.get(id).map(Agent::decides).unwrap_or(false) {
                continue;
            }
            self.refresh_target(arena, registry, id, &mut events);

            let Some((agent, others)) = arena.split_view(id) else {
                continue;
            };
            let Some(mut personality) = agent.personality.take() else {
                continue;
            };
            let before = personality.label();
            let intent = {
                let ctx = DecisionContext {
                    others,
                    probe: &self.probe,
                    cfg,
                    tick,
                    now,
                    dt,
                };
                personality.tick(agent, &ctx, &mut events)
            };
            let after = personality.label();
            agent.personality = Some(personality);
            if before != after {
                debug!(agent = %id, from = before, to = after, "state change");
                events.push(DecisionEvent::StateChanged {
                    agent: id,
                    from: before,
                    to: after,
                });
            }

            self.apply_intent(agent, intent);
        }
        events
    }

    /// Drop a dead target and, for hunters, draw a replacement from the
    /// shared rotation. Guards and assassins latch their own targets by
    /// perception; caravans never target anyone.
    fn refresh_target(
        &mut self,
        arena: &mut AgentArena,
        registry: &dyn TargetRegistry,
        id: AgentId,
        events: &mut Vec<DecisionEvent>,
    ) {
        if let Some(target) = arena.get(id).and_then(|a| a.target) {
            if !arena.is_alive(target) {
                if let Some(agent) = arena.get_mut(id) {
                    agent.target = None;
                }
            }
        }
        let wants_assignment = arena
            .get(id)
            .map(|a| a.target.is_none() && matches!(a.personality, Some(Personality::Hunter(_))))
            .unwrap_or(false);
        if !wants_assignment {
            return;
        }
        if let Some(player) = self.assigner.assign(registry) {
            if let Some(agent) = arena.get_mut(id) {
                agent.target = Some(player);
            }
            debug!(agent = %id, player = %player, "target assigned");
            events.push(DecisionEvent::TargetAssigned { agent: id, player });
        }
    }

    fn apply_intent(&mut self, agent: &mut Agent, intent: Intent) {
        match intent.motion {
            Motion::Hold => {}
            Motion::Face { point, haste } => {
                let rate = agent.stats.turn_speed * haste;
                self.motor.rotate_towards(&mut agent.body, point, rate);
            }
            Motion::Seek { point, speed } => {
                let rate = agent.stats.turn_speed;
                if !self.motor.rotate_towards(&mut agent.body, point, rate) {
                    self.motor.move_forward(&mut agent.body, speed);
                }
            }
            Motion::Rush { point, speed } => {
                let rate = agent.stats.turn_speed;
                self.motor.rotate_towards(&mut agent.body, point, rate);
                self.motor.move_forward(&mut agent.body, speed);
            }
            Motion::Turn { degrees_per_sec } => {
                self.motor.turn(&mut agent.body, degrees_per_sec);
            }
            Motion::Advance { speed } => {
                self.motor.move_forward(&mut agent.body, speed);
            }
        }
        if let Some(order) = intent.fire {
            self.cannon.fire(agent, order);
        }
    }
}
