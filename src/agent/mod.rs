//! Agent records: plain data, stored contiguously in the arena
//!
//! Every combat unit is one `Agent`. NPC agents carry a personality state
//! machine; player-controlled bodies carry only geometry and stats so that
//! perception and probes treat both kinds uniformly.

pub mod arena;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::avoidance::AvoidanceState;
use crate::core::types::AgentId;
use crate::personality::Personality;
use crate::route::Route;

pub use arena::{AgentArena, AgentsView};

/// Behavior archetype, fixed at spawn (with one exception: conversion to
/// Hunter, which the guard and assassin machines may perform)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Hunter,
    Guard,
    Assassin,
    Caravan,
}

impl Archetype {
    /// Guards and caravans cannot function without a patrol route
    pub fn requires_route(&self) -> bool {
        matches!(self, Archetype::Guard | Archetype::Caravan)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Archetype::Hunter => "hunter",
            Archetype::Guard => "guard",
            Archetype::Assassin => "assassin",
            Archetype::Caravan => "caravan",
        }
    }
}

/// How an agent regains health while resting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairKind {
    /// `heal_rate` health per second, applied every tick
    PerSecond,
    /// `heal_rate` health in one pulse every repair tick
    PerTick,
}

/// Physical pose; the only part of an agent the motor may mutate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub position: Vec3,
    pub forward: Vec3,
}

impl Body {
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        Self {
            position,
            forward: forward.normalize_or_zero(),
        }
    }

    /// Flat squared distance to a point, ignoring elevation
    pub fn flat_distance_squared(&self, point: Vec3) -> f32 {
        let dx = self.position.x - point.x;
        let dz = self.position.z - point.z;
        dx * dx + dz * dz
    }
}

/// Combat statistics and perception parameters, fixed per agent apart from
/// health and the caravan point value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStats {
    pub health: f32,
    pub max_health: f32,
    /// Fraction of max health at or below which flee behavior engages
    pub flee_threshold: f32,
    pub move_speed: f32,
    /// Degrees per second
    pub turn_speed: f32,
    /// Seconds between shots, enforced by the cannon
    pub fire_cooldown: f32,
    pub projectile_speed: f32,
    pub shell_damage: f32,
    /// Kill reward; decays for caravans, floored at `min_point_value`
    pub point_value: i32,
    pub min_point_value: i32,
    pub sense_radius: f32,
    pub hearing_radius: f32,
    pub sight_range: f32,
    /// Degrees off forward within which another agent can be seen
    pub sight_angle: f32,
    /// Degrees off forward within which firing is permitted
    pub lock_on_angle: f32,
    pub repair_kind: RepairKind,
    pub heal_rate: f32,
}

impl Default for AgentStats {
    fn default() -> Self {
        Self {
            health: 100.0,
            max_health: 100.0,
            flee_threshold: 0.5,
            move_speed: 3.0,
            turn_speed: 150.0,
            fire_cooldown: 2.3,
            projectile_speed: 1500.0,
            shell_damage: 10.0,
            point_value: 100,
            min_point_value: 20,
            sense_radius: 10.0,
            hearing_radius: 25.0,
            sight_range: 30.0,
            sight_angle: 45.0,
            lock_on_angle: 5.0,
            repair_kind: RepairKind::PerSecond,
            heal_rate: 5.0,
        }
    }
}

impl AgentStats {
    pub fn needs_to_flee(&self) -> bool {
        self.health <= self.flee_threshold * self.max_health
    }

    pub fn at_full_health(&self) -> bool {
        self.health >= self.max_health
    }

    /// Restore health, clamped at the maximum
    pub fn repair(&mut self, amount: f32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    /// Reduce the kill reward, floored at the configured minimum
    pub fn decay_point_value(&mut self, amount: i32) {
        self.point_value = (self.point_value - amount).max(self.min_point_value);
    }
}

/// One combat unit. Created at spawn, discarded at death; no state persists
/// across ticks beyond what is stored here.
#[derive(Debug, Clone)]
pub struct Agent {
    pub id: AgentId,
    pub body: Body,
    pub stats: AgentStats,
    pub alive: bool,
    /// Cleared permanently when startup validation fails for this agent
    pub ai_enabled: bool,
    pub player_controlled: bool,
    /// `None` for player bodies
    pub personality: Option<Personality>,
    pub avoidance: AvoidanceState,
    /// Per-agent copy; elevation leveling mutates only this agent's waypoints
    pub route: Option<Route>,
    pub target: Option<AgentId>,
    /// Latched by noise propagation, re-validated by the state machines
    pub last_heard: Option<AgentId>,
    /// Guard side of a pairing: the caravan this agent protects
    pub ward: Option<AgentId>,
    /// Caravan side of a pairing: the guard protecting this agent
    pub escort: Option<AgentId>,
}

impl Agent {
    pub fn archetype(&self) -> Option<Archetype> {
        self.personality.as_ref().map(|p| p.archetype())
    }

    pub fn is_npc(&self) -> bool {
        self.personality.is_some()
    }

    /// Label for logs and decision events, e.g. "hunter/chase"
    pub fn state_label(&self) -> &'static str {
        match &self.personality {
            Some(p) => p.label(),
            None => "player",
        }
    }

    /// Whether this agent takes a decision tick at all
    pub fn decides(&self) -> bool {
        self.alive && self.ai_enabled && self.is_npc()
    }
}
