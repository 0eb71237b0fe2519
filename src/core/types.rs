//! Core type definitions used throughout the codebase

use derive_more::Display;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Unique identifier for agents: the index of the agent's record in the arena
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[display(fmt = "agent{}", _0)]
pub struct AgentId(pub u32);

impl AgentId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Game tick counter (simulation time unit)
pub type Tick = u64;

/// Side an agent steers toward while avoiding an obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnDirection {
    Left,
    Right,
}

impl TurnDirection {
    /// Sign convention: left = -1, right = +1 (positive yaw turns right)
    pub fn sign(&self) -> f32 {
        match self {
            TurnDirection::Left => -1.0,
            TurnDirection::Right => 1.0,
        }
    }
}

/// One tick's worth of actuation requested by a personality state machine.
///
/// The controller translates this into Motor/Cannon calls; state machines
/// never touch the actuators directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intent {
    pub motion: Motion,
    pub fire: Option<FireOrder>,
}

impl Intent {
    pub fn hold() -> Self {
        Self {
            motion: Motion::Hold,
            fire: None,
        }
    }

    pub fn moving(motion: Motion) -> Self {
        Self {
            motion,
            fire: None,
        }
    }

    pub fn with_fire(mut self, order: FireOrder) -> Self {
        self.fire = Some(order);
        self
    }
}

/// Movement request for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// Stand still
    Hold,
    /// Rotate toward a point without advancing; `haste` scales the turn rate
    Face { point: Vec3, haste: f32 },
    /// Rotate toward a point, advancing only once already facing it
    Seek { point: Vec3, speed: f32 },
    /// Rotate toward a point while advancing at full speed
    Rush { point: Vec3, speed: f32 },
    /// Turn in place; sign of the rate picks the direction
    Turn { degrees_per_sec: f32 },
    /// Drive straight ahead without turning
    Advance { speed: f32 },
}

/// Fire request forwarded to the cannon, which applies its own cooldown
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireOrder {
    pub projectile_speed: f32,
    pub damage_multiplier: f32,
}

impl FireOrder {
    pub fn standard(projectile_speed: f32) -> Self {
        Self {
            projectile_speed,
            damage_multiplier: 1.0,
        }
    }
}

/// Notable outcomes of a decision pass, returned for logging and tests
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DecisionEvent {
    TargetAssigned { agent: AgentId, player: AgentId },
    StateChanged {
        agent: AgentId,
        from: &'static str,
        to: &'static str,
    },
    CircuitCompleted { agent: AgentId, point_value: i32 },
    AgentDisabled { agent: AgentId },
}

/// Rotate a vector about the world up axis; positive degrees turn right
pub fn rotate_about_y(v: Vec3, degrees: f32) -> Vec3 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec3::new(v.x * cos + v.z * sin, v.y, v.z * cos - v.x * sin)
}

/// Signed yaw in degrees from `forward` to `to`, ignoring elevation.
/// Positive means the target lies to the right. Degenerate inputs yield 0.
pub fn signed_yaw_to(forward: Vec3, to: Vec3) -> f32 {
    let f = Vec3::new(forward.x, 0.0, forward.z);
    let t = Vec3::new(to.x, 0.0, to.z);
    if f.length_squared() < 1e-8 || t.length_squared() < 1e-8 {
        return 0.0;
    }
    let angle = f.angle_between(t).to_degrees();
    if f.cross(t).y >= 0.0 {
        angle
    } else {
        -angle
    }
}
