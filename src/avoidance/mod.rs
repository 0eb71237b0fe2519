//! Reactive obstacle avoidance: turn until clear, advance on a timer
//!
//! This is deliberately local and greedy. The agent turns toward whichever
//! 45 degree side probe is clear, drives forward for a grace period, and
//! re-probes every tick. Concave pockets can defeat it; route design is
//! expected to keep patrol paths out of them.

use tracing::debug;

use crate::agent::{Agent, Body};
use crate::core::config::EngineConfig;
use crate::core::types::{rotate_about_y, Motion, TurnDirection};
use crate::perception::ObstacleProbe;

/// Where the avoidance routine is in its turn-then-advance cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvoidanceStage {
    Inactive,
    /// Rotating in place until the post-turn heading probes clear
    Turning,
    /// Driving forward until the grace timer expires or a new obstacle appears
    Advancing,
}

/// Per-agent avoidance bookkeeping, owned by the agent record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvoidanceState {
    pub stage: AvoidanceStage,
    pub turn_direction: TurnDirection,
    /// Seconds of advancing left before control returns to the behavior
    pub remaining: f32,
}

impl Default for AvoidanceState {
    fn default() -> Self {
        Self {
            stage: AvoidanceStage::Inactive,
            turn_direction: TurnDirection::Left,
            remaining: 0.0,
        }
    }
}

impl AvoidanceState {
    pub fn is_active(&self) -> bool {
        self.stage != AvoidanceStage::Inactive
    }

    /// Drop any in-progress maneuver; used when a behavior change makes the
    /// old heading irrelevant
    pub fn reset(&mut self) {
        *self = AvoidanceState::default();
    }
}

/// Probe one second of forward travel. A hit on anything other than a
/// player unit is an obstacle: the turn direction is chosen and latched,
/// the stage moves to `Turning`, and the caller must not drive forward.
///
/// Player hits and inconclusive probes both count as clear.
pub fn forward_clear(agent: &mut Agent, probe: &dyn ObstacleProbe, cfg: &EngineConfig) -> bool {
    let check_distance = agent.stats.move_speed;
    match probe.cast(agent.body.position, agent.body.forward, check_distance) {
        Some(hit) if !hit.target.is_player() => {
            let direction = determine_turn_direction(&agent.body, probe, cfg, check_distance);
            agent.avoidance.turn_direction = direction;
            agent.avoidance.stage = AvoidanceStage::Turning;
            debug!(agent = %agent.id, ?direction, distance = hit.distance, "obstacle ahead");
            false
        }
        _ => true,
    }
}

/// Pick a turn direction by probing 45 degrees to either side, scaled out
/// past the triggering check distance. Left wins ties and dead ends.
pub fn determine_turn_direction(
    body: &Body,
    probe: &dyn ObstacleProbe,
    cfg: &EngineConfig,
    check_distance: f32,
) -> TurnDirection {
    let reach = check_distance * cfg.side_probe_scale;
    let left = rotate_about_y(body.forward, -cfg.side_probe_angle);
    if probe.cast(body.position, left, reach).is_none() {
        return TurnDirection::Left;
    }
    let right = rotate_about_y(body.forward, cfg.side_probe_angle);
    if probe.cast(body.position, right, reach).is_none() {
        return TurnDirection::Right;
    }
    TurnDirection::Left
}

/// Advance the avoidance cycle one tick. Returns the motion to perform
/// while avoidance owns the agent, or `None` once it is inactive and the
/// behavior may drive normally.
pub fn step(
    agent: &mut Agent,
    probe: &dyn ObstacleProbe,
    cfg: &EngineConfig,
    dt: f32,
) -> Option<Motion> {
    match agent.avoidance.stage {
        AvoidanceStage::Inactive => None,
        AvoidanceStage::Turning => {
            let rate = agent.avoidance.turn_direction.sign() * agent.stats.turn_speed;
            // Judge clearance on the heading this tick's turn will produce,
            // since the motor applies the turn after this decision
            let next_forward = rotate_about_y(agent.body.forward, rate * dt);
            let clear = probe
                .cast(agent.body.position, next_forward, agent.stats.move_speed)
                .map(|hit| hit.target.is_player())
                .unwrap_or(true);
            if clear {
                agent.avoidance.stage = AvoidanceStage::Advancing;
                agent.avoidance.remaining = cfg.avoidance_time;
                debug!(agent = %agent.id, "heading clear, advancing");
            }
            Some(Motion::Turn {
                degrees_per_sec: rate,
            })
        }
        AvoidanceStage::Advancing => {
            if !forward_clear(agent, probe, cfg) {
                // A fresh obstacle re-latched Turning with a new direction
                let rate = agent.avoidance.turn_direction.sign() * agent.stats.turn_speed;
                return Some(Motion::Turn {
                    degrees_per_sec: rate,
                });
            }
            agent.avoidance.remaining -= dt;
            if agent.avoidance.remaining <= 0.0 {
                agent.avoidance.stage = AvoidanceStage::Inactive;
            }
            Some(Motion::Advance {
                speed: agent.stats.move_speed,
            })
        }
    }
}

/// The standard driving pattern shared by every moving behavior: finish any
/// avoidance maneuver first, otherwise drive as desired if the way forward
/// is clear, otherwise begin turning this tick.
///
/// A `Hold` request cancels any maneuver and holds. An agent that is not
/// moving needs no clearance, and a halted route must not leave the agent
/// spinning in front of whatever it parked against.
pub fn drive(
    agent: &mut Agent,
    probe: &dyn ObstacleProbe,
    cfg: &EngineConfig,
    dt: f32,
    desired: Motion,
) -> Motion {
    if desired == Motion::Hold {
        agent.avoidance.reset();
        return Motion::Hold;
    }
    if let Some(motion) = step(agent, probe, cfg, dt) {
        return motion;
    }
    if forward_clear(agent, probe, cfg) {
        desired
    } else {
        Motion::Turn {
            degrees_per_sec: agent.avoidance.turn_direction.sign() * agent.stats.turn_speed,
        }
    }
}
