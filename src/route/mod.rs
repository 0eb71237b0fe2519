//! Waypoint routes and the patrol-following behavior built on them
//!
//! Each agent owns its route outright, so leveling a waypoint to the
//! agent's elevation never bleeds into another agent patrolling the same
//! circuit.

use glam::Vec3;
use serde::Deserialize;

use crate::agent::Agent;
use crate::core::config::EngineConfig;
use crate::core::types::{DecisionEvent, Motion};

/// What happens when the agent reaches the end of its waypoint list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalMode {
    /// Halt at the final waypoint and never move again
    Stop,
    /// Wrap from the final waypoint back to the first
    Loop,
    /// Bounce between the ends, visiting interior waypoints both ways
    PingPong,
}

/// Outcome of advancing a route after a waypoint arrival
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteStep {
    pub index_changed: bool,
    /// A full circuit finished: a loop wrapped, a ping-pong bounced off the
    /// far end, or a stop route reached its terminus
    pub circuit_completed: bool,
    /// The route is done for good (stop mode terminus)
    pub halted: bool,
}

/// An ordered list of patrol points plus traversal position
#[derive(Debug, Clone)]
pub struct Route {
    waypoints: Vec<Vec3>,
    index: usize,
    mode: TraversalMode,
    /// Ping-pong travel direction; true while walking toward the far end
    forward: bool,
    stopped: bool,
}

impl Route {
    pub fn new(waypoints: Vec<Vec3>, mode: TraversalMode) -> Self {
        Self {
            waypoints,
            index: 0,
            mode,
            forward: true,
            stopped: false,
        }
    }

    pub fn patrol_loop(waypoints: Vec<Vec3>) -> Self {
        Self::new(waypoints, TraversalMode::Loop)
    }

    pub fn one_way(waypoints: Vec<Vec3>) -> Self {
        Self::new(waypoints, TraversalMode::Stop)
    }

    pub fn ping_pong(waypoints: Vec<Vec3>) -> Self {
        Self::new(waypoints, TraversalMode::PingPong)
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn mode(&self) -> TraversalMode {
        self.mode
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// The waypoint currently being walked toward
    pub fn current(&self) -> Option<Vec3> {
        self.waypoints.get(self.index).copied()
    }

    /// Move to the next waypoint after an arrival. The new current waypoint
    /// is leveled to `elevation` so steering stays flat for this agent.
    ///
    /// Single-point routes never complete circuits; in stop mode they halt
    /// on first arrival like any other stop route.
    pub fn advance(&mut self, elevation: f32) -> RouteStep {
        if self.stopped || self.waypoints.is_empty() {
            return RouteStep::default();
        }
        let last = self.waypoints.len() - 1;
        let mut completed = false;
        match self.mode {
            TraversalMode::Stop => {
                if self.index >= last {
                    self.stopped = true;
                    return RouteStep {
                        index_changed: false,
                        circuit_completed: last > 0,
                        halted: true,
                    };
                }
                self.index += 1;
            }
            TraversalMode::Loop => {
                if self.index >= last {
                    self.index = 0;
                    completed = last > 0;
                } else {
                    self.index += 1;
                }
            }
            TraversalMode::PingPong => {
                if last == 0 {
                    // Nowhere to bounce to
                } else if self.forward {
                    if self.index >= last {
                        self.forward = false;
                        self.index -= 1;
                        completed = true;
                    } else {
                        self.index += 1;
                    }
                } else if self.index == 0 {
                    self.forward = true;
                    self.index += 1;
                } else {
                    self.index -= 1;
                }
            }
        }
        if let Some(wp) = self.waypoints.get_mut(self.index) {
            wp.y = elevation;
        }
        RouteStep {
            index_changed: true,
            circuit_completed: completed,
            halted: false,
        }
    }
}

/// Walk the agent's route one decision tick: seek the current waypoint,
/// advance on arrival, and in caravan service decay the kill reward each
/// completed circuit. Arrival ignores elevation.
pub fn follow_route(
    agent: &mut Agent,
    cfg: &EngineConfig,
    events: &mut Vec<DecisionEvent>,
    decay_points: bool,
) -> Motion {
    let speed = agent.stats.move_speed;
    let Some(route) = agent.route.as_mut() else {
        return Motion::Hold;
    };
    if route.is_empty() || route.is_stopped() {
        return Motion::Hold;
    }
    let Some(target) = route.current() else {
        return Motion::Hold;
    };

    if agent.body.flat_distance_squared(target) <= cfg.close_enough * cfg.close_enough {
        let step = route.advance(agent.body.position.y);
        let next = route.current();
        if step.circuit_completed && decay_points {
            agent.stats.decay_point_value(cfg.circuit_point_decay);
            events.push(DecisionEvent::CircuitCompleted {
                agent: agent.id,
                point_value: agent.stats.point_value,
            });
        }
        if step.halted {
            return Motion::Hold;
        }
        return match next {
            Some(point) => Motion::Seek { point, speed },
            None => Motion::Hold,
        };
    }
    Motion::Seek {
        point: target,
        speed,
    }
}
