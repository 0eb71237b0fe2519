//! Caravan: the prize that runs rather than fights
//!
//! Caravans walk their delivery circuit while their escort lives, shedding
//! kill-reward value with every completed lap. Once the escort dies they
//! never fight back: they run from whatever they can hear, and when the
//! world goes quiet they sit tight and hide.

use tracing::debug;

use crate::agent::Agent;
use crate::avoidance;
use crate::core::types::{DecisionEvent, Intent, Motion};
use crate::personality::{flee_motion, DecisionContext, Step};
use crate::route::follow_route;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CaravanState {
    /// Walk the circuit under escort
    Transport,
    /// Run from the nearest audible player
    Flee { started_at: f32 },
    /// Sit still until something makes noise nearby
    Hide,
}

impl CaravanState {
    pub fn label(&self) -> &'static str {
        match self {
            CaravanState::Transport => "caravan/transport",
            CaravanState::Flee { .. } => "caravan/flee",
            CaravanState::Hide => "caravan/hide",
        }
    }
}

pub(crate) fn tick(
    state: &mut CaravanState,
    agent: &mut Agent,
    ctx: &DecisionContext,
    events: &mut Vec<DecisionEvent>,
) -> Step {
    match state {
        CaravanState::Transport => {
            if let Some(escort) = agent.escort {
                if !ctx.others.is_alive(escort) {
                    debug!(agent = %agent.id, escort = %escort, "escort lost");
                    agent.avoidance.reset();
                    *state = if ctx.nearest_audible_player(agent).is_some() {
                        CaravanState::Flee {
                            started_at: ctx.now,
                        }
                    } else {
                        CaravanState::Hide
                    };
                    return Step::Act(Intent::hold());
                }
            }
            let desired = follow_route(agent, ctx.cfg, events, true);
            Step::Act(Intent::moving(avoidance::drive(
                agent, ctx.probe, ctx.cfg, ctx.dt, desired,
            )))
        }
        CaravanState::Flee { started_at } => {
            let started = *started_at;
            if ctx.now - started >= ctx.cfg.flee_before_checking {
                if ctx.nearest_audible_player(agent).is_none() {
                    debug!(agent = %agent.id, "pursuit shaken, hiding");
                    *state = CaravanState::Hide;
                    return Step::Act(Intent::hold());
                }
                // Still being chased; start a fresh flee leg
                *started_at = ctx.now;
            }
            let with_avoidance = ctx.now - started >= ctx.cfg.flee_before_avoiding;
            let motion = match ctx.nearest_audible_player(agent).map(|t| t.body.position) {
                Some(threat) => flee_motion(agent, ctx, threat, with_avoidance),
                None => {
                    // Nothing audible to steer away from; keep running straight
                    let desired = Motion::Advance {
                        speed: agent.stats.move_speed,
                    };
                    if with_avoidance {
                        avoidance::drive(agent, ctx.probe, ctx.cfg, ctx.dt, desired)
                    } else {
                        desired
                    }
                }
            };
            Step::Act(Intent::moving(motion))
        }
        CaravanState::Hide => {
            if ctx.audible_player(agent).is_some() {
                debug!(agent = %agent.id, "flushed out of hiding");
                agent.avoidance.reset();
                *state = CaravanState::Flee {
                    started_at: ctx.now,
                };
            } else if agent.last_heard.is_some() {
                agent.last_heard = None;
            }
            Step::Act(Intent::hold())
        }
    }
}
