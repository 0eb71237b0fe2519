//! Guard: patrol a fixed route, investigate noise, punish intruders
//!
//! Guards never leave their post to chase. They rotate toward sound, open
//! fire on anything they can see and lock onto, and go back to walking the
//! route once the intruder is dead or out of sight. A guard whose paired
//! caravan is destroyed converts to a hunter for the rest of the battle;
//! this is the only personality change a guard ever makes.

use tracing::debug;

use crate::agent::Agent;
use crate::avoidance;
use crate::core::types::{DecisionEvent, FireOrder, Intent, Motion};
use crate::perception;
use crate::personality::{DecisionContext, HunterState, Personality, Step};
use crate::route::follow_route;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// Walk the assigned route
    Patrol,
    /// Turn toward the latched sound source until it is seen or lost
    RotateTowardSound,
    /// Track and shoot the latched intruder for as long as it stays visible
    FireAtIntruder,
}

impl GuardState {
    pub fn label(&self) -> &'static str {
        match self {
            GuardState::Patrol => "guard/patrol",
            GuardState::RotateTowardSound => "guard/rotate_toward_sound",
            GuardState::FireAtIntruder => "guard/fire_at_intruder",
        }
    }
}

pub(crate) fn tick(
    state: &mut GuardState,
    agent: &mut Agent,
    ctx: &DecisionContext,
    events: &mut Vec<DecisionEvent>,
) -> Step {
    // A guard whose ward is destroyed has nothing left to protect
    if let Some(ward) = agent.ward {
        if !ctx.others.is_alive(ward) {
            debug!(agent = %agent.id, ward = %ward, "ward destroyed, converting to hunter");
            agent.ward = None;
            agent.target = None;
            agent.last_heard = None;
            return Step::Become(Personality::Hunter(HunterState::Chase), Intent::hold());
        }
    }

    match state {
        GuardState::Patrol => {
            if ctx.audible_player(agent).is_some() {
                *state = GuardState::RotateTowardSound;
            } else if agent.last_heard.is_some() {
                // Stale latch: the source died, left range, or was friendly
                agent.last_heard = None;
            }
            let desired = follow_route(agent, ctx.cfg, events, false);
            Step::Act(Intent::moving(avoidance::drive(
                agent, ctx.probe, ctx.cfg, ctx.dt, desired,
            )))
        }
        GuardState::RotateTowardSound => {
            let Some(heard) = ctx.audible_player(agent) else {
                agent.last_heard = None;
                *state = GuardState::Patrol;
                return Step::Act(Intent::hold());
            };
            let point = heard.body.position;
            if perception::can_see(agent, Some(heard), ctx.probe) {
                debug!(agent = %agent.id, intruder = %heard.id, "intruder sighted");
                agent.target = Some(heard.id);
                *state = GuardState::FireAtIntruder;
            }
            Step::Act(Intent::moving(Motion::Face { point, haste: 1.0 }))
        }
        GuardState::FireAtIntruder => {
            let visible = ctx
                .target_of(agent)
                .filter(|intruder| perception::can_see(agent, Some(*intruder), ctx.probe));
            let Some(intruder) = visible else {
                agent.target = None;
                agent.last_heard = None;
                *state = GuardState::Patrol;
                return Step::Act(Intent::hold());
            };
            let point = intruder.body.position;
            let locked = perception::can_lock_on(agent, Some(intruder), ctx.probe);
            let mut intent = Intent::moving(Motion::Face { point, haste: 1.0 });
            if locked {
                intent = intent.with_fire(FireOrder::standard(agent.stats.projectile_speed));
            }
            Step::Act(intent)
        }
    }
}
