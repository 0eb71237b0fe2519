//! Personality state machines: the decision core of every NPC
//!
//! Each archetype is a small explicit state machine with a uniform entry
//! point: given the deciding agent, a read view of the world, and the tick
//! timing, produce one [`Intent`]. Machines mutate only their own agent.
//! A tick that triggers a transition still returns an intent for the
//! current tick; the new state takes over on the following tick.

pub mod assassin;
pub mod caravan;
pub mod context;
pub mod guard;
pub mod hunter;
pub mod profile;

use glam::Vec3;

use crate::agent::{Agent, Archetype};
use crate::avoidance;
use crate::core::types::{DecisionEvent, Intent, Motion};

pub use assassin::AssassinState;
pub use caravan::CaravanState;
pub use context::DecisionContext;
pub use guard::GuardState;
pub use hunter::HunterState;
pub use profile::ArchetypeProfile;

/// Tagged union over the four archetype machines. The variant never changes
/// except through [`Step::Become`], which the guard and assassin machines
/// use for their one-way conversions to hunter.
#[derive(Debug, Clone, PartialEq)]
pub enum Personality {
    Hunter(HunterState),
    Guard(GuardState),
    Assassin(AssassinState),
    Caravan(CaravanState),
}

/// What a machine does with its turn
pub(crate) enum Step {
    /// Act and stay in this personality
    Act(Intent),
    /// Act, then permanently become a different personality
    Become(Personality, Intent),
}

impl Personality {
    pub fn initial(archetype: Archetype) -> Self {
        match archetype {
            Archetype::Hunter => Personality::Hunter(HunterState::Chase),
            Archetype::Guard => Personality::Guard(GuardState::Patrol),
            Archetype::Assassin => Personality::Assassin(AssassinState::LayInWait {
                baseline: None,
            }),
            Archetype::Caravan => Personality::Caravan(CaravanState::Transport),
        }
    }

    pub fn archetype(&self) -> Archetype {
        match self {
            Personality::Hunter(_) => Archetype::Hunter,
            Personality::Guard(_) => Archetype::Guard,
            Personality::Assassin(_) => Archetype::Assassin,
            Personality::Caravan(_) => Archetype::Caravan,
        }
    }

    /// Stable "archetype/state" label for logs and decision events
    pub fn label(&self) -> &'static str {
        match self {
            Personality::Hunter(state) => state.label(),
            Personality::Guard(state) => state.label(),
            Personality::Assassin(state) => state.label(),
            Personality::Caravan(state) => state.label(),
        }
    }

    /// Run one decision tick. The caller removes the personality from the
    /// agent for the duration of the call, so machines see the agent record
    /// with `personality` empty.
    pub fn tick(
        &mut self,
        agent: &mut Agent,
        ctx: &DecisionContext,
        events: &mut Vec<DecisionEvent>,
    ) -> Intent {
        let step = match self {
            Personality::Hunter(state) => hunter::tick(state, agent, ctx, events),
            Personality::Guard(state) => guard::tick(state, agent, ctx, events),
            Personality::Assassin(state) => assassin::tick(state, agent, ctx, events),
            Personality::Caravan(state) => caravan::tick(state, agent, ctx, events),
        };
        match step {
            Step::Act(intent) => intent,
            Step::Become(next, intent) => {
                *self = next;
                intent
            }
        }
    }
}

/// Motion directly away from a threat position. Used by the hunter and
/// caravan flee states, which differ only in when avoidance participates.
pub(crate) fn flee_motion(
    agent: &mut Agent,
    ctx: &DecisionContext,
    threat: Vec3,
    with_avoidance: bool,
) -> Motion {
    let away = agent.body.position - threat;
    let flat = Vec3::new(away.x, 0.0, away.z);
    let direction = if flat.length_squared() > 1e-8 {
        flat.normalize()
    } else {
        -agent.body.forward
    };
    let desired = Motion::Rush {
        point: agent.body.position + direction * ctx.cfg.flee_distance,
        speed: agent.stats.move_speed,
    };
    if with_avoidance {
        avoidance::drive(agent, ctx.probe, ctx.cfg, ctx.dt, desired)
    } else {
        desired
    }
}
