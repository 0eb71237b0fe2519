//! Assassin: ambush, one perfect shot, then vanish or go loud
//!
//! The assassin idles invisibly until it hears a player, swings onto the
//! victim at double turn rate, and commits exactly one boosted shot. If the
//! victim dies inside the verification window the assassin melts back into
//! ambush; if the victim survives, the cover is blown and the assassin
//! becomes an ordinary hunter for good. Taking damage while laying in wait
//! blows cover the same way.

use tracing::debug;

use crate::agent::Agent;
use crate::core::types::{signed_yaw_to, DecisionEvent, FireOrder, Intent, Motion};
use crate::perception;
use crate::personality::{DecisionContext, HunterState, Personality, Step};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AssassinState {
    /// Hold position; the baseline records health on entry so that any
    /// damage taken while waiting is detectable
    LayInWait { baseline: Option<f32> },
    /// Swing onto the latched victim at boosted turn rate
    TakeAim,
    /// Commit the single boosted shot
    Assassinate,
    /// Watch the victim until the window closes
    VerifyKill { deadline: f32 },
}

impl AssassinState {
    pub fn label(&self) -> &'static str {
        match self {
            AssassinState::LayInWait { .. } => "assassin/lay_in_wait",
            AssassinState::TakeAim => "assassin/take_aim",
            AssassinState::Assassinate => "assassin/assassinate",
            AssassinState::VerifyKill { .. } => "assassin/verify_kill",
        }
    }
}

pub(crate) fn tick(
    state: &mut AssassinState,
    agent: &mut Agent,
    ctx: &DecisionContext,
    _events: &mut Vec<DecisionEvent>,
) -> Step {
    match state {
        AssassinState::LayInWait { baseline } => {
            let base = *baseline.get_or_insert(agent.stats.health);
            if agent.stats.health < base {
                debug!(agent = %agent.id, "took damage in ambush, converting to hunter");
                agent.target = None;
                agent.last_heard = None;
                return Step::Become(Personality::Hunter(HunterState::Chase), Intent::hold());
            }
            if let Some(victim) = ctx.audible_player(agent) {
                debug!(agent = %agent.id, victim = %victim.id, "victim heard, taking aim");
                agent.target = Some(victim.id);
                *state = AssassinState::TakeAim;
            }
            Step::Act(Intent::hold())
        }
        AssassinState::TakeAim => {
            let audible = ctx
                .target_of(agent)
                .filter(|victim| perception::can_hear(agent, Some(*victim)));
            let Some(victim) = audible else {
                // Victim dead or slipped out of earshot; melt back into ambush
                agent.target = None;
                *state = AssassinState::LayInWait { baseline: None };
                return Step::Act(Intent::hold());
            };
            let point = victim.body.position;
            let yaw_error = signed_yaw_to(agent.body.forward, point - agent.body.position).abs();
            if yaw_error <= ctx.cfg.aim_tolerance_degrees
                && perception::can_see(agent, Some(victim), ctx.probe)
            {
                *state = AssassinState::Assassinate;
            }
            Step::Act(Intent::moving(Motion::Face {
                point,
                haste: ctx.cfg.aim_haste,
            }))
        }
        AssassinState::Assassinate => {
            let Some(victim) = ctx.target_of(agent) else {
                agent.target = None;
                *state = AssassinState::LayInWait { baseline: None };
                return Step::Act(Intent::hold());
            };
            let point = victim.body.position;
            debug!(agent = %agent.id, victim = %victim.id, "assassination shot");
            let order = FireOrder {
                projectile_speed: agent.stats.projectile_speed * ctx.cfg.assassin_speed_multiplier,
                damage_multiplier: ctx.cfg.assassin_damage_multiplier,
            };
            // The shot and the transition share this tick so the boosted
            // round can never be fired twice
            *state = AssassinState::VerifyKill {
                deadline: ctx.now + ctx.cfg.verify_kill_window,
            };
            Step::Act(Intent::moving(Motion::Face { point, haste: 1.0 }).with_fire(order))
        }
        AssassinState::VerifyKill { deadline } => {
            let deadline = *deadline;
            match ctx.target_of(agent) {
                None => {
                    // Kill confirmed; return to ambush with a fresh baseline
                    agent.target = None;
                    agent.last_heard = None;
                    *state = AssassinState::LayInWait { baseline: None };
                    Step::Act(Intent::hold())
                }
                Some(victim) if ctx.now >= deadline => {
                    debug!(agent = %agent.id, victim = %victim.id, "victim survived, converting to hunter");
                    agent.target = None;
                    agent.last_heard = None;
                    Step::Become(Personality::Hunter(HunterState::Chase), Intent::hold())
                }
                Some(victim) => Step::Act(Intent::moving(Motion::Face {
                    point: victim.body.position,
                    haste: 1.0,
                })),
            }
        }
    }
}
