//! Headless simulation harness: kinematic motor, cooldown cannon, a
//! circle-world probe, and the world loop that ties them together
//!
//! This is the reference host for the decision engine. It runs battles
//! without any of the host game's physics: bodies are points, hulls and
//! terrain are flat circles, and shells resolve as rays at the end of the
//! tick that fired them.

pub mod scenario;

use ahash::AHashMap;
use glam::Vec3;
use tracing::{debug, info};

use crate::agent::{Agent, AgentArena, AgentStats, Body};
use crate::controller::{startup_report, Cannon, DecisionController, Motor, TargetRegistry};
use crate::core::config::EngineConfig;
use crate::core::types::{rotate_about_y, signed_yaw_to, AgentId, DecisionEvent, FireOrder, Tick};
use crate::perception::{self, HitTarget, ObstacleProbe, ProbeHit};

pub use scenario::Scenario;

/// How far a resolved round can travel before it is considered a miss
const SHELL_RANGE: f32 = 100.0;

/// Kinematic motor: straight-line translation and yaw rotation, no inertia
#[derive(Debug, Clone, Copy)]
pub struct SimMotor {
    dt: f32,
}

impl SimMotor {
    pub fn new(dt: f32) -> Self {
        Self { dt }
    }
}

impl Motor for SimMotor {
    fn move_forward(&mut self, body: &mut Body, speed: f32) {
        body.position += body.forward * speed * self.dt;
    }

    fn turn(&mut self, body: &mut Body, degrees_per_sec: f32) {
        body.forward = rotate_about_y(body.forward, degrees_per_sec * self.dt);
    }

    fn rotate_towards(&mut self, body: &mut Body, point: Vec3, degrees_per_sec: f32) -> bool {
        let yaw = signed_yaw_to(body.forward, point - body.position);
        if yaw.abs() <= 1e-3 {
            return false;
        }
        // Clamping to the remaining yaw lands exactly on target, never past
        let max_step = (degrees_per_sec * self.dt).abs();
        body.forward = rotate_about_y(body.forward, yaw.clamp(-max_step, max_step));
        true
    }
}

/// A fired round, held until resolution at the end of the tick
#[derive(Debug, Clone, Copy)]
pub struct ShotRecord {
    pub shooter: AgentId,
    pub order: FireOrder,
    pub origin: Vec3,
    pub direction: Vec3,
    pub damage: f32,
}

/// Cooldown-enforcing cannon. A fire request during cooldown is dropped;
/// the boolean return reports whether the round actually left the barrel.
#[derive(Debug, Default)]
pub struct SimCannon {
    now: f32,
    next_ready: AHashMap<AgentId, f32>,
    pending: Vec<ShotRecord>,
    fired: u64,
}

impl SimCannon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_tick(&mut self, now: f32) {
        self.now = now;
    }

    pub fn pending(&self) -> &[ShotRecord] {
        &self.pending
    }

    /// Rounds fired over the whole battle, drained or not
    pub fn total_fired(&self) -> u64 {
        self.fired
    }

    pub fn drain(&mut self) -> Vec<ShotRecord> {
        std::mem::take(&mut self.pending)
    }
}

impl Cannon for SimCannon {
    fn fire(&mut self, shooter: &Agent, order: FireOrder) -> bool {
        let ready = self.next_ready.get(&shooter.id).copied().unwrap_or(0.0);
        if self.now < ready {
            debug!(agent = %shooter.id, "fire request during cooldown");
            return false;
        }
        self.next_ready
            .insert(shooter.id, self.now + shooter.stats.fire_cooldown);
        self.fired += 1;
        self.pending.push(ShotRecord {
            shooter: shooter.id,
            order,
            origin: shooter.body.position,
            direction: shooter.body.forward,
            damage: shooter.stats.shell_damage * order.damage_multiplier,
        });
        true
    }
}

/// Flat circular solid on the ground plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec3,
    pub radius: f32,
}

impl Circle {
    pub fn new(x: f32, z: f32, radius: f32) -> Self {
        Self {
            center: Vec3::new(x, 0.0, z),
            radius,
        }
    }

    fn contains(&self, point: Vec3) -> bool {
        let dx = point.x - self.center.x;
        let dz = point.z - self.center.z;
        dx * dx + dz * dz <= self.radius * self.radius
    }
}

/// First intersection of a flat ray with a circle; `dir` must be normalized
fn ray_circle(origin: Vec3, dir: Vec3, circle: &Circle, max: f32) -> Option<f32> {
    let ox = circle.center.x - origin.x;
    let oz = circle.center.z - origin.z;
    let b = dir.x * ox + dir.z * oz;
    let disc = b * b - (ox * ox + oz * oz - circle.radius * circle.radius);
    if disc < 0.0 {
        return None;
    }
    let t = b - disc.sqrt();
    (t > 1e-4 && t <= max).then_some(t)
}

/// Probe over a world of circles: static terrain plus one circle per living
/// unit, snapshotted at the start of every tick so all perception within a
/// pass judges the same world. Circles containing the ray origin are
/// ignored, which keeps an agent from striking its own hull.
#[derive(Debug, Default)]
pub struct ArenaProbe {
    obstacles: Vec<Circle>,
    units: Vec<(AgentId, bool, Circle)>,
    unit_radius: f32,
}

impl ArenaProbe {
    pub fn new(obstacles: Vec<Circle>, unit_radius: f32) -> Self {
        Self {
            obstacles,
            units: Vec::new(),
            unit_radius,
        }
    }

    pub fn refresh(&mut self, arena: &AgentArena) {
        self.units.clear();
        for agent in arena.iter().filter(|a| a.alive) {
            self.units.push((
                agent.id,
                agent.player_controlled,
                Circle {
                    center: agent.body.position,
                    radius: self.unit_radius,
                },
            ));
        }
    }
}

impl ObstacleProbe for ArenaProbe {
    fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<ProbeHit> {
        let flat = Vec3::new(direction.x, 0.0, direction.z);
        if flat.length_squared() < 1e-8 {
            return None;
        }
        let dir = flat.normalize();
        let mut best: Option<ProbeHit> = None;
        for circle in &self.obstacles {
            if circle.contains(origin) {
                continue;
            }
            if let Some(t) = ray_circle(origin, dir, circle, max_distance) {
                if best.map_or(true, |b| t < b.distance) {
                    best = Some(ProbeHit {
                        distance: t,
                        target: HitTarget::Terrain,
                    });
                }
            }
        }
        for (id, is_player, circle) in &self.units {
            if circle.contains(origin) {
                continue;
            }
            if let Some(t) = ray_circle(origin, dir, circle, max_distance) {
                if best.map_or(true, |b| t < b.distance) {
                    let target = if *is_player {
                        HitTarget::PlayerUnit(*id)
                    } else {
                        HitTarget::NpcUnit(*id)
                    };
                    best = Some(ProbeHit {
                        distance: t,
                        target,
                    });
                }
            }
        }
        best
    }
}

/// Live player ids in registration order
#[derive(Debug, Default)]
pub struct PlayerRoster {
    players: Vec<AgentId>,
}

impl PlayerRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: AgentId) {
        self.players.push(id);
    }

    /// Drop dead players, preserving the order of the rest
    pub fn prune(&mut self, arena: &AgentArena) {
        self.players.retain(|id| arena.is_alive(*id));
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl TargetRegistry for PlayerRoster {
    fn players(&self) -> &[AgentId] {
        &self.players
    }
}

/// A complete headless battle: arena, controller, roster, and the clock
pub struct SimWorld {
    pub arena: AgentArena,
    pub controller: DecisionController<SimMotor, SimCannon, ArenaProbe>,
    pub roster: PlayerRoster,
    pub cfg: EngineConfig,
    /// Kill rewards earned per shooter
    pub scores: AHashMap<AgentId, i32>,
    tick: Tick,
    dt: f32,
}

impl SimWorld {
    pub fn new(cfg: EngineConfig, dt: f32, obstacles: Vec<Circle>) -> Self {
        Self {
            arena: AgentArena::new(),
            controller: DecisionController::new(
                SimMotor::new(dt),
                SimCannon::new(),
                ArenaProbe::new(obstacles, 1.0),
            ),
            roster: PlayerRoster::new(),
            cfg,
            scores: AHashMap::new(),
            tick: 0,
            dt,
        }
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn now(&self) -> f32 {
        self.tick as f32 * self.dt
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Spawn a player body and enroll it in the target rotation
    pub fn spawn_player(&mut self, position: Vec3, forward: Vec3, stats: AgentStats) -> AgentId {
        let id = self.arena.spawn_player(position, forward, stats);
        self.roster.register(id);
        id
    }

    /// Validation diagnostics for everything spawned so far
    pub fn startup_events(&self) -> Vec<DecisionEvent> {
        startup_report(&self.arena)
    }

    /// Fire a player's cannon along its current forward. The round resolves
    /// at the end of the next tick and makes noise like any other shot.
    pub fn player_fires(&mut self, player: AgentId) -> bool {
        let now = self.now();
        let Some(agent) = self.arena.get(player).filter(|a| a.alive) else {
            return false;
        };
        let order = FireOrder::standard(agent.stats.projectile_speed);
        self.controller.cannon_mut().begin_tick(now);
        self.controller.cannon_mut().fire(agent, order)
    }

    /// Advance the battle one tick: prune the roster, snapshot the probe,
    /// run the decision pass, then resolve the rounds it produced
    pub fn run_tick(&mut self) -> Vec<DecisionEvent> {
        let now = self.now();
        self.roster.prune(&self.arena);
        self.controller.probe_mut().refresh(&self.arena);
        self.controller.cannon_mut().begin_tick(now);
        let events = self.controller.run_pass(
            &mut self.arena,
            &self.roster,
            &self.cfg,
            self.tick,
            now,
            self.dt,
        );
        // Re-snapshot so rounds are judged against post-movement positions
        self.controller.probe_mut().refresh(&self.arena);
        self.resolve_shots();
        self.tick += 1;
        events
    }

    fn resolve_shots(&mut self) {
        let shots = self.controller.cannon_mut().drain();
        for shot in shots {
            perception::register_noise(&mut self.arena, shot.shooter);
            let Some(hit) = self
                .controller
                .probe()
                .cast(shot.origin, shot.direction, SHELL_RANGE)
            else {
                continue;
            };
            let Some(victim) = hit.target.agent_id() else {
                continue;
            };
            match self.arena.apply_damage(victim, shot.damage) {
                Ok(true) => {
                    let value = self
                        .arena
                        .get(victim)
                        .map(|a| a.stats.point_value)
                        .unwrap_or(0);
                    *self.scores.entry(shot.shooter).or_insert(0) += value;
                    info!(shooter = %shot.shooter, victim = %victim, value, "kill");
                }
                Ok(false) => {
                    debug!(shooter = %shot.shooter, victim = %victim, damage = shot.damage, "hit");
                }
                Err(err) => debug!(%err, "shot resolution skipped"),
            }
        }
    }
}
