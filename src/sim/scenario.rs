//! Seeded scenario assembly for demos, benches, and integration tests
//!
//! Layouts are driven entirely by a `ChaCha8Rng` seed, so two scenarios
//! built from the same parameters produce identical worlds.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::agent::{AgentStats, Archetype};
use crate::core::config::EngineConfig;
use crate::core::error::Result;
use crate::core::types::rotate_about_y;
use crate::personality::profile::ArchetypeProfile;
use crate::route::Route;
use crate::sim::{Circle, SimWorld};

/// Per-archetype stat blocks used when populating a scenario
#[derive(Debug, Clone)]
pub struct Loadout {
    pub player: AgentStats,
    pub hunter: AgentStats,
    pub guard: AgentStats,
    pub assassin: AgentStats,
    pub caravan: AgentStats,
}

impl Default for Loadout {
    fn default() -> Self {
        Self {
            player: AgentStats::default(),
            hunter: ArchetypeProfile::fallback("hunter").stats(),
            guard: ArchetypeProfile::fallback("guard").stats(),
            assassin: ArchetypeProfile::fallback("assassin").stats(),
            caravan: ArchetypeProfile::fallback("caravan").stats(),
        }
    }
}

/// Parameters for a generated battle
#[derive(Debug, Clone)]
pub struct Scenario {
    pub seed: u64,
    /// Agents and obstacles land within this distance of the origin
    pub field_half_extent: f32,
    pub players: usize,
    pub hunters: usize,
    pub guards: usize,
    pub assassins: usize,
    pub caravans: usize,
    pub obstacles: usize,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            seed: 42,
            field_half_extent: 50.0,
            players: 1,
            hunters: 2,
            guards: 1,
            assassins: 1,
            caravans: 1,
            obstacles: 6,
        }
    }
}

impl Scenario {
    /// Populate a world from this layout. Players spawn first so they take
    /// the lowest ids, then hunters, guards, assassins, and caravans.
    /// Guard `i` escorts caravan `i` while both exist.
    pub fn build(&self, cfg: EngineConfig, dt: f32, loadout: &Loadout) -> Result<SimWorld> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let extent = self.field_half_extent;

        let obstacles = (0..self.obstacles)
            .map(|_| {
                Circle::new(
                    rng.gen_range(-extent..extent),
                    rng.gen_range(-extent..extent),
                    rng.gen_range(1.5..4.0),
                )
            })
            .collect();
        let mut world = SimWorld::new(cfg, dt, obstacles);

        for _ in 0..self.players {
            world.spawn_player(
                random_point(&mut rng, extent),
                random_heading(&mut rng),
                loadout.player.clone(),
            );
        }
        for _ in 0..self.hunters {
            world.arena.spawn_npc(
                Archetype::Hunter,
                random_point(&mut rng, extent),
                random_heading(&mut rng),
                loadout.hunter.clone(),
                None,
            );
        }
        let mut guards = Vec::with_capacity(self.guards);
        for _ in 0..self.guards {
            let home = random_point(&mut rng, extent);
            let id = world.arena.spawn_npc(
                Archetype::Guard,
                home,
                random_heading(&mut rng),
                loadout.guard.clone(),
                Some(Route::patrol_loop(ring_route(home, 8.0))),
            );
            guards.push(id);
        }
        for _ in 0..self.assassins {
            world.arena.spawn_npc(
                Archetype::Assassin,
                random_point(&mut rng, extent),
                random_heading(&mut rng),
                loadout.assassin.clone(),
                None,
            );
        }
        let mut caravans = Vec::with_capacity(self.caravans);
        for _ in 0..self.caravans {
            let here = random_point(&mut rng, extent);
            let there = random_point(&mut rng, extent);
            let id = world.arena.spawn_npc(
                Archetype::Caravan,
                here,
                random_heading(&mut rng),
                loadout.caravan.clone(),
                Some(Route::ping_pong(vec![here, midpoint(here, there), there])),
            );
            caravans.push(id);
        }
        for (guard, caravan) in guards.iter().zip(caravans.iter()) {
            world.arena.pair_escort(*guard, *caravan)?;
        }

        info!(
            seed = self.seed,
            players = self.players,
            hunters = self.hunters,
            guards = self.guards,
            assassins = self.assassins,
            caravans = self.caravans,
            obstacles = self.obstacles,
            "scenario assembled"
        );
        Ok(world)
    }
}

fn random_point(rng: &mut ChaCha8Rng, extent: f32) -> Vec3 {
    Vec3::new(
        rng.gen_range(-extent..extent),
        0.0,
        rng.gen_range(-extent..extent),
    )
}

fn random_heading(rng: &mut ChaCha8Rng) -> Vec3 {
    rotate_about_y(Vec3::Z, rng.gen_range(0.0..360.0))
}

/// Four waypoints on a square ring around `center`
fn ring_route(center: Vec3, radius: f32) -> Vec<Vec3> {
    [0.0_f32, 90.0, 180.0, 270.0]
        .iter()
        .map(|deg| center + rotate_about_y(Vec3::Z * radius, *deg))
        .collect()
}

fn midpoint(a: Vec3, b: Vec3) -> Vec3 {
    (a + b) * 0.5
}
