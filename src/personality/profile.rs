//! Archetype profiles loaded from TOML
//!
//! Combat tuning lives in `data/archetypes/{name}.toml` rather than in
//! code. Every section is optional; missing keys fall back to the stock
//! tank so a sparse profile stays loadable.

use std::path::Path;

use serde::Deserialize;

use crate::agent::{AgentStats, RepairKind};
use crate::core::error::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct ArchetypeProfile {
    pub name: String,
    #[serde(default)]
    pub combat: CombatSection,
    #[serde(default)]
    pub perception: PerceptionSection,
    #[serde(default)]
    pub scoring: ScoringSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CombatSection {
    pub max_health: f32,
    pub move_speed: f32,
    pub turn_speed: f32,
    pub fire_cooldown: f32,
    pub projectile_speed: f32,
    pub shell_damage: f32,
    pub flee_threshold: f32,
    pub repair_kind: RepairKind,
    pub heal_rate: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PerceptionSection {
    pub sense_radius: f32,
    pub hearing_radius: f32,
    pub sight_range: f32,
    pub sight_angle: f32,
    pub lock_on_angle: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringSection {
    pub point_value: i32,
    pub min_point_value: i32,
}

impl Default for CombatSection {
    fn default() -> Self {
        let stock = AgentStats::default();
        Self {
            max_health: stock.max_health,
            move_speed: stock.move_speed,
            turn_speed: stock.turn_speed,
            fire_cooldown: stock.fire_cooldown,
            projectile_speed: stock.projectile_speed,
            shell_damage: stock.shell_damage,
            flee_threshold: stock.flee_threshold,
            repair_kind: stock.repair_kind,
            heal_rate: stock.heal_rate,
        }
    }
}

impl Default for PerceptionSection {
    fn default() -> Self {
        let stock = AgentStats::default();
        Self {
            sense_radius: stock.sense_radius,
            hearing_radius: stock.hearing_radius,
            sight_range: stock.sight_range,
            sight_angle: stock.sight_angle,
            lock_on_angle: stock.lock_on_angle,
        }
    }
}

impl Default for ScoringSection {
    fn default() -> Self {
        let stock = AgentStats::default();
        Self {
            point_value: stock.point_value,
            min_point_value: stock.min_point_value,
        }
    }
}

impl ArchetypeProfile {
    /// Stock profile used when a TOML file is missing or malformed
    pub fn fallback(name: &str) -> Self {
        Self {
            name: name.to_string(),
            combat: CombatSection::default(),
            perception: PerceptionSection::default(),
            scoring: ScoringSection::default(),
        }
    }

    /// Materialize the spawn-time stats this profile describes
    pub fn stats(&self) -> AgentStats {
        AgentStats {
            health: self.combat.max_health,
            max_health: self.combat.max_health,
            flee_threshold: self.combat.flee_threshold,
            move_speed: self.combat.move_speed,
            turn_speed: self.combat.turn_speed,
            fire_cooldown: self.combat.fire_cooldown,
            projectile_speed: self.combat.projectile_speed,
            shell_damage: self.combat.shell_damage,
            point_value: self.scoring.point_value,
            min_point_value: self.scoring.min_point_value,
            sense_radius: self.perception.sense_radius,
            hearing_radius: self.perception.hearing_radius,
            sight_range: self.perception.sight_range,
            sight_angle: self.perception.sight_angle,
            lock_on_angle: self.perception.lock_on_angle,
            repair_kind: self.combat.repair_kind,
            heal_rate: self.combat.heal_rate,
        }
    }
}

/// Load `data/archetypes/{name}.toml` relative to the working directory
pub fn load_profile(name: &str) -> Result<ArchetypeProfile> {
    let path = Path::new("data/archetypes").join(format!("{name}.toml"));
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}
