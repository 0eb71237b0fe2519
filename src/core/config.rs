//! Engine configuration with documented constants
//!
//! All cross-archetype tuning values are collected here with explanations of
//! their purpose. Per-archetype numbers (speeds, radii, health) live in the
//! archetype profiles instead.

/// Tuning shared by every decision subsystem.
///
/// Passed by reference into each decision pass so tests and scenarios can
/// vary it without global state.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    // === NAVIGATION ===
    /// Distance at which a waypoint counts as reached (world units)
    ///
    /// Compared squared against the flat distance to the current waypoint.
    /// Too small and agents orbit a point they can never exactly hit.
    pub close_enough: f32,

    /// Distance at which a chasing agent stops closing on its target
    ///
    /// Keeps hunters from ramming the target they are shooting at.
    pub chase_close_enough: f32,

    // === OBSTACLE AVOIDANCE ===
    /// Seconds of clear forward travel before avoidance stands down
    ///
    /// The advancing stage runs this long after the turning stage finds an
    /// open heading; expiry hands control back to the interrupted behavior.
    pub avoidance_time: f32,

    /// Degrees off forward for the two turn-direction probes
    pub side_probe_angle: f32,

    /// Length multiplier for the side probes, relative to the forward check
    ///
    /// Slightly over 1.0 so a heading only counts as open when it stays
    /// clear a little beyond one tick of travel.
    pub side_probe_scale: f32,

    // === FLEEING ===
    /// Length of the flee vector projected away from the threat
    pub flee_distance: f32,

    /// Seconds of fleeing before obstacle avoidance participates
    ///
    /// Gives the agent time to finish turning away from the threat before
    /// side probes can spin it back around.
    pub flee_before_avoiding: f32,

    /// Seconds of fleeing before the agent re-evaluates its situation
    pub flee_before_checking: f32,

    // === RESTING ===
    /// Seconds between heal pulses for agents repairing in fixed ticks
    pub repair_tick_length: f32,

    // === CARAVAN ===
    /// Kill-point value lost each time a caravan completes a circuit
    ///
    /// Floored at the caravan's configured minimum so a long-lived caravan
    /// is worth progressively less but never nothing.
    pub circuit_point_decay: i32,

    // === ASSASSINATION ===
    /// Seconds an assassin waits for its shot to be confirmed
    pub verify_kill_window: f32,

    /// Rotation-rate multiplier while taking aim
    pub aim_haste: f32,

    /// Yaw error (degrees) under which aim counts as exact
    pub aim_tolerance_degrees: f32,

    /// Damage multiplier on the single assassination shot
    pub assassin_damage_multiplier: f32,

    /// Projectile-speed multiplier on the single assassination shot
    pub assassin_speed_multiplier: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // Navigation
            close_enough: 1.0,
            chase_close_enough: 3.0,

            // Avoidance
            avoidance_time: 2.0,
            side_probe_angle: 45.0,
            side_probe_scale: 1.2,

            // Fleeing
            flee_distance: 1.0,
            flee_before_avoiding: 3.0,
            flee_before_checking: 30.0,

            // Resting
            repair_tick_length: 1.0,

            // Caravan
            circuit_point_decay: 10,

            // Assassination
            verify_kill_window: 5.0,
            aim_haste: 2.0,
            aim_tolerance_degrees: 1.0,
            assassin_damage_multiplier: 3.0,
            assassin_speed_multiplier: 2.0,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.close_enough <= 0.0 {
            return Err("close_enough must be positive".into());
        }

        if self.avoidance_time <= 0.0 {
            return Err("avoidance_time must be positive".into());
        }

        if self.side_probe_scale <= 0.0 {
            return Err("side_probe_scale must be positive".into());
        }

        // The agent must finish turning away before it starts re-planning
        if self.flee_before_avoiding >= self.flee_before_checking {
            return Err(format!(
                "flee_before_avoiding ({}) should be < flee_before_checking ({})",
                self.flee_before_avoiding, self.flee_before_checking
            ));
        }

        if self.circuit_point_decay < 0 {
            return Err("circuit_point_decay must not be negative".into());
        }

        if self.verify_kill_window <= 0.0 {
            return Err("verify_kill_window must be positive".into());
        }

        if self.aim_tolerance_degrees <= 0.0 {
            return Err("aim_tolerance_degrees must be positive".into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_flee_windows_rejected() {
        let mut config = EngineConfig::default();
        config.flee_before_avoiding = 40.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_decay_rejected() {
        let mut config = EngineConfig::default();
        config.circuit_point_decay = -1;
        assert!(config.validate().is_err());
    }
}
