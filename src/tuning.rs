//! Data-driven game balance
//!
//! Every gameplay constant lives here so a run can be replayed or rebalanced
//! from JSON without touching the simulation. Rates are per frame unless the
//! field name says otherwise.

use serde::{Deserialize, Serialize};

/// Gameplay tuning knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Meltdown bar ===
    pub meltdown_max: f32,
    /// Drained every frame, scaled by difficulty
    pub meltdown_drain: f32,
    /// Lost when an enemy bubble reaches the player
    pub meltdown_damage: f32,
    /// Refill per destroyed enemy at time zero
    pub meltdown_base_fill: f32,
    /// Refill decay per second of play, scaled by difficulty
    pub meltdown_fill_decay: f32,
    pub meltdown_min_fill: f32,

    // === Difficulty ===
    pub difficulty_start: f32,
    /// Difficulty gained per second of play
    pub difficulty_per_sec: f32,
    pub max_difficulty: f32,

    // === Scoring ===
    /// Multiplier gained per second of play
    pub multiplier_per_sec: f32,
    /// Points for a projectile hit, before the multiplier
    pub hit_score: u64,
    /// Points per enemy swept by the clear-board power-up
    pub clear_score: u64,
    /// Meltdown refill granted by the clear-board power-up
    pub clear_refill: f32,
    /// Factor applied to the multiplier while the score boost is active
    pub boost_factor: f32,

    // === Enemy spawning ===
    /// Frames between enemy spawns at difficulty 1
    pub spawn_interval: f32,
    /// Spawn interval floor at high difficulty
    pub min_spawn_interval: f32,
    pub spawn_margin: f32,
    pub enemy_size: (f32, f32),
    pub enemy_speed: (f32, f32),

    // === Player and projectiles ===
    pub player_width: f32,
    pub player_height: f32,
    pub player_speed: f32,
    pub projectile_size: f32,
    pub projectile_speed: f32,
    /// Projectiles leave this far above the player's centre
    pub projectile_offset: f32,
    pub auto_fire_interval: u64,

    // === Power-ups ===
    pub power_up_speed: (f32, f32),

    // === Game over ===
    /// Seconds before a qualifying run jumps to the submit form
    pub game_over_delay: f32,
    /// Seconds the game-over screen shakes
    pub shake_duration: f32,

    // === Presentation ===
    pub music_update_interval: u32,
    /// Chance that a projectile hit triggers a voice cue
    pub voice_chance: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            meltdown_max: 100.0,
            meltdown_drain: 0.2,
            meltdown_damage: 15.0,
            meltdown_base_fill: 15.0,
            meltdown_fill_decay: 0.02,
            meltdown_min_fill: 2.0,

            difficulty_start: 1.0,
            difficulty_per_sec: 0.05,
            max_difficulty: 5.0,

            multiplier_per_sec: 0.01,
            hit_score: 100,
            clear_score: 50,
            clear_refill: 20.0,
            boost_factor: 2.0,

            spawn_interval: 60.0,
            min_spawn_interval: 15.0,
            spawn_margin: 50.0,
            enemy_size: (60.0, 100.0),
            enemy_speed: (2.0, 4.0),

            player_width: 80.0,
            player_height: 120.0,
            player_speed: 8.0,
            projectile_size: 40.0,
            projectile_speed: 8.0,
            projectile_offset: 30.0,
            auto_fire_interval: 30,

            power_up_speed: (1.0, 3.0),

            game_over_delay: 1.5,
            shake_duration: 5.0,

            music_update_interval: 30,
            voice_chance: 0.2,
        }
    }
}

impl Tuning {
    /// Frames between enemy spawns at the given difficulty
    pub fn spawn_threshold(&self, difficulty: f32) -> f32 {
        self.min_spawn_interval
            .max(self.spawn_interval / difficulty.max(f32::EPSILON))
    }

    /// Meltdown refill per destroyed enemy after `elapsed` seconds
    pub fn refill_amount(&self, elapsed: f32, difficulty: f32) -> f32 {
        self.meltdown_min_fill
            .max(self.meltdown_base_fill - elapsed * self.meltdown_fill_decay * difficulty)
    }

    /// Base score multiplier after `elapsed` seconds, before boosts
    pub fn base_multiplier(&self, elapsed: f32) -> f32 {
        1.0 + elapsed * self.multiplier_per_sec
    }

    /// Parse tuning overrides from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_threshold_floors() {
        let t = Tuning::default();
        assert_eq!(t.spawn_threshold(1.0), 60.0);
        assert_eq!(t.spawn_threshold(2.0), 30.0);
        assert_eq!(t.spawn_threshold(5.0), 15.0);
    }

    #[test]
    fn test_refill_decays_to_floor() {
        let t = Tuning::default();
        assert_eq!(t.refill_amount(0.0, 1.0), 15.0);
        assert!((t.refill_amount(100.0, 1.0) - 13.0).abs() < 1e-4);
        assert_eq!(t.refill_amount(10_000.0, 5.0), 2.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let t = Tuning::from_json(r#"{ "meltdown_damage": 25.0 }"#).unwrap();
        assert_eq!(t.meltdown_damage, 25.0);
        assert_eq!(t.meltdown_max, 100.0);
    }
}
