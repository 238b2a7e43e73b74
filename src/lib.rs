//! Meltdown - a single-screen bubble shooter
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (entities, collisions, screens)
//! - `renderer`: Canvas abstraction and scene painting
//! - `app`: Frame driver with the fault boundary
//! - `leaderboard`: Score submission and ranking collaborators
//! - `platform`: Browser/native collaborator implementations
//! - `autoplay`: Input generator for headless runs
//! - `tuning`: Data-driven game balance

pub mod app;
pub mod audio;
pub mod autoplay;
pub mod leaderboard;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use app::{FrameDriver, HostAction};
pub use leaderboard::{LeaderboardEntry, LeaderboardPort, ScoreStore};
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Simulation rate; every timer in the game counts frames at this rate
    pub const TICKS_PER_SECOND: u32 = 60;
    /// Seconds advanced per simulation frame
    pub const FRAME_DT: f32 = 1.0 / TICKS_PER_SECOND as f32;

    /// Arena dimensions (logical pixels)
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 600.0;

    /// Player spawns this far above the bottom edge
    pub const PLAYER_BASELINE: f32 = 100.0;
}

/// Linear remap of `value` from one range to another (unclamped)
#[inline]
pub fn remap(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    out_min + (value - in_min) / (in_max - in_min) * (out_max - out_min)
}

/// Linear remap clamped to the output range
#[inline]
pub fn remap_clamped(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    let lo = out_min.min(out_max);
    let hi = out_min.max(out_max);
    remap(value, in_min, in_max, out_min, out_max).clamp(lo, hi)
}

/// Convert seconds to whole simulation frames
#[inline]
pub fn secs_to_frames(secs: f32) -> u64 {
    (secs * consts::TICKS_PER_SECOND as f32).round().max(0.0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remap() {
        assert!((remap(20.0, 10.0, 30.0, 1.0, 1.8) - 1.4).abs() < 1e-6);
        assert!((remap(0.5, 0.0, 1.0, 1.5, 0.8) - 1.15).abs() < 1e-6);
    }

    #[test]
    fn test_remap_clamped() {
        assert_eq!(remap_clamped(40.0, 5.0, 30.0, 1.0, 0.5), 0.5);
        assert_eq!(remap_clamped(0.0, 5.0, 30.0, 1.0, 0.5), 1.0);
    }

    #[test]
    fn test_secs_to_frames() {
        assert_eq!(secs_to_frames(5.0), 300);
        assert_eq!(secs_to_frames(0.5), 30);
        assert_eq!(secs_to_frames(-1.0), 0);
    }
}
