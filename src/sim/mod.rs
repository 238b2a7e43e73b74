//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed 60 Hz frame step only
//! - Seeded RNG only
//! - Stable iteration order (list order)
//! - No rendering or platform dependencies; collaborators are injected

pub mod collision;
pub mod phrases;
pub mod powerup;
pub mod screen;
pub mod state;
pub mod tick;

use crate::audio::AudioSink;
use crate::leaderboard::LeaderboardPort;

pub use collision::{Rect, circle_circle_overlap, circle_rect_overlap, point_in_circle};
pub use powerup::{POWER_UPS, PowerUpKind, PowerUpSpec};
pub use screen::{HostAction, Input, handle_input};
pub use state::{
    Bubble, FormField, Game, Palette, Particle, Player, PowerUp, Rgb, Screen, ScorePopup, Side,
};
pub use tick::update;

/// Collaborators borrowed for one frame
pub struct Services<'a> {
    pub leaderboard: &'a mut dyn LeaderboardPort,
    pub audio: &'a mut dyn AudioSink,
}

impl<'a> Services<'a> {
    pub fn new(leaderboard: &'a mut dyn LeaderboardPort, audio: &'a mut dyn AudioSink) -> Self {
        Self { leaderboard, audio }
    }
}
