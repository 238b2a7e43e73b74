//! Autopilot that plays a run without a human
//!
//! Used by the headless CLI. Each frame it picks a target column: the lowest
//! enemy when one is threatening, otherwise the nearest falling power-up. It
//! slides toward the column and fires on a fixed cadence once lined up.

use crate::sim::{Game, Input, Screen};

/// Enemies above this fraction of the arena height are not a threat yet
const SAFE_FRACTION: f32 = 0.4;
/// Horizontal slack before the autopilot stops steering
const DEAD_ZONE: f32 = 8.0;

/// Frame-by-frame input generator
#[derive(Debug, Clone)]
pub struct Autopilot {
    /// Frames between shots
    pub fire_interval: u64,
    last_shot: Option<u64>,
    left: bool,
    right: bool,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self::new(12)
    }
}

impl Autopilot {
    pub fn new(fire_interval: u64) -> Self {
        Self {
            fire_interval: fire_interval.max(1),
            last_shot: None,
            left: false,
            right: false,
        }
    }

    /// Column the player should move under, if any
    pub fn target_x(game: &Game) -> Option<f32> {
        // Lowest enemy is the most dangerous
        let threat = game
            .enemies
            .iter()
            .max_by(|a, b| a.pos.y.partial_cmp(&b.pos.y).unwrap_or(std::cmp::Ordering::Equal));

        let safe = threat.is_none_or(|e| e.pos.y < game.height * SAFE_FRACTION);
        if safe {
            let px = game.player.pos.x;
            let pickup = game.power_ups.iter().min_by(|a, b| {
                (a.pos.x - px)
                    .abs()
                    .partial_cmp(&(b.pos.x - px).abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            if let Some(p) = pickup {
                return Some(p.pos.x);
            }
        }
        threat.map(|e| e.pos.x)
    }

    /// Inputs to feed this frame
    ///
    /// Movement is emitted as press/release edges so the player state stays
    /// consistent with what a keyboard would produce.
    pub fn inputs(&mut self, game: &Game) -> Vec<Input> {
        let mut out = Vec::new();
        match game.screen {
            Screen::Start => {
                out.push(Input::Confirm);
                return out;
            }
            Screen::Play => {}
            _ => {
                self.release(&mut out);
                return out;
            }
        }

        let (want_left, want_right, aligned) = match Self::target_x(game) {
            Some(x) => {
                let dx = x - game.player.pos.x;
                (dx < -DEAD_ZONE, dx > DEAD_ZONE, dx.abs() <= game.player.size.x / 2.0)
            }
            None => (false, false, false),
        };

        if want_left != self.left {
            self.left = want_left;
            out.push(Input::MoveLeft(want_left));
        }
        if want_right != self.right {
            self.right = want_right;
            out.push(Input::MoveRight(want_right));
        }

        let ready = self
            .last_shot
            .is_none_or(|t| game.frame.saturating_sub(t) >= self.fire_interval);
        if aligned && ready && !game.enemies.is_empty() && !game.auto_fire.enabled {
            self.last_shot = Some(game.frame);
            out.push(Input::Fire);
        }
        out
    }

    fn release(&mut self, out: &mut Vec<Input>) {
        if self.left {
            self.left = false;
            out.push(Input::MoveLeft(false));
        }
        if self.right {
            self.right = false;
            out.push(Input::MoveRight(false));
        }
    }
}
