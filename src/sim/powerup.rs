//! Power-up table
//!
//! Kinds are rolled in declaration order every frame; the first hit spawns.

use serde::{Deserialize, Serialize};

use super::state::Rgb;

/// Power-up kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Sweeps every enemy off the board
    ClearBoard,
    /// Suppresses meltdown damage for a while
    Invincibility,
    /// Multiplies the score multiplier for a while
    ScoreBoost,
}

/// Static description of one power-up kind
#[derive(Debug, Clone, Copy)]
pub struct PowerUpSpec {
    pub kind: PowerUpKind,
    pub name: &'static str,
    /// Shown in the transient message on pickup
    pub effect: &'static str,
    pub color: Rgb,
    /// Probability of spawning on any given frame
    pub spawn_chance: f64,
    pub size: f32,
    /// Effect duration in frames, `None` for instant effects
    pub duration: Option<u64>,
    /// Glyph painted in the middle of the orb
    pub icon: &'static str,
}

/// All power-ups in spawn-roll order
pub static POWER_UPS: [PowerUpSpec; 3] = [
    PowerUpSpec {
        kind: PowerUpKind::ClearBoard,
        name: "Executive Order",
        effect: "Clears all red bubbles",
        color: [255, 215, 0],
        spawn_chance: 0.001,
        size: 40.0,
        duration: None,
        icon: "E",
    },
    PowerUpSpec {
        kind: PowerUpKind::Invincibility,
        name: "Diplomatic Immunity",
        effect: "Temporary invincibility",
        color: [0, 191, 255],
        spawn_chance: 0.0005,
        size: 40.0,
        duration: Some(5 * 60),
        icon: "I",
    },
    PowerUpSpec {
        kind: PowerUpKind::ScoreBoost,
        name: "Media Blitz",
        effect: "Double score for a limited time",
        color: [255, 105, 180],
        spawn_chance: 0.0008,
        size: 40.0,
        duration: Some(10 * 60),
        icon: "M",
    },
];

impl PowerUpKind {
    /// Table entry for this kind
    pub fn spec(self) -> &'static PowerUpSpec {
        match self {
            PowerUpKind::ClearBoard => &POWER_UPS[0],
            PowerUpKind::Invincibility => &POWER_UPS[1],
            PowerUpKind::ScoreBoost => &POWER_UPS[2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lookup_matches_table() {
        for spec in &POWER_UPS {
            assert_eq!(spec.kind.spec().kind, spec.kind);
        }
    }

    #[test]
    fn test_only_clear_board_is_instant() {
        assert!(PowerUpKind::ClearBoard.spec().duration.is_none());
        assert_eq!(PowerUpKind::Invincibility.spec().duration, Some(300));
        assert_eq!(PowerUpKind::ScoreBoost.spec().duration, Some(600));
    }
}
