//! Bubble captions and the size-fit rule

use rand::Rng;

use super::state::Side;

/// Bubbles below this size only carry short captions
pub const SMALL_BUBBLE_SIZE: f32 = 50.0;
/// Longest caption allowed on a small bubble (characters)
pub const SHORT_PHRASE_MAX: usize = 8;

/// Captions on falling enemy bubbles
pub const ENEMY_PHRASES: &[&str] = &[
    "Oh look, you're all dressed up.",
    "You're not in a very good position.",
    "You're gambling with the whole world.",
    "What if a bomb drops on your head?",
    "They respect me.",
    "Great television.",
    "Resign and send somebody over.",
    "Fake News",
    "Build the Wall",
    "Drain the Swamp",
    "You're fired!",
    "Sad!",
    "Tremendous",
    "Believe me",
    "Witch Hunt",
    "Bigly",
    "Wrong",
    "Loser",
    "We'll see what happens",
    "Not good",
    "Disaster",
    "Such a nasty remark",
];

/// Captions on projectile bubbles
pub const PROJECTILE_PHRASES: &[&str] = &[
    "Don't take the bait.",
    "Freedom!",
    "Democracy!",
    "Unity!",
    "Peace!",
    "Justice!",
    "Truth!",
    "Resist!",
    "Courage!",
    "Strength!",
    "Hope!",
    "Victory!",
    "Solidarity!",
];

/// Caption set for a bubble side
pub fn phrases_for(side: Side) -> &'static [&'static str] {
    match side {
        Side::Enemy => ENEMY_PHRASES,
        Side::Projectile => PROJECTILE_PHRASES,
    }
}

/// Pick a caption that fits a bubble of the given size
pub fn pick_phrase<R: Rng + ?Sized>(side: Side, size: f32, rng: &mut R) -> &'static str {
    let all = phrases_for(side);
    if size < SMALL_BUBBLE_SIZE {
        let short: Vec<&'static str> = all
            .iter()
            .copied()
            .filter(|p| p.chars().count() <= SHORT_PHRASE_MAX)
            .collect();
        if !short.is_empty() {
            return short[rng.random_range(0..short.len())];
        }
    }
    all[rng.random_range(0..all.len())]
}

/// Grow a bubble so a long caption fits inside it
///
/// Captions over 10 characters scale the size by 1.0..1.8 across 10..30
/// characters; captions over 15 characters also get at least size 100.
pub fn fit_size(size: f32, phrase: &str) -> f32 {
    let len = phrase.chars().count();
    if len <= 10 {
        return size;
    }
    let factor = crate::remap(len as f32, 10.0, 30.0, 1.0, 1.8);
    let grown = size * factor;
    if len > 15 { grown.max(100.0) } else { grown }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_small_bubbles_get_short_phrases() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..200 {
            let p = pick_phrase(Side::Projectile, 40.0, &mut rng);
            assert!(p.chars().count() <= SHORT_PHRASE_MAX, "{p} too long");
            let p = pick_phrase(Side::Enemy, 40.0, &mut rng);
            assert!(p.chars().count() <= SHORT_PHRASE_MAX, "{p} too long");
        }
    }

    #[test]
    fn test_short_phrase_keeps_size() {
        assert_eq!(fit_size(40.0, "Hope!"), 40.0);
        assert_eq!(fit_size(70.0, "Tremendous"), 70.0);
    }

    #[test]
    fn test_long_phrase_grows() {
        // 14 characters -> factor 1.16
        let size = fit_size(60.0, "Believe me now");
        assert!((size - 60.0 * 1.16).abs() < 1e-3);
        // Over 15 characters enforces the minimum
        assert_eq!(fit_size(40.0, "Don't take the bait."), 100.0);
    }
}
