//! Shape generation for 2D primitives
//!
//! Pure geometry; the scene painter hands the points to `Canvas::fill_polygon`.

use glam::Vec2;
use std::f32::consts::{PI, TAU};

/// Five-pointed star (or any `points` count) around `center`
pub fn star(center: Vec2, outer: f32, inner: f32, points: usize) -> Vec<Vec2> {
    let count = points.max(2) * 2;
    let step = TAU / count as f32;
    (0..count)
        .map(|i| {
            let r = if i % 2 == 0 { outer } else { inner };
            // First point straight up
            let a = i as f32 * step - PI / 2.0;
            center + Vec2::new(a.cos(), a.sin()) * r
        })
        .collect()
}

/// Speech bubble tail hanging off a circle of `radius` at `center`
///
/// `down` points the tail below the bubble (enemy side), otherwise above.
pub fn bubble_tail(center: Vec2, radius: f32, down: bool) -> [Vec2; 3] {
    let dir = if down { 1.0 } else { -1.0 };
    let base_y = center.y + dir * radius * 0.8;
    [
        Vec2::new(center.x - radius * 0.25, base_y),
        Vec2::new(center.x + radius * 0.1, base_y),
        Vec2::new(center.x - radius * 0.45, center.y + dir * radius * 1.3),
    ]
}

/// Regular polygon around `center`, first vertex at `rotation`
pub fn regular_polygon(center: Vec2, radius: f32, sides: usize, rotation: f32) -> Vec<Vec2> {
    let sides = sides.max(3);
    let step = TAU / sides as f32;
    (0..sides)
        .map(|i| {
            let a = rotation + i as f32 * step;
            center + Vec2::new(a.cos(), a.sin()) * radius
        })
        .collect()
}

/// Interpolate meltdown bar colour: blue when full, red when empty
pub fn meltdown_color(fraction: f32) -> [u8; 3] {
    let t = fraction.clamp(0.0, 1.0);
    let red = (255.0 * (1.0 - t)) as u8;
    [red, 0, 255 - red]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_alternates_radius() {
        let pts = star(Vec2::ZERO, 10.0, 4.0, 5);
        assert_eq!(pts.len(), 10);
        assert!((pts[0] - Vec2::new(0.0, -10.0)).length() < 1e-4);
        assert!((pts[1].length() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_tail_direction() {
        let down = bubble_tail(Vec2::ZERO, 20.0, true);
        let up = bubble_tail(Vec2::ZERO, 20.0, false);
        assert!(down[2].y > 20.0);
        assert!(up[2].y < -20.0);
    }

    #[test]
    fn test_polygon_minimum_sides() {
        assert_eq!(regular_polygon(Vec2::ZERO, 1.0, 1, 0.0).len(), 3);
    }

    #[test]
    fn test_meltdown_color_ends() {
        assert_eq!(meltdown_color(1.0), [0, 0, 255]);
        assert_eq!(meltdown_color(0.0), [255, 0, 0]);
    }
}
