//! Scene painting
//!
//! Draws every screen straight from `Game`. Nothing here mutates simulation
//! state; anything that looks random (the game-over shake) is derived from
//! the frame counter.

use glam::Vec2;

use super::shapes;
use super::{Align, Canvas, Color, TextStyle};
use crate::sim::screen::layout;
use crate::sim::state::{Bubble, Game, Particle, PowerUp, ScorePopup, Screen, Side, TouchButton};
use crate::sim::{PowerUpKind, Rect};

/// Host-side drawing preferences
#[derive(Debug, Clone, Copy)]
pub struct SceneOptions {
    /// Shake the background after game over
    pub screen_shake: bool,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self { screen_shake: true }
    }
}

const BACKGROUND: Color = Color::rgb(24, 28, 48);
const FLOOR: Color = Color::rgb(70, 40, 30);
const ENEMY_FILL: Color = Color::rgb(220, 50, 50);
const PROJECTILE_FILL: Color = Color::rgb(50, 110, 230);
const GOLD: Color = Color::rgb(255, 215, 0);
const SILVER: Color = Color::rgb(192, 192, 192);
const BRONZE: Color = Color::rgb(205, 127, 50);
const SUCCESS: Color = Color::rgb(76, 175, 80);
const ERROR: Color = Color::rgb(255, 100, 100);

/// Paint one frame
pub fn draw(game: &Game, canvas: &mut dyn Canvas, opts: SceneOptions) {
    match game.screen {
        Screen::Start => {
            draw_background(game, canvas);
            draw_start(game, canvas);
        }
        Screen::Play => {
            draw_background(game, canvas);
            draw_play(game, canvas);
        }
        Screen::GameOver => draw_game_over(game, canvas, opts),
        Screen::Leaderboard => {
            draw_background(game, canvas);
            draw_leaderboard(game, canvas);
        }
        Screen::SubmitScore => {
            draw_background(game, canvas);
            draw_submit(game, canvas);
        }
    }

    if let Some(text) = game.visible_message() {
        draw_message(game, canvas, text);
    }
}

/// Fault screen painted instead of the game after a crash
pub fn draw_error(canvas: &mut dyn Canvas, width: f32, height: f32) {
    canvas.fill_rect(Rect::from_corner(0.0, 0.0, width, height), Color::BLACK);
    let center = Vec2::new(width / 2.0, height / 2.0);
    canvas.text(
        "Game error occurred. Press R to restart.",
        center,
        TextStyle::new(20.0, Color::rgb(255, 0, 0)),
    );
}

fn screen_rect(game: &Game) -> Rect {
    Rect::from_corner(0.0, 0.0, game.width, game.height)
}

fn overlay(game: &Game, canvas: &mut dyn Canvas, alpha: u8) {
    canvas.fill_rect(screen_rect(game), Color::rgba(0, 0, 0, alpha));
}

fn draw_background(game: &Game, canvas: &mut dyn Canvas) {
    canvas.fill_rect(screen_rect(game), BACKGROUND);
    // Office floor under the player
    let floor_top = game.height - 40.0;
    canvas.fill_rect(Rect::from_corner(0.0, floor_top, game.width, 40.0), FLOOR);
}

fn draw_start(game: &Game, canvas: &mut dyn Canvas) {
    overlay(game, canvas, 150);
    let cx = game.width / 2.0;
    let (w, h) = (game.width, game.height);
    let title = TextStyle::new(40.0, Color::WHITE).bold();
    canvas.text("Diplomatic Disaster", Vec2::new(cx, h / 3.0), title);
    canvas.text("Meltdown", Vec2::new(cx, h / 3.0 + 50.0), title);

    let body = TextStyle::new(20.0, Color::WHITE);
    let lines: [&str; 2] = if game.touch.enabled {
        [
            "Use on-screen buttons to move and shoot",
            "Toggle auto-shoot with the button in the corner",
        ]
    } else {
        [
            "Use LEFT and RIGHT arrows to move",
            "Press SPACE to shoot blue speech bubbles",
        ]
    };
    canvas.text(lines[0], Vec2::new(cx, h / 2.0 + 30.0), body);
    canvas.text(lines[1], Vec2::new(cx, h / 2.0 + 60.0), body);
    canvas.text(
        "Destroy red bubbles to fill the meltdown bar",
        Vec2::new(cx, h / 2.0 + 90.0),
        body,
    );

    let prompt = if game.touch.enabled {
        "Tap anywhere to start"
    } else {
        "Press ENTER to start"
    };
    canvas.text(prompt, Vec2::new(w / 2.0, h * 0.75), TextStyle::new(24.0, Color::WHITE));
}

fn draw_play(game: &Game, canvas: &mut dyn Canvas) {
    draw_entities(game, canvas);
    draw_active_power_ups(game, canvas);
    draw_meltdown_bar(game, canvas);
    draw_score(game, canvas);
    draw_difficulty(game, canvas);
    if let Some(target) = game.challenge {
        draw_challenge(game, canvas, target);
    }
    if game.touch.enabled {
        draw_touch_controls(game, canvas);
    }
}

fn draw_entities(game: &Game, canvas: &mut dyn Canvas) {
    draw_player(game, canvas);
    for p in &game.power_ups {
        draw_power_up(p, canvas);
    }
    for b in game.enemies.iter().chain(&game.projectiles) {
        draw_bubble(b, canvas);
    }
    for p in &game.particles {
        draw_particle(p, canvas);
    }
    for popup in &game.popups {
        draw_popup(popup, canvas);
    }
}

fn draw_player(game: &Game, canvas: &mut dyn Canvas) {
    let p = &game.player;
    let body = p.bounds();
    // Suit
    let suit = Rect {
        top: body.top + body.height() * 0.35,
        ..body
    };
    canvas.fill_round_rect(suit, 12.0, Color::rgb(40, 60, 40));
    // Head
    let head = Vec2::new(p.pos.x, body.top + body.height() * 0.2);
    canvas.fill_ellipse(head, Vec2::splat(body.width() * 0.3), Color::rgb(230, 190, 160));

    if game.is_invincible() {
        let pulse = ((game.frame as f32 * 0.2).sin() * 0.5 + 0.5) * 120.0 + 60.0;
        canvas.stroke_ellipse(
            p.pos,
            Vec2::new(body.width() * 0.8, body.height() * 0.6),
            Color::rgb(0, 191, 255).with_alpha(pulse),
            3.0,
        );
    }
}

fn draw_bubble(bubble: &Bubble, canvas: &mut dyn Canvas) {
    let (fill, down) = match bubble.side {
        Side::Enemy => (ENEMY_FILL, true),
        Side::Projectile => (PROJECTILE_FILL, false),
    };

    canvas.push();
    canvas.translate(bubble.pos);
    canvas.rotate(bubble.rotation);
    canvas.scale(bubble.scale);

    let r = bubble.radius;
    canvas.fill_ellipse(Vec2::ZERO, Vec2::splat(r), fill);
    canvas.fill_polygon(&shapes::bubble_tail(Vec2::ZERO, r, down), fill);
    canvas.stroke_ellipse(Vec2::ZERO, Vec2::splat(r), Color::WHITE.with_alpha(180.0), 2.0);

    // Shrink long captions, cap at 20px, then fit to 75% of the bubble
    let len = bubble.phrase.chars().count() as f32;
    let factor = crate::remap_clamped(len, 5.0, 30.0, 1.0, 0.5);
    let mut size = (bubble.size / 6.0 * factor).min(20.0);
    let width = canvas.measure_text(bubble.phrase, size, true);
    let max_width = bubble.size * 0.75;
    if width > max_width {
        size *= max_width / width;
    }

    let shadow = TextStyle::new(size, Color::rgba(0, 0, 0, 200)).bold();
    canvas.text(bubble.phrase, Vec2::new(2.0, 2.0), shadow);
    canvas.text(bubble.phrase, Vec2::ZERO, TextStyle::new(size, Color::WHITE).bold());
    canvas.pop();
}

fn draw_power_up(p: &PowerUp, canvas: &mut dyn Canvas) {
    let spec = p.kind.spec();
    let color = Color::from(spec.color);

    canvas.push();
    canvas.translate(p.pos);
    canvas.rotate(p.rotation);
    canvas.scale(p.scale);

    // Glow
    canvas.fill_ellipse(Vec2::ZERO, Vec2::splat(p.radius * 1.5), color.with_alpha(100.0 * p.pulse));
    canvas.fill_ellipse(Vec2::ZERO, Vec2::splat(p.radius), color);
    canvas.stroke_ellipse(Vec2::ZERO, Vec2::splat(p.radius), Color::WHITE, 2.0);
    canvas.text(spec.icon, Vec2::ZERO, TextStyle::new(p.size * 0.5, Color::WHITE).bold());
    canvas.pop();
}

fn draw_particle(p: &Particle, canvas: &mut dyn Canvas) {
    let color = Color::from(p.color).with_alpha(p.alpha);
    if p.palette.is_flag() {
        canvas.fill_polygon(&shapes::star(p.pos, p.size, p.size * 0.4, 5), color);
    } else {
        canvas.fill_ellipse(p.pos, Vec2::splat(p.size / 2.0), color);
    }
}

fn draw_popup(popup: &ScorePopup, canvas: &mut dyn Canvas) {
    let style = TextStyle::new(20.0, Color::rgb(255, 255, 0).with_alpha(popup.alpha)).bold();
    canvas.text(&format!("+{}", popup.value), popup.pos, style);
}

fn draw_meltdown_bar(game: &Game, canvas: &mut dyn Canvas) {
    let frame = Rect::from_corner(20.0, 20.0, 200.0, 30.0);
    canvas.fill_round_rect(frame, 5.0, Color::gray(100));

    let fraction = game.meltdown / game.tuning.meltdown_max;
    let fill = Rect::from_corner(20.0, 20.0, 200.0 * fraction, 30.0);
    canvas.fill_round_rect(fill, 5.0, Color::from(shapes::meltdown_color(fraction)));
    canvas.text("MELTDOWN", Vec2::new(120.0, 35.0), TextStyle::new(16.0, Color::WHITE));
}

fn draw_score(game: &Game, canvas: &mut dyn Canvas) {
    let x = game.width - 20.0;
    let right = |size: f32| TextStyle::new(size, Color::WHITE).align(Align::Right).top();
    canvas.text(&format!("Score: {}", game.score), Vec2::new(x, 20.0), right(20.0));
    canvas.text(
        &format!("Multiplier: {:.1}x", game.multiplier),
        Vec2::new(x, 45.0),
        right(14.0),
    );
    canvas.text(
        &format!("Meltdown Fill: {:.1}", game.refill),
        Vec2::new(x, 65.0),
        right(14.0),
    );
}

fn draw_difficulty(game: &Game, canvas: &mut dyn Canvas) {
    let style = TextStyle::new(16.0, Color::WHITE).align(Align::Left);
    canvas.text(
        &format!("Difficulty: {:.1}", game.difficulty),
        Vec2::new(20.0, 70.0),
        style,
    );
    canvas.text(&format!("Time: {:.0}s", game.elapsed), Vec2::new(20.0, 90.0), style);
}

fn draw_active_power_ups(game: &Game, canvas: &mut dyn Canvas) {
    const X: f32 = 20.0;
    const W: f32 = 180.0;
    const H: f32 = 25.0;
    let mut y = 120.0;

    let bars = [
        (PowerUpKind::Invincibility, game.effects.invincibility, "Diplomatic Immunity"),
        (PowerUpKind::ScoreBoost, game.effects.score_boost, "Media Blitz (2x Score)"),
    ];
    for (kind, effect, label) in bars {
        if !effect.active {
            continue;
        }
        let spec = kind.spec();
        let color = Color::from(spec.color);
        let left = effect.remaining(game.frame, spec.duration.unwrap_or(1));
        canvas.fill_round_rect(Rect::from_corner(X, y, W, H), 5.0, color.with_alpha(100.0));
        canvas.fill_round_rect(Rect::from_corner(X, y, W * left, H), 5.0, color);
        canvas.text(label, Vec2::new(X + W / 2.0, y + H / 2.0), TextStyle::new(14.0, Color::WHITE));
        y += H + 5.0;
    }
}

fn draw_challenge(game: &Game, canvas: &mut dyn Canvas, target: u64) {
    let color = if game.challenge_beaten { SUCCESS } else { Color::WHITE };
    let style = TextStyle::new(14.0, color).align(Align::Right).top();
    let x = game.width - 20.0;
    canvas.text(&format!("Challenge: {target}"), Vec2::new(x, 85.0), style);
    if game.challenge_beaten {
        canvas.text("Completed!", Vec2::new(x, 105.0), style);
    }
}

fn draw_touch_button(canvas: &mut dyn Canvas, button: TouchButton, fill: Color, symbol: &str) {
    let radii = Vec2::splat(button.radius);
    canvas.fill_ellipse(button.center, radii, fill);
    canvas.stroke_ellipse(button.center, radii, Color::WHITE, 2.0);
    canvas.text(symbol, button.center, TextStyle::new(button.radius, Color::WHITE));
}

fn draw_touch_controls(game: &Game, canvas: &mut dyn Canvas) {
    let t = &game.touch;
    let move_color = |held: bool| Color::rgba(50, 150, 255, if held { 180 } else { 120 });
    draw_touch_button(canvas, t.left, move_color(game.player.moving_left), "<");
    draw_touch_button(canvas, t.right, move_color(game.player.moving_right), ">");
    draw_touch_button(canvas, t.fire, Color::rgba(255, 100, 100, 150), "*");

    let (fill, symbol) = if game.auto_fire.enabled {
        (Color::rgba(50, 200, 50, 180), "ON")
    } else {
        (Color::rgba(200, 50, 50, 180), "OFF")
    };
    draw_touch_button(canvas, t.auto_toggle, fill, symbol);
    let label = Vec2::new(t.auto_toggle.center.x, t.auto_toggle.center.y - t.auto_toggle.radius - 10.0);
    canvas.text("Auto", label, TextStyle::new(14.0, Color::WHITE));
}

/// Pseudo-random shake offset in -10..10, stable for a given frame
pub fn shake_offset(frame: u64) -> Vec2 {
    let mut h = frame.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    h ^= h >> 29;
    h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h ^= h >> 32;
    let x = (h & 0xFFFF) as f32 / 65535.0;
    let y = ((h >> 16) & 0xFFFF) as f32 / 65535.0;
    Vec2::new(x * 20.0 - 10.0, y * 20.0 - 10.0)
}

fn draw_game_over(game: &Game, canvas: &mut dyn Canvas, opts: SceneOptions) {
    let shaking = game.game_over_frames < crate::secs_to_frames(game.tuning.shake_duration);

    canvas.push();
    if shaking && opts.screen_shake {
        canvas.translate(shake_offset(game.frame));
    }
    draw_background(game, canvas);
    canvas.pop();

    for p in &game.particles {
        draw_particle(p, canvas);
    }

    overlay(game, canvas, 150);
    let (cx, h) = (game.width / 2.0, game.height);
    canvas.text(
        "You're a loser, get out of my office!",
        Vec2::new(cx, h / 3.0),
        TextStyle::new(40.0, Color::rgb(255, 50, 50)).bold(),
    );
    canvas.text(
        &format!("Final Score: {}", game.score),
        Vec2::new(cx, h / 2.0),
        TextStyle::new(30.0, Color::WHITE),
    );
    canvas.text("Press ENTER to play again", Vec2::new(cx, h * 0.75), TextStyle::new(24.0, Color::WHITE));
    if game.qualified {
        canvas.text(
            "Press L to submit your score",
            Vec2::new(cx, h * 0.75 + 40.0),
            TextStyle::new(20.0, GOLD),
        );
    } else {
        canvas.text(
            "Press V to view leaderboard",
            Vec2::new(cx, h * 0.75 + 40.0),
            TextStyle::new(20.0, Color::WHITE),
        );
    }

    draw_social_buttons(canvas, cx, layout::game_over_social_y(h));
}

fn draw_social_buttons(canvas: &mut dyn Canvas, cx: f32, cy: f32) {
    for (social, rect) in layout::social_buttons(cx, cy) {
        canvas.fill_round_rect(rect, 10.0, Color::from(social.color()));
        canvas.stroke_round_rect(rect, 10.0, Color::WHITE, 2.0);
        canvas.text(social.label(), rect.center(), TextStyle::new(16.0, Color::WHITE));
    }
}

/// Rows that fit between the header and the footer
fn visible_rows(height: f32, available: usize) -> usize {
    const ROW_H: f32 = 40.0;
    const BOTTOM_MARGIN: f32 = 100.0;
    let fit = ((height - 180.0 - BOTTOM_MARGIN) / ROW_H).floor().max(0.0) as usize;
    available.min(fit)
}

fn rank_color(rank: usize) -> Color {
    match rank {
        0 => GOLD,
        1 => SILVER,
        2 => BRONZE,
        _ => Color::WHITE,
    }
}

fn draw_leaderboard(game: &Game, canvas: &mut dyn Canvas) {
    overlay(game, canvas, 200);
    let (w, h) = (game.width, game.height);
    canvas.text("Leaderboard", Vec2::new(w / 2.0, 70.0), TextStyle::new(40.0, Color::WHITE).bold());

    let header = TextStyle::new(24.0, Color::gray(200));
    canvas.text("Rank", Vec2::new(100.0, 140.0), header);
    canvas.text("Player", Vec2::new(230.0, 140.0), header);
    canvas.text("Score", Vec2::new(525.0, 140.0), header);
    canvas.line(Vec2::new(80.0, 160.0), Vec2::new(w - 80.0, 160.0), Color::gray(150), 1.0);

    let view = &game.leaderboard;
    if let Some(err) = &view.error {
        canvas.text(err, Vec2::new(w / 2.0, 220.0), TextStyle::new(20.0, ERROR));
    } else if view.loading && view.entries.is_empty() {
        canvas.text("Loading...", Vec2::new(w / 2.0, 220.0), TextStyle::new(20.0, Color::WHITE));
    } else if view.entries.is_empty() {
        canvas.text("No scores yet", Vec2::new(w / 2.0, 220.0), TextStyle::new(20.0, Color::WHITE));
    }

    for (i, entry) in view.entries.iter().take(visible_rows(h, view.entries.len())).enumerate() {
        let y = 180.0 + i as f32 * 40.0;
        if game.submitted.as_ref() == Some(entry) {
            canvas.fill_round_rect(
                Rect::from_corner(80.0, y - 15.0, w - 160.0, 30.0),
                5.0,
                Color::rgba(50, 150, 50, 100),
            );
        }
        canvas.text(&(i + 1).to_string(), Vec2::new(100.0, y), TextStyle::new(20.0, rank_color(i)));
        canvas.text(
            &entry.name,
            Vec2::new(150.0, y),
            TextStyle::new(20.0, Color::WHITE).align(Align::Left),
        );
        canvas.text(
            &entry.score.to_string(),
            Vec2::new(550.0, y),
            TextStyle::new(20.0, Color::WHITE).align(Align::Right),
        );
    }

    draw_social_buttons(canvas, w / 2.0, layout::leaderboard_social_y(h));
    canvas.text("Press ESC to play again", Vec2::new(w / 2.0, h - 30.0), TextStyle::new(20.0, Color::WHITE));
}

fn draw_field(canvas: &mut dyn Canvas, rect: Rect, active: bool, value: &str) {
    let fill = if active { Color::rgb(70, 70, 100) } else { Color::gray(50) };
    canvas.fill_round_rect(rect, 5.0, fill);
    let y = (rect.top + rect.bottom) / 2.0;
    canvas.text(value, Vec2::new(rect.left + 10.0, y), TextStyle::new(24.0, Color::WHITE).align(Align::Left));
}

fn draw_submit(game: &Game, canvas: &mut dyn Canvas) {
    use crate::sim::FormField;

    overlay(game, canvas, 200);
    let (w, h) = (game.width, game.height);
    let cx = w / 2.0;
    let form = &game.form;

    canvas.text(
        "You made it to the leaderboard!",
        Vec2::new(cx, 80.0),
        TextStyle::new(40.0, Color::rgb(255, 255, 100)).bold(),
    );
    canvas.text(&format!("Your Score: {}", game.score), Vec2::new(cx, 140.0), TextStyle::new(30.0, Color::WHITE));

    let label = TextStyle::new(24.0, Color::WHITE).align(Align::Left);
    canvas.text("Name:", Vec2::new(200.0, 220.0), label);
    canvas.text("Email:", Vec2::new(200.0, 280.0), label);
    draw_field(canvas, layout::NAME_FIELD, form.active == FormField::Name, &form.name);
    draw_field(canvas, layout::EMAIL_FIELD, form.active == FormField::Email, &form.email);

    // Caret blinks off the frame counter
    if game.frame % 60 < 30 {
        let (rect, value) = match form.active {
            FormField::Name => (layout::NAME_FIELD, &form.name),
            FormField::Email => (layout::EMAIL_FIELD, &form.email),
        };
        let x = rect.left + 10.0 + canvas.measure_text(value, 24.0, false);
        let y = (rect.top + rect.bottom) / 2.0;
        canvas.text("|", Vec2::new(x, y), label);
    }

    canvas.text(
        "You'll register to the newsletter",
        Vec2::new(cx, 310.0),
        TextStyle::new(14.0, Color::gray(180)),
    );

    let button = layout::submit_button(w);
    canvas.fill_round_rect(button, 10.0, Color::rgb(100, 200, 100));
    canvas.text("Submit", Vec2::new(cx, 365.0), TextStyle::new(24.0, Color::BLACK));
    canvas.text(
        "Press TAB to switch fields, ENTER to submit",
        Vec2::new(cx, 420.0),
        TextStyle::new(18.0, Color::gray(200)),
    );

    if let Some(err) = &form.error {
        canvas.text(err, Vec2::new(cx, 460.0), TextStyle::new(18.0, ERROR));
    }

    canvas.text("Press ESC to play again", Vec2::new(cx, h - 80.0), TextStyle::new(20.0, Color::WHITE));

    if form.submitting {
        overlay(game, canvas, 200);
        canvas.text("Submitting score...", Vec2::new(cx, h / 2.0), TextStyle::new(24.0, Color::WHITE));
    }
}

fn draw_message(game: &Game, canvas: &mut dyn Canvas, text: &str) {
    let (cx, cy) = (game.width / 2.0, game.height / 2.0);
    canvas.fill_round_rect(
        Rect::from_corner(cx - 200.0, cy - 50.0, 400.0, 100.0),
        10.0,
        Color::rgba(0, 0, 0, 200),
    );
    canvas.text(text, Vec2::new(cx, cy), TextStyle::new(20.0, Color::WHITE));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::LeaderboardEntry;
    use crate::renderer::{DrawCall, RecordingCanvas};
    use crate::tuning::Tuning;

    fn render(game: &Game) -> RecordingCanvas {
        let mut canvas = RecordingCanvas::new();
        draw(game, &mut canvas, SceneOptions::default());
        canvas
    }

    #[test]
    fn test_every_screen_balances_transforms() {
        let mut game = Game::new(1, Tuning::default());
        for screen in [
            Screen::Start,
            Screen::Play,
            Screen::GameOver,
            Screen::Leaderboard,
            Screen::SubmitScore,
        ] {
            game.screen = screen;
            let canvas = render(&game);
            assert_eq!(canvas.depth(), 0, "{screen:?} left the transform stack dirty");
        }
    }

    #[test]
    fn test_hud_shows_score() {
        let mut game = Game::new(1, Tuning::default());
        game.screen = Screen::Play;
        game.score = 1234;
        let canvas = render(&game);
        assert!(canvas.has_text("Score: 1234"));
        assert!(canvas.has_text("MELTDOWN"));
    }

    #[test]
    fn test_caret_blinks_with_frame() {
        let mut game = Game::new(1, Tuning::default());
        game.screen = Screen::SubmitScore;
        game.frame = 10;
        assert!(render(&game).texts().contains(&"|"));
        game.frame = 40;
        assert!(!render(&game).texts().contains(&"|"));
    }

    #[test]
    fn test_leaderboard_highlights_submitted_row() {
        let mut game = Game::new(1, Tuning::default());
        game.screen = Screen::Leaderboard;
        let mine = LeaderboardEntry {
            name: "Ada".into(),
            score: 700,
        };
        game.leaderboard.entries = vec![
            LeaderboardEntry {
                name: "Bo".into(),
                score: 900,
            },
            mine.clone(),
        ];
        game.submitted = Some(mine);
        let canvas = render(&game);
        let highlight = Color::rgba(50, 150, 50, 100);
        assert!(canvas
            .calls
            .iter()
            .any(|c| matches!(c, DrawCall::RoundRect(r, col) if *col == highlight && r.top == 205.0)));
        assert!(canvas.calls.iter().any(|c| matches!(c, DrawCall::Text(t, _, col) if t == "1" && *col == GOLD)));
    }

    #[test]
    fn test_leaderboard_rows_fit_screen() {
        assert_eq!(visible_rows(600.0, 10), 8);
        assert_eq!(visible_rows(600.0, 3), 3);
    }

    #[test]
    fn test_shake_is_bounded_and_stable() {
        for frame in 0..500 {
            let o = shake_offset(frame);
            assert!(o.x.abs() <= 10.0 && o.y.abs() <= 10.0);
            assert_eq!(o, shake_offset(frame));
        }
    }

    #[test]
    fn test_message_overlay() {
        let mut game = Game::new(1, Tuning::default());
        game.show_message("Hello", 10);
        assert!(render(&game).has_text("Hello"));
        game.frame = 10;
        assert!(!render(&game).has_text("Hello"));
    }

    #[test]
    fn test_error_screen() {
        let mut canvas = RecordingCanvas::new();
        draw_error(&mut canvas, 800.0, 600.0);
        assert!(canvas.has_text("Press R to restart"));
    }
}
