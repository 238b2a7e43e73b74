//! Fixed timestep simulation tick
//!
//! Core game loop that advances the simulation one 60 Hz frame at a time.
//! Leaderboard replies are applied first so every screen sees them on the
//! same frame.

use glam::Vec2;
use rand::Rng;

use super::Services;
use super::collision::{circle_circle_overlap, circle_rect_overlap};
use super::powerup::{POWER_UPS, PowerUpKind};
use super::screen::{self, MESSAGE_FRAMES};
use super::state::{Bubble, Game, Palette, PowerUp, Screen, ScorePopup, Side};
use crate::audio::Cue;
use crate::consts::*;
use crate::secs_to_frames;

/// Frames the challenge-beaten message stays up
const CHALLENGE_MESSAGE_FRAMES: u64 = 180;
/// Heading wander applied to flag particles each frame (radians)
const FLAG_WANDER: f32 = 0.1;

/// Advance the game by one frame
pub fn update(game: &mut Game, svc: &mut Services) {
    for reply in svc.leaderboard.drain() {
        screen::apply_reply(game, svc, reply);
    }

    game.frame += 1;

    match game.screen {
        Screen::Play => play_frame(game, svc),
        Screen::GameOver => game_over_frame(game),
        Screen::Leaderboard => leaderboard_frame(game, svc),
        Screen::Start | Screen::SubmitScore => {}
    }
}

fn play_frame(game: &mut Game, svc: &mut Services) {
    let tuning = game.tuning.clone();

    // 1. Clock
    game.elapsed += FRAME_DT;

    // 2. Auto-fire
    if game.auto_fire.enabled {
        let due = match game.auto_fire.last_shot {
            Some(last) => game.frame.saturating_sub(last) >= tuning.auto_fire_interval,
            None => true,
        };
        if due {
            screen::fire(game, svc);
            game.auto_fire.last_shot = Some(game.frame);
        }
    }

    // 3. Player
    game.player.update(game.width);

    // 4. Refill decays with time and difficulty
    game.refill = tuning.refill_amount(game.elapsed, game.difficulty);

    // 5. Multiplier
    game.effects.score_boost.expire(game.frame);
    game.multiplier = tuning.base_multiplier(game.elapsed);
    if game.effects.score_boost.active {
        game.multiplier *= tuning.boost_factor;
    }

    // 6. Music intensity
    update_music(game, svc);

    // 7. Enemy spawning
    game.spawn_counter += 1;
    if game.spawn_counter as f32 >= tuning.spawn_threshold(game.difficulty) {
        spawn_enemy(game);
        game.spawn_counter = 0;
    }

    // 8. Power-up spawning
    try_spawn_power_up(game);

    // 9-11. Entities and collisions
    update_power_ups(game, svc);
    update_enemies(game, svc);
    update_projectiles(game, svc);

    // 12. Effects
    update_particles(game);

    // 13. Invincibility expiry
    game.effects.invincibility.expire(game.frame);

    // 14. Drain
    game.adjust_meltdown(-tuning.meltdown_drain * game.difficulty);

    // 15. Difficulty ramp
    game.difficulty =
        (game.difficulty + tuning.difficulty_per_sec / TICKS_PER_SECOND as f32).min(tuning.max_difficulty);

    // 16. Lose condition
    if game.meltdown <= 0.0 {
        screen::enter_game_over(game, svc);
    }

    // 17. Challenge
    if let Some(target) = game.challenge {
        if game.score > target && !game.challenge_beaten {
            game.challenge_beaten = true;
            log::info!("Challenge score {} beaten with {}", target, game.score);
            game.show_message("Challenge completed! You beat the score!", CHALLENGE_MESSAGE_FRAMES);
        }
    }
}

fn update_music(game: &mut Game, svc: &mut Services) {
    game.music.counter += 1;
    if game.music.counter < game.tuning.music_update_interval {
        return;
    }
    game.music.counter = 0;
    if !game.music.playing {
        return;
    }

    let rate = screen::music_rate(game);
    if (rate - game.music.last_rate).abs() > 0.05 {
        game.music.last_rate = rate;
        svc.audio.set_music_intensity(rate, screen::music_volume(rate));
    }
}

fn spawn_enemy(game: &mut Game) {
    let t = &game.tuning;
    let margin = t.spawn_margin;
    let x = game.rng.random_range(margin..game.width - margin);
    let size = game.rng.random_range(t.enemy_size.0..t.enemy_size.1);
    let speed = game.rng.random_range(t.enemy_speed.0..t.enemy_speed.1) * game.difficulty;
    let bubble = Bubble::new(Vec2::new(x, 0.0), size, speed, Side::Enemy, &mut game.rng);
    game.enemies.push(bubble);
}

/// Roll each kind in table order; at most one spawns per frame
fn try_spawn_power_up(game: &mut Game) {
    let Some(spec) = POWER_UPS
        .iter()
        .find(|spec| game.rng.random::<f64>() < spec.spawn_chance)
    else {
        return;
    };
    let margin = game.tuning.spawn_margin;
    let (lo, hi) = game.tuning.power_up_speed;
    let x = game.rng.random_range(margin..game.width - margin);
    let speed = game.rng.random_range(lo..hi);
    let power_up = PowerUp::new(Vec2::new(x, 0.0), speed, spec.kind, &mut game.rng);
    log::debug!("Spawned power-up {}", spec.name);
    game.power_ups.push(power_up);
}

fn update_power_ups(game: &mut Game, svc: &mut Services) {
    let player = game.player.bounds();
    let mut i = 0;
    while i < game.power_ups.len() {
        game.power_ups[i].update(game.frame);
        let p = &game.power_ups[i];

        if circle_rect_overlap(p.pos, p.radius, &player) {
            let p = game.power_ups.remove(i);
            collect_power_up(game, svc, p.kind);
            game.emit_particles(p.pos, Palette::PowerUp, 15, Some(p.kind.spec().color));
            continue;
        }
        if p.pos.y > game.height {
            game.power_ups.remove(i);
            continue;
        }
        i += 1;
    }
}

/// Run a power-up's effect
pub fn collect_power_up(game: &mut Game, svc: &mut Services, kind: PowerUpKind) {
    let spec = kind.spec();
    match kind {
        PowerUpKind::ClearBoard => clear_board(game),
        PowerUpKind::Invincibility => {
            let duration = spec.duration.unwrap_or_default();
            game.effects.invincibility.activate(game.frame, duration);
        }
        PowerUpKind::ScoreBoost => {
            let duration = spec.duration.unwrap_or_default();
            game.effects.score_boost.activate(game.frame, duration);
        }
    }
    log::info!("Power-up collected: {}", spec.name);
    svc.audio.play(Cue::PowerUp);
    game.show_message(format!("Power-up: {}!", spec.effect), MESSAGE_FRAMES);
}

/// Sweep every enemy for points, then refill the bar
fn clear_board(game: &mut Game) {
    let per_enemy = (game.tuning.clear_score as f32 * game.multiplier).floor() as u64;
    let enemies = std::mem::take(&mut game.enemies);
    for enemy in &enemies {
        game.emit_particles(enemy.pos, Palette::Enemy, 10, None);
        game.score += per_enemy;
        game.popups.push(ScorePopup::new(enemy.pos, per_enemy));
    }
    game.adjust_meltdown(game.tuning.clear_refill);
}

fn update_enemies(game: &mut Game, svc: &mut Services) {
    let player = game.player.bounds();
    let mut i = 0;
    while i < game.enemies.len() {
        game.enemies[i].update(game.frame);
        let e = &game.enemies[i];

        if circle_rect_overlap(e.pos, e.radius, &player) {
            let e = game.enemies.remove(i);
            if !game.is_invincible() {
                game.adjust_meltdown(-game.tuning.meltdown_damage);
                svc.audio.play(Cue::Damage);
            }
            game.emit_particles(e.pos, Palette::Enemy, 10, None);
            continue;
        }
        if e.pos.y > game.height {
            game.enemies.remove(i);
            continue;
        }
        i += 1;
    }
}

fn update_projectiles(game: &mut Game, svc: &mut Services) {
    let mut i = 0;
    while i < game.projectiles.len() {
        game.projectiles[i].update(game.frame);
        let shot = &game.projectiles[i];

        let hit = game
            .enemies
            .iter()
            .position(|e| circle_circle_overlap(shot.pos, shot.radius, e.pos, e.radius));
        if let Some(j) = hit {
            let enemy = game.enemies.remove(j);
            let shot = game.projectiles.remove(i);
            resolve_hit(game, svc, &enemy, &shot);
            continue;
        }
        if shot.pos.y < 0.0 {
            game.projectiles.remove(i);
            continue;
        }
        i += 1;
    }
}

/// Score a projectile hit on an enemy
fn resolve_hit(game: &mut Game, svc: &mut Services, enemy: &Bubble, shot: &Bubble) {
    game.adjust_meltdown(game.refill);
    let points = (game.tuning.hit_score as f32 * game.multiplier).floor() as u64;
    game.score += points;
    game.popups.push(ScorePopup::new(enemy.pos, points));
    game.emit_particles(enemy.pos, Palette::Stripes, 15, None);
    game.emit_particles(shot.pos, Palette::Stars, 10, None);
    svc.audio.play(Cue::Pop);
    if game.rng.random_bool(game.tuning.voice_chance) {
        svc.audio.play(Cue::Voice);
    }
}

fn update_particles(game: &mut Game) {
    for p in &mut game.particles {
        let wander = if p.palette.is_flag() {
            game.rng.random_range(-FLAG_WANDER..FLAG_WANDER)
        } else {
            0.0
        };
        p.update(wander);
    }
    game.particles.retain(|p| !p.is_dead());

    for popup in &mut game.popups {
        popup.update();
    }
    game.popups.retain(|p| !p.is_dead());
}

fn game_over_frame(game: &mut Game) {
    game.game_over_frames += 1;
    let shaking = game.game_over_frames < secs_to_frames(game.tuning.shake_duration);

    if shaking {
        if game.frame % 5 == 0 {
            let x = game.rng.random_range(0.0..game.width);
            let y = game.rng.random_range(0.0..game.height);
            game.emit_particles(Vec2::new(x, y), Palette::Explosion, 5, None);
        }
        if game.game_over_frames >= secs_to_frames(game.tuning.game_over_delay) && game.qualified {
            screen::open_submit_form(game);
            return;
        }
    }

    update_particles(game);
}

fn leaderboard_frame(game: &mut Game, svc: &mut Services) {
    if game.leaderboard.loading {
        return;
    }
    let due = match game.leaderboard.fetched_at {
        Some(at) => game.frame.saturating_sub(at) >= game.board.refresh_frames(),
        None => false,
    };
    if due {
        log::debug!("Refreshing leaderboard");
        screen::request_top_scores(game, svc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SilentAudio;
    use crate::leaderboard::{MemoryScoreStore, QueuedLeaderboard, StoredScore};
    use crate::sim::screen::{Input, handle_input, start_run};
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    struct Rig {
        game: Game,
        lb: QueuedLeaderboard<MemoryScoreStore>,
        audio: SilentAudio,
    }

    impl Rig {
        fn new(seed: u64) -> Self {
            Self::with_tuning(seed, Tuning::default())
        }

        fn with_tuning(seed: u64, tuning: Tuning) -> Self {
            Self {
                game: Game::new(seed, tuning),
                lb: QueuedLeaderboard::new(MemoryScoreStore::new()),
                audio: SilentAudio,
            }
        }

        fn step(&mut self) {
            let mut svc = Services::new(&mut self.lb, &mut self.audio);
            update(&mut self.game, &mut svc);
        }

        fn input(&mut self, input: Input) {
            let mut svc = Services::new(&mut self.lb, &mut self.audio);
            handle_input(&mut self.game, &mut svc, input);
        }

        fn start(&mut self) {
            let mut svc = Services::new(&mut self.lb, &mut self.audio);
            start_run(&mut self.game, &mut svc);
        }
    }

    /// No spawning, no drain; only what the test places
    fn quiet_tuning() -> Tuning {
        Tuning {
            spawn_interval: 1.0e9,
            min_spawn_interval: 1.0e9,
            meltdown_drain: 0.0,
            difficulty_per_sec: 0.0,
            ..Tuning::default()
        }
    }

    fn enemy_at(game: &mut Game, pos: Vec2, size: f32) -> Bubble {
        let mut b = Bubble::new(pos, size, 0.0, Side::Enemy, game.rng());
        b.size = size;
        b.radius = size / 2.0;
        b
    }

    #[test]
    fn test_start_to_play() {
        let mut rig = Rig::new(1);
        rig.step();
        assert_eq!(rig.game.screen, Screen::Start);
        rig.input(Input::Confirm);
        assert_eq!(rig.game.screen, Screen::Play);
        rig.step();
        assert!((rig.game.elapsed - FRAME_DT).abs() < 1e-6);
    }

    #[test]
    fn test_enemy_spawns_on_threshold() {
        let tuning = Tuning {
            difficulty_per_sec: 0.0,
            ..Tuning::default()
        };
        let mut rig = Rig::with_tuning(7, tuning);
        rig.start();
        for _ in 0..59 {
            rig.step();
        }
        let before = rig.game.enemies.len();
        rig.step();
        assert_eq!(rig.game.enemies.len(), before + 1);
        let e = rig.game.enemies.last().unwrap();
        assert!(e.pos.x >= 50.0 && e.pos.x < 750.0);
    }

    #[test]
    fn test_projectile_hit_scores_once() {
        let mut rig = Rig::with_tuning(3, quiet_tuning());
        rig.start();
        rig.game.meltdown = 50.0;
        let enemy = enemy_at(&mut rig.game, Vec2::new(200.0, 100.0), 60.0);
        rig.game.enemies.push(enemy);
        let other = enemy_at(&mut rig.game, Vec2::new(600.0, 100.0), 60.0);
        rig.game.enemies.push(other);
        let shot = Bubble::new(Vec2::new(200.0, 150.0), 40.0, 8.0, Side::Projectile, rig.game.rng());
        rig.game.projectiles.push(shot);

        rig.step();

        let expected = (100.0 * rig.game.multiplier).floor() as u64;
        assert_eq!(rig.game.score, expected);
        assert_eq!(rig.game.enemies.len(), 1);
        assert!(rig.game.projectiles.is_empty());
        assert_eq!(rig.game.popups.len(), 1);
        assert!(rig.game.meltdown > 50.0);
        assert_eq!(rig.game.particles.len(), 25);
    }

    #[test]
    fn test_seven_hits_end_the_run() {
        let mut rig = Rig::with_tuning(5, quiet_tuning());
        rig.start();
        let target = rig.game.player.pos;
        for hit in 0..7 {
            assert_eq!(rig.game.screen, Screen::Play, "ended early at hit {hit}");
            let enemy = enemy_at(&mut rig.game, target, 60.0);
            rig.game.enemies.push(enemy);
            rig.step();
        }
        assert_eq!(rig.game.meltdown, 0.0);
        assert_eq!(rig.game.screen, Screen::GameOver);
    }

    #[test]
    fn test_invincibility_blocks_damage_then_expires() {
        let mut rig = Rig::with_tuning(5, quiet_tuning());
        rig.start();
        {
            let mut svc = Services::new(&mut rig.lb, &mut rig.audio);
            collect_power_up(&mut rig.game, &mut svc, PowerUpKind::Invincibility);
        }
        let target = rig.game.player.pos;
        let enemy = enemy_at(&mut rig.game, target, 60.0);
        rig.game.enemies.push(enemy);
        rig.step();
        assert_eq!(rig.game.meltdown, 100.0);
        assert!(rig.game.enemies.is_empty());

        for _ in 0..300 {
            rig.step();
        }
        assert!(!rig.game.is_invincible());
    }

    #[test]
    fn test_score_boost_doubles_multiplier() {
        let mut rig = Rig::with_tuning(5, quiet_tuning());
        rig.start();
        {
            let mut svc = Services::new(&mut rig.lb, &mut rig.audio);
            collect_power_up(&mut rig.game, &mut svc, PowerUpKind::ScoreBoost);
        }
        rig.step();
        let base = rig.game.tuning.base_multiplier(rig.game.elapsed);
        assert!((rig.game.multiplier - base * 2.0).abs() < 1e-6);
        for _ in 0..600 {
            rig.step();
        }
        let base = rig.game.tuning.base_multiplier(rig.game.elapsed);
        assert!((rig.game.multiplier - base).abs() < 1e-6);
    }

    #[test]
    fn test_clear_board_awards_and_refills() {
        let mut rig = Rig::with_tuning(5, quiet_tuning());
        rig.start();
        rig.game.meltdown = 40.0;
        for x in [100.0, 300.0, 500.0] {
            let enemy = enemy_at(&mut rig.game, Vec2::new(x, 50.0), 60.0);
            rig.game.enemies.push(enemy);
        }
        {
            let mut svc = Services::new(&mut rig.lb, &mut rig.audio);
            collect_power_up(&mut rig.game, &mut svc, PowerUpKind::ClearBoard);
        }
        assert!(rig.game.enemies.is_empty());
        assert_eq!(rig.game.score, 150);
        assert_eq!(rig.game.popups.len(), 3);
        assert_eq!(rig.game.meltdown, 60.0);
        assert_eq!(rig.game.visible_message(), Some("Power-up: Clears all red bubbles!"));
    }

    #[test]
    fn test_auto_fire_interval() {
        let mut rig = Rig::with_tuning(5, quiet_tuning());
        rig.start();
        rig.game.auto_fire.enabled = true;
        for _ in 0..40 {
            rig.step();
        }
        // Frames 1 and 31
        assert_eq!(rig.game.projectiles.len(), 2);
    }

    #[test]
    fn test_challenge_message_once() {
        let mut rig = Rig::with_tuning(5, quiet_tuning());
        rig.game.challenge = Some(100);
        rig.start();
        rig.game.score = 101;
        rig.step();
        assert!(rig.game.challenge_beaten);
        assert_eq!(
            rig.game.visible_message(),
            Some("Challenge completed! You beat the score!")
        );
        rig.game.message = None;
        rig.step();
        assert!(rig.game.message.is_none());
    }

    #[test]
    fn test_qualified_run_opens_submit_after_delay() {
        let mut rig = Rig::new(9);
        rig.start();
        rig.game.score = 1000;
        rig.game.meltdown = 0.1;
        rig.step();
        assert_eq!(rig.game.screen, Screen::GameOver);

        // Qualification lands on the next frame; form opens at 1.5 s
        for _ in 0..89 {
            rig.step();
        }
        assert!(rig.game.qualified);
        assert_eq!(rig.game.screen, Screen::GameOver);
        rig.step();
        assert_eq!(rig.game.screen, Screen::SubmitScore);
        assert!(rig.game.form.name.is_empty());
    }

    #[test]
    fn test_unqualified_run_stays_on_game_over() {
        let mut rig = Rig::new(9);
        rig.lb.store_mut().entries = (0..10)
            .map(|i| StoredScore {
                player_name: format!("p{i}"),
                email: "p@example.com".into(),
                score: 10_000,
            })
            .collect();
        rig.start();
        rig.game.meltdown = 0.1;
        for _ in 0..400 {
            rig.step();
        }
        assert_eq!(rig.game.screen, Screen::GameOver);
        assert!(!rig.game.qualified);
        // Shake has ended and the explosions have faded
        assert!(rig.game.particles.is_empty());
    }

    #[test]
    fn test_leaderboard_refreshes_on_interval() {
        let mut rig = Rig::new(9);
        rig.game.board.refresh_interval_ms = 1000;
        rig.game.screen = Screen::GameOver;
        rig.input(Input::ViewLeaderboard);
        let first = rig.lb.dispatched();
        rig.step();
        assert!(!rig.game.leaderboard.loading);
        for _ in 0..60 {
            rig.step();
        }
        assert_eq!(rig.lb.dispatched(), first + 1);
    }

    #[test]
    fn test_determinism() {
        let mut a = Rig::new(99999);
        let mut b = Rig::new(99999);
        a.start();
        b.start();
        for frame in 0..600 {
            if frame % 20 == 0 {
                a.input(Input::Fire);
                b.input(Input::Fire);
            }
            a.step();
            b.step();
        }
        assert_eq!(a.game.score, b.game.score);
        assert_eq!(a.game.enemies.len(), b.game.enemies.len());
        assert_eq!(a.game.meltdown, b.game.meltdown);
    }

    proptest! {
        #[test]
        fn prop_meltdown_and_difficulty_bounded(seed in any::<u64>(), moves in prop::collection::vec(0u8..4, 1..300)) {
            let mut rig = Rig::new(seed);
            rig.start();
            let mut last_difficulty = rig.game.difficulty;
            for m in moves {
                match m {
                    0 => rig.input(Input::MoveLeft(true)),
                    1 => rig.input(Input::MoveRight(true)),
                    2 => rig.input(Input::Fire),
                    _ => {
                        rig.input(Input::MoveLeft(false));
                        rig.input(Input::MoveRight(false));
                    }
                }
                rig.step();
                prop_assert!(rig.game.meltdown >= 0.0 && rig.game.meltdown <= rig.game.tuning.meltdown_max);
                if rig.game.screen != Screen::Play {
                    break;
                }
                prop_assert!(rig.game.difficulty >= last_difficulty);
                prop_assert!(rig.game.difficulty <= rig.game.tuning.max_difficulty);
                last_difficulty = rig.game.difficulty;
                let half = rig.game.player.size.x / 2.0;
                prop_assert!(rig.game.player.pos.x >= half && rig.game.player.pos.x <= rig.game.width - half);
            }
        }
    }
}
