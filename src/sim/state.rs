//! Game state and entity types
//!
//! `Game` is the aggregate root: every entity lives in exactly one of its
//! lists and is only mutated from the frame update.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::phrases::{fit_size, pick_phrase};
use super::powerup::PowerUpKind;
use crate::consts::*;
use crate::leaderboard::{LeaderboardEntry, Ticket};
use crate::settings::LeaderboardSettings;
use crate::tuning::Tuning;

/// RGB colour triple
pub type Rgb = [u8; 3];

/// Active screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    /// Title card, waiting for confirm
    Start,
    /// Active gameplay
    Play,
    /// Run ended; shaking, then maybe the submit form
    GameOver,
    /// Top scores
    Leaderboard,
    /// Name/email form for a qualifying run
    SubmitScore,
}

/// Which side fired a bubble
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// Falls from the top and damages the player
    Enemy,
    /// Rises from the player and destroys enemies
    Projectile,
}

/// The player's avatar, sliding along the bottom of the arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
    pub moving_left: bool,
    pub moving_right: bool,
}

impl Player {
    pub fn new(pos: Vec2, tuning: &Tuning) -> Self {
        Self {
            pos,
            size: Vec2::new(tuning.player_width, tuning.player_height),
            speed: tuning.player_speed,
            moving_left: false,
            moving_right: false,
        }
    }

    /// Apply movement intent and keep the whole body on screen
    pub fn update(&mut self, arena_width: f32) {
        if self.moving_left {
            self.pos.x -= self.speed;
        }
        if self.moving_right {
            self.pos.x += self.speed;
        }
        let half = self.size.x / 2.0;
        self.pos.x = self.pos.x.clamp(half, arena_width - half);
    }

    /// Collision box
    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.pos, self.size)
    }
}

/// A speech bubble, either a falling enemy or a rising projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bubble {
    pub pos: Vec2,
    pub size: f32,
    /// Always `size / 2`
    pub radius: f32,
    pub speed: f32,
    pub side: Side,
    pub phrase: &'static str,
    /// Fixed tilt (radians)
    pub rotation: f32,
    /// Pulsing scale, bounces between 0.9 and 1.1
    pub scale: f32,
    pub scale_dir: f32,
    pub scale_speed: f32,
}

impl Bubble {
    /// Create a bubble with a caption that fits it
    pub fn new<R: Rng + ?Sized>(pos: Vec2, size: f32, speed: f32, side: Side, rng: &mut R) -> Self {
        let phrase = pick_phrase(side, size, rng);
        let size = fit_size(size, phrase);
        Self {
            pos,
            size,
            radius: size / 2.0,
            speed,
            side,
            phrase,
            rotation: rng.random_range(-0.05..0.05),
            scale: 1.0,
            scale_dir: if rng.random_bool(0.5) { 1.0 } else { -1.0 },
            scale_speed: rng.random_range(0.001..0.003),
        }
    }

    /// Move one frame; enemies drift sideways as they fall
    pub fn update(&mut self, frame: u64) {
        match self.side {
            Side::Enemy => {
                self.pos.y += self.speed;
                self.pos.x += (frame as f32 * 0.05 + self.pos.y * 0.1).sin() * 0.5;
            }
            Side::Projectile => {
                self.pos.y -= self.speed;
            }
        }

        self.scale += self.scale_dir * self.scale_speed;
        if self.scale > 1.1 || self.scale < 0.9 {
            self.scale_dir = -self.scale_dir;
        }
    }
}

/// A falling collectible
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub pos: Vec2,
    pub size: f32,
    pub radius: f32,
    pub speed: f32,
    pub kind: PowerUpKind,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub scale: f32,
    pub scale_dir: f32,
    pub scale_speed: f32,
    /// Glow pulse, 0.6..1.0
    pub pulse: f32,
}

impl PowerUp {
    pub fn new<R: Rng + ?Sized>(pos: Vec2, speed: f32, kind: PowerUpKind, rng: &mut R) -> Self {
        let size = kind.spec().size;
        Self {
            pos,
            size,
            radius: size / 2.0,
            speed,
            kind,
            rotation: 0.0,
            rotation_speed: rng.random_range(-0.05..0.05),
            scale: 1.0,
            scale_dir: if rng.random_bool(0.5) { 1.0 } else { -1.0 },
            scale_speed: rng.random_range(0.005..0.01),
            pulse: 0.0,
        }
    }

    pub fn update(&mut self, frame: u64) {
        let t = frame as f32;
        self.pos.y += self.speed;
        self.pos.x += (t * 0.05 + self.pos.y * 0.1).sin() * 0.8;

        self.rotation += self.rotation_speed;
        self.scale += self.scale_dir * self.scale_speed;
        if self.scale > 1.2 || self.scale < 0.8 {
            self.scale_dir = -self.scale_dir;
        }
        self.pulse = (t * 0.1).sin() * 0.2 + 0.8;
    }
}

/// Particle colour palettes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Palette {
    /// Uses the tint it was spawned with
    Plain,
    Enemy,
    Projectile,
    /// Orange embers on the game-over screen
    Explosion,
    /// Gold unless tinted by the power-up
    PowerUp,
    /// Red, white and blue stars
    Stars,
    /// Blue and yellow stars
    Stripes,
}

impl Palette {
    /// Flag palettes are faster, bigger, slower to fade and drawn as stars
    pub fn is_flag(self) -> bool {
        matches!(self, Palette::Stars | Palette::Stripes)
    }

    fn pick_color<R: Rng + ?Sized>(self, tint: Option<Rgb>, rng: &mut R) -> Rgb {
        if let Some(tint) = tint {
            return tint;
        }
        match self {
            Palette::Plain => [255, 255, 255],
            Palette::Enemy => [255, 100, 100],
            Palette::Projectile => [100, 100, 255],
            Palette::Explosion => [255, rng.random_range(100..=200), 0],
            Palette::PowerUp => [255, 215, 0],
            Palette::Stars => {
                const COLORS: [Rgb; 3] = [[255, 0, 0], [255, 255, 255], [0, 0, 255]];
                COLORS[rng.random_range(0..COLORS.len())]
            }
            Palette::Stripes => {
                const COLORS: [Rgb; 2] = [[0, 87, 183], [255, 215, 0]];
                COLORS[rng.random_range(0..COLORS.len())]
            }
        }
    }
}

/// A fading spark
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    /// Heading (radians)
    pub angle: f32,
    pub speed: f32,
    pub color: Rgb,
    /// 255 at birth; the particle is culled at or below 0
    pub alpha: f32,
    pub fade: f32,
    pub size: f32,
    pub palette: Palette,
}

impl Particle {
    pub fn new<R: Rng + ?Sized>(pos: Vec2, palette: Palette, tint: Option<Rgb>, rng: &mut R) -> Self {
        let color = palette.pick_color(tint, rng);
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let (size, speed, fade) = if palette.is_flag() {
            (
                rng.random_range(4.0..10.0),
                rng.random_range(2.0..4.0),
                rng.random_range(3.0..7.0),
            )
        } else {
            (
                rng.random_range(3.0..8.0),
                rng.random_range(1.0..3.0),
                rng.random_range(5.0..10.0),
            )
        };
        Self {
            pos,
            angle,
            speed,
            color,
            alpha: 255.0,
            fade,
            size,
            palette,
        }
    }

    /// Advance one frame; `wander` nudges the heading of flag particles
    pub fn update(&mut self, wander: f32) {
        self.pos += Vec2::new(self.angle.cos(), self.angle.sin()) * self.speed;
        self.alpha -= self.fade;
        if self.palette.is_flag() {
            self.angle += wander;
        }
    }

    pub fn is_dead(&self) -> bool {
        self.alpha <= 0.0
    }
}

/// Floating "+N" after a score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorePopup {
    pub pos: Vec2,
    pub value: u64,
    pub alpha: f32,
}

impl ScorePopup {
    pub const FADE: f32 = 5.0;
    pub const RISE: f32 = 1.5;

    pub fn new(pos: Vec2, value: u64) -> Self {
        Self { pos, value, alpha: 255.0 }
    }

    pub fn update(&mut self) {
        self.pos.y -= Self::RISE;
        self.alpha -= Self::FADE;
    }

    pub fn is_dead(&self) -> bool {
        self.alpha <= 0.0
    }
}

/// A timed effect that expires on a frame number
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedEffect {
    pub active: bool,
    pub until_frame: u64,
}

impl TimedEffect {
    /// Start or refresh the effect
    pub fn activate(&mut self, now: u64, duration: u64) {
        self.active = true;
        self.until_frame = now + duration;
    }

    /// Deactivate once `now` is past the expiry frame; returns true on expiry
    pub fn expire(&mut self, now: u64) -> bool {
        if self.active && now > self.until_frame {
            self.active = false;
            return true;
        }
        false
    }

    /// Fraction of `duration` still left (0.0 - 1.0)
    pub fn remaining(&self, now: u64, duration: u64) -> f32 {
        if !self.active || duration == 0 {
            return 0.0;
        }
        (self.until_frame.saturating_sub(now) as f32 / duration as f32).clamp(0.0, 1.0)
    }
}

/// Active power-up effects
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub invincibility: TimedEffect,
    pub score_boost: TimedEffect,
}

/// Submit form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FormField {
    #[default]
    Name,
    Email,
}

/// The submit-score form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitForm {
    pub name: String,
    pub email: String,
    pub active: FormField,
    /// Shown under the submit button
    pub error: Option<String>,
    pub submitting: bool,
}

impl SubmitForm {
    /// Field currently receiving keystrokes
    pub fn active_text_mut(&mut self) -> &mut String {
        match self.active {
            FormField::Name => &mut self.name,
            FormField::Email => &mut self.email,
        }
    }

    pub fn toggle_field(&mut self) {
        self.active = match self.active {
            FormField::Name => FormField::Email,
            FormField::Email => FormField::Name,
        };
    }

    /// Empty both fields and focus the name field
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Cached leaderboard snapshot and its fetch status
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeaderboardView {
    pub entries: Vec<LeaderboardEntry>,
    pub loading: bool,
    pub error: Option<String>,
    /// Frame of the last completed fetch
    pub fetched_at: Option<u64>,
}

/// Transient centred message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub until_frame: u64,
}

/// Auto-fire state (frame-timed)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AutoFire {
    pub enabled: bool,
    pub last_shot: Option<u64>,
}

/// Round on-screen touch button
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchButton {
    pub center: Vec2,
    pub radius: f32,
}

/// What a tracked touch is holding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchRole {
    Left,
    Right,
    Fire,
}

/// On-screen controls for touch devices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TouchControls {
    /// Host reported a touch device
    pub enabled: bool,
    pub left: TouchButton,
    pub right: TouchButton,
    pub fire: TouchButton,
    pub auto_toggle: TouchButton,
    /// Touch id -> role, for releases and slides off a button
    pub held: Vec<(u32, TouchRole)>,
}

impl TouchControls {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            enabled: false,
            left: TouchButton {
                center: Vec2::new(60.0, height - 80.0),
                radius: 40.0,
            },
            right: TouchButton {
                center: Vec2::new(160.0, height - 80.0),
                radius: 40.0,
            },
            fire: TouchButton {
                center: Vec2::new(width - 60.0, height - 80.0),
                radius: 40.0,
            },
            auto_toggle: TouchButton {
                center: Vec2::new(width - 60.0, height - 160.0),
                radius: 30.0,
            },
            held: Vec::new(),
        }
    }

    pub fn role_of(&self, id: u32) -> Option<TouchRole> {
        self.held.iter().find(|(t, _)| *t == id).map(|(_, r)| *r)
    }

    pub fn hold(&mut self, id: u32, role: TouchRole) {
        self.release(id);
        self.held.push((id, role));
    }

    pub fn release(&mut self, id: u32) -> Option<TouchRole> {
        let idx = self.held.iter().position(|(t, _)| *t == id)?;
        Some(self.held.remove(idx).1)
    }
}

/// Background music bookkeeping
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MusicState {
    pub playing: bool,
    pub last_rate: f32,
    /// Frames since the last intensity update
    pub counter: u32,
}

impl Default for MusicState {
    fn default() -> Self {
        Self {
            playing: false,
            last_rate: 1.0,
            counter: 0,
        }
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct Game {
    pub tuning: Tuning,
    pub board: LeaderboardSettings,
    pub width: f32,
    pub height: f32,
    /// Active screen
    pub screen: Screen,
    /// Frames simulated since construction, across all screens
    pub frame: u64,

    pub score: u64,
    pub multiplier: f32,
    /// Meltdown bar, always within `0..=tuning.meltdown_max`
    pub meltdown: f32,
    /// Current refill per destroyed enemy
    pub refill: f32,
    pub difficulty: f32,
    /// Seconds of play this run
    pub elapsed: f32,
    pub spawn_counter: u32,
    /// Frames since the run ended
    pub game_over_frames: u64,

    pub player: Player,
    pub enemies: Vec<Bubble>,
    pub projectiles: Vec<Bubble>,
    pub power_ups: Vec<PowerUp>,
    pub particles: Vec<Particle>,
    pub popups: Vec<ScorePopup>,
    pub effects: ActiveEffects,

    pub leaderboard: LeaderboardView,
    pub form: SubmitForm,
    /// Finished run earns a leaderboard place
    pub qualified: bool,
    /// Name and score of the last accepted submission, for row highlighting
    pub submitted: Option<LeaderboardEntry>,

    /// Score to beat from a shared challenge link
    pub challenge: Option<u64>,
    pub challenge_beaten: bool,
    pub message: Option<Message>,

    pub auto_fire: AutoFire,
    pub touch: TouchControls,
    pub music: MusicState,

    /// Bumped on every reset; replies from older generations are stale
    pub generation: u32,
    next_seq: u32,
    /// Latest ticket per outstanding request kind
    pub pending: PendingRequests,

    pub(crate) rng: Pcg32,
}

/// Most recent ticket issued for each request kind
#[derive(Debug, Clone, Copy, Default)]
pub struct PendingRequests {
    pub qualification: Option<Ticket>,
    pub top_scores: Option<Ticket>,
    pub submit: Option<Ticket>,
}

impl Game {
    /// Create a game on the start screen with a seeded RNG
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let width = ARENA_WIDTH;
        let height = ARENA_HEIGHT;
        let player = Player::new(Vec2::new(width / 2.0, height - PLAYER_BASELINE), &tuning);
        Self {
            meltdown: tuning.meltdown_max,
            refill: tuning.meltdown_base_fill,
            difficulty: tuning.difficulty_start,
            board: LeaderboardSettings::default(),
            width,
            height,
            screen: Screen::Start,
            frame: 0,
            score: 0,
            multiplier: 1.0,
            elapsed: 0.0,
            spawn_counter: 0,
            game_over_frames: 0,
            player,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            power_ups: Vec::new(),
            particles: Vec::new(),
            popups: Vec::new(),
            effects: ActiveEffects::default(),
            leaderboard: LeaderboardView::default(),
            form: SubmitForm::default(),
            qualified: false,
            submitted: None,
            challenge: None,
            challenge_beaten: false,
            message: None,
            auto_fire: AutoFire::default(),
            touch: TouchControls::new(width, height),
            music: MusicState::default(),
            generation: 0,
            next_seq: 0,
            pending: PendingRequests::default(),
            rng: Pcg32::seed_from_u64(seed),
            tuning,
        }
    }

    /// Apply leaderboard settings from config
    pub fn with_board(mut self, board: LeaderboardSettings) -> Self {
        self.board = board;
        self
    }

    /// Switch on touch controls; touch devices default to auto-fire
    pub fn enable_touch(&mut self, auto_fire: bool) {
        self.touch.enabled = true;
        self.auto_fire.enabled = auto_fire;
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Clear all per-run state for a fresh run
    ///
    /// Bumps the generation so replies to requests issued by the previous
    /// run are discarded.
    pub fn reset(&mut self) {
        self.meltdown = self.tuning.meltdown_max;
        self.difficulty = self.tuning.difficulty_start;
        self.enemies.clear();
        self.projectiles.clear();
        self.particles.clear();
        self.popups.clear();
        self.power_ups.clear();
        self.player.pos.x = self.width / 2.0;
        self.player.moving_left = false;
        self.player.moving_right = false;
        self.score = 0;
        self.elapsed = 0.0;
        self.spawn_counter = 0;
        self.game_over_frames = 0;
        self.refill = self.tuning.meltdown_base_fill;
        self.multiplier = 1.0;
        self.qualified = false;
        self.challenge_beaten = false;
        self.effects = ActiveEffects::default();
        self.auto_fire.last_shot = None;
        self.touch.held.clear();
        self.leaderboard.loading = false;
        self.form.submitting = false;
        self.pending = PendingRequests::default();
        self.generation = self.generation.wrapping_add(1);
    }

    /// Allocate a ticket for a request issued now
    pub fn next_ticket(&mut self) -> Ticket {
        self.next_seq = self.next_seq.wrapping_add(1);
        Ticket {
            generation: self.generation,
            seq: self.next_seq,
        }
    }

    /// Add to meltdown, clamped to `0..=max`
    pub fn adjust_meltdown(&mut self, delta: f32) {
        self.meltdown = (self.meltdown + delta).clamp(0.0, self.tuning.meltdown_max);
    }

    /// Show a transient message for `frames` frames
    pub fn show_message(&mut self, text: impl Into<String>, frames: u64) {
        self.message = Some(Message {
            text: text.into(),
            until_frame: self.frame + frames,
        });
    }

    /// Message still on screen, if any
    pub fn visible_message(&self) -> Option<&str> {
        self.message
            .as_ref()
            .filter(|m| self.frame < m.until_frame)
            .map(|m| m.text.as_str())
    }

    pub fn is_invincible(&self) -> bool {
        self.effects.invincibility.active
    }

    /// Burst of `count` particles at `pos`
    pub fn emit_particles(&mut self, pos: Vec2, palette: Palette, count: usize, tint: Option<Rgb>) {
        for _ in 0..count {
            let p = Particle::new(pos, palette, tint, &mut self.rng);
            self.particles.push(p);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_clamped_to_arena() {
        let tuning = Tuning::default();
        let mut player = Player::new(Vec2::new(45.0, 500.0), &tuning);
        player.moving_left = true;
        player.update(800.0);
        assert_eq!(player.pos.x, 40.0);

        player.moving_left = false;
        player.moving_right = true;
        player.pos.x = 758.0;
        player.update(800.0);
        assert_eq!(player.pos.x, 760.0);
    }

    #[test]
    fn test_bubble_radius_tracks_size() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..100 {
            let b = Bubble::new(Vec2::ZERO, rng.random_range(20.0..100.0), 3.0, Side::Enemy, &mut rng);
            assert_eq!(b.radius, b.size / 2.0);
        }
    }

    #[test]
    fn test_bubbles_move_by_side() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut enemy = Bubble::new(Vec2::new(100.0, 0.0), 60.0, 3.0, Side::Enemy, &mut rng);
        let mut shot = Bubble::new(Vec2::new(100.0, 500.0), 40.0, 8.0, Side::Projectile, &mut rng);
        enemy.update(0);
        shot.update(0);
        assert_eq!(enemy.pos.y, 3.0);
        assert_eq!(shot.pos.y, 492.0);
        assert_eq!(shot.pos.x, 100.0);
    }

    #[test]
    fn test_particle_fades_out() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut p = Particle::new(Vec2::ZERO, Palette::Enemy, None, &mut rng);
        assert_eq!(p.color, [255, 100, 100]);
        let mut frames = 0;
        while !p.is_dead() {
            p.update(0.0);
            frames += 1;
        }
        // Fade is 5..10 per frame
        assert!((26..=52).contains(&frames));
    }

    #[test]
    fn test_tinted_particle_keeps_tint() {
        let mut rng = Pcg32::seed_from_u64(4);
        let p = Particle::new(Vec2::ZERO, Palette::PowerUp, Some([1, 2, 3]), &mut rng);
        assert_eq!(p.color, [1, 2, 3]);
    }

    #[test]
    fn test_popup_rises_and_fades() {
        let mut popup = ScorePopup::new(Vec2::new(0.0, 100.0), 150);
        for _ in 0..51 {
            popup.update();
        }
        assert!(popup.is_dead());
        assert!((popup.pos.y - (100.0 - 51.0 * 1.5)).abs() < 1e-3);
    }

    #[test]
    fn test_timed_effect_refresh_and_expiry() {
        let mut effect = TimedEffect::default();
        effect.activate(100, 300);
        assert_eq!(effect.until_frame, 400);
        effect.activate(200, 300);
        assert_eq!(effect.until_frame, 500);
        assert!(!effect.expire(500));
        assert!(effect.expire(501));
        assert!(!effect.active);
    }

    #[test]
    fn test_adjust_meltdown_clamps() {
        let mut game = Game::new(1, Tuning::default());
        game.adjust_meltdown(50.0);
        assert_eq!(game.meltdown, 100.0);
        game.adjust_meltdown(-250.0);
        assert_eq!(game.meltdown, 0.0);
    }

    #[test]
    fn test_reset_bumps_generation() {
        let mut game = Game::new(1, Tuning::default());
        let before = game.next_ticket();
        game.score = 900;
        game.reset();
        let after = game.next_ticket();
        assert_eq!(game.score, 0);
        assert_ne!(before.generation, after.generation);
        assert!(after.seq > before.seq);
    }

    #[test]
    fn test_touch_hold_and_release() {
        let mut touch = TouchControls::new(800.0, 600.0);
        touch.hold(7, TouchRole::Left);
        touch.hold(7, TouchRole::Right);
        assert_eq!(touch.held.len(), 1);
        assert_eq!(touch.release(7), Some(TouchRole::Right));
        assert_eq!(touch.release(7), None);
    }
}
