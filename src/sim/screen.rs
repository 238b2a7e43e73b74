//! Screen state machine and input dispatch
//!
//! `Game::screen` is the only record of which screen is active; every
//! transition goes through the functions here so the side effects (music,
//! leaderboard requests, form reset) stay in one place.

use glam::Vec2;

use super::Services;
use super::collision::point_in_circle;
use super::state::{Bubble, FormField, Game, Screen, Side, TouchButton, TouchRole};
use crate::audio::Cue;
use crate::leaderboard::{
    LeaderboardEntry, LeaderboardRequest, Outcome, Reply, Ticket, validate_submission,
};

/// Frames a transient message stays up by default
pub const MESSAGE_FRAMES: u64 = 120;

/// Shown when no leaderboard store is configured
pub const UNAVAILABLE_TEXT: &str = "Leaderboard system is not available";

/// Semantic input from the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    /// Left intent pressed (`true`) or released (`false`)
    MoveLeft(bool),
    MoveRight(bool),
    Fire,
    Confirm,
    Cancel,
    ToggleField,
    /// Printable character; doubles as a shortcut outside the form
    Char(char),
    Backspace,
    ViewLeaderboard,
    OpenSubmit,
    ToggleAutoFire,
    /// Mouse press or tap in arena coordinates
    PointerDown(Vec2),
    TouchStart { id: u32, pos: Vec2 },
    TouchMove { id: u32, pos: Vec2 },
    TouchEnd { id: u32 },
}

impl Input {
    /// Map a browser `KeyboardEvent.key` on key down
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Input::MoveLeft(true)),
            "ArrowRight" => Some(Input::MoveRight(true)),
            "Enter" => Some(Input::Confirm),
            "Escape" => Some(Input::Cancel),
            "Tab" => Some(Input::ToggleField),
            "Backspace" => Some(Input::Backspace),
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if !c.is_control() => Some(Input::Char(c)),
                    _ => None,
                }
            }
        }
    }

    /// Map a browser `KeyboardEvent.key` on key up
    pub fn from_key_up(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Input::MoveLeft(false)),
            "ArrowRight" => Some(Input::MoveRight(false)),
            _ => None,
        }
    }
}

/// Requests the game makes of its host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostAction {
    /// Open a share dialog for the score
    ShareTwitter { score: u64 },
    ShareFacebook,
    /// Copy a challenge link for the score to the clipboard
    CopyChallenge { score: u64 },
    /// Throw away the game and start over
    Reload,
}

/// Fixed screen geometry shared by input hit-testing and drawing
pub mod layout {
    use crate::sim::collision::Rect;

    pub const NAME_FIELD: Rect = Rect {
        left: 300.0,
        top: 200.0,
        right: 600.0,
        bottom: 240.0,
    };
    pub const EMAIL_FIELD: Rect = Rect {
        left: 300.0,
        top: 260.0,
        right: 600.0,
        bottom: 300.0,
    };

    /// Submit button, centred horizontally
    pub fn submit_button(width: f32) -> Rect {
        Rect::from_corner(width / 2.0 - 100.0, 340.0, 200.0, 50.0)
    }

    /// "View leaderboard" click band on the game-over screen
    pub fn leaderboard_band(height: f32) -> (f32, f32) {
        (height - 120.0, height - 80.0)
    }

    /// Share buttons
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Social {
        Twitter,
        Facebook,
        Challenge,
    }

    impl Social {
        pub fn label(self) -> &'static str {
            match self {
                Social::Twitter => "Tweet",
                Social::Facebook => "Share",
                Social::Challenge => "Challenge",
            }
        }

        pub fn color(self) -> [u8; 3] {
            match self {
                Social::Twitter => [29, 161, 242],
                Social::Facebook => [59, 89, 152],
                Social::Challenge => [76, 175, 80],
            }
        }
    }

    const BUTTON_W: f32 = 100.0;
    const BUTTON_H: f32 = 40.0;
    const BUTTON_GAP: f32 = 20.0;

    /// Share button row centred on `(cx, cy)`
    pub fn social_buttons(cx: f32, cy: f32) -> [(Social, Rect); 3] {
        let total = BUTTON_W * 3.0 + BUTTON_GAP * 2.0;
        let x0 = cx - total / 2.0;
        let y0 = cy - BUTTON_H / 2.0;
        let at = |i: f32| Rect::from_corner(x0 + (BUTTON_W + BUTTON_GAP) * i, y0, BUTTON_W, BUTTON_H);
        [
            (Social::Twitter, at(0.0)),
            (Social::Facebook, at(1.0)),
            (Social::Challenge, at(2.0)),
        ]
    }

    /// Share row position on the game-over screen
    pub fn game_over_social_y(height: f32) -> f32 {
        height * 0.75 + 80.0
    }

    /// Share row position on the leaderboard screen
    pub fn leaderboard_social_y(height: f32) -> f32 {
        height - 70.0
    }
}

/// Dispatch one input event to the active screen
pub fn handle_input(game: &mut Game, svc: &mut Services, input: Input) -> Option<HostAction> {
    match game.screen {
        Screen::Start => match input {
            Input::Confirm | Input::PointerDown(_) | Input::TouchStart { .. } => {
                start_run(game, svc);
            }
            _ => {}
        },
        Screen::Play => play_input(game, svc, input),
        Screen::GameOver => return game_over_input(game, svc, input),
        Screen::Leaderboard => return leaderboard_input(game, svc, input),
        Screen::SubmitScore => submit_input(game, svc, input),
    }
    None
}

fn play_input(game: &mut Game, svc: &mut Services, input: Input) {
    match input {
        Input::MoveLeft(down) => game.player.moving_left = down,
        Input::MoveRight(down) => game.player.moving_right = down,
        Input::Fire | Input::Char(' ') => fire(game, svc),
        Input::ToggleAutoFire => toggle_auto_fire(game),
        Input::TouchStart { id, pos } => touch_start(game, svc, id, pos),
        Input::TouchMove { id, pos } => touch_move(game, svc, id, pos),
        Input::TouchEnd { id } => touch_end(game, id),
        _ => {}
    }
}

fn game_over_input(game: &mut Game, svc: &mut Services, input: Input) -> Option<HostAction> {
    match input {
        Input::Confirm => start_run(game, svc),
        Input::ViewLeaderboard | Input::Char('v' | 'V') => open_leaderboard(game, svc),
        Input::OpenSubmit | Input::Char('l' | 'L') => {
            if game.qualified {
                open_submit_form(game);
            }
        }
        Input::PointerDown(pos) | Input::TouchStart { pos, .. } => {
            if let Some(action) = social_click(game, pos, layout::game_over_social_y(game.height)) {
                return Some(action);
            }
            if game.touch.enabled {
                start_run(game, svc);
            } else {
                let (top, bottom) = layout::leaderboard_band(game.height);
                if pos.y > top && pos.y < bottom {
                    open_leaderboard(game, svc);
                }
            }
        }
        _ => {}
    }
    None
}

fn leaderboard_input(game: &mut Game, svc: &mut Services, input: Input) -> Option<HostAction> {
    match input {
        Input::Cancel => start_run(game, svc),
        Input::PointerDown(pos) | Input::TouchStart { pos, .. } => {
            if let Some(action) = social_click(game, pos, layout::leaderboard_social_y(game.height)) {
                return Some(action);
            }
            if game.touch.enabled && pos.y > game.height - 60.0 {
                start_run(game, svc);
            }
        }
        _ => {}
    }
    None
}

fn submit_input(game: &mut Game, svc: &mut Services, input: Input) {
    match input {
        Input::Confirm => submit(game, svc),
        Input::Cancel => start_run(game, svc),
        Input::ToggleField => game.form.toggle_field(),
        Input::Char(c) => {
            if !game.form.submitting {
                game.form.active_text_mut().push(c);
            }
        }
        Input::Backspace => {
            game.form.active_text_mut().pop();
        }
        Input::PointerDown(pos) | Input::TouchStart { pos, .. } => {
            if layout::NAME_FIELD.contains(pos) {
                game.form.active = FormField::Name;
            } else if layout::EMAIL_FIELD.contains(pos) {
                game.form.active = FormField::Email;
            } else if layout::submit_button(game.width).contains(pos) {
                submit(game, svc);
            } else if game.touch.enabled && pos.y > game.height - 100.0 && pos.y < game.height - 60.0 {
                start_run(game, svc);
            }
        }
        _ => {}
    }
}

fn social_click(game: &Game, pos: Vec2, row_y: f32) -> Option<HostAction> {
    let (social, _) = layout::social_buttons(game.width / 2.0, row_y)
        .into_iter()
        .find(|(_, rect)| rect.contains(pos))?;
    Some(match social {
        layout::Social::Twitter => HostAction::ShareTwitter { score: game.score },
        layout::Social::Facebook => HostAction::ShareFacebook,
        layout::Social::Challenge => HostAction::CopyChallenge { score: game.score },
    })
}

/// Reset and begin a new run
pub fn start_run(game: &mut Game, svc: &mut Services) {
    game.reset();
    game.screen = Screen::Play;
    svc.audio.start_music();
    game.music.playing = true;
    game.music.counter = 0;
    let rate = music_rate(game);
    game.music.last_rate = rate;
    svc.audio.set_music_intensity(rate, music_volume(rate));
    log::info!("Run started (generation {})", game.generation);
}

/// Launch a projectile from just above the player
pub fn fire(game: &mut Game, svc: &mut Services) {
    if game.screen != Screen::Play {
        return;
    }
    let pos = Vec2::new(game.player.pos.x, game.player.pos.y - game.tuning.projectile_offset);
    let (size, speed) = (game.tuning.projectile_size, game.tuning.projectile_speed);
    let bubble = Bubble::new(pos, size, speed, Side::Projectile, &mut game.rng);
    game.projectiles.push(bubble);
    svc.audio.play(Cue::Fire);
}

/// Flip auto-fire and say so
pub fn toggle_auto_fire(game: &mut Game) {
    game.auto_fire.enabled = !game.auto_fire.enabled;
    game.auto_fire.last_shot = None;
    let text = if game.auto_fire.enabled {
        "Auto-shoot enabled"
    } else {
        "Auto-shoot disabled"
    };
    game.show_message(text, 90);
}

fn touch_start(game: &mut Game, svc: &mut Services, id: u32, pos: Vec2) {
    let hit = |b: TouchButton| point_in_circle(pos, b.center, b.radius);
    if hit(game.touch.left) {
        game.player.moving_left = true;
        game.touch.hold(id, TouchRole::Left);
    } else if hit(game.touch.right) {
        game.player.moving_right = true;
        game.touch.hold(id, TouchRole::Right);
    } else if hit(game.touch.fire) {
        fire(game, svc);
        game.touch.hold(id, TouchRole::Fire);
    } else if game.touch.enabled && hit(game.touch.auto_toggle) {
        toggle_auto_fire(game);
    }
}

fn touch_move(game: &mut Game, svc: &mut Services, id: u32, pos: Vec2) {
    match game.touch.role_of(id) {
        Some(TouchRole::Left) => {
            if !point_in_circle(pos, game.touch.left.center, game.touch.left.radius) {
                game.player.moving_left = false;
                game.touch.release(id);
            }
        }
        Some(TouchRole::Right) => {
            if !point_in_circle(pos, game.touch.right.center, game.touch.right.radius) {
                game.player.moving_right = false;
                game.touch.release(id);
            }
        }
        // Firing happens on touch start only
        Some(TouchRole::Fire) => {}
        None => touch_start(game, svc, id, pos),
    }
}

fn touch_end(game: &mut Game, id: u32) {
    match game.touch.release(id) {
        Some(TouchRole::Left) => game.player.moving_left = false,
        Some(TouchRole::Right) => game.player.moving_right = false,
        Some(TouchRole::Fire) | None => {}
    }
}

/// Music playback rate for the current meltdown level
pub fn music_rate(game: &Game) -> f32 {
    let fraction = game.meltdown / game.tuning.meltdown_max;
    crate::remap(fraction, 0.0, 1.0, 1.5, 0.8)
}

/// Music volume for a playback rate
pub fn music_volume(rate: f32) -> f32 {
    crate::remap(rate, 0.8, 1.5, 0.4, 0.7)
}

/// Meltdown ran out: end the run and ask whether it qualifies
pub fn enter_game_over(game: &mut Game, svc: &mut Services) {
    game.meltdown = 0.0;
    game.screen = Screen::GameOver;
    game.game_over_frames = 0;
    game.qualified = false;
    game.submitted = None;
    game.player.moving_left = false;
    game.player.moving_right = false;
    svc.audio.stop_music();
    game.music.playing = false;
    svc.audio.play(Cue::GameOver);
    log::info!("Game over: score {} after {:.0}s", game.score, game.elapsed);

    let ticket = game.next_ticket();
    game.pending.qualification = Some(ticket);
    svc.leaderboard.dispatch(
        ticket,
        LeaderboardRequest::CheckQualification {
            score: game.score,
            limit: game.board.max_entries,
        },
    );
}

/// Show the submit form with empty fields
pub fn open_submit_form(game: &mut Game) {
    game.form.clear();
    game.screen = Screen::SubmitScore;
    log::info!("Score {} qualifies, opening submit form", game.score);
}

/// Fetch the leaderboard and show it
pub fn open_leaderboard(game: &mut Game, svc: &mut Services) {
    game.screen = Screen::Leaderboard;
    request_top_scores(game, svc);
}

/// Issue a top-scores request; the view shows a loading state until it lands
pub fn request_top_scores(game: &mut Game, svc: &mut Services) {
    let ticket = game.next_ticket();
    game.pending.top_scores = Some(ticket);
    game.leaderboard.loading = true;
    game.leaderboard.error = None;
    svc.leaderboard.dispatch(
        ticket,
        LeaderboardRequest::TopScores {
            limit: game.board.max_entries,
        },
    );
}

/// Validate the form and send the submission
pub fn submit(game: &mut Game, svc: &mut Services) {
    if game.form.submitting {
        return;
    }
    let submission = match validate_submission(&game.form.name, &game.form.email, game.score) {
        Ok(s) => s,
        Err(e) => {
            game.form.error = Some(e.to_string());
            return;
        }
    };
    if !svc.leaderboard.is_available() {
        game.form.error = Some(format!("{UNAVAILABLE_TEXT}. Please try again later."));
        return;
    }

    log::info!("Submitting score {} for {}", submission.score, submission.name);
    game.form.submitting = true;
    game.form.error = None;
    let ticket = game.next_ticket();
    game.pending.submit = Some(ticket);
    svc.leaderboard.dispatch(ticket, LeaderboardRequest::Submit(submission));
}

/// Apply one leaderboard reply if it still belongs to the current run
pub fn apply_reply(game: &mut Game, svc: &mut Services, reply: Reply) {
    let Reply { ticket, outcome } = reply;
    if ticket.generation != game.generation {
        log::debug!(
            "Dropping stale leaderboard reply from generation {} (now {})",
            ticket.generation,
            game.generation
        );
        return;
    }

    let is = |slot: Option<Ticket>| slot == Some(ticket);
    if is(game.pending.qualification) {
        game.pending.qualification = None;
        apply_qualification(game, outcome);
    } else if is(game.pending.top_scores) {
        game.pending.top_scores = None;
        apply_top_scores(game, outcome);
    } else if is(game.pending.submit) {
        game.pending.submit = None;
        apply_submitted(game, svc, outcome);
    } else {
        log::debug!("Dropping superseded leaderboard reply {:?}", ticket);
    }
}

fn apply_qualification(game: &mut Game, outcome: Outcome) {
    if game.screen != Screen::GameOver {
        log::debug!("Qualification reply ignored on {:?}", game.screen);
        return;
    }
    game.qualified = match outcome {
        Outcome::Qualification(q) => q,
        Outcome::Unavailable => false,
        other => {
            log::warn!("Unexpected reply to qualification check: {:?}", other);
            false
        }
    };
    log::info!("Score {} qualified: {}", game.score, game.qualified);
}

fn apply_top_scores(game: &mut Game, outcome: Outcome) {
    let view = &mut game.leaderboard;
    view.loading = false;
    view.fetched_at = Some(game.frame);
    match outcome {
        Outcome::TopScores(entries) => {
            log::info!("Loaded {} leaderboard entries", entries.len());
            view.entries = entries;
            view.error = None;
        }
        Outcome::Unavailable => {
            view.error = Some(UNAVAILABLE_TEXT.to_string());
        }
        other => log::warn!("Unexpected reply to top scores: {:?}", other),
    }
}

fn apply_submitted(game: &mut Game, svc: &mut Services, outcome: Outcome) {
    game.form.submitting = false;
    if game.screen != Screen::SubmitScore {
        log::debug!("Submit reply ignored on {:?}", game.screen);
        return;
    }
    match outcome {
        Outcome::Submitted(true) => {
            log::info!("Score submitted successfully");
            game.submitted = Some(LeaderboardEntry {
                name: game.form.name.trim().to_string(),
                score: game.score,
            });
            open_leaderboard(game, svc);
        }
        Outcome::Submitted(false) => {
            log::error!("Failed to submit score");
            game.form.error = Some("Failed to submit score. Try again later.".to_string());
        }
        Outcome::Unavailable => {
            game.form.error = Some(format!("{UNAVAILABLE_TEXT}. Please try again later."));
        }
        other => log::warn!("Unexpected reply to submit: {:?}", other),
    }
}

/// Build the share link for a challenge score
pub fn challenge_url(base: &str, score: u64) -> String {
    let base = base.split(['?', '#']).next().unwrap_or(base);
    format!("{base}?challenge={score}")
}

/// Read a challenge score from a query string (`?challenge=1234&x=y`)
pub fn parse_challenge(query: &str) -> Option<u64> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == "challenge")
        .and_then(|(_, v)| v.parse::<u64>().ok())
        .filter(|score| *score > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SilentAudio;
    use crate::leaderboard::{
        DisabledLeaderboard, LeaderboardPort, MemoryScoreStore, QueuedLeaderboard, StoredScore,
    };
    use crate::tuning::Tuning;

    fn setup() -> (Game, QueuedLeaderboard<MemoryScoreStore>, SilentAudio) {
        (
            Game::new(42, Tuning::default()),
            QueuedLeaderboard::new(MemoryScoreStore::new()),
            SilentAudio,
        )
    }

    fn send(game: &mut Game, lb: &mut dyn LeaderboardPort, audio: &mut SilentAudio, input: Input) -> Option<HostAction> {
        let mut svc = Services::new(lb, audio);
        handle_input(game, &mut svc, input)
    }

    fn pump(game: &mut Game, lb: &mut dyn LeaderboardPort, audio: &mut SilentAudio) {
        let mut svc = Services::new(lb, audio);
        for reply in svc.leaderboard.drain() {
            apply_reply(game, &mut svc, reply);
        }
    }

    fn game_over(game: &mut Game, lb: &mut dyn LeaderboardPort, audio: &mut SilentAudio) {
        let mut svc = Services::new(lb, audio);
        enter_game_over(game, &mut svc);
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(Input::from_key("ArrowLeft"), Some(Input::MoveLeft(true)));
        assert_eq!(Input::from_key_up("ArrowLeft"), Some(Input::MoveLeft(false)));
        assert_eq!(Input::from_key("Enter"), Some(Input::Confirm));
        assert_eq!(Input::from_key("a"), Some(Input::Char('a')));
        assert_eq!(Input::from_key("Shift"), None);
    }

    #[test]
    fn test_start_confirm_begins_run() {
        let (mut game, mut lb, mut audio) = setup();
        send(&mut game, &mut lb, &mut audio, Input::Confirm);
        assert_eq!(game.screen, Screen::Play);
        assert!(game.music.playing);
    }

    #[test]
    fn test_fire_only_in_play() {
        let (mut game, mut lb, mut audio) = setup();
        send(&mut game, &mut lb, &mut audio, Input::Fire);
        assert!(game.projectiles.is_empty());
        send(&mut game, &mut lb, &mut audio, Input::Confirm);
        send(&mut game, &mut lb, &mut audio, Input::Char(' '));
        assert_eq!(game.projectiles.len(), 1);
        let shot = &game.projectiles[0];
        assert_eq!(shot.pos.y, game.player.pos.y - 30.0);
    }

    #[test]
    fn test_qualification_reply_sets_flag() {
        let (mut game, mut lb, mut audio) = setup();
        send(&mut game, &mut lb, &mut audio, Input::Confirm);
        game.score = 10;
        game_over(&mut game, &mut lb, &mut audio);
        assert!(!game.qualified);
        pump(&mut game, &mut lb, &mut audio);
        // Empty table always qualifies
        assert!(game.qualified);
    }

    #[test]
    fn test_stale_qualification_reply_discarded() {
        let (mut game, mut lb, mut audio) = setup();
        send(&mut game, &mut lb, &mut audio, Input::Confirm);
        game_over(&mut game, &mut lb, &mut audio);
        // Restart before the reply lands
        send(&mut game, &mut lb, &mut audio, Input::Confirm);
        pump(&mut game, &mut lb, &mut audio);
        assert_eq!(game.screen, Screen::Play);
        assert!(!game.qualified);
    }

    #[test]
    fn test_submit_shortcut_requires_qualification() {
        let (mut game, mut lb, mut audio) = setup();
        send(&mut game, &mut lb, &mut audio, Input::Confirm);
        game_over(&mut game, &mut lb, &mut audio);
        send(&mut game, &mut lb, &mut audio, Input::Char('l'));
        assert_eq!(game.screen, Screen::GameOver);
        pump(&mut game, &mut lb, &mut audio);
        send(&mut game, &mut lb, &mut audio, Input::Char('L'));
        assert_eq!(game.screen, Screen::SubmitScore);
    }

    #[test]
    fn test_invalid_email_never_dispatches() {
        let (mut game, mut lb, mut audio) = setup();
        game.screen = Screen::SubmitScore;
        game.form.name = "Bob".into();
        game.form.email = "bob".into();
        let before = lb.dispatched();
        send(&mut game, &mut lb, &mut audio, Input::Confirm);
        assert_eq!(lb.dispatched(), before);
        assert_eq!(game.screen, Screen::SubmitScore);
        assert_eq!(
            game.form.error.as_deref(),
            Some("Please enter a valid email (must include @ and .)")
        );
    }

    #[test]
    fn test_form_typing_and_toggle() {
        let (mut game, mut lb, mut audio) = setup();
        game.screen = Screen::SubmitScore;
        for c in "Al".chars() {
            send(&mut game, &mut lb, &mut audio, Input::Char(c));
        }
        send(&mut game, &mut lb, &mut audio, Input::ToggleField);
        for c in "a@b.c".chars() {
            send(&mut game, &mut lb, &mut audio, Input::Char(c));
        }
        send(&mut game, &mut lb, &mut audio, Input::Backspace);
        assert_eq!(game.form.name, "Al");
        assert_eq!(game.form.email, "a@b.");

        send(&mut game, &mut lb, &mut audio, Input::PointerDown(Vec2::new(400.0, 220.0)));
        assert_eq!(game.form.active, FormField::Name);
    }

    #[test]
    fn test_successful_submit_opens_leaderboard() {
        let (mut game, mut lb, mut audio) = setup();
        send(&mut game, &mut lb, &mut audio, Input::Confirm);
        game.score = 750;
        game_over(&mut game, &mut lb, &mut audio);
        pump(&mut game, &mut lb, &mut audio);
        open_submit_form(&mut game);
        game.form.name = " Ada ".into();
        game.form.email = "ada@example.com".into();
        send(&mut game, &mut lb, &mut audio, Input::Confirm);
        assert!(game.form.submitting);

        pump(&mut game, &mut lb, &mut audio);
        assert_eq!(game.screen, Screen::Leaderboard);
        assert!(game.leaderboard.loading);
        pump(&mut game, &mut lb, &mut audio);
        assert!(!game.leaderboard.loading);
        assert_eq!(game.leaderboard.entries.len(), 1);
        assert_eq!(game.submitted.as_ref().map(|e| e.name.as_str()), Some("Ada"));
        assert_eq!(lb.store().len(), 1);
    }

    #[test]
    fn test_disabled_leaderboard_errors_inline() {
        let mut game = Game::new(1, Tuning::default());
        let mut lb = DisabledLeaderboard::new();
        let mut audio = SilentAudio;
        game.screen = Screen::SubmitScore;
        game.form.name = "Ada".into();
        game.form.email = "ada@example.com".into();
        send(&mut game, &mut lb, &mut audio, Input::Confirm);
        assert_eq!(game.screen, Screen::SubmitScore);
        assert!(!game.form.submitting);
        assert!(game.form.error.as_deref().unwrap_or("").starts_with(UNAVAILABLE_TEXT));

        game.screen = Screen::GameOver;
        send(&mut game, &mut lb, &mut audio, Input::ViewLeaderboard);
        pump(&mut game, &mut lb, &mut audio);
        assert_eq!(game.leaderboard.error.as_deref(), Some(UNAVAILABLE_TEXT));
    }

    #[test]
    fn test_cancel_from_leaderboard_restarts() {
        let (mut game, mut lb, mut audio) = setup();
        lb.store_mut().entries.push(StoredScore {
            player_name: "x".into(),
            email: "x@y.z".into(),
            score: 5,
        });
        game.screen = Screen::GameOver;
        send(&mut game, &mut lb, &mut audio, Input::Char('v'));
        assert_eq!(game.screen, Screen::Leaderboard);
        send(&mut game, &mut lb, &mut audio, Input::Cancel);
        assert_eq!(game.screen, Screen::Play);
        // Reply for the abandoned fetch is stale now
        pump(&mut game, &mut lb, &mut audio);
        assert!(game.leaderboard.entries.is_empty());
    }

    #[test]
    fn test_social_buttons_return_actions() {
        let (mut game, mut lb, mut audio) = setup();
        game.screen = Screen::GameOver;
        game.score = 321;
        let row = layout::social_buttons(400.0, layout::game_over_social_y(600.0));
        let challenge = row[2].1;
        let action = send(&mut game, &mut lb, &mut audio, Input::PointerDown(challenge.center()));
        assert_eq!(action, Some(HostAction::CopyChallenge { score: 321 }));
    }

    #[test]
    fn test_touch_buttons_drive_player() {
        let (mut game, mut lb, mut audio) = setup();
        game.enable_touch(false);
        send(&mut game, &mut lb, &mut audio, Input::Confirm);
        let left = game.touch.left.center;
        send(&mut game, &mut lb, &mut audio, Input::TouchStart { id: 1, pos: left });
        assert!(game.player.moving_left);
        // Slide off the button
        send(&mut game, &mut lb, &mut audio, Input::TouchMove { id: 1, pos: Vec2::new(400.0, 300.0) });
        assert!(!game.player.moving_left);

        let fire_pos = game.touch.fire.center;
        send(&mut game, &mut lb, &mut audio, Input::TouchStart { id: 2, pos: fire_pos });
        assert_eq!(game.projectiles.len(), 1);

        let toggle = game.touch.auto_toggle.center;
        send(&mut game, &mut lb, &mut audio, Input::TouchStart { id: 3, pos: toggle });
        assert!(game.auto_fire.enabled);
        assert_eq!(game.visible_message(), Some("Auto-shoot enabled"));
    }

    #[test]
    fn test_challenge_links() {
        assert_eq!(
            challenge_url("https://example.com/play?challenge=5", 900),
            "https://example.com/play?challenge=900"
        );
        assert_eq!(parse_challenge("?foo=1&challenge=1200"), Some(1200));
        assert_eq!(parse_challenge("?challenge=abc"), None);
        assert_eq!(parse_challenge(""), None);
    }
}
