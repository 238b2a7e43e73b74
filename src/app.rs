//! Frame driver
//!
//! Owns the game and its collaborators and runs update-then-draw once per
//! display frame. A panic inside either step is caught here; after that the
//! driver only paints the error screen and waits for the player to reload.

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::audio::AudioSink;
use crate::leaderboard::LeaderboardPort;
use crate::renderer::{Canvas, SceneOptions, draw, draw_error};
use crate::sim::{Game, Input, Services, handle_input, update};

pub use crate::sim::HostAction;

/// Game plus everything it talks to
pub struct FrameDriver {
    game: Game,
    leaderboard: Box<dyn LeaderboardPort>,
    audio: Box<dyn AudioSink>,
    pub options: SceneOptions,
    fault: Option<String>,
}

impl FrameDriver {
    pub fn new(game: Game, leaderboard: Box<dyn LeaderboardPort>, audio: Box<dyn AudioSink>) -> Self {
        Self {
            game,
            leaderboard,
            audio,
            options: SceneOptions::default(),
            fault: None,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    pub fn audio_mut(&mut self) -> &mut dyn AudioSink {
        self.audio.as_mut()
    }

    /// Panic message once the driver has faulted
    pub fn fault(&self) -> Option<&str> {
        self.fault.as_deref()
    }

    /// Feed one input event
    ///
    /// While faulted every input is ignored except `R`, which asks the host
    /// to reload.
    pub fn handle(&mut self, input: Input) -> Option<HostAction> {
        if self.fault.is_some() {
            return match input {
                Input::Char('r' | 'R') => Some(HostAction::Reload),
                _ => None,
            };
        }

        let Self {
            game,
            leaderboard,
            audio,
            ..
        } = self;
        let result = catch_unwind(AssertUnwindSafe(|| {
            let mut svc = Services::new(leaderboard.as_mut(), audio.as_mut());
            handle_input(game, &mut svc, input)
        }));
        match result {
            Ok(action) => action,
            Err(payload) => {
                self.enter_fault(payload);
                None
            }
        }
    }

    /// Advance the simulation one frame without drawing
    pub fn step(&mut self) {
        if self.fault.is_some() {
            return;
        }
        let Self {
            game,
            leaderboard,
            audio,
            ..
        } = self;
        let result = catch_unwind(AssertUnwindSafe(|| {
            let mut svc = Services::new(leaderboard.as_mut(), audio.as_mut());
            update(game, &mut svc);
        }));
        if let Err(payload) = result {
            self.enter_fault(payload);
        }
    }

    /// Update then draw one frame
    pub fn frame(&mut self, canvas: &mut dyn Canvas) {
        self.step();
        if self.fault.is_none() {
            let (game, opts) = (&self.game, self.options);
            let result = catch_unwind(AssertUnwindSafe(|| draw(game, &mut *canvas, opts)));
            if let Err(payload) = result {
                self.enter_fault(payload);
            }
        }
        if self.fault.is_some() {
            draw_error(canvas, self.game.width, self.game.height);
        }
    }

    fn enter_fault(&mut self, payload: Box<dyn std::any::Any + Send>) {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        log::error!("Game loop fault: {message}");
        self.audio.stop_music();
        self.fault = Some(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{Cue, SilentAudio};
    use crate::leaderboard::{DisabledLeaderboard, LeaderboardRequest, Reply, Ticket};
    use crate::renderer::RecordingCanvas;
    use crate::sim::Screen;
    use crate::tuning::Tuning;

    /// Leaderboard that blows up when asked for anything
    struct Exploding;

    impl LeaderboardPort for Exploding {
        fn dispatch(&mut self, _ticket: Ticket, _request: LeaderboardRequest) {
            panic!("store exploded");
        }

        fn drain(&mut self) -> Vec<Reply> {
            Vec::new()
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    /// Audio sink that panics on the game-over cue
    struct FragileAudio;

    impl AudioSink for FragileAudio {
        fn start_music(&mut self) {}
        fn stop_music(&mut self) {}
        fn set_music_intensity(&mut self, _rate: f32, _volume: f32) {}
        fn play(&mut self, cue: Cue) {
            if cue == Cue::GameOver {
                panic!("speaker on fire");
            }
        }
    }

    fn driver() -> FrameDriver {
        FrameDriver::new(
            Game::new(3, Tuning::default()),
            Box::new(DisabledLeaderboard::new()),
            Box::new(SilentAudio),
        )
    }

    #[test]
    fn test_frame_draws_start_screen() {
        let mut d = driver();
        let mut canvas = RecordingCanvas::new();
        d.frame(&mut canvas);
        assert_eq!(d.game().frame, 1);
        assert!(d.fault().is_none());
        assert_eq!(canvas.depth(), 0);
    }

    #[test]
    fn test_confirm_starts_run() {
        let mut d = driver();
        assert_eq!(d.handle(Input::Confirm), None);
        assert_eq!(d.game().screen, Screen::Play);
    }

    #[test]
    fn test_panic_in_update_faults_and_paints_error() {
        let mut d = FrameDriver::new(
            Game::new(3, Tuning::default()),
            Box::new(DisabledLeaderboard::new()),
            Box::new(FragileAudio),
        );
        d.handle(Input::Confirm);
        d.game_mut().meltdown = 0.0;

        let mut canvas = RecordingCanvas::new();
        d.frame(&mut canvas);
        assert_eq!(d.fault(), Some("speaker on fire"));
        assert!(canvas.has_text("Press R to restart"));

        // Frozen: further frames do not advance the game
        let frame = d.game().frame;
        d.frame(&mut RecordingCanvas::new());
        assert_eq!(d.game().frame, frame);
    }

    #[test]
    fn test_faulted_driver_only_answers_reload() {
        let mut d = FrameDriver::new(
            Game::new(3, Tuning::default()),
            Box::new(Exploding),
            Box::new(SilentAudio),
        );
        d.handle(Input::Confirm);
        d.game_mut().meltdown = 0.0;
        d.step();
        assert!(d.fault().is_some());

        assert_eq!(d.handle(Input::Confirm), None);
        assert_eq!(d.handle(Input::Char('r')), Some(HostAction::Reload));
    }
}
