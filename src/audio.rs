//! Audio collaborator
//!
//! The simulation only decides *when* something should sound; what it sounds
//! like belongs to the sink. On the web the sink is procedural Web Audio,
//! everywhere else it is silent.

/// One-shot sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Projectile fired
    Fire,
    /// Projectile destroyed an enemy
    Pop,
    /// Enemy reached the player
    Damage,
    /// Power-up collected
    PowerUp,
    /// Occasional taunt after a hit
    Voice,
    /// Meltdown reached zero
    GameOver,
}

/// Sound output used by the frame loop
pub trait AudioSink {
    fn start_music(&mut self);
    fn stop_music(&mut self);
    /// Background music playback rate and volume (0.0 - 1.0)
    fn set_music_intensity(&mut self, rate: f32, volume: f32);
    fn play(&mut self, cue: Cue);
    /// Unlock output after a user gesture
    fn resume(&mut self) {}
}

impl<A: AudioSink + ?Sized> AudioSink for Box<A> {
    fn start_music(&mut self) {
        (**self).start_music()
    }

    fn stop_music(&mut self) {
        (**self).stop_music()
    }

    fn set_music_intensity(&mut self, rate: f32, volume: f32) {
        (**self).set_music_intensity(rate, volume)
    }

    fn play(&mut self, cue: Cue) {
        (**self).play(cue)
    }

    fn resume(&mut self) {
        (**self).resume()
    }
}

/// Sink that drops everything (native, tests, muted hosts)
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn start_music(&mut self) {}
    fn stop_music(&mut self) {}
    fn set_music_intensity(&mut self, _rate: f32, _volume: f32) {}
    fn play(&mut self, _cue: Cue) {}
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, Cue};

    /// Base pitch of the music drone at rate 1.0
    const DRONE_HZ: f32 = 55.0;

    struct Drone {
        bass: OscillatorNode,
        pulse: OscillatorNode,
        gain: GainNode,
    }

    /// Procedural Web Audio output
    pub struct WebAudio {
        ctx: Option<AudioContext>,
        drone: Option<Drone>,
        master_volume: f32,
        sfx_volume: f32,
        music_volume: f32,
        muted: bool,
    }

    impl WebAudio {
        pub fn new(master_volume: f32, sfx_volume: f32, music_volume: f32, muted: bool) -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                drone: None,
                master_volume: master_volume.clamp(0.0, 1.0),
                sfx_volume: sfx_volume.clamp(0.0, 1.0),
                music_volume: music_volume.clamp(0.0, 1.0),
                muted,
            }
        }

        fn sfx_gain(&self) -> f32 {
            if self.muted {
                0.0
            } else {
                self.master_volume * self.sfx_volume
            }
        }

        fn music_gain(&self, volume: f32) -> f32 {
            if self.muted {
                0.0
            } else {
                self.master_volume * self.music_volume * volume
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Single enveloped tone, optionally sweeping to `end_freq`
        fn blip(
            ctx: &AudioContext,
            vol: f32,
            freq: f32,
            end_freq: Option<f32>,
            osc_type: OscillatorType,
            delay: f64,
            length: f64,
        ) {
            let Some((osc, gain)) = Self::create_osc(ctx, freq, osc_type) else {
                return;
            };
            let t = ctx.current_time() + delay;

            gain.gain().set_value_at_time(vol, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + length)
                .ok();
            if let Some(end) = end_freq {
                osc.frequency().set_value_at_time(freq, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(end, t + length)
                    .ok();
            }

            osc.start_with_when(t).ok();
            osc.stop_with_when(t + length + 0.05).ok();
        }
    }

    impl AudioSink for WebAudio {
        fn resume(&mut self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        fn start_music(&mut self) {
            if self.drone.is_some() {
                return;
            }
            let Some(ctx) = &self.ctx else { return };
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let Some((bass, gain)) = Self::create_osc(ctx, DRONE_HZ, OscillatorType::Triangle) else {
                return;
            };
            let Ok(pulse) = ctx.create_oscillator() else { return };
            pulse.set_type(OscillatorType::Square);
            pulse.frequency().set_value(DRONE_HZ * 2.0);
            if pulse.connect_with_audio_node(&gain).is_err() {
                return;
            }
            gain.gain().set_value(self.music_gain(0.5));
            bass.start().ok();
            pulse.start().ok();
            self.drone = Some(Drone { bass, pulse, gain });
        }

        fn stop_music(&mut self) {
            if let Some(drone) = self.drone.take() {
                drone.bass.stop().ok();
                drone.pulse.stop().ok();
            }
        }

        fn set_music_intensity(&mut self, rate: f32, volume: f32) {
            let gain = self.music_gain(volume);
            if let Some(drone) = &self.drone {
                drone.bass.frequency().set_value(DRONE_HZ * rate);
                drone.pulse.frequency().set_value(DRONE_HZ * 2.0 * rate);
                drone.gain.gain().set_value(gain * 0.3);
            }
        }

        fn play(&mut self, cue: Cue) {
            let vol = self.sfx_gain();
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            // Browsers keep the context suspended until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match cue {
                Cue::Fire => {
                    Self::blip(ctx, vol * 0.2, 300.0, Some(700.0), OscillatorType::Triangle, 0.0, 0.12)
                }
                Cue::Pop => {
                    Self::blip(ctx, vol * 0.3, 900.0, Some(300.0), OscillatorType::Sine, 0.0, 0.15)
                }
                Cue::Damage => {
                    Self::blip(ctx, vol * 0.5, 150.0, Some(50.0), OscillatorType::Sawtooth, 0.0, 0.3)
                }
                Cue::PowerUp => {
                    for (i, freq) in [600.0, 800.0, 1000.0].iter().enumerate() {
                        Self::blip(ctx, vol * 0.25, *freq, None, OscillatorType::Sine, i as f64 * 0.08, 0.15);
                    }
                }
                Cue::Voice => {
                    // Two-syllable grumble
                    Self::blip(ctx, vol * 0.35, 220.0, Some(160.0), OscillatorType::Sawtooth, 0.0, 0.18);
                    Self::blip(ctx, vol * 0.35, 180.0, Some(120.0), OscillatorType::Sawtooth, 0.2, 0.25);
                }
                Cue::GameOver => {
                    for (i, freq) in [400.0, 350.0, 300.0, 200.0].iter().enumerate() {
                        Self::blip(ctx, vol * 0.3, *freq, None, OscillatorType::Sine, i as f64 * 0.2, 0.3);
                    }
                }
            }
        }
    }
}
