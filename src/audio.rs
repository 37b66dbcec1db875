//! Audio system using Web Audio API
//!
//! Every cue is synthesized from oscillators; there are no sound files.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::games::SoundCue;

/// Audio manager for the frontend
pub struct AudioManager {
    ctx: Option<AudioContext>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a game's sound cue
    pub fn play(&self, cue: SoundCue) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match cue {
            SoundCue::Flap => self.sweep(ctx, vol * 0.25, OscillatorType::Triangle, 300.0, 600.0, 0.12),
            SoundCue::Score => self.arpeggio(ctx, vol * 0.25, OscillatorType::Sine, &[700.0, 1050.0], 0.07, 0.12),
            SoundCue::Explosion => self.play_explosion(ctx, vol),
            SoundCue::Fire => self.play_volley(ctx, vol),
            SoundCue::Hit => self.sweep(ctx, vol * 0.4, OscillatorType::Square, 220.0, 80.0, 0.1),
            SoundCue::Slice => self.sweep(ctx, vol * 0.2, OscillatorType::Sawtooth, 1800.0, 400.0, 0.08),
            SoundCue::Pickup => {
                self.arpeggio(ctx, vol * 0.25, OscillatorType::Sine, &[600.0, 800.0, 1000.0], 0.08, 0.15)
            }
            SoundCue::Deliver => {
                self.arpeggio(ctx, vol * 0.25, OscillatorType::Triangle, &[500.0, 750.0, 1000.0, 1250.0], 0.06, 0.2)
            }
            SoundCue::WaveStart => {
                self.arpeggio(ctx, vol * 0.3, OscillatorType::Triangle, &[400.0, 500.0, 600.0, 800.0], 0.1, 0.4)
            }
            SoundCue::GameOver => {
                self.arpeggio(ctx, vol * 0.3, OscillatorType::Sine, &[400.0, 350.0, 300.0, 200.0], 0.2, 0.3)
            }
        }
    }

    // === Sound generators ===

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
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

    /// One tone gliding between two pitches
    fn sweep(&self, ctx: &AudioContext, level: f32, wave: OscillatorType, from: f32, to: f32, secs: f64) {
        let Some((osc, gain)) = self.create_osc(ctx, from, wave) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(level, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + secs)
            .ok();
        osc.frequency().set_value_at_time(from, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(to, t + secs)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + secs + 0.05).ok();
    }

    /// Short notes in sequence
    fn arpeggio(&self, ctx: &AudioContext, level: f32, wave: OscillatorType, notes: &[f32], gap: f64, secs: f64) {
        for (i, freq) in notes.iter().enumerate() {
            let delay = i as f64 * gap;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, wave) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(level, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + secs)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + secs + 0.05).ok();
            }
        }
    }

    /// Explosion - low rumble plus a crack
    fn play_explosion(&self, ctx: &AudioContext, vol: f32) {
        self.sweep(ctx, vol * 0.5, OscillatorType::Sawtooth, 100.0, 30.0, 0.4);

        if let Some((osc, gain)) = self.create_osc(ctx, 1500.0, OscillatorType::Square) {
            let t = ctx.current_time();
            gain.gain().set_value_at_time(vol * 0.2, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.15).ok();
        }
    }

    /// Musket volley - ragged pops
    fn play_volley(&self, ctx: &AudioContext, vol: f32) {
        for i in 0..4 {
            let Some((osc, gain)) = self.create_osc(ctx, 180.0 - i as f32 * 20.0, OscillatorType::Square) else {
                continue;
            };
            let t = ctx.current_time() + i as f64 * 0.03;
            gain.gain().set_value_at_time(vol * 0.2, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.08)
                .ok();
            osc.start_with_when(t).ok();
            osc.stop_with_when(t + 0.1).ok();
        }
    }
}
