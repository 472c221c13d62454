//! Audio system using Web Audio API
//!
//! Cues are synthesized from oscillators, no sample files. Requests for the
//! same cue inside a short window are dropped, and everything stays silent
//! until a user gesture unlocks the context.

use crate::sim::AudioCue;

/// Minimum gap between two plays of the same cue (ms)
pub fn debounce_ms(cue: AudioCue) -> f64 {
    match cue {
        AudioCue::Shoot => 80.0,
        _ => 50.0,
    }
}

/// Decides which cue requests actually sound
#[derive(Debug, Clone)]
pub struct CueGate {
    ready: bool,
    volume: f32,
    last_played: [Option<f64>; AudioCue::ALL.len()],
}

impl CueGate {
    pub fn new(volume: f32) -> Self {
        Self {
            ready: false,
            volume: volume.clamp(0.0, 1.0),
            last_played: [None; AudioCue::ALL.len()],
        }
    }

    /// Mark the output as usable (after the first user gesture)
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// True if `cue` should play at `now_ms`; records the play if so
    pub fn admit(&mut self, cue: AudioCue, now_ms: f64) -> bool {
        if !self.ready || self.volume <= 0.0 {
            return false;
        }
        let slot = &mut self.last_played[cue.index()];
        if let Some(last) = *slot {
            if now_ms - last < debounce_ms(cue) {
                return false;
            }
        }
        *slot = Some(now_ms);
        true
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

    use super::CueGate;
    use crate::sim::AudioCue;

    // Note frequencies (Hz)
    const C2: f32 = 65.41;
    const G2: f32 = 98.0;
    const C3: f32 = 130.81;
    const C4: f32 = 261.63;
    const A4: f32 = 440.0;
    const C5: f32 = 523.25;
    const E5: f32 = 659.25;
    const G5: f32 = 783.99;
    const C6: f32 = 1046.5;
    const E6: f32 = 1318.51;

    /// Audio manager for the hub
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        gate: CueGate,
    }

    impl AudioManager {
        pub fn new(volume: f32) -> Self {
            Self {
                ctx: None,
                gate: CueGate::new(volume),
            }
        }

        /// Create/resume the context. Must run inside a user gesture handler.
        pub fn unlock(&mut self) {
            if self.ctx.is_none() {
                self.ctx = AudioContext::new().ok();
                if self.ctx.is_none() {
                    log::warn!("Failed to create AudioContext - audio disabled");
                    return;
                }
                log::info!("Audio unlocked");
            }
            if let Some(ctx) = &self.ctx {
                if ctx.state() == AudioContextState::Suspended {
                    let _ = ctx.resume();
                }
            }
            self.gate.set_ready(true);
        }

        pub fn set_volume(&mut self, volume: f32) {
            self.gate.set_volume(volume);
        }

        /// Play a cue unless it is debounced or audio is not unlocked yet
        pub fn play(&mut self, cue: AudioCue, now_ms: f64) {
            if !self.gate.admit(cue, now_ms) {
                return;
            }
            let Some(ctx) = &self.ctx else { return };
            let vol = self.gate.volume() * 0.3;

            match cue {
                AudioCue::Shoot => tone(ctx, C5, OscillatorType::Square, vol, 0.06),
                AudioCue::Explode => play_explosion(ctx, vol),
                AudioCue::Powerup => chord(ctx, &[E5, G5, C6], OscillatorType::Square, vol, 0.12),
                AudioCue::Jump => tone(ctx, A4, OscillatorType::Square, vol, 0.03),
                AudioCue::Score => chord(ctx, &[C6, E6], OscillatorType::Square, vol, 0.06),
                AudioCue::Shield => chord(ctx, &[C3, C4], OscillatorType::Square, vol, 0.12),
                AudioCue::Missile => chord(ctx, &[C2, G2], OscillatorType::Square, vol, 0.25),
                AudioCue::BossHit => tone(ctx, G2, OscillatorType::Square, vol, 0.06),
            }
        }
    }

    /// Create an oscillator with gain envelope
    fn create_osc(ctx: &AudioContext, freq: f32, osc_type: OscillatorType) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Short plucked note with a fast decay
    fn tone(ctx: &AudioContext, freq: f32, osc_type: OscillatorType, vol: f32, duration: f64) {
        let Some((osc, gain)) = create_osc(ctx, freq, osc_type) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(0.001, t).ok();
        gain.gain().exponential_ramp_to_value_at_time(vol, t + 0.01).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.001, t + duration + 0.1)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + duration + 0.12).ok();
    }

    fn chord(ctx: &AudioContext, freqs: &[f32], osc_type: OscillatorType, vol: f32, duration: f64) {
        let per_voice = vol / freqs.len().max(1) as f32;
        for freq in freqs {
            tone(ctx, *freq, osc_type, per_voice, duration);
        }
    }

    /// Explosion - falling sawtooth with a short crack on top
    fn play_explosion(ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = create_osc(ctx, 100.0, OscillatorType::Sawtooth) {
            gain.gain().set_value_at_time(vol, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                .ok();
            osc.frequency().set_value_at_time(100.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(30.0, t + 0.25)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.3).ok();
        }

        if let Some((osc, gain)) = create_osc(ctx, 1500.0, OscillatorType::Square) {
            gain.gain().set_value_at_time(vol * 0.4, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.08)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.1).ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_until_ready() {
        let mut gate = CueGate::new(0.5);
        assert!(!gate.admit(AudioCue::Jump, 0.0));
        gate.set_ready(true);
        assert!(gate.admit(AudioCue::Jump, 0.0));
    }

    #[test]
    fn test_debounce_per_cue() {
        let mut gate = CueGate::new(0.5);
        gate.set_ready(true);

        assert!(gate.admit(AudioCue::Shoot, 1000.0));
        assert!(!gate.admit(AudioCue::Shoot, 1079.0));
        assert!(gate.admit(AudioCue::Shoot, 1080.0));

        // Other cues have their own clock and a shorter window
        assert!(gate.admit(AudioCue::Explode, 1080.0));
        assert!(!gate.admit(AudioCue::Explode, 1120.0));
        assert!(gate.admit(AudioCue::Explode, 1130.0));
    }

    #[test]
    fn test_muted_drops_everything() {
        let mut gate = CueGate::new(0.0);
        gate.set_ready(true);
        for cue in AudioCue::ALL {
            assert!(!gate.admit(cue, 0.0));
        }
        gate.set_volume(3.0);
        assert_eq!(gate.volume(), 1.0);
        assert!(gate.admit(AudioCue::Score, 0.0));
    }
}
