//! Text-to-Speech Provider
//!
//! Speech engines sit behind [`TtsProvider`] so the voicing channel can be
//! driven without a platform synthesizer.

use super::AudioError;
use parking_lot::Mutex;

/// Slowest accepted speech rate.
pub const MIN_RATE: f32 = 0.5;
/// Fastest accepted speech rate.
pub const MAX_RATE: f32 = 2.0;

/// The speech operations the voicing channel relies on.
pub trait TtsProvider: Send + Sync {
    /// Speak text
    fn speak(&self, text: &str) -> Result<(), AudioError>;

    /// Stop current speech
    fn stop(&self);

    /// Check if currently speaking
    fn is_speaking(&self) -> bool;

    /// Set speech rate, clamped to `MIN_RATE..=MAX_RATE`
    fn set_rate(&self, rate: f32);

    /// Set volume, clamped to `0.0..=1.0`
    fn set_volume(&self, volume: f32);

    /// Select a voice by name
    fn set_voice(&self, voice: &str) -> Result<(), AudioError>;
}

#[derive(Debug)]
struct Speech {
    rate: f32,
    volume: f32,
    voice: Option<String>,
    speaking: bool,
    transcript: Vec<String>,
}

/// Engine-less provider that keeps a transcript of everything it was asked
/// to say.
///
/// Speech is considered in progress from `speak` until `stop`.
#[derive(Debug)]
pub struct DefaultTtsProvider {
    voices: Vec<String>,
    state: Mutex<Speech>,
}

impl Default for DefaultTtsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultTtsProvider {
    /// Create a provider offering only the `"default"` voice.
    pub fn new() -> Self {
        Self::with_voices(["default"])
    }

    /// Create a provider offering the named voices.
    pub fn with_voices<I, S>(voices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            voices: voices.into_iter().map(Into::into).collect(),
            state: Mutex::new(Speech {
                rate: 1.0,
                volume: 1.0,
                voice: None,
                speaking: false,
                transcript: Vec::new(),
            }),
        }
    }

    /// Everything spoken so far, oldest first.
    pub fn spoken(&self) -> Vec<String> {
        self.state.lock().transcript.clone()
    }

    /// Current speech rate.
    pub fn rate(&self) -> f32 {
        self.state.lock().rate
    }

    /// Current volume.
    pub fn volume(&self) -> f32 {
        self.state.lock().volume
    }

    /// Selected voice, `None` while on the engine default.
    pub fn voice(&self) -> Option<String> {
        self.state.lock().voice.clone()
    }
}

impl TtsProvider for DefaultTtsProvider {
    fn speak(&self, text: &str) -> Result<(), AudioError> {
        if text.is_empty() {
            return Ok(());
        }

        let mut state = self.state.lock();
        tracing::debug!(
            "TTS speaking at rate {:.2}, volume {:.2}: {}",
            state.rate,
            state.volume,
            text
        );
        state.transcript.push(text.to_string());
        state.speaking = true;
        Ok(())
    }

    fn stop(&self) {
        self.state.lock().speaking = false;
    }

    fn is_speaking(&self) -> bool {
        self.state.lock().speaking
    }

    fn set_rate(&self, rate: f32) {
        self.state.lock().rate = rate.clamp(MIN_RATE, MAX_RATE);
    }

    fn set_volume(&self, volume: f32) {
        self.state.lock().volume = volume.clamp(0.0, 1.0);
    }

    fn set_voice(&self, voice: &str) -> Result<(), AudioError> {
        if !self.voices.iter().any(|known| known == voice) {
            return Err(AudioError::VoiceNotAvailable(voice.to_string()));
        }
        self.state.lock().voice = Some(voice.to_string());
        Ok(())
    }
}
