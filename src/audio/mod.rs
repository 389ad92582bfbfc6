//! Audio module: the voicing channel.
//!
//! Provides a text-to-speech seam and a narration sink that speaks queued
//! alerts.

pub mod tts;
pub mod voicing;

use thiserror::Error;

// Re-export main types
pub use tts::{DefaultTtsProvider, TtsProvider, MAX_RATE, MIN_RATE};
pub use voicing::VoicingAnnouncer;

/// Errors that can occur during audio operations
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Playback failed: {0}")]
    PlaybackFailed(String),

    #[error("Voice not available: {0}")]
    VoiceNotAvailable(String),
}

/// Audio events for monitoring
#[derive(Debug, Clone)]
pub enum AudioEvent {
    /// Speech started
    SpeechStarted { text: String },
    /// Audio error occurred
    Error { message: String },
}
