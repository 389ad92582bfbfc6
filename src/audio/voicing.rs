//! Voicing channel: narration through speech synthesis.

use super::tts::TtsProvider;
use super::AudioEvent;
use crate::accessibility::screen_reader::NarrationSink;
use crate::storage::config::VoicingSettings;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Narration sink that speaks every alert through a [`TtsProvider`].
///
/// New text cancels whatever is still being spoken. Provider failures are
/// logged and the text is dropped.
pub struct VoicingAnnouncer<P: TtsProvider> {
    provider: Arc<P>,
    event_tx: broadcast::Sender<AudioEvent>,
}

impl<P: TtsProvider> VoicingAnnouncer<P> {
    /// Create an announcer speaking through `provider`.
    pub fn new(provider: Arc<P>) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self { provider, event_tx }
    }

    /// Create an announcer and apply voice settings to `provider`.
    pub fn with_settings(provider: Arc<P>, settings: &VoicingSettings) -> Self {
        provider.set_rate(settings.rate);
        provider.set_volume(settings.volume);
        if let Some(voice) = &settings.preferred_voice {
            if let Err(e) = provider.set_voice(voice) {
                tracing::warn!("Keeping default voice: {}", e);
            }
        }
        Self::new(provider)
    }

    /// The provider speech is sent to.
    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    /// Subscribe to speech events.
    pub fn subscribe(&self) -> broadcast::Receiver<AudioEvent> {
        self.event_tx.subscribe()
    }
}

impl<P: TtsProvider> NarrationSink for VoicingAnnouncer<P> {
    fn announce(&mut self, text: &str) {
        if self.provider.is_speaking() {
            self.provider.stop();
        }

        match self.provider.speak(text) {
            Ok(()) => {
                let _ = self.event_tx.send(AudioEvent::SpeechStarted {
                    text: text.to_string(),
                });
            }
            Err(e) => {
                tracing::warn!("Voicing failed for '{}': {}", text, e);
                let _ = self.event_tx.send(AudioEvent::Error {
                    message: e.to_string(),
                });
            }
        }
    }
}
