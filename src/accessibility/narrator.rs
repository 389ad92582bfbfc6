//! Narration coordinator.
//!
//! Owns one announcement queue per output channel: descriptions go to live
//! regions read by a screen reader, voicing goes to speech synthesis. The two
//! channels are independent; an alert sent to one is never mirrored to the
//! other.

use super::clock::ClockTarget;
use super::queue::{AnnouncementQueue, QueueItem};
use super::screen_reader::NarrationSink;
use super::utterance::UtteranceOptions;
use crate::storage::config::NarrationConfig;
use std::time::Duration;

/// Text delivered on each channel during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub description: Option<String>,
    pub voicing: Option<String>,
}

impl TickOutcome {
    /// Check if nothing was delivered.
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.voicing.is_none()
    }
}

/// Coordinator owning the description and voicing queues.
pub struct Narrator<D, V> {
    description: AnnouncementQueue<D>,
    voicing: AnnouncementQueue<V>,
    options: UtteranceOptions,
    /// Per-channel gates from configuration
    description_allowed: bool,
    voicing_allowed: bool,
}

impl<D: NarrationSink, V: NarrationSink> Narrator<D, V> {
    /// Create a narrator with default queue settings.
    pub fn new(description_sink: D, voicing_sink: V) -> Self {
        Self::from_config(&NarrationConfig::default(), description_sink, voicing_sink)
    }

    /// Create a narrator configured from `config`.
    pub fn from_config(config: &NarrationConfig, description_sink: D, voicing_sink: V) -> Self {
        let options = config.queue.utterance_options();
        let description_allowed = config.description.enabled;
        let voicing_allowed = config.voicing.enabled;

        let mut description = AnnouncementQueue::with_defaults(description_sink, options.clone());
        description.set_enabled(config.queue.enabled && description_allowed);
        description.set_muted(config.queue.muted);

        let mut voicing = AnnouncementQueue::with_defaults(voicing_sink, options.clone());
        voicing.set_enabled(config.queue.enabled && voicing_allowed);
        voicing.set_muted(config.queue.muted);

        tracing::debug!(
            "Narrator ready (description {}, voicing {})",
            description.is_enabled(),
            voicing.is_enabled()
        );

        Self {
            description,
            voicing,
            options,
            description_allowed,
            voicing_allowed,
        }
    }

    /// Options seeded from configuration, for building custom utterances.
    pub fn utterance_options(&self) -> UtteranceOptions {
        self.options.clone()
    }

    /// Queue an alert on the description channel.
    pub fn alert_description(&mut self, item: impl Into<QueueItem>) {
        self.description.add_to_back(item);
    }

    /// Queue an alert on the voicing channel.
    pub fn alert_voicing(&mut self, item: impl Into<QueueItem>) {
        self.voicing.add_to_back(item);
    }

    /// Tick both channels.
    pub fn tick(&mut self, dt: Duration) -> TickOutcome {
        TickOutcome {
            description: self.description.tick(dt),
            voicing: self.voicing.tick(dt),
        }
    }

    /// Drop everything pending on both channels.
    pub fn clear(&mut self) {
        self.description.clear();
        self.voicing.clear();
    }

    /// Mute or unmute both channels.
    pub fn set_muted(&mut self, muted: bool) {
        self.description.set_muted(muted);
        self.voicing.set_muted(muted);
    }

    /// Enable or disable both channels. A channel switched off in the
    /// configuration stays off.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.description.set_enabled(enabled && self.description_allowed);
        self.voicing.set_enabled(enabled && self.voicing_allowed);
    }

    /// Check if both channels are drained.
    pub fn is_idle(&self) -> bool {
        self.description.is_empty() && self.voicing.is_empty()
    }

    /// The description queue.
    pub fn description(&self) -> &AnnouncementQueue<D> {
        &self.description
    }

    /// Mutable access to the description queue.
    pub fn description_mut(&mut self) -> &mut AnnouncementQueue<D> {
        &mut self.description
    }

    /// The voicing queue.
    pub fn voicing(&self) -> &AnnouncementQueue<V> {
        &self.voicing
    }

    /// Mutable access to the voicing queue.
    pub fn voicing_mut(&mut self) -> &mut AnnouncementQueue<V> {
        &mut self.voicing
    }
}

impl<D: NarrationSink, V: NarrationSink> ClockTarget for Narrator<D, V> {
    fn step(&mut self, dt: Duration) {
        self.tick(dt);
    }
}
