//! Announcement queue.
//!
//! Holds pending utterances in insertion order and, on every clock tick,
//! delivers at most one of them to a [`NarrationSink`]. Delivery waits until
//! an utterance has been left alone for its stability delay, or until it has
//! been waiting longer than its maximum delay.

use super::alertable::{Alertable, TextSequence};
use super::screen_reader::NarrationSink;
use super::utterance::{Utterance, UtteranceOptions};
use std::time::Duration;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Capacity of the queue event channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Something that can be placed in the queue.
#[derive(Debug, Clone)]
pub enum QueueItem {
    /// Raw alert; wrapped with the queue's default options
    Alert(Alertable),
    /// Caller-owned utterance, compared by identity
    Utterance(Utterance),
}

impl From<&str> for QueueItem {
    fn from(text: &str) -> Self {
        QueueItem::Alert(Alertable::text(text))
    }
}

impl From<String> for QueueItem {
    fn from(text: String) -> Self {
        QueueItem::Alert(Alertable::OneShot(text))
    }
}

impl From<Alertable> for QueueItem {
    fn from(alertable: Alertable) -> Self {
        QueueItem::Alert(alertable)
    }
}

impl From<TextSequence> for QueueItem {
    fn from(sequence: TextSequence) -> Self {
        QueueItem::Alert(Alertable::ClampRepeat(sequence))
    }
}

impl From<Utterance> for QueueItem {
    fn from(utterance: Utterance) -> Self {
        QueueItem::Utterance(utterance)
    }
}

impl From<&Utterance> for QueueItem {
    fn from(utterance: &Utterance) -> Self {
        QueueItem::Utterance(utterance.clone())
    }
}

/// Events published by the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    /// Text resolved from an utterance; `muted` means the sink was skipped
    Announced { id: Uuid, text: String, muted: bool },
    /// Utterance dropped because its predicate failed
    Suppressed { id: Uuid },
    /// Queue cleared with `dropped` pending utterances
    Cleared { dropped: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Front,
    Back,
}

/// Ordered, tick-driven scheduler feeding a narration sink.
pub struct AnnouncementQueue<S> {
    entries: Vec<Utterance>,
    sink: S,
    /// Options applied to raw alerts
    defaults: UtteranceOptions,
    muted: bool,
    enabled: bool,
    event_tx: broadcast::Sender<QueueEvent>,
}

impl<S: NarrationSink> AnnouncementQueue<S> {
    /// Create an enabled, unmuted queue delivering to `sink`.
    pub fn new(sink: S) -> Self {
        Self::with_defaults(sink, UtteranceOptions::default())
    }

    /// Create a queue whose raw alerts use `defaults` for timing and gating.
    ///
    /// The looping flag of `defaults` is ignored; raw alerts carry their own
    /// delivery policy.
    pub fn with_defaults(sink: S, defaults: UtteranceOptions) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            entries: Vec::new(),
            sink,
            defaults,
            muted: false,
            enabled: true,
            event_tx,
        }
    }

    /// Queue `item` behind everything already pending.
    pub fn add_to_back(&mut self, item: impl Into<QueueItem>) {
        self.insert(item.into(), Position::Back);
    }

    /// Queue `item` ahead of everything already pending.
    ///
    /// The utterance still waits out its own stability delay.
    pub fn add_to_front(&mut self, item: impl Into<QueueItem>) {
        self.insert(item.into(), Position::Front);
    }

    /// Deliver `item` now, skipping the stability delay.
    ///
    /// A queued copy of the same utterance is removed first. Sequences with
    /// text left to deliver are put back at the front of the queue. Returns
    /// the resolved text, or `None` if the queue is disabled or the predicate
    /// failed.
    pub fn announce_immediately(&mut self, item: impl Into<QueueItem>) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let utterance = self.prepare(item.into());
        if !utterance.predicate_passes() {
            self.suppressed(&utterance);
            return None;
        }

        let text = self.emit(&utterance);
        if !utterance.is_exhausted() {
            utterance.reset_time_in_queue();
            self.entries.insert(0, utterance);
        }
        Some(text)
    }

    /// Advance every entry by `dt` and deliver at most one eligible utterance.
    ///
    /// Entries are scanned in insertion order and each is judged on its own,
    /// so an utterance still settling at the head does not hold back a stable
    /// one behind it. Returns the resolved text, also when muted.
    pub fn tick(&mut self, dt: Duration) -> Option<String> {
        if !self.enabled {
            return None;
        }

        for utterance in &self.entries {
            utterance.age(dt);
        }

        let mut index = 0;
        while index < self.entries.len() {
            if !self.entries[index].is_eligible() {
                index += 1;
                continue;
            }

            let utterance = self.entries[index].clone();
            if !utterance.predicate_passes() {
                self.entries.remove(index);
                self.suppressed(&utterance);
                continue;
            }

            let text = self.emit(&utterance);
            if utterance.is_exhausted() {
                self.entries.remove(index);
            } else {
                // Keep stable time so a loop does not re-debounce between steps.
                utterance.reset_time_in_queue();
            }
            return Some(text);
        }

        None
    }

    /// Drop every pending utterance without delivering it.
    pub fn clear(&mut self) {
        let dropped = self.entries.len();
        if dropped == 0 {
            return;
        }
        self.entries.clear();
        tracing::debug!("Announcement queue cleared, dropped {} utterances", dropped);
        let _ = self.event_tx.send(QueueEvent::Cleared { dropped });
    }

    /// Whether this exact utterance is pending.
    pub fn has_entry(&self, utterance: &Utterance) -> bool {
        self.position_of(utterance).is_some()
    }

    /// Mute or unmute delivery. Aging continues while muted.
    pub fn set_muted(&mut self, muted: bool) {
        if self.muted != muted {
            tracing::info!("Announcement queue {}", if muted { "muted" } else { "unmuted" });
        }
        self.muted = muted;
    }

    /// Check if delivery is muted.
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Enable or disable the queue. A disabled queue ignores insertions and
    /// ticks but keeps what it already holds.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            tracing::info!(
                "Announcement queue {}",
                if enabled { "enabled" } else { "disabled" }
            );
        }
        self.enabled = enabled;
    }

    /// Check if the queue accepts insertions and ticks.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of pending utterances.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pending utterances in queue order.
    pub fn iter(&self) -> impl Iterator<Item = &Utterance> {
        self.entries.iter()
    }

    /// Options applied to raw alerts.
    pub fn defaults(&self) -> &UtteranceOptions {
        &self.defaults
    }

    /// The sink receiving delivered text.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable access to the sink, e.g. to drain rendered updates.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Subscribe to queue events.
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.event_tx.subscribe()
    }

    fn insert(&mut self, item: QueueItem, position: Position) {
        if !self.enabled {
            tracing::trace!("Announcement queue disabled, ignoring insertion");
            return;
        }

        let utterance = self.prepare(item);
        match position {
            Position::Back => self.entries.push(utterance),
            Position::Front => self.entries.insert(0, utterance),
        }
    }

    /// Resolve `item` to an utterance and pull any queued copy of it.
    ///
    /// Re-inserting a queued instance restarts only its stability clock, so
    /// its residency keeps counting toward the maximum delay. A raw alert
    /// equal to a queued raw alert takes over that entry with its delivery
    /// count reset.
    fn prepare(&mut self, item: QueueItem) -> Utterance {
        let utterance = match item {
            QueueItem::Utterance(utterance) => utterance,
            QueueItem::Alert(alertable) => {
                let queued = self
                    .entries
                    .iter()
                    .find(|queued| queued.is_implicit() && *queued.alertable() == alertable)
                    .cloned();
                match queued {
                    // A repeated raw alert starts its sequence over.
                    Some(queued) => {
                        queued.reset_delivery_state();
                        queued
                    }
                    None => Utterance::implicit(alertable, &self.defaults),
                }
            }
        };

        match self.position_of(&utterance) {
            Some(index) => {
                self.entries.remove(index);
                utterance.reset_stable_time();
                tracing::debug!("Coalesced utterance {} ({})", utterance.id(), utterance.alertable());
            }
            None => utterance.reset_aging(),
        }
        utterance
    }

    fn position_of(&self, utterance: &Utterance) -> Option<usize> {
        self.entries.iter().position(|queued| queued.same_as(utterance))
    }

    /// Resolve the next text of `utterance` and hand it to the sink.
    fn emit(&mut self, utterance: &Utterance) -> String {
        let text = utterance.resolve_next_text();
        if self.muted {
            tracing::debug!("Muted, not announcing: {}", text);
        } else {
            tracing::debug!("Announce: {}", text);
            self.sink.announce(&text);
        }
        let _ = self.event_tx.send(QueueEvent::Announced {
            id: utterance.id(),
            text: text.clone(),
            muted: self.muted,
        });
        text
    }

    fn suppressed(&self, utterance: &Utterance) {
        tracing::debug!("Predicate suppressed utterance {}", utterance.id());
        let _ = self
            .event_tx
            .send(QueueEvent::Suppressed { id: utterance.id() });
    }
}
