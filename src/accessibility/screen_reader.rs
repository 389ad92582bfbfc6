//! Narration sinks for screen reader output.
//!
//! A [`NarrationSink`] receives the resolved text of one utterance at a time.
//! The description channel renders through ARIA-style live regions
//! ([`LiveRegionAnnouncer`]); the voicing channel lives in
//! [`crate::audio::voicing`].

use crate::storage::config::DescriptionSettings;
use crossbeam::channel::Sender;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Number of live regions per politeness group.
pub const DEFAULT_LIVE_REGION_COUNT: usize = 4;

/// Consumer of resolved alert text.
pub trait NarrationSink {
    /// Render one alert. Called at most once per queue tick.
    fn announce(&mut self, text: &str);
}

impl<S: NarrationSink + ?Sized> NarrationSink for Box<S> {
    fn announce(&mut self, text: &str) {
        (**self).announce(text)
    }
}

/// Adapts a closure into a sink.
pub struct FnSink<F>(pub F);

impl<F> NarrationSink for FnSink<F>
where
    F: FnMut(&str),
{
    fn announce(&mut self, text: &str) {
        (self.0)(text)
    }
}

/// Sink that records every announcement; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    announcements: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    /// Create an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything announced so far.
    pub fn announcements(&self) -> Vec<String> {
        self.announcements.lock().clone()
    }

    /// Take and clear the recorded announcements.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.announcements.lock())
    }

    /// Number of recorded announcements.
    pub fn len(&self) -> usize {
        self.announcements.lock().len()
    }

    /// Check if nothing was announced.
    pub fn is_empty(&self) -> bool {
        self.announcements.lock().is_empty()
    }
}

impl NarrationSink for RecordingSink {
    fn announce(&mut self, text: &str) {
        self.announcements.lock().push(text.to_string());
    }
}

/// Sink forwarding announcements to another thread.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<String>,
}

impl ChannelSink {
    /// Create a sink sending each text over `tx`.
    pub fn new(tx: Sender<String>) -> Self {
        Self { tx }
    }
}

impl NarrationSink for ChannelSink {
    fn announce(&mut self, text: &str) {
        if self.tx.send(text.to_string()).is_err() {
            tracing::warn!("Narration channel closed, dropping: {}", text);
        }
    }
}

/// How urgently a live region is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Politeness {
    /// Read when the screen reader is idle
    #[default]
    Polite,
    /// Interrupts current speech
    Assertive,
}

/// Live region for dynamic content updates.
#[derive(Debug, Clone)]
pub struct LiveRegion {
    /// Content to be announced
    content: String,
    /// Politeness of this region
    politeness: Politeness,
    /// Whether content has changed since the host last rendered it
    dirty: bool,
}

impl LiveRegion {
    /// Create a new polite live region.
    pub fn new() -> Self {
        Self::with_politeness(Politeness::Polite)
    }

    /// Create an assertive (interrupting) live region.
    pub fn assertive() -> Self {
        Self::with_politeness(Politeness::Assertive)
    }

    fn with_politeness(politeness: Politeness) -> Self {
        Self {
            content: String::new(),
            politeness,
            dirty: false,
        }
    }

    /// Update the content (marks the region dirty if changed).
    pub fn set_content(&mut self, content: impl Into<String>) {
        let new_content = content.into();
        if self.content != new_content {
            self.content = new_content;
            self.dirty = true;
        }
    }

    /// Get the content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Check if content needs to be rendered.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark as rendered.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Politeness group this region belongs to.
    pub fn politeness(&self) -> Politeness {
        self.politeness
    }

    /// Check if this is an assertive region.
    pub fn is_assertive(&self) -> bool {
        self.politeness == Politeness::Assertive
    }
}

impl Default for LiveRegion {
    fn default() -> Self {
        Self::new()
    }
}

/// A pending write the host must apply to its live-region element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionUpdate {
    pub politeness: Politeness,
    /// Index of the region inside its politeness group
    pub index: usize,
    /// New content; empty when the region is being cleared
    pub content: String,
}

/// Description channel backed by rotating live regions.
///
/// Each announcement clears the previously written region and writes the
/// text into the next one, so that announcing the same text twice still
/// produces a content change the screen reader will read.
#[derive(Debug)]
pub struct LiveRegionAnnouncer {
    polite: Vec<LiveRegion>,
    assertive: Vec<LiveRegion>,
    politeness: Politeness,
    next_polite: usize,
    next_assertive: usize,
    last_written: Option<(Politeness, usize)>,
}

impl Default for LiveRegionAnnouncer {
    fn default() -> Self {
        Self::new(DEFAULT_LIVE_REGION_COUNT)
    }
}

impl LiveRegionAnnouncer {
    /// Create an announcer with `count` regions per politeness group.
    pub fn new(count: usize) -> Self {
        let count = count.max(1);
        Self {
            polite: (0..count).map(|_| LiveRegion::new()).collect(),
            assertive: (0..count).map(|_| LiveRegion::assertive()).collect(),
            politeness: Politeness::Polite,
            next_polite: 0,
            next_assertive: 0,
            last_written: None,
        }
    }

    /// Create an announcer sized from description settings.
    pub fn with_settings(settings: &DescriptionSettings) -> Self {
        Self::new(settings.live_region_count)
    }

    /// Politeness used for subsequent announcements.
    pub fn set_politeness(&mut self, politeness: Politeness) {
        self.politeness = politeness;
    }

    /// Politeness used for the next announcement.
    pub fn politeness(&self) -> Politeness {
        self.politeness
    }

    /// Regions of one politeness group.
    pub fn regions(&self, politeness: Politeness) -> &[LiveRegion] {
        match politeness {
            Politeness::Polite => &self.polite,
            Politeness::Assertive => &self.assertive,
        }
    }

    /// Content of the region written most recently.
    pub fn current(&self) -> Option<&str> {
        self.last_written
            .map(|(politeness, index)| self.regions(politeness)[index].content())
    }

    /// Collect pending region writes and mark them rendered.
    pub fn drain_updates(&mut self) -> Vec<RegionUpdate> {
        let mut updates = Vec::new();
        for (politeness, regions) in [
            (Politeness::Polite, &mut self.polite),
            (Politeness::Assertive, &mut self.assertive),
        ] {
            for (index, region) in regions.iter_mut().enumerate() {
                if region.is_dirty() {
                    updates.push(RegionUpdate {
                        politeness,
                        index,
                        content: region.content().to_string(),
                    });
                    region.mark_clean();
                }
            }
        }
        updates
    }

    fn region_mut(&mut self, politeness: Politeness, index: usize) -> &mut LiveRegion {
        match politeness {
            Politeness::Polite => &mut self.polite[index],
            Politeness::Assertive => &mut self.assertive[index],
        }
    }
}

impl NarrationSink for LiveRegionAnnouncer {
    fn announce(&mut self, text: &str) {
        if let Some((politeness, index)) = self.last_written.take() {
            self.region_mut(politeness, index).set_content("");
        }

        let politeness = self.politeness;
        let index = match politeness {
            Politeness::Polite => {
                let index = self.next_polite;
                self.next_polite = (index + 1) % self.polite.len();
                index
            }
            Politeness::Assertive => {
                let index = self.next_assertive;
                self.next_assertive = (index + 1) % self.assertive.len();
                index
            }
        };

        self.region_mut(politeness, index).set_content(text);
        self.last_written = Some((politeness, index));
        tracing::debug!("Live region {:?}[{}] announce: {}", politeness, index, text);
    }
}
