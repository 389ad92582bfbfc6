//! Accessibility module: alert narration for assistive technology.
//!
//! This module provides:
//! - Alert payloads and utterances with debounce and max-delay policies
//! - The tick-driven announcement queue
//! - Narration sinks (live regions, recording, channels)
//! - A narrator coordinating description and voicing channels
//! - A tokio clock driver

pub mod alertable;
pub mod clock;
pub mod narrator;
pub mod queue;
pub mod screen_reader;
pub mod utterance;

use thiserror::Error;

// Re-export primary types
pub use alertable::{AlertContent, Alertable, DeliveryPolicy, TextSequence};
pub use clock::{shared, ClockDriver, ClockHandle, ClockTarget, Shared};
pub use narrator::{Narrator, TickOutcome};
pub use queue::{AnnouncementQueue, QueueEvent, QueueItem};
pub use screen_reader::{
    ChannelSink, FnSink, LiveRegion, LiveRegionAnnouncer, NarrationSink, Politeness,
    RecordingSink, RegionUpdate,
};
pub use utterance::{Predicate, Utterance, UtteranceOptions, DEFAULT_STABILITY_DELAY};

/// Errors raised while building alerts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessibilityError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
