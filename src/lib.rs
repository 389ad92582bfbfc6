//! utterance-queue - Alert narration for interactive simulations
//!
//! Feeds short text alerts to screen readers and speech synthesis in a
//! controlled, non-spammy order. Alerts are debounced until stable, forced
//! out after a maximum delay, can loop through multi-part messages, and can
//! be suppressed at the last moment by a predicate. Everything is driven by
//! a discrete clock tick.

pub mod accessibility;
pub mod audio;
pub mod storage;

// Re-export commonly used types
pub use accessibility::narrator::Narrator;
pub use accessibility::queue::AnnouncementQueue;
pub use accessibility::utterance::{Utterance, UtteranceOptions};
pub use storage::config::NarrationConfig;
