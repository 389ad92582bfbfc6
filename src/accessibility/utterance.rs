//! Utterances: alerts plus delivery policy and queue bookkeeping.
//!
//! An [`Utterance`] is a handle. Cloning it yields the same instance, which is
//! what the announcement queue compares when coalescing re-insertions.

use super::alertable::{AlertContent, Alertable, DeliveryPolicy};
use super::AccessibilityError;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Default quiet time before an utterance may be delivered.
pub const DEFAULT_STABILITY_DELAY: Duration = Duration::from_millis(200);

/// Gate evaluated at the moment of delivery.
pub type Predicate = Arc<dyn Fn() -> bool + Send + Sync>;

/// Construction options for an [`Utterance`].
#[derive(Clone)]
pub struct UtteranceOptions {
    /// Cycle through sequence content instead of clamping on the last text
    pub looping: bool,
    /// Delivery gate; `None` always passes
    pub predicate: Option<Predicate>,
    /// Quiet time required after the latest insertion
    pub stability_delay: Duration,
    /// Residency after which delivery is forced; `None` is unbounded
    pub max_delay: Option<Duration>,
}

impl Default for UtteranceOptions {
    fn default() -> Self {
        Self {
            looping: false,
            predicate: None,
            stability_delay: DEFAULT_STABILITY_DELAY,
            max_delay: None,
        }
    }
}

impl UtteranceOptions {
    /// Set looping.
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Set the delivery predicate.
    pub fn with_predicate(mut self, predicate: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Set the stability delay.
    pub fn with_stability_delay(mut self, delay: Duration) -> Self {
        self.stability_delay = delay;
        self
    }

    /// Set the maximum delay.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }
}

impl fmt::Debug for UtteranceOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UtteranceOptions")
            .field("looping", &self.looping)
            .field("has_predicate", &self.predicate.is_some())
            .field("stability_delay", &self.stability_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

/// Mutable bookkeeping shared by every clone of an utterance.
#[derive(Debug, Default, Clone, Copy)]
struct UtteranceState {
    delivery_count: usize,
    time_in_queue: Duration,
    stable_time: Duration,
}

struct UtteranceInner {
    id: Uuid,
    alertable: Alertable,
    predicate: Option<Predicate>,
    stability_delay: Duration,
    max_delay: Option<Duration>,
    /// Created by the queue from a raw alert rather than by a caller
    implicit: bool,
    state: Mutex<UtteranceState>,
}

/// An alert together with its delivery policy and aging counters.
#[derive(Clone)]
pub struct Utterance {
    inner: Arc<UtteranceInner>,
}

impl Utterance {
    /// Create an utterance with default options.
    pub fn new(alertable: impl Into<Alertable>) -> Self {
        Self::build(alertable.into(), UtteranceOptions::default(), false)
    }

    /// Create an utterance from raw content and options.
    ///
    /// Fails with [`AccessibilityError::InvalidConfiguration`] when looping is
    /// requested for single-text content or the sequence is empty.
    pub fn with_options(
        content: impl Into<AlertContent>,
        options: UtteranceOptions,
    ) -> Result<Self, AccessibilityError> {
        let alertable = Alertable::from_content(content.into(), options.looping)?;
        Ok(Self::build(alertable, options, false))
    }

    /// Wrap a raw alert the way the queue does for bare text insertions.
    pub(crate) fn implicit(alertable: Alertable, options: &UtteranceOptions) -> Self {
        Self::build(alertable, options.clone(), true)
    }

    fn build(alertable: Alertable, options: UtteranceOptions, implicit: bool) -> Self {
        Self {
            inner: Arc::new(UtteranceInner {
                id: Uuid::new_v4(),
                alertable,
                predicate: options.predicate,
                stability_delay: options.stability_delay,
                max_delay: options.max_delay,
                implicit,
                state: Mutex::new(UtteranceState::default()),
            }),
        }
    }

    /// Identifier used in logs and queue events.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// The alert content.
    pub fn alertable(&self) -> &Alertable {
        &self.inner.alertable
    }

    /// Delivery policy of the content.
    pub fn policy(&self) -> DeliveryPolicy {
        self.inner.alertable.policy()
    }

    /// Whether sequence content wraps around.
    pub fn is_looping(&self) -> bool {
        self.policy() == DeliveryPolicy::Cycle
    }

    /// Quiet period required before delivery.
    pub fn stability_delay(&self) -> Duration {
        self.inner.stability_delay
    }

    /// Residency after which delivery no longer waits for stability.
    pub fn max_delay(&self) -> Option<Duration> {
        self.inner.max_delay
    }

    /// Number of texts resolved so far.
    pub fn delivery_count(&self) -> usize {
        self.inner.state.lock().delivery_count
    }

    /// Residency since insertion or since the last delivery.
    pub fn time_in_queue(&self) -> Duration {
        self.inner.state.lock().time_in_queue
    }

    /// Time since the latest insertion of this instance.
    pub fn stable_time(&self) -> Duration {
        self.inner.state.lock().stable_time
    }

    /// Whether `other` is the same instance.
    pub fn same_as(&self, other: &Utterance) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Return the text to deliver now and count the delivery.
    ///
    /// Call at most once per actual delivery.
    pub fn resolve_next_text(&self) -> String {
        let mut state = self.inner.state.lock();
        let text = self.inner.alertable.text_at(state.delivery_count).to_string();
        state.delivery_count += 1;
        text
    }

    /// Zero both aging counters.
    pub fn reset_aging(&self) {
        let mut state = self.inner.state.lock();
        state.time_in_queue = Duration::ZERO;
        state.stable_time = Duration::ZERO;
    }

    /// Restart sequence delivery from the first text.
    pub fn reset_delivery_state(&self) {
        self.inner.state.lock().delivery_count = 0;
    }

    /// True once the stability delay has elapsed since the latest insertion.
    pub fn is_stable(&self) -> bool {
        self.inner.state.lock().stable_time >= self.inner.stability_delay
    }

    /// True once the maximum delay has been reached.
    pub fn is_overdue(&self) -> bool {
        match self.inner.max_delay {
            Some(max_delay) => self.inner.state.lock().time_in_queue >= max_delay,
            None => false,
        }
    }

    /// Stable or overdue.
    pub fn is_eligible(&self) -> bool {
        self.is_stable() || self.is_overdue()
    }

    pub(crate) fn is_implicit(&self) -> bool {
        self.inner.implicit
    }

    /// Evaluate the predicate. Panics inside it propagate to the caller.
    pub(crate) fn predicate_passes(&self) -> bool {
        match &self.inner.predicate {
            Some(predicate) => predicate(),
            None => true,
        }
    }

    /// Whether the content has nothing left to deliver.
    pub(crate) fn is_exhausted(&self) -> bool {
        self.inner
            .alertable
            .is_exhausted_after(self.delivery_count())
    }

    pub(crate) fn age(&self, dt: Duration) {
        let mut state = self.inner.state.lock();
        state.time_in_queue = state.time_in_queue.saturating_add(dt);
        state.stable_time = state.stable_time.saturating_add(dt);
    }

    pub(crate) fn reset_stable_time(&self) {
        self.inner.state.lock().stable_time = Duration::ZERO;
    }

    pub(crate) fn reset_time_in_queue(&self) {
        self.inner.state.lock().time_in_queue = Duration::ZERO;
    }
}

impl fmt::Debug for Utterance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = *self.inner.state.lock();
        f.debug_struct("Utterance")
            .field("id", &self.inner.id)
            .field("alertable", &self.inner.alertable)
            .field("stability_delay", &self.inner.stability_delay)
            .field("max_delay", &self.inner.max_delay)
            .field("delivery_count", &state.delivery_count)
            .field("time_in_queue", &state.time_in_queue)
            .field("stable_time", &state.stable_time)
            .finish()
    }
}
