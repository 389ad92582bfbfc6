//! Clock driver for announcement queues.
//!
//! Queues never run timers of their own. Something outside calls
//! [`ClockTarget::step`] with the elapsed time; [`ClockDriver`] does that from
//! a tokio task for hosts without a frame loop.

use super::queue::AnnouncementQueue;
use super::screen_reader::NarrationSink;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Default delivery-check cadence.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Anything advanced by a clock.
pub trait ClockTarget {
    /// Advance by `dt`.
    fn step(&mut self, dt: Duration);
}

impl<S: NarrationSink> ClockTarget for AnnouncementQueue<S> {
    fn step(&mut self, dt: Duration) {
        self.tick(dt);
    }
}

/// A value shared between the clock task and its callers.
pub type Shared<T> = Arc<Mutex<T>>;

/// Wrap `value` for use with [`ClockDriver`].
pub fn shared<T>(value: T) -> Shared<T> {
    Arc::new(Mutex::new(value))
}

/// Periodically steps a shared clock target.
#[derive(Debug, Clone, Copy)]
pub struct ClockDriver {
    interval: Duration,
}

impl Default for ClockDriver {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

impl ClockDriver {
    /// Create a driver ticking every `interval` (at least one millisecond).
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    /// Period between steps.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn the clock task on the current tokio runtime.
    ///
    /// Each tick passes the measured time since the previous tick, not the
    /// nominal interval.
    pub fn spawn<T>(self, target: Shared<T>) -> ClockHandle
    where
        T: ClockTarget + Send + 'static,
    {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let period = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            let mut last = Instant::now();

            tracing::debug!("Clock driver started ({:?} interval)", period);
            loop {
                tokio::select! {
                    now = ticker.tick() => {
                        let dt = now.saturating_duration_since(last);
                        last = now;
                        tracing::trace!("Clock tick {:?}", dt);
                        target.lock().step(dt);
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("Clock driver stopped");
        });

        ClockHandle {
            stop_tx,
            task: Some(task),
        }
    }
}

/// Handle to a running clock task.
#[derive(Debug)]
pub struct ClockHandle {
    stop_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl ClockHandle {
    /// Stop the clock and wait for the task to finish.
    pub async fn stop(mut self) {
        let _ = self.stop_tx.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("Clock task ended abnormally: {}", e);
            }
        }
    }

    /// Check if the clock task is still running.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for ClockHandle {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(true);
    }
}
