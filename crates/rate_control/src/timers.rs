//! Cancellable timer handles and the cleanup registry
//!
//! Timers run as Tokio tasks. A [`TimerHandle`] is the only way to reach a
//! scheduled timer after it is created; the [`TimerRegistry`] collects
//! handles so they can all be cancelled at a single teardown point.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Shortest period an interval timer will tick at.
pub const MIN_INTERVAL_PERIOD: Duration = Duration::from_millis(1);

static NEXT_TIMER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a timer. Clones of a handle share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    fn next() -> Self {
        Self(NEXT_TIMER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value, for logging.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Whether a timer fires once or repeatedly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Fires once after a delay
    Timeout,
    /// Fires repeatedly at a fixed period
    Interval,
}

/// Something that can stop a scheduled timer.
pub trait Cancel: Send + Sync {
    /// Stop the timer. A no-op if it already fired or was already cancelled.
    fn cancel(&self);

    /// Whether the timer can no longer fire.
    fn is_finished(&self) -> bool;
}

impl Cancel for AbortHandle {
    fn cancel(&self) {
        self.abort();
    }

    fn is_finished(&self) -> bool {
        AbortHandle::is_finished(self)
    }
}

/// Opaque handle to a scheduled timeout or interval.
#[derive(Clone)]
pub struct TimerHandle {
    id: TimerId,
    kind: TimerKind,
    inner: Arc<dyn Cancel>,
}

impl TimerHandle {
    /// Wrap a cancellation capability from any timer facility.
    pub fn new(kind: TimerKind, inner: impl Cancel + 'static) -> Self {
        Self {
            id: TimerId::next(),
            kind,
            inner: Arc::new(inner),
        }
    }

    /// Run `callback` once, `delay` from now.
    ///
    /// A delay too large to express as a deadline never fires.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn timeout<F>(delay: Duration, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let deadline = Instant::now().checked_add(delay);
        let task = tokio::spawn(async move {
            sleep_until_or_forever(deadline).await;
            callback();
        });
        Self::new(TimerKind::Timeout, task.abort_handle())
    }

    /// Run `callback` every `period`, first after one period has elapsed.
    ///
    /// Periods shorter than [`MIN_INTERVAL_PERIOD`] are raised to it. A
    /// period too large to express as a deadline never ticks.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn interval<F>(period: Duration, mut callback: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let period = period.max(MIN_INTERVAL_PERIOD);
        let start = Instant::now().checked_add(period);

        let task = tokio::spawn(async move {
            let Some(start) = start else {
                return std::future::pending::<()>().await;
            };
            let mut ticker = tokio::time::interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                callback();
            }
        });
        Self::new(TimerKind::Interval, task.abort_handle())
    }

    /// Identity of this timer.
    pub fn id(&self) -> TimerId {
        self.id
    }

    /// Whether this is a timeout or an interval.
    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    /// Stop the timer.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    /// Whether the timer can no longer fire.
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }
}

impl std::fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerHandle")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Outstanding timers that must be cancelled at teardown.
///
/// Callers register every timer they create and call [`clear_all`](Self::clear_all)
/// when the owning view goes away. Dropping the registry cancels nothing.
#[derive(Debug, Default)]
pub struct TimerRegistry {
    sets: Mutex<TimerSets>,
}

#[derive(Debug, Default)]
struct TimerSets {
    intervals: HashMap<TimerId, TimerHandle>,
    timeouts: HashMap<TimerId, TimerHandle>,
}

impl TimerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Track an interval timer. Returns `false` if it was already tracked.
    pub fn register_interval(&self, handle: TimerHandle) -> bool {
        insert_once(&mut self.sets().intervals, handle)
    }

    /// Track a timeout. Returns `false` if it was already tracked.
    pub fn register_timeout(&self, handle: TimerHandle) -> bool {
        insert_once(&mut self.sets().timeouts, handle)
    }

    /// Schedule a timeout and track it.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn set_timeout<F>(&self, delay: Duration, callback: F) -> TimerHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = TimerHandle::timeout(delay, callback);
        self.register_timeout(handle.clone());
        handle
    }

    /// Schedule an interval and track it.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn set_interval<F>(&self, period: Duration, callback: F) -> TimerHandle
    where
        F: FnMut() + Send + 'static,
    {
        let handle = TimerHandle::interval(period, callback);
        self.register_interval(handle.clone());
        handle
    }

    /// Cancel every tracked timer and empty both sets.
    ///
    /// Returns how many handles were drained.
    pub fn clear_all(&self) -> usize {
        let (intervals, timeouts) = {
            let mut sets = self.sets();
            (
                std::mem::take(&mut sets.intervals),
                std::mem::take(&mut sets.timeouts),
            )
        };

        for handle in intervals.values().chain(timeouts.values()) {
            handle.cancel();
        }

        tracing::trace!(
            target: "rate_control::timers",
            intervals = intervals.len(),
            timeouts = timeouts.len(),
            "timers cleared"
        );

        intervals.len() + timeouts.len()
    }

    /// Forget handles whose timers can no longer fire.
    ///
    /// Returns how many handles were removed.
    pub fn prune_finished(&self) -> usize {
        let mut sets = self.sets();
        let before = sets.intervals.len() + sets.timeouts.len();
        sets.intervals.retain(|_, handle| !handle.is_finished());
        sets.timeouts.retain(|_, handle| !handle.is_finished());
        before - (sets.intervals.len() + sets.timeouts.len())
    }

    /// Whether a timer is tracked.
    pub fn contains(&self, id: TimerId) -> bool {
        let sets = self.sets();
        sets.intervals.contains_key(&id) || sets.timeouts.contains_key(&id)
    }

    /// Number of tracked intervals.
    pub fn interval_count(&self) -> usize {
        self.sets().intervals.len()
    }

    /// Number of tracked timeouts.
    pub fn timeout_count(&self) -> usize {
        self.sets().timeouts.len()
    }

    /// Total number of tracked timers.
    pub fn len(&self) -> usize {
        let sets = self.sets();
        sets.intervals.len() + sets.timeouts.len()
    }

    /// Whether no timers are tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn sets(&self) -> MutexGuard<'_, TimerSets> {
        self.sets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn insert_once(set: &mut HashMap<TimerId, TimerHandle>, handle: TimerHandle) -> bool {
    match set.entry(handle.id()) {
        Entry::Occupied(_) => false,
        Entry::Vacant(slot) => {
            slot.insert(handle);
            true
        }
    }
}

async fn sleep_until_or_forever(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
