//! Leading-edge throttling for high-frequency callbacks
//!
//! A throttled function runs on the first call of every interval. Calls that
//! arrive before the interval has elapsed are dropped, not deferred.

use std::time::Duration;
use tokio::time::Instant;

/// Admits at most one event per interval, leading edge.
#[derive(Debug, Clone)]
pub struct RateGate {
    interval: Duration,
    last_admitted: Option<Instant>,
}

impl RateGate {
    /// Create a gate that has admitted nothing yet.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_admitted: None,
        }
    }

    /// Try to pass through the gate now.
    #[inline]
    pub fn try_acquire(&mut self) -> bool {
        self.try_acquire_at(Instant::now())
    }

    /// Try to pass through the gate at `now`.
    ///
    /// Admits when nothing was admitted before or at least one interval has
    /// elapsed since the last admission, and records `now` as the new
    /// admission time.
    pub fn try_acquire_at(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_admitted {
            if now.saturating_duration_since(last) < self.interval {
                return false;
            }
        }
        self.last_admitted = Some(now);
        true
    }

    /// The configured interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// When the gate last admitted an event.
    pub fn last_admitted(&self) -> Option<Instant> {
        self.last_admitted
    }

    /// Forget the last admission so the next attempt passes.
    pub fn reset(&mut self) {
        self.last_admitted = None;
    }
}

/// A function wrapped so it runs at most once per interval.
///
/// Arguments are passed as a single value; use a tuple for several.
///
/// # Example
///
/// ```rust
/// use rate_control::throttle;
/// use std::time::Duration;
///
/// let mut on_resize = throttle(|width: f64| width * 2.0, Duration::from_secs(60));
///
/// assert_eq!(on_resize.call(10.0), Some(20.0));
/// assert_eq!(on_resize.call(11.0), None); // same interval, dropped
/// ```
pub struct Throttle<F> {
    func: F,
    gate: RateGate,
}

/// Wrap `func` so it runs at most once per `interval`.
pub fn throttle<F>(func: F, interval: Duration) -> Throttle<F> {
    Throttle::new(func, interval)
}

impl<F> Throttle<F> {
    /// Wrap `func` so it runs at most once per `interval`.
    pub fn new(func: F, interval: Duration) -> Self {
        Self {
            func,
            gate: RateGate::new(interval),
        }
    }

    /// Invoke the wrapped function if the interval allows it.
    ///
    /// Returns the function's result, or `None` when the call was dropped.
    /// Whatever the function returns (including an `Err`) is handed back
    /// unchanged, and a panic unwinds through this call.
    pub fn call<A, R>(&mut self, args: A) -> Option<R>
    where
        F: FnMut(A) -> R,
    {
        if !self.gate.try_acquire() {
            tracing::trace!(target: "rate_control::throttle", "call dropped");
            return None;
        }
        Some((self.func)(args))
    }

    /// The configured interval.
    pub fn interval(&self) -> Duration {
        self.gate.interval()
    }

    /// When the wrapped function last ran.
    pub fn last_invoked(&self) -> Option<Instant> {
        self.gate.last_admitted()
    }

    /// Forget the last invocation so the next call runs immediately.
    pub fn reset(&mut self) {
        self.gate.reset();
    }

    /// Take back the function.
    pub fn into_inner(self) -> F {
        self.func
    }
}

impl<F> std::fmt::Debug for Throttle<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle").field("gate", &self.gate).finish()
    }
}
