//! Render timing marks and the RAII render timer

use crate::budget::SlowRender;
use crate::ledger::RenderLedger;
use std::time::Duration;
use tokio::time::Instant;

/// A high-resolution timestamp taken at the start of a render.
///
/// Reads the Tokio clock, so a paused test runtime controls it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RenderMark(Instant);

impl RenderMark {
    /// Take a mark at the current instant.
    #[inline]
    pub fn now() -> Self {
        Self(Instant::now())
    }

    /// Wrap an existing instant.
    #[inline]
    pub fn at(instant: Instant) -> Self {
        Self(instant)
    }

    /// The instant this mark was taken.
    #[inline]
    pub fn instant(&self) -> Instant {
        self.0
    }

    /// Time elapsed since the mark.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.0.elapsed()
    }

    /// Time elapsed since the mark, in milliseconds.
    #[inline]
    pub fn elapsed_ms(&self) -> f64 {
        duration_ms(self.elapsed())
    }
}

/// Convert a duration to fractional milliseconds.
#[inline]
pub fn duration_ms(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / 1_000_000.0
}

/// A timer that records a render into a ledger when dropped.
///
/// # Example
///
/// ```rust
/// use perf::RenderLedger;
///
/// let ledger = RenderLedger::new();
/// {
///     let _timer = ledger.time("Hero");
///     // ... render ...
/// }
/// assert_eq!(ledger.samples("Hero").len(), 1);
/// ```
pub struct RenderTimer<'a> {
    ledger: &'a RenderLedger,
    name: String,
    start: RenderMark,
    armed: bool,
}

impl<'a> RenderTimer<'a> {
    /// Start timing a render of `name`.
    pub fn new(ledger: &'a RenderLedger, name: impl Into<String>) -> Self {
        Self {
            ledger,
            name: name.into(),
            start: RenderMark::now(),
            armed: true,
        }
    }

    /// Component name being timed.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the elapsed time in milliseconds.
    #[inline]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed_ms()
    }

    /// Stop the timer and return the elapsed milliseconds without recording.
    pub fn stop(mut self) -> f64 {
        self.armed = false;
        self.elapsed_ms()
    }

    /// Stop the timer and record it, returning the slow-render record if any.
    pub fn finish(mut self) -> Option<SlowRender> {
        self.armed = false;
        self.ledger.mark_end(&self.name, self.start)
    }
}

impl Drop for RenderTimer<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.ledger.mark_end(&self.name, self.start);
        }
    }
}

/// Time the rest of the enclosing scope as a render of `$name`.
///
/// ```rust
/// use perf::{time_render, RenderLedger};
///
/// let ledger = RenderLedger::new();
/// fn render(ledger: &RenderLedger) {
///     time_render!(ledger, "Hero");
///     // ... render ...
/// }
/// render(&ledger);
/// assert_eq!(ledger.samples("Hero").len(), 1);
/// ```
#[macro_export]
macro_rules! time_render {
    ($ledger:expr, $name:expr) => {
        let _render_timer = $crate::RenderTimer::new(&$ledger, $name);
    };
}
