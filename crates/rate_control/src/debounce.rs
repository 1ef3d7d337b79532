//! Trailing-edge debouncing
//!
//! A debounced function runs once, `delay` after the last call of a burst,
//! with that call's arguments. Every call cancels the pending run and
//! schedules a fresh one, so a steady stream of calls postpones the run
//! indefinitely.

use crate::timers::TimerHandle;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// A function wrapped so that a burst of calls runs it once, after a quiet period.
///
/// Must be called from within a Tokio runtime.
pub struct Debounce<F, A> {
    func: Arc<Mutex<F>>,
    delay: Duration,
    pending: Option<TimerHandle>,
    _args: PhantomData<fn(A)>,
}

/// Wrap `func` so that it runs `delay` after the last call of a burst.
pub fn debounce<F, A>(func: F, delay: Duration) -> Debounce<F, A>
where
    F: FnMut(A) + Send + 'static,
    A: Send + 'static,
{
    Debounce::new(func, delay)
}

impl<F, A> Debounce<F, A>
where
    F: FnMut(A) + Send + 'static,
    A: Send + 'static,
{
    /// Wrap `func` so that it runs `delay` after the last call of a burst.
    pub fn new(func: F, delay: Duration) -> Self {
        Self {
            func: Arc::new(Mutex::new(func)),
            delay,
            pending: None,
            _args: PhantomData,
        }
    }

    /// Supersede any pending run and schedule `func(args)` after the delay.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn call(&mut self, args: A) {
        if let Some(previous) = self.pending.take() {
            previous.cancel();
            tracing::trace!(
                target: "rate_control::debounce",
                timer = previous.id().get(),
                "pending call superseded"
            );
        }

        let func = Arc::clone(&self.func);
        let handle = TimerHandle::timeout(self.delay, move || {
            let mut func = func.lock().unwrap_or_else(PoisonError::into_inner);
            (*func)(args);
        });
        self.pending = Some(handle);
    }
}

impl<F, A> Debounce<F, A> {
    /// The configured quiet period.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Whether a scheduled run has not happened yet.
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl<F, A> std::fmt::Debug for Debounce<F, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debounce")
            .field("delay", &self.delay)
            .field("pending", &self.pending)
            .finish()
    }
}
