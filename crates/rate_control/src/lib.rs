//! Rate Control
//!
//! Helpers for keeping high-frequency UI work cheap:
//!
//! - [`throttle`]: run a function at most once per interval (leading edge)
//! - [`debounce`]: run a function once after a burst of calls goes quiet
//! - [`TimerRegistry`]: collect timer handles and cancel them all at teardown
//! - [`PreferenceSource`]: reduced-motion and coarse-pointer probes, plus
//!   [`adaptive_duration`] for motion-aware animation timing
//! - [`PointerTrail`]: a bounded, self-expiring trail of pointer positions
//! - [`RateControlConfig`]: tuning constants, loadable from JSON
//!
//! Timers run on Tokio. All time is read from `tokio::time::Instant`, so a
//! paused test runtime drives every component deterministically.
//!
//! # Example
//!
//! ```rust
//! use rate_control::{adaptive_duration, throttle, StaticPreferences};
//! use std::time::Duration;
//!
//! let mut hits = 0;
//! {
//!     let mut on_move = throttle(|_pos: (f32, f32)| hits += 1, Duration::from_secs(60));
//!     on_move.call((1.0, 2.0));
//!     on_move.call((1.5, 2.5)); // dropped
//! }
//! assert_eq!(hits, 1);
//!
//! let prefs = StaticPreferences { reduced_motion: true, ..Default::default() };
//! assert_eq!(
//!     adaptive_duration(&prefs, Duration::from_millis(1000)),
//!     Duration::from_millis(300)
//! );
//! ```

mod config;
mod debounce;
mod error;
mod preferences;
mod throttle;
mod timers;
mod trail;

pub use config::{
    AnimationConfig, AnimationSpeed, PointerTrailConfig, RateControlConfig, ScrollConfig,
};
pub use debounce::{debounce, Debounce};
pub use error::{ConfigError, Result};
pub use preferences::{
    adaptive_duration, scaled_duration, EnvPreferences, PointerKind, PreferenceSource,
    SharedPreferences, StaticPreferences, REDUCED_MOTION_FACTOR,
};
pub use throttle::{throttle, RateGate, Throttle};
pub use timers::{Cancel, TimerHandle, TimerId, TimerKind, TimerRegistry, MIN_INTERVAL_PERIOD};
pub use trail::{PointerTrail, TrailPoint};
