//! Motion and pointer preferences
//!
//! Hosts expose the platform's accessibility and input-mode state through
//! [`PreferenceSource`]. Probes are read on every call, so live changes are
//! picked up without re-creating anything.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Scale applied to animation durations when reduced motion is preferred.
pub const REDUCED_MOTION_FACTOR: f64 = 0.3;

/// Primary input mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    /// Mouse, trackpad, stylus
    #[default]
    Fine,
    /// Touch
    Coarse,
}

/// Read access to the host's motion and pointer preferences.
pub trait PreferenceSource {
    /// Whether the user asked the platform to minimise animation.
    fn prefers_reduced_motion(&self) -> bool;

    /// The primary pointer kind.
    fn pointer(&self) -> PointerKind;

    /// Whether the primary pointer is touch rather than mouse.
    fn is_coarse_pointer(&self) -> bool {
        self.pointer() == PointerKind::Coarse
    }
}

impl<P: PreferenceSource + ?Sized> PreferenceSource for &P {
    fn prefers_reduced_motion(&self) -> bool {
        (**self).prefers_reduced_motion()
    }

    fn pointer(&self) -> PointerKind {
        (**self).pointer()
    }
}

impl<P: PreferenceSource + ?Sized> PreferenceSource for Arc<P> {
    fn prefers_reduced_motion(&self) -> bool {
        (**self).prefers_reduced_motion()
    }

    fn pointer(&self) -> PointerKind {
        (**self).pointer()
    }
}

/// `base` shortened when reduced motion is preferred, otherwise unchanged.
pub fn adaptive_duration<P: PreferenceSource + ?Sized>(prefs: &P, base: Duration) -> Duration {
    scaled_duration(prefs, base, REDUCED_MOTION_FACTOR)
}

/// `base * factor` when reduced motion is preferred, otherwise `base`.
///
/// `factor` must be finite and non-negative.
pub fn scaled_duration<P: PreferenceSource + ?Sized>(
    prefs: &P,
    base: Duration,
    factor: f64,
) -> Duration {
    if prefs.prefers_reduced_motion() {
        scale(base, factor)
    } else {
        base
    }
}

/// `base * factor`, saturating at `Duration::MAX`.
fn scale(base: Duration, factor: f64) -> Duration {
    // Rounded to the nanosecond so e.g. 1s * 0.3 is exactly 300ms.
    let nanos = (base.as_nanos() as f64 * factor).round();
    if nanos.is_nan() || nanos <= 0.0 {
        Duration::ZERO
    } else if nanos < u64::MAX as f64 {
        Duration::from_nanos(nanos as u64)
    } else {
        Duration::try_from_secs_f64(nanos / 1e9).unwrap_or(Duration::MAX)
    }
}

/// Fixed preferences, for hosts that cannot observe the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticPreferences {
    /// Reduced motion requested
    pub reduced_motion: bool,
    /// Primary pointer kind
    pub pointer: PointerKind,
}

impl PreferenceSource for StaticPreferences {
    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn pointer(&self) -> PointerKind {
        self.pointer
    }
}

/// Preferences the host updates when the platform reports a change.
///
/// Share it with `Arc`; readers always see the latest value.
#[derive(Debug, Default)]
pub struct SharedPreferences {
    reduced_motion: AtomicBool,
    coarse_pointer: AtomicBool,
}

impl SharedPreferences {
    /// Start from the given values.
    pub fn new(initial: StaticPreferences) -> Self {
        Self {
            reduced_motion: AtomicBool::new(initial.reduced_motion),
            coarse_pointer: AtomicBool::new(initial.pointer == PointerKind::Coarse),
        }
    }

    /// Record a change of the reduced-motion preference.
    pub fn set_reduced_motion(&self, reduced: bool) {
        self.reduced_motion.store(reduced, Ordering::Relaxed);
        tracing::debug!(target: "rate_control::preferences", reduced, "reduced motion changed");
    }

    /// Record a change of the primary pointer.
    pub fn set_pointer(&self, pointer: PointerKind) {
        self.coarse_pointer
            .store(pointer == PointerKind::Coarse, Ordering::Relaxed);
        tracing::debug!(target: "rate_control::preferences", ?pointer, "pointer changed");
    }

    /// Current values.
    pub fn snapshot(&self) -> StaticPreferences {
        StaticPreferences {
            reduced_motion: self.prefers_reduced_motion(),
            pointer: self.pointer(),
        }
    }
}

impl PreferenceSource for SharedPreferences {
    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion.load(Ordering::Relaxed)
    }

    fn pointer(&self) -> PointerKind {
        if self.coarse_pointer.load(Ordering::Relaxed) {
            PointerKind::Coarse
        } else {
            PointerKind::Fine
        }
    }
}

/// Preferences read from environment variables on every call.
///
/// Reduced motion is on for `1`, `true`, `yes`, `on` or `reduce`; the
/// pointer is coarse for `coarse` or `touch`. Anything else, or an unset
/// variable, means no preference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvPreferences {
    reduced_motion_var: String,
    pointer_var: String,
}

impl EnvPreferences {
    /// Default variable holding the reduced-motion preference.
    pub const REDUCED_MOTION_VAR: &'static str = "PREFERS_REDUCED_MOTION";
    /// Default variable holding the pointer kind.
    pub const POINTER_VAR: &'static str = "POINTER";

    /// Read the default variables.
    pub fn new() -> Self {
        Self::with_vars(Self::REDUCED_MOTION_VAR, Self::POINTER_VAR)
    }

    /// Read custom variables.
    pub fn with_vars(reduced_motion_var: impl Into<String>, pointer_var: impl Into<String>) -> Self {
        Self {
            reduced_motion_var: reduced_motion_var.into(),
            pointer_var: pointer_var.into(),
        }
    }
}

impl Default for EnvPreferences {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceSource for EnvPreferences {
    fn prefers_reduced_motion(&self) -> bool {
        std::env::var(&self.reduced_motion_var).is_ok_and(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on" | "reduce"
            )
        })
    }

    fn pointer(&self) -> PointerKind {
        match std::env::var(&self.pointer_var) {
            Ok(value) if matches!(value.trim().to_ascii_lowercase().as_str(), "coarse" | "touch") => {
                PointerKind::Coarse
            }
            _ => PointerKind::Fine,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adaptive_duration() {
        let base = Duration::from_millis(1000);
        let normal = StaticPreferences::default();
        let reduced = StaticPreferences {
            reduced_motion: true,
            ..Default::default()
        };

        assert_eq!(adaptive_duration(&normal, base), base);
        assert_eq!(adaptive_duration(&reduced, base), Duration::from_millis(300));
    }

    #[test]
    fn test_adaptive_duration_follows_live_changes() {
        let prefs = Arc::new(SharedPreferences::default());
        let base = Duration::from_millis(600);

        assert_eq!(adaptive_duration(&prefs, base), base);

        prefs.set_reduced_motion(true);
        assert_eq!(adaptive_duration(&prefs, base), Duration::from_millis(180));

        prefs.set_reduced_motion(false);
        assert_eq!(adaptive_duration(&prefs, base), base);
    }

    #[test]
    fn test_shared_pointer() {
        let prefs = SharedPreferences::new(StaticPreferences {
            reduced_motion: false,
            pointer: PointerKind::Coarse,
        });
        assert!(prefs.is_coarse_pointer());

        prefs.set_pointer(PointerKind::Fine);
        assert!(!prefs.is_coarse_pointer());
        assert_eq!(prefs.snapshot(), StaticPreferences::default());
    }

    #[test]
    fn test_trait_object() {
        let prefs: Box<dyn PreferenceSource> = Box::new(StaticPreferences {
            reduced_motion: true,
            pointer: PointerKind::Coarse,
        });

        assert!(prefs.prefers_reduced_motion());
        assert!(prefs.is_coarse_pointer());
        assert_eq!(
            adaptive_duration(prefs.as_ref(), Duration::from_millis(100)),
            Duration::from_millis(30)
        );
    }

    #[test]
    fn test_scaling_huge_durations_saturates() {
        let reduced = StaticPreferences {
            reduced_motion: true,
            ..Default::default()
        };

        assert_eq!(scaled_duration(&reduced, Duration::MAX, 1.0), Duration::MAX);
        assert_eq!(scaled_duration(&reduced, Duration::MAX, 2.0), Duration::MAX);

        let base = Duration::from_secs(u64::MAX / 2);
        let scaled = adaptive_duration(&reduced, base).as_secs_f64();
        let expected = base.as_secs_f64() * REDUCED_MOTION_FACTOR;
        assert!((scaled - expected).abs() / expected < 1e-9, "scaled to {scaled}s");
    }

    #[test]
    fn test_scaling_by_zero() {
        let reduced = StaticPreferences {
            reduced_motion: true,
            ..Default::default()
        };

        assert_eq!(scaled_duration(&reduced, Duration::MAX, 0.0), Duration::ZERO);
    }

    #[test]
    fn test_pointer_kind_serde() {
        assert_eq!(serde_json::to_string(&PointerKind::Coarse).unwrap(), "\"coarse\"");
    }
}
