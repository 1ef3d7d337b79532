//! Tuning constants for animation, pointer trails, and scroll handling
//!
//! Every field has a default, so a config file only needs the values it
//! overrides.

use crate::debounce::Debounce;
use crate::error::{ConfigError, Result};
use crate::preferences::{scaled_duration, PreferenceSource, REDUCED_MOTION_FACTOR};
use crate::throttle::Throttle;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// All rate-control settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RateControlConfig {
    /// Animation durations
    pub animation: AnimationConfig,
    /// Pointer trail sizing
    pub pointer_trail: PointerTrailConfig,
    /// Scroll and resize handling
    pub scroll: ScrollConfig,
}

impl RateControlConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        tracing::debug!(target: "rate_control::config", path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        self.animation.validate()?;
        self.pointer_trail.validate()?;
        Ok(())
    }

    /// Builder method to replace the animation settings.
    pub fn with_animation(mut self, animation: AnimationConfig) -> Self {
        self.animation = animation;
        self
    }

    /// Builder method to replace the pointer trail settings.
    pub fn with_pointer_trail(mut self, pointer_trail: PointerTrailConfig) -> Self {
        self.pointer_trail = pointer_trail;
        self
    }

    /// Builder method to replace the scroll settings.
    pub fn with_scroll(mut self, scroll: ScrollConfig) -> Self {
        self.scroll = scroll;
        self
    }
}

/// Named animation speeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationSpeed {
    /// Quick transitions (hover, press)
    Fast,
    /// Standard transitions
    #[default]
    Default,
    /// Entrances and large movements
    Slow,
}

/// Animation durations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationConfig {
    /// Scale applied when reduced motion is preferred
    pub reduced_motion_factor: f64,
    /// Standard duration in milliseconds
    pub default_ms: u64,
    /// Fast duration in milliseconds
    pub fast_ms: u64,
    /// Slow duration in milliseconds
    pub slow_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            reduced_motion_factor: REDUCED_MOTION_FACTOR,
            default_ms: 300,
            fast_ms: 150,
            slow_ms: 600,
        }
    }
}

impl AnimationConfig {
    /// Unscaled duration for a speed.
    pub fn base(&self, speed: AnimationSpeed) -> Duration {
        let ms = match speed {
            AnimationSpeed::Fast => self.fast_ms,
            AnimationSpeed::Default => self.default_ms,
            AnimationSpeed::Slow => self.slow_ms,
        };
        Duration::from_millis(ms)
    }

    /// Duration for a speed, shortened when reduced motion is preferred.
    pub fn duration<P: PreferenceSource + ?Sized>(&self, prefs: &P, speed: AnimationSpeed) -> Duration {
        scaled_duration(prefs, self.base(speed), self.reduced_motion_factor)
    }

    fn validate(&self) -> Result<()> {
        let factor = self.reduced_motion_factor;
        if !factor.is_finite() || !(0.0..=1.0).contains(&factor) {
            return Err(ConfigError::Invalid(format!(
                "reducedMotionFactor must be between 0 and 1, got {factor}"
            )));
        }
        Ok(())
    }
}

/// Pointer trail sizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PointerTrailConfig {
    /// Most points kept at once
    pub max_points: usize,
    /// Minimum spacing between recorded points in milliseconds (~60fps)
    pub throttle_ms: u64,
    /// How long a point stays in the trail in milliseconds
    pub lifetime_ms: u64,
}

impl Default for PointerTrailConfig {
    fn default() -> Self {
        Self {
            max_points: 30,
            throttle_ms: 16,
            lifetime_ms: 1000,
        }
    }
}

impl PointerTrailConfig {
    /// Minimum spacing between recorded points.
    pub fn throttle_interval(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    /// How long a point stays in the trail.
    pub fn lifetime(&self) -> Duration {
        Duration::from_millis(self.lifetime_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.max_points == 0 {
            return Err(ConfigError::Invalid(
                "pointerTrail.maxPoints must be at least 1".to_string(),
            ));
        }
        if self.lifetime_ms == 0 {
            return Err(ConfigError::Invalid(
                "pointerTrail.lifetimeMs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Scroll and resize handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScrollConfig {
    /// Scroll handler throttle interval in milliseconds
    pub throttle_ms: u64,
    /// Resize handler debounce delay in milliseconds
    pub debounce_ms: u64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            throttle_ms: 16,
            debounce_ms: 150,
        }
    }
}

impl ScrollConfig {
    /// Throttle interval for scroll handlers.
    pub fn throttle_interval(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    /// Debounce delay for resize handlers.
    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Throttle a scroll handler at the configured interval.
    pub fn throttle<F>(&self, func: F) -> Throttle<F> {
        Throttle::new(func, self.throttle_interval())
    }

    /// Debounce a resize handler at the configured delay.
    pub fn debounce<F, A>(&self, func: F) -> Debounce<F, A>
    where
        F: FnMut(A) + Send + 'static,
        A: Send + 'static,
    {
        Debounce::new(func, self.debounce_delay())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::StaticPreferences;

    #[test]
    fn test_defaults() {
        let config = RateControlConfig::default();

        assert_eq!(config.animation.default_ms, 300);
        assert_eq!(config.animation.fast_ms, 150);
        assert_eq!(config.animation.slow_ms, 600);
        assert_eq!(config.pointer_trail.max_points, 30);
        assert_eq!(config.pointer_trail.throttle_ms, 16);
        assert_eq!(config.pointer_trail.lifetime_ms, 1000);
        assert_eq!(config.scroll.throttle_ms, 16);
        assert_eq!(config.scroll.debounce_ms, 150);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            RateControlConfig::from_json_str(r#"{ "scroll": { "debounceMs": 250 } }"#).unwrap();

        assert_eq!(config.scroll.debounce_ms, 250);
        assert_eq!(config.scroll.throttle_ms, 16);
        assert_eq!(config.pointer_trail, PointerTrailConfig::default());
    }

    #[test]
    fn test_json_round_trip() {
        let config = RateControlConfig::default().with_scroll(ScrollConfig {
            throttle_ms: 33,
            debounce_ms: 200,
        });

        let json = config.to_json_string().unwrap();
        assert!(json.contains("\"pointerTrail\""));
        assert_eq!(RateControlConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let err = RateControlConfig::from_json_str(r#"{ "pointerTrail": { "maxPoints": 0 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = RateControlConfig::from_json_str(
            r#"{ "animation": { "reducedMotionFactor": 1.5 } }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("reducedMotionFactor"));

        let err = RateControlConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_animation_duration() {
        let animation = AnimationConfig::default();
        let reduced = StaticPreferences {
            reduced_motion: true,
            ..Default::default()
        };

        assert_eq!(
            animation.duration(&StaticPreferences::default(), AnimationSpeed::Slow),
            Duration::from_millis(600)
        );
        assert_eq!(
            animation.duration(&reduced, AnimationSpeed::Slow),
            Duration::from_millis(180)
        );
        assert_eq!(
            animation.duration(&reduced, AnimationSpeed::Fast),
            Duration::from_millis(45)
        );
    }

    #[test]
    fn test_scroll_throttle() {
        let mut on_scroll = ScrollConfig::default().throttle(|y: f64| y);

        assert_eq!(on_scroll.interval(), Duration::from_millis(16));
        assert_eq!(on_scroll.call(1.0), Some(1.0));
    }
}
