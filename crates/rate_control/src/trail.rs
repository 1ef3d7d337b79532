//! Bounded, self-expiring history of pointer positions

use crate::config::PointerTrailConfig;
use crate::throttle::RateGate;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// A recorded pointer position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    /// Horizontal position
    pub x: f32,
    /// Vertical position
    pub y: f32,
    /// When the position was recorded
    pub at: Instant,
}

impl TrailPoint {
    /// Time since the point was recorded, as of `now`.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.at)
    }
}

/// Recent pointer positions, oldest first.
///
/// Points arrive through a throttle, expire after their lifetime, and the
/// oldest are dropped once the trail is full.
#[derive(Debug, Clone)]
pub struct PointerTrail {
    points: VecDeque<TrailPoint>,
    max_points: usize,
    lifetime: Duration,
    gate: RateGate,
}

impl PointerTrail {
    /// Create an empty trail.
    pub fn new(config: &PointerTrailConfig) -> Self {
        let max_points = config.max_points.max(1);
        Self {
            points: VecDeque::with_capacity(max_points),
            max_points,
            lifetime: config.lifetime(),
            gate: RateGate::new(config.throttle_interval()),
        }
    }

    /// Record a pointer position now.
    ///
    /// Returns `false` when the position arrived too soon after the previous
    /// one and was dropped.
    pub fn push(&mut self, x: f32, y: f32) -> bool {
        self.push_at(x, y, Instant::now())
    }

    /// Record a pointer position at `now`.
    pub fn push_at(&mut self, x: f32, y: f32, now: Instant) -> bool {
        if !self.gate.try_acquire_at(now) {
            return false;
        }

        self.expire(now);
        self.points.push_back(TrailPoint { x, y, at: now });
        while self.points.len() > self.max_points {
            self.points.pop_front();
        }
        true
    }

    /// Drop points older than the lifetime, as of `now`.
    pub fn expire(&mut self, now: Instant) {
        while self
            .points
            .front()
            .is_some_and(|point| point.age(now) >= self.lifetime)
        {
            self.points.pop_front();
        }
    }

    /// Recorded points, oldest first.
    pub fn points(&self) -> impl Iterator<Item = &TrailPoint> + '_ {
        self.points.iter()
    }

    /// Most recent point.
    pub fn latest(&self) -> Option<&TrailPoint> {
        self.points.back()
    }

    /// Number of recorded points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the trail has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Remove every point and reset the throttle.
    pub fn clear(&mut self) {
        self.points.clear();
        self.gate.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_keeps_at_most_max_points() {
        let mut trail = PointerTrail::new(&PointerTrailConfig::default());
        let t0 = Instant::now();

        for i in 0..40u64 {
            assert!(trail.push_at(i as f32, 0.0, t0 + ms(i * 16)));
        }

        assert_eq!(trail.len(), 30);
        assert_eq!(trail.points().next().map(|p| p.x), Some(10.0));
        assert_eq!(trail.latest().map(|p| p.x), Some(39.0));
    }

    #[test]
    fn test_drops_points_faster_than_throttle() {
        let mut trail = PointerTrail::new(&PointerTrailConfig::default());
        let t0 = Instant::now();

        assert!(trail.push_at(0.0, 0.0, t0));
        assert!(!trail.push_at(1.0, 1.0, t0 + ms(5)));
        assert!(trail.push_at(2.0, 2.0, t0 + ms(16)));
        assert_eq!(trail.len(), 2);
    }

    #[test]
    fn test_points_expire_after_lifetime() {
        let mut trail = PointerTrail::new(&PointerTrailConfig::default());
        let t0 = Instant::now();

        trail.push_at(0.0, 0.0, t0);
        trail.push_at(1.0, 0.0, t0 + ms(500));
        trail.expire(t0 + ms(1000));

        assert_eq!(trail.len(), 1);
        assert_eq!(trail.latest().map(|p| p.x), Some(1.0));

        trail.expire(t0 + ms(1500));
        assert!(trail.is_empty());
    }

    #[test]
    fn test_clear_resets_throttle() {
        let mut trail = PointerTrail::new(&PointerTrailConfig::default());
        let t0 = Instant::now();

        trail.push_at(0.0, 0.0, t0);
        trail.clear();

        assert!(trail.is_empty());
        assert!(trail.push_at(1.0, 1.0, t0 + ms(1)));
    }
}
