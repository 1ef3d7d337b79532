//! Bounded per-component render history

use crate::budget::{FrameBudget, SlowRender};
use crate::timing::{RenderMark, RenderTimer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Number of recent renders kept per component by default.
pub const DEFAULT_CAPACITY: usize = 10;

/// Ledger configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LedgerConfig {
    /// Maximum samples kept per component (oldest dropped first)
    pub capacity: usize,
    /// Budget a render must stay within to avoid a slow-render warning
    pub budget: FrameBudget,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            budget: FrameBudget::default(),
        }
    }
}

/// Recent render durations keyed by component name.
///
/// Each component keeps at most `capacity` samples; once full, the oldest
/// sample is evicted. The ledger is an ordinary value: create one at
/// startup and share it (by reference or `Arc`) with whatever renders.
#[derive(Debug, Default)]
pub struct RenderLedger {
    config: LedgerConfig,
    render_times: Mutex<HashMap<String, VecDeque<f64>>>,
}

impl RenderLedger {
    /// Create a ledger with the default capacity and a 60fps budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger from a configuration.
    ///
    /// A capacity of zero is treated as one.
    pub fn with_config(mut config: LedgerConfig) -> Self {
        config.capacity = config.capacity.max(1);
        Self {
            config,
            render_times: Mutex::new(HashMap::new()),
        }
    }

    /// Create a ledger with a custom per-component capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config(LedgerConfig {
            capacity,
            ..LedgerConfig::default()
        })
    }

    /// Create a ledger with a custom frame budget.
    pub fn with_budget(budget: FrameBudget) -> Self {
        Self::with_config(LedgerConfig {
            budget,
            ..LedgerConfig::default()
        })
    }

    /// Per-component sample capacity.
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Frame budget used for slow-render detection.
    pub fn budget(&self) -> &FrameBudget {
        &self.config.budget
    }

    /// Take a start mark for a render.
    #[inline]
    pub fn mark_start(&self) -> RenderMark {
        RenderMark::now()
    }

    /// Finish a render started at `start` and record its duration.
    ///
    /// Returns the slow-render record when the duration exceeds the budget.
    pub fn mark_end(&self, name: &str, start: RenderMark) -> Option<SlowRender> {
        self.record(name, start.elapsed_ms())
    }

    /// Start an RAII timer that records into this ledger when dropped.
    pub fn time(&self, name: impl Into<String>) -> RenderTimer<'_> {
        RenderTimer::new(self, name)
    }

    /// Record an already measured render duration.
    pub fn record(&self, name: &str, duration_ms: f64) -> Option<SlowRender> {
        {
            let mut render_times = self.render_times();
            let times = render_times.entry(name.to_string()).or_default();

            times.push_back(duration_ms);
            while times.len() > self.config.capacity {
                times.pop_front();
            }
        }

        tracing::trace!(
            target: "perf::render",
            component = name,
            duration_ms = duration_ms,
            "render recorded"
        );

        let budget_ms = self.config.budget.max_render_time_ms;
        if duration_ms > budget_ms {
            let slow = SlowRender::new(name, duration_ms, budget_ms);
            tracing::warn!(
                target: "perf::render",
                component = name,
                duration_ms = duration_ms,
                budget_ms = budget_ms,
                severity = ?slow.severity,
                "Slow render detected: {} took {:.2}ms",
                name,
                duration_ms
            );
            Some(slow)
        } else {
            None
        }
    }

    /// Mean of the stored durations for `name`, or `0.0` if there are none.
    pub fn average(&self, name: &str) -> f64 {
        let render_times = self.render_times();
        match render_times.get(name) {
            Some(times) if !times.is_empty() => times.iter().sum::<f64>() / times.len() as f64,
            _ => 0.0,
        }
    }

    /// Stored durations for `name`, oldest first.
    pub fn samples(&self, name: &str) -> Vec<f64> {
        self.render_times()
            .get(name)
            .map(|times| times.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Statistics over the stored durations for `name`.
    pub fn stats(&self, name: &str) -> TimingStats {
        TimingStats::from_samples(&self.samples(name))
    }

    /// Names of all components with recorded renders, sorted.
    pub fn component_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.render_times().keys().cloned().collect();
        names.sort();
        names
    }

    /// Statistics for every component.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let components = self
            .render_times()
            .iter()
            .map(|(name, times)| {
                let samples: Vec<f64> = times.iter().copied().collect();
                (name.clone(), TimingStats::from_samples(&samples))
            })
            .collect();

        LedgerSnapshot {
            budget_ms: self.config.budget.max_render_time_ms,
            components,
        }
    }

    /// Forget all recorded renders.
    pub fn reset(&self) {
        self.render_times().clear();
    }

    fn render_times(&self) -> MutexGuard<'_, HashMap<String, VecDeque<f64>>> {
        self.render_times
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Per-component statistics at a point in time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    /// Frame budget in effect
    pub budget_ms: f64,
    /// Statistics keyed by component name
    pub components: BTreeMap<String, TimingStats>,
}

/// Statistical summary of timing data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingStats {
    /// Number of samples
    pub count: usize,
    /// Minimum time in milliseconds
    pub min_ms: f64,
    /// Maximum time in milliseconds
    pub max_ms: f64,
    /// Mean time in milliseconds
    pub mean_ms: f64,
    /// Median time in milliseconds
    pub median_ms: f64,
    /// 95th percentile in milliseconds
    pub p95_ms: f64,
    /// 99th percentile in milliseconds
    pub p99_ms: f64,
    /// Standard deviation in milliseconds
    pub std_dev_ms: f64,
    /// Total time in milliseconds
    pub total_ms: f64,
}

impl TimingStats {
    /// Calculate statistics from a slice of samples.
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let count = samples.len();
        let mut sorted: Vec<f64> = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let total_ms: f64 = samples.iter().sum();
        let mean_ms = total_ms / count as f64;

        let median_ms = if count % 2 == 0 {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        } else {
            sorted[count / 2]
        };

        let variance: f64 =
            samples.iter().map(|x| (x - mean_ms).powi(2)).sum::<f64>() / count as f64;

        Self {
            count,
            min_ms: sorted[0],
            max_ms: sorted[count - 1],
            mean_ms,
            median_ms,
            p95_ms: percentile(&sorted, 95.0),
            p99_ms: percentile(&sorted, 99.0),
            std_dev_ms: variance.sqrt(),
            total_ms,
        }
    }
}

/// Linear-interpolated percentile of sorted samples.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        len => {
            let rank = (p / 100.0) * (len - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = (rank.ceil() as usize).min(len - 1);
            let fraction = rank - lower as f64;
            sorted[lower] + fraction * (sorted[upper] - sorted[lower])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_average_unknown_component() {
        let ledger = RenderLedger::new();
        assert_eq!(ledger.average("unknown-key"), 0.0);
        assert_eq!(ledger.stats("unknown-key"), TimingStats::default());
    }

    #[test]
    fn test_average() {
        let ledger = RenderLedger::new();
        ledger.record("Hero", 4.0);
        ledger.record("Hero", 8.0);
        ledger.record("Footer", 100.0);

        assert_eq!(ledger.average("Hero"), 6.0);
        assert_eq!(ledger.average("Footer"), 100.0);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let ledger = RenderLedger::new();
        for i in 0..15 {
            ledger.record("Hero", i as f64);
        }

        let expected: Vec<f64> = (5..15).map(|i| i as f64).collect();
        assert_eq!(ledger.samples("Hero"), expected);
        assert_eq!(ledger.average("Hero"), 9.5);
    }

    #[test]
    fn test_capacity_is_per_component() {
        let ledger = RenderLedger::with_capacity(2);
        for i in 0..3 {
            ledger.record("a", i as f64);
        }
        ledger.record("b", 7.0);

        assert_eq!(ledger.samples("a"), vec![1.0, 2.0]);
        assert_eq!(ledger.samples("b"), vec![7.0]);
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let ledger = RenderLedger::with_capacity(0);
        ledger.record("a", 1.0);
        ledger.record("a", 2.0);

        assert_eq!(ledger.capacity(), 1);
        assert_eq!(ledger.samples("a"), vec![2.0]);
    }

    #[test]
    fn test_slow_render_threshold_is_strict() {
        let ledger = RenderLedger::new();

        assert!(ledger.record("Hero", 16.0).is_none());
        let slow = ledger.record("Hero", 16.5).expect("over budget");
        assert_eq!(slow.duration_ms, 16.5);
        assert_eq!(slow.budget_ms, 16.0);
    }

    #[test]
    fn test_custom_budget() {
        let ledger = RenderLedger::with_budget(FrameBudget::for_120fps());
        assert!(ledger.record("Hero", 10.0).is_some());
    }

    #[test]
    fn test_component_names_and_reset() {
        let ledger = RenderLedger::new();
        ledger.record("b", 1.0);
        ledger.record("a", 1.0);

        assert_eq!(ledger.component_names(), vec!["a", "b"]);

        ledger.reset();
        assert!(ledger.component_names().is_empty());
        assert_eq!(ledger.average("a"), 0.0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let ledger = RenderLedger::new();
        ledger.record("Hero", 2.0);
        ledger.record("Hero", 4.0);

        let snapshot = ledger.snapshot();
        assert_eq!(snapshot.components["Hero"].mean_ms, 3.0);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["budgetMs"], 16.0);
        assert_eq!(json["components"]["Hero"]["count"], 2);
    }

    #[test]
    fn test_timing_stats_from_samples() {
        let stats = TimingStats::from_samples(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        assert_eq!(stats.count, 5);
        assert_eq!(stats.min_ms, 1.0);
        assert_eq!(stats.max_ms, 5.0);
        assert_eq!(stats.mean_ms, 3.0);
        assert_eq!(stats.median_ms, 3.0);
        assert_eq!(stats.total_ms, 15.0);
    }

    #[test]
    fn test_percentile() {
        let sorted = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];

        assert!((percentile(&sorted, 50.0) - 5.5).abs() < 0.01);
        assert!((percentile(&sorted, 90.0) - 9.1).abs() < 0.01);
        assert_eq!(percentile(&[], 50.0), 0.0);
    }

    proptest! {
        #[test]
        fn prop_keeps_most_recent(samples in prop::collection::vec(0.0f64..100.0, 0..40)) {
            let ledger = RenderLedger::new();
            for s in &samples {
                ledger.record("c", *s);
            }

            let kept = samples.len().min(DEFAULT_CAPACITY);
            prop_assert_eq!(ledger.samples("c"), samples[samples.len() - kept..].to_vec());
        }

        #[test]
        fn prop_average_within_bounds(samples in prop::collection::vec(0.0f64..100.0, 1..40)) {
            let ledger = RenderLedger::new();
            for s in &samples {
                ledger.record("c", *s);
            }

            let stored = ledger.samples("c");
            let min = stored.iter().copied().fold(f64::INFINITY, f64::min);
            let max = stored.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let avg = ledger.average("c");
            prop_assert!(avg >= min - 1e-9 && avg <= max + 1e-9);
        }
    }
}
