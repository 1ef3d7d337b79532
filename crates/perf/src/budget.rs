//! Frame budgets and slow-render records

use serde::{Deserialize, Serialize};

/// Per-frame render budget.
///
/// A render whose duration is strictly greater than the budget is reported
/// as slow. The default targets 60fps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameBudget {
    /// Maximum acceptable render time per component render in milliseconds.
    ///
    /// Target: 16ms for 60fps, 8ms for 120fps.
    pub max_render_time_ms: f64,
}

impl FrameBudget {
    /// Create a budget with a custom render threshold.
    pub fn new(max_render_time_ms: f64) -> Self {
        Self { max_render_time_ms }
    }

    /// Create a budget for 60fps rendering.
    pub fn for_60fps() -> Self {
        Self {
            max_render_time_ms: 16.0,
        }
    }

    /// Create a budget for 120fps rendering.
    pub fn for_120fps() -> Self {
        Self {
            max_render_time_ms: 8.0,
        }
    }

    /// Create a relaxed budget for heavy pages.
    pub fn relaxed() -> Self {
        Self {
            max_render_time_ms: 33.0, // 30fps
        }
    }

    /// Builder method to set the render time budget.
    pub fn with_render_time(mut self, ms: f64) -> Self {
        self.max_render_time_ms = ms;
        self
    }

    /// Check if a render time measurement is within budget.
    pub fn check_render_time(&self, ms: f64) -> bool {
        ms <= self.max_render_time_ms
    }

    /// Get the headroom (remaining time) for a render.
    pub fn headroom(&self, ms: f64) -> f64 {
        self.max_render_time_ms - ms
    }
}

impl Default for FrameBudget {
    /// Default budget targets 60fps.
    fn default() -> Self {
        Self::for_60fps()
    }
}

/// Severity level of a slow render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Minor overrun (1-1.5x budget)
    Low,
    /// Moderate overrun (1.5-2x budget)
    Medium,
    /// Significant overrun (2-3x budget)
    High,
    /// Severe overrun (>3x budget)
    Critical,
}

impl Severity {
    /// Classify how far `actual` exceeds `budget`.
    pub fn classify(actual: f64, budget: f64) -> Self {
        let ratio = actual / budget;
        if ratio > 3.0 {
            Severity::Critical
        } else if ratio > 2.0 {
            Severity::High
        } else if ratio > 1.5 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

/// A render that exceeded its frame budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlowRender {
    /// Component that rendered slowly
    pub component: String,
    /// Measured render time in milliseconds
    pub duration_ms: f64,
    /// Budget threshold in milliseconds
    pub budget_ms: f64,
    /// How far over budget the render was
    pub severity: Severity,
}

impl SlowRender {
    /// Create a slow-render record, classifying its severity.
    pub fn new(component: impl Into<String>, duration_ms: f64, budget_ms: f64) -> Self {
        Self {
            component: component.into(),
            duration_ms,
            budget_ms,
            severity: Severity::classify(duration_ms, budget_ms),
        }
    }

    /// How much the render exceeded the budget.
    pub fn excess_ms(&self) -> f64 {
        self.duration_ms - self.budget_ms
    }

    /// Ratio of actual to budget (e.g., 2.0 means 2x over budget).
    pub fn ratio(&self) -> f64 {
        self.duration_ms / self.budget_ms
    }
}

impl std::fmt::Display for SlowRender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Slow render detected: {} took {:.2}ms (budget: {:.2}ms)",
            self.component, self.duration_ms, self.budget_ms
        )
    }
}
