//! Render Performance Monitoring
//!
//! This crate tracks how long components take to render:
//! - A bounded per-component ledger of recent render durations
//! - Frame budgets with slow-render detection and `tracing` warnings
//! - Render marks and an RAII render timer
//!
//! # Example
//!
//! ```rust
//! use perf::RenderLedger;
//!
//! let ledger = RenderLedger::new();
//!
//! let start = ledger.mark_start();
//! // ... render the hero section ...
//! ledger.mark_end("Hero", start);
//!
//! let average_ms = ledger.average("Hero");
//! assert!(average_ms >= 0.0);
//! ```

mod budget;
mod ledger;
mod timing;

pub use budget::*;
pub use ledger::*;
pub use timing::*;
