//! Metrics for rating runs
//!
//! This module provides per-run Prometheus metrics that can be dumped in
//! the text exposition format next to the exported results.

pub mod collector;

pub use collector::RunMetrics;
