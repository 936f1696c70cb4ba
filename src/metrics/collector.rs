//! Metrics collection using Prometheus
//!
//! Every run owns its own registry so concurrent leagues never share
//! counters.

use anyhow::Result;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Arc;
use std::time::Duration;

/// Metrics for a single processing run
#[derive(Clone)]
pub struct RunMetrics {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Matches rated so far
    pub matches_processed: IntCounter,

    /// Matches that failed to rate
    pub matches_failed: IntCounter,

    /// Distinct players seen so far
    pub players_known: IntGauge,

    /// History entries recorded so far
    pub history_entries: IntGauge,

    /// Pre-match quality (draw probability) of each match
    pub match_quality: Histogram,

    /// Absolute mean change per participant
    pub mean_shift: Histogram,

    /// Time spent rating and recording one match
    pub update_duration: Histogram,
}

impl RunMetrics {
    /// Create metrics labelled with the league name
    pub fn new(league: &str) -> Result<Self> {
        let registry = Arc::new(Registry::new());

        let matches_processed = IntCounter::with_opts(
            Opts::new("ladder_matches_processed_total", "Matches rated")
                .const_label("league", league),
        )?;
        registry.register(Box::new(matches_processed.clone()))?;

        let matches_failed = IntCounter::with_opts(
            Opts::new("ladder_matches_failed_total", "Matches that failed to rate")
                .const_label("league", league),
        )?;
        registry.register(Box::new(matches_failed.clone()))?;

        let players_known = IntGauge::with_opts(
            Opts::new("ladder_players_known", "Distinct players seen").const_label("league", league),
        )?;
        registry.register(Box::new(players_known.clone()))?;

        let history_entries = IntGauge::with_opts(
            Opts::new("ladder_history_entries", "History entries recorded")
                .const_label("league", league),
        )?;
        registry.register(Box::new(history_entries.clone()))?;

        let match_quality = Histogram::with_opts(
            HistogramOpts::new("ladder_match_quality", "Pre-match quality of rated matches")
                .const_label("league", league)
                .buckets(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0]),
        )?;
        registry.register(Box::new(match_quality.clone()))?;

        let mean_shift = Histogram::with_opts(
            HistogramOpts::new("ladder_mean_shift", "Absolute mean change per participant")
                .const_label("league", league)
                .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.0, 4.0, 8.0]),
        )?;
        registry.register(Box::new(mean_shift.clone()))?;

        let update_duration = Histogram::with_opts(
            HistogramOpts::new(
                "ladder_update_duration_seconds",
                "Time spent rating and recording one match",
            )
            .const_label("league", league)
            .buckets(vec![0.00001, 0.0001, 0.001, 0.005, 0.01, 0.05]),
        )?;
        registry.register(Box::new(update_duration.clone()))?;

        Ok(Self {
            registry,
            matches_processed,
            matches_failed,
            players_known,
            history_entries,
            match_quality,
            mean_shift,
            update_duration,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Record one successfully rated match
    pub fn record_match(
        &self,
        quality: f64,
        mean_shifts: &[f64],
        duration: Duration,
        players_known: usize,
        history_entries: usize,
    ) {
        self.matches_processed.inc();
        self.match_quality.observe(quality);
        for shift in mean_shifts {
            self.mean_shift.observe(shift.abs());
        }
        self.update_duration.observe(duration.as_secs_f64());
        self.players_known.set(players_known as i64);
        self.history_entries.set(history_entries as i64);
    }

    pub fn record_failure(&self) {
        self.matches_failed.inc();
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn render(&self) -> Result<String> {
        let metric_families = self.registry.gather();
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| anyhow::anyhow!("Failed to encode metrics: {}", e))?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl std::fmt::Debug for RunMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunMetrics")
            .field("matches_processed", &self.matches_processed.get())
            .field("players_known", &self.players_known.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation_and_recording() {
        let metrics = RunMetrics::new("spring").expect("Failed to create metrics");

        metrics.record_match(0.45, &[1.5, -1.5, 0.7, -0.7], Duration::from_micros(40), 4, 4);
        metrics.record_match(0.30, &[2.0, -2.0], Duration::from_micros(35), 6, 10);
        metrics.record_failure();

        assert_eq!(metrics.matches_processed.get(), 2);
        assert_eq!(metrics.matches_failed.get(), 1);
        assert_eq!(metrics.players_known.get(), 6);
        assert_eq!(metrics.history_entries.get(), 10);
        assert_eq!(metrics.mean_shift.get_sample_count(), 6);
    }

    #[test]
    fn test_render_contains_league_label() {
        let metrics = RunMetrics::new("spring").unwrap();
        metrics.record_match(0.5, &[1.0], Duration::from_micros(10), 2, 2);

        let text = metrics.render().unwrap();
        assert!(text.contains("ladder_matches_processed_total"));
        assert!(text.contains("league=\"spring\""));
    }

    #[test]
    fn test_runs_do_not_share_registries() {
        let a = RunMetrics::new("a").unwrap();
        let b = RunMetrics::new("b").unwrap();
        a.record_failure();
        assert_eq!(b.matches_failed.get(), 0);
    }
}
