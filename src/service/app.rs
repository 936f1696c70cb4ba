//! Run orchestration
//!
//! A league is one match sheet processed into one independent run. Leagues
//! never share a store or history, so several can be rated side by side on
//! the blocking thread pool.

use crate::config::{validate_config, AppConfig};
use crate::error::{RatingError, Result};
use crate::io::{ExportSummary, MatchLoader, ResultExporter};
use crate::metrics::RunMetrics;
use crate::processing::{Leaderboard, MatchProcessor, RatingRun};
use crate::rating::{build_engine, RatingEngine, RatingStore};
use crate::types::{MatchRecord, RunId};
use crate::utils::generate_run_id;
use anyhow::{anyhow, Context};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, info_span};

/// A match sheet to rate
#[derive(Debug, Clone)]
pub struct LeagueJob {
    pub league: String,
    pub path: PathBuf,
}

impl LeagueJob {
    /// League named after the file stem
    pub fn from_path(path: &Path) -> Self {
        let league = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "league".to_string());
        Self {
            league,
            path: path.to_path_buf(),
        }
    }
}

/// Summary of a finished league
#[derive(Debug, Clone)]
pub struct LeagueReport {
    pub league: String,
    pub run_id: RunId,
    pub matches: usize,
    pub players: usize,
    pub history_entries: usize,
    pub leaderboard: Leaderboard,
    pub export: ExportSummary,
}

/// Rated run plus the metrics gathered while producing it
pub struct RatedLeague {
    pub run_id: RunId,
    pub run: RatingRun,
    pub metrics: Arc<RunMetrics>,
}

/// Application entry point shared by all leagues
pub struct LadderApp {
    config: AppConfig,
    engine: Arc<dyn RatingEngine>,
    loader: MatchLoader,
    exporter: ResultExporter,
}

impl LadderApp {
    pub fn new(config: AppConfig) -> Result<Self> {
        validate_config(&config)?;
        let engine: Arc<dyn RatingEngine> = Arc::from(build_engine(&config.rating)?);

        info!(
            "Rating engine '{}' ready, prior {:.3} ± {:.3}",
            engine.name(),
            engine.prior().mean,
            engine.prior().stddev
        );

        Ok(Self {
            loader: MatchLoader::new(config.input.clone()),
            exporter: ResultExporter::new(config.output.clone()),
            config,
            engine,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn engine(&self) -> Arc<dyn RatingEngine> {
        self.engine.clone()
    }

    /// Rate an already ordered match list
    pub fn rate_records(&self, league: &str, records: &[MatchRecord]) -> Result<RatedLeague> {
        let run_id = generate_run_id();
        let span = info_span!("run", %run_id, league);
        let _guard = span.enter();

        let metrics = Arc::new(RunMetrics::new(league)?);
        let mut processor = MatchProcessor::new(self.engine.clone()).with_metrics(metrics.clone());

        info!("Rating {} matches", records.len());
        processor.process_all(records)?;
        let run = processor.into_run();

        info!(
            "Rated {} matches, {} players, {} history entries",
            run.matches_processed,
            run.store.len(),
            run.history.len()
        );

        Ok(RatedLeague {
            run_id,
            run,
            metrics,
        })
    }

    /// Load, rate and export one league
    pub fn run_league(&self, job: &LeagueJob) -> Result<LeagueReport> {
        let records = self.loader.load_path(&job.path)?;
        let rated = self
            .rate_records(&job.league, &records)
            .with_context(|| format!("League '{}' aborted", job.league))?;

        let export = self
            .exporter
            .export(&job.league, &rated.run, Some(&rated.metrics))?;

        Ok(LeagueReport {
            league: job.league.clone(),
            run_id: rated.run_id,
            matches: rated.run.matches_processed,
            players: rated.run.store.len(),
            history_entries: rated.run.history.len(),
            leaderboard: rated.run.leaderboard.clone(),
            export,
        })
    }

    /// Run every league on its own blocking task; results follow job order.
    ///
    /// Leagues sharing a name would export into the same directory, so every
    /// job whose name is not unique fails without being run.
    pub async fn run_all(self: Arc<Self>, jobs: Vec<LeagueJob>) -> Vec<Result<LeagueReport>> {
        let mut name_counts: HashMap<String, usize> = HashMap::new();
        for job in &jobs {
            *name_counts.entry(job.league.clone()).or_insert(0) += 1;
        }

        let handles: Vec<_> = jobs
            .into_iter()
            .map(|job| {
                let league = job.league.clone();
                let sheets = name_counts.get(&league).copied().unwrap_or(0);
                if sheets > 1 {
                    let duplicate: anyhow::Error = RatingError::ConfigurationError {
                        message: format!(
                            "League name '{}' is shared by {} sheets ({})",
                            league,
                            sheets,
                            job.path.display()
                        ),
                    }
                    .into();
                    return (league, Err(duplicate));
                }

                let app = self.clone();
                let handle = tokio::task::spawn_blocking(move || app.run_league(&job));
                (league, Ok(handle))
            })
            .collect();

        let mut reports = Vec::with_capacity(handles.len());
        for (league, handle) in handles {
            let report = match handle {
                Ok(handle) => match handle.await {
                    Ok(result) => result,
                    Err(e) => Err(anyhow!("League '{}' task failed: {}", league, e)),
                },
                Err(e) => Err(e),
            };
            if let Err(e) = &report {
                error!("League '{}' failed: {:#}", league, e);
            }
            reports.push(report);
        }
        reports
    }
}
