//! Result export
//!
//! Writes the leaderboard, the dense history and the per-day history of a
//! run as CSV or JSON, one directory per league.

use crate::config::{OutputFormat, OutputSettings};
use crate::error::{RatingError, Result};
use crate::metrics::RunMetrics;
use crate::processing::RatingRun;
use crate::rating::RatingStore;
use anyhow::Context;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Files written for one league
#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    pub directory: PathBuf,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ResultExporter {
    settings: OutputSettings,
}

impl ResultExporter {
    pub fn new(settings: OutputSettings) -> Self {
        Self { settings }
    }

    /// Directory the given league is written to
    pub fn league_directory(&self, league: &str) -> PathBuf {
        self.settings.directory.join(league)
    }

    pub fn export<S: RatingStore>(
        &self,
        league: &str,
        run: &RatingRun<S>,
        metrics: Option<&RunMetrics>,
    ) -> Result<ExportSummary> {
        let directory = self.league_directory(league);
        fs::create_dir_all(&directory)
            .with_context(|| format!("Failed to create output directory {}", directory.display()))?;

        let mut summary = ExportSummary {
            directory: directory.clone(),
            files: Vec::new(),
        };
        let format = self.settings.format;

        let path = self.file_path(&directory, &self.settings.leaderboard_file);
        write_rows(&path, run.leaderboard.entries(), format)?;
        summary.files.push(path);

        let path = self.file_path(&directory, &self.settings.history_file);
        write_rows(&path, run.history.entries(), format)?;
        summary.files.push(path);

        if !self.settings.daily_history_file.is_empty() {
            let path = self.file_path(&directory, &self.settings.daily_history_file);
            write_rows(&path, &run.history.daily_series(), format)?;
            summary.files.push(path);
        }

        if let (Some(metrics), false) = (metrics, self.settings.metrics_file.is_empty()) {
            let path = directory.join(&self.settings.metrics_file);
            let text = metrics.render()?;
            fs::write(&path, text)
                .with_context(|| format!("Failed to write metrics to {}", path.display()))?;
            summary.files.push(path);
        }

        info!(
            "Exported {} files for league '{}' to {}",
            summary.files.len(),
            league,
            directory.display()
        );
        Ok(summary)
    }

    fn file_path(&self, directory: &Path, stem: &str) -> PathBuf {
        directory.join(format!("{}.{}", stem, self.settings.format.extension()))
    }
}

/// Serialize rows to `path` in the requested format
pub fn write_rows<T: Serialize>(path: &Path, rows: &[T], format: OutputFormat) -> Result<()> {
    let failed = |e: &dyn std::fmt::Display| -> anyhow::Error {
        RatingError::ExportFailed {
            message: format!("{}: {}", path.display(), e),
        }
        .into()
    };

    match format {
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_path(path).map_err(|e| failed(&e))?;
            for row in rows {
                writer.serialize(row).map_err(|e| failed(&e))?;
            }
            writer.flush().map_err(|e| failed(&e))?;
        }
        OutputFormat::Json => {
            let file = File::create(path).map_err(|e| failed(&e))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, rows).map_err(|e| failed(&e))?;
            writer.flush().map_err(|e| failed(&e))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RatingConfig;
    use crate::processing::MatchProcessor;
    use crate::rating::TrueSkillEngine;
    use crate::types::{MatchRecord, MatchWinner};
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn sample_run() -> RatingRun {
        let engine = Arc::new(TrueSkillEngine::new(RatingConfig::default()).unwrap());
        let mut processor = MatchProcessor::new(engine);
        let players = |names: [&str; 2]| names.iter().map(|s| s.to_string()).collect();
        processor
            .process_all(&[
                MatchRecord::new(
                    Utc.with_ymd_and_hms(2024, 2, 1, 19, 0, 0).unwrap(),
                    players(["a", "b"]),
                    players(["c", "d"]),
                    MatchWinner::Red,
                ),
                MatchRecord::new(
                    Utc.with_ymd_and_hms(2024, 2, 1, 20, 0, 0).unwrap(),
                    players(["a", "c"]),
                    players(["b", "d"]),
                    MatchWinner::Blue,
                ),
            ])
            .unwrap();
        processor.into_run()
    }

    #[test]
    fn test_csv_export() {
        let dir = tempfile::tempdir().unwrap();
        let settings = OutputSettings {
            directory: dir.path().to_path_buf(),
            metrics_file: "metrics.prom".to_string(),
            ..OutputSettings::default()
        };
        let metrics = RunMetrics::new("club").unwrap();

        let summary = ResultExporter::new(settings)
            .export("club", &sample_run(), Some(&metrics))
            .unwrap();
        assert_eq!(summary.files.len(), 4);

        let leaderboard = fs::read_to_string(dir.path().join("club/leaderboard.csv")).unwrap();
        let mut lines = leaderboard.lines();
        assert_eq!(
            lines.next(),
            Some("rank,player,mean,stddev,score,matches_played")
        );
        assert_eq!(lines.count(), 4);

        let history = fs::read_to_string(dir.path().join("club/history.csv")).unwrap();
        assert_eq!(history.lines().count(), 1 + 8);

        // Both matches on the same day: one row per player
        let daily = fs::read_to_string(dir.path().join("club/history_daily.csv")).unwrap();
        assert_eq!(daily.lines().count(), 1 + 4);

        assert!(dir.path().join("club/metrics.prom").exists());
    }

    #[test]
    fn test_json_export() {
        let dir = tempfile::tempdir().unwrap();
        let settings = OutputSettings {
            directory: dir.path().to_path_buf(),
            format: OutputFormat::Json,
            daily_history_file: String::new(),
            ..OutputSettings::default()
        };

        let summary = ResultExporter::new(settings)
            .export("club", &sample_run(), None)
            .unwrap();
        assert_eq!(summary.files.len(), 2);

        let raw = fs::read_to_string(dir.path().join("club/leaderboard.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let rows = parsed.as_array().unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0]["rank"], 1);
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as an output file
        let err = write_rows(dir.path(), &[1, 2, 3], OutputFormat::Json).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RatingError>(),
            Some(RatingError::ExportFailed { .. })
        ));

        let path = dir.path().join("rows.json");
        write_rows(&path, &[1, 2, 3], OutputFormat::Json).unwrap();
        let parsed: Vec<i32> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, vec![1, 2, 3]);
    }
}
