//! Match sheet loading
//!
//! Reads a CSV match sheet, maps the configured columns onto match records
//! and orders them by timestamp. Rows sharing a timestamp keep their sheet
//! order.

use crate::config::InputSettings;
use crate::error::{RatingError, Result};
use crate::types::{MatchRecord, MatchWinner, PlayerId};
use anyhow::Context;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Parse the timestamp formats match sheets are exported with
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0).map(|ts| ts.and_utc());
        }
    }
    None
}

/// Column positions resolved from the header row
#[derive(Debug)]
struct ColumnMap {
    timestamp: usize,
    red: Vec<usize>,
    blue: Vec<usize>,
    winner: usize,
}

/// Loads match records from CSV
#[derive(Debug, Clone)]
pub struct MatchLoader {
    settings: InputSettings,
}

impl MatchLoader {
    pub fn new(settings: InputSettings) -> Self {
        Self { settings }
    }

    /// Load and sort the matches of a sheet on disk
    pub fn load_path(&self, path: &Path) -> Result<Vec<MatchRecord>> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open match sheet {}", path.display()))?;
        let records = self
            .load_reader(file)
            .with_context(|| format!("Failed to load match sheet {}", path.display()))?;

        info!("Loaded {} matches from {}", records.len(), path.display());
        Ok(records)
    }

    /// Load and sort the matches of any CSV source
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<Vec<MatchRecord>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.settings.delimiter as u8)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers().context("Failed to read header row")?.clone();
        let columns = self.resolve_columns(&headers)?;

        let mut records = Vec::new();
        for (i, row) in reader.records().enumerate() {
            // Header is line 1
            let line = i + 2;
            let row = row.with_context(|| format!("Failed to read line {}", line))?;

            if row.iter().all(str::is_empty) {
                debug!(line, "skipping blank row");
                continue;
            }

            records.push(self.parse_row(&row, &columns, line)?);
        }

        records.sort_by_key(|record| record.timestamp);
        Ok(records)
    }

    fn resolve_columns(&self, headers: &StringRecord) -> Result<ColumnMap> {
        let find = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| {
                    RatingError::ConfigurationError {
                        message: format!("Match sheet has no '{}' column", name),
                    }
                    .into()
                })
        };

        Ok(ColumnMap {
            timestamp: find(&self.settings.timestamp_column)?,
            red: self
                .settings
                .red_columns
                .iter()
                .map(|c| find(c))
                .collect::<Result<_>>()?,
            blue: self
                .settings
                .blue_columns
                .iter()
                .map(|c| find(c))
                .collect::<Result<_>>()?,
            winner: find(&self.settings.winner_column)?,
        })
    }

    fn parse_row(&self, row: &StringRecord, columns: &ColumnMap, line: usize) -> Result<MatchRecord> {
        let cell = |i: usize| row.get(i).unwrap_or("");
        let invalid = |reason: String| -> anyhow::Error {
            RatingError::InvalidMatchRecord { row: line, reason }.into()
        };

        let raw_timestamp = cell(columns.timestamp);
        let timestamp = parse_timestamp(raw_timestamp)
            .ok_or_else(|| invalid(format!("unrecognised timestamp '{}'", raw_timestamp)))?;

        let team = |indices: &[usize]| -> Result<Vec<PlayerId>> {
            indices
                .iter()
                .map(|&i| {
                    let name = cell(i);
                    if name.is_empty() {
                        Err(invalid("missing player name".to_string()))
                    } else {
                        Ok(name.to_string())
                    }
                })
                .collect()
        };
        let team_red = team(&columns.red)?;
        let team_blue = team(&columns.blue)?;

        let raw_winner = cell(columns.winner);
        let winner = self
            .parse_winner(raw_winner)
            .ok_or_else(|| invalid(format!("unrecognised winner '{}'", raw_winner)))?;

        Ok(MatchRecord::new(timestamp, team_red, team_blue, winner))
    }

    fn parse_winner(&self, raw: &str) -> Option<MatchWinner> {
        let matches = |labels: &[String]| labels.iter().any(|l| l.eq_ignore_ascii_case(raw));

        if matches(&self.settings.red_labels) {
            Some(MatchWinner::Red)
        } else if matches(&self.settings.blue_labels) {
            Some(MatchWinner::Blue)
        } else if matches(&self.settings.draw_labels) {
            Some(MatchWinner::Draw)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn loader() -> MatchLoader {
        MatchLoader::new(InputSettings::default())
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 18, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-01T18:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01 18:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T18:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01 18:30"), Some(expected));

        let midnight = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-01"), Some(midnight));
        assert_eq!(parse_timestamp("01/03/2024"), Some(midnight));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_load_sorts_stably() {
        let sheet = "\
date,red_p1,red_p2,blue_p1,blue_p2,winner
2024-03-02,a,b,c,d,red
2024-03-01,e,f,g,h,Blue
2024-03-02, i ,j,k,l,BLUE
";
        let records = loader().load_reader(sheet.as_bytes()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].team_red, vec!["e", "f"]);
        assert_eq!(records[0].winner, MatchWinner::Blue);
        // Same day keeps sheet order
        assert_eq!(records[1].team_red, vec!["a", "b"]);
        assert_eq!(records[2].team_red, vec!["i", "j"]);
    }

    #[test]
    fn test_custom_columns_and_labels() {
        let settings = InputSettings {
            timestamp_column: "when".to_string(),
            red_columns: vec!["r1".to_string(), "r2".to_string()],
            blue_columns: vec!["b1".to_string(), "b2".to_string()],
            winner_column: "won".to_string(),
            red_labels: vec!["rouge".to_string()],
            blue_labels: vec!["bleu".to_string()],
            draw_labels: vec!["nul".to_string()],
            delimiter: ';',
        };
        let sheet = "when;r1;r2;b1;b2;won\n2024-01-05 20:00;a;b;c;d;rouge\n2024-01-06 20:00;a;c;b;d;nul\n";

        let records = MatchLoader::new(settings).load_reader(sheet.as_bytes()).unwrap();
        assert_eq!(records[0].winner, MatchWinner::Red);
        assert_eq!(records[1].winner, MatchWinner::Draw);
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let sheet = "date,red_p1,red_p2,blue_p1,blue_p2,winner\n2024-03-01,a,b,c,d,red\n,,,,,\n";
        let records = loader().load_reader(sheet.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_invalid_rows() {
        let bad_winner = "date,red_p1,red_p2,blue_p1,blue_p2,winner\n2024-03-01,a,b,c,d,green\n";
        let err = loader().load_reader(bad_winner.as_bytes()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RatingError>(),
            Some(RatingError::InvalidMatchRecord { row: 2, .. })
        ));

        let bad_date = "date,red_p1,red_p2,blue_p1,blue_p2,winner\n2024-03-01,a,b,c,d,red\nsoon,a,b,c,d,red\n";
        let err = loader().load_reader(bad_date.as_bytes()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RatingError>(),
            Some(RatingError::InvalidMatchRecord { row: 3, .. })
        ));

        let missing_player = "date,red_p1,red_p2,blue_p1,blue_p2,winner\n2024-03-01,a,,c,d,red\n";
        assert!(loader().load_reader(missing_player.as_bytes()).is_err());
    }

    #[test]
    fn test_missing_column() {
        let sheet = "date,red_p1,red_p2,blue_p1,winner\n2024-03-01,a,b,c,red\n";
        let err = loader().load_reader(sheet.as_bytes()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RatingError>(),
            Some(RatingError::ConfigurationError { .. })
        ));
    }
}
