//! Test fixtures for integration testing

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::path::{Path, PathBuf};
use trueskill_ladder::{MatchRecord, MatchWinner};

pub const TOLERANCE: f64 = 1e-3;

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        trueskill_ladder::utils::approx_eq(actual, expected, TOLERANCE),
        "expected {} to be within {} of {}",
        actual,
        TOLERANCE,
        expected
    );
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap()
}

/// Build match records one after another, each a fixed interval apart
#[derive(Debug, Default)]
pub struct ScheduleBuilder {
    records: Vec<MatchRecord>,
    spacing_minutes: i64,
}

impl ScheduleBuilder {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            spacing_minutes: 30,
        }
    }

    /// Matches spaced a whole day apart
    pub fn daily() -> Self {
        Self {
            records: Vec::new(),
            spacing_minutes: 24 * 60,
        }
    }

    pub fn game(mut self, red: &[&str], blue: &[&str], winner: MatchWinner) -> Self {
        let timestamp =
            base_time() + Duration::minutes(self.spacing_minutes * self.records.len() as i64);
        self.records.push(MatchRecord::new(
            timestamp,
            red.iter().map(|s| s.to_string()).collect(),
            blue.iter().map(|s| s.to_string()).collect(),
            winner,
        ));
        self
    }

    pub fn build(self) -> Vec<MatchRecord> {
        self.records
    }
}

/// CSV match sheet with the default column layout
#[derive(Debug)]
pub struct SheetBuilder {
    rows: Vec<String>,
}

impl SheetBuilder {
    pub fn new() -> Self {
        Self {
            rows: vec!["date,red_p1,red_p2,blue_p1,blue_p2,winner".to_string()],
        }
    }

    pub fn row(mut self, date: &str, red: [&str; 2], blue: [&str; 2], winner: &str) -> Self {
        self.rows.push(format!(
            "{},{},{},{},{},{}",
            date, red[0], red[1], blue[0], blue[1], winner
        ));
        self
    }

    pub fn contents(&self) -> String {
        let mut contents = self.rows.join("\n");
        contents.push('\n');
        contents
    }

    pub fn write_to(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.contents()).expect("Failed to write match sheet");
        path
    }
}

/// A small four-player league spread over three days
pub fn sample_sheet() -> SheetBuilder {
    SheetBuilder::new()
        .row("2024-03-01 19:00", ["alice", "bob"], ["carol", "dave"], "red")
        .row("2024-03-01 19:30", ["alice", "carol"], ["bob", "dave"], "red")
        .row("2024-03-02 20:00", ["alice", "dave"], ["bob", "carol"], "red")
        .row("2024-03-03 18:15", ["bob", "dave"], ["alice", "carol"], "blue")
        .row("2024-03-03 18:45", ["carol", "dave"], ["alice", "bob"], "blue")
}
