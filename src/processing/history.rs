//! Dense rating history
//!
//! After every processed match one entry is appended for every player known
//! at that point, whether or not they played. Entries are never mutated.

use crate::rating::RatingEntry;
use crate::types::PlayerId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One player's belief as observed right after a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// 1-based index of the match that produced this snapshot
    pub match_index: usize,
    pub timestamp: DateTime<Utc>,
    pub player: PlayerId,
    pub mean: f64,
    pub stddev: f64,
    pub score: f64,
}

/// Append-only sequence of per-match snapshots
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
    /// Start offset of each snapshot in `entries`
    snapshot_starts: Vec<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every known player's belief after match `match_index`.
    /// Returns the number of entries appended.
    pub fn append_snapshot<'a, I>(
        &mut self,
        match_index: usize,
        timestamp: DateTime<Utc>,
        players: I,
    ) -> usize
    where
        I: IntoIterator<Item = &'a RatingEntry>,
    {
        let start = self.entries.len();
        self.snapshot_starts.push(start);

        self.entries.extend(players.into_iter().map(|entry| HistoryEntry {
            match_index,
            timestamp,
            player: entry.player_id.clone(),
            mean: entry.belief.mean,
            stddev: entry.belief.stddev,
            score: entry.belief.score(),
        }));

        self.entries.len() - start
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of snapshots taken (one per processed match)
    pub fn snapshot_count(&self) -> usize {
        self.snapshot_starts.len()
    }

    /// Entries recorded after the `n`-th snapshot (0-based)
    pub fn snapshot(&self, n: usize) -> Option<&[HistoryEntry]> {
        let start = *self.snapshot_starts.get(n)?;
        let end = self
            .snapshot_starts
            .get(n + 1)
            .copied()
            .unwrap_or(self.entries.len());
        Some(&self.entries[start..end])
    }

    /// Timeline of a single player
    pub fn for_player<'a>(&'a self, player: &'a str) -> impl Iterator<Item = &'a HistoryEntry> + 'a {
        self.entries.iter().filter(move |e| e.player == player)
    }

    /// Last entry per player per calendar day, in order of first appearance
    pub fn daily_series(&self) -> Vec<HistoryEntry> {
        let mut slots: HashMap<(&str, NaiveDate), usize> = HashMap::new();
        let mut series: Vec<HistoryEntry> = Vec::new();

        for entry in &self.entries {
            let key = (entry.player.as_str(), entry.timestamp.date_naive());
            match slots.get(&key) {
                Some(&i) => series[i] = entry.clone(),
                None => {
                    slots.insert(key, series.len());
                    series.push(entry.clone());
                }
            }
        }

        series
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Belief;
    use chrono::TimeZone;

    fn entry(player: &str, mean: f64) -> RatingEntry {
        RatingEntry::new(player.to_string(), Belief::new(mean, 5.0))
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_append_snapshot() {
        let mut history = History::new();
        let players = vec![entry("a", 26.0), entry("b", 24.0)];

        assert_eq!(history.append_snapshot(1, at(1, 10), &players), 2);
        assert_eq!(history.len(), 2);
        assert_eq!(history.snapshot_count(), 1);

        let first = &history.entries()[0];
        assert_eq!(first.match_index, 1);
        assert_eq!(first.player, "a");
        assert_eq!(first.score, 26.0 - 15.0);
    }

    #[test]
    fn test_snapshots_and_player_timeline() {
        let mut history = History::new();
        history.append_snapshot(1, at(1, 10), &[entry("a", 26.0)]);
        history.append_snapshot(2, at(1, 11), &[entry("a", 27.0), entry("b", 23.0)]);

        assert_eq!(history.snapshot(0).unwrap().len(), 1);
        assert_eq!(history.snapshot(1).unwrap().len(), 2);
        assert!(history.snapshot(2).is_none());

        let a: Vec<f64> = history.for_player("a").map(|e| e.mean).collect();
        assert_eq!(a, vec![26.0, 27.0]);
    }

    #[test]
    fn test_daily_series_keeps_last_of_day() {
        let mut history = History::new();
        history.append_snapshot(1, at(1, 10), &[entry("a", 26.0)]);
        history.append_snapshot(2, at(1, 20), &[entry("a", 28.0), entry("b", 22.0)]);
        history.append_snapshot(3, at(2, 9), &[entry("a", 27.0), entry("b", 23.0)]);

        let daily = history.daily_series();
        let summary: Vec<(&str, usize, f64)> = daily
            .iter()
            .map(|e| (e.player.as_str(), e.match_index, e.mean))
            .collect();

        assert_eq!(
            summary,
            vec![("a", 2, 28.0), ("b", 2, 22.0), ("a", 3, 27.0), ("b", 3, 23.0)]
        );
    }
}
