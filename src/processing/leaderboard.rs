//! Final ranking
//!
//! Players are ranked by conservative score (`mean - 3 * stddev`), highest
//! first. Equal scores fall back to the higher mean, then to the player
//! identifier in ascending order, so the table is reproducible.

use crate::rating::{MatchCounter, RatingStore};
use crate::types::PlayerId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position
    pub rank: usize,
    pub player: PlayerId,
    pub mean: f64,
    pub stddev: f64,
    pub score: f64,
    pub matches_played: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Rank every player in the store
    pub fn build<S: RatingStore + ?Sized>(store: &S, counter: &MatchCounter) -> Self {
        let mut entries: Vec<LeaderboardEntry> = store
            .entries()
            .iter()
            .map(|entry| LeaderboardEntry {
                rank: 0,
                player: entry.player_id.clone(),
                mean: entry.belief.mean,
                stddev: entry.belief.stddev,
                score: entry.belief.score(),
                matches_played: counter.get(&entry.player_id),
            })
            .collect();

        entries.sort_by(compare_entries);
        for (i, entry) in entries.iter_mut().enumerate() {
            entry.rank = i + 1;
        }

        Self { entries }
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn get(&self, player: &str) -> Option<&LeaderboardEntry> {
        self.entries.iter().find(|e| e.player == player)
    }

    pub fn top(&self, n: usize) -> &[LeaderboardEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn compare_entries(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.mean.total_cmp(&a.mean))
        .then_with(|| a.player.cmp(&b.player))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::InMemoryRatingStore;
    use crate::types::Belief;

    fn store_with(players: &[(&str, f64, f64)]) -> InMemoryRatingStore {
        let mut store = InMemoryRatingStore::new(Belief::new(25.0, 25.0 / 3.0));
        for (name, mean, stddev) in players {
            store.set(name, Belief::new(*mean, *stddev));
        }
        store
    }

    #[test]
    fn test_sorted_by_score() {
        let store = store_with(&[("low", 20.0, 2.0), ("high", 30.0, 2.0), ("mid", 28.0, 4.0)]);
        let mut counter = MatchCounter::new();
        counter.increment("high");
        counter.increment("high");
        counter.increment("mid");

        let board = Leaderboard::build(&store, &counter);
        let order: Vec<&str> = board.entries().iter().map(|e| e.player.as_str()).collect();
        assert_eq!(order, vec!["high", "low", "mid"]);

        let high = board.get("high").unwrap();
        assert_eq!(high.rank, 1);
        assert_eq!(high.score, 24.0);
        assert_eq!(high.matches_played, 2);
        assert_eq!(board.get("low").unwrap().matches_played, 0);
    }

    #[test]
    fn test_tie_breaks() {
        // Same score, different mean
        let store = store_with(&[("a", 20.0, 2.0), ("b", 23.0, 3.0)]);
        let board = Leaderboard::build(&store, &MatchCounter::new());
        assert_eq!(board.entries()[0].player, "b");

        // Identical beliefs fall back to name order
        let store = store_with(&[("zed", 25.0, 3.0), ("amy", 25.0, 3.0)]);
        let board = Leaderboard::build(&store, &MatchCounter::new());
        assert_eq!(board.entries()[0].player, "amy");
        assert_eq!(board.entries()[1].rank, 2);
    }

    #[test]
    fn test_empty_and_top() {
        let store = store_with(&[]);
        let board = Leaderboard::build(&store, &MatchCounter::new());
        assert!(board.is_empty());
        assert!(board.top(3).is_empty());

        let store = store_with(&[("a", 20.0, 1.0), ("b", 21.0, 1.0)]);
        let board = Leaderboard::build(&store, &MatchCounter::new());
        assert_eq!(board.top(1).len(), 1);
        assert_eq!(board.top(10).len(), 2);
    }
}
