//! Rating store interface and in-memory implementation
//!
//! The store maps player identifiers to their current belief. A player's
//! entry is created on first reference with the configured prior and is
//! never removed. Iteration follows first-seen order.
//!
//! A store is owned by exactly one run and mutated through `&mut self`, so
//! no locking is involved.

use crate::error::{RatingError, Result};
use crate::types::{Belief, PlayerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Storage entry for a player's belief with metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingEntry {
    pub player_id: PlayerId,
    pub belief: Belief,
    /// Timestamp of the last match this player took part in
    pub last_played: Option<DateTime<Utc>>,
}

impl RatingEntry {
    /// Create a new rating entry for a new player
    pub fn new(player_id: PlayerId, initial: Belief) -> Self {
        Self {
            player_id,
            belief: initial,
            last_played: None,
        }
    }
}

/// Trait for rating store operations
pub trait RatingStore {
    /// Current belief, created from the prior on first access
    fn get_or_create(&mut self, player_id: &str) -> Belief;

    /// Current belief without creating the player
    fn get(&self, player_id: &str) -> Option<Belief>;

    /// Overwrite a player's belief, creating the entry if needed
    fn set(&mut self, player_id: &str, belief: Belief);

    /// Record that a known player took part in a match
    fn mark_played(&mut self, player_id: &str, timestamp: DateTime<Utc>) -> Result<()>;

    /// All entries in first-seen order
    fn entries(&self) -> &[RatingEntry];

    /// Prior handed to unseen players
    fn prior(&self) -> Belief;

    /// Number of known players
    fn len(&self) -> usize {
        self.entries().len()
    }

    fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

/// In-memory rating store
#[derive(Debug, Clone)]
pub struct InMemoryRatingStore {
    prior: Belief,
    index: HashMap<PlayerId, usize>,
    entries: Vec<RatingEntry>,
}

impl InMemoryRatingStore {
    /// Create an empty store handing out `prior` to new players
    pub fn new(prior: Belief) -> Self {
        Self {
            prior,
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Look up a full entry
    pub fn entry(&self, player_id: &str) -> Option<&RatingEntry> {
        self.index.get(player_id).map(|&i| &self.entries[i])
    }

    fn slot(&mut self, player_id: &str) -> usize {
        if let Some(&i) = self.index.get(player_id) {
            return i;
        }
        let i = self.entries.len();
        self.entries
            .push(RatingEntry::new(player_id.to_string(), self.prior));
        self.index.insert(player_id.to_string(), i);
        i
    }
}

impl RatingStore for InMemoryRatingStore {
    fn get_or_create(&mut self, player_id: &str) -> Belief {
        let i = self.slot(player_id);
        self.entries[i].belief
    }

    fn get(&self, player_id: &str) -> Option<Belief> {
        self.entry(player_id).map(|entry| entry.belief)
    }

    fn set(&mut self, player_id: &str, belief: Belief) {
        let i = self.slot(player_id);
        self.entries[i].belief = belief;
    }

    fn mark_played(&mut self, player_id: &str, timestamp: DateTime<Utc>) -> Result<()> {
        let i = *self
            .index
            .get(player_id)
            .ok_or_else(|| RatingError::PlayerNotFound {
                player_id: player_id.to_string(),
            })?;
        self.entries[i].last_played = Some(timestamp);
        Ok(())
    }

    fn entries(&self) -> &[RatingEntry] {
        &self.entries
    }

    fn prior(&self) -> Belief {
        self.prior
    }
}

/// Number of matches each player has taken part in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchCounter {
    counts: HashMap<PlayerId, u64>,
}

impl MatchCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, player_id: &str) {
        *self.counts.entry(player_id.to_string()).or_insert(0) += 1;
    }

    /// Matches played, zero for unknown players
    pub fn get(&self, player_id: &str) -> u64 {
        self.counts.get(player_id).copied().unwrap_or(0)
    }

    /// Sum over all players (each match counts once per participant)
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn prior() -> Belief {
        Belief::new(25.0, 25.0 / 3.0)
    }

    #[test]
    fn test_get_or_create_returns_prior() {
        let mut store = InMemoryRatingStore::new(prior());
        assert!(store.is_empty());

        let belief = store.get_or_create("alice");
        assert_eq!(belief, prior());
        assert_eq!(store.len(), 1);

        // Second access does not duplicate
        store.get_or_create("alice");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_set_overwrites() {
        let mut store = InMemoryRatingStore::new(prior());
        store.get_or_create("alice");
        store.set("alice", Belief::new(30.0, 5.0));

        assert_eq!(store.get("alice"), Some(Belief::new(30.0, 5.0)));
        assert_eq!(store.get_or_create("alice"), Belief::new(30.0, 5.0));
        assert_eq!(store.get("bob"), None);
    }

    #[test]
    fn test_first_seen_order() {
        let mut store = InMemoryRatingStore::new(prior());
        for name in ["zoe", "adam", "mia", "adam", "bob"] {
            store.get_or_create(name);
        }

        let order: Vec<&str> = store
            .entries()
            .iter()
            .map(|e| e.player_id.as_str())
            .collect();
        assert_eq!(order, vec!["zoe", "adam", "mia", "bob"]);
    }

    #[test]
    fn test_mark_played() {
        let mut store = InMemoryRatingStore::new(prior());
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap();

        let err = store.mark_played("ghost", at).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RatingError>(),
            Some(RatingError::PlayerNotFound { .. })
        ));

        store.get_or_create("alice");
        store.mark_played("alice", at).unwrap();
        assert_eq!(store.entry("alice").unwrap().last_played, Some(at));
    }

    #[test]
    fn test_match_counter() {
        let mut counter = MatchCounter::new();
        counter.increment("alice");
        counter.increment("alice");
        counter.increment("bob");

        assert_eq!(counter.get("alice"), 2);
        assert_eq!(counter.get("bob"), 1);
        assert_eq!(counter.get("carol"), 0);
        assert_eq!(counter.total(), 3);
    }
}
