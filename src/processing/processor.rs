//! Sequential match processing
//!
//! The processor folds an ordered list of matches into the rating store.
//! Match `i + 1` always observes the beliefs written by match `i`; nothing
//! is reordered or batched.

use crate::error::{RatingError, Result};
use crate::metrics::RunMetrics;
use crate::processing::history::History;
use crate::processing::leaderboard::Leaderboard;
use crate::rating::{InMemoryRatingStore, MatchCounter, RatingEngine, RatingStore};
use crate::types::{Belief, MatchRecord, PlayerId};
use anyhow::Context;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace, warn};

/// Where the processor is in the match sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    /// Waiting for the match at this 0-based position
    Pending(usize),
    /// No further matches accepted
    Done,
}

/// Everything a finished run produces
#[derive(Debug, Clone)]
pub struct RatingRun<S = InMemoryRatingStore> {
    pub store: S,
    pub counter: MatchCounter,
    pub history: History,
    pub leaderboard: Leaderboard,
    pub matches_processed: usize,
}

/// Drives the rating engine over a match sequence
pub struct MatchProcessor<S: RatingStore = InMemoryRatingStore> {
    engine: Arc<dyn RatingEngine>,
    store: S,
    counter: MatchCounter,
    history: History,
    state: ProcessorState,
    metrics: Option<Arc<RunMetrics>>,
}

impl MatchProcessor<InMemoryRatingStore> {
    /// Create a processor with an empty in-memory store seeded with the engine's prior
    pub fn new(engine: Arc<dyn RatingEngine>) -> Self {
        let store = InMemoryRatingStore::new(engine.prior());
        Self::with_store(engine, store)
    }
}

impl<S: RatingStore> MatchProcessor<S> {
    pub fn with_store(engine: Arc<dyn RatingEngine>, store: S) -> Self {
        Self {
            engine,
            store,
            counter: MatchCounter::new(),
            history: History::new(),
            state: ProcessorState::Pending(0),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<RunMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn state(&self) -> ProcessorState {
        self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn counter(&self) -> &MatchCounter {
        &self.counter
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Rate one match and append a snapshot of every known player.
    ///
    /// On error the store, counter and history are left as they were
    /// before the call.
    pub fn process(&mut self, record: &MatchRecord) -> Result<()> {
        let position = match self.state {
            ProcessorState::Pending(position) => position,
            ProcessorState::Done => return Err(RatingError::ProcessorFinished.into()),
        };
        let match_index = position + 1;
        let started = Instant::now();

        warn_on_repeated_players(record, match_index);

        let prior = self.store.prior();
        let current = |players: &[PlayerId]| -> Vec<Belief> {
            players
                .iter()
                .map(|p| self.store.get(p).unwrap_or(prior))
                .collect()
        };
        let red = current(&record.team_red);
        let blue = current(&record.team_blue);

        let update = match self
            .engine
            .rate_match(&red, &blue, record.winner.into())
        {
            Ok(update) => update,
            Err(e) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_failure();
                }
                return Err(e).with_context(|| {
                    format!("Failed to rate match #{} at {}", match_index, record.timestamp)
                });
            }
        };

        let mut shifts = Vec::with_capacity(red.len() + blue.len());
        let written = record
            .team_red
            .iter()
            .zip(red.iter().zip(update.team_one.iter()))
            .chain(
                record
                    .team_blue
                    .iter()
                    .zip(blue.iter().zip(update.team_two.iter())),
            );
        for (player, (before, after)) in written {
            trace!(
                player = %player,
                mean = after.mean,
                stddev = after.stddev,
                "belief updated"
            );
            shifts.push(after.mean - before.mean);
            self.store.set(player, *after);
            self.store.mark_played(player, record.timestamp)?;
            self.counter.increment(player);
        }

        let appended = self
            .history
            .append_snapshot(match_index, record.timestamp, self.store.entries());

        debug!(
            match_index,
            winner = %record.winner,
            quality = update.match_quality,
            players_known = self.store.len(),
            appended,
            "match rated"
        );

        if let Some(metrics) = &self.metrics {
            metrics.record_match(
                update.match_quality,
                &shifts,
                started.elapsed(),
                self.store.len(),
                self.history.len(),
            );
        }

        self.state = ProcessorState::Pending(position + 1);
        Ok(())
    }

    /// Process matches in the given order, stopping at the first failure.
    /// Returns the number of matches processed by this call.
    pub fn process_all<'a, I>(&mut self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a MatchRecord>,
    {
        let mut processed = 0;
        for record in records {
            self.process(record)?;
            processed += 1;
        }
        Ok(processed)
    }

    /// Stop accepting matches
    pub fn finish(&mut self) {
        self.state = ProcessorState::Done;
    }

    /// Number of matches processed so far
    pub fn matches_processed(&self) -> usize {
        self.history.snapshot_count()
    }

    /// Finish and hand over the final state together with the leaderboard
    pub fn into_run(mut self) -> RatingRun<S> {
        self.finish();
        let leaderboard = Leaderboard::build(&self.store, &self.counter);
        let matches_processed = self.matches_processed();

        RatingRun {
            store: self.store,
            counter: self.counter,
            history: self.history,
            leaderboard,
            matches_processed,
        }
    }
}

fn warn_on_repeated_players(record: &MatchRecord, match_index: usize) {
    let mut seen = HashSet::new();
    for player in record.participants() {
        if !seen.insert(player) {
            warn!(
                match_index,
                player = %player,
                "player appears more than once in the same match"
            );
        }
    }
}
