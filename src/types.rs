//! Common types used throughout the rating service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skillratings::weng_lin::WengLinRating;

/// Unique identifier for players
pub type PlayerId = String;

/// Unique identifier for a processing run
pub type RunId = uuid::Uuid;

/// Number of standard deviations subtracted from the mean for the conservative score
pub const CONSERVATIVE_SIGMAS: f64 = 3.0;

/// Gaussian belief over a player's latent skill
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Belief {
    pub mean: f64,
    pub stddev: f64,
}

impl Belief {
    pub fn new(mean: f64, stddev: f64) -> Self {
        Self { mean, stddev }
    }

    pub fn variance(&self) -> f64 {
        self.stddev * self.stddev
    }

    /// Conservative skill estimate, `mean - 3 * stddev`
    pub fn score(&self) -> f64 {
        self.mean - CONSERVATIVE_SIGMAS * self.stddev
    }
}

impl From<WengLinRating> for Belief {
    fn from(rating: WengLinRating) -> Self {
        Self {
            mean: rating.rating,
            stddev: rating.uncertainty,
        }
    }
}

impl From<Belief> for WengLinRating {
    fn from(belief: Belief) -> Self {
        Self {
            rating: belief.mean,
            uncertainty: belief.stddev,
        }
    }
}

/// Recorded result of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchWinner {
    Red,
    Blue,
    Draw,
}

impl std::fmt::Display for MatchWinner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchWinner::Red => write!(f, "red"),
            MatchWinner::Blue => write!(f, "blue"),
            MatchWinner::Draw => write!(f, "draw"),
        }
    }
}

/// Outcome as seen by a rating engine, relative to the order the teams are passed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchOutcome {
    TeamOneWins,
    TeamTwoWins,
    Draw,
}

impl From<MatchWinner> for MatchOutcome {
    fn from(winner: MatchWinner) -> Self {
        match winner {
            MatchWinner::Red => MatchOutcome::TeamOneWins,
            MatchWinner::Blue => MatchOutcome::TeamTwoWins,
            MatchWinner::Draw => MatchOutcome::Draw,
        }
    }
}

/// A single played match. Red is always passed to the engine as team one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub timestamp: DateTime<Utc>,
    pub team_red: Vec<PlayerId>,
    pub team_blue: Vec<PlayerId>,
    pub winner: MatchWinner,
}

impl MatchRecord {
    pub fn new(
        timestamp: DateTime<Utc>,
        team_red: Vec<PlayerId>,
        team_blue: Vec<PlayerId>,
        winner: MatchWinner,
    ) -> Self {
        Self {
            timestamp,
            team_red,
            team_blue,
            winner,
        }
    }

    /// All participants, red team first
    pub fn participants(&self) -> impl Iterator<Item = &PlayerId> {
        self.team_red.iter().chain(self.team_blue.iter())
    }
}
