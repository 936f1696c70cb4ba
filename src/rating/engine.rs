//! Rating engine trait and shared helpers
//!
//! A rating engine turns two teams of beliefs plus an outcome into updated
//! beliefs for every participant. Engines are pure: they never touch the
//! rating store.

use crate::config::{RatingAlgorithm, RatingConfig};
use crate::error::{RatingError, Result};
use crate::rating::gaussian;
use crate::rating::trueskill::TrueSkillEngine;
use crate::rating::weng_lin::WengLinEngine;
use crate::types::{Belief, MatchOutcome};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Updated beliefs for both teams, in the order the players were passed in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRatingUpdate {
    pub team_one: Vec<Belief>,
    pub team_two: Vec<Belief>,
    /// Draw probability under the pre-match beliefs (0.0 to 1.0, higher is more even)
    pub match_quality: f64,
}

/// Trait for two-team Bayesian rating updates
pub trait RatingEngine: Send + Sync {
    /// Rate a single match between two teams
    ///
    /// # Arguments
    /// * `team_one` - Current beliefs of the first team's players
    /// * `team_two` - Current beliefs of the second team's players
    /// * `outcome` - Result relative to that team order
    fn rate_match(
        &self,
        team_one: &[Belief],
        team_two: &[Belief],
        outcome: MatchOutcome,
    ) -> Result<TeamRatingUpdate>;

    /// Belief given to players on first reference
    fn prior(&self) -> Belief;

    /// Performance noise used for quality and win probability estimates
    fn beta(&self) -> f64;

    /// Short engine name for logs and metrics
    fn name(&self) -> &'static str;

    /// Probability of a draw between the two teams (TrueSkill match quality)
    fn match_quality(&self, team_one: &[Belief], team_two: &[Belief]) -> f64 {
        match_quality(team_one, team_two, self.beta())
    }

    /// Probability that team one outperforms team two
    fn win_probability(&self, team_one: &[Belief], team_two: &[Belief]) -> f64 {
        let (delta, spread) = team_gap(team_one, team_two, self.beta());
        gaussian::cdf(delta / spread)
    }
}

/// Create the engine selected by the configuration
pub fn build_engine(config: &RatingConfig) -> Result<Box<dyn RatingEngine>> {
    let engine: Box<dyn RatingEngine> = match config.algorithm {
        RatingAlgorithm::TrueSkill => Box::new(TrueSkillEngine::new(config.clone())?),
        RatingAlgorithm::WengLin => Box::new(WengLinEngine::new(config.clone())?),
    };
    Ok(engine)
}

/// Reject empty teams and draws the configuration does not allow
pub fn validate_match(
    team_one: &[Belief],
    team_two: &[Belief],
    outcome: MatchOutcome,
    allow_draws: bool,
) -> Result<()> {
    if team_one.is_empty() {
        return Err(RatingError::InvalidTeamSize { team: 1, size: 0 }.into());
    }
    if team_two.is_empty() {
        return Err(RatingError::InvalidTeamSize { team: 2, size: 0 }.into());
    }
    if outcome == MatchOutcome::Draw && !allow_draws {
        return Err(RatingError::InvalidOutcome {
            reason: "draws are disabled, exactly one team must win".to_string(),
        }
        .into());
    }
    Ok(())
}

/// Mean difference (team one minus team two) and the combined performance spread
fn team_gap(team_one: &[Belief], team_two: &[Belief], beta: f64) -> (f64, f64) {
    let players = (team_one.len() + team_two.len()) as f64;
    let delta = team_one.iter().map(|b| b.mean).sum::<f64>()
        - team_two.iter().map(|b| b.mean).sum::<f64>();
    let variance: f64 = team_one
        .iter()
        .chain(team_two.iter())
        .map(Belief::variance)
        .sum();
    let spread = (players * beta * beta + variance).sqrt().max(f64::EPSILON);
    (delta, spread)
}

/// TrueSkill two-team match quality
pub fn match_quality(team_one: &[Belief], team_two: &[Belief], beta: f64) -> f64 {
    if team_one.is_empty() || team_two.is_empty() {
        return 0.0;
    }

    let players = (team_one.len() + team_two.len()) as f64;
    let (delta, spread) = team_gap(team_one, team_two, beta);
    let denom = spread * spread;

    ((players * beta * beta) / denom).sqrt() * (-(delta * delta) / (2.0 * denom)).exp()
}

/// Mock rating engine for testing; returns beliefs unchanged unless told otherwise
#[derive(Debug)]
pub struct MockRatingEngine {
    prior: Belief,
    shift: f64,
    calls: Mutex<Vec<(Vec<Belief>, Vec<Belief>, MatchOutcome)>>,
}

impl MockRatingEngine {
    pub fn new(prior: Belief) -> Self {
        Self {
            prior,
            shift: 0.0,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Move winners up and losers down by a fixed amount
    pub fn with_shift(mut self, shift: f64) -> Self {
        self.shift = shift;
        self
    }

    /// All rate_match calls made (for testing)
    pub fn get_calls(&self) -> Vec<(Vec<Belief>, Vec<Belief>, MatchOutcome)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl RatingEngine for MockRatingEngine {
    fn rate_match(
        &self,
        team_one: &[Belief],
        team_two: &[Belief],
        outcome: MatchOutcome,
    ) -> Result<TeamRatingUpdate> {
        validate_match(team_one, team_two, outcome, true)?;

        if let Ok(mut calls) = self.calls.lock() {
            calls.push((team_one.to_vec(), team_two.to_vec(), outcome));
        }

        let sign = match outcome {
            MatchOutcome::TeamOneWins => 1.0,
            MatchOutcome::TeamTwoWins => -1.0,
            MatchOutcome::Draw => 0.0,
        };
        let shifted = |team: &[Belief], sign: f64| -> Vec<Belief> {
            team.iter()
                .map(|b| Belief::new(b.mean + sign * self.shift, b.stddev))
                .collect()
        };

        Ok(TeamRatingUpdate {
            team_one: shifted(team_one, sign),
            team_two: shifted(team_two, -sign),
            match_quality: 1.0,
        })
    }

    fn prior(&self) -> Belief {
        self.prior
    }

    fn beta(&self) -> f64 {
        self.prior.stddev / 2.0
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
