//! Weng-Lin (OpenSkill) rating engine
//!
//! This module provides an alternative Bayesian engine backed by the
//! Weng-Lin algorithm from the skillratings crate. It shares the belief,
//! outcome and dynamics conventions of the TrueSkill engine so either can
//! drive a run.

use crate::config::RatingConfig;
use crate::error::Result;
use crate::rating::engine::{match_quality, validate_match, RatingEngine, TeamRatingUpdate};
use crate::types::{Belief, MatchOutcome};
use serde::{Deserialize, Serialize};
use skillratings::weng_lin::{weng_lin_two_teams, WengLinConfig, WengLinRating};
use skillratings::Outcomes;
use tracing::warn;

/// Uncertainty reduction floor handed to the Weng-Lin update
const UNCERTAINTY_TOLERANCE: f64 = 0.000_001;

/// Weng-Lin parameters derived from the shared rating configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtendedWengLinConfig {
    /// Core Weng-Lin parameters
    pub weng_lin_config: WengLinConfig,
    /// Initial belief for new players
    pub prior: Belief,
    /// Skill drift added before each match
    pub tau: f64,
    /// Whether drawn matches are accepted
    pub allow_draws: bool,
}

impl From<&RatingConfig> for ExtendedWengLinConfig {
    fn from(config: &RatingConfig) -> Self {
        Self {
            weng_lin_config: WengLinConfig {
                beta: config.beta(),
                uncertainty_tolerance: UNCERTAINTY_TOLERANCE,
            },
            prior: config.prior(),
            tau: config.tau(),
            allow_draws: config.allow_draws,
        }
    }
}

/// Weng-Lin rating engine implementation
#[derive(Debug)]
pub struct WengLinEngine {
    config: ExtendedWengLinConfig,
}

impl WengLinEngine {
    /// Create a new Weng-Lin engine
    pub fn new(config: RatingConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config: ExtendedWengLinConfig::from(&config),
        })
    }

    pub fn config(&self) -> &ExtendedWengLinConfig {
        &self.config
    }

    fn inflate(&self, team: &[Belief]) -> Vec<WengLinRating> {
        let tau_sq = self.config.tau * self.config.tau;
        team.iter()
            .map(|b| WengLinRating {
                rating: b.mean,
                uncertainty: (b.variance() + tau_sq).sqrt(),
            })
            .collect()
    }
}

impl RatingEngine for WengLinEngine {
    fn rate_match(
        &self,
        team_one: &[Belief],
        team_two: &[Belief],
        outcome: MatchOutcome,
    ) -> Result<TeamRatingUpdate> {
        validate_match(team_one, team_two, outcome, self.config.allow_draws)?;

        let quality = match_quality(team_one, team_two, self.beta());
        let one = self.inflate(team_one);
        let two = self.inflate(team_two);

        let outcome = match outcome {
            MatchOutcome::TeamOneWins => Outcomes::WIN,
            MatchOutcome::TeamTwoWins => Outcomes::LOSS,
            MatchOutcome::Draw => Outcomes::DRAW,
        };

        let (new_one, new_two) =
            weng_lin_two_teams(&one, &two, &outcome, &self.config.weng_lin_config);

        let into_beliefs = |ratings: Vec<WengLinRating>| -> Vec<Belief> {
            ratings
                .into_iter()
                .map(|r| {
                    if r.uncertainty <= 0.0 {
                        warn!("Weng-Lin returned non-positive uncertainty {}", r.uncertainty);
                    }
                    let mut belief = Belief::from(r);
                    belief.stddev = belief.stddev.max(UNCERTAINTY_TOLERANCE);
                    belief
                })
                .collect()
        };

        Ok(TeamRatingUpdate {
            team_one: into_beliefs(new_one),
            team_two: into_beliefs(new_two),
            match_quality: quality,
        })
    }

    fn prior(&self) -> Belief {
        self.config.prior
    }

    fn beta(&self) -> f64 {
        self.config.weng_lin_config.beta
    }

    fn name(&self) -> &'static str {
        "weng_lin"
    }
}
