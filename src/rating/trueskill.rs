//! TrueSkill two-team update
//!
//! Each player's skill is a Gaussian belief. Before a match every
//! participant's variance is inflated by `tau^2`; a team's performance is the
//! sum of its members' skills plus `beta` noise per player. The observed
//! result truncates the distribution of the performance gap and every
//! player moves in proportion to their own variance.

use crate::config::RatingConfig;
use crate::error::Result;
use crate::rating::engine::{match_quality, validate_match, RatingEngine, TeamRatingUpdate};
use crate::rating::gaussian::{draw_margin, v_draw, v_win, w_draw, w_win};
use crate::types::{Belief, MatchOutcome};
use tracing::trace;

/// Floor for the combined performance spread `c`
const MIN_PERFORMANCE_SPREAD: f64 = 1e-6;

/// Floor for a posterior variance
const MIN_VARIANCE: f64 = 1e-12;

/// TrueSkill rating engine
#[derive(Debug, Clone)]
pub struct TrueSkillEngine {
    config: RatingConfig,
}

impl TrueSkillEngine {
    /// Create a new TrueSkill engine
    pub fn new(config: RatingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RatingConfig {
        &self.config
    }

    /// Apply the dynamics step, returning `(mean, variance)` pairs
    fn inflate(&self, team: &[Belief]) -> Vec<(f64, f64)> {
        let tau = self.config.tau();
        team.iter()
            .map(|b| (b.mean, b.variance() + tau * tau))
            .collect()
    }
}

impl RatingEngine for TrueSkillEngine {
    fn rate_match(
        &self,
        team_one: &[Belief],
        team_two: &[Belief],
        outcome: MatchOutcome,
    ) -> Result<TeamRatingUpdate> {
        validate_match(team_one, team_two, outcome, self.config.allow_draws)?;

        let quality = match_quality(team_one, team_two, self.config.beta());

        let one = self.inflate(team_one);
        let two = self.inflate(team_two);

        let beta = self.config.beta();
        let total_players = one.len() + two.len();
        let total_variance: f64 = one.iter().chain(two.iter()).map(|(_, var)| var).sum();
        let c = (total_variance + total_players as f64 * beta * beta)
            .sqrt()
            .max(MIN_PERFORMANCE_SPREAD);

        let margin = draw_margin(self.config.draw_probability, beta, total_players) / c;
        let gap = (one.iter().map(|(mean, _)| mean).sum::<f64>()
            - two.iter().map(|(mean, _)| mean).sum::<f64>())
            / c;

        // (v, w, direction of team one)
        let (v, w, sign) = match outcome {
            MatchOutcome::TeamOneWins => (v_win(gap, margin), w_win(gap, margin), 1.0),
            MatchOutcome::TeamTwoWins => (v_win(-gap, margin), w_win(-gap, margin), -1.0),
            MatchOutcome::Draw => (v_draw(gap, margin), w_draw(gap, margin), 1.0),
        };

        trace!(c, gap, margin, v, w, "trueskill factors");

        let update = |team: &[(f64, f64)], sign: f64| -> Vec<Belief> {
            team.iter()
                .map(|&(mean, variance)| {
                    let mean = mean + sign * (variance / c) * v;
                    let variance = (variance * (1.0 - (variance / (c * c)) * w)).max(MIN_VARIANCE);
                    Belief::new(mean, variance.sqrt())
                })
                .collect()
        };

        Ok(TeamRatingUpdate {
            team_one: update(&one, sign),
            team_two: update(&two, -sign),
            match_quality: quality,
        })
    }

    fn prior(&self) -> Belief {
        self.config.prior()
    }

    fn beta(&self) -> f64 {
        self.config.beta()
    }

    fn name(&self) -> &'static str {
        "trueskill"
    }
}
