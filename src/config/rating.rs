//! Rating system configuration
//!
//! Every parameter except the prior mean is optional. Unset values are
//! derived from the prior the same way the classic TrueSkill environment
//! does it: `stddev = mean / 3`, `beta = stddev / 2`, `tau = stddev / 100`.

use crate::error::{RatingError, Result};
use crate::types::Belief;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const DEFAULT_PRIOR_MEAN: f64 = 25.0;

/// Which Bayesian update backs the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingAlgorithm {
    #[default]
    #[serde(rename = "trueskill")]
    TrueSkill,
    WengLin,
}

impl FromStr for RatingAlgorithm {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "trueskill" | "true_skill" => Ok(RatingAlgorithm::TrueSkill),
            "weng_lin" | "wenglin" | "openskill" => Ok(RatingAlgorithm::WengLin),
            other => Err(RatingError::ConfigurationError {
                message: format!("Unknown rating algorithm: {}", other),
            }
            .into()),
        }
    }
}

impl std::fmt::Display for RatingAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RatingAlgorithm::TrueSkill => write!(f, "trueskill"),
            RatingAlgorithm::WengLin => write!(f, "weng_lin"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    pub algorithm: RatingAlgorithm,
    /// Prior mean (mu0) given to every unseen player
    pub prior_mean: f64,
    /// Prior standard deviation (sigma0), defaults to `prior_mean / 3`
    pub prior_stddev: Option<f64>,
    /// Per-player performance noise, defaults to `sigma0 / 2`
    pub beta: Option<f64>,
    /// Skill drift added before every match, defaults to `sigma0 / 100`
    pub tau: Option<f64>,
    /// Probability of a draw between equal teams; zero gives a pure win/lose model.
    /// The classic TrueSkill environment uses 0.1.
    pub draw_probability: f64,
    /// Accept drawn matches
    pub allow_draws: bool,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            algorithm: RatingAlgorithm::TrueSkill,
            prior_mean: DEFAULT_PRIOR_MEAN,
            prior_stddev: None,
            beta: None,
            tau: None,
            draw_probability: 0.0,
            allow_draws: false,
        }
    }
}

impl RatingConfig {
    /// Configuration derived entirely from a prior mean
    pub fn with_prior_mean(prior_mean: f64) -> Self {
        Self {
            prior_mean,
            ..Self::default()
        }
    }

    pub fn prior_stddev(&self) -> f64 {
        self.prior_stddev.unwrap_or(self.prior_mean / 3.0)
    }

    pub fn beta(&self) -> f64 {
        self.beta.unwrap_or(self.prior_stddev() / 2.0)
    }

    pub fn tau(&self) -> f64 {
        self.tau.unwrap_or(self.prior_stddev() / 100.0)
    }

    /// Belief assigned to a player on first reference
    pub fn prior(&self) -> Belief {
        Belief::new(self.prior_mean, self.prior_stddev())
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !self.prior_mean.is_finite() {
            return Err(RatingError::ConfigurationError {
                message: "Prior mean must be finite".to_string(),
            }
            .into());
        }

        let stddev = self.prior_stddev();
        if !(stddev.is_finite() && stddev > 0.0) {
            return Err(RatingError::ConfigurationError {
                message: format!("Prior stddev must be positive, got {}", stddev),
            }
            .into());
        }

        let beta = self.beta();
        if !(beta.is_finite() && beta > 0.0) {
            return Err(RatingError::ConfigurationError {
                message: format!("Beta must be positive, got {}", beta),
            }
            .into());
        }

        let tau = self.tau();
        if !(tau.is_finite() && tau >= 0.0) {
            return Err(RatingError::ConfigurationError {
                message: format!("Tau must be non-negative, got {}", tau),
            }
            .into());
        }

        if !(0.0..1.0).contains(&self.draw_probability) {
            return Err(RatingError::ConfigurationError {
                message: format!(
                    "Draw probability must be in [0, 1), got {}",
                    self.draw_probability
                ),
            }
            .into());
        }

        if self.allow_draws && self.draw_probability <= 0.0 {
            return Err(RatingError::ConfigurationError {
                message: "Draws require a positive draw probability".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
