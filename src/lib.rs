//! TrueSkill Ladder - Skill ratings for 2v2 match histories
//!
//! This crate replays an ordered list of two-team matches through a
//! Bayesian rating engine, keeping a dense per-match rating history and a
//! final leaderboard ranked by conservative score.

pub mod config;
pub mod error;
pub mod io;
pub mod metrics;
pub mod processing;
pub mod rating;
pub mod service;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{RatingError, Result};
pub use types::*;

// Re-export key components
pub use processing::{History, Leaderboard, MatchProcessor, RatingRun};
pub use rating::{InMemoryRatingStore, RatingEngine, RatingStore, TrueSkillEngine};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
