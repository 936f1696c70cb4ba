//! Bayesian skill rating
//!
//! This module provides the belief store, the two-team rating engines and
//! the Gaussian helpers they share.

pub mod engine;
pub mod gaussian;
pub mod store;
pub mod trueskill;
pub mod weng_lin;

// Re-export commonly used types
pub use engine::{build_engine, RatingEngine, TeamRatingUpdate};
pub use store::{InMemoryRatingStore, MatchCounter, RatingEntry, RatingStore};
pub use trueskill::TrueSkillEngine;
pub use weng_lin::{ExtendedWengLinConfig, WengLinEngine};
