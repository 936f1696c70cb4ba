//! Error types for the rating service
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific rating scenarios
#[derive(Debug, thiserror::Error)]
pub enum RatingError {
    #[error("Invalid team size: team {team} has {size} players")]
    InvalidTeamSize { team: usize, size: usize },

    #[error("Invalid match outcome: {reason}")]
    InvalidOutcome { reason: String },

    #[error("Player not found: {player_id}")]
    PlayerNotFound { player_id: String },

    #[error("Invalid match record at row {row}: {reason}")]
    InvalidMatchRecord { row: usize, reason: String },

    #[error("Match processor already finished")]
    ProcessorFinished,

    #[error("Export failed: {message}")]
    ExportFailed { message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}
