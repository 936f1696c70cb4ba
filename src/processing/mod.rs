//! Match processing, rating history and the final leaderboard

pub mod history;
pub mod leaderboard;
pub mod processor;

pub use history::{History, HistoryEntry};
pub use leaderboard::{Leaderboard, LeaderboardEntry};
pub use processor::{MatchProcessor, ProcessorState, RatingRun};
