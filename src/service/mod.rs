//! Service orchestration for rating leagues

pub mod app;

pub use app::{LadderApp, LeagueJob, LeagueReport, RatedLeague};
