//! Main application configuration
//!
//! This module defines the primary configuration structures for the
//! trueskill-ladder tool, including file and environment variable loading
//! and validation.

use super::rating::RatingConfig;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub rating: RatingConfig,
    pub input: InputSettings,
    pub output: OutputSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Column mapping for match sheets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    pub timestamp_column: String,
    pub red_columns: Vec<String>,
    pub blue_columns: Vec<String>,
    pub winner_column: String,
    /// Winner cell values meaning the red team won (case-insensitive)
    pub red_labels: Vec<String>,
    /// Winner cell values meaning the blue team won (case-insensitive)
    pub blue_labels: Vec<String>,
    /// Winner cell values meaning a draw (case-insensitive)
    pub draw_labels: Vec<String>,
    /// CSV field delimiter
    pub delimiter: char,
}

/// Export format for leaderboard and history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(anyhow!("Unknown output format: {}", other)),
        }
    }
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// Where and how results are written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub directory: PathBuf,
    pub format: OutputFormat,
    /// File stem for the final leaderboard
    pub leaderboard_file: String,
    /// File stem for the dense per-match history
    pub history_file: String,
    /// File stem for the per-day condensed history, skipped when empty
    pub daily_history_file: String,
    /// Prometheus text dump, skipped when empty
    pub metrics_file: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "trueskill-ladder".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            timestamp_column: "date".to_string(),
            red_columns: vec!["red_p1".to_string(), "red_p2".to_string()],
            blue_columns: vec!["blue_p1".to_string(), "blue_p2".to_string()],
            winner_column: "winner".to_string(),
            red_labels: vec!["red".to_string()],
            blue_labels: vec!["blue".to_string()],
            draw_labels: vec!["draw".to_string()],
            delimiter: ',',
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("results"),
            format: OutputFormat::Csv,
            leaderboard_file: "leaderboard".to_string(),
            history_file: "history".to_string(),
            daily_history_file: "history_daily".to_string(),
            metrics_file: String::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Overlay environment variables onto this configuration
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Rating settings
        if let Ok(algorithm) = env::var("RATING_ALGORITHM") {
            self.rating.algorithm = algorithm.parse()?;
        }
        if let Ok(mean) = env::var("PRIOR_MEAN") {
            self.rating.prior_mean = mean
                .parse()
                .map_err(|_| anyhow!("Invalid PRIOR_MEAN value: {}", mean))?;
        }
        if let Ok(stddev) = env::var("PRIOR_STDDEV") {
            self.rating.prior_stddev = Some(
                stddev
                    .parse()
                    .map_err(|_| anyhow!("Invalid PRIOR_STDDEV value: {}", stddev))?,
            );
        }
        if let Ok(beta) = env::var("PERFORMANCE_BETA") {
            self.rating.beta = Some(
                beta.parse()
                    .map_err(|_| anyhow!("Invalid PERFORMANCE_BETA value: {}", beta))?,
            );
        }
        if let Ok(tau) = env::var("DYNAMICS_TAU") {
            self.rating.tau = Some(
                tau.parse()
                    .map_err(|_| anyhow!("Invalid DYNAMICS_TAU value: {}", tau))?,
            );
        }
        if let Ok(draw) = env::var("DRAW_PROBABILITY") {
            self.rating.draw_probability = draw
                .parse()
                .map_err(|_| anyhow!("Invalid DRAW_PROBABILITY value: {}", draw))?;
        }
        if let Ok(allow) = env::var("ALLOW_DRAWS") {
            self.rating.allow_draws = allow
                .parse()
                .map_err(|_| anyhow!("Invalid ALLOW_DRAWS value: {}", allow))?;
        }

        // Output settings
        if let Ok(dir) = env::var("OUTPUT_DIR") {
            self.output.directory = PathBuf::from(dir);
        }
        if let Ok(format) = env::var("OUTPUT_FORMAT") {
            self.output.format = format.parse()?;
        }

        Ok(())
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    config.rating.validate()?;

    // Validate input mapping
    if config.input.timestamp_column.is_empty() || config.input.winner_column.is_empty() {
        return Err(anyhow!("Timestamp and winner columns must be named"));
    }
    if config.input.red_columns.is_empty() || config.input.blue_columns.is_empty() {
        return Err(anyhow!("Each team needs at least one player column"));
    }
    if config.input.red_labels.is_empty() || config.input.blue_labels.is_empty() {
        return Err(anyhow!("Winner labels for both teams are required"));
    }
    if !config.input.delimiter.is_ascii() {
        return Err(anyhow!("CSV delimiter must be an ASCII character"));
    }

    // Validate output settings
    if config.output.leaderboard_file.is_empty() || config.output.history_file.is_empty() {
        return Err(anyhow!("Leaderboard and history file names cannot be empty"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RatingAlgorithm;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.output.format, OutputFormat::Csv);
        assert_eq!(config.input.red_columns.len(), 2);
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = AppConfig::default();
        config.service.log_level = "verbose".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_rating_config_is_rejected() {
        let mut config = AppConfig::default();
        config.rating.beta = Some(0.0);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[rating]
algorithm = "weng_lin"
prior_mean = 30.0

[input]
red_labels = ["rouge", "red"]

[output]
format = "json"
"#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.rating.algorithm, RatingAlgorithm::WengLin);
        assert_eq!(config.rating.prior_mean, 30.0);
        assert_eq!(config.input.red_labels, vec!["rouge", "red"]);
        assert_eq!(config.input.winner_column, "winner");
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("xlsx".parse::<OutputFormat>().is_err());
    }
}
