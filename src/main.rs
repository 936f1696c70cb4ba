//! Main entry point for the TrueSkill ladder
//!
//! Loads one or more match sheets, rates each as an independent league and
//! writes leaderboards and rating histories to the output directory.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use trueskill_ladder::config::{AppConfig, OutputFormat, RatingAlgorithm};
use trueskill_ladder::service::{LadderApp, LeagueJob, LeagueReport};

/// TrueSkill Ladder - rate 2v2 match histories
#[derive(Parser)]
#[command(
    name = "trueskill-ladder",
    version,
    about = "Rate an ordered history of 2v2 matches with TrueSkill",
    long_about = "TrueSkill Ladder replays match sheets in chronological order, updating a \
                 Gaussian skill belief for every player, and exports the final leaderboard \
                 together with the full per-match rating history."
)]
struct Args {
    /// Match sheets to rate, one league per file
    #[arg(value_name = "CSV", required = true)]
    inputs: Vec<PathBuf>,

    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Rating algorithm override
    #[arg(short, long, value_name = "ALGORITHM", help = "trueskill or weng_lin")]
    algorithm: Option<RatingAlgorithm>,

    /// Prior mean override
    #[arg(long, value_name = "MEAN", help = "Prior mean; stddev, beta and tau follow from it")]
    prior_mean: Option<f64>,

    /// Output directory override
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Output format override
    #[arg(short, long, value_name = "FORMAT", help = "csv or json")]
    format: Option<OutputFormat>,

    /// Print the top N players of each league
    #[arg(long, value_name = "N", default_value_t = 10)]
    top: usize,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(long, help = "Validate configuration and exit without rating anything")]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Display startup banner with run information
fn display_startup_banner(config: &AppConfig, leagues: usize) {
    let rating = &config.rating;
    info!("📊 TrueSkill Ladder v{}", trueskill_ladder::VERSION);
    info!("   Service: {}", config.service.name);
    info!("   Algorithm: {}", rating.algorithm);
    info!(
        "   Prior: {:.3} ± {:.3} (beta {:.3}, tau {:.4})",
        rating.prior_mean,
        rating.prior_stddev(),
        rating.beta(),
        rating.tau()
    );
    info!(
        "   Draws: {} (p = {})",
        if rating.allow_draws { "allowed" } else { "rejected" },
        rating.draw_probability
    );
    info!("   Output: {} ({:?})", config.output.directory.display(), config.output.format);
    info!("   Leagues: {}", leagues);
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(algorithm) = args.algorithm {
        config.rating.algorithm = algorithm;
    }

    if let Some(prior_mean) = args.prior_mean {
        config.rating.prior_mean = prior_mean;
    }

    if let Some(output_dir) = &args.output_dir {
        config.output.directory = output_dir.clone();
    }

    if let Some(format) = args.format {
        config.output.format = format;
    }

    Ok(config)
}

fn print_report(report: &LeagueReport, top: usize) {
    println!(
        "League '{}': {} matches, {} players -> {}",
        report.league,
        report.matches,
        report.players,
        report.export.directory.display()
    );
    for entry in report.leaderboard.top(top) {
        println!(
            "  {:>3}. {:<24} {:>8.3}  ({:.3} ± {:.3}, {} matches)",
            entry.rank, entry.player, entry.score, entry.mean, entry.stddev, entry.matches_played
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {:#}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let app = match LadderApp::new(config) {
        Ok(app) => Arc::new(app),
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    display_startup_banner(app.config(), args.inputs.len());

    if args.dry_run {
        info!("Dry run completed - configuration is valid");
        return Ok(());
    }

    let jobs: Vec<LeagueJob> = args.inputs.iter().map(|p| LeagueJob::from_path(p)).collect();
    let reports = app.run_all(jobs).await;

    let mut failures = 0;
    for report in &reports {
        match report {
            Ok(report) => print_report(report, args.top),
            Err(_) => failures += 1,
        }
    }

    if failures > 0 {
        error!("{} of {} leagues failed", failures, reports.len());
        std::process::exit(1);
    }

    info!("✅ All {} leagues rated", reports.len());
    Ok(())
}
