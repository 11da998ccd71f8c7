#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the district risk map.
//!
//! Scores the districts from a local data directory, prints the city-wide
//! timeline, or starts the API server. Configuration comes from the same
//! environment variables as the server; flags override them.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use risk_map_district::roster;
use risk_map_district_models::{AggregationMode, RiskLevel};
use risk_map_pipeline::{PipelineConfig, RiskPipeline, RiskReport};
use risk_map_scoring::stats::{average, delta_scores};

#[derive(Parser)]
#[command(name = "risk_map_cli", about = "District risk score toolchain")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every district and print the result
    Score {
        /// Snapshot selection policy: `latest` or `cumulative`
        #[arg(long)]
        mode: Option<AggregationMode>,
        /// Data root holding one directory per source
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Skip the model call and print the base scores
        #[arg(long)]
        offline: bool,
    },
    /// Print the city-wide yearly risk trend
    Timeline {
        /// Data root holding one directory per source
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Start the API server
    Serve,
}

fn build_pipeline(
    mode: Option<AggregationMode>,
    data_dir: Option<PathBuf>,
) -> Result<RiskPipeline, Box<dyn std::error::Error>> {
    let mut config = PipelineConfig::from_env()?;
    if let Some(mode) = mode {
        config.mode = mode;
    }
    if let Some(data_dir) = data_dir {
        config.data_dir = data_dir;
    }
    Ok(RiskPipeline::new(config))
}

fn print_report(report: &RiskReport) {
    let deltas = delta_scores(&report.base.score_map(), &report.scores.scores, None);

    println!(
        "{:<16} {:<8} {:<16} {:>5} {:>5} {:>6}  LEVEL",
        "DISTRICT", "NAME", "ENGLISH", "BASE", "FINAL", "DELTA"
    );

    for district in &roster().districts {
        let base = report
            .base
            .get(&district.id)
            .map_or(0, |score| score.base_score);
        let score = report.scores.scores.get(&district.id).copied().unwrap_or(base);
        let delta = deltas.get(&district.id).copied().unwrap_or_default();
        let level = RiskLevel::from_score(f64::from(score));
        println!(
            "{:<16} {:<8} {:<16} {base:>5} {score:>5} {delta:>+6.1}  {level} ({})",
            district.id,
            district.name,
            district.name_en,
            level.label_ko()
        );
    }

    println!();
    println!("City average: {}", average(&report.scores.scores, None));
    println!(
        "Outcome: {}{}",
        report.outcome,
        if report.scores.fallback {
            " (base scores)"
        } else {
            ""
        }
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Score {
            mode,
            data_dir,
            offline,
        } => {
            pretty_env_logger::init_custom_env("RUST_LOG");
            let pipeline = build_pipeline(mode, data_dir)?;
            log::info!(
                "Scoring from {} in {} mode",
                pipeline.data_dir().display(),
                pipeline.config().mode
            );

            let report = if offline {
                pipeline.run_offline().await?
            } else {
                let credential = std::env::var(&pipeline.config().credential_var).ok();
                pipeline.run(credential.as_deref()).await?
            };

            print_report(&report);
        }
        Commands::Timeline { data_dir } => {
            pretty_env_logger::init_custom_env("RUST_LOG");
            let timeline = build_pipeline(None, data_dir)?.timeline().await?;

            println!(
                "Sources: five={} oneonetwo={} (weights {}/{})",
                timeline.five, timeline.oneonetwo, timeline.weights.five, timeline.weights.oneonetwo
            );
            for point in &timeline.points {
                println!(
                    "{}  {:>3}  five={} oneonetwo={}",
                    point.year, point.score, point.five_total, point.oneonetwo_total
                );
            }
        }
        Commands::Serve => {
            // The server uses actix-web's runtime and installs its own
            // logger, so it runs in a blocking task.
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(risk_map_server::run_server())
            })
            .await??;
        }
    }

    Ok(())
}
