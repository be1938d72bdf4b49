/*
cargo run --bin run_experiments --release -- hw5.run.json

cargo run --bin run_experiments --release -- hw5.run.json \
  --skip-search --report result-Exp4.csv
*/

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use log::{info, LevelFilter};
use simplelog::{Config as LogConfig, WriteLogger};
use std::{fs, path::PathBuf};

mod command;
mod config;
mod extract;
mod report;
mod runner;
mod submit;

use config::RunConfig;
use runner::RunOptions;

// command-line args
#[derive(Parser, Debug)]
#[command(version, author, about = "Run retrieval experiments and tabulate grader metrics")]
struct Cli {
    /// JSON run configuration (endpoints, credentials, experiment list)
    config: PathBuf,

    /// Write the report here instead of the configured report_path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Skip the search-engine subprocess and grade existing output files
    #[arg(long)]
    skip_search: bool,

    /// Also log the per-topic diversity breakdown
    #[arg(long)]
    per_topic: bool,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // logging
    fs::create_dir_all("logs").context("cannot create log directory")?;
    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    WriteLogger::init(
        LevelFilter::Info,
        LogConfig::default(),
        fs::File::create(format!("logs/{timestamp}.log")).context("cannot open log file")?,
    )
    .context("failed to initialise logger")?;

    // run config
    let cfg = RunConfig::load(&cli.config)?;
    cfg.validate()?;
    info!(
        "loaded {} - {} experiments, {} report metrics",
        cli.config.display(),
        cfg.experiments.len(),
        cfg.report_metrics.len()
    );

    // run + report
    let opts = RunOptions {
        skip_search: cli.skip_search,
        per_topic: cli.per_topic,
    };
    let table = runner::run_all(&cfg, &opts).await?;

    let report_path = cli.report.as_ref().unwrap_or(&cfg.report_path);
    report::write_report(report_path, &cfg.experiments, &cfg.report_metrics, &table)?;
    println!("report written to {}", report_path.display());
    Ok(())
}
