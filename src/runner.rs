use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::collections::HashMap;

use crate::{
    command,
    config::RunConfig,
    extract::{self, MetricRow},
    submit,
};

pub struct RunOptions {
    /// Grade existing output files without re-running the engine
    pub skip_search: bool,
    /// Log the per-topic diversity breakdown in addition to the aggregate
    pub per_topic: bool,
}

/// Runs every experiment strictly in order and collects one metric row per
/// id. Sequential on purpose: each grading call depends on the output file
/// the engine just wrote, and the remote grader is a single-client service.
pub async fn run_all(cfg: &RunConfig, opts: &RunOptions) -> Result<HashMap<String, MetricRow>> {
    let client = reqwest::Client::builder().build()?;

    let bar = ProgressBar::new(cfg.experiments.len() as u64);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] \
             {pos}/{len} ({eta})",
        )
        .unwrap(),
    );

    let mut table: HashMap<String, MetricRow> = HashMap::new();

    for id in &cfg.experiments {
        if !opts.skip_search {
            let cmd = command::build_command(&cfg.classpath, &cfg.param_path(id));
            info!("[{id}] {cmd}");
            command::run_search(&cmd).await?;
        }

        let output_path = cfg.output_path(id);
        let body = submit::submit_adhoc(&client, &cfg.grader, &cfg.hw_id, &output_path).await?;
        let mut row = extract::extract_trec_eval(&body)?;
        info!("[{id}] adhoc metrics: {row:?}");

        if cfg.grader.diversity.is_some() {
            let body =
                submit::submit_diversity(&client, &cfg.grader, &cfg.hw_id, &output_path).await?;
            // Diversity keys win over adhoc ones on collision
            if opts.per_topic {
                let by_topic = extract::extract_diversity_by_topic(&body)?;
                let mut topics: Vec<&str> = by_topic.keys().map(String::as_str).collect();
                topics.sort_unstable();
                info!("[{id}] diversity topics: {}", topics.join(", "));
                if let Some(values) = by_topic.get("amean") {
                    row.extend(values.clone());
                }
            } else {
                row.extend(extract::extract_diversity_amean(&body)?);
            }
        }

        table.insert(id.clone(), row);
        bar.inc(1);
    }

    bar.finish_with_message("done");
    Ok(table)
}
