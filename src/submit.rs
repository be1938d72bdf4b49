use anyhow::{anyhow, Context, Result};
use reqwest::multipart::{Form, Part};
use std::path::Path;

use crate::config::GraderConfig;

/// Uploads one engine output file to the adhoc (trec_eval) grader and
/// returns the raw HTML response body.
pub async fn submit_adhoc(
    client: &reqwest::Client,
    grader: &GraderConfig,
    hw_id: &str,
    output_path: &Path,
) -> Result<String> {
    // Field names must match the grader's HTML form
    let form = Form::new()
        .text("hwid", hw_id.to_string())
        .text("qrel", grader.adhoc_qrel.clone())
        .text("logtype", grader.logtype.form_value())
        .text("leaderboard", grader.leaderboard.form_value());

    post_run_file(client, &grader.adhoc_url, form, grader, output_path).await
}

/// Same contract against the diversity (ndeval) grader, which takes only
/// `qrel` and `hwid`.
pub async fn submit_diversity(
    client: &reqwest::Client,
    grader: &GraderConfig,
    hw_id: &str,
    output_path: &Path,
) -> Result<String> {
    let div = grader
        .diversity
        .as_ref()
        .ok_or_else(|| anyhow!("no diversity endpoint configured"))?;

    let form = Form::new()
        .text("qrel", div.qrel.clone())
        .text("hwid", hw_id.to_string());

    post_run_file(client, &div.url, form, grader, output_path).await
}

async fn post_run_file(
    client: &reqwest::Client,
    url: &str,
    form: Form,
    grader: &GraderConfig,
    output_path: &Path,
) -> Result<String> {
    // The preceding engine run was expected to create this file
    let bytes = tokio::fs::read(output_path)
        .await
        .with_context(|| format!("missing engine output {}", output_path.display()))?;

    let part = Part::bytes(bytes).file_name(output_path.display().to_string());
    let form = form.part("infile", part);

    let resp = client
        .post(url)
        .basic_auth(&grader.username, Some(&grader.password))
        .multipart(form)
        .send()
        .await
        .with_context(|| format!("POST {url} failed"))?;

    if !resp.status().is_success() {
        return Err(anyhow!("{} — {}", resp.status(), resp.text().await?));
    }
    Ok(resp.text().await?)
}
