use anyhow::{anyhow, Context, Result};
use log::info;
use std::collections::HashMap;

/// Metric display name -> value for one experiment
pub type MetricRow = HashMap<String, f64>;

/// trec_eval markers and the display keys they are reported under.
/// Each marker keeps its trailing space so that "P_10 " cannot match a
/// line carrying "P_100".
const TREC_EVAL_MARKERS: [(&str, &str); 7] = [
    ("P_10 ", "P@10"),
    ("P_20 ", "P@20"),
    ("P_30 ", "P@30"),
    ("map ", "MAP"),
    ("ndcg_cut_10 ", "ndcg_cut_10"),
    ("ndcg_cut_20 ", "ndcg_cut_20"),
    ("ndcg_cut_30 ", "ndcg_cut_30"),
];

// Wire format of the diversity grader: 23 comma-separated columns per row,
// topic id in column 1, aNDCG@20 / P-IA@10 / P-IA@20 in columns 13/18/19.
const DIVERSITY_FIELD_COUNT: usize = 23;
const COL_TOPIC: usize = 1;
const COL_ANDCG_20: usize = 13;
const COL_P_IA_10: usize = 18;
const COL_P_IA_20: usize = 19;

/// Aggregate row label in the diversity output
const AMEAN: &str = "amean";

/// Text strictly between the first `<pre>` and the following `</pre>`,
/// or None when either marker is missing (error page, unexpected output).
fn pre_block(body: &str) -> Option<&str> {
    let start = body.find("<pre>")? + "<pre>".len();
    let end = body[start..].find("</pre>")? + start;
    Some(&body[start..end])
}

/// Parses the adhoc grader's whitespace-aligned metric lines into a row.
/// A marker appearing twice is last-match-wins.
pub fn extract_trec_eval(body: &str) -> Result<MetricRow> {
    let block =
        pre_block(body).ok_or_else(|| anyhow!("no <pre> block in adhoc grader response"))?;

    let mut row = MetricRow::new();
    for line in block.split('\n') {
        for (marker, key) in TREC_EVAL_MARKERS {
            if line.contains(marker) {
                row.insert(key.to_string(), metric_value(line)?);
            }
        }
    }
    Ok(row)
}

/// Third whitespace token of a metric line, e.g. "P_10   all   0.3120"
fn metric_value(line: &str) -> Result<f64> {
    let token = line
        .split_whitespace()
        .nth(2)
        .ok_or_else(|| anyhow!("malformed metric line {line:?}"))?;
    token
        .parse()
        .with_context(|| format!("bad metric value in {line:?}"))
}

/// Aggregate diversity metrics: only the "amean" row contributes.
/// Returns an empty row when the grader reported no aggregate line; the
/// report writer then fails on the missing metric instead of masking it.
pub fn extract_diversity_amean(body: &str) -> Result<MetricRow> {
    let mut row = MetricRow::new();
    for (topic, values) in accepted_rows(body)? {
        if topic == AMEAN {
            row = values;
        }
    }
    Ok(row)
}

/// Per-topic diversity metrics, keyed by topic id ("amean" included).
pub fn extract_diversity_by_topic(body: &str) -> Result<HashMap<String, MetricRow>> {
    Ok(accepted_rows(body)?.into_iter().collect())
}

/// Rows of the diversity output that match the fixed 23-column schema.
/// The header line is skipped; rows with any other field count are dropped
/// without affecting their neighbours.
fn accepted_rows(body: &str) -> Result<Vec<(String, MetricRow)>> {
    let block =
        pre_block(body).ok_or_else(|| anyhow!("no <pre> block in diversity grader response"))?;

    let mut rows = Vec::new();
    for line in block.trim().split('\n').skip(1) {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != DIVERSITY_FIELD_COUNT {
            continue;
        }

        let topic = fields[COL_TOPIC].to_string();
        let andcg_20: f64 = fields[COL_ANDCG_20]
            .parse()
            .with_context(|| format!("bad aNDCG@20 in row {line:?}"))?;
        let p_ia_10: f64 = fields[COL_P_IA_10]
            .parse()
            .with_context(|| format!("bad P-IA@10 in row {line:?}"))?;
        let p_ia_20: f64 = fields[COL_P_IA_20]
            .parse()
            .with_context(|| format!("bad P-IA@20 in row {line:?}"))?;

        info!("{topic}: P-IA@10: {p_ia_10}, P-IA@20: {p_ia_20}, aNDCG@20: {andcg_20}");

        let mut values = MetricRow::new();
        values.insert("P-IA@10".to_string(), p_ia_10);
        values.insert("P-IA@20".to_string(), p_ia_20);
        values.insert("aNDCG@20".to_string(), andcg_20);
        rows.push((topic, values));
    }
    Ok(rows)
}
