use anyhow::{Context, Result};
use csv::Writer;
use std::{collections::HashMap, fs::File, io::Write, path::Path};

use crate::extract::MetricRow;

/// Writes the transposed report: first record is the experiment ids, then
/// one record per metric with its value for every experiment in id order.
pub fn write_report(
    path: &Path,
    experiments: &[String],
    metrics: &[String],
    table: &HashMap<String, MetricRow>,
) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot create report {}", path.display()))?;
    render(file, experiments, metrics, table)
}

fn render<W: Write>(
    sink: W,
    experiments: &[String],
    metrics: &[String],
    table: &HashMap<String, MetricRow>,
) -> Result<()> {
    let mut wtr = Writer::from_writer(sink);
    wtr.write_record(experiments)?;

    for metric in metrics {
        let mut record = Vec::with_capacity(experiments.len());
        for id in experiments {
            let row = table
                .get(id)
                .with_context(|| format!("no results for experiment {id}"))?;
            // A missing metric means extraction went wrong upstream;
            // never substitute a default value.
            let value = row
                .get(metric)
                .with_context(|| format!("experiment {id} has no value for {metric}"))?;
            record.push(format!("{value:.4}"));
        }
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> Vec<String> {
        vec!["1a".to_string(), "1b".to_string()]
    }

    fn table() -> HashMap<String, MetricRow> {
        let mut table = HashMap::new();
        for (id, p10, map) in [("1a", 0.1234567, 0.2), ("1b", 0.5, 0.25)] {
            let mut row = MetricRow::new();
            row.insert("P@10".to_string(), p10);
            row.insert("MAP".to_string(), map);
            table.insert(id.to_string(), row);
        }
        table
    }

    fn render_to_string(metrics: &[String]) -> Result<String> {
        let mut buf = Vec::new();
        render(&mut buf, &ids(), metrics, &table())?;
        Ok(String::from_utf8(buf).unwrap())
    }

    #[test]
    fn header_row_is_the_id_list_verbatim() {
        let out = render_to_string(&["P@10".to_string()]).unwrap();
        let header = out.lines().next().unwrap();
        assert_eq!(header.split(',').collect::<Vec<_>>(), ["1a", "1b"]);
    }

    #[test]
    fn values_round_to_four_decimals() {
        let out = render_to_string(&["P@10".to_string(), "MAP".to_string()]).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, ["1a,1b", "0.1235,0.5000", "0.2000,0.2500"]);
    }

    #[test]
    fn missing_metric_is_an_error() {
        assert!(render_to_string(&["aNDCG@20".to_string()]).is_err());
    }

    #[test]
    fn missing_experiment_is_an_error() {
        let mut buf = Vec::new();
        let experiments = vec!["1a".to_string(), "9z".to_string()];
        let result = render(&mut buf, &experiments, &["P@10".to_string()], &table());
        assert!(result.is_err());
    }
}
