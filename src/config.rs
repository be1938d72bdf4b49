use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Per-variant run configuration. One JSON file per homework replaces the
/// constants that used to be copy-pasted into every helper script.
#[derive(Debug, Deserialize)]
pub struct RunConfig {
    /// Classpath handed to the external search engine, e.g. "lib/*:HW5"
    pub classpath: String,
    pub hw_id: String,
    /// File-name prefix, e.g. "HW5-Exp"; parameter files are
    /// "<run_prefix>-<id>.param" and engine outputs "<run_prefix>-<id>.teIn"
    pub run_prefix: String,
    pub param_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Experiment ids in the order they are run and reported
    pub experiments: Vec<String>,
    pub report_path: PathBuf,
    /// Metric display names, one report row each, in this order
    pub report_metrics: Vec<String>,
    pub grader: GraderConfig,
}

#[derive(Debug, Deserialize)]
pub struct GraderConfig {
    pub username: String,
    pub password: String,
    pub adhoc_url: String,
    pub adhoc_qrel: String,
    #[serde(default)]
    pub logtype: LogType,
    #[serde(default)]
    pub leaderboard: Leaderboard,
    /// Absent when the homework has no diversity component
    #[serde(default)]
    pub diversity: Option<DiversityEndpoint>,
}

#[derive(Debug, Deserialize)]
pub struct DiversityEndpoint {
    pub url: String,
    pub qrel: String,
}

/// `logtype` form parameter of the adhoc grader
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum LogType {
    Summary,
    #[default]
    Detailed,
}

impl LogType {
    pub fn form_value(self) -> &'static str {
        match self {
            LogType::Summary => "Summary",
            LogType::Detailed => "Detailed",
        }
    }
}

/// `leaderboard` form parameter of the adhoc grader
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum Leaderboard {
    Yes,
    #[default]
    No,
}

impl Leaderboard {
    pub fn form_value(self) -> &'static str {
        match self {
            Leaderboard::Yes => "Yes",
            Leaderboard::No => "No",
        }
    }
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let cfg: RunConfig = serde_json::from_str(&raw)
            .with_context(|| format!("malformed run config {}", path.display()))?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.experiments.is_empty() {
            bail!("run config lists no experiments");
        }
        if self.report_metrics.is_empty() {
            bail!("run config lists no report metrics");
        }
        Ok(())
    }

    pub fn param_path(&self, id: &str) -> PathBuf {
        self.param_dir
            .join(format!("{}-{}.param", self.run_prefix, id))
    }

    pub fn output_path(&self, id: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}-{}.teIn", self.run_prefix, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const SAMPLE: &str = r#"{
        "classpath": "lucene-8.1.1/*:HW5",
        "hw_id": "HW5",
        "run_prefix": "HW5-Exp",
        "param_dir": "PARAM_DIR",
        "output_dir": "OUTPUT_DIR",
        "experiments": ["4.1a", "4.1b"],
        "report_path": "result-Exp4.csv",
        "report_metrics": ["P@10", "MAP"],
        "grader": {
            "username": "student@example.edu",
            "password": "hunter2",
            "adhoc_url": "https://grader.example.edu/tes.cgi",
            "adhoc_qrel": "cw09a.adhoc.1-200.qrel.indexed"
        }
    }"#;

    #[test]
    fn parses_and_builds_paths() {
        let cfg: RunConfig = serde_json::from_str(SAMPLE).unwrap();
        cfg.validate().unwrap();
        assert_eq!(
            cfg.param_path("4.1a"),
            Path::new("PARAM_DIR/HW5-Exp-4.1a.param")
        );
        assert_eq!(
            cfg.output_path("4.1a"),
            Path::new("OUTPUT_DIR/HW5-Exp-4.1a.teIn")
        );
    }

    #[test]
    fn optional_fields_default() {
        let cfg: RunConfig = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(cfg.grader.logtype, LogType::Detailed);
        assert_eq!(cfg.grader.leaderboard, Leaderboard::No);
        assert!(cfg.grader.diversity.is_none());
    }

    #[test]
    fn form_values_match_cgi_contract() {
        assert_eq!(LogType::Summary.form_value(), "Summary");
        assert_eq!(LogType::Detailed.form_value(), "Detailed");
        assert_eq!(Leaderboard::Yes.form_value(), "Yes");
        assert_eq!(Leaderboard::No.form_value(), "No");
    }

    #[test]
    fn validate_rejects_empty_lists() {
        let mut cfg: RunConfig = serde_json::from_str(SAMPLE).unwrap();
        cfg.experiments.clear();
        assert!(cfg.validate().is_err());

        let mut cfg: RunConfig = serde_json::from_str(SAMPLE).unwrap();
        cfg.report_metrics.clear();
        assert!(cfg.validate().is_err());
    }
}
