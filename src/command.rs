use anyhow::{Context, Result};
use log::warn;
use std::path::Path;

/// Entry class of the external retrieval engine
const ENTRY_CLASS: &str = "QryEval";

/// Shell invocation for one engine run. Pure string construction; a bad
/// classpath or parameter path surfaces when the command actually runs.
pub fn build_command(classpath: &str, param_path: &Path) -> String {
    format!(
        "java -classpath {} {} {}",
        classpath,
        ENTRY_CLASS,
        param_path.display()
    )
}

/// Runs the invocation through a shell and blocks until it exits.
/// A non-zero exit is logged as a warning rather than aborting the run;
/// if the engine produced no output file the submit step fails with a
/// precise error anyway.
pub async fn run_search(cmd: &str) -> Result<()> {
    let status = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(cmd)
        .status()
        .await
        .with_context(|| format!("failed to run `{cmd}`"))?;

    if !status.success() {
        warn!("search engine exited with {status}: {cmd}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_java_invocation() {
        let cmd = build_command(
            "lucene-8.1.1/*:HW5",
            Path::new("PARAM_DIR/HW5-Exp-4.1a.param"),
        );
        assert_eq!(
            cmd,
            "java -classpath lucene-8.1.1/*:HW5 QryEval PARAM_DIR/HW5-Exp-4.1a.param"
        );
    }
}
