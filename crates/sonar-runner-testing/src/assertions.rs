//! Custom assertions on runner output.

use crate::world::CliResult;
use anyhow::{Context, Result};

/// Assert that the last two stdout lines are the run statistics.
pub fn assert_stats_reported_last(result: &CliResult) -> Result<()> {
    let lines = result.stdout_lines();
    let tail = lines
        .len()
        .checked_sub(2)
        .map(|start| &lines[start..])
        .context("Expected at least two stdout lines")?;

    if !tail[0].starts_with("INFO: Total time: ") {
        anyhow::bail!("Expected 'Total time' line, got {:?}", tail[0]);
    }
    if !tail[1].starts_with("INFO: Final Memory: ") {
        anyhow::bail!("Expected 'Final Memory' line, got {:?}", tail[1]);
    }
    Ok(())
}

/// Assert that no statistics were reported.
pub fn assert_no_stats(result: &CliResult) -> Result<()> {
    if result.stdout.contains("Total time: ") || result.stdout.contains("Final Memory: ") {
        anyhow::bail!("Expected no statistics, got:\n{}", result.stdout);
    }
    Ok(())
}

/// Assert that `fragment` appears on exactly one line of the combined output.
pub fn assert_logged_once(result: &CliResult, fragment: &str) -> Result<()> {
    let logs = result.logs();
    let count = logs.lines().filter(|line| line.contains(fragment)).count();
    if count != 1 {
        anyhow::bail!(
            "Expected {:?} exactly once, found {} times in:\n{}",
            fragment,
            count,
            logs
        );
    }
    Ok(())
}
