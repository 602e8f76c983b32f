//! Stats command handler

use anyhow::Result;
use cadence_core::{RunRecord, RunStats};
use colored::*;

use super::history::colorize_status;

/// Show aggregate numbers for the run history
pub fn show_stats(records: &[RunRecord], json: bool) -> Result<()> {
    let stats = RunStats::from_records(records);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats_json(&stats)?)?);
        return Ok(());
    }

    println!("{}", "Run Statistics:".bold());
    println!("  Total:        {}", stats.total);
    println!("  Succeeded:    {}", stats.succeeded.to_string().green());
    println!("  Failed:       {}", stats.failed.to_string().red());
    println!("  In progress:  {}", stats.started.to_string().yellow());
    println!("  Failure rate: {:.1}%", stats.failure_rate());

    if let Some(last) = &stats.last {
        println!(
            "  Last run:     {} ({})",
            last.started_at.format("%Y-%m-%d %H:%M:%S"),
            colorize_status(last.status)
        );
    }

    Ok(())
}

/// `RunStats` as JSON, with the derived failure rate alongside the counts
fn stats_json(stats: &RunStats) -> Result<serde_json::Value> {
    let mut value = serde_json::to_value(stats)?;
    value["failure_rate"] = serde_json::json!(stats.failure_rate());
    Ok(value)
}
