//! History command handler
//!
//! Lists reconstructed runs with their outcome and output size.

use anyhow::Result;
use cadence_core::{RunRecord, RunStatus};
use colored::*;

/// Show the run history
pub fn show_history(records: &[RunRecord], limit: Option<usize>, json: bool) -> Result<()> {
    let records = most_recent(records, limit);

    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("{}", "No runs found.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} run(s):", records.len()).bold());
    println!();
    for record in records {
        print_run(record);
    }

    Ok(())
}

/// The last `limit` records, or all of them
fn most_recent(records: &[RunRecord], limit: Option<usize>) -> &[RunRecord] {
    match limit {
        Some(n) if n < records.len() => &records[records.len() - n..],
        _ => records,
    }
}

fn print_run(record: &RunRecord) {
    println!(
        "  {} {}  {:<10} {}",
        "▸".cyan(),
        record
            .started_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed(),
        colorize_status(record.status),
        format!("{} output line(s)", record.output_lines).dimmed()
    );
}

/// Colorize run status for display
pub(crate) fn colorize_status(status: RunStatus) -> ColoredString {
    let status_str = status.to_string();
    match status {
        RunStatus::Started => status_str.yellow(),
        RunStatus::Succeeded => status_str.green(),
        RunStatus::Failed => status_str.red(),
    }
}
