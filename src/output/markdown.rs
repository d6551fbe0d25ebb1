//! Markdown summary generation
//!
//! This module renders a batch report as a markdown file placed next to the
//! archive, listing what was archived and what needs a re-run.

use crate::output::BatchReport;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown summary of a batch to `output_path`
pub fn write_markdown_report(report: &BatchReport, output_path: &Path) -> std::io::Result<()> {
    let markdown = format_markdown_report(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a batch report as markdown
pub fn format_markdown_report(report: &BatchReport) -> String {
    let mut md = String::new();

    md.push_str("# Gryff Archive Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    if let Some(finished) = report.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished.to_rfc3339()));
    }
    if let Some(duration) = report.duration_seconds() {
        md.push_str(&format!("- **Duration**: {} seconds\n", duration));
    }
    md.push_str(&format!("- **Entries**: {}\n", report.total()));
    md.push_str(&format!("- **Archived**: {}\n", report.archived_count()));
    md.push_str(&format!("- **Failed**: {}\n\n", report.failed_count()));

    md.push_str("## Entries\n\n");
    md.push_str("| Id | Name | Status | Remote Images |\n");
    md.push_str("|----|------|--------|---------------|\n");
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(archived) => md.push_str(&format!(
                "| {} | {} | archived | {} |\n",
                outcome.entry.id,
                escape_cell(archived.record.name()),
                archived.description_failures.len()
            )),
            Err(error) => md.push_str(&format!(
                "| {} | | failed ({}) | |\n",
                outcome.entry.id,
                error.kind()
            )),
        }
    }
    md.push('\n');

    if report.failed_count() > 0 {
        md.push_str("## Failures\n\n");
        for (entry, error) in report.failures() {
            md.push_str(&format!(
                "- [{}]({}): {}\n",
                entry.id,
                entry.url,
                escape_cell(&error.to_string())
            ));
        }
        md.push('\n');
    }

    let remote: Vec<_> = report
        .outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().ok())
        .flat_map(|a| a.description_failures.iter().map(move |f| (a.record.id(), f)))
        .collect();
    if !remote.is_empty() {
        md.push_str("## Description Images Left Remote\n\n");
        md.push_str("| Entry | URL | Reason |\n");
        md.push_str("|-------|-----|--------|\n");
        for (id, failure) in remote {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                id,
                escape_cell(&failure.url),
                escape_cell(&failure.reason.to_string())
            ));
        }
        md.push('\n');
    }

    md
}

/// Keeps free text from breaking table rows
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
