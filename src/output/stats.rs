//! Batch summary on stdout

use crate::output::BatchReport;

/// Prints the batch summary to stdout in a formatted manner
pub fn print_report(report: &BatchReport) {
    println!("=== Archive Summary ===\n");

    println!("Overview:");
    println!("  Entries processed: {}", report.total());
    println!("  Archived: {}", report.archived_count());
    println!("  Failed: {}", report.failed_count());
    println!(
        "  Description images left remote: {}",
        report.description_failure_count()
    );
    if let Some(duration) = report.duration_seconds() {
        println!("  Duration: {}s", duration);
    }
    println!();

    if report.failed_count() > 0 {
        println!("Failed Entries:");
        for (entry, error) in report.failures() {
            println!("  - {} [{}]: {}", entry.id, error.kind(), error);
        }
        println!();
    }

    let partial: Vec<_> = report
        .outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().ok())
        .filter(|a| !a.description_failures.is_empty())
        .collect();
    if !partial.is_empty() {
        println!("Entries With Remote Description Images:");
        for archived in partial {
            println!(
                "  - {} ({}): {} image(s)",
                archived.record.id(),
                archived.dir.display(),
                archived.description_failures.len()
            );
        }
        println!();
    }

    let success_rate = if report.total() > 0 {
        (report.archived_count() as f64 / report.total() as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "Success Rate: {:.1}% ({} / {} entries archived)",
        success_rate,
        report.archived_count(),
        report.total()
    );
}
