//! Terminal formatting for the end-of-run summary.
//!
//! Kept apart from the pipeline so output changes stay local.

use crate::report::{BatchReport, FailureStage};

/// Summary block followed by one line per dropped record, in input order.
pub fn format_report(report: &BatchReport) -> String {
    let mut out = String::new();

    out.push_str("=== parcels - import summary ===\n");
    out.push_str(&format!("Warehouses: {}\n", report.warehouses));
    out.push_str(&format!("Records read: {}\n", report.records_read));
    out.push_str(&format!(
        "Transformed: {} | dropped: {} at read, {} at transform\n",
        report.transformed,
        report.failed_in(FailureStage::Read),
        report.failed_in(FailureStage::Transform),
    ));
    out.push_str(&format!(
        "Submitted: {} | failed: {}\n",
        report.submitted,
        report.failed_in(FailureStage::Submit),
    ));

    if report.failures.is_empty() {
        return out;
    }

    let mut failures: Vec<_> = report.failures.iter().collect();
    failures.sort_by_key(|f| f.index);

    // Indices are positions in the file, so skipped blank rows leave gaps and an
    // index can exceed the "Records read" count.
    out.push_str("\nFailed records (#N = 0-based data row in the input file):\n");
    for f in failures {
        out.push_str(&format!(
            "  #{:<5} {:<9} {}\n",
            f.index,
            f.stage.label(),
            f.message
        ));
    }

    out
}
