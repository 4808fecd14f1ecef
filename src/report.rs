// Plain-text rendering of the metrics and the summary table

use crate::stats::{Metrics, SummaryTable, SUMMARY_ROWS};
use std::fmt::Write;

const LABEL_WIDTH: usize = 8;
const CELL_WIDTH: usize = 14;

pub fn format_metrics(metrics: &Metrics) -> String {
    let mut out = String::new();
    for (label, value) in metrics.labelled() {
        let _ = writeln!(out, "{:<16} {}", format!("{}:", label), value);
    }
    out
}

/// One row per statistic, one column per numeric column.
pub fn format_summary(table: &SummaryTable) -> String {
    let mut out = String::new();

    let _ = write!(out, "{:<width$}", "", width = LABEL_WIDTH);
    for col in &table.columns {
        let _ = write!(out, "{:>width$}", col.column.name(), width = CELL_WIDTH);
    }
    out.push('\n');

    for (row_idx, label) in SUMMARY_ROWS.iter().enumerate() {
        let _ = write!(out, "{:<width$}", label, width = LABEL_WIDTH);
        for col in &table.columns {
            let value = col.values()[row_idx];
            let _ = write!(out, "{:>width$.6}", value, width = CELL_WIDTH);
        }
        out.push('\n');
    }
    out
}

/// Metrics followed by the summary table, with headings.
pub fn format_report(metrics: &Metrics, table: &SummaryTable) -> String {
    format!(
        "Tips Dashboard\n\n{}\nSummary Statistics\n{}",
        format_metrics(metrics),
        format_summary(table)
    )
}
