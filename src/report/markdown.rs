//! Markdown rendering of a comparison report

use console::measure_text_width;

use super::delta::compute_delta;
use super::model::{ComparisonReport, Measurement};
use super::ReportError;
use crate::fmt::format_byte_count;

/// Rendering of a report without measurements
pub const NO_MEASUREMENTS: &str = "No measurements to report.";

/// Closing line of every rendered table; lets a publisher find earlier reports
pub const REPORT_MARKER: &str = "<!-- #outputSize -->";

const COLUMNS: [&str; 4] = ["Branch", "Original", "Minified", "Compressed (gzip)"];

/// Render `report` as Markdown.
///
/// The first row carries absolute sizes; every other row carries the proposed
/// revision's change relative to that row.
///
/// # Errors
///
/// Fails if any compared row has a zero-byte metric.
pub fn render(report: &ComparisonReport) -> Result<String, ReportError> {
    let Some(proposed) = report.proposed() else {
        return Ok(NO_MEASUREMENTS.to_string());
    };

    let mut rows: Vec<[String; 4]> = Vec::with_capacity(report.measurements().len() + 1);
    rows.push(COLUMNS.map(String::from));
    rows.push([
        proposed.label.clone(),
        format_byte_count(proposed.raw_size),
        format_byte_count(proposed.minified_size),
        format_byte_count(proposed.compressed_size),
    ]);
    for other in &report.measurements()[1..] {
        rows.push([
            other.label.clone(),
            delta_cell(proposed.raw_size, other, "raw", other.raw_size)?,
            delta_cell(proposed.minified_size, other, "minified", other.minified_size)?,
            delta_cell(
                proposed.compressed_size,
                other,
                "compressed",
                other.compressed_size,
            )?,
        ]);
    }

    let mut out = format!(
        "Reference app: [{}]({}) (`{}`)\n\n",
        report.app.name, report.app.repo, report.app.commit
    );
    write_table(&mut out, &rows);
    if !report.trigger.is_empty() {
        out.push_str(&format!("\nTriggered by {}\n", report.trigger));
    }
    out.push_str(&format!("\n{}\n", REPORT_MARKER));
    Ok(out)
}

fn delta_cell(
    proposed: u64,
    row: &Measurement,
    metric: &'static str,
    baseline: u64,
) -> Result<String, ReportError> {
    compute_delta(proposed, baseline)
        .map(|delta| delta.to_string())
        .map_err(|source| ReportError::Delta {
            label: row.label.clone(),
            metric,
            source: Box::new(source),
        })
}

fn write_table(out: &mut String, rows: &[[String; 4]]) {
    let mut widths = [0usize; 4];
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(measure_text_width(cell));
        }
    }

    for (i, row) in rows.iter().enumerate() {
        out.push('|');
        for (cell, width) in row.iter().zip(widths) {
            out.push(' ');
            out.push_str(cell);
            out.push_str(&" ".repeat(width - measure_text_width(cell)));
            out.push_str(" |");
        }
        out.push('\n');

        if i == 0 {
            out.push('|');
            for width in widths {
                out.push_str(&"-".repeat(width + 2));
                out.push('|');
            }
            out.push('\n');
        }
    }
}
