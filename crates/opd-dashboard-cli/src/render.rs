//! Text rendering of the overview page.

use std::fmt::Write as _;

use chrono::NaiveDate;
use clap::ValueEnum;
use opd_dashboard_core::export::{records_csv, snapshot_json};
use opd_dashboard_core::models::{RecordRow, HEADER};
use opd_dashboard_core::overview::{FrequencyTable, OverviewSnapshot};
use opd_dashboard_core::session::{OverviewPage, DISCLAIMER, NO_DATA_MESSAGE};

/// Widest bar in a distribution chart, in characters.
pub const CHART_WIDTH: usize = 30;

/// Output format for the `overview` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

/// Render an overview page in the requested format.
///
/// JSON and CSV render an empty snapshot when the store has no data.
pub fn format_page(
    page: &OverviewPage,
    date_filter: Option<NaiveDate>,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    let empty;
    let snapshot = match page {
        OverviewPage::Ready(snapshot) => snapshot,
        OverviewPage::NoData if format == OutputFormat::Table => {
            return Ok(format!("{}\n", NO_DATA_MESSAGE))
        }
        OverviewPage::NoData => {
            empty = OverviewSnapshot::compute(&[], date_filter);
            &empty
        }
    };

    match format {
        OutputFormat::Table => Ok(overview_text(snapshot)),
        OutputFormat::Json => snapshot_json(snapshot).map(|json| json + "\n"),
        OutputFormat::Csv => Ok(records_csv(&snapshot.records)),
    }
}

/// Metrics, both distribution charts and the patient list.
pub fn overview_text(snapshot: &OverviewSnapshot) -> String {
    let mut out = String::from("OPD Overview\n");
    let _ = writeln!(out, "{}", DISCLAIMER);
    if let Some(date) = snapshot.date_filter {
        let _ = writeln!(out, "Date filter: {}", date);
    }
    out.push('\n');
    out.push_str(&metrics(snapshot));

    out.push_str("\nOPD Distribution\n\n");
    out.push_str(&bar_chart("Diagnosis", &snapshot.diagnosis_counts, CHART_WIDTH));
    out.push('\n');
    out.push_str(&bar_chart("Prakriti", &snapshot.prakriti_counts, CHART_WIDTH));

    out.push_str("\nOPD Patient List\n\n");
    out.push_str(&record_table(&snapshot.records));
    out
}

pub fn metrics(snapshot: &OverviewSnapshot) -> String {
    let rows = [
        ("Total Patients", snapshot.total.to_string()),
        ("Follow-ups", snapshot.follow_up_count.to_string()),
        ("Top Diagnosis", snapshot.top_diagnosis_label().to_string()),
        ("Dominant Prakriti", snapshot.top_prakriti_label().to_string()),
    ];
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);

    let mut out = String::new();
    for (label, value) in rows {
        let _ = writeln!(out, "{:<width$}  {}", label, value, width = width);
    }
    out
}

/// Horizontal bar chart, bars scaled so the largest count spans `width`.
pub fn bar_chart(title: &str, table: &FrequencyTable, width: usize) -> String {
    let mut out = format!("{}\n", title);
    if table.is_empty() {
        out.push_str("  (no data)\n");
        return out;
    }

    let max = table.max_count().max(1);
    let label_width = table
        .entries()
        .iter()
        .map(|(value, _)| display_label(value).chars().count())
        .max()
        .unwrap_or(0);

    for (value, count) in table.entries() {
        let len = (count * width / max).max(1);
        let _ = writeln!(
            out,
            "  {:<lw$}  {} {}",
            display_label(value),
            "█".repeat(len),
            count,
            lw = label_width
        );
    }
    out
}

fn display_label(value: &str) -> &str {
    if value.is_empty() {
        "(blank)"
    } else {
        value
    }
}

/// Fixed-width table with one column per header field.
pub fn record_table(rows: &[RecordRow]) -> String {
    let mut widths: Vec<usize> = HEADER.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, column) in HEADER.iter().enumerate() {
            widths[i] = widths[i].max(row.value(column).chars().count());
        }
    }

    let line = |cells: Vec<&str>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<w$}", cell, w = *w))
            .collect();
        padded.join(" | ").trim_end().to_string()
    };

    let mut out = String::new();
    out.push_str(&line(HEADER.to_vec()));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("-+-"));
    out.push('\n');

    for row in rows {
        out.push_str(&line(HEADER.iter().map(|c| row.value(c)).collect()));
        out.push('\n');
    }
    out
}
