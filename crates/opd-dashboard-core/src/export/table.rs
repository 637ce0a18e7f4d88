//! CSV and JSON renderings of the record table.

use crate::models::{RecordRow, HEADER};
use crate::overview::OverviewSnapshot;

/// Records as CSV, header line first, one line per row.
pub fn records_csv(rows: &[RecordRow]) -> String {
    let mut csv = HEADER.join(",");
    csv.push('\n');

    for row in rows {
        let line: Vec<String> = HEADER.iter().map(|col| escape_csv(row.value(col))).collect();
        csv.push_str(&line.join(","));
        csv.push('\n');
    }

    csv
}

/// Records as a pretty JSON array of objects keyed by column name.
pub fn records_json(rows: &[RecordRow]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(rows)
}

/// Full overview snapshot as pretty JSON.
pub fn snapshot_json(snapshot: &OverviewSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(snapshot)
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rows() -> Vec<RecordRow> {
        vec![
            RecordRow::from_cells(
                &HEADER,
                &["2024-01-01", "Ravi, Jr.", "34", "Male", "Vata", "Said \"dry cough\"", "Kasa", "Yes"],
            ),
            RecordRow::from_cells(&HEADER, &["2024-01-02", "Meera", "29"]),
        ]
    }

    #[test]
    fn test_csv_export() {
        let csv = records_csv(&rows());
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Date,Name,Age,Gender,Prakriti,Complaint,Diagnosis,FollowUp");
        assert_eq!(
            lines[1],
            r#"2024-01-01,"Ravi, Jr.",34,Male,Vata,"Said ""dry cough""",Kasa,Yes"#
        );
        assert_eq!(lines[2], "2024-01-02,Meera,29,,,,,");
    }

    #[test]
    fn test_csv_header_only_when_empty() {
        assert_eq!(records_csv(&[]).lines().count(), 1);
    }

    #[test]
    fn test_escape_newline() {
        assert_eq!(escape_csv("line1\nline2"), "\"line1\nline2\"");
        assert_eq!(escape_csv("plain"), "plain");
    }

    #[test]
    fn test_records_json() {
        let json = records_json(&rows()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["Name"], "Ravi, Jr.");
        assert_eq!(parsed[1]["Diagnosis"], "");
    }

    #[test]
    fn test_snapshot_json() {
        let snapshot =
            OverviewSnapshot::compute(&rows(), NaiveDate::from_ymd_opt(2024, 1, 1));
        let parsed: serde_json::Value =
            serde_json::from_str(&snapshot_json(&snapshot).unwrap()).unwrap();

        assert_eq!(parsed["total"], 1);
        assert_eq!(parsed["date_filter"], "2024-01-01");
        assert_eq!(parsed["top_diagnosis"], "Kasa");
        assert_eq!(parsed["diagnosis_counts"]["Kasa"], 1);
    }
}
