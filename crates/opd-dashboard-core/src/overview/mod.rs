//! Overview aggregation: date filtering and summary statistics.
//!
//! A snapshot is recomputed from the full record set on every render and
//! holds no state between renders.

mod frequency;

pub use frequency::*;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{columns, FollowUp, RecordRow, DATE_FORMAT};

/// Shown in place of a "top" value when there is nothing to rank.
pub const PLACEHOLDER: &str = "-";

/// Derived, non-persisted view of the record set.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OverviewSnapshot {
    /// Date the records were filtered to, if any
    pub date_filter: Option<NaiveDate>,
    /// Records after filtering, in store order
    pub records: Vec<RecordRow>,
    pub total: usize,
    pub follow_up_count: usize,
    pub top_diagnosis: Option<String>,
    pub top_prakriti: Option<String>,
    pub diagnosis_counts: FrequencyTable,
    pub prakriti_counts: FrequencyTable,
}

impl OverviewSnapshot {
    /// Filter the records and compute every aggregate over the result.
    pub fn compute(records: &[RecordRow], date_filter: Option<NaiveDate>) -> Self {
        let records = filter_by_date(records, date_filter);

        let follow_up_count = records
            .iter()
            .filter(|r| r.value(columns::FOLLOW_UP) == FollowUp::Yes.as_str())
            .count();
        let diagnosis_counts =
            FrequencyTable::from_values(records.iter().map(|r| r.value(columns::DIAGNOSIS)));
        let prakriti_counts =
            FrequencyTable::from_values(records.iter().map(|r| r.value(columns::PRAKRITI)));

        Self {
            date_filter,
            total: records.len(),
            follow_up_count,
            top_diagnosis: diagnosis_counts.mode().map(str::to_string),
            top_prakriti: prakriti_counts.mode().map(str::to_string),
            diagnosis_counts,
            prakriti_counts,
            records,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn top_diagnosis_label(&self) -> &str {
        self.top_diagnosis.as_deref().unwrap_or(PLACEHOLDER)
    }

    pub fn top_prakriti_label(&self) -> &str {
        self.top_prakriti.as_deref().unwrap_or(PLACEHOLDER)
    }
}

/// Keep records whose `Date` cell equals the ISO form of `date`. `None` keeps all.
pub fn filter_by_date(records: &[RecordRow], date: Option<NaiveDate>) -> Vec<RecordRow> {
    match date {
        None => records.to_vec(),
        Some(date) => {
            let wanted = date.format(DATE_FORMAT).to_string();
            records
                .iter()
                .filter(|r| r.value(columns::DATE) == wanted)
                .cloned()
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HEADER;

    fn row(date: &str, prakriti: &str, diagnosis: &str, follow_up: &str) -> RecordRow {
        RecordRow::from_cells(
            &HEADER,
            &[date, "Patient", "40", "Male", prakriti, "Complaint", diagnosis, follow_up],
        )
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn sample() -> Vec<RecordRow> {
        vec![
            row("2024-01-01", "Vata", "Cold", "Yes"),
            row("2024-01-01", "Pitta", "Cold", "No"),
            row("2024-01-02", "Pitta", "Fever", "Yes"),
        ]
    }

    #[test]
    fn test_filter_to_single_date() {
        let snapshot = OverviewSnapshot::compute(&sample(), Some(day(1)));

        assert_eq!(snapshot.total, 2);
        assert_eq!(snapshot.top_diagnosis.as_deref(), Some("Cold"));
        assert_eq!(
            snapshot.diagnosis_counts.to_map(),
            [("Cold".to_string(), 2)].into_iter().collect()
        );
        assert_eq!(snapshot.follow_up_count, 1);
    }

    #[test]
    fn test_no_filter_keeps_everything() {
        let snapshot = OverviewSnapshot::compute(&sample(), None);

        assert_eq!(snapshot.total, 3);
        assert_eq!(snapshot.follow_up_count, 2);
        assert_eq!(snapshot.top_prakriti_label(), "Pitta");
        assert_eq!(snapshot.prakriti_counts.count("Vata"), 1);
    }

    #[test]
    fn test_absent_date_gives_empty_snapshot() {
        let snapshot = OverviewSnapshot::compute(&sample(), Some(day(9)));

        assert!(snapshot.is_empty());
        assert_eq!(snapshot.follow_up_count, 0);
        assert_eq!(snapshot.top_diagnosis_label(), PLACEHOLDER);
        assert_eq!(snapshot.top_prakriti_label(), PLACEHOLDER);
        assert!(snapshot.diagnosis_counts.is_empty());
    }

    #[test]
    fn test_empty_record_set() {
        let snapshot = OverviewSnapshot::compute(&[], None);
        assert_eq!(snapshot.total, 0);
        assert_eq!(snapshot.top_diagnosis_label(), "-");
    }

    #[test]
    fn test_filter_is_exact_match() {
        let records = vec![row("2024-01-01 ", "Vata", "Cold", "Yes"), row("2024-1-1", "Vata", "Cold", "Yes")];
        assert!(filter_by_date(&records, Some(day(1))).is_empty());
    }

    #[test]
    fn test_follow_up_must_be_exact_yes() {
        let records = vec![row("2024-01-01", "Vata", "Cold", "yes"), row("2024-01-01", "Vata", "Cold", "Yes")];
        assert_eq!(OverviewSnapshot::compute(&records, None).follow_up_count, 1);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn arb_row() -> impl Strategy<Value = RecordRow> {
            (
                1u32..=4,
                prop::sample::select(vec!["Vata", "Pitta", "Kapha"]),
                prop::sample::select(vec!["Cold", "Fever", "Acidity"]),
                prop::sample::select(vec!["Yes", "No"]),
            )
                .prop_map(|(d, p, dx, f)| row(&format!("2024-01-0{}", d), p, dx, f))
        }

        proptest! {
            #[test]
            fn filtered_rows_all_match_date(rows in prop::collection::vec(arb_row(), 0..40), d in 1u32..=4) {
                let snapshot = OverviewSnapshot::compute(&rows, Some(day(d)));
                let wanted = format!("2024-01-0{}", d);
                prop_assert!(snapshot.records.iter().all(|r| r.value(columns::DATE) == wanted));
                let expected = rows.iter().filter(|r| r.value(columns::DATE) == wanted).count();
                prop_assert_eq!(snapshot.total, expected);
            }

            #[test]
            fn counts_are_consistent(rows in prop::collection::vec(arb_row(), 0..40)) {
                let snapshot = OverviewSnapshot::compute(&rows, None);
                prop_assert!(snapshot.follow_up_count <= snapshot.total);
                let sum: usize = snapshot.diagnosis_counts.entries().iter().map(|(_, c)| c).sum();
                prop_assert_eq!(sum, snapshot.total);
                if let Some(top) = snapshot.top_diagnosis.as_deref() {
                    prop_assert_eq!(snapshot.diagnosis_counts.count(top), snapshot.diagnosis_counts.max_count());
                }
            }
        }
    }
}
