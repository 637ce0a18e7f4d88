//! OPD record operations on the SQLite store.

use rusqlite::params;

use super::{Database, RecordStore, StoreResult};
use crate::models::{OpdRecord, RecordRow, HEADER};

impl RecordStore for Database {
    fn append(&self, record: &OpdRecord) -> StoreResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO opd_records (
                visit_date, patient_name, age, gender,
                prakriti, complaint, diagnosis, follow_up
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                record.date_string(),
                record.patient_name,
                record.age,
                record.gender.as_str(),
                record.prakriti.as_str(),
                record.complaint,
                record.diagnosis,
                record.follow_up.as_str(),
            ],
        )?;
        tracing::info!(date = %record.date, "Appended OPD record");
        Ok(())
    }

    fn fetch_all(&self) -> StoreResult<Vec<RecordRow>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT visit_date, patient_name, age, gender,
                   prakriti, complaint, diagnosis, follow_up
            FROM opd_records
            ORDER BY row_id
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(OpdRow {
                visit_date: row.get(0)?,
                patient_name: row.get(1)?,
                age: row.get(2)?,
                gender: row.get(3)?,
                prakriti: row.get(4)?,
                complaint: row.get(5)?,
                diagnosis: row.get(6)?,
                follow_up: row.get(7)?,
            })
        })?;

        let records = rows
            .map(|r| r.map(RecordRow::from))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(count = records.len(), "Fetched OPD records from SQLite");
        Ok(records)
    }
}

/// Intermediate row struct for database mapping.
struct OpdRow {
    visit_date: String,
    patient_name: String,
    age: i64,
    gender: String,
    prakriti: String,
    complaint: String,
    diagnosis: String,
    follow_up: String,
}

impl From<OpdRow> for RecordRow {
    fn from(row: OpdRow) -> Self {
        RecordRow::from_cells(
            &HEADER,
            &[
                row.visit_date,
                row.patient_name,
                row.age.to_string(),
                row.gender,
                row.prakriti,
                row.complaint,
                row.diagnosis,
                row.follow_up,
            ],
        )
    }
}
