//! SQLite schema definition.

/// Schema for the local record store. Column order follows the store header.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- OPD Records (Append-Only)
-- ============================================================================

CREATE TABLE IF NOT EXISTS opd_records (
    row_id INTEGER PRIMARY KEY AUTOINCREMENT,
    visit_date TEXT NOT NULL,                    -- ISO date, YYYY-MM-DD
    patient_name TEXT NOT NULL DEFAULT '',
    age INTEGER NOT NULL CHECK (age BETWEEN 0 AND 120),
    gender TEXT NOT NULL CHECK (gender IN ('Male', 'Female', 'Other')),
    prakriti TEXT NOT NULL CHECK (prakriti IN (
        'Vata', 'Pitta', 'Kapha', 'Vata-Pitta', 'Pitta-Kapha', 'Vata-Kapha'
    )),
    complaint TEXT NOT NULL DEFAULT '',
    diagnosis TEXT NOT NULL DEFAULT '',
    follow_up TEXT NOT NULL CHECK (follow_up IN ('Yes', 'No')),
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_opd_records_date ON opd_records(visit_date);

-- Records are immutable once appended
CREATE TRIGGER IF NOT EXISTS opd_records_no_update BEFORE UPDATE ON opd_records
BEGIN
    SELECT RAISE(ABORT, 'OPD records are append-only');
END;

CREATE TRIGGER IF NOT EXISTS opd_records_no_delete BEFORE DELETE ON opd_records
BEGIN
    SELECT RAISE(ABORT, 'OPD records are append-only');
END;
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn
    }

    fn insert(conn: &Connection, age: i64, gender: &str) -> rusqlite::Result<usize> {
        conn.execute(
            "INSERT INTO opd_records (visit_date, age, gender, prakriti, follow_up)
             VALUES ('2024-01-01', ?1, ?2, 'Vata', 'No')",
            rusqlite::params![age, gender],
        )
    }

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_schema_idempotent() {
        let conn = setup();
        assert!(conn.execute_batch(SCHEMA).is_ok());
    }

    #[test]
    fn test_check_constraints() {
        let conn = setup();
        assert!(insert(&conn, 30, "Female").is_ok());
        assert!(insert(&conn, 121, "Female").is_err());
        assert!(insert(&conn, 30, "female").is_err());
    }

    #[test]
    fn test_append_only_triggers() {
        let conn = setup();
        insert(&conn, 30, "Male").unwrap();

        let update = conn.execute("UPDATE opd_records SET diagnosis = 'Changed'", []);
        assert!(update.is_err());

        let delete = conn.execute("DELETE FROM opd_records", []);
        assert!(delete.is_err());

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM opd_records", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
