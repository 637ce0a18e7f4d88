//! A data row as read back from a record store.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use super::record::{OpdRecord, HEADER};

/// Column-name to cell-text mapping, kept in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordRow {
    cells: Vec<(String, String)>,
}

impl RecordRow {
    /// Pair header names with cell values. Missing trailing cells become empty
    /// strings; cells beyond the header are dropped.
    pub fn from_cells<H: AsRef<str>, V: AsRef<str>>(header: &[H], values: &[V]) -> Self {
        let cells = header
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let value = values.get(i).map(|v| v.as_ref()).unwrap_or_default();
                (name.as_ref().to_string(), value.to_string())
            })
            .collect();
        Self { cells }
    }

    /// Row for a record, keyed by [`HEADER`].
    pub fn from_record(record: &OpdRecord) -> Self {
        Self::from_cells(&HEADER, record.to_row_values().as_slice())
    }

    /// Cell text for a column, if the column exists.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Cell text for a column, empty when the column is absent.
    pub fn value(&self, column: &str) -> &str {
        self.get(column).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True when every cell is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.trim().is_empty())
    }

    /// JSON object with keys in header order.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .cells
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        Value::Object(map)
    }
}

impl Serialize for RecordRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (k, v) in &self.cells {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_rows_are_padded() {
        let row = RecordRow::from_cells(&HEADER, &["2024-01-01", "Ravi", "30"]);
        assert_eq!(row.len(), 8);
        assert_eq!(row.get("Age"), Some("30"));
        assert_eq!(row.get("Diagnosis"), Some(""));
        assert_eq!(row.get("Unknown"), None);
        assert_eq!(row.value("Unknown"), "");
    }

    #[test]
    fn test_extra_cells_are_dropped() {
        let row = RecordRow::from_cells(&["Date"], &["2024-01-01", "spill"]);
        assert_eq!(row.len(), 1);
    }

    #[test]
    fn test_blank_detection() {
        assert!(RecordRow::from_cells(&HEADER, &["", " "]).is_blank());
        assert!(!RecordRow::from_cells(&HEADER, &["2024-01-01"]).is_blank());
    }

    #[test]
    fn test_json_keeps_header_order() {
        let row = RecordRow::from_cells(&HEADER, &["2024-01-01", "Ravi"]);
        let json = row.to_json().to_string();
        assert!(json.starts_with(r#"{"Date":"2024-01-01","Name":"Ravi","Age":"""#));
        assert_eq!(serde_json::to_string(&row).unwrap(), json);
    }
}
