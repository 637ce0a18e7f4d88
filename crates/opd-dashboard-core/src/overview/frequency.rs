//! Value frequency tables for the overview charts.

use std::collections::{BTreeMap, HashMap};

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Counts of distinct values.
///
/// Entries are ordered by descending count; values with equal counts keep the
/// order in which they were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<(String, usize)>,
}

impl FrequencyTable {
    pub fn from_values<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut index: HashMap<&'a str, usize> = HashMap::new();
        let mut entries: Vec<(String, usize)> = Vec::new();

        for value in values {
            match index.get(value) {
                Some(&i) => entries[i].1 += 1,
                None => {
                    index.insert(value, entries.len());
                    entries.push((value.to_string(), 1));
                }
            }
        }

        // Stable sort keeps first-seen order among equal counts.
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        Self { entries }
    }

    /// Most frequent value. Ties go to the value seen first.
    pub fn mode(&self) -> Option<&str> {
        self.entries.first().map(|(value, _)| value.as_str())
    }

    pub fn count(&self, value: &str) -> usize {
        self.entries
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    pub fn entries(&self) -> &[(String, usize)] {
        &self.entries
    }

    pub fn max_count(&self) -> usize {
        self.entries.first().map(|(_, c)| *c).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_map(&self) -> BTreeMap<String, usize> {
        self.entries.iter().cloned().collect()
    }
}

impl Serialize for FrequencyTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (value, count) in &self.entries {
            map.serialize_entry(value, count)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_sorted_descending() {
        let table = FrequencyTable::from_values(["Fever", "Cold", "Cold", "Acidity", "Cold", "Fever"]);
        assert_eq!(
            table.entries(),
            &[
                ("Cold".to_string(), 3),
                ("Fever".to_string(), 2),
                ("Acidity".to_string(), 1)
            ]
        );
        assert_eq!(table.mode(), Some("Cold"));
        assert_eq!(table.max_count(), 3);
        assert_eq!(table.count("Missing"), 0);
    }

    #[test]
    fn test_tie_goes_to_first_seen() {
        let table = FrequencyTable::from_values(["Pitta", "Vata", "Vata", "Pitta", "Kapha"]);
        assert_eq!(table.mode(), Some("Pitta"));
        assert_eq!(table.entries()[1].0, "Vata");
    }

    #[test]
    fn test_empty_values_are_counted() {
        let table = FrequencyTable::from_values(["", "", "Cold"]);
        assert_eq!(table.count(""), 2);
        assert_eq!(table.mode(), Some(""));
    }

    #[test]
    fn test_empty_table() {
        let table = FrequencyTable::from_values(std::iter::empty::<&str>());
        assert!(table.is_empty());
        assert_eq!(table.mode(), None);
        assert_eq!(table.max_count(), 0);
    }

    #[test]
    fn test_serializes_as_ordered_map() {
        let table = FrequencyTable::from_values(["Kapha", "Vata", "Vata"]);
        assert_eq!(serde_json::to_string(&table).unwrap(), r#"{"Vata":2,"Kapha":1}"#);
    }
}
