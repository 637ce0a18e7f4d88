//! OPD visit record and its enumerated fields.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::row::RecordRow;

/// Version of the eight-column layout below. Bump when columns change.
pub const SCHEMA_VERSION: i64 = 1;

/// Column names, in storage order. The first row of every store holds exactly these.
pub const HEADER: [&str; 8] = [
    columns::DATE,
    columns::NAME,
    columns::AGE,
    columns::GENDER,
    columns::PRAKRITI,
    columns::COMPLAINT,
    columns::DIAGNOSIS,
    columns::FOLLOW_UP,
];

/// Column names as they appear in the store header.
pub mod columns {
    pub const DATE: &str = "Date";
    pub const NAME: &str = "Name";
    pub const AGE: &str = "Age";
    pub const GENDER: &str = "Gender";
    pub const PRAKRITI: &str = "Prakriti";
    pub const COMPLAINT: &str = "Complaint";
    pub const DIAGNOSIS: &str = "Diagnosis";
    pub const FOLLOW_UP: &str = "FollowUp";
}

pub const MIN_AGE: i64 = 0;
pub const MAX_AGE: i64 = 120;

/// ISO calendar-date format used for the `Date` column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Record validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("Age must be a whole number, got {0:?}")]
    InvalidAge(String),

    #[error("Age {0} is outside the allowed range 0-120")]
    AgeOutOfRange(i64),

    #[error("Unknown gender {0:?} (expected Male, Female or Other)")]
    UnknownGender(String),

    #[error("Unknown prakriti {0:?}")]
    UnknownPrakriti(String),

    #[error("Follow-up must be Yes or No, got {0:?}")]
    UnknownFollowUp(String),

    #[error("Invalid date {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Missing column: {0}")]
    MissingColumn(&'static str),
}

/// Patient gender as offered by the entry form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl FromStr for Gender {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gender::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| RecordError::UnknownGender(s.to_string()))
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ayurvedic constitutional type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Prakriti {
    Vata,
    Pitta,
    Kapha,
    #[serde(rename = "Vata-Pitta")]
    VataPitta,
    #[serde(rename = "Pitta-Kapha")]
    PittaKapha,
    #[serde(rename = "Vata-Kapha")]
    VataKapha,
}

impl Prakriti {
    pub const ALL: [Prakriti; 6] = [
        Prakriti::Vata,
        Prakriti::Pitta,
        Prakriti::Kapha,
        Prakriti::VataPitta,
        Prakriti::PittaKapha,
        Prakriti::VataKapha,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Prakriti::Vata => "Vata",
            Prakriti::Pitta => "Pitta",
            Prakriti::Kapha => "Kapha",
            Prakriti::VataPitta => "Vata-Pitta",
            Prakriti::PittaKapha => "Pitta-Kapha",
            Prakriti::VataKapha => "Vata-Kapha",
        }
    }
}

impl FromStr for Prakriti {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Prakriti::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| RecordError::UnknownPrakriti(s.to_string()))
    }
}

impl fmt::Display for Prakriti {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the patient needs another visit. Stored as `Yes` / `No`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FollowUp {
    Yes,
    No,
}

impl FollowUp {
    pub const ALL: [FollowUp; 2] = [FollowUp::Yes, FollowUp::No];

    pub fn as_str(&self) -> &'static str {
        match self {
            FollowUp::Yes => "Yes",
            FollowUp::No => "No",
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, FollowUp::Yes)
    }
}

impl FromStr for FollowUp {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FollowUp::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| RecordError::UnknownFollowUp(s.to_string()))
    }
}

impl fmt::Display for FollowUp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outpatient visit. Immutable once appended to a store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpdRecord {
    /// Visit date
    pub date: NaiveDate,
    /// Patient name (may be empty)
    pub patient_name: String,
    /// Age in years, 0-120
    pub age: u8,
    pub gender: Gender,
    pub prakriti: Prakriti,
    /// Main complaint (free text)
    pub complaint: String,
    /// Doctor-entered diagnosis (free text)
    pub diagnosis: String,
    pub follow_up: FollowUp,
}

impl OpdRecord {
    /// ISO date string as written to the `Date` column.
    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    /// Cell values in [`HEADER`] order.
    pub fn to_row_values(&self) -> Vec<String> {
        vec![
            self.date_string(),
            self.patient_name.clone(),
            self.age.to_string(),
            self.gender.as_str().to_string(),
            self.prakriti.as_str().to_string(),
            self.complaint.clone(),
            self.diagnosis.clone(),
            self.follow_up.as_str().to_string(),
        ]
    }

    /// Rebuild a record from a row read back from a store.
    pub fn from_row(row: &RecordRow) -> Result<Self, RecordError> {
        let cell = |column: &'static str| row.get(column).ok_or(RecordError::MissingColumn(column));

        Ok(Self {
            date: parse_date(cell(columns::DATE)?)?,
            patient_name: cell(columns::NAME)?.to_string(),
            age: parse_age(cell(columns::AGE)?)?,
            gender: cell(columns::GENDER)?.parse()?,
            prakriti: cell(columns::PRAKRITI)?.parse()?,
            complaint: cell(columns::COMPLAINT)?.to_string(),
            diagnosis: cell(columns::DIAGNOSIS)?.to_string(),
            follow_up: cell(columns::FOLLOW_UP)?.parse()?,
        })
    }
}

/// Parse an ISO calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate, RecordError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| RecordError::InvalidDate(s.to_string()))
}

/// Coerce age input to an integer in [`MIN_AGE`, `MAX_AGE`].
pub fn parse_age(s: &str) -> Result<u8, RecordError> {
    let value: i64 = s
        .trim()
        .parse()
        .map_err(|_| RecordError::InvalidAge(s.to_string()))?;
    check_age(value)
}

pub fn check_age(value: i64) -> Result<u8, RecordError> {
    if !(MIN_AGE..=MAX_AGE).contains(&value) {
        return Err(RecordError::AgeOutOfRange(value));
    }
    u8::try_from(value).map_err(|_| RecordError::AgeOutOfRange(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OpdRecord {
        OpdRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            patient_name: "Asha".into(),
            age: 42,
            gender: Gender::Female,
            prakriti: Prakriti::VataPitta,
            complaint: "Joint pain".into(),
            diagnosis: "Sandhivata".into(),
            follow_up: FollowUp::Yes,
        }
    }

    #[test]
    fn test_row_values_follow_header_order() {
        let values = sample().to_row_values();
        assert_eq!(values.len(), HEADER.len());
        assert_eq!(
            values,
            vec!["2024-01-01", "Asha", "42", "Female", "Vata-Pitta", "Joint pain", "Sandhivata", "Yes"]
        );
    }

    #[test]
    fn test_enum_parsing_is_exact() {
        assert_eq!("Pitta-Kapha".parse::<Prakriti>().unwrap(), Prakriti::PittaKapha);
        assert!("pitta-kapha".parse::<Prakriti>().is_err());
        assert!("male".parse::<Gender>().is_err());
        assert!(" Yes".parse::<FollowUp>().is_err());
        assert!("Yes".parse::<FollowUp>().unwrap().is_required());
    }

    #[test]
    fn test_age_bounds() {
        assert_eq!(parse_age("0").unwrap(), 0);
        assert_eq!(parse_age(" 120 ").unwrap(), 120);
        assert_eq!(parse_age("121"), Err(RecordError::AgeOutOfRange(121)));
        assert_eq!(parse_age("-1"), Err(RecordError::AgeOutOfRange(-1)));
        assert!(matches!(parse_age("forty"), Err(RecordError::InvalidAge(_))));
        assert!(matches!(parse_age("4.5"), Err(RecordError::InvalidAge(_))));
    }

    #[test]
    fn test_from_row_round_trip() {
        let record = sample();
        let row = RecordRow::from_record(&record);
        assert_eq!(OpdRecord::from_row(&row).unwrap(), record);
    }

    #[test]
    fn test_from_row_missing_column() {
        let row = RecordRow::from_cells(&["Date", "Name"], &["2024-01-01", "Asha"]);
        assert_eq!(
            OpdRecord::from_row(&row),
            Err(RecordError::MissingColumn(columns::AGE))
        );
    }

    #[test]
    fn test_prakriti_serde_uses_display_names() {
        let json = serde_json::to_string(&Prakriti::VataKapha).unwrap();
        assert_eq!(json, "\"Vata-Kapha\"");
    }
}
