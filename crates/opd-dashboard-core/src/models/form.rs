//! Raw entry-form submission and its validation.

use chrono::{Local, NaiveDate};

use super::record::{parse_age, parse_date, FollowUp, Gender, OpdRecord, Prakriti, RecordError, DATE_FORMAT};

/// Entry form inputs exactly as submitted, before coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryForm {
    pub date: String,
    pub patient_name: String,
    pub age: String,
    pub gender: String,
    pub prakriti: String,
    pub complaint: String,
    pub diagnosis: String,
    pub follow_up: String,
}

impl EntryForm {
    /// Blank form with the widget defaults: the given date, age 0 and the
    /// first option of every selector.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: date.format(DATE_FORMAT).to_string(),
            patient_name: String::new(),
            age: "0".to_string(),
            gender: Gender::Male.as_str().to_string(),
            prakriti: Prakriti::Vata.as_str().to_string(),
            complaint: String::new(),
            diagnosis: String::new(),
            follow_up: FollowUp::Yes.as_str().to_string(),
        }
    }

    /// Blank form dated today (local time).
    pub fn today() -> Self {
        Self::new(Local::now().date_naive())
    }

    /// Coerce the submission into a record.
    ///
    /// Free-text fields are accepted as-is, including empty strings. Selector
    /// values must match their options exactly.
    pub fn validate(&self) -> Result<OpdRecord, RecordError> {
        Ok(OpdRecord {
            date: parse_date(&self.date)?,
            patient_name: self.patient_name.clone(),
            age: parse_age(&self.age)?,
            gender: self.gender.parse()?,
            prakriti: self.prakriti.parse()?,
            complaint: self.complaint.clone(),
            diagnosis: self.diagnosis.clone(),
            follow_up: self.follow_up.parse()?,
        })
    }
}

impl Default for EntryForm {
    fn default() -> Self {
        Self::today()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn test_defaults_validate() {
        let record = EntryForm::new(day()).validate().unwrap();
        assert_eq!(record.date, day());
        assert_eq!(record.age, 0);
        assert_eq!(record.gender, Gender::Male);
        assert_eq!(record.prakriti, Prakriti::Vata);
        assert_eq!(record.follow_up, FollowUp::Yes);
        assert!(record.patient_name.is_empty());
        assert!(record.diagnosis.is_empty());
    }

    #[test]
    fn test_full_submission() {
        let form = EntryForm {
            patient_name: "Meera".into(),
            age: "67".into(),
            gender: "Other".into(),
            prakriti: "Pitta-Kapha".into(),
            complaint: "Acidity".into(),
            diagnosis: "Amlapitta".into(),
            follow_up: "No".into(),
            ..EntryForm::new(day())
        };

        let record = form.validate().unwrap();
        assert_eq!(record.age, 67);
        assert_eq!(record.prakriti, Prakriti::PittaKapha);
        assert_eq!(record.date_string(), "2024-03-15");
        assert!(!record.follow_up.is_required());
    }

    #[test]
    fn test_rejects_out_of_range_age() {
        let form = EntryForm {
            age: "130".into(),
            ..EntryForm::new(day())
        };
        assert_eq!(form.validate(), Err(RecordError::AgeOutOfRange(130)));
    }

    #[test]
    fn test_rejects_case_mismatch() {
        let form = EntryForm {
            gender: "female".into(),
            ..EntryForm::new(day())
        };
        assert_eq!(
            form.validate(),
            Err(RecordError::UnknownGender("female".into()))
        );
    }

    #[test]
    fn test_rejects_bad_date() {
        let form = EntryForm {
            date: "15/03/2024".into(),
            ..EntryForm::new(day())
        };
        assert!(matches!(form.validate(), Err(RecordError::InvalidDate(_))));
    }
}
