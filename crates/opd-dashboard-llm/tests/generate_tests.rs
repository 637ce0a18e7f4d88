//! Prompt playground integration tests.

use chrono::NaiveDate;
use opd_dashboard_core::models::{FollowUp, Gender, OpdRecord, Prakriti};
use opd_dashboard_core::store::{Database, RecordStore};
use opd_dashboard_llm::{generate_response, GenerateOutcome, MockInferenceClient};
use proptest::prelude::*;

fn seeded_store() -> Database {
    let db = Database::open_in_memory().unwrap();
    for (day, diagnosis) in [(1, "Cold"), (1, "Cold"), (2, "Fever")] {
        db.append(&OpdRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            patient_name: "Anil".to_string(),
            age: 61,
            gender: Gender::Male,
            prakriti: Prakriti::VataPitta,
            complaint: "Sneezing".to_string(),
            diagnosis: diagnosis.to_string(),
            follow_up: FollowUp::No,
        })
        .unwrap();
    }
    db
}

#[test]
fn test_prompt_uses_unfiltered_store_contents() {
    let db = seeded_store();
    let mock = MockInferenceClient::new("Two colds and a fever.");

    let outcome = generate_response(&mock, &db.fetch_all().unwrap(), "Summarize this week").unwrap();

    assert_eq!(outcome, GenerateOutcome::Response("Two colds and a fever.".to_string()));
    let prompt = &mock.prompts()[0];
    assert_eq!(prompt.matches("\"Diagnosis\": \"Cold\"").count(), 2);
    assert_eq!(prompt.matches("\"Diagnosis\": \"Fever\"").count(), 1);
    assert!(prompt.contains("\"Prakriti\": \"Vata-Pitta\""));
}

proptest! {
    #[test]
    fn whitespace_instruction_never_calls_client(instruction in "[ \t\n]{0,12}") {
        let mock = MockInferenceClient::new("unused");
        let outcome = generate_response(&mock, &[], &instruction).unwrap();
        prop_assert!(matches!(outcome, GenerateOutcome::Warning(_)));
        prop_assert_eq!(mock.call_count(), 0);
    }
}
